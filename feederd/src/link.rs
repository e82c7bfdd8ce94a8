//! Link readiness interface.
//!
//! The daemon consumes link state passively: it waits a bounded time for
//! the link to come up at startup and reports the address in the banner.
//! Bring-up and reconnection policy live outside this process.

use std::net::UdpSocket;
use std::time::Duration;

/// Link state consumed by the bootstrap sequence.
pub trait LinkMonitor: Send {
    /// Block until the link is ready or the timeout elapses.
    ///
    /// Returns `false` on timeout; the caller then continues in
    /// standalone mode rather than failing.
    fn wait_ready(&self, timeout: Duration) -> bool;

    /// Routable address of the link, when known.
    fn address(&self) -> Option<String>;
}

/// Link monitor for host deployments where the interface is managed by
/// the operating system and already up.
pub struct HostLink;

impl LinkMonitor for HostLink {
    fn wait_ready(&self, _timeout: Duration) -> bool {
        true
    }

    fn address(&self) -> Option<String> {
        // Connecting a UDP socket sends no packets; it only resolves the
        // local address the OS would route from.
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        socket.local_addr().ok().map(|addr| addr.ip().to_string())
    }
}

//! TCP command listener.
//!
//! Accepts one inbound connection at a time, reads one buffer of bytes,
//! classifies each byte and invokes the registered handler per valid
//! digit. The serve loop runs on its own thread and performs all
//! connection handling sequentially: while a connection is being serviced
//! — including any blocking auto-home delay its commands trigger — new
//! connection attempts wait in the OS backlog.

use feeder_common::consts::{ACCEPT_RETRY_MS, DEFAULT_PORT, RECV_BUFFER_SIZE};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Error types for listener operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Port unavailable — fatal to listener startup.
    #[error("Failed to bind port {port}: {source}")]
    Bind {
        /// Port that could not be bound
        port: u16,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// Socket resource failure — fatal.
    #[error("Socket error: {0}")]
    Socket(std::io::Error),

    /// Operation attempted before `init()`.
    #[error("Server not initialized")]
    NotInitialized,

    /// Serve thread could not be spawned.
    #[error("Failed to start server thread: {0}")]
    Spawn(std::io::Error),

    /// Response write failed.
    #[error("Failed to send response: {0}")]
    Send(std::io::Error),
}

/// Strategy invoked for every valid command digit.
///
/// The listener depends only on this interface, never on a concrete
/// actuator type, so tests substitute a fake. The handler receives the
/// live connection and may write a response before the listener closes it.
pub trait CommandHandler: Send {
    /// Handle one validated command digit (0..=9).
    fn handle(&mut self, digit: u8, conn: &mut TcpStream);
}

/// Classification of a received byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// A valid command digit, carried as its numeric value.
    Digit(u8),
    /// Line terminator, silently ignored.
    Ignored,
    /// Anything else: dropped with a warning, no response.
    Invalid,
}

/// Classify one received byte.
pub fn classify_byte(byte: u8) -> ByteClass {
    match byte {
        b'0'..=b'9' => ByteClass::Digit(byte - b'0'),
        b'\r' | b'\n' => ByteClass::Ignored,
        _ => ByteClass::Invalid,
    }
}

/// Write an ASCII response to a connection.
///
/// Returns the number of bytes written. Relies on OS send buffering;
/// never blocks indefinitely under normal socket defaults.
pub fn send_response(conn: &mut TcpStream, text: &str) -> Result<usize, ServerError> {
    conn.write_all(text.as_bytes()).map_err(ServerError::Send)?;
    debug!("Response sent ({} bytes)", text.len());
    Ok(text.len())
}

/// Resolve the configured port, treating 0 as "use the default".
fn effective_port(port: u16) -> u16 {
    if port == 0 { DEFAULT_PORT } else { port }
}

/// TCP command listener.
///
/// Lifecycle: `new` → `init` (bind + listen) → `register_handler` →
/// `start` (serve loop on its own thread) → `stop`.
pub struct CommandServer {
    /// Bound port (after `init`)
    port: u16,
    /// Listen backlog
    backlog: i32,
    /// Bound listening socket, consumed by `start`
    listener: Option<TcpListener>,
    /// Running flag for the serve loop
    running: Arc<AtomicBool>,
    /// Registered command handler, consumed by `start`
    handler: Option<Box<dyn CommandHandler>>,
    /// Serve thread handle
    join: Option<JoinHandle<()>>,
}

impl CommandServer {
    /// Create an unbound server with the given listen backlog.
    pub fn new(backlog: i32) -> Self {
        Self {
            port: 0,
            backlog,
            listener: None,
            running: Arc::new(AtomicBool::new(false)),
            handler: None,
            join: None,
        }
    }

    /// Create the listening socket: address-reuse, bind, listen.
    ///
    /// Port 0 is treated as "use the default port". Accepting does not
    /// begin until [`start`](Self::start).
    ///
    /// # Errors
    /// `ServerError::Socket` if socket creation fails,
    /// `ServerError::Bind` if the port is already in use.
    pub fn init(&mut self, port: u16) -> Result<(), ServerError> {
        let port = effective_port(port);
        info!("Initializing command listener on port {}", port);

        let socket =
            Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(ServerError::Socket)?;

        if let Err(e) = socket.set_reuse_address(true) {
            warn!("Failed to set address reuse: {}", e);
        }

        let addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], port));
        socket
            .bind(&addr.into())
            .map_err(|source| ServerError::Bind { port, source })?;
        socket.listen(self.backlog).map_err(ServerError::Socket)?;

        // Non-blocking accept lets the serve loop poll the running flag
        // instead of parking in accept().
        socket.set_nonblocking(true).map_err(ServerError::Socket)?;

        self.listener = Some(socket.into());
        self.port = port;

        info!("Listener bound: port {}, backlog {}", port, self.backlog);
        Ok(())
    }

    /// Register the command handler, replacing any previous one.
    ///
    /// At most one handler is active. Registration happens once at
    /// startup, before [`start`](Self::start).
    pub fn register_handler(&mut self, handler: Box<dyn CommandHandler>) {
        self.handler = Some(handler);
        info!("Command handler registered");
    }

    /// Start the serve loop on its own thread.
    ///
    /// # Errors
    /// `ServerError::NotInitialized` before `init()`,
    /// `ServerError::Spawn` if the thread cannot be created.
    pub fn start(&mut self) -> Result<(), ServerError> {
        let listener = self.listener.take().ok_or(ServerError::NotInitialized)?;
        let handler = self.handler.take();
        if handler.is_none() {
            warn!("Starting without a command handler; digits will be dropped");
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let join = std::thread::Builder::new()
            .name("command_server".to_string())
            .spawn(move || serve_loop(listener, handler, running))
            .map_err(ServerError::Spawn)?;
        self.join = Some(join);

        info!("Command listener started");
        Ok(())
    }

    /// Request the serve loop to stop.
    ///
    /// In-flight per-connection processing is not interrupted — it
    /// completes or fails naturally, after which the loop exits and the
    /// listening socket is closed.
    pub fn stop(&mut self) {
        info!("Stopping command listener");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Block until the serve loop has exited.
    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    /// True while the serve loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Bound port (0 before `init`).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

/// Serve loop: accept → read → dispatch → respond → close, one
/// connection at a time.
fn serve_loop(
    listener: TcpListener,
    mut handler: Option<Box<dyn CommandHandler>>,
    running: Arc<AtomicBool>,
) {
    info!("Serve loop started");

    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((mut stream, peer)) => {
                info!("Client connected: {}", peer);
                // The accepted stream must block for the read below even
                // though the listener polls.
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!("Failed to restore blocking mode: {}", e);
                }
                handle_connection(&mut stream, &mut handler);
                drop(stream);
                info!("Client connection closed: {}", peer);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(ACCEPT_RETRY_MS));
            }
            Err(e) => {
                error!("Accept failed: {}", e);
                std::thread::sleep(Duration::from_millis(ACCEPT_RETRY_MS));
            }
        }
    }

    info!("Serve loop exited");
}

/// Service one connection: read at most one buffer, dispatch every valid
/// digit in order, then return so the caller closes the connection.
fn handle_connection(stream: &mut TcpStream, handler: &mut Option<Box<dyn CommandHandler>>) {
    let mut buffer = [0u8; RECV_BUFFER_SIZE];

    match stream.read(&mut buffer) {
        Ok(0) => {
            info!("Client closed connection");
        }
        Ok(received) => {
            debug!("Received {} bytes", received);
            for &byte in &buffer[..received] {
                match classify_byte(byte) {
                    ByteClass::Digit(digit) => {
                        info!("Received command: {}", byte as char);
                        if let Some(handler) = handler.as_mut() {
                            handler.handle(digit, stream);
                        }
                    }
                    ByteClass::Ignored => {}
                    ByteClass::Invalid => {
                        warn!("Invalid command byte: {:#04x}", byte);
                    }
                }
            }
        }
        Err(e) => {
            error!("Read failed: {}", e);
        }
    }
}

//! Listener integration tests.
//!
//! Exercise the full accept → read → dispatch → respond → close pipeline
//! over real loopback connections, including the serialization property:
//! a second connection is only serviced after the first connection's
//! blocking work has completed and the connection is closed.

use feeder_common::config::ServoConfig;
use feeder_hal::ServoController;
use feeder_hal::drivers::simulation;
use feederd::dispatch::{NOT_INITIALIZED_RESPONSE, ServoCommandHandler};
use feederd::server::{CommandHandler, CommandServer, send_response};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Reserve a free loopback port.
fn free_port() -> u16 {
    let probe = TcpListener::bind("127.0.0.1:0").unwrap();
    probe.local_addr().unwrap().port()
}

/// Start a listener with the given handler; returns the server and port.
fn spawn_server(handler: Box<dyn CommandHandler>) -> (CommandServer, u16) {
    let port = free_port();
    let mut server = CommandServer::new(5);
    server.init(port).unwrap();
    server.register_handler(handler);
    server.start().unwrap();
    (server, port)
}

/// Handler with a working servo and the default 1 s auto-home policy.
fn servo_handler() -> Box<dyn CommandHandler> {
    let mut servo = ServoController::new(simulation::create_driver(), &ServoConfig::default());
    servo.init().unwrap();
    Box::new(ServoCommandHandler::new(
        Some(servo),
        Duration::from_millis(1000),
    ))
}

/// Test double: counts invocations, optionally blocking per command.
struct CountingHandler {
    count: Arc<AtomicUsize>,
    delay: Duration,
}

impl CommandHandler for CountingHandler {
    fn handle(&mut self, digit: u8, conn: &mut TcpStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        let _ = send_response(conn, &format!("done {digit}\n"));
    }
}

fn send_and_collect(port: u16, payload: &[u8]) -> String {
    let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
    client.write_all(payload).unwrap();
    client.shutdown(Shutdown::Write).unwrap();

    let mut received = String::new();
    client.read_to_string(&mut received).unwrap();
    received
}

#[test]
fn center_command_gets_exact_acknowledgment() {
    let (mut server, port) = spawn_server(servo_handler());

    let received = send_and_collect(port, b"5");
    assert_eq!(received, "OK: Command 5 -> Angle 90° (auto reset in 1s)\n");

    server.stop();
    server.join();
}

#[test]
fn mixed_bytes_trigger_exactly_one_command() {
    let (mut server, port) = spawn_server(servo_handler());

    // 'a' is invalid (warned, no response), '\n' is ignored, '7' acts.
    let received = send_and_collect(port, b"a7\n");
    assert_eq!(received, "OK: Command 7 -> Angle 126° (auto reset in 1s)\n");

    server.stop();
    server.join();
}

#[test]
fn empty_payload_closes_without_command_effect() {
    let count = Arc::new(AtomicUsize::new(0));
    let handler = CountingHandler {
        count: Arc::clone(&count),
        delay: Duration::ZERO,
    };
    let (mut server, port) = spawn_server(Box::new(handler));

    let received = send_and_collect(port, b"");
    assert_eq!(received, "");
    assert_eq!(count.load(Ordering::SeqCst), 0);

    server.stop();
    server.join();
}

#[test]
fn invalid_bytes_produce_no_response() {
    let count = Arc::new(AtomicUsize::new(0));
    let handler = CountingHandler {
        count: Arc::clone(&count),
        delay: Duration::ZERO,
    };
    let (mut server, port) = spawn_server(Box::new(handler));

    let received = send_and_collect(port, b"xyz!");
    assert_eq!(received, "");
    assert_eq!(count.load(Ordering::SeqCst), 0);

    server.stop();
    server.join();
}

#[test]
fn uninitialized_servo_reports_error_over_wire() {
    let handler = ServoCommandHandler::new(None, Duration::from_millis(1000));
    let (mut server, port) = spawn_server(Box::new(handler));

    let received = send_and_collect(port, b"5");
    assert_eq!(received, NOT_INITIALIZED_RESPONSE);

    server.stop();
    server.join();
}

#[test]
fn multiple_digits_in_one_buffer_processed_in_order() {
    let count = Arc::new(AtomicUsize::new(0));
    let handler = CountingHandler {
        count: Arc::clone(&count),
        delay: Duration::ZERO,
    };
    let (mut server, port) = spawn_server(Box::new(handler));

    let received = send_and_collect(port, b"123");
    assert_eq!(received, "done 1\ndone 2\ndone 3\n");
    assert_eq!(count.load(Ordering::SeqCst), 3);

    server.stop();
    server.join();
}

#[test]
fn second_connection_waits_for_first_connections_delay() {
    const HANDLER_DELAY: Duration = Duration::from_millis(400);

    let count = Arc::new(AtomicUsize::new(0));
    let handler = CountingHandler {
        count: Arc::clone(&count),
        delay: HANDLER_DELAY,
    };
    let (mut server, port) = spawn_server(Box::new(handler));

    let start = Instant::now();

    // First connection: triggers a blocking command.
    let mut first = TcpStream::connect(("127.0.0.1", port)).unwrap();
    first.write_all(b"1").unwrap();
    first.shutdown(Shutdown::Write).unwrap();

    // Second connection: the TCP handshake completes into the OS backlog
    // immediately, but servicing must wait for the first connection.
    std::thread::sleep(Duration::from_millis(50));
    let mut second = TcpStream::connect(("127.0.0.1", port)).unwrap();
    second.write_all(b"2").unwrap();
    second.shutdown(Shutdown::Write).unwrap();

    let mut first_received = String::new();
    first.read_to_string(&mut first_received).unwrap();
    let first_done = Instant::now();

    let mut second_received = String::new();
    second.read_to_string(&mut second_received).unwrap();
    let second_done = Instant::now();

    assert_eq!(first_received, "done 1\n");
    assert_eq!(second_received, "done 2\n");
    assert!(first_done <= second_done);

    // The second response cannot arrive before both blocking delays have
    // elapsed back to back.
    let elapsed = second_done.duration_since(start);
    assert!(
        elapsed >= HANDLER_DELAY * 2,
        "second connection serviced too early: {elapsed:?}"
    );

    server.stop();
    server.join();
}

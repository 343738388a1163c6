//! Concurrency Tests
//!
//! These tests verify:
//! - Commands from many threads never overlap on the wire
//! - Every caller gets the response to its own command
//! - Close interrupts a blocked command and fails queued ones
//! - A queued command's timeout includes its wait for the connection

#[path = "../common/mod.rs"]
mod common;

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use common::MockServer;
use parking_lot::Mutex;
use ts3query::transport::Stream;
use ts3query::{Client, Command, QueryError};

const THREADS: usize = 8;
const COMMANDS_PER_THREAD: usize = 25;

// =============================================================================
// Wire Tap
// =============================================================================

/// Counts command lines written and status lines read, and records a
/// violation whenever a command goes out before the previous one's status
/// came back
#[derive(Default)]
struct Tap {
    written: AtomicUsize,
    statuses: AtomicUsize,
    violations: AtomicUsize,
}

struct TapWriter {
    inner: TcpStream,
    tap: Arc<Tap>,
}

impl Write for TapWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Checked before the bytes leave, the reply can't race the count
        for _ in buf.iter().filter(|&&b| b == b'\n') {
            let written = self.tap.written.fetch_add(1, Ordering::SeqCst);
            if written != self.tap.statuses.load(Ordering::SeqCst) {
                self.tap.violations.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct TapReader {
    inner: TcpStream,
    tap: Arc<Tap>,
    partial: Vec<u8>,
}

impl Read for TapReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.partial.extend_from_slice(&buf[..n]);
        while let Some(end) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            if line.trim_start_matches('\r').starts_with("error id=") {
                self.tap.statuses.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(n)
    }
}

fn tapped_client(server: &MockServer) -> (Client, Arc<Tap>) {
    let socket = TcpStream::connect(server.addr()).unwrap();
    let tap = Arc::new(Tap::default());

    let reader = TapReader {
        inner: socket.try_clone().unwrap(),
        tap: Arc::clone(&tap),
        partial: Vec::new(),
    };
    let writer = TapWriter {
        inner: socket.try_clone().unwrap(),
        tap: Arc::clone(&tap),
    };
    let stream = Stream::new(
        reader,
        writer,
        move || -> io::Result<()> {
            match socket.shutdown(Shutdown::Both) {
                Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
                other => other,
            }
        },
        server.addr(),
    );

    let client = Client::from_stream(stream, common::test_config()).unwrap();
    (client, tap)
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_concurrent_commands_never_interleave() {
    let server = MockServer::start();
    let (client, tap) = tapped_client(&server);
    let client = Arc::new(client);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                for _ in 0..COMMANDS_PER_THREAD {
                    client.exec(&Command::new("version")).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tap.written.load(Ordering::SeqCst), THREADS * COMMANDS_PER_THREAD);
    assert_eq!(tap.statuses.load(Ordering::SeqCst), THREADS * COMMANDS_PER_THREAD);
    assert_eq!(tap.violations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_each_caller_gets_its_own_response() {
    let server = MockServer::start();
    let client = Arc::new(common::connect(&server));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                for _ in 0..COMMANDS_PER_THREAD {
                    match i % 4 {
                        0 => assert_eq!(client.version().unwrap().platform, "FreeBSD"),
                        1 => assert_eq!(client.server().list().unwrap().len(), 2),
                        2 => assert_eq!(client.whoami().unwrap().server_id, 18),
                        _ => {
                            let err = client.exec(&Command::new("bogus")).unwrap_err();
                            assert_eq!(err.query_id(), Some(256));
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(!client.is_closed());
}

// =============================================================================
// Queued Deadlines
// =============================================================================

#[test]
fn test_queued_command_times_out_while_waiting() {
    let server = MockServer::start();
    let client = Arc::new(common::connect(&server));

    let blocked = {
        let client = Arc::clone(&client);
        thread::spawn(move || {
            client.exec_with_timeout(&Command::new(common::HANG_COMMAND), Duration::from_secs(2))
        })
    };
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    let result = client.exec_with_timeout(&Command::new("version"), Duration::from_millis(100));
    let elapsed = started.elapsed();

    assert!(
        matches!(result, Err(QueryError::Timeout(budget)) if budget == Duration::from_millis(100)),
        "got {:?}",
        result
    );
    assert!(elapsed < Duration::from_secs(1), "waited {:?}", elapsed);

    // Nothing was written for the queued command, the connection stays up
    assert!(!client.is_closed());
    assert!(!server.received().contains(&"version".to_string()));

    assert!(matches!(blocked.join().unwrap(), Err(QueryError::Timeout(_))));
    assert!(client.is_closed());
}

#[test]
fn test_queued_command_sees_close_after_earlier_timeout() {
    let server = MockServer::start();
    let client = Arc::new(common::connect(&server));

    let slow = {
        let client = Arc::clone(&client);
        thread::spawn(move || {
            client.exec_with_timeout(&Command::new(common::HANG_COMMAND), Duration::from_millis(100))
        })
    };
    thread::sleep(Duration::from_millis(20));

    // The hang times out and closes the connection before this one gets a turn
    let result = client.exec_with_timeout(&Command::new("version"), Duration::from_secs(2));
    assert!(matches!(slow.join().unwrap(), Err(QueryError::Timeout(_))));
    assert!(matches!(result, Err(QueryError::Closed)), "got {:?}", result);
}

// =============================================================================
// Close While Busy
// =============================================================================

#[test]
fn test_close_interrupts_blocked_command() {
    let server = MockServer::start();
    let client = Arc::new(common::connect(&server));

    let (done_tx, done_rx) = mpsc::channel();
    let blocked = {
        let client = Arc::clone(&client);
        thread::spawn(move || {
            let started = Instant::now();
            let result = client.exec(&Command::new(common::HANG_COMMAND));
            done_tx.send((result, started.elapsed())).unwrap();
        })
    };

    thread::sleep(Duration::from_millis(100));
    client.close().unwrap();

    let (result, elapsed) = done_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(matches!(result, Err(QueryError::Closed)), "got {:?}", result);
    assert!(elapsed < Duration::from_secs(1));
    blocked.join().unwrap();

    // quit is skipped while another command holds the connection
    assert!(!server.received().contains(&"quit".to_string()));
}

#[test]
fn test_close_fails_queued_commands() {
    let server = MockServer::start();
    let client = Arc::new(common::connect(&server));

    let spawn_exec = |name: &'static str| {
        let client = Arc::clone(&client);
        thread::spawn(move || client.exec(&Command::new(name)))
    };

    let blocked = spawn_exec(common::HANG_COMMAND);
    thread::sleep(Duration::from_millis(50));
    let queued = spawn_exec("version");
    thread::sleep(Duration::from_millis(50));

    client.close().unwrap();

    assert!(matches!(blocked.join().unwrap(), Err(QueryError::Closed)));
    assert!(matches!(queued.join().unwrap(), Err(QueryError::Closed)));
}

#[test]
fn test_shared_client_closed_once() {
    let server = MockServer::start();
    let client = Arc::new(common::connect(&server));
    let closes = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            let closes = Arc::clone(&closes);
            thread::spawn(move || closes.lock().push(client.close().is_ok()))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(closes.lock().iter().all(|ok| *ok));
    assert!(client.is_closed());
    let quits = server.received().iter().filter(|line| *line == "quit").count();
    assert!(quits <= 1);
}

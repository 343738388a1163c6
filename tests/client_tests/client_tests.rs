//! Client Tests
//!
//! These tests verify:
//! - Command execution and status line handling
//! - Protocol errors leave the connection usable
//! - Session commands (login, use, whoami, quit, disconnect)
//! - Timeouts and close semantics
//! - A failed write leaves the client closed

#[path = "../common/mod.rs"]
mod common;

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use common::MockServer;
use serde::Deserialize;
use ts3query::error::ERR_COMMAND_NOT_FOUND;
use ts3query::transport::Stream;
use ts3query::{Client, Command, QueryError};

// =============================================================================
// Execution
// =============================================================================

#[test]
fn test_exec_returns_records() {
    let server = MockServer::start();
    let client = common::connect(&server);

    let records = client.exec(&Command::new("serverlist")).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("virtualserver_name").as_deref(), Some("Server #1"));
    assert_eq!(records[1].get("virtualserver_name").as_deref(), Some("Server #2"));
}

#[test]
fn test_exec_without_data_returns_empty_set() {
    let server = MockServer::start();
    let client = common::connect(&server);

    let records = client.exec(&Command::new("serveredit").option("virtualserver_maxclients", 10)).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_unknown_command_is_protocol_error() {
    let server = MockServer::start();
    let client = common::connect(&server);

    match client.exec(&Command::new("bogus")) {
        Err(QueryError::Query(e)) => {
            assert_eq!(e.id, ERR_COMMAND_NOT_FOUND);
            assert_eq!(e.message, "command not found");
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_protocol_error_keeps_connection_usable() {
    let server = MockServer::start();
    let client = common::connect(&server);

    let err = client.exec(&Command::new("bogus")).unwrap_err();
    assert_eq!(err.query_id(), Some(256));
    assert!(!client.is_closed());

    let version = client.version().unwrap();
    assert_eq!(version.platform, "FreeBSD");
}

#[test]
fn test_exec_into_and_exec_one() {
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Summary {
        virtualserver_id: u32,
        virtualserver_autostart: bool,
    }

    let server = MockServer::start();
    let client = common::connect(&server);

    let all: Vec<Summary> = client.exec_into(&Command::new("serverlist")).unwrap();
    assert_eq!(all.iter().map(|s| s.virtualserver_id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(all.iter().all(|s| s.virtualserver_autostart));

    let first: Summary = client.exec_one(&Command::new("serverlist")).unwrap();
    assert_eq!(first.virtualserver_id, 1);
}

#[test]
fn test_exec_one_without_records_is_decode_error() {
    #[derive(Debug, Default, Deserialize)]
    struct Anything {}

    let server = MockServer::start();
    let client = common::connect(&server);

    let result = client.exec_one::<Anything>(&Command::new("logout"));
    assert!(matches!(result, Err(QueryError::Decode(_))));
}

#[test]
fn test_commands_sent_escaped() {
    let server = MockServer::start();
    let client = common::connect(&server);

    client.server().create("my server").unwrap();
    client.login("serveradmin", "pass word").unwrap();

    let received = server.received();
    assert!(received.contains(&"servercreate virtualserver_name=my\\sserver".to_string()));
    assert!(received.contains(&"login serveradmin pass\\sword".to_string()));
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn test_session_commands() {
    let server = MockServer::start();
    let client = common::connect(&server);

    client.login("serveradmin", "secret").unwrap();
    client.use_server(1).unwrap();
    client.use_port(9987).unwrap();

    let me = client.whoami().unwrap();
    assert_eq!(me.server_id, 18);
    assert_eq!(me.server_port, 9987);
    assert_eq!(me.nickname, "serveradmin from 127.0.0.1:49725");
    assert_eq!(me.server_unique_identifier, "gNITtWtKs9+Uh3L4LKv8/YHsn5c=");

    client.logout().unwrap();

    let received = server.received();
    assert!(received.contains(&"use sid=1".to_string()));
    assert!(received.contains(&"use port=9987".to_string()));
}

#[test]
fn test_version() {
    let server = MockServer::start();
    let client = common::connect(&server);

    let version = client.version().unwrap();
    assert_eq!(version.version, "3.0.12.2");
    assert_eq!(version.build, 1455547898);
    assert_eq!(version.platform, "FreeBSD");
}

#[test]
fn test_quit_then_commands_fail_closed() {
    let server = MockServer::start();
    let client = common::connect(&server);

    let records = client.exec(&Command::new("quit")).unwrap();
    assert!(records.is_empty());
    assert!(client.is_closed());
    assert!(matches!(client.version(), Err(QueryError::Closed)));
}

#[test]
fn test_disconnect_is_clean_eof() {
    let server = MockServer::start();
    let client = common::connect(&server);

    // The server closes without a status line
    let records = client.exec(&Command::new("disconnect")).unwrap();
    assert!(records.is_empty());
    assert!(client.is_closed());
}

#[test]
fn test_server_drop_is_closed_error() {
    let server = MockServer::start();
    let client = common::connect(&server);
    client.version().unwrap();

    server.drop_connections();

    match client.exec(&Command::new("version")) {
        Err(QueryError::Closed) | Err(QueryError::Io(_)) => {}
        other => panic!("expected closed stream, got {:?}", other),
    }
}

// =============================================================================
// Write Failures
// =============================================================================

/// Passes `budget` bytes through, then fails every write
struct StallingWriter {
    inner: TcpStream,
    budget: usize,
}

impl Write for StallingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write stalled"));
        }
        let n = buf.len().min(self.budget);
        self.inner.write_all(&buf[..n])?;
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn stalling_client(server: &MockServer, budget: usize) -> Client {
    let socket = TcpStream::connect(server.addr()).unwrap();
    let writer = StallingWriter {
        inner: socket.try_clone().unwrap(),
        budget,
    };
    let stream = Stream::new(
        socket.try_clone().unwrap(),
        writer,
        move || -> io::Result<()> {
            match socket.shutdown(Shutdown::Both) {
                Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
                other => other,
            }
        },
        server.addr(),
    );
    Client::from_stream(stream, common::test_config()).unwrap()
}

#[test]
fn test_partial_write_closes_connection() {
    let server = MockServer::start();
    let client = stalling_client(&server, 4);

    let first = client.exec(&Command::new("version"));
    match first {
        Err(QueryError::Io(ref e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        ref other => panic!("expected io error, got {:?}", other),
    }

    // Half a command is on the wire, nothing more may follow it
    assert!(client.is_closed());
    assert!(matches!(client.exec(&Command::new("version")), Err(QueryError::Closed)));

    thread::sleep(Duration::from_millis(100));
    let received = server.received();
    assert!(received.iter().all(|line| line.len() <= 4), "got {:?}", received);
}

#[test]
fn test_write_within_budget_succeeds() {
    let server = MockServer::start();
    let client = stalling_client(&server, 64);

    assert_eq!(client.version().unwrap().platform, "FreeBSD");
    assert!(!client.is_closed());
}

// =============================================================================
// Timeouts
// =============================================================================

#[test]
fn test_timeout_closes_connection() {
    let server = MockServer::start();
    let client = common::connect(&server);

    let started = Instant::now();
    let result = client.exec_with_timeout(&Command::new(common::HANG_COMMAND), Duration::from_millis(100));
    match result {
        Err(QueryError::Timeout(budget)) => assert_eq!(budget, Duration::from_millis(100)),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(1));

    // A late response could be mistaken for the next one, so the client is unusable
    assert!(client.is_closed());
    assert!(matches!(client.version(), Err(QueryError::Closed)));
}

#[test]
fn test_configured_command_timeout_applies() {
    let server = MockServer::start();
    let client = common::connect(&server);
    assert_eq!(client.config().command_timeout(), Some(Duration::from_secs(2)));

    let result = client.exec(&Command::new(common::HANG_COMMAND));
    assert!(matches!(result, Err(QueryError::Timeout(_))));
}

// =============================================================================
// Close
// =============================================================================

#[test]
fn test_close_sends_quit() {
    let server = MockServer::start();
    let client = common::connect(&server);

    client.close().unwrap();
    assert!(client.is_closed());
    assert_eq!(server.received().last().map(String::as_str), Some("quit"));
}

#[test]
fn test_close_is_idempotent() {
    let server = MockServer::start();
    let client = common::connect(&server);

    client.close().unwrap();
    client.close().unwrap();
    assert!(matches!(client.exec(&Command::new("version")), Err(QueryError::Closed)));
}

#[test]
fn test_close_after_quit() {
    let server = MockServer::start();
    let client = common::connect(&server);

    client.exec(&Command::new("quit")).unwrap();
    client.close().unwrap();
}

//! Transport Module
//!
//! Byte streams that carry a ServerQuery session, and the line transport
//! built on top of them.
//!
//! ## Architecture
//! - `tcp`: direct socket
//! - `ssh`: session tunneled through the system ssh client, behind a gate
//!   that holds reads/writes until the channel exists
//! - `lines`: background reader thread framing `\n\r` lines onto a channel
//! - `handshake`: header check and banner skip on connect
//!
//! Both stream kinds end up as the same [`Stream`], so everything above
//! this module is unaware of which one is in use.

mod handshake;
mod lines;
pub mod ssh;
pub mod tcp;

use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr};

use crate::config::{Config, TransportKind};
use crate::error::Result;

pub use lines::{Closer, Deadline, Transport};

/// Tears a stream down from any thread, unblocking pending reads.
///
/// Implementations must tolerate being called on an already closed stream.
pub trait Shutdown: Send + Sync {
    fn shutdown(&self) -> io::Result<()>;
}

impl<F> Shutdown for F
where
    F: Fn() -> io::Result<()> + Send + Sync,
{
    fn shutdown(&self) -> io::Result<()> {
        self()
    }
}

/// What carries the bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Tcp,
    Ssh,
    /// Caller supplied stream (test doubles, custom tunnels)
    Custom,
}

/// A connected byte stream split into owned halves
pub struct Stream {
    pub(crate) reader: Box<dyn Read + Send>,
    pub(crate) writer: Box<dyn Write + Send>,
    pub(crate) shutdown: Box<dyn Shutdown>,
    pub(crate) kind: StreamKind,
    pub(crate) peer: String,
}

impl Stream {
    /// Wrap arbitrary halves; `shutdown` must make a blocked `reader` return
    pub fn new(
        reader: impl Read + Send + 'static,
        writer: impl Write + Send + 'static,
        shutdown: impl Shutdown + 'static,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            shutdown: Box::new(shutdown),
            kind: StreamKind::Custom,
            peer: peer.into(),
        }
    }

    pub(crate) fn with_kind(mut self, kind: StreamKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

/// Open the stream selected by `config`
pub fn connect(addr: &str, config: &Config) -> Result<Stream> {
    let addr = with_default_port(addr, config.default_port());
    match &config.transport {
        TransportKind::Direct => tcp::connect(&addr, config),
        TransportKind::Ssh(ssh) => ssh::connect(&addr, config, ssh),
    }
}

/// Append `port` unless `addr` already carries one
pub fn with_default_port(addr: &str, port: u16) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return SocketAddr::new(ip, port).to_string();
    }
    if addr.starts_with('[') && addr.ends_with(']') {
        return format!("{}:{}", addr, port);
    }
    match addr.rsplit_once(':') {
        Some((_, p)) if p.parse::<u16>().is_ok() => addr.to_string(),
        _ => format!("{}:{}", addr, port),
    }
}

/// Split `host:port`, dropping IPv6 brackets
pub(crate) fn split_host_port(addr: &str) -> Option<(String, u16)> {
    let (host, port) = addr.rsplit_once(':')?;
    let port = port.parse().ok()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Some((host.to_string(), port))
}

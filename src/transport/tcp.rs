//! Direct TCP stream

use std::io::{self, BufWriter};
use std::net::{Shutdown as SocketShutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{QueryError, Result};
use super::{Stream, StreamKind};

/// Connect to `addr`, trying every resolved address in turn
pub fn connect(addr: &str, config: &Config) -> Result<Stream> {
    let candidates: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
    let mut last_error = None;

    for candidate in candidates {
        let attempt = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
            None => TcpStream::connect(candidate),
        };
        match attempt {
            Ok(socket) => return from_socket(socket, config),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => QueryError::Io(e),
        None => QueryError::Config(format!("address {} did not resolve", addr)),
    })
}

/// Wrap an already connected socket
pub fn from_socket(socket: TcpStream, config: &Config) -> Result<Stream> {
    let peer = socket
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    // Disable Nagle's algorithm, every command is a single small write
    socket.set_nodelay(true)?;
    socket.set_write_timeout(config.write_timeout())?;

    let reader = socket.try_clone()?;
    let control = socket.try_clone()?;

    let stream = Stream::new(
        reader,
        BufWriter::new(socket),
        move || shutdown_socket(&control),
        peer,
    );
    Ok(stream.with_kind(StreamKind::Tcp))
}

fn shutdown_socket(socket: &TcpStream) -> io::Result<()> {
    match socket.shutdown(SocketShutdown::Both) {
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

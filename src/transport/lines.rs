//! Line transport
//!
//! A reader thread frames incoming bytes into lines and hands them over a
//! channel. Reads wait on that channel, the close signal and an optional
//! deadline at the same time, so a blocked read can always be abandoned.
//!
//! ```text
//!   Stream.reader ──► reader thread ──lines──┐
//!                                            ├──► select! ──► read_line()
//!   Closer::close() ──────────signal─────────┤
//!   Deadline ────────────────────────────────┘
//! ```

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{QueryError, Result};
use super::handshake::Handshake;
use super::{Shutdown, Stream, StreamKind};

/// Read chunk size for the reader thread
const READ_CHUNK: usize = 4096;

/// Point in time a read gives up, along with the budget it came from
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before the deadline passes, zero once it has
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

/// Shared close handle.
///
/// Closing is idempotent and may happen from any thread, including while
/// another thread is blocked in [`Transport::read_line`].
pub struct Closer {
    signal: Mutex<Option<Sender<()>>>,
    closed: AtomicBool,
    shutdown: Box<dyn Shutdown>,
}

impl Closer {
    fn new(signal: Sender<()>, shutdown: Box<dyn Shutdown>) -> Self {
        Self {
            signal: Mutex::new(Some(signal)),
            closed: AtomicBool::new(false),
            shutdown,
        }
    }

    /// Close the stream; later calls are no-ops
    pub fn close(&self) -> Result<()> {
        let signal = self.signal.lock().take();
        if signal.is_none() {
            return Ok(());
        }
        self.closed.store(true, Ordering::SeqCst);
        // Dropping the sender wakes every select! waiting on the signal
        drop(signal);
        self.shutdown.shutdown()?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Line oriented view of a [`Stream`]
pub struct Transport {
    writer: Box<dyn Write + Send>,
    lines: Receiver<io::Result<String>>,
    closing: Receiver<()>,
    closer: Arc<Closer>,
    kind: StreamKind,
    peer: String,
}

impl Transport {
    /// Start the reader thread and run the handshake.
    ///
    /// The stream is closed again if the handshake fails.
    pub fn open(stream: Stream, config: &Config) -> Result<Self> {
        let mut transport = Self::start(stream)?;
        if let Err(e) = Handshake::perform(&mut transport, config) {
            let _ = transport.close();
            return Err(e);
        }
        Ok(transport)
    }

    fn start(stream: Stream) -> Result<Self> {
        let Stream {
            reader,
            writer,
            shutdown,
            kind,
            peer,
        } = stream;

        let (line_tx, line_rx) = channel::unbounded();
        let (signal_tx, signal_rx) = channel::bounded(0);

        thread::Builder::new()
            .name("ts3query-reader".to_string())
            .spawn(move || read_lines(reader, line_tx))?;

        Ok(Self {
            writer,
            lines: line_rx,
            closing: signal_rx,
            closer: Arc::new(Closer::new(signal_tx, shutdown)),
            kind,
            peer,
        })
    }

    /// Next line without its terminator; `None` once the far end closed.
    pub fn read_line(&mut self, deadline: Option<Deadline>) -> Result<Option<String>> {
        let timeout = match deadline {
            Some(d) => channel::at(d.at),
            None => channel::never(),
        };

        crossbeam::select! {
            recv(self.lines) -> msg => match msg {
                Ok(Ok(line)) => {
                    tracing::trace!("{} <- {}", self.peer, line);
                    Ok(Some(line))
                }
                Ok(Err(_)) | Err(_) if self.closer.is_closed() => Err(QueryError::Closed),
                Ok(Err(e)) => Err(e.into()),
                Err(_) => Ok(None),
            },
            recv(self.closing) -> _ => Err(QueryError::Closed),
            recv(timeout) -> _ => Err(QueryError::Timeout(
                deadline.map(|d| d.budget).unwrap_or_default(),
            )),
        }
    }

    /// Write one already terminated line
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        if self.closer.is_closed() {
            return Err(QueryError::Closed);
        }
        let written = self.writer.write_all(line).and_then(|_| self.writer.flush());
        match written {
            Ok(()) => {
                // Arguments may carry credentials, only the command word is logged
                let name = line.split(|&b| b == b' ' || b == b'\n').next().unwrap_or_default();
                tracing::trace!(
                    "{} -> {} ({} bytes)",
                    self.peer,
                    String::from_utf8_lossy(name),
                    line.len()
                );
                Ok(())
            }
            Err(_) if self.closer.is_closed() => Err(QueryError::Closed),
            Err(e) => Err(e.into()),
        }
    }

    pub fn closer(&self) -> Arc<Closer> {
        Arc::clone(&self.closer)
    }

    pub fn close(&self) -> Result<()> {
        self.closer.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

/// Reader thread body: frame lines until EOF, an error, or nobody listens.
///
/// Lines end at `\n`; surrounding `\r` is stripped, which covers the
/// server's `\n\r` as well as `\r\n`.
fn read_lines(mut reader: Box<dyn Read + Send>, lines: Sender<io::Result<String>>) {
    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
            let mut line = buf.split_to(pos + 1);
            line.truncate(pos);
            while line.first() == Some(&b'\r') {
                line.advance(1);
            }
            while line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            let text = String::from_utf8_lossy(&line).into_owned();
            if lines.send(Ok(text)).is_err() {
                return;
            }
        }

        match reader.read(&mut chunk) {
            Ok(0) => {
                tracing::debug!("Stream reached EOF");
                return;
            }
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = lines.send(Err(e));
                return;
            }
        }
    }
}

//! Executor Module
//!
//! Runs one command at a time over the line transport.
//!
//! ## Round Trip
//! 1. Encode the command and write it as one line
//! 2. Read lines, decoding each as data, until the `error ...` status line
//! 3. Status id 0: return the collected records; otherwise a protocol error
//!
//! The transport lock is held for the whole round trip, so commands from
//! different threads never interleave on the wire and responses come back
//! in submission order.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{QueryError, Result};
use crate::protocol::{decode_line, decode_status, encode_command, Command, RecordSet};
use crate::transport::{Closer, Deadline, Transport};

/// Serializes command round trips over one transport
pub struct Executor {
    /// Exclusive access for a full write-then-read-until-status sequence
    transport: Mutex<Transport>,

    /// Close handle usable without the lock, so a blocked read can be
    /// interrupted from another thread
    closer: Arc<Closer>,
}

impl Executor {
    pub fn new(transport: Transport) -> Self {
        let closer = transport.closer();
        Self {
            transport: Mutex::new(transport),
            closer,
        }
    }

    /// Execute `command`, waiting at most `timeout` for its response.
    ///
    /// The budget covers the wait for a command already in flight as well as
    /// the round trip itself. Running out while still queued returns
    /// [`QueryError::Timeout`] and leaves the connection open, since nothing
    /// was written. A timeout after the write leaves the stream in an unknown
    /// position, so the transport is closed and every later call fails with
    /// [`QueryError::Closed`].
    pub fn execute(&self, command: &Command, timeout: Option<Duration>) -> Result<RecordSet> {
        let deadline = timeout.map(Deadline::after);
        let mut transport = match deadline {
            Some(d) => match self.transport.try_lock_for(d.remaining()) {
                Some(transport) => transport,
                None => {
                    tracing::debug!(
                        "{} gave up after {:?} waiting for the connection",
                        command.name(),
                        d.budget()
                    );
                    return Err(QueryError::Timeout(d.budget()));
                }
            },
            None => self.transport.lock(),
        };
        self.round_trip(&mut transport, command, deadline)
    }

    /// Like [`execute`](Self::execute), but gives up immediately with `None`
    /// when another command is in flight
    pub fn try_execute(
        &self,
        command: &Command,
        timeout: Option<Duration>,
    ) -> Option<Result<RecordSet>> {
        let deadline = timeout.map(Deadline::after);
        let mut transport = self.transport.try_lock()?;
        Some(self.round_trip(&mut transport, command, deadline))
    }

    pub fn closer(&self) -> Arc<Closer> {
        Arc::clone(&self.closer)
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn round_trip(
        &self,
        transport: &mut Transport,
        command: &Command,
        deadline: Option<Deadline>,
    ) -> Result<RecordSet> {
        if transport.is_closed() {
            return Err(QueryError::Closed);
        }

        tracing::trace!(command = command.name(), "Executing");
        match transport.write_line(&encode_command(command)) {
            Ok(()) => {}
            Err(QueryError::Closed) => return Err(QueryError::Closed),
            Err(e) => {
                // Part of the line may already be on the wire
                tracing::warn!("Writing {} failed, closing connection: {}", command.name(), e);
                self.shutdown();
                return Err(e);
            }
        }

        let mut records = RecordSet::new();
        loop {
            let line = match transport.read_line(deadline) {
                Ok(Some(line)) => line,
                Ok(None) if command.ends_session() => {
                    tracing::debug!("Server ended the session after {}", command.name());
                    self.shutdown();
                    return Ok(RecordSet::new());
                }
                Ok(None) => {
                    tracing::warn!("Stream closed while waiting for {} response", command.name());
                    self.shutdown();
                    return Err(QueryError::Closed);
                }
                Err(QueryError::Timeout(budget)) => {
                    tracing::warn!(
                        "{} timed out after {:?}, closing connection",
                        command.name(),
                        budget
                    );
                    self.shutdown();
                    return Err(QueryError::Timeout(budget));
                }
                Err(e) => return Err(e),
            };

            let status = match decode_status(&line)? {
                Some(status) => status,
                None => {
                    records.extend(decode_line(&line));
                    continue;
                }
            };

            if let Err(e) = status.into_result() {
                tracing::debug!("{} failed: {}", command.name(), e);
                return Err(QueryError::Query(e));
            }

            if command.ends_session() {
                self.shutdown();
            }
            return Ok(records);
        }
    }

    fn shutdown(&self) {
        if let Err(e) = self.closer.close() {
            tracing::warn!("Error closing transport: {}", e);
        }
    }
}

//! Client Module
//!
//! The entry point for talking to a server: connects, runs the handshake,
//! executes commands and maps their results.
//!
//! A [`Client`] is `Send + Sync`; share it behind an `Arc` to issue commands
//! from several threads. They are executed one at a time.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{DecodeError, QueryError, Result};
use crate::executor::Executor;
use crate::mapping::{from_record, from_records};
use crate::protocol::{Command, RecordSet};
use crate::resources::{ServerMethods, Version, WhoAmI};
use crate::transport::{self, Closer, Stream, StreamKind, Transport};

/// How long `close` waits for the server to acknowledge `quit`
const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// A connected ServerQuery session
pub struct Client {
    executor: Executor,
    closer: Arc<Closer>,
    config: Config,
    kind: StreamKind,
    peer: String,
}

impl Client {
    /// Connect to `addr` using the transport selected in `config`.
    ///
    /// `addr` may omit the port; the transport's default port is used then.
    pub fn connect(addr: &str, config: Config) -> Result<Self> {
        let stream = transport::connect(addr, &config)?;
        Self::from_stream(stream, config)
    }

    /// Run the handshake on an already established stream
    pub fn from_stream(stream: Stream, config: Config) -> Result<Self> {
        let transport = Transport::open(stream, &config)?;
        let kind = transport.kind();
        let peer = transport.peer().to_string();
        tracing::info!("Connected to {} ({:?})", peer, kind);

        let executor = Executor::new(transport);
        Ok(Self {
            closer: executor.closer(),
            executor,
            config,
            kind,
            peer,
        })
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute with the configured command timeout
    pub fn exec(&self, command: &Command) -> Result<RecordSet> {
        self.executor.execute(command, self.config.command_timeout())
    }

    /// Execute with an explicit deadline for this call only
    pub fn exec_with_timeout(&self, command: &Command, timeout: Duration) -> Result<RecordSet> {
        self.executor.execute(command, Some(timeout))
    }

    /// Execute and map every record onto `T`
    pub fn exec_into<T: DeserializeOwned>(&self, command: &Command) -> Result<Vec<T>> {
        let records = self.exec(command)?;
        Ok(from_records(&records)?)
    }

    /// Execute and map the first record onto `T`
    pub fn exec_one<T: DeserializeOwned>(&self, command: &Command) -> Result<T> {
        let records = self.exec(command)?;
        match records.first() {
            Some(record) => Ok(from_record(record)?),
            None => Err(DecodeError::new(format!(
                "{} returned no records",
                command.name()
            ))
            .into()),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Server version information
    pub fn version(&self) -> Result<Version> {
        self.exec_one(&Command::new("version"))
    }

    /// Authenticate as a query login
    pub fn login(&self, user: &str, password: &str) -> Result<()> {
        self.exec(&Command::new("login").arg(user).arg(password))?;
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.exec(&Command::new("logout"))?;
        Ok(())
    }

    /// Select the virtual server by id
    pub fn use_server(&self, id: u32) -> Result<()> {
        self.exec(&Command::new("use").option("sid", id))?;
        Ok(())
    }

    /// Select the virtual server by voice port
    pub fn use_port(&self, port: u16) -> Result<()> {
        self.exec(&Command::new("use").option("port", port))?;
        Ok(())
    }

    /// Details about the current session
    pub fn whoami(&self) -> Result<WhoAmI> {
        self.exec_one(&Command::new("whoami"))
    }

    /// Virtual server and instance commands
    pub fn server(&self) -> ServerMethods<'_> {
        ServerMethods::new(self)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// End the session.
    ///
    /// Sends `quit` when no other command is in flight, then shuts the
    /// stream down. A command blocked in another thread fails with
    /// [`QueryError::Closed`]. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.closer.is_closed() {
            return Ok(());
        }

        match self.executor.try_execute(&Command::new("quit"), Some(QUIT_TIMEOUT)) {
            Some(Err(QueryError::Closed)) | None => {}
            Some(Err(e)) => tracing::debug!("quit failed during close: {}", e),
            Some(Ok(_)) => {}
        }

        self.closer.close()?;
        tracing::info!("Closed connection to {}", self.peer);
        Ok(())
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

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(e) = self.closer.close() {
            tracing::warn!("Error closing connection to {}: {}", self.peer, e);
        }
    }
}

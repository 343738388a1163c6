//! Configuration for ts3query
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Header line every ServerQuery endpoint sends first
pub const DEFAULT_HEADER: &str = "TS3";

/// Default raw ServerQuery port
pub const DEFAULT_PORT: u16 = 10011;

/// Default SSH ServerQuery port
pub const DEFAULT_SSH_PORT: u16 = 10022;

/// Main configuration for a client connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Deadline for establishing the stream and completing the handshake (milliseconds, 0 = none)
    pub connect_timeout_ms: u64,

    /// Default per-command deadline (milliseconds, 0 = wait forever)
    pub command_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Handshake
    // -------------------------------------------------------------------------
    /// Read the first line and require it to equal `header`
    pub verify_header: bool,

    /// Expected header line
    pub header: String,

    /// Read and discard the welcome banner after the header
    pub skip_banner: bool,

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------
    pub transport: TransportKind,
}

/// Which byte stream carries the session
#[derive(Debug, Clone, Default)]
pub enum TransportKind {
    /// Plain TCP socket
    #[default]
    Direct,

    /// Session tunneled through the system `ssh` client
    Ssh(SshConfig),
}

/// How the `ssh` client treats unknown host keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Only hosts already in known_hosts
    #[default]
    Strict,

    /// Record new hosts, reject changed keys
    AcceptNew,

    /// Accept anything and never record (test setups only)
    Insecure,
}

/// SSH transport settings.
///
/// The client runs non-interactively (`BatchMode=yes`), so authentication is
/// key based or none at all; there is never a password prompt.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Remote login name
    pub user: String,

    /// Private key passed with `-i`
    pub identity_file: Option<PathBuf>,

    /// ssh executable
    pub program: PathBuf,

    pub host_key_policy: HostKeyPolicy,

    /// Additional `-o` options, as `Key=Value`
    pub extra_options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: "serveradmin".to_string(),
            identity_file: None,
            program: PathBuf::from("ssh"),
            host_key_policy: HostKeyPolicy::Strict,
            extra_options: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            command_timeout_ms: 0,
            write_timeout_ms: 5_000,
            verify_header: true,
            header: DEFAULT_HEADER.to_string(),
            skip_banner: true,
            transport: TransportKind::Direct,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Connect + handshake deadline, `None` when disabled
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }

    /// Per-command deadline, `None` when disabled
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_ms > 0).then(|| Duration::from_millis(self.command_timeout_ms))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// Port used when the address does not name one
    pub fn default_port(&self) -> u16 {
        match self.transport {
            TransportKind::Direct => DEFAULT_PORT,
            TransportKind::Ssh(_) => DEFAULT_SSH_PORT,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the connect + handshake timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the default per-command deadline (in milliseconds, 0 disables)
    pub fn command_timeout_ms(mut self, ms: u64) -> Self {
        self.config.command_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable header verification
    pub fn verify_header(mut self, verify: bool) -> Self {
        self.config.verify_header = verify;
        self
    }

    /// Set the expected header line
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.config.header = header.into();
        self
    }

    /// Enable or disable skipping the welcome banner
    pub fn skip_banner(mut self, skip: bool) -> Self {
        self.config.skip_banner = skip;
        self
    }

    /// Tunnel the session through ssh
    pub fn ssh(mut self, ssh: SshConfig) -> Self {
        self.config.transport = TransportKind::Ssh(ssh);
        self
    }

    /// Select the transport explicitly
    pub fn transport(mut self, transport: TransportKind) -> Self {
        self.config.transport = transport;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

//! SSH tunneled stream
//!
//! The session runs inside the system `ssh` client with stdin/stdout piped.
//! The client is started on a negotiation thread, so the stream handed back
//! from [`connect`] may not have a channel yet: reads and writes wait on a
//! gate until the channel is established, negotiation fails, or the stream is
//! closed.
//!
//! ```text
//!   caller ──read──► GatedReader ──wait──► ChannelGate ◄──establish── negotiation thread
//!                                              │
//!                                        close() wakes every waiter
//! ```

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::config::{Config, HostKeyPolicy, SshConfig};
use crate::error::{ChannelError, QueryError, Result};
use super::{split_host_port, Shutdown, Stream, StreamKind};

/// An established interactive channel
pub struct Channel {
    pub reader: Box<dyn Read + Send>,
    pub writer: Box<dyn Write + Send>,
    pub shutdown: Box<dyn Shutdown>,
}

impl Channel {
    pub fn new(
        reader: impl Read + Send + 'static,
        writer: impl Write + Send + 'static,
        shutdown: impl Shutdown + 'static,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            shutdown: Box::new(shutdown),
        }
    }
}

// =============================================================================
// Channel Gate
// =============================================================================

enum GateState {
    Pending,
    Ready {
        reader: Option<Box<dyn Read + Send>>,
        writer: Option<Box<dyn Write + Send>>,
        shutdown: Box<dyn Shutdown>,
    },
    Failed(String),
    Closed,
}

struct ChannelGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

fn channel_error(reason: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, ChannelError(reason.to_string()))
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "ssh channel closed")
}

impl ChannelGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Pending),
            changed: Condvar::new(),
        }
    }

    fn establish(&self, channel: Channel) {
        let mut state = self.state.lock();
        if !matches!(*state, GateState::Pending) {
            // Closed while negotiating
            drop(state);
            let _ = channel.shutdown.shutdown();
            return;
        }
        *state = GateState::Ready {
            reader: Some(channel.reader),
            writer: Some(channel.writer),
            shutdown: channel.shutdown,
        };
        self.changed.notify_all();
    }

    fn fail(&self, reason: String) {
        let mut state = self.state.lock();
        if matches!(*state, GateState::Pending) {
            *state = GateState::Failed(reason);
        }
        self.changed.notify_all();
    }

    fn close(&self) -> io::Result<()> {
        let previous = {
            let mut state = self.state.lock();
            let previous = std::mem::replace(&mut *state, GateState::Closed);
            self.changed.notify_all();
            previous
        };
        match previous {
            GateState::Ready { shutdown, .. } => shutdown.shutdown(),
            _ => Ok(()),
        }
    }

    fn take_reader(&self) -> io::Result<Box<dyn Read + Send>> {
        let mut state = self.state.lock();
        while matches!(*state, GateState::Pending) {
            self.changed.wait(&mut state);
        }
        match &mut *state {
            GateState::Ready { reader, .. } => reader
                .take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "ssh reader already taken")),
            GateState::Failed(reason) => Err(channel_error(reason)),
            GateState::Closed | GateState::Pending => Err(closed_error()),
        }
    }

    fn take_writer(&self) -> io::Result<Box<dyn Write + Send>> {
        let mut state = self.state.lock();
        while matches!(*state, GateState::Pending) {
            self.changed.wait(&mut state);
        }
        match &mut *state {
            GateState::Ready { writer, .. } => writer
                .take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "ssh writer already taken")),
            GateState::Failed(reason) => Err(channel_error(reason)),
            GateState::Closed | GateState::Pending => Err(closed_error()),
        }
    }
}

struct GatedReader {
    gate: Arc<ChannelGate>,
    inner: Option<Box<dyn Read + Send>>,
}

impl Read for GatedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.is_none() {
            self.inner = Some(self.gate.take_reader()?);
        }
        match self.inner.as_mut() {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}

struct GatedWriter {
    gate: Arc<ChannelGate>,
    inner: Option<Box<dyn Write + Send>>,
}

impl GatedWriter {
    fn channel(&mut self) -> io::Result<&mut Box<dyn Write + Send>> {
        if self.inner.is_none() {
            self.inner = Some(self.gate.take_writer()?);
        }
        self.inner.as_mut().ok_or_else(closed_error)
    }
}

impl Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel()?.flush()
    }
}

/// Build a stream whose channel is produced by `establish` on a background
/// thread. Reads and writes block until it is available.
pub fn gated<F>(peer: impl Into<String>, establish: F) -> Result<Stream>
where
    F: FnOnce() -> io::Result<Channel> + Send + 'static,
{
    let gate = Arc::new(ChannelGate::new());
    let negotiating = Arc::clone(&gate);

    thread::Builder::new()
        .name("ts3query-ssh-negotiate".to_string())
        .spawn(move || match establish() {
            Ok(channel) => {
                tracing::debug!("SSH channel established");
                negotiating.establish(channel);
            }
            Err(e) => {
                tracing::warn!("SSH channel negotiation failed: {}", e);
                negotiating.fail(e.to_string());
            }
        })?;

    let closing = Arc::clone(&gate);
    let stream = Stream::new(
        GatedReader {
            gate: Arc::clone(&gate),
            inner: None,
        },
        GatedWriter { gate, inner: None },
        move || closing.close(),
        peer,
    );
    Ok(stream.with_kind(StreamKind::Ssh))
}

// =============================================================================
// System ssh client
// =============================================================================

/// Start an ssh session to `addr` (`host:port`)
pub fn connect(addr: &str, config: &Config, ssh: &SshConfig) -> Result<Stream> {
    let (host, port) = split_host_port(addr)
        .ok_or_else(|| QueryError::Config(format!("invalid ssh address {}", addr)))?;
    let command = ssh_command(&host, port, config, ssh);

    tracing::debug!("Starting ssh session to {}@{}:{}", ssh.user, host, port);
    gated(format!("ssh://{}@{}:{}", ssh.user, host, port), move || {
        spawn_session(command)
    })
}

/// Command line for a non-interactive shell session
fn ssh_command(host: &str, port: u16, config: &Config, ssh: &SshConfig) -> Command {
    let mut command = Command::new(&ssh.program);
    command
        .arg("-T")
        .arg("-p")
        .arg(port.to_string())
        .arg("-o")
        .arg("BatchMode=yes");

    if let Some(timeout) = config.connect_timeout() {
        let secs = (timeout.as_millis() as u64 + 999) / 1000;
        command.arg("-o").arg(format!("ConnectTimeout={}", secs));
    }

    match ssh.host_key_policy {
        HostKeyPolicy::Strict => {
            command.arg("-o").arg("StrictHostKeyChecking=yes");
        }
        HostKeyPolicy::AcceptNew => {
            command.arg("-o").arg("StrictHostKeyChecking=accept-new");
        }
        HostKeyPolicy::Insecure => {
            command
                .arg("-o")
                .arg("StrictHostKeyChecking=no")
                .arg("-o")
                .arg("UserKnownHostsFile=/dev/null");
        }
    }

    if let Some(identity) = &ssh.identity_file {
        command
            .arg("-i")
            .arg(identity)
            .arg("-o")
            .arg("IdentitiesOnly=yes");
    }

    for option in &ssh.extra_options {
        command.arg("-o").arg(option);
    }

    command.arg("-l").arg(&ssh.user).arg(host);
    command
}

fn spawn_session(mut command: Command) -> io::Result<Channel> {
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|e| channel_error(&format!("failed to start ssh: {}", e)))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| channel_error("ssh stdin unavailable"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| channel_error("ssh stdout unavailable"))?;
    if let Some(stderr) = child.stderr.take() {
        forward_stderr(stderr);
    }

    let child = Mutex::new(child);
    Ok(Channel::new(stdout, stdin, move || stop_child(&child)))
}

/// Relay ssh diagnostics (auth failures, host key problems) to the log
fn forward_stderr(stderr: ChildStderr) {
    let spawned = thread::Builder::new()
        .name("ts3query-ssh-stderr".to_string())
        .spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                tracing::debug!(target: "ts3query::ssh", "{}", line);
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Could not start ssh stderr relay: {}", e);
    }
}

fn stop_child(child: &Mutex<Child>) -> io::Result<()> {
    let mut child = child.lock();
    if child.try_wait()?.is_some() {
        return Ok(());
    }
    match child.kill() {
        Err(e) if e.kind() != io::ErrorKind::InvalidInput => return Err(e),
        _ => {}
    }
    child.wait().map(|_| ())
}

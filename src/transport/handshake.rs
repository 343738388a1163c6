//! Connect-time handshake
//!
//! The server greets with a fixed header line, then a one line welcome
//! banner. Both are read before the first command may be sent.

use crate::config::Config;
use crate::error::{QueryError, Result};
use super::lines::{Deadline, Transport};
use super::StreamKind;

/// Handshake progress; lives only for the duration of connect
#[derive(Debug, Default)]
pub(crate) struct Handshake {
    header_seen: bool,
    banner_seen: bool,
}

impl Handshake {
    /// Consume header and banner as configured
    pub(crate) fn perform(transport: &mut Transport, config: &Config) -> Result<()> {
        let deadline = config.connect_timeout().map(Deadline::after);
        let mut state = Handshake {
            header_seen: !config.verify_header,
            banner_seen: !config.skip_banner,
        };

        if !state.header_seen {
            let line = next_line(transport, deadline, "header")?;
            if line != config.header {
                return Err(QueryError::Handshake {
                    expected: config.header.clone(),
                    received: line,
                });
            }
            tracing::debug!("Header {:?} verified", line);
            state.header_seen = true;
        }

        if !state.banner_seen {
            let banner = next_line(transport, deadline, "banner")?;
            tracing::debug!("Skipped banner: {}", banner);
            state.banner_seen = true;
        }

        debug_assert!(state.is_complete());
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.header_seen && self.banner_seen
    }
}

fn next_line(transport: &mut Transport, deadline: Option<Deadline>, what: &str) -> Result<String> {
    match transport.read_line(deadline)? {
        Some(line) => Ok(line),
        None if transport.kind() == StreamKind::Ssh => Err(QueryError::Ssh(format!(
            "channel closed before {} (authentication or channel negotiation failed)",
            what
        ))),
        None => Err(QueryError::Closed),
    }
}

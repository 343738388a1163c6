//! # ts3query
//!
//! A synchronous client for the ServerQuery administration protocol:
//! - Direct TCP or SSH tunneled sessions behind one stream interface
//! - Header check and banner skip on connect
//! - Escape aware record decoding and declarative struct mapping
//! - One command in flight per connection, with per-call deadlines
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Client  /  ServerMethods                     │
//! │              (exec, exec_into, typed calls)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Executor                                │
//! │        (lock held for write + read-until-status)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │  Transport  │
//!   │ (codec,     │          │ (lines,     │
//!   │  escapes)   │          │  handshake) │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                 ┌──────┴──────┐
//!   ┌─────────────┐          ▼             ▼
//!   │   Mapping   │       ┌─────┐     ┌─────┐
//!   │   (serde)   │       │ TCP │     │ SSH │
//!   └─────────────┘       └─────┘     └─────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ts3query::{Client, Config};
//!
//! # fn main() -> ts3query::Result<()> {
//! let client = Client::connect("127.0.0.1", Config::default())?;
//! client.login("serveradmin", "secret")?;
//! client.use_server(1)?;
//! for server in client.server().list()? {
//!     println!("{} {}", server.id, server.name);
//! }
//! client.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod mapping;
pub mod transport;
pub mod executor;
pub mod client;
pub mod resources;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, ProtocolError, QueryError, Result};
pub use config::Config;
pub use client::Client;
pub use protocol::{Command, Record, RecordSet};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ts3query
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

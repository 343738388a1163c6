//! Protocol Module
//!
//! Defines the ServerQuery line protocol.
//!
//! ## Session
//! ```text
//! server: TS3\n\r                               header
//! server: Welcome to the ... interface\n\r      banner
//! client: serverlist\n
//! server: virtualserver_id=1 ...|virtualserver_id=2 ...\n\r
//! server: error id=0 msg=ok\n\r
//! ```
//!
//! ### Status Codes
//! - 0: OK
//! - 256: command not found
//! - anything else: named protocol error, see `msg`

mod escape;
mod command;
mod response;
mod codec;

pub use escape::{escape, unescape};
pub use command::{ArgValue, Command};
pub use response::{Record, RecordSet, StatusLine};
pub use codec::{
    decode_line, decode_record, decode_status, encode_command, is_status_line, STATUS_PREFIX,
};

//! Online and database clients

use std::fmt;

use serde::Deserialize;

use crate::mapping::Timestamp;

/// Extra field groups `clientlist` sends on request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientListFlag {
    Uid,
    Away,
    Voice,
    Times,
    Groups,
    Info,
    Icon,
    Country,
    Ip,
    Badges,
}

impl ClientListFlag {
    /// Every flag, in the order the server documents them
    pub const ALL: [ClientListFlag; 10] = [
        ClientListFlag::Uid,
        ClientListFlag::Away,
        ClientListFlag::Voice,
        ClientListFlag::Times,
        ClientListFlag::Groups,
        ClientListFlag::Info,
        ClientListFlag::Icon,
        ClientListFlag::Country,
        ClientListFlag::Ip,
        ClientListFlag::Badges,
    ];

    /// Wire token, e.g. `-uid`
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientListFlag::Uid => "-uid",
            ClientListFlag::Away => "-away",
            ClientListFlag::Voice => "-voice",
            ClientListFlag::Times => "-times",
            ClientListFlag::Groups => "-groups",
            ClientListFlag::Info => "-info",
            ClientListFlag::Icon => "-icon",
            ClientListFlag::Country => "-country",
            ClientListFlag::Ip => "-ip",
            ClientListFlag::Badges => "-badges",
        }
    }
}

impl fmt::Display for ClientListFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected client from `clientlist`.
///
/// The `Option` fields are only sent when the matching [`ClientListFlag`]
/// was requested; `None` means the server left them out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OnlineClient {
    #[serde(rename = "clid")]
    pub id: u32,

    #[serde(rename = "cid")]
    pub channel_id: u32,

    #[serde(rename = "client_database_id")]
    pub database_id: u32,

    #[serde(rename = "client_nickname")]
    pub nickname: String,

    /// 0 voice client, 1 query client
    #[serde(rename = "client_type")]
    pub client_type: u8,

    #[serde(rename = "client_away")]
    pub away: bool,

    #[serde(rename = "client_away_message")]
    pub away_message: String,

    // -------------------------------------------------------------------------
    // -uid
    // -------------------------------------------------------------------------
    #[serde(rename = "client_unique_identifier")]
    pub unique_identifier: Option<String>,

    // -------------------------------------------------------------------------
    // -voice
    // -------------------------------------------------------------------------
    #[serde(rename = "client_flag_talking")]
    pub flag_talking: Option<bool>,

    #[serde(rename = "client_input_muted")]
    pub input_muted: Option<bool>,

    #[serde(rename = "client_output_muted")]
    pub output_muted: Option<bool>,

    #[serde(rename = "client_input_hardware")]
    pub input_hardware: Option<bool>,

    #[serde(rename = "client_output_hardware")]
    pub output_hardware: Option<bool>,

    #[serde(rename = "client_talk_power")]
    pub talk_power: Option<i32>,

    #[serde(rename = "client_is_talker")]
    pub is_talker: Option<bool>,

    #[serde(rename = "client_is_priority_speaker")]
    pub is_priority_speaker: Option<bool>,

    #[serde(rename = "client_is_recording")]
    pub is_recording: Option<bool>,

    #[serde(rename = "client_is_channel_commander")]
    pub is_channel_commander: Option<bool>,

    // -------------------------------------------------------------------------
    // -times
    // -------------------------------------------------------------------------
    /// Milliseconds
    #[serde(rename = "client_idle_time")]
    pub idle_time: Option<u64>,

    #[serde(rename = "client_created")]
    pub created: Option<Timestamp>,

    #[serde(rename = "client_lastconnected")]
    pub last_connected: Option<Timestamp>,

    // -------------------------------------------------------------------------
    // -groups
    // -------------------------------------------------------------------------
    #[serde(rename = "client_channel_group_id")]
    pub channel_group_id: Option<u32>,

    #[serde(rename = "client_channel_group_inherited_channel_id")]
    pub channel_group_inherited_channel_id: Option<u32>,

    #[serde(rename = "client_servergroups")]
    pub server_groups: Option<Vec<u32>>,

    // -------------------------------------------------------------------------
    // -info
    // -------------------------------------------------------------------------
    #[serde(rename = "client_version")]
    pub version: Option<String>,

    #[serde(rename = "client_platform")]
    pub platform: Option<String>,

    // -------------------------------------------------------------------------
    // -icon / -country / -ip / -badges
    // -------------------------------------------------------------------------
    #[serde(rename = "client_icon_id")]
    pub icon_id: Option<i64>,

    #[serde(rename = "client_country")]
    pub country: Option<String>,

    #[serde(rename = "connection_client_ip")]
    pub ip: Option<String>,

    #[serde(rename = "client_badges")]
    pub badges: Option<String>,
}

/// A client known to the server database, from `clientdblist`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbClient {
    #[serde(rename = "cldbid")]
    pub id: u32,

    #[serde(rename = "client_unique_identifier")]
    pub unique_identifier: String,

    #[serde(rename = "client_nickname")]
    pub nickname: String,

    #[serde(rename = "client_created")]
    pub created: Timestamp,

    #[serde(rename = "client_lastconnected")]
    pub last_connected: Timestamp,

    #[serde(rename = "client_totalconnections")]
    pub total_connections: u32,

    #[serde(rename = "client_description")]
    pub description: String,

    #[serde(rename = "client_lastip")]
    pub last_ip: Option<String>,
}

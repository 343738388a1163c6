//! Virtual server and instance shapes

use serde::Deserialize;

use crate::mapping::{Escaped, Timestamp};

/// A virtual server, as returned by `serverlist` and `serverinfo`.
///
/// `serverlist` fills the summary fields, `serverinfo` the settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Server {
    // -------------------------------------------------------------------------
    // Summary
    // -------------------------------------------------------------------------
    #[serde(rename = "virtualserver_id")]
    pub id: u32,

    #[serde(rename = "virtualserver_port")]
    pub port: u16,

    #[serde(rename = "virtualserver_status")]
    pub status: String,

    #[serde(rename = "virtualserver_clientsonline")]
    pub clients_online: u32,

    #[serde(rename = "virtualserver_queryclientsonline")]
    pub query_clients_online: u32,

    #[serde(rename = "virtualserver_maxclients")]
    pub max_clients: u32,

    /// Seconds
    #[serde(rename = "virtualserver_uptime")]
    pub uptime: u64,

    #[serde(rename = "virtualserver_name")]
    pub name: String,

    #[serde(rename = "virtualserver_autostart")]
    pub auto_start: bool,

    #[serde(rename = "virtualserver_machine_id")]
    pub machine_id: String,

    #[serde(rename = "virtualserver_unique_identifier")]
    pub unique_identifier: String,

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------
    #[serde(rename = "virtualserver_antiflood_points_needed_command_block")]
    pub antiflood_points_needed_command_block: u32,

    #[serde(rename = "virtualserver_antiflood_points_needed_ip_block")]
    pub antiflood_points_needed_ip_block: u32,

    #[serde(rename = "virtualserver_antiflood_points_tick_reduce")]
    pub antiflood_points_tick_reduce: u32,

    #[serde(rename = "virtualserver_complain_autoban_count")]
    pub complain_autoban_count: u32,

    #[serde(rename = "virtualserver_complain_autoban_time")]
    pub complain_autoban_time: u32,

    #[serde(rename = "virtualserver_complain_remove_time")]
    pub complain_remove_time: u32,

    #[serde(rename = "virtualserver_default_channel_admin_group")]
    pub default_channel_admin_group: u32,

    #[serde(rename = "virtualserver_default_channel_group")]
    pub default_channel_group: u32,

    #[serde(rename = "virtualserver_default_server_group")]
    pub default_server_group: u32,

    #[serde(rename = "virtualserver_min_clients_in_channel_before_forced_silence")]
    pub min_clients_in_channel_before_forced_silence: u32,

    #[serde(rename = "virtualserver_needed_identity_security_level")]
    pub needed_identity_security_level: u32,

    #[serde(rename = "virtualserver_log_permissions")]
    pub log_permissions: bool,

    #[serde(rename = "virtualserver_priority_speaker_dimm_modificator")]
    pub priority_speaker_dimm_modificator: f64,

    #[serde(rename = "virtualserver_max_download_total_bandwidth")]
    pub max_download_total_bandwidth: u64,

    #[serde(rename = "virtualserver_max_upload_total_bandwidth")]
    pub max_upload_total_bandwidth: u64,

    #[serde(rename = "virtualserver_download_quota")]
    pub download_quota: u64,

    #[serde(rename = "virtualserver_upload_quota")]
    pub upload_quota: u64,

    #[serde(rename = "virtualserver_filebase")]
    pub file_base: String,

    #[serde(rename = "virtualserver_hostbutton_tooltip")]
    pub host_button_tooltip: String,

    #[serde(rename = "virtualserver_hostbutton_url")]
    pub host_button_url: String,

    #[serde(rename = "virtualserver_welcomemessage")]
    pub welcome_message: String,

    #[serde(rename = "virtualserver_flag_password")]
    pub password_protected: bool,

    #[serde(rename = "virtualserver_weblist_enabled")]
    pub weblist_enabled: bool,

    #[serde(rename = "virtualserver_reserved_slots")]
    pub reserved_slots: u32,

    #[serde(rename = "virtualserver_created")]
    pub created: Timestamp,
}

/// Result of `servercreate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreatedServer {
    #[serde(rename = "sid")]
    pub id: u32,

    #[serde(rename = "virtualserver_port")]
    pub port: u16,

    /// Privilege key for the initial server admin
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ServerId {
    pub server_id: u32,
}

/// Traffic counters from `serverrequestconnectioninfo`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConnectionInfo {
    #[serde(rename = "connection_filetransfer_bandwidth_sent")]
    pub file_transfer_bandwidth_sent: u64,

    #[serde(rename = "connection_filetransfer_bandwidth_received")]
    pub file_transfer_bandwidth_received: u64,

    #[serde(rename = "connection_filetransfer_bytes_sent_total")]
    pub file_transfer_total_sent: u64,

    #[serde(rename = "connection_filetransfer_bytes_received_total")]
    pub file_transfer_total_received: u64,

    #[serde(rename = "connection_packets_sent_total")]
    pub packets_sent_total: u64,

    #[serde(rename = "connection_packets_received_total")]
    pub packets_received_total: u64,

    #[serde(rename = "connection_bytes_sent_total")]
    pub bytes_sent_total: u64,

    #[serde(rename = "connection_bytes_received_total")]
    pub bytes_received_total: u64,

    #[serde(rename = "connection_bandwidth_sent_last_second_total")]
    pub bandwidth_sent_last_second: u64,

    #[serde(rename = "connection_bandwidth_received_last_second_total")]
    pub bandwidth_received_last_second: u64,

    #[serde(rename = "connection_bandwidth_sent_last_minute_total")]
    pub bandwidth_sent_last_minute: u64,

    #[serde(rename = "connection_bandwidth_received_last_minute_total")]
    pub bandwidth_received_last_minute: u64,

    /// Seconds
    #[serde(rename = "connection_connected_time")]
    pub connected_time: u64,

    #[serde(rename = "connection_packetloss_total")]
    pub packet_loss_total_avg: f64,

    #[serde(rename = "connection_ping")]
    pub ping_total_avg: f64,

    #[serde(rename = "connection_packets_sent_speech")]
    pub packets_sent_speech: u64,

    #[serde(rename = "connection_packets_received_speech")]
    pub packets_received_speech: u64,

    #[serde(rename = "connection_bytes_sent_speech")]
    pub bytes_sent_speech: u64,

    #[serde(rename = "connection_bytes_received_speech")]
    pub bytes_received_speech: u64,

    #[serde(rename = "connection_packets_sent_keepalive")]
    pub packets_sent_keepalive: u64,

    #[serde(rename = "connection_packets_received_keepalive")]
    pub packets_received_keepalive: u64,

    #[serde(rename = "connection_bytes_sent_keepalive")]
    pub bytes_sent_keepalive: u64,

    #[serde(rename = "connection_bytes_received_keepalive")]
    pub bytes_received_keepalive: u64,

    #[serde(rename = "connection_packets_sent_control")]
    pub packets_sent_control: u64,

    #[serde(rename = "connection_packets_received_control")]
    pub packets_received_control: u64,

    #[serde(rename = "connection_bytes_sent_control")]
    pub bytes_sent_control: u64,

    #[serde(rename = "connection_bytes_received_control")]
    pub bytes_received_control: u64,
}

/// Server instance settings from `instanceinfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Instance {
    #[serde(rename = "serverinstance_database_version")]
    pub database_version: u32,

    #[serde(rename = "serverinstance_filetransfer_port")]
    pub file_transfer_port: u16,

    #[serde(rename = "serverinstance_max_download_total_bandwidth")]
    pub max_total_download_bandwidth: u64,

    #[serde(rename = "serverinstance_max_upload_total_bandwidth")]
    pub max_total_upload_bandwidth: u64,

    #[serde(rename = "serverinstance_guest_serverquery_group")]
    pub guest_server_query_group: u32,

    #[serde(rename = "serverinstance_serverquery_flood_commands")]
    pub server_query_flood_commands: u32,

    /// Seconds
    #[serde(rename = "serverinstance_serverquery_flood_time")]
    pub server_query_flood_time: u32,

    /// Seconds
    #[serde(rename = "serverinstance_serverquery_ban_time")]
    pub server_query_ban_time: u32,

    #[serde(rename = "serverinstance_template_serveradmin_group")]
    pub template_server_admin_group: u32,

    #[serde(rename = "serverinstance_template_serverdefault_group")]
    pub template_server_default_group: u32,

    #[serde(rename = "serverinstance_template_channeladmin_group")]
    pub template_channel_admin_group: u32,

    #[serde(rename = "serverinstance_template_channeldefault_group")]
    pub template_channel_default_group: u32,

    #[serde(rename = "serverinstance_permissions_version")]
    pub permissions_version: u32,

    #[serde(rename = "serverinstance_pending_connections_per_ip")]
    pub pending_connections_per_ip: u32,
}

/// Result of `serversnapshotcreate`.
///
/// `data` is kept in its escaped wire form so it can be sent back to
/// `serversnapshotdeploy` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub version: u32,
    pub data: Escaped,
}

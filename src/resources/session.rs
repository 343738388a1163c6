use serde::Deserialize;

/// Result of `version`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Version {
    pub version: String,
    pub build: u64,
    pub platform: String,
}

/// Result of `whoami`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WhoAmI {
    /// `unknown` until a virtual server is selected
    #[serde(rename = "virtualserver_status")]
    pub server_status: String,

    #[serde(rename = "virtualserver_id")]
    pub server_id: u32,

    #[serde(rename = "virtualserver_unique_identifier")]
    pub server_unique_identifier: String,

    #[serde(rename = "virtualserver_port")]
    pub server_port: u16,

    pub client_id: u32,

    pub client_channel_id: u32,

    #[serde(rename = "client_nickname")]
    pub nickname: String,

    #[serde(rename = "client_database_id")]
    pub database_id: u32,

    #[serde(rename = "client_login_name")]
    pub login_name: String,

    #[serde(rename = "client_unique_identifier")]
    pub unique_identifier: String,

    #[serde(rename = "client_origin_server_id")]
    pub origin_server_id: u32,
}

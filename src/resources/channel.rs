use serde::Deserialize;

/// A channel from `channellist`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Channel {
    #[serde(rename = "cid")]
    pub id: u32,

    /// 0 for top level channels
    #[serde(rename = "pid")]
    pub parent_id: u32,

    #[serde(rename = "channel_order")]
    pub order: u32,

    #[serde(rename = "channel_name")]
    pub name: String,

    pub total_clients: u32,

    #[serde(rename = "channel_needed_subscribe_power")]
    pub needed_subscribe_power: u32,
}

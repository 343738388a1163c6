//! Server groups and privilege keys

use serde::Deserialize;

use crate::mapping::Timestamp;

/// A server group from `servergrouplist`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Group {
    #[serde(rename = "sgid")]
    pub id: u32,

    pub name: String,

    /// 0 template, 1 regular, 2 query
    #[serde(rename = "type")]
    pub group_type: u8,

    #[serde(rename = "iconid")]
    pub icon_id: i64,

    /// Persisted in the database
    #[serde(rename = "savedb")]
    pub saved: bool,

    #[serde(rename = "sortid")]
    pub sort_id: u32,

    #[serde(rename = "namemode")]
    pub name_mode: u8,

    #[serde(rename = "n_modifyp")]
    pub modify_power: u32,

    #[serde(rename = "n_member_addp")]
    pub member_add_power: u32,

    #[serde(rename = "n_member_removep")]
    pub member_remove_power: u32,
}

/// A privilege key from `privilegekeylist`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrivilegeKey {
    pub token: String,

    /// 0 server group, 1 channel group
    #[serde(rename = "token_type")]
    pub token_type: u8,

    /// Group id
    #[serde(rename = "token_id1")]
    pub id1: u32,

    /// Channel id for channel group keys
    #[serde(rename = "token_id2")]
    pub id2: u32,

    #[serde(rename = "token_created")]
    pub created: Timestamp,

    #[serde(rename = "token_description")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Token {
    pub token: String,
}

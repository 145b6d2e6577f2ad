// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::deserializer::{
    option_u16_or_string, option_u32_or_string, option_u64_or_string,
    option_u8_or_string,
};
use crate::{ErrorKind, SdnError};

/// Priority used to identify an entry for deletion when the entry does not
/// carry one.
pub const DEFAULT_DELETE_PRIORITY: u16 = 1;
pub const DEFAULT_TABLE_ID: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Sparse match criteria of a flow entry. Absent field means wildcard.
///
/// Fields not recognized here are kept in [FlowMatch::others] and sent back
/// to the controller untouched.
pub struct FlowMatch {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u32_or_string"
    )]
    pub in_port: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_dst: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub dl_type: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub dl_vlan: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub eth_type: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_dst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_dst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nw_dst: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u8_or_string"
    )]
    pub nw_proto: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u8_or_string"
    )]
    pub ip_proto: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub tp_src: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub tp_dst: Option<u16>,
    #[serde(flatten)]
    pub others: Map<String, Value>,
}

impl FlowMatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wildcard-all match.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "FlowActionReply")]
#[non_exhaustive]
/// One action of a flow entry. The order of actions in an entry is the
/// order the switch applies them.
pub struct FlowAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    /// Non integer argument of a textual action like `SET_FIELD: {...}`.
    /// Only populated when read from the controller.
    #[serde(skip_serializing)]
    pub argument: Option<String>,
    #[serde(flatten)]
    pub others: Map<String, Value>,
}

impl FlowAction {
    pub fn new(action_type: &str, port: Option<u32>) -> Self {
        Self {
            action_type: action_type.to_string(),
            port,
            ..Default::default()
        }
    }

    pub fn output(port: u32) -> Self {
        Self::new("OUTPUT", Some(port))
    }
}

impl std::fmt::Display for FlowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(port) = self.port {
            write!(f, "{}:{}", self.action_type, port)
        } else if let Some(arg) = self.argument.as_ref() {
            write!(f, "{}:{}", self.action_type, arg)
        } else {
            write!(f, "{}", self.action_type)
        }
    }
}

// Installed entries report actions as `"OUTPUT:2"` while add requests use
// `{"type": "OUTPUT", "port": 2}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlowActionReply {
    Text(String),
    Object(FlowActionObject),
}

#[derive(Deserialize)]
struct FlowActionObject {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default, deserialize_with = "option_u32_or_string")]
    port: Option<u32>,
    #[serde(flatten)]
    others: Map<String, Value>,
}

impl From<FlowActionReply> for FlowAction {
    fn from(reply: FlowActionReply) -> Self {
        match reply {
            FlowActionReply::Text(text) => {
                let (action_type, arg) = match text.split_once(':') {
                    Some((t, a)) => (t.trim(), a.trim()),
                    None => (text.trim(), ""),
                };
                let mut action = FlowAction::new(action_type, None);
                if let Ok(port) = arg.parse::<u32>() {
                    action.port = Some(port);
                } else if !arg.is_empty() {
                    action.argument = Some(arg.to_string());
                }
                action
            }
            FlowActionReply::Object(obj) => FlowAction {
                action_type: obj.action_type,
                port: obj.port,
                argument: None,
                others: obj.others,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// A match+action rule of a switch flow table.
///
/// The `length`, `duration_sec`, `duration_nsec`, `packet_count` and
/// `byte_count` properties are only populated when read from the controller
/// and never serialized.
pub struct FlowEntry {
    /// Switch the entry belongs to. Always overridden by the selected switch
    /// when adding.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u64_or_string"
    )]
    pub dpid: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u8_or_string"
    )]
    pub table_id: Option<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub priority: Option<u16>,
    #[serde(
        rename = "match",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flow_match: Option<FlowMatch>,
    #[serde(default)]
    pub actions: Vec<FlowAction>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u64_or_string"
    )]
    pub cookie: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u64_or_string"
    )]
    pub cookie_mask: Option<u64>,
    /// Seconds
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub idle_timeout: Option<u16>,
    /// Seconds
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub hard_timeout: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "option_u16_or_string"
    )]
    pub flags: Option<u16>,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "option_u64_or_string"
    )]
    pub length: Option<u64>,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "option_u64_or_string"
    )]
    pub duration_sec: Option<u64>,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "option_u64_or_string"
    )]
    pub duration_nsec: Option<u64>,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "option_u64_or_string"
    )]
    pub packet_count: Option<u64>,
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "option_u64_or_string"
    )]
    pub byte_count: Option<u64>,
}

impl FlowEntry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
/// Body of a delete request. The controller deletes by match, so an entry
/// is identified by dpid, table id, priority and match criteria.
pub struct FlowDeleteRequest {
    pub dpid: u64,
    pub table_id: u8,
    pub priority: u16,
    #[serde(rename = "match")]
    pub flow_match: FlowMatch,
}

impl FlowDeleteRequest {
    /// Build the identification tuple from an entry, defaulting priority to
    /// [DEFAULT_DELETE_PRIORITY], table id to [DEFAULT_TABLE_ID] and match
    /// to wildcard-all.
    pub fn new(dpid: u64, entry: &FlowEntry) -> Self {
        Self {
            dpid,
            table_id: entry.table_id.unwrap_or(DEFAULT_TABLE_ID),
            priority: entry.priority.unwrap_or(DEFAULT_DELETE_PRIORITY),
            flow_match: entry.flow_match.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Flow statistics reply of the controller: either a bare array of entries
/// or the entries wrapped under the dpid key.
pub enum FlowTableReply {
    Array(Vec<FlowEntry>),
    Keyed(Vec<(String, Vec<FlowEntry>)>),
}

impl FlowTableReply {
    pub fn from_value(value: Value) -> Result<Self, SdnError> {
        match value {
            Value::Array(_) => {
                Ok(Self::Array(serde_json::from_value(value)?))
            }
            Value::Object(map) => {
                let mut ret = Vec::new();
                for (key, entries) in map {
                    if !entries.is_array() {
                        return Err(SdnError::new(
                            ErrorKind::SchemaViolation,
                            format!(
                                "Expecting array of flow entries under \
                                key {key}, but got {entries}"
                            ),
                        ));
                    }
                    ret.push((key, serde_json::from_value(entries)?));
                }
                Ok(Self::Keyed(ret))
            }
            _ => Err(SdnError::new(
                ErrorKind::SchemaViolation,
                format!(
                    "Expecting array or object of flow entries, but got \
                    {value}"
                ),
            )),
        }
    }

    /// Flatten into one ordered sequence: entries of each key in order,
    /// keys in the order the controller sent them.
    pub fn into_entries(self) -> Vec<FlowEntry> {
        match self {
            Self::Array(entries) => entries,
            Self::Keyed(keyed) => {
                keyed.into_iter().flat_map(|(_, entries)| entries).collect()
            }
        }
    }
}

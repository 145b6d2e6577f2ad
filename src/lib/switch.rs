// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deserializer::u64_or_string;
use crate::{ErrorKind, FlowEntry, SdnError, SouthboundClient};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Static description of a switch.
pub struct SwitchDescriptor {
    /// Manufacturer
    #[serde(default)]
    pub mfr_desc: String,
    /// Hardware
    #[serde(default)]
    pub hw_desc: String,
    /// Software
    #[serde(default)]
    pub sw_desc: String,
    #[serde(default)]
    pub serial_num: String,
    /// Data plane description
    #[serde(default)]
    pub dp_desc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Counters summed over all flow entries of a switch.
pub struct AggregateFlowStats {
    #[serde(default, deserialize_with = "u64_or_string")]
    pub packet_count: u64,
    #[serde(default, deserialize_with = "u64_or_string")]
    pub byte_count: u64,
    #[serde(default, deserialize_with = "u64_or_string")]
    pub flow_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Consistent view of one switch: flow table, descriptor and aggregate
/// statistics all fetched by the same refresh.
pub struct SwitchView {
    pub id: u64,
    #[serde(default)]
    pub flow_table: Vec<FlowEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<SwitchDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_flow: Option<AggregateFlowStats>,
}

impl SwitchView {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Fetch flow table, descriptor and aggregate statistics of one switch
/// concurrently and assemble them into a [SwitchView].
///
/// Failure of any of the three fails the whole fetch with
/// [ErrorKind::CorrelationFailure].
pub async fn fetch_switch_view(
    client: &SouthboundClient,
    id: u64,
) -> Result<SwitchView, SdnError> {
    let (flow_table, descs, aggregates) = tokio::try_join!(
        client.get_switch_flow_table(id),
        client.get_switch_descriptor(id),
        client.get_switch_aggregate(id),
    )
    .map_err(|e| {
        SdnError::new(
            ErrorKind::CorrelationFailure,
            format!("Failed to refresh switch {id}: {e}"),
        )
    })?;

    Ok(SwitchView {
        id,
        flow_table: flow_table.into_entries(),
        desc: unwrap_dpid_key(id, descs),
        aggregate_flow: unwrap_dpid_key(id, aggregates)
            .and_then(|stats| stats.into_iter().next()),
    })
}

// The stats API wraps per-switch replies under the decimal dpid, never the
// 16 hex digits form of the topology API. Entries keyed by another switch
// are never used.
pub(crate) fn unwrap_dpid_key<T>(
    id: u64,
    reply: BTreeMap<String, T>,
) -> Option<T> {
    let mut other_keys = Vec::new();
    for (key, v) in reply {
        if key.trim().parse::<u64>().ok() == Some(id) {
            return Some(v);
        }
        other_keys.push(key);
    }
    if !other_keys.is_empty() {
        log::warn!("Switch {id} not found in reply keyed by {other_keys:?}");
    }
    None
}

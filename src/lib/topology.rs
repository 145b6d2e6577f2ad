// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::deserializer::string_or_number;
use crate::{
    ErrorKind, HostIdentity, PollState, SdnError, SouthboundClient,
    TopologyGraph,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// One side of a link, or the switch port a host is attached to.
pub struct LinkEndpoint {
    /// Datapath id of the switch, as reported by the topology API
    /// (16 hex digits in general).
    #[serde(deserialize_with = "string_or_number")]
    pub dpid: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port_no: String,
    #[serde(default)]
    pub hw_addr: String,
    /// Port name, e.g. `s1-eth2`
    #[serde(default)]
    pub name: String,
}

impl LinkEndpoint {
    pub fn new(dpid: &str, port_no: &str, hw_addr: &str, name: &str) -> Self {
        Self {
            dpid: dpid.to_string(),
            port_no: port_no.to_string(),
            hw_addr: hw_addr.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Directed link between two switch ports.
pub struct Link {
    pub src: LinkEndpoint,
    pub dst: LinkEndpoint,
}

impl Link {
    pub fn new(src: LinkEndpoint, dst: LinkEndpoint) -> Self {
        Self { src, dst }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Host {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub ipv4: Vec<String>,
    #[serde(default)]
    pub ipv6: Vec<String>,
    /// Switch port this host is attached to.
    pub port: LinkEndpoint,
}

impl Host {
    pub fn new(mac: &str, ipv4: &[&str], port: LinkEndpoint) -> Self {
        Self {
            mac: mac.to_string(),
            ipv4: ipv4.iter().map(|i| i.to_string()).collect(),
            ipv6: Vec::new(),
            port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Inter-switch links and attached hosts observed by one topology fetch.
pub struct TopologySnapshot {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub hosts: Vec<Host>,
}

impl TopologySnapshot {
    pub fn new(links: Vec<Link>, hosts: Vec<Host>) -> Self {
        Self { links, hosts }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.hosts.is_empty()
    }
}

const DPID_HEX_LEN: usize = 16;

/// Convert a datapath id string into the integer switch id used by the
/// stats API. The topology API reports dpid as 16 hex digits, the stats API
/// keys replies by decimal dpid, `0x` prefixed hex is also accepted.
pub fn parse_dpid(dpid: &str) -> Result<u64, SdnError> {
    let dpid = dpid.trim();
    let ret = if let Some(hex) =
        dpid.strip_prefix("0x").or_else(|| dpid.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else if dpid.len() == DPID_HEX_LEN {
        u64::from_str_radix(dpid, 16)
    } else {
        dpid.parse::<u64>()
    };
    ret.map_err(|e| {
        SdnError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid datapath id {dpid}: {e}"),
        )
    })
}

/// Fetch links and hosts concurrently. Failure of either fails the whole
/// fetch, a snapshot never mixes fresh links with missing hosts.
pub async fn fetch_topology(
    client: &SouthboundClient,
) -> Result<TopologySnapshot, SdnError> {
    let (links, hosts) = tokio::try_join!(
        client.get_topology_links(),
        client.get_topology_hosts()
    )?;
    log::debug!(
        "Fetched topology with {} links and {} hosts",
        links.len(),
        hosts.len()
    );
    Ok(TopologySnapshot::new(links, hosts))
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
/// What a topology view should display for the current poller state.
pub enum TopologyStatus {
    /// No fetch has completed yet.
    Loading,
    /// The last fetch failed. `graph` is built from the last good snapshot,
    /// if any, so it can still be displayed during the outage.
    Failed {
        error: SdnError,
        graph: Option<TopologyGraph>,
    },
    /// Controller reported neither links nor hosts.
    NoData,
    Ready(TopologyGraph),
}

impl TopologyStatus {
    pub fn new(
        state: &PollState<TopologySnapshot>,
        host_identity: HostIdentity,
    ) -> Self {
        if let Some(e) = state.error.as_ref() {
            return Self::Failed {
                error: e.clone(),
                graph: state
                    .value
                    .as_deref()
                    .map(|s| TopologyGraph::build(s, host_identity)),
            };
        }
        match state.value.as_deref() {
            None => Self::Loading,
            Some(snapshot) if snapshot.is_empty() => Self::NoData,
            Some(snapshot) => {
                Self::Ready(TopologyGraph::build(snapshot, host_identity))
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Synchronization and control engine of an SDN operator console.
//!
//! * [ReconcilingPoller] polls the southbound controller and publishes only
//!   structurally changed values.
//! * [TopologyGraph::build] turns a [TopologySnapshot] into a node/edge
//!   graph with deterministic ordering.
//! * [SwitchStateAggregator] owns the selected switch and its consistent
//!   [SwitchView].
//! * [FlowRuleProxy] validates and relays operator flow mutations.

mod aggregator;
mod config;
mod deserializer;
mod error;
mod flow;
mod flow_rule;
mod graph;
mod poller;
mod southbound;
mod switch;
mod topology;


pub use crate::aggregator::{SwitchStateAggregator, SwitchViewState};
pub use crate::config::{PollerConfig, SouthboundConfig};
pub use crate::error::{ErrorKind, SdnError};
pub use crate::flow::{
    FlowAction, FlowDeleteRequest, FlowEntry, FlowMatch, FlowTableReply,
    DEFAULT_DELETE_PRIORITY, DEFAULT_TABLE_ID,
};
pub use crate::flow_rule::FlowRuleProxy;
pub use crate::graph::{
    GraphDiff, GraphEdge, GraphNode, GraphNodeKind, HostIdentity,
    TopologyGraph,
};
pub use crate::poller::{PollState, ReconcilingPoller};
pub use crate::southbound::SouthboundClient;
pub use crate::switch::{
    fetch_switch_view, AggregateFlowStats, SwitchDescriptor, SwitchView,
};
pub use crate::topology::{
    fetch_topology, parse_dpid, Host, Link, LinkEndpoint, TopologySnapshot,
    TopologyStatus,
};

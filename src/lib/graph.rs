// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::TopologySnapshot;

const HOST_NODE_ID_PREFIX: &str = "host_";
const SWITCH_LABEL_SUFFIX_LEN: usize = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// How host node ids are synthesized.
pub enum HostIdentity {
    /// `host_<i>` where `i` is the position of the host in the fetched
    /// sequence. Not stable when the controller reorders hosts.
    #[default]
    Position,
    /// `host_<mac>`, stable across polls.
    MacAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum GraphNodeKind {
    Switch,
    Host,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct GraphNode {
    /// Unique within one graph, not guaranteed stable across graphs.
    pub id: String,
    pub kind: GraphNodeKind,
    pub label: String,
    /// Secondary text: full dpid of a switch or MAC address of a host.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Renderable node/edge graph of a [TopologySnapshot].
pub struct TopologyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl TopologyGraph {
    /// Pure and deterministic: same snapshot gives same nodes and edges in
    /// the same order.
    ///
    /// Nodes are ordered by first appearance: link endpoints in link order,
    /// then hosts in host order. A host attachment switch missing from links
    /// is added as switch node right before the host node.
    pub fn build(
        snapshot: &TopologySnapshot,
        host_identity: HostIdentity,
    ) -> Self {
        let mut graph = Self::default();
        let mut node_ids: HashSet<String> = HashSet::new();

        for link in snapshot.links.iter() {
            graph.add_switch(&mut node_ids, &link.src.dpid);
            graph.add_switch(&mut node_ids, &link.dst.dpid);
            graph.edges.push(GraphEdge {
                from: link.src.dpid.clone(),
                to: link.dst.dpid.clone(),
                label: format!("{}\n{}", link.src.name, link.dst.name),
                directed: true,
            });
        }

        for (index, host) in snapshot.hosts.iter().enumerate() {
            let host_id = match host_identity {
                HostIdentity::Position => {
                    format!("{HOST_NODE_ID_PREFIX}{index}")
                }
                HostIdentity::MacAddress => {
                    format!("{HOST_NODE_ID_PREFIX}{}", host.mac)
                }
            };
            graph.add_switch(&mut node_ids, &host.port.dpid);
            if node_ids.insert(host_id.clone()) {
                graph.nodes.push(GraphNode {
                    id: host_id.clone(),
                    kind: GraphNodeKind::Host,
                    label: host.ipv4.first().cloned().unwrap_or_default(),
                    title: host.mac.clone(),
                });
            } else {
                log::warn!(
                    "Duplicate host node {host_id}, merging host {} into it",
                    host.mac
                );
            }
            graph.edges.push(GraphEdge {
                from: host_id,
                to: host.port.dpid.clone(),
                label: host.port.name.clone(),
                directed: false,
            });
        }
        graph
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn add_switch(&mut self, node_ids: &mut HashSet<String>, dpid: &str) {
        if node_ids.insert(dpid.to_string()) {
            self.nodes.push(GraphNode {
                id: dpid.to_string(),
                kind: GraphNodeKind::Switch,
                label: switch_label(dpid),
                title: dpid.to_string(),
            });
        }
    }
}

// Last 4 characters of the dpid, long dpids are mostly leading zeros.
fn switch_label(dpid: &str) -> String {
    let chars: Vec<char> = dpid.chars().collect();
    chars[chars.len().saturating_sub(SWITCH_LABEL_SUFFIX_LEN)..]
        .iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Changes to apply to an existing rendering of `old` to get `new`.
///
/// A node whose label or title changed shows up as removed and added.
pub struct GraphDiff {
    pub added_nodes: Vec<GraphNode>,
    pub removed_nodes: Vec<GraphNode>,
    pub added_edges: Vec<GraphEdge>,
    pub removed_edges: Vec<GraphEdge>,
}

impl GraphDiff {
    pub fn between(old: &TopologyGraph, new: &TopologyGraph) -> Self {
        let old_nodes: HashSet<&GraphNode> = old.nodes.iter().collect();
        let new_nodes: HashSet<&GraphNode> = new.nodes.iter().collect();
        let old_edges: HashSet<&GraphEdge> = old.edges.iter().collect();
        let new_edges: HashSet<&GraphEdge> = new.edges.iter().collect();

        Self {
            added_nodes: new
                .nodes
                .iter()
                .filter(|n| !old_nodes.contains(n))
                .cloned()
                .collect(),
            removed_nodes: old
                .nodes
                .iter()
                .filter(|n| !new_nodes.contains(n))
                .cloned()
                .collect(),
            added_edges: new
                .edges
                .iter()
                .filter(|e| !old_edges.contains(e))
                .cloned()
                .collect(),
            removed_edges: old
                .edges
                .iter()
                .filter(|e| !new_edges.contains(e))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}

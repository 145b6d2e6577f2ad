// SPDX-License-Identifier: Apache-2.0

use crate::{
    unit_tests::testlib::{gen_test_snapshot, new_endpoint, new_link},
    GraphDiff, GraphNodeKind, Host, HostIdentity, TopologyGraph,
    TopologySnapshot,
};

#[test]
fn test_build_empty_snapshot() {
    let graph =
        TopologyGraph::build(&TopologySnapshot::default(), Default::default());

    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
    assert!(graph.is_empty());
}

#[test]
fn test_build_nodes_and_edges() {
    let graph =
        TopologyGraph::build(&gen_test_snapshot(), HostIdentity::Position);

    let node_ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        node_ids,
        vec!["0000000000000001", "0000000000000002", "host_0", "host_1"]
    );

    let sw1 = graph.get_node("0000000000000001").unwrap();
    assert_eq!(sw1.kind, GraphNodeKind::Switch);
    assert_eq!(sw1.label, "0001");
    assert_eq!(sw1.title, "0000000000000001");

    let host0 = graph.get_node("host_0").unwrap();
    assert_eq!(host0.kind, GraphNodeKind::Host);
    assert_eq!(host0.label, "10.0.0.1");
    assert_eq!(host0.title, "00:00:00:00:00:0a");

    assert_eq!(graph.edges.len(), 4);
    assert_eq!(graph.edges[0].from, "0000000000000001");
    assert_eq!(graph.edges[0].to, "0000000000000002");
    assert_eq!(graph.edges[0].label, "s1-eth2\ns2-eth2");
    assert!(graph.edges[0].directed);
    assert_eq!(graph.edges[2].from, "host_0");
    assert_eq!(graph.edges[2].to, "0000000000000001");
    assert_eq!(graph.edges[2].label, "s1-eth1");
    assert!(!graph.edges[2].directed);
}

#[test]
fn test_build_is_deterministic() {
    let snapshot = gen_test_snapshot();

    let graph1 = TopologyGraph::build(&snapshot, HostIdentity::Position);
    let graph2 = TopologyGraph::build(&snapshot, HostIdentity::Position);

    assert_eq!(graph1, graph2);
    assert_eq!(
        serde_json::to_string(&graph1).unwrap(),
        serde_json::to_string(&graph2).unwrap()
    );
    assert_eq!(snapshot, gen_test_snapshot());
}

#[test]
fn test_build_parallel_links_share_switch_nodes() {
    let snapshot = TopologySnapshot::new(
        vec![
            new_link("0000000000000001", "2", "0000000000000002", "2"),
            new_link("0000000000000001", "3", "0000000000000002", "3"),
        ],
        Vec::new(),
    );

    let graph = TopologyGraph::build(&snapshot, HostIdentity::Position);

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.edges[1].label, "s1-eth3\ns2-eth3");
}

#[test]
fn test_build_host_without_ipv4_and_unlinked_switch() {
    let mut host =
        Host::new("00:00:00:00:00:0c", &[], new_endpoint("000000000000000a", "1"));
    host.ipv6.push("fe80::1".to_string());
    let snapshot = TopologySnapshot::new(Vec::new(), vec![host]);

    let graph = TopologyGraph::build(&snapshot, HostIdentity::Position);

    let node_ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(node_ids, vec!["000000000000000a", "host_0"]);
    assert_eq!(graph.nodes[0].label, "000a");
    assert_eq!(graph.nodes[1].label, "");
}

#[test]
fn test_build_short_dpid_label() {
    let snapshot = TopologySnapshot::new(
        vec![new_link("1", "1", "22", "1")],
        Vec::new(),
    );

    let graph = TopologyGraph::build(&snapshot, HostIdentity::Position);

    assert_eq!(graph.nodes[0].label, "1");
    assert_eq!(graph.nodes[1].label, "22");
}

#[test]
fn test_host_identity_position_follows_order() {
    let snapshot = gen_test_snapshot();
    let mut reordered = snapshot.clone();
    reordered.hosts.reverse();

    let graph = TopologyGraph::build(&snapshot, HostIdentity::Position);
    let graph_reordered =
        TopologyGraph::build(&reordered, HostIdentity::Position);

    assert_eq!(graph.get_node("host_0").unwrap().label, "10.0.0.1");
    assert_eq!(graph_reordered.get_node("host_0").unwrap().label, "10.0.0.2");
}

#[test]
fn test_host_identity_mac_is_stable() {
    let snapshot = gen_test_snapshot();
    let mut reordered = snapshot.clone();
    reordered.hosts.reverse();

    let graph = TopologyGraph::build(&snapshot, HostIdentity::MacAddress);
    let graph_reordered =
        TopologyGraph::build(&reordered, HostIdentity::MacAddress);

    let node = graph.get_node("host_00:00:00:00:00:0a").unwrap();
    assert_eq!(node.label, "10.0.0.1");
    assert_eq!(
        graph_reordered.get_node("host_00:00:00:00:00:0a"),
        Some(node)
    );
}

#[test]
fn test_graph_diff() {
    let old_snapshot = gen_test_snapshot();
    let mut new_snapshot = old_snapshot.clone();
    new_snapshot.links.pop();
    new_snapshot.hosts.push(Host::new(
        "00:00:00:00:00:0c",
        &["10.0.0.3"],
        new_endpoint("0000000000000002", "3"),
    ));
    let old = TopologyGraph::build(&old_snapshot, HostIdentity::Position);
    let new = TopologyGraph::build(&new_snapshot, HostIdentity::Position);

    let diff = GraphDiff::between(&old, &new);

    assert_eq!(diff.added_nodes.len(), 1);
    assert_eq!(diff.added_nodes[0].id, "host_2");
    assert!(diff.removed_nodes.is_empty());
    assert_eq!(diff.added_edges.len(), 1);
    assert_eq!(diff.added_edges[0].from, "host_2");
    assert_eq!(diff.removed_edges.len(), 1);
    assert_eq!(diff.removed_edges[0].from, "0000000000000002");
    assert!(GraphDiff::between(&new, &new).is_empty());
}

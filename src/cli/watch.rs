// SPDX-License-Identifier: Apache-2.0

use sdnconsole::{
    fetch_switch_view, fetch_topology, GraphDiff, HostIdentity, PollState,
    ReconcilingPoller, SouthboundClient, SwitchView, TopologyGraph,
    TopologySnapshot, TopologyStatus,
};

use crate::{
    config::Config,
    error::CliError,
    query::{host_identity, switch_id_from_matches},
};

// Run the topology poller, plus the switch state poller when `--switch` is
// given, logging every published change until Ctrl-C.
pub(crate) async fn watch(
    matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let config = Config::from_matches(matches)?;
    let host_identity = host_identity(matches, &config);
    let switch_id = if matches.is_present("DPID") {
        Some(switch_id_from_matches(matches)?)
    } else {
        None
    };
    let client = SouthboundClient::new(&config.controller)?;
    log::info!("Watching controller {}", client.base_url());

    let topo_client = client.clone();
    let topo_poller = ReconcilingPoller::start(
        "topology",
        config.topology.poller_config(),
        move || {
            let client = topo_client.clone();
            async move { fetch_topology(&client).await }
        },
    )?;
    let mut topo_rx = topo_poller.subscribe();

    let switch_poller = switch_id.map(|id| {
        let client = client.clone();
        ReconcilingPoller::start(
            &format!("switch-{id}"),
            config.switch.poller_config(),
            move || {
                let client = client.clone();
                async move { fetch_switch_view(&client, id).await }
            },
        )
    })
    .transpose()?;
    let mut switch_rx = switch_poller.as_ref().map(|p| p.subscribe());

    let mut graph = TopologyGraph::default();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let result = loop {
        tokio::select! {
            ret = &mut ctrl_c => {
                log::info!("Interrupted, stopping pollers");
                break ret.map_err(CliError::from);
            }
            ret = topo_rx.changed() => {
                if ret.is_err() {
                    break Err(CliError::from("Topology poller quit"));
                }
                let state = topo_rx.borrow_and_update().clone();
                graph = report_topology(&state, host_identity, graph);
            }
            ret = wait_switch_change(switch_rx.as_mut()) => {
                if ret.is_err() {
                    break Err(CliError::from("Switch poller quit"));
                }
                if let Some(rx) = switch_rx.as_mut() {
                    report_switch(&rx.borrow_and_update());
                }
            }
        }
    };

    topo_poller.stop().await;
    if let Some(p) = switch_poller {
        p.stop().await;
    }
    result.map(|_| String::new())
}

async fn wait_switch_change(
    rx: Option<&mut tokio::sync::watch::Receiver<PollState<SwitchView>>>,
) -> Result<(), tokio::sync::watch::error::RecvError> {
    match rx {
        Some(rx) => rx.changed().await,
        None => std::future::pending().await,
    }
}

fn report_topology(
    state: &PollState<TopologySnapshot>,
    host_identity: HostIdentity,
    old_graph: TopologyGraph,
) -> TopologyGraph {
    match TopologyStatus::new(state, host_identity) {
        TopologyStatus::Loading => old_graph,
        TopologyStatus::Failed { error: e, .. } => {
            if e.kind().is_transient() {
                log::warn!("Topology refresh failed, will retry: {e}");
            } else {
                log::error!("Topology refresh failed: {e}");
            }
            old_graph
        }
        TopologyStatus::NoData => {
            log::info!("Controller reported no topology data");
            TopologyGraph::default()
        }
        TopologyStatus::Ready(new_graph) => {
            let diff = GraphDiff::between(&old_graph, &new_graph);
            if !diff.is_empty() {
                log::info!(
                    "Topology generation {}: {} switches and hosts, {} \
                    edges ({} nodes added, {} removed; {} edges added, {} \
                    removed)",
                    state.generation,
                    new_graph.nodes.len(),
                    new_graph.edges.len(),
                    diff.added_nodes.len(),
                    diff.removed_nodes.len(),
                    diff.added_edges.len(),
                    diff.removed_edges.len(),
                );
            }
            for node in diff.added_nodes.iter() {
                log::debug!("Node added: {} {}", node.id, node.label);
            }
            for node in diff.removed_nodes.iter() {
                log::debug!("Node removed: {} {}", node.id, node.label);
            }
            new_graph
        }
        _ => old_graph,
    }
}

fn report_switch(state: &PollState<SwitchView>) {
    if let Some(e) = state.error.as_ref() {
        log::warn!("{e}");
        return;
    }
    if let Some(view) = state.value() {
        log::info!(
            "Switch {} generation {}: {} flow entries",
            view.id,
            state.generation,
            view.flow_table.len()
        );
        for entry in view.flow_table.iter() {
            let actions: Vec<String> =
                entry.actions.iter().map(|a| a.to_string()).collect();
            log::debug!(
                "  table {} priority {} packets {} actions [{}]",
                entry.table_id.unwrap_or_default(),
                entry.priority.unwrap_or_default(),
                entry.packet_count.unwrap_or_default(),
                actions.join(", ")
            );
        }
    }
}

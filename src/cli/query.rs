// SPDX-License-Identifier: Apache-2.0

use sdnconsole::{
    fetch_topology, parse_dpid, HostIdentity, SouthboundClient,
    SwitchStateAggregator, TopologyGraph,
};
use serde::Serialize;

use crate::{config::Config, error::CliError};

pub(crate) async fn switches(
    matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let config = Config::from_matches(matches)?;
    let client = SouthboundClient::new(&config.controller)?;
    let mut ids = client.list_switches().await?;
    ids.sort_unstable();
    to_output_string(&ids, matches.is_present("JSON"))
}

pub(crate) async fn topology(
    matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let config = Config::from_matches(matches)?;
    let host_identity = host_identity(matches, &config);
    let client = SouthboundClient::new(&config.controller)?;
    let snapshot = fetch_topology(&client).await?;
    if snapshot.is_empty() {
        log::info!("Controller reported no topology data");
    }
    let graph = TopologyGraph::build(&snapshot, host_identity);
    to_output_string(&graph, matches.is_present("JSON"))
}

pub(crate) async fn show(
    matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let config = Config::from_matches(matches)?;
    let switch_id = switch_id_from_matches(matches)?;
    let client = SouthboundClient::new(&config.controller)?;
    let mut aggregator = SwitchStateAggregator::new(client);
    aggregator.select(Some(switch_id)).await?;
    match aggregator.current_view() {
        Some(view) => to_output_string(view, matches.is_present("JSON")),
        None => Err(CliError::from(format!(
            "Switch {switch_id} reported no state"
        ))),
    }
}

pub(crate) fn switch_id_from_matches(
    matches: &clap::ArgMatches,
) -> Result<u64, CliError> {
    match matches.value_of("DPID") {
        Some(dpid) => Ok(parse_dpid(dpid)?),
        None => Err(CliError {
            code: crate::error::EX_USAGE,
            error_msg: "Switch DPID is required".to_string(),
        }),
    }
}

pub(crate) fn host_identity(
    matches: &clap::ArgMatches,
    config: &Config,
) -> HostIdentity {
    if matches.is_present("MAC_HOST_IDS") {
        HostIdentity::MacAddress
    } else {
        config.topology.host_identity
    }
}

pub(crate) fn to_output_string<T>(
    value: &T,
    json: bool,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    Ok(if json {
        serde_json::to_string_pretty(value)?
    } else {
        serde_yaml::to_string(value)?
    })
}

// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use sdnconsole::{FlowEntry, SouthboundClient, SwitchStateAggregator};

use crate::{
    config::Config,
    error::CliError,
    query::{switch_id_from_matches, to_output_string},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowOperation {
    Add,
    Delete,
}

pub(crate) async fn flow_mutate(
    matches: &clap::ArgMatches,
    operation: FlowOperation,
) -> Result<String, CliError> {
    let config = Config::from_matches(matches)?;
    let switch_id = switch_id_from_matches(matches)?;
    let entry = match matches.value_of("FLOW_FILE") {
        Some("-") | None => flow_entry_from_reader(&mut std::io::stdin())?,
        Some(file_path) => {
            flow_entry_from_reader(&mut std::fs::File::open(file_path)?)?
        }
    };

    let client = SouthboundClient::new(&config.controller)?;
    let mut aggregator = SwitchStateAggregator::new(client);
    aggregator.select(Some(switch_id)).await?;
    match operation {
        FlowOperation::Add => aggregator.apply_add(&entry).await?,
        FlowOperation::Delete => aggregator.apply_delete(&entry).await?,
    }

    match aggregator.current_view() {
        Some(view) => {
            to_output_string(&view.flow_table, matches.is_present("JSON"))
        }
        None => Ok(String::new()),
    }
}

// YAML parser also takes JSON input.
pub(crate) fn flow_entry_from_reader<R>(
    reader: &mut R,
) -> Result<FlowEntry, CliError>
where
    R: Read,
{
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    // Replace non-breaking space '\u{A0}' to normal space
    let content = content.replace('\u{A0}', " ");
    Ok(serde_yaml::from_str(&content)?)
}

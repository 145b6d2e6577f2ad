// SPDX-License-Identifier: Apache-2.0

mod config;
mod error;
mod flow;
mod query;
mod watch;

use std::future::Future;

use env_logger::Builder;
use log::LevelFilter;

use crate::error::CliError;
use crate::flow::FlowOperation;

const APP_NAME: &str = "sdnconsolectl";

const SUB_CMD_SWITCHES: &str = "switches";
const SUB_CMD_TOPOLOGY: &str = "topology";
const SUB_CMD_SHOW: &str = "show";
const SUB_CMD_ADD: &str = "add";
const SUB_CMD_DEL: &str = "del";
const SUB_CMD_WATCH: &str = "watch";
const SUB_CMD_VERSION: &str = "version";

fn main() {
    let matches = clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about("Command line operator console of SDN controller")
        .subcommand_required(true)
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Set verbose level")
                .global(true),
        )
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .help("Disable logging")
                .global(true),
        )
        .arg(
            clap::Arg::new("CONFIG")
                .long("config")
                .takes_value(true)
                .help("Configuration file path")
                .global(true),
        )
        .arg(
            clap::Arg::new("CONTROLLER")
                .long("controller")
                .takes_value(true)
                .help("Controller REST API URL, overrides configuration")
                .global(true),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_SWITCHES)
                .about("List switch ids known by controller")
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_TOPOLOGY)
                .about("Show topology graph of switches and hosts")
                .arg(json_arg())
                .arg(mac_host_ids_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_SHOW)
                .about("Show flow table, descriptor and statistics of switch")
                .arg(dpid_arg())
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_ADD)
                .about("Add flow entry to switch")
                .arg(dpid_arg())
                .arg(flow_file_arg())
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_DEL)
                .about("Delete flow entries matching given entry from switch")
                .alias("delete")
                .arg(dpid_arg())
                .arg(flow_file_arg())
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_WATCH)
                .about("Poll controller and log changes until interrupted")
                .arg(
                    clap::Arg::new("DPID")
                        .long("switch")
                        .takes_value(true)
                        .help("Also poll state of this switch"),
                )
                .arg(mac_host_ids_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_VERSION).about("Show version"),
        )
        .get_matches();

    let (log_module_filters, log_level) =
        match matches.occurrences_of("verbose") {
            0 => (vec!["sdnconsole", "sdnconsolectl"], LevelFilter::Info),
            1 => (vec!["sdnconsole", "sdnconsolectl"], LevelFilter::Debug),
            _ => (vec![""], LevelFilter::Debug),
        };

    if !matches.is_present("quiet") {
        let mut log_builder = Builder::new();
        for log_module_filter in log_module_filters {
            if !log_module_filter.is_empty() {
                log_builder.filter(Some(log_module_filter), log_level);
            } else {
                log_builder.filter(None, log_level);
            }
        }
        log_builder.init();
    }

    if let Some(matches) = matches.subcommand_matches(SUB_CMD_SWITCHES) {
        print_result_and_exit(run(query::switches(matches)));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_TOPOLOGY)
    {
        print_result_and_exit(run(query::topology(matches)));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_SHOW) {
        print_result_and_exit(run(query::show(matches)));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_ADD) {
        print_result_and_exit(run(flow::flow_mutate(
            matches,
            FlowOperation::Add,
        )));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_DEL) {
        print_result_and_exit(run(flow::flow_mutate(
            matches,
            FlowOperation::Delete,
        )));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_WATCH) {
        print_result_and_exit(run(watch::watch(matches)));
    } else if matches.subcommand_matches(SUB_CMD_VERSION).is_some() {
        print_string_and_exit(format!(
            "{} {}",
            APP_NAME,
            clap::crate_version!()
        ));
    }
}

fn json_arg() -> clap::Arg<'static> {
    clap::Arg::new("JSON")
        .long("json")
        .takes_value(false)
        .help("Show in json format")
}

fn mac_host_ids_arg() -> clap::Arg<'static> {
    clap::Arg::new("MAC_HOST_IDS")
        .long("mac-host-ids")
        .takes_value(false)
        .help("Identify host nodes by MAC address instead of position")
}

fn dpid_arg() -> clap::Arg<'static> {
    clap::Arg::new("DPID")
        .required(true)
        .index(1)
        .help("Switch datapath id, decimal, 0x prefixed or 16 hex digits")
}

fn flow_file_arg() -> clap::Arg<'static> {
    clap::Arg::new("FLOW_FILE")
        .required(false)
        .index(2)
        .help("YAML or JSON flow entry file, read stdin if omitted or '-'")
}

fn run<F>(fut: F) -> Result<String, CliError>
where
    F: Future<Output = Result<String, CliError>>,
{
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(fut)
}

fn print_result_and_exit(result: Result<String, CliError>) {
    match result {
        Ok(s) => print_string_and_exit(s),
        Err(e) => print_error_and_exit(e),
    }
}

fn print_error_and_exit(e: CliError) {
    eprintln!("{e}");
    std::process::exit(e.code);
}

fn print_string_and_exit(s: String) {
    if !s.is_empty() {
        println!("{s}");
    }
    std::process::exit(0);
}

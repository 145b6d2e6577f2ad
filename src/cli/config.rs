// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use sdnconsole::{HostIdentity, PollerConfig, SouthboundConfig};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) controller: SouthboundConfig,
    #[serde(default)]
    pub(crate) topology: TopologyConfig,
    #[serde(default)]
    pub(crate) switch: SwitchConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TopologyConfig {
    #[serde(default = "default_topology_interval_ms")]
    pub(crate) interval_ms: u64,
    #[serde(default)]
    pub(crate) min_gap_ms: u64,
    #[serde(default)]
    pub(crate) host_identity: HostIdentity,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        let preset = PollerConfig::topology();
        Self {
            interval_ms: preset.interval_ms,
            min_gap_ms: preset.min_gap_ms,
            host_identity: HostIdentity::default(),
        }
    }
}

impl TopologyConfig {
    pub(crate) fn poller_config(&self) -> PollerConfig {
        PollerConfig::new(self.interval_ms, self.min_gap_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SwitchConfig {
    #[serde(default = "default_switch_interval_ms")]
    pub(crate) interval_ms: u64,
    #[serde(default)]
    pub(crate) min_gap_ms: u64,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        let preset = PollerConfig::switch_state();
        Self {
            interval_ms: preset.interval_ms,
            min_gap_ms: preset.min_gap_ms,
        }
    }
}

impl SwitchConfig {
    pub(crate) fn poller_config(&self) -> PollerConfig {
        PollerConfig::new(self.interval_ms, self.min_gap_ms)
    }
}

fn default_topology_interval_ms() -> u64 {
    PollerConfig::topology().interval_ms
}

fn default_switch_interval_ms() -> u64 {
    PollerConfig::switch_state().interval_ms
}

impl Config {
    pub(crate) const DEFAULT_CONFIG_PATH: &'static str =
        "/etc/sdnconsole/sdnconsole.conf";

    /// Missing file means default configuration.
    pub(crate) fn load(path: &str) -> Result<Self, CliError> {
        let path = std::path::Path::new(path);
        if !path.exists() {
            log::debug!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            return Ok(Config::default());
        }
        let mut fd = std::fs::File::open(path)?;
        let mut content = String::new();
        fd.read_to_string(&mut content)?;
        match toml::from_str::<Config>(&content) {
            Ok(c) => {
                c.validate()?;
                log::info!("Configuration loaded:\n{content}");
                Ok(c)
            }
            Err(e) => Err(CliError {
                code: crate::error::EX_DATAERR,
                error_msg: format!(
                    "Failed to read configuration from {}: {e}",
                    path.display()
                ),
            }),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CliError> {
        self.topology.poller_config().validate()?;
        self.switch.poller_config().validate()?;
        Ok(())
    }

    /// Load the file named by `--config` or the default one, then apply the
    /// `--controller` override.
    pub(crate) fn from_matches(
        matches: &clap::ArgMatches,
    ) -> Result<Self, CliError> {
        let path = matches
            .value_of("CONFIG")
            .unwrap_or(Self::DEFAULT_CONFIG_PATH);
        let mut config = Self::load(path)?;
        if let Some(url) = matches.value_of("CONTROLLER") {
            config.controller.url = url.to_string();
        }
        Ok(config)
    }
}

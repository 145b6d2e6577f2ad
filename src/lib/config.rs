// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, SdnError};

const DEFAULT_CONTROLLER_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
const DEFAULT_TOPOLOGY_INTERVAL_MS: u64 = 1000;
const DEFAULT_SWITCH_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
/// How to reach the southbound controller.
pub struct SouthboundConfig {
    /// Base URL of the controller REST API, default `http://localhost:8080`.
    #[serde(default = "default_controller_url")]
    pub url: String,
    /// Timeout applied to every single request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SouthboundConfig {
    fn default() -> Self {
        Self {
            url: default_controller_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl SouthboundConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_controller_url() -> String {
    DEFAULT_CONTROLLER_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
/// Cadence of one [crate::ReconcilingPoller].
pub struct PollerConfig {
    /// Time between two timer ticks, in milliseconds.
    pub interval_ms: u64,
    /// A fetch is skipped when the previous successful fetch completed
    /// less than this many milliseconds ago. Zero disables the guard.
    #[serde(default)]
    pub min_gap_ms: u64,
}

impl PollerConfig {
    pub fn new(interval_ms: u64, min_gap_ms: u64) -> Self {
        Self {
            interval_ms,
            min_gap_ms,
        }
    }

    /// Default cadence for topology (links and hosts).
    pub fn topology() -> Self {
        Self::new(DEFAULT_TOPOLOGY_INTERVAL_MS, 0)
    }

    /// Default cadence for the selected switch state.
    pub fn switch_state() -> Self {
        Self::new(DEFAULT_SWITCH_INTERVAL_MS, 0)
    }

    pub fn validate(&self) -> Result<(), SdnError> {
        if self.interval_ms == 0 {
            let e = SdnError::new(
                ErrorKind::InvalidArgument,
                "Poller interval_ms must be greater than 0".to_string(),
            );
            log::error!("{}", e);
            return Err(e);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn min_gap(&self) -> Duration {
        Duration::from_millis(self.min_gap_ms)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::topology()
    }
}

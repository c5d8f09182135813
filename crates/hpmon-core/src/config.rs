// ── Runtime sampler configuration ──
//
// These types describe which printer to sample and where its samples go.
// They never touch disk: the binary builds a `SamplerConfig` from the loaded
// config file and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use hpmon_api::{Endpoint, TransportConfig};

use crate::throttle::{DEFAULT_MIN_INTERVAL, Throttle};

/// Everything one sampling cycle needs.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// The printer's embedded web server.
    pub endpoint: Endpoint,
    /// Trust anchor and request timeout.
    pub transport: TransportConfig,
    /// Round-robin store the samples go into.
    pub store_path: PathBuf,
    /// Gap required since the last sample before a new one is written.
    pub min_interval: Duration,
}

impl SamplerConfig {
    pub fn new(endpoint: Endpoint, ca_cert: impl Into<PathBuf>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            endpoint,
            transport: TransportConfig::pinned(ca_cert),
            store_path: store_path.into(),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::new(self.min_interval)
    }
}

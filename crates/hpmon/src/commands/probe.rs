//! Fetch and extract without touching the store.

use hpmon_config::Config;
use hpmon_core::Sampler;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let sampler = Sampler::from_config(&config.sampler_config()?)?;
    let counters = sampler.probe().await?;
    super::print_counters(&counters, global)
}

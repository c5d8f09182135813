//! Config subcommand handlers.

use hpmon_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// `config path` runs without a loaded config; `config show` loads one if
/// the caller has not.
pub fn handle(
    args: &ConfigArgs,
    config: Option<&Config>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = hpmon_config::resolve_config_path(global.config.as_deref());

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string());
            Ok(())
        }

        ConfigCommand::Show => {
            let loaded;
            let config = match config {
                Some(config) => config,
                None => {
                    loaded = hpmon_config::load(&path)?;
                    &loaded
                }
            };
            let out = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(config)?,
                OutputFormat::Table | OutputFormat::Plain => config.to_toml()?,
            };
            output::print_output(out.trim_end());
            Ok(())
        }
    }
}

//! Command dispatch and handlers.

pub mod config_cmd;
pub mod extract;
mod probe;
mod sample;
mod store_cmd;

use hpmon_config::Config;
use hpmon_core::Counters;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Route a command that needs the loaded configuration.
pub async fn dispatch(cmd: Command, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Sample => sample::handle(config, global).await,
        Command::Probe => probe::handle(config, global).await,
        Command::Info => store_cmd::info(config, global),
        Command::Fetch(args) => store_cmd::fetch(config, &args, global),
        Command::Config(args) => config_cmd::handle(&args, Some(config), global),
        // Handled in main before the config is loaded
        Command::Extract(args) => extract::handle(&args, global).await,
        Command::Completions(_) => Ok(()),
    }
}

// ── Shared rendering ─────────────────────────────────────────────────

/// Print a pair of counters in the selected format.
pub(crate) fn print_counters(counters: &Counters, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render(
        global.output,
        counters,
        |c| {
            output::detail(&[
                ("simplex", c.simplex.to_string()),
                ("duplex", c.duplex.to_string()),
            ])
        },
        |c| format!("{} {}", c.simplex, c.duplex),
    )?;
    output::print_output(&out);
    Ok(())
}

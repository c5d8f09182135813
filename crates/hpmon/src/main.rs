mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Cli, Command, ConfigCommand};
use crate::error::{CliError, exit_code};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version come through here too, on stdout with status 0
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                exit_code::USAGE
            } else {
                exit_code::SUCCESS
            };
            std::process::exit(code);
        }
    };

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let command = cli.command.unwrap_or(Command::Sample);

    match command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hpmon", &mut std::io::stdout());
            Ok(())
        }

        // Commands that work without a config file
        Command::Extract(args) => {
            let _guard = logging::init(cli.global.verbose, cli.global.log_file.as_deref())?;
            commands::extract::handle(&args, &cli.global).await
        }
        Command::Config(args) if matches!(args.command, ConfigCommand::Path) => {
            commands::config_cmd::handle(&args, None, &cli.global)
        }

        // Everything else reads the config file first
        cmd => {
            let path = hpmon_config::resolve_config_path(cli.global.config.as_deref());
            let config = hpmon_config::load(&path)?;

            let log_file = cli.global.log_file.clone().or_else(|| config.logfile.clone());
            let _guard = logging::init(cli.global.verbose, log_file.as_deref())?;
            info!(config = %path.display(), "Starting hpmon");

            let result = commands::dispatch(cmd, &config, &cli.global).await;
            if let Err(ref err) = result {
                error!(code = err.exit_code(), "{err}");
            }
            result
        }
    }
}

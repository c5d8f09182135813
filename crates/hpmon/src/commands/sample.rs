//! The default command: one sampling cycle.

use hpmon_config::Config;
use hpmon_core::{CycleOutcome, Sampler};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let sampler = Sampler::from_config(&config.sampler_config()?)?;
    let outcome = sampler.run_cycle().await?;

    let color = output::should_color(global.color);
    let out = output::render(
        global.output,
        &outcome,
        |o| outcome_table(o, color),
        outcome_plain,
    )?;
    output::print_output(&out);
    Ok(())
}

fn outcome_table(outcome: &CycleOutcome, color: bool) -> String {
    let counters = outcome.counters();
    let mut rows = vec![
        (
            "outcome",
            output::status(
                &outcome.state().to_string(),
                matches!(outcome, CycleOutcome::Updated { .. }),
                color,
            ),
        ),
        ("simplex", counters.simplex.to_string()),
        ("duplex", counters.duplex.to_string()),
    ];
    match outcome {
        CycleOutcome::Updated { at, .. } => rows.push(("recorded at", at.to_rfc3339())),
        CycleOutcome::Skipped { since_last, .. } => {
            rows.push(("since last", format!("{since_last}s")));
        }
    }
    output::detail(&rows)
}

/// `updated <simplex> <duplex> <unix>` or `skipped <simplex> <duplex> <secs>`.
fn outcome_plain(outcome: &CycleOutcome) -> String {
    let counters = outcome.counters();
    let tail = match outcome {
        CycleOutcome::Updated { at, .. } => at.timestamp(),
        CycleOutcome::Skipped { since_last, .. } => *since_last,
    };
    format!(
        "{} {} {} {tail}",
        outcome.state(),
        counters.simplex,
        counters.duplex
    )
}

//! Read-only views of the page-count store.

use std::path::Path;

use hpmon_config::Config;
use hpmon_core::rrd::{Consolidation, Rrd, RrdInfo, Series};

use crate::cli::{FetchArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn open(path: &Path) -> Result<Rrd, CliError> {
    Rrd::open(path).map_err(|e| CliError::Store {
        operation: "read",
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

// ── Info ─────────────────────────────────────────────────────────────

pub fn info(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let rrd = open(config.store_path()?)?;
    let info = rrd.info();
    let out = output::render(global.output, &info, info_table, info_plain)?;
    output::print_output(&out);
    Ok(())
}

fn info_table(info: &RrdInfo) -> String {
    let header = output::detail(&[
        ("step", format!("{}s", info.step)),
        ("last update", output::timestamp(info.last_update)),
    ]);

    let sources = output::grid(
        vec![
            "data source".into(),
            "type".into(),
            "heartbeat".into(),
            "last value".into(),
        ],
        info.data_sources
            .iter()
            .map(|ds| {
                vec![
                    ds.name.clone(),
                    ds.kind.to_string(),
                    format!("{}s", ds.heartbeat),
                    output::value(ds.last_value),
                ]
            })
            .collect(),
    );

    let archives = output::grid(
        vec!["cf".into(), "xff".into(), "steps/row".into(), "rows".into()],
        info.archives
            .iter()
            .map(|a| {
                vec![
                    a.cf.to_string(),
                    a.xff.to_string(),
                    a.pdp_per_row.to_string(),
                    a.rows.to_string(),
                ]
            })
            .collect(),
    );

    format!("{header}\n{sources}\n{archives}")
}

/// `<step> <last_update>`, then one `<name> <last value>` line per source.
fn info_plain(info: &RrdInfo) -> String {
    let mut lines = vec![format!("{} {}", info.step, info.last_update)];
    lines.extend(
        info.data_sources
            .iter()
            .map(|ds| format!("{} {}", ds.name, output::value(ds.last_value))),
    );
    lines.join("\n")
}

// ── Fetch ────────────────────────────────────────────────────────────

pub fn fetch(config: &Config, args: &FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config.store_path()?;
    let rrd = open(path)?;
    let series = rrd
        .fetch(
            Consolidation::Average,
            args.start.unwrap_or(i64::MIN),
            args.end.unwrap_or(i64::MAX),
        )
        .map_err(|e| CliError::Store {
            operation: "read",
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let out = output::render(global.output, &series, series_table, series_plain)?;
    output::print_output(&out);
    Ok(())
}

fn series_table(series: &Series) -> String {
    let mut header = vec!["time".to_owned()];
    header.extend(series.names.iter().cloned());
    let rows = series
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![output::timestamp(row.time)];
            cells.extend(row.values.iter().map(|v| output::value(*v)));
            cells
        })
        .collect();
    output::grid(header, rows)
}

/// One `<unix> <value>...` line per row, `U` for unknown.
fn series_plain(series: &Series) -> String {
    series
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.time.to_string()];
            cells.extend(row.values.iter().map(|v| output::value(*v)));
            cells.join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Run command implementation

use std::fs;
use std::path::PathBuf;

use qbench_common::{format_bytes, format_seconds, styles, OutputFormat, QbenchError, Result, SweepProgress};
use serde::Serialize;

use super::report::post_process;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{resolve, RunArgs};
use crate::layout::OutputLayout;
use crate::report::{Heatmap, ResultFrame, HEATMAP_TITLE};
use crate::runner::GuardedRunner;
use crate::simulator::StatevectorBackend;
use crate::store::JsonFileStore;

/// What `qbench run --format json` prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct RunSummary {
    pub output_dir: PathBuf,
    pub executed: usize,
    pub skipped: usize,
    pub records: usize,
    pub heatmap: Heatmap,
}

pub fn run_bench(args: &RunArgs, level: LogLevel, format: OutputFormat) -> Result<()> {
    let summary = execute(args, level)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| QbenchError::Serialization { message: e.to_string() })?;
            println!("{json}");
        }
        OutputFormat::Table => {
            if summary.heatmap.is_empty() {
                log(level, LogLevel::Normal, &styles::warning("No results to plot"));
            } else {
                log(level, LogLevel::Normal, &styles::header(HEATMAP_TITLE));
                log(level, LogLevel::Normal, &summary.heatmap.to_table().render());
            }
        }
    }
    Ok(())
}

/// Run or resume the sweep, then rewrite the CSV and heatmap.
pub(super) fn execute(args: &RunArgs, level: LogLevel) -> Result<RunSummary> {
    let config = resolve(args)?;
    let plan = config.plan;
    let layout = OutputLayout::new(&args.output_dir);

    log(
        level,
        LogLevel::Normal,
        &styles::header(&format!("qbench: {} units → {}", plan.len(), layout.root().display())),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  qubits {}..={}, depth {}..={}, {} circuits, {} shots, {} on {}, {} resume",
            plan.qubits.min,
            plan.qubits.max,
            plan.depth.min,
            plan.depth.max,
            plan.replicas,
            config.n_shots,
            config.method,
            config.device,
            config.resume,
        ),
    );

    layout.create()?;
    let parameters = plan.parameters()?;
    let backend = StatevectorBackend::new(config.n_shots, config.method, &config.device, config.seed)?;

    tracing::info!("Running circuits");
    let mut progress = SweepProgress::new(parameters.len() as u64, "Benchmarking", level != LogLevel::Quiet);
    let mut runner = GuardedRunner::new(JsonFileStore::new(layout.results_json())).with_strategy(config.resume);
    let outcome = runner.run_observed(&parameters, backend, &mut progress);
    progress.finish();
    let outcome = outcome.map_err(QbenchError::from)?;

    log(
        level,
        LogLevel::Normal,
        &styles::success(&format!(
            "{} units executed, {} resumed from {}",
            outcome.executed,
            outcome.skipped,
            layout.results_json().display()
        )),
    );

    let records = outcome.collection.records();
    let total: f64 = records.iter().map(|r| r.time_taken).sum();
    let peak = records.iter().filter_map(|r| r.peak_memory_bytes).max();
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  simulated {} in total, peak resident memory {}",
            format_seconds(total),
            peak.map_or_else(|| "n/a".to_string(), format_bytes)
        ),
    );

    tracing::info!("Post-processing & plotting");
    discard_stale_frame(&layout, records.len(), outcome.executed > 0)?;
    let heatmap = post_process(&layout, records, false)?;

    Ok(RunSummary {
        output_dir: layout.root().to_path_buf(),
        executed: outcome.executed,
        skipped: outcome.skipped,
        records: records.len(),
        heatmap,
    })
}

/// Remove `results.csv` when it no longer describes the persisted records.
///
/// The frame is stale once this invocation executed anything, or when its
/// row count differs from the store. Unreadable frames are stale too.
fn discard_stale_frame(layout: &OutputLayout, records: usize, executed: bool) -> Result<()> {
    let csv = layout.results_csv();
    if !csv.exists() {
        return Ok(());
    }
    let stale = executed || ResultFrame::read_csv(&csv).map_or(true, |frame| frame.len() != records);
    if stale {
        tracing::debug!(path = %csv.display(), "discarding stale result frame");
        fs::remove_file(&csv).map_err(|e| QbenchError::io(format!("removing {}", csv.display()), e))?;
    }
    Ok(())
}

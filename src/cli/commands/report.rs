//! Report command implementation

use std::fs;

use qbench_common::{styles, OutputFormat, QbenchError, Result};

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::ReportArgs;
use crate::layout::OutputLayout;
use crate::record::ResultRecord;
use crate::report::{make_result_frame, render_heatmap_svg, Heatmap, HEATMAP_TITLE};
use crate::runner::GuardedRunner;
use crate::store::JsonFileStore;

pub fn run_report(args: &ReportArgs, level: LogLevel, format: OutputFormat) -> Result<()> {
    let heatmap = build_report(args, level)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&heatmap)
                .map_err(|e| QbenchError::Serialization { message: e.to_string() })?;
            println!("{json}");
        }
        OutputFormat::Table => {
            let layout = OutputLayout::new(&args.output_dir);
            log(level, LogLevel::Normal, &styles::header(HEATMAP_TITLE));
            log(level, LogLevel::Normal, &heatmap.to_table().render());
            log(
                level,
                LogLevel::Normal,
                &styles::success(&format!(
                    "Wrote {} and {}",
                    layout.results_csv().display(),
                    layout.heatmap_svg().display()
                )),
            );
        }
    }
    Ok(())
}

/// Rebuild the CSV and heatmap of `args.output_dir` from its persisted store.
pub(super) fn build_report(args: &ReportArgs, level: LogLevel) -> Result<Heatmap> {
    let layout = OutputLayout::new(&args.output_dir);
    let results = layout.results_json();
    if !results.exists() {
        return Err(QbenchError::Report {
            message: format!("no results at {}; run `qbench run` first", results.display()),
        });
    }

    let collection = GuardedRunner::new(JsonFileStore::new(&results)).load()?;
    log(
        level,
        LogLevel::Normal,
        &styles::header(&format!("Report: {} records from {}", collection.len(), results.display())),
    );

    let csv = layout.results_csv();
    if args.rebuild && csv.exists() {
        fs::remove_file(&csv).map_err(|e| QbenchError::io(format!("removing {}", csv.display()), e))?;
        log(level, LogLevel::Verbose, &format!("  removed stale {}", csv.display()));
    }

    post_process(&layout, collection.records(), true)
}

/// Write the result frame and the heatmap plot for `records`.
///
/// An existing CSV takes precedence over `records`. With no data there is
/// nothing to plot; that is an error only when `require_data` is set.
pub(super) fn post_process(
    layout: &OutputLayout,
    records: &[ResultRecord],
    require_data: bool,
) -> Result<Heatmap> {
    let frame = make_result_frame(layout.results_csv(), records)?;
    let heatmap = frame.heatmap();
    if heatmap.is_empty() {
        if require_data {
            return Err(QbenchError::Report { message: "no result records to plot".into() });
        }
        tracing::warn!("no result records, skipping heatmap");
        return Ok(heatmap);
    }

    render_heatmap_svg(&heatmap, layout.heatmap_svg())?;
    tracing::info!(path = %layout.heatmap_svg().display(), "heatmap written");
    Ok(heatmap)
}

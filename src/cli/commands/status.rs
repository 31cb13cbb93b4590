//! Status command implementation

use std::path::PathBuf;

use qbench_common::{styles, OutputFormat, QbenchError, Result, TableBuilder};
use serde::Serialize;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{resolve, RunArgs};
use crate::layout::OutputLayout;
use crate::runner::{GuardedRunner, ResumeStrategy};
use crate::store::JsonFileStore;
use crate::sweep::SweepParameter;

/// Progress of a configured sweep against its store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct SweepStatus {
    pub store: PathBuf,
    pub resume: ResumeStrategy,
    pub total: usize,
    pub persisted: usize,
    pub remaining: usize,
    pub next: Option<SweepParameter>,
}

pub fn run_status(args: &RunArgs, level: LogLevel, format: OutputFormat) -> Result<()> {
    let status = sweep_status(args)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&status)
                .map_err(|e| QbenchError::Serialization { message: e.to_string() })?;
            println!("{json}");
        }
        OutputFormat::Table => {
            log(level, LogLevel::Normal, &styles::header(&format!("Status of {}", status.store.display())));
            let table = TableBuilder::new()
                .headers(vec!["Units", "Persisted", "Remaining", "Next"])
                .row(vec![
                    status.total.to_string(),
                    status.persisted.to_string(),
                    status.remaining.to_string(),
                    status.next.map_or_else(|| "-".into(), |p| p.to_string()),
                ])
                .build();
            log(level, LogLevel::Normal, &table.render());
            if status.remaining == 0 {
                log(level, LogLevel::Normal, &styles::success("Sweep complete"));
            } else {
                log(
                    level,
                    LogLevel::Normal,
                    &styles::info(&format!("`qbench run` resumes with {} resume", status.resume)),
                );
            }
        }
    }
    Ok(())
}

/// Compare the configured sweep with what its store holds.
pub(super) fn sweep_status(args: &RunArgs) -> Result<SweepStatus> {
    let config = resolve(args)?;
    let layout = OutputLayout::new(&args.output_dir);
    let parameters = config.plan.parameters()?;

    let runner = GuardedRunner::new(JsonFileStore::new(layout.results_json())).with_strategy(config.resume);
    let collection = runner.load()?;
    let pending = runner.pending(&parameters, &collection);

    Ok(SweepStatus {
        store: layout.results_json(),
        resume: runner.strategy(),
        total: parameters.len(),
        persisted: collection.len(),
        remaining: pending.len(),
        next: pending.first().copied(),
    })
}

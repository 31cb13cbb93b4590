//! Post-processing of sweep results
//!
//! Flattens records into a `(n_qbits, depth, time_taken)` frame persisted as
//! CSV, aggregates it into a mean-time heatmap and renders that heatmap as an
//! SVG image or a terminal table.

mod heatmap;

use std::path::{Path, PathBuf};

use qbench_common::QbenchError;
use serde::{Deserialize, Serialize};

use crate::record::ResultRecord;

pub use heatmap::{render_heatmap_svg, Heatmap, HEATMAP_TITLE};

/// Errors from post-processing
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render {path}: {message}")]
    Plot { path: PathBuf, message: String },

    #[error("nothing to plot: the result frame is empty")]
    Empty,
}

impl From<ReportError> for QbenchError {
    fn from(err: ReportError) -> Self {
        QbenchError::Report { message: err.to_string() }
    }
}

/// One row of the result frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRow {
    pub n_qbits: u32,
    pub depth: u32,
    pub time_taken: f64,
}

impl From<&ResultRecord> for FrameRow {
    fn from(record: &ResultRecord) -> Self {
        Self { n_qbits: record.n_qbits, depth: record.depth, time_taken: record.time_taken }
    }
}

/// Tabular view of a sweep: one row per record, in record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFrame {
    rows: Vec<FrameRow>,
}

impl ResultFrame {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ResultRecord>) -> Self {
        Self { rows: records.into_iter().map(FrameRow::from).collect() }
    }

    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read a frame previously written by [`write_csv`](Self::write_csv).
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let csv_err = |source| ReportError::Csv { path: path.to_path_buf(), source };

        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        let rows = reader.deserialize().collect::<Result<Vec<FrameRow>, _>>().map_err(csv_err)?;
        Ok(Self { rows })
    }

    /// Write the frame with a `n_qbits,depth,time_taken` header.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let csv_err = |source| ReportError::Csv { path: path.to_path_buf(), source };

        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        for row in &self.rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| csv_err(e.into()))?;
        Ok(())
    }

    /// Mean `time_taken` per `(n_qbits, depth)` cell.
    pub fn heatmap(&self) -> Heatmap {
        Heatmap::from_rows(&self.rows)
    }
}

/// Build the result frame, or load it when `csv_path` already exists.
///
/// A frame built from `records` is written to `csv_path` before returning.
pub fn make_result_frame<'a>(
    csv_path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a ResultRecord>,
) -> Result<ResultFrame, ReportError> {
    let csv_path = csv_path.as_ref();
    if csv_path.exists() {
        tracing::info!(path = %csv_path.display(), "loading existing result frame");
        return ResultFrame::read_csv(csv_path);
    }

    let frame = ResultFrame::from_records(records);
    frame.write_csv(csv_path)?;
    tracing::debug!(path = %csv_path.display(), rows = frame.len(), "result frame written");
    Ok(frame)
}

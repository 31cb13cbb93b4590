//! Files produced under an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use qbench_common::{QbenchError, Result};

/// Paths of a run's artifacts below `OUTPUT_DIR`.
///
/// ```text
/// OUTPUT_DIR/
/// ├── data/results.json   checkpointed result records
/// ├── results.csv         n_qbits, depth, time_taken
/// └── heatmap.svg         mean execution time per cell
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn results_json(&self) -> PathBuf {
        self.data_dir().join("results.json")
    }

    pub fn results_csv(&self) -> PathBuf {
        self.root.join("results.csv")
    }

    pub fn heatmap_svg(&self) -> PathBuf {
        self.root.join("heatmap.svg")
    }

    /// Create the output and data directories.
    pub fn create(&self) -> Result<()> {
        let data = self.data_dir();
        fs::create_dir_all(&data)
            .map_err(|e| QbenchError::io(format!("creating {}", data.display()), e))
    }
}

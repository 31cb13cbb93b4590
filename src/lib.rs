//! qbench: resumable benchmark sweeps for quantum circuit simulators
//!
//! A sweep enumerates `(n_qbits, depth, replica)` units, runs each through a
//! work function and checkpoints every result to a durable store, so an
//! interrupted sweep picks up where it stopped. Finished sweeps are reduced
//! to a CSV frame and an execution-time heatmap.
//!
//! # Modules
//!
//! - [`sweep`]: sweep parameters, ranges and enumeration
//! - [`record`]: result records and the duplicate-free collection
//! - [`store`]: durable result stores
//! - [`runner`]: the guarded, resumable batch runner
//! - [`simulator`]: random circuits and the built-in state-vector backend
//! - [`report`]: result frame and heatmap
//! - [`config`]: YAML settings and command-line arguments
//! - [`layout`]: files produced under an output directory
//! - [`cli`]: command implementations

pub mod cli;
pub mod config;
pub mod layout;
pub mod record;
pub mod report;
pub mod runner;
pub mod simulator;
pub mod store;
pub mod sweep;

pub use qbench_common::{QbenchError, Result};
pub use record::{ResultCollection, ResultRecord};
pub use runner::{GuardedRunner, ResumeStrategy, RunOutcome, SweepWork};
pub use store::{InMemoryStore, JsonFileStore, ResultStore};
pub use sweep::{enumerate, SweepParameter, SweepPlan, SweepRange};

//! Guarded batch runner
//!
//! Executes a sequence of [`SweepParameter`]s against an injected work
//! function, appending each record to a [`ResultCollection`] and persisting
//! the whole collection after every unit. A run that is interrupted, by a
//! failing unit or by process termination, resumes from the last checkpoint
//! on the next invocation.
//!
//! # Example
//!
//! ```
//! use qbench::record::ResultRecord;
//! use qbench::runner::GuardedRunner;
//! use qbench::store::InMemoryStore;
//! use qbench::sweep::{enumerate, SweepParameter};
//!
//! let params = enumerate(1..=2, 1..=1, 2).unwrap();
//! let mut runner = GuardedRunner::new(InMemoryStore::new());
//! let outcome = runner
//!     .run(&params, |p: &SweepParameter| Ok::<_, std::io::Error>(ResultRecord::new(*p, 0.0)))
//!     .unwrap();
//! assert_eq!(outcome.collection.len(), 4);
//! ```

mod observer;

#[cfg(test)]
mod tests;

use std::fmt;

use qbench_common::QbenchError;
use serde::{Deserialize, Serialize};

use crate::record::{ResultCollection, ResultRecord};
use crate::store::{ResultStore, StoreError};
use crate::sweep::SweepParameter;

pub use observer::{NoopObserver, RunObserver};

/// How already-persisted records are matched against the parameter sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStrategy {
    /// A parameter is done iff a record with the same key is persisted.
    #[default]
    Keyed,
    /// Skip exactly the first `len(collection)` parameters.
    Ordinal,
}

impl fmt::Display for ResumeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyed => write!(f, "keyed"),
            Self::Ordinal => write!(f, "ordinal"),
        }
    }
}

/// The unit of work executed for every parameter.
///
/// Implemented for any `FnMut(&SweepParameter) -> Result<ResultRecord, E>`.
pub trait SweepWork {
    type Error;

    fn execute(&mut self, parameter: &SweepParameter) -> Result<ResultRecord, Self::Error>;
}

impl<F, E> SweepWork for F
where
    F: FnMut(&SweepParameter) -> Result<ResultRecord, E>,
{
    type Error = E;

    fn execute(&mut self, parameter: &SweepParameter) -> Result<ResultRecord, E> {
        self(parameter)
    }
}

/// Failure of a guarded run.
#[derive(Debug, thiserror::Error)]
pub enum RunError<E> {
    /// The store could not be read or a checkpoint could not be written.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The work function failed. Units before `parameter` are persisted.
    #[error("work unit {parameter} failed: {source}")]
    Work {
        parameter: SweepParameter,
        #[source]
        source: E,
    },
}

impl<E: fmt::Display> From<RunError<E>> for QbenchError {
    fn from(err: RunError<E>) -> Self {
        match err {
            RunError::Storage(e) => e.into(),
            RunError::Work { parameter, source } => QbenchError::WorkFailure {
                parameter: parameter.to_string(),
                message: source.to_string(),
            },
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Every persisted record, in append order
    pub collection: ResultCollection,
    /// Units executed by this invocation
    pub executed: usize,
    /// Units found already persisted and skipped
    pub skipped: usize,
}

/// Runs a parameter sequence with a checkpoint after every unit.
#[derive(Debug)]
pub struct GuardedRunner<S> {
    store: S,
    strategy: ResumeStrategy,
}

impl<S: ResultStore> GuardedRunner<S> {
    pub fn new(store: S) -> Self {
        Self { store, strategy: ResumeStrategy::default() }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ResumeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ResumeStrategy {
        self.strategy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted collection, or an empty one when nothing was
    /// persisted yet.
    pub fn load(&self) -> Result<ResultCollection, StoreError> {
        let collection = self.store.load()?.unwrap_or_default();
        if collection.dropped_duplicates() > 0 {
            tracing::warn!(
                store = %self.store.location(),
                dropped = collection.dropped_duplicates(),
                "discarded duplicate records while loading"
            );
        }
        Ok(collection)
    }

    /// Parameters of `parameters` that still need to run against `collection`.
    pub fn pending(
        &self,
        parameters: &[SweepParameter],
        collection: &ResultCollection,
    ) -> Vec<SweepParameter> {
        match self.strategy {
            ResumeStrategy::Keyed => {
                parameters.iter().filter(|p| !collection.contains(p)).copied().collect()
            }
            ResumeStrategy::Ordinal => parameters.iter().skip(collection.len()).copied().collect(),
        }
    }

    /// Run `parameters` through `work`.
    pub fn run<W: SweepWork>(
        &mut self,
        parameters: &[SweepParameter],
        work: W,
    ) -> Result<RunOutcome, RunError<W::Error>> {
        self.run_observed(parameters, work, &mut NoopObserver)
    }

    /// Run `parameters` through `work`, reporting progress to `observer`.
    ///
    /// Each record is persisted before the next unit starts. The first work
    /// failure aborts the run; nothing is retried.
    pub fn run_observed<W, O>(
        &mut self,
        parameters: &[SweepParameter],
        mut work: W,
        observer: &mut O,
    ) -> Result<RunOutcome, RunError<W::Error>>
    where
        W: SweepWork,
        O: RunObserver + ?Sized,
    {
        let mut collection = self.load()?;
        if parameters.is_empty() {
            return Ok(RunOutcome { collection, executed: 0, skipped: 0 });
        }

        if self.strategy == ResumeStrategy::Ordinal && collection.len() > parameters.len() {
            tracing::warn!(
                persisted = collection.len(),
                parameters = parameters.len(),
                "store holds more records than the sweep has units"
            );
        }

        let pending = self.pending(parameters, &collection);
        let skipped = parameters.len() - pending.len();
        if skipped > 0 {
            tracing::info!(
                store = %self.store.location(),
                strategy = %self.strategy,
                completed = skipped,
                remaining = pending.len(),
                "resuming from checkpoint"
            );
        }
        observer.on_resume(skipped, parameters.len());

        let mut executed = 0;
        for parameter in pending {
            observer.on_start(&parameter);
            tracing::debug!(%parameter, "executing unit");

            let record = work
                .execute(&parameter)
                .map_err(|source| RunError::Work { parameter, source })?;
            let record = stamp(record, parameter);

            if !collection.push(record) {
                tracing::warn!(%parameter, "record already persisted; keeping the first");
                continue;
            }
            self.store.save(&collection)?;
            executed += 1;

            if let Some(record) = collection.records().last() {
                observer.on_complete(record, collection.len());
            }
        }

        Ok(RunOutcome { collection, executed, skipped })
    }
}

/// Run `parameters` through `work` against `store` with keyed resumption.
pub fn run<W, S>(
    parameters: &[SweepParameter],
    work: W,
    store: S,
) -> Result<RunOutcome, RunError<W::Error>>
where
    W: SweepWork,
    S: ResultStore,
{
    GuardedRunner::new(store).run(parameters, work)
}

/// Force the record's echoed inputs to match the parameter it ran for.
fn stamp(mut record: ResultRecord, parameter: SweepParameter) -> ResultRecord {
    if record.key() != parameter {
        tracing::warn!(%parameter, returned = %record.key(), "work returned a record for another unit");
        record.n_qbits = parameter.n_qbits;
        record.depth = parameter.depth;
        record.replica = parameter.replica;
    }
    record
}

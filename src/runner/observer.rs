//! Run observers
//!
//! Hooks into the runner loop. All methods default to no-ops, so an observer
//! only implements the events it cares about.

use qbench_common::SweepProgress;

use crate::record::ResultRecord;
use crate::sweep::SweepParameter;

/// Receives events from a guarded run.
pub trait RunObserver {
    /// Called once after the store is loaded, with the number of units
    /// already persisted and the sweep size.
    fn on_resume(&mut self, _completed: usize, _total: usize) {}

    /// Called before a unit executes.
    fn on_start(&mut self, _parameter: &SweepParameter) {}

    /// Called after a unit's record has been persisted.
    fn on_complete(&mut self, _record: &ResultRecord, _persisted: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

impl RunObserver for SweepProgress {
    fn on_resume(&mut self, completed: usize, _total: usize) {
        self.skip(completed as u64);
    }

    fn on_start(&mut self, parameter: &SweepParameter) {
        self.set_postfix(format!(
            "n_qbits={}, depth={}, n={}",
            parameter.n_qbits, parameter.depth, parameter.replica
        ));
    }

    fn on_complete(&mut self, _record: &ResultRecord, _persisted: usize) {
        self.advance();
    }
}

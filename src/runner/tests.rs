//! Tests for the guarded runner

use std::path::PathBuf;

use proptest::prelude::*;

use super::*;
use crate::store::InMemoryStore;
use crate::sweep::enumerate;

#[derive(Debug, thiserror::Error)]
#[error("simulated failure at {0}")]
struct Boom(SweepParameter);

/// Deterministic fake work that records every call.
#[derive(Default)]
struct FakeWork {
    calls: Vec<SweepParameter>,
    fail_on: Option<SweepParameter>,
}

impl FakeWork {
    fn failing_on(parameter: SweepParameter) -> Self {
        Self { calls: Vec::new(), fail_on: Some(parameter) }
    }
}

impl SweepWork for &mut FakeWork {
    type Error = Boom;

    fn execute(&mut self, parameter: &SweepParameter) -> Result<ResultRecord, Boom> {
        self.calls.push(*parameter);
        if self.fail_on == Some(*parameter) {
            return Err(Boom(*parameter));
        }
        let time = f64::from(parameter.n_qbits * 100 + parameter.depth * 10 + parameter.replica);
        Ok(ResultRecord::new(*parameter, time))
    }
}

/// Store whose saves start failing after a number of successes.
struct FlakyStore {
    inner: InMemoryStore,
    saves_left: usize,
}

impl ResultStore for FlakyStore {
    fn load(&self) -> crate::store::Result<Option<ResultCollection>> {
        self.inner.load()
    }

    fn save(&mut self, collection: &ResultCollection) -> crate::store::Result<()> {
        if self.saves_left == 0 {
            return Err(StoreError::Io {
                path: PathBuf::from("flaky.json"),
                source: std::io::Error::other("disk full"),
            });
        }
        self.saves_left -= 1;
        self.inner.save(collection)
    }

    fn location(&self) -> String {
        "flaky".to_string()
    }
}

fn seeded(params: &[SweepParameter]) -> ResultCollection {
    ResultCollection::from_records(params.iter().map(|p| ResultRecord::new(*p, -1.0)))
}

fn keys(collection: &ResultCollection) -> Vec<SweepParameter> {
    collection.iter().map(ResultRecord::key).collect()
}

// ---------------------------------------------------------------------------
// Fresh runs
// ---------------------------------------------------------------------------

#[test]
fn test_example_sweep_yields_records_in_order() {
    let params = enumerate(1..=2, 1..=1, 2).unwrap();
    let mut work = FakeWork::default();
    let mut runner = GuardedRunner::new(InMemoryStore::new());

    let outcome = runner.run(&params, &mut work).unwrap();

    assert_eq!(keys(&outcome.collection), params);
    assert_eq!(outcome.executed, 4);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(work.calls, params);
    assert_eq!(runner.strategy(), ResumeStrategy::Keyed);
    assert_eq!(runner.store().saves(), 4);
}

#[test]
fn test_checkpoint_after_every_unit() {
    let params = enumerate(1..=3, 1..=2, 1).unwrap();
    let mut store = InMemoryStore::new();
    let mut work = FakeWork::default();

    GuardedRunner::new(&mut store).run(&params, &mut work).unwrap();

    assert_eq!(store.saves(), params.len());
    assert_eq!(store.collection().unwrap().len(), params.len());
}

#[test]
fn test_free_function_uses_keyed_resume() {
    let params = enumerate(1..=2, 1..=2, 1).unwrap();
    let mut store = InMemoryStore::with_collection(seeded(&params[1..2]));
    let mut work = FakeWork::default();

    let outcome = run(&params, &mut work, &mut store).unwrap();

    assert_eq!(outcome.executed, 3);
    assert!(!work.calls.contains(&params[1]));
}

#[test]
fn test_closure_is_work() {
    let params = enumerate(1..=1, 1..=3, 1).unwrap();
    let mut runner = GuardedRunner::new(InMemoryStore::new());

    let outcome = runner
        .run(&params, |p: &SweepParameter| {
            Ok::<_, Boom>(ResultRecord::new(*p, 0.5).with_field("device", "CPU"))
        })
        .unwrap();

    assert_eq!(outcome.collection.len(), 3);
    assert_eq!(outcome.collection.records()[2].field("device"), Some(&serde_json::json!("CPU")));
}

// ---------------------------------------------------------------------------
// Resumption
// ---------------------------------------------------------------------------

#[test]
fn test_second_run_is_idempotent() {
    let params = enumerate(1..=2, 1..=2, 2).unwrap();
    let mut store = InMemoryStore::new();

    let first = GuardedRunner::new(&mut store).run(&params, &mut FakeWork::default()).unwrap();
    let saves = store.saves();

    let mut work = FakeWork::default();
    let second = GuardedRunner::new(&mut store).run(&params, &mut work).unwrap();

    assert!(work.calls.is_empty());
    assert_eq!(second.collection, first.collection);
    assert_eq!(second.skipped, params.len());
    assert_eq!(store.saves(), saves);
}

#[test]
fn test_partial_recovery_runs_only_the_tail() {
    let params = enumerate(1..=2, 1..=2, 2).unwrap();
    let k = 3;
    let mut store = InMemoryStore::with_collection(seeded(&params[..k]));
    let mut work = FakeWork::default();

    let outcome = GuardedRunner::new(&mut store).run(&params, &mut work).unwrap();

    assert_eq!(work.calls, params[k..].to_vec());
    assert_eq!(keys(&outcome.collection), params);
    assert_eq!(outcome.skipped, k);
    // Prior records are kept as persisted.
    assert_eq!(outcome.collection.records()[0].time_taken, -1.0);
}

#[test]
fn test_keyed_resume_fills_gaps() {
    let params = enumerate(1..=3, 1..=1, 1).unwrap();
    // Only the middle unit is persisted.
    let mut store = InMemoryStore::with_collection(seeded(&params[1..2]));
    let mut work = FakeWork::default();

    let outcome = GuardedRunner::new(&mut store).run(&params, &mut work).unwrap();

    assert_eq!(work.calls, vec![params[0], params[2]]);
    assert_eq!(outcome.collection.len(), 3);
}

#[test]
fn test_ordinal_resume_skips_by_count() {
    let params = enumerate(1..=3, 1..=1, 1).unwrap();
    // Only the middle unit is persisted; ordinal resume treats it as the first.
    let mut store = InMemoryStore::with_collection(seeded(&params[1..2]));
    let mut work = FakeWork::default();

    let mut runner = GuardedRunner::new(&mut store).with_strategy(ResumeStrategy::Ordinal);
    let outcome = runner.run(&params, &mut work).unwrap();

    assert_eq!(work.calls, vec![params[1], params[2]]);
    // The duplicate for params[1] is not appended.
    assert_eq!(outcome.collection.len(), 2);
    assert_eq!(outcome.executed, 1);
}

#[test]
fn test_ordinal_resume_with_oversized_store_runs_nothing() {
    let params = enumerate(1..=2, 1..=1, 1).unwrap();
    let stored = enumerate(1..=4, 1..=1, 1).unwrap();
    let mut store = InMemoryStore::with_collection(seeded(&stored));
    let mut work = FakeWork::default();

    let outcome = GuardedRunner::new(&mut store)
        .with_strategy(ResumeStrategy::Ordinal)
        .run(&params, &mut work)
        .unwrap();

    assert!(work.calls.is_empty());
    assert_eq!(outcome.collection.len(), 4);
}

#[test]
fn test_keyed_and_ordinal_agree_on_prefix_checkpoints() {
    let params = enumerate(1..=2, 1..=2, 1).unwrap();
    for strategy in [ResumeStrategy::Keyed, ResumeStrategy::Ordinal] {
        let mut store = InMemoryStore::with_collection(seeded(&params[..2]));
        let mut work = FakeWork::default();
        GuardedRunner::new(&mut store).with_strategy(strategy).run(&params, &mut work).unwrap();
        assert_eq!(work.calls, params[2..].to_vec(), "strategy {strategy}");
    }
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn test_empty_parameters_return_persisted_collection() {
    let stored = enumerate(1..=1, 1..=2, 1).unwrap();
    let mut store = InMemoryStore::with_collection(seeded(&stored));
    let mut work = FakeWork::default();

    let outcome = GuardedRunner::new(&mut store).run(&[], &mut work).unwrap();

    assert!(work.calls.is_empty());
    assert_eq!(outcome.collection.len(), 2);
    assert_eq!(store.saves(), 0);
}

#[test]
fn test_empty_parameters_on_empty_store() {
    let outcome = GuardedRunner::new(InMemoryStore::new()).run(&[], &mut FakeWork::default()).unwrap();
    assert!(outcome.collection.is_empty());
}

#[test]
fn test_mismatched_record_is_stamped_with_parameter() {
    let params = enumerate(1..=2, 1..=1, 1).unwrap();
    let mut runner = GuardedRunner::new(InMemoryStore::new());

    let outcome = runner
        .run(&params, |_: &SweepParameter| Ok::<_, Boom>(ResultRecord::new(SweepParameter::new(9, 9, 9), 0.0)))
        .unwrap();

    assert_eq!(keys(&outcome.collection), params);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_work_failure_aborts_with_prefix_persisted() {
    let params = enumerate(1..=2, 1..=2, 1).unwrap();
    let j = 3; // fail on the third unit
    let mut store = InMemoryStore::new();
    let mut work = FakeWork::failing_on(params[j - 1]);

    let err = GuardedRunner::new(&mut store).run(&params, &mut work).unwrap_err();

    match err {
        RunError::Work { parameter, ref source } => {
            assert_eq!(parameter, params[j - 1]);
            assert_eq!(source.0, params[j - 1]);
        }
        RunError::Storage(e) => panic!("unexpected storage error: {e}"),
    }
    assert_eq!(keys(store.collection().unwrap()), params[..j - 1].to_vec());
    assert_eq!(work.calls.len(), j);
}

#[test]
fn test_work_failure_then_resume_completes() {
    let params = enumerate(1..=2, 1..=2, 1).unwrap();
    let mut store = InMemoryStore::new();

    let _ = GuardedRunner::new(&mut store).run(&params, &mut FakeWork::failing_on(params[1]));
    let mut work = FakeWork::default();
    let outcome = GuardedRunner::new(&mut store).run(&params, &mut work).unwrap();

    assert_eq!(work.calls, params[1..].to_vec());
    assert_eq!(keys(&outcome.collection), params);
}

#[test]
fn test_failure_on_first_unit_persists_nothing() {
    let params = enumerate(1..=2, 1..=1, 1).unwrap();
    let mut store = InMemoryStore::new();

    let err = GuardedRunner::new(&mut store).run(&params, &mut FakeWork::failing_on(params[0]));

    assert!(err.is_err());
    assert!(store.collection().is_none());
}

#[test]
fn test_storage_failure_keeps_prior_checkpoint() {
    let params = enumerate(1..=2, 1..=2, 1).unwrap();
    let mut store = FlakyStore { inner: InMemoryStore::new(), saves_left: 2 };

    let err = GuardedRunner::new(&mut store).run(&params, &mut FakeWork::default()).unwrap_err();

    assert!(matches!(err, RunError::Storage(StoreError::Io { .. })));
    assert_eq!(keys(store.inner.collection().unwrap()), params[..2].to_vec());
}

#[test]
fn test_work_error_converts_to_work_failure() {
    let err: RunError<Boom> = RunError::Work {
        parameter: SweepParameter::new(4, 2, 9),
        source: Boom(SweepParameter::new(4, 2, 9)),
    };
    let err: QbenchError = err.into();
    assert_eq!(err.code(), "E020");
    assert!(err.to_string().contains("(n_qbits=4, depth=2, n=9)"));
}

#[test]
fn test_observer_sees_every_event() {
    #[derive(Default)]
    struct Events {
        resumed: Option<(usize, usize)>,
        started: usize,
        completed: Vec<usize>,
    }

    impl RunObserver for Events {
        fn on_resume(&mut self, completed: usize, total: usize) {
            self.resumed = Some((completed, total));
        }

        fn on_start(&mut self, _parameter: &SweepParameter) {
            self.started += 1;
        }

        fn on_complete(&mut self, _record: &ResultRecord, persisted: usize) {
            self.completed.push(persisted);
        }
    }

    let params = enumerate(1..=2, 1..=2, 1).unwrap();
    let mut store = InMemoryStore::with_collection(seeded(&params[..1]));
    let mut events = Events::default();

    GuardedRunner::new(&mut store)
        .run_observed(&params, &mut FakeWork::default(), &mut events)
        .unwrap();

    assert_eq!(events.resumed, Some((1, 4)));
    assert_eq!(events.started, 3);
    assert_eq!(events.completed, vec![2, 3, 4]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_restart_runs_exactly_the_remainder(
        max_q in 1u32..4, max_d in 1u32..4, replicas in 1u32..4, cut in 0usize..64,
    ) {
        let params = enumerate(1..=max_q, 1..=max_d, replicas).unwrap();
        let k = cut % (params.len() + 1);
        let mut store = InMemoryStore::with_collection(seeded(&params[..k]));
        let mut work = FakeWork::default();

        let outcome = GuardedRunner::new(&mut store).run(&params, &mut work).unwrap();

        prop_assert_eq!(work.calls.len(), params.len() - k);
        prop_assert_eq!(&work.calls[..], &params[k..]);
        prop_assert_eq!(keys(&outcome.collection), params);
    }

    #[test]
    fn prop_failure_persists_strict_prefix(
        max_q in 1u32..4, max_d in 1u32..4, pick in 0usize..64,
    ) {
        let params = enumerate(1..=max_q, 1..=max_d, 1).unwrap();
        let j = pick % params.len();
        let mut store = InMemoryStore::new();

        let result = GuardedRunner::new(&mut store).run(&params, &mut FakeWork::failing_on(params[j]));

        prop_assert!(result.is_err());
        let persisted = store.collection().map(keys).unwrap_or_default();
        prop_assert_eq!(persisted, params[..j].to_vec());
    }
}

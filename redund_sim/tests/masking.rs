use std::sync::Arc;

use redund_core::{
    ClimateCase, ClimateController, ClimateParams, MemorySink, NonZeroMeanPressure, NullSink,
    PressureCase, PressureParams, Reconciler, Replicator, ScreenedPressure, Voter,
};
use redund_sim::{Fault, FaultyReplica, Schedule};
use rstest::rstest;

fn controller() -> ClimateController {
    ClimateController::with_sink(ClimateParams::default(), Arc::new(NullSink))
}

fn tc5() -> ClimateCase {
    ClimateCase::from_parts(
        30.0,
        3.0,
        vec![vec![20.0], vec![18.0]],
        vec![vec![95.0, 70.0], vec![100.0, 0.0]],
    )
    .unwrap()
}

#[rstest]
#[case(Fault::StuckAt(100.0))]
#[case(Fault::StuckAt(0.0))]
#[case(Fault::Offset(15.0))]
#[case(Fault::Noise { amplitude: 3.0, seed: 42 })]
#[case(Fault::Crash)]
#[case(Fault::Timeout)]
fn single_faulty_replica_is_masked(#[case] fault: Fault, #[values(0, 1, 2)] faulty: usize) {
    let mut replicator = Replicator::new();
    for i in 0..3 {
        replicator = if i == faulty {
            replicator.with_variant(FaultyReplica::new("faulty", controller(), fault))
        } else {
            replicator.with_variant(controller())
        };
    }
    let sink = MemorySink::new();
    let set = replicator.replicate(&tc5(), &sink).unwrap();
    let voted = Voter::default().vote_replicas_grid(&set, &sink).unwrap();
    assert_eq!(voted, vec![vec![100.0, 80.0], vec![100.0, 10.0]]);
}

#[test]
fn transient_version_fault_recovers_on_retry() {
    let case = PressureCase::new(vec![vec![10.0, 10.0], vec![30.0, 30.0], vec![20.0, 20.0]], 100.0);
    let screened = ScreenedPressure::with_sink(&PressureParams::default(), Arc::new(NullSink));
    let flaky = FaultyReplica::new("v2-flaky", NonZeroMeanPressure, Fault::Crash)
        .with_schedule(Schedule::FirstN(1));

    let sink = MemorySink::new();
    let r = Reconciler::default()
        .reconcile(&screened, &flaky, &case, &sink)
        .unwrap();
    assert_eq!(r.output, vec![0, 2, 1]);
    assert_eq!(r.attempts, 2);
    assert_eq!(flaky.calls(), 2);
    assert_eq!(sink.count("version_mismatch"), 1);
}

#[test]
fn permanent_version_fault_is_persistent() {
    let case = PressureCase::new(vec![vec![10.0], vec![1.0]], 5.0);
    let screened = ScreenedPressure::with_sink(&PressureParams::default(), Arc::new(NullSink));
    let shifted = FaultyReplica::new("v2-shifted", NonZeroMeanPressure, Fault::Offset(1.0));

    let err = Reconciler::default()
        .reconcile(&screened, &shifted, &case, &MemorySink::new())
        .unwrap_err();
    assert_eq!(
        err,
        redund_core::RedundError::PersistentMismatch {
            attempts: 3,
            primary: "[1]".into(),
            secondary: "[2]".into(),
        }
    );
}

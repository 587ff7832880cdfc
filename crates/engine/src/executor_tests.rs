//! Tests for the simulated execution engine.
//!
//! Runs are stepped with `ManualScheduler`, so no test waits on a real
//! timer; the one test that needs overlapping runs uses tokio's paused
//! clock instead.

use std::sync::Arc;
use std::time::Duration;

use nodes::mock::ScriptedOutcome;
use nodes::Outcome;

use crate::executor::{ExecutionRun, ExecutorConfig, RunEvent, SimulatedExecutor};
use crate::graph::PipelineGraph;
use crate::models::{RunState, Settings, StageKind};
use crate::simulation::{ManualScheduler, TokioScheduler};
use crate::EngineError;

use crate::models::RunState::{Idle, Running, Success};

/// A linear pipeline with `n` transform stages.
fn graph_with(n: usize) -> PipelineGraph {
    let mut graph = PipelineGraph::new();
    for i in 0..n {
        graph.add_stage(StageKind::Transform, format!("step-{i}"), Settings::new());
    }
    graph.link_consecutive();
    graph
}

fn manual_executor() -> (SimulatedExecutor, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::new());
    let executor = SimulatedExecutor::new(ExecutorConfig::default(), scheduler.clone());
    (executor, scheduler)
}

// ============================================================
// State machine (no scheduler)
// ============================================================

#[test]
fn state_machine_visits_stages_in_index_order() {
    let mut graph = graph_with(3);
    let mut run = ExecutionRun::start(&graph).expect("non-empty graph");

    let mut snapshots = Vec::new();
    while let Some(event) = run.advance(&mut graph) {
        snapshots.push((event, graph.run_states()));
    }

    let ids = run.stage_ids().to_vec();
    assert_eq!(
        snapshots,
        vec![
            (RunEvent::StageStarted { index: 0, stage_id: ids[0].clone() }, vec![Running, Idle, Idle]),
            (RunEvent::StageStarted { index: 1, stage_id: ids[1].clone() }, vec![Success, Running, Idle]),
            (RunEvent::StageStarted { index: 2, stage_id: ids[2].clone() }, vec![Success, Success, Running]),
            (RunEvent::Completed, vec![Success, Success, Success]),
        ]
    );
    assert!(run.is_finished());
    assert_eq!(run.advance(&mut graph), None);
}

#[test]
fn empty_graph_never_starts() {
    let graph = PipelineGraph::new();
    assert!(matches!(ExecutionRun::start(&graph), Err(EngineError::NoStages)));
}

#[test]
fn stage_deleted_mid_run_is_skipped() {
    let mut graph = graph_with(3);
    let mut run = ExecutionRun::start(&graph).unwrap();
    run.advance(&mut graph);

    let doomed = run.stage_ids()[1].clone();
    graph.delete_stage(&doomed);

    while run.advance(&mut graph).is_some() {}
    assert_eq!(graph.run_states(), vec![Success, Success]);
}

#[test]
fn fail_current_marks_error_and_stops() {
    let mut graph = graph_with(3);
    let mut run = ExecutionRun::start(&graph).unwrap();
    assert_eq!(run.fail_current(&mut graph), None);

    run.advance(&mut graph);
    run.advance(&mut graph);
    let (index, _) = run.fail_current(&mut graph).unwrap();

    assert_eq!(index, 1);
    assert_eq!(graph.run_states(), vec![Success, RunState::Error, Idle]);
    assert_eq!(run.advance(&mut graph), None);
}

// ============================================================
// SimulatedExecutor
// ============================================================

#[tokio::test]
async fn run_ends_with_every_stage_successful() {
    let (executor, scheduler) = manual_executor();
    let mut graph = graph_with(4);

    let report = executor.run(&mut graph).await.expect("run succeeds");

    assert_eq!(report.started_indices(), vec![0, 1, 2, 3]);
    assert_eq!(report.steps.last().unwrap().event, RunEvent::Completed);
    assert!(graph.list_stages().iter().all(|s| s.run_state() == Success));
    assert!(!executor.is_running());

    // One step interval per stage, nothing after the last one.
    assert_eq!(scheduler.requested(), vec![Duration::from_millis(1500); 4]);
}

#[tokio::test]
async fn exactly_one_stage_runs_at_a_time() {
    let (executor, _) = manual_executor();
    let mut graph = graph_with(5);

    let report = executor.run(&mut graph).await.unwrap();

    for step in &report.steps {
        let running = step.states.iter().filter(|s| **s == Running).count();
        match step.event {
            RunEvent::StageStarted { index, .. } => {
                assert_eq!(running, 1);
                assert_eq!(step.states[index], Running);
                assert!(step.states[..index].iter().all(|s| *s == Success));
                assert!(step.states[index + 1..].iter().all(|s| *s == Idle));
            }
            RunEvent::Completed => assert_eq!(running, 0),
        }
    }
}

#[tokio::test]
async fn steps_are_observed_before_their_interval_elapses() {
    let (executor, scheduler) = manual_executor();
    let mut graph = graph_with(3);
    let mut seen = Vec::new();

    executor
        .run_observed(&mut graph, |step| {
            seen.push((step.event.clone(), scheduler.requested().len()));
        })
        .await
        .unwrap();

    let sleeps_before: Vec<usize> = seen.iter().map(|(_, sleeps)| *sleeps).collect();
    assert_eq!(sleeps_before, vec![0, 1, 2, 3]);
    assert_eq!(seen.last().map(|(event, _)| event), Some(&RunEvent::Completed));
}

#[tokio::test]
async fn empty_pipeline_reports_no_stages_and_never_sleeps() {
    let (executor, scheduler) = manual_executor();
    let mut graph = PipelineGraph::new();

    let result = executor.run(&mut graph).await;

    assert!(matches!(result, Err(EngineError::NoStages)));
    assert!(graph.is_empty());
    assert!(scheduler.requested().is_empty());
    assert!(!executor.is_running());
}

#[tokio::test]
async fn failing_stage_stops_the_run() {
    let outcomes = Arc::new(ScriptedOutcome::sequence(
        vec![Outcome::Success, Outcome::Failure],
        Outcome::Success,
    ));
    let (executor, scheduler) = manual_executor();
    let executor = executor.with_outcomes(outcomes.clone());
    let mut graph = graph_with(3);
    let failing_id = graph.list_stages()[1].id.clone();

    let err = executor.run(&mut graph).await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::StageFailed { ref stage_id, index: 1 } if *stage_id == failing_id
    ));
    assert_eq!(graph.run_states(), vec![Success, RunState::Error, Idle]);
    assert_eq!(outcomes.call_count(), 2);
    assert_eq!(scheduler.requested().len(), 2);
    assert!(!executor.is_running());
}

#[tokio::test]
async fn rerun_starts_from_idle_again() {
    let (executor, _) = manual_executor();
    let mut graph = graph_with(2);

    executor.run(&mut graph).await.unwrap();
    let report = executor.run(&mut graph).await.unwrap();

    assert_eq!(report.steps[0].states, vec![Running, Idle]);
}

#[tokio::test(start_paused = true)]
async fn overlapping_run_is_rejected() {
    let executor = SimulatedExecutor::new(ExecutorConfig::default(), Arc::new(TokioScheduler));
    let mut first = graph_with(2);
    let mut second = graph_with(2);

    let (a, b) = tokio::join!(executor.run(&mut first), executor.run(&mut second));

    // Exactly one run goes through; the rejected graph is never touched.
    match (&a, &b) {
        (Ok(_), Err(EngineError::AlreadyRunning)) => {
            assert_eq!(second.run_states(), vec![Idle, Idle]);
        }
        (Err(EngineError::AlreadyRunning), Ok(_)) => {
            assert_eq!(first.run_states(), vec![Idle, Idle]);
        }
        other => panic!("expected one run to be rejected, got {other:?}"),
    }
    assert!(!executor.is_running());
}

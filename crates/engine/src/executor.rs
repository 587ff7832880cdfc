//! Simulated pipeline execution.
//!
//! Nothing moves any data. A run walks the stage list in insertion order:
//! at step `i` stage `i` is `running`, every earlier stage is `success`
//! and every later stage is `idle`; the driver then waits one step
//! interval. After the last step every stage is `success`.
//!
//! [`ExecutionRun`] is the bare state machine, advanced one event at a
//! time. [`SimulatedExecutor`] drives it with a [`Scheduler`] and an
//! [`OutcomeProvider`] deciding whether each stage succeeds.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nodes::traits::AlwaysSucceed;
use nodes::OutcomeProvider;
use tracing::{error, info, instrument};

use crate::graph::PipelineGraph;
use crate::models::RunState;
use crate::simulation::Scheduler;
use crate::EngineError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Time each stage spends `running`.
    pub step_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(1500),
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Stage `index` is now `running`.
    StageStarted { index: usize, stage_id: String },
    /// Every stage is `success`.
    Completed,
}

/// One pass over a pipeline's stages.
///
/// The stage ids are captured when the run starts; stages added afterwards
/// are not visited and stages deleted meanwhile are skipped silently when
/// their state is written.
#[derive(Debug, Clone)]
pub struct ExecutionRun {
    order: Vec<String>,
    next: usize,
    finished: bool,
}

impl ExecutionRun {
    /// # Errors
    /// [`EngineError::NoStages`] if the graph is empty; the graph is left
    /// untouched.
    pub fn start(graph: &PipelineGraph) -> Result<Self, EngineError> {
        if graph.is_empty() {
            return Err(EngineError::NoStages);
        }
        Ok(Self {
            order: graph.list_stages().iter().map(|s| s.id.clone()).collect(),
            next: 0,
            finished: false,
        })
    }

    /// Apply the next transition to `graph`. Returns `None` once the run
    /// has finished.
    pub fn advance(&mut self, graph: &mut PipelineGraph) -> Option<RunEvent> {
        if self.finished {
            return None;
        }

        if self.next < self.order.len() {
            let current = self.next;
            for (index, id) in self.order.iter().enumerate() {
                let state = match index.cmp(&current) {
                    CmpOrdering::Less => RunState::Success,
                    CmpOrdering::Equal => RunState::Running,
                    CmpOrdering::Greater => RunState::Idle,
                };
                graph.set_run_state(id, state);
            }
            self.next += 1;
            return Some(RunEvent::StageStarted {
                index: current,
                stage_id: self.order[current].clone(),
            });
        }

        for id in &self.order {
            graph.set_run_state(id, RunState::Success);
        }
        self.finished = true;
        Some(RunEvent::Completed)
    }

    /// Mark the stage most recently started as `error` and end the run.
    /// Returns its index and id, or `None` if no stage has started.
    pub fn fail_current(&mut self, graph: &mut PipelineGraph) -> Option<(usize, String)> {
        if self.finished || self.next == 0 {
            return None;
        }
        let index = self.next - 1;
        let id = self.order[index].clone();
        graph.set_run_state(&id, RunState::Error);
        self.finished = true;
        Some((index, id))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stage_ids(&self) -> &[String] {
        &self.order
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The graph's run states right after one event.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStep {
    pub event: RunEvent,
    pub states: Vec<RunState>,
}

/// Every transition a completed run went through, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub steps: Vec<RunStep>,
}

impl RunReport {
    fn record(&mut self, event: &RunEvent, graph: &PipelineGraph) -> &RunStep {
        self.steps.push(RunStep {
            event: event.clone(),
            states: graph.run_states(),
        });
        &self.steps[self.steps.len() - 1]
    }

    /// Indices of the stages in the order they were started.
    pub fn started_indices(&self) -> Vec<usize> {
        self.steps
            .iter()
            .filter_map(|step| match step.event {
                RunEvent::StageStarted { index, .. } => Some(index),
                RunEvent::Completed => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SimulatedExecutor
// ---------------------------------------------------------------------------

/// Drives [`ExecutionRun`]s with real or simulated delays.
///
/// One executor runs one pipeline at a time; a second `run` while the
/// first is in flight fails with [`EngineError::AlreadyRunning`].
pub struct SimulatedExecutor {
    config: ExecutorConfig,
    scheduler: Arc<dyn Scheduler>,
    outcomes: Arc<dyn OutcomeProvider>,
    running: AtomicBool,
}

impl SimulatedExecutor {
    /// Executor whose stages always succeed.
    pub fn new(config: ExecutorConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            config,
            scheduler,
            outcomes: Arc::new(AlwaysSucceed),
            running: AtomicBool::new(false),
        }
    }

    /// Decide each stage's outcome with `outcomes`.
    pub fn with_outcomes(mut self, outcomes: Arc<dyn OutcomeProvider>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run every stage of `graph` to completion.
    ///
    /// # Errors
    /// - [`EngineError::NoStages`] for an empty graph (nothing is started).
    /// - [`EngineError::AlreadyRunning`] if this executor is busy.
    /// - [`EngineError::StageFailed`] if the outcome provider fails a stage;
    ///   that stage is left `error`, earlier ones `success`, later ones `idle`.
    pub async fn run(&self, graph: &mut PipelineGraph) -> Result<RunReport, EngineError> {
        self.run_observed(graph, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_step` as each step happens,
    /// before the step interval is waited out.
    #[instrument(skip_all, fields(stages = graph.len()))]
    pub async fn run_observed<F>(
        &self,
        graph: &mut PipelineGraph,
        mut on_step: F,
    ) -> Result<RunReport, EngineError>
    where
        F: FnMut(&RunStep),
    {
        let mut run = ExecutionRun::start(graph)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        info!("pipeline started");
        let mut report = RunReport::default();

        while let Some(event) = run.advance(graph) {
            on_step(report.record(&event, graph));

            if let RunEvent::StageStarted { index, stage_id } = &event {
                info!(index, stage_id = %stage_id, "stage running");
                self.scheduler.sleep(self.config.step_interval).await;

                if !self.outcomes.next_outcome().is_success() {
                    run.fail_current(graph);
                    error!(index, stage_id = %stage_id, "stage failed, run aborted");
                    return Err(EngineError::StageFailed {
                        stage_id: stage_id.clone(),
                        index: *index,
                    });
                }
            }
        }

        info!(steps = report.steps.len(), "pipeline complete");
        Ok(report)
    }
}

/// Clears the running flag however the run ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

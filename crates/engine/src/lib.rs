//! `engine` crate — the pipeline graph, its simulated execution, and the
//! simulated side flows around it (templates, assistant, connections,
//! import and export).

pub mod models;
pub mod error;
pub mod layout;
pub mod graph;
pub mod simulation;
pub mod executor;
pub mod config_store;
pub mod persist;
pub mod templates;
pub mod assistant;
pub mod connections;
pub mod import;
pub mod export;

pub use models::{Link, Position, RunState, Settings, Stage, StageKind, StageSpec};
pub use error::EngineError;
pub use graph::PipelineGraph;
pub use layout::Placement;
pub use simulation::{ManualScheduler, Scheduler, SimulationConfig, TokioScheduler};
pub use executor::{ExecutionRun, ExecutorConfig, RunEvent, RunReport, SimulatedExecutor};
pub use persist::{load_pipeline, save_pipeline, PipelineMeta};

#[cfg(test)]
mod executor_tests;

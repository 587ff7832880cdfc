//! Engine-level error types.

use thiserror::Error;

/// Errors produced by the pipeline engine (graph checks, runs, simulated
/// operations and persistence).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Graph errors ------

    /// Two or more stages share the same ID.
    #[error("duplicate stage ID: '{0}'")]
    DuplicateStageId(String),

    /// A link references a stage ID that doesn't exist in the pipeline.
    #[error("link references unknown stage '{stage_id}' ({side} side)")]
    UnknownStageReference {
        stage_id: String,
        side: &'static str,
    },

    /// A stage could not be interpreted.
    #[error(transparent)]
    InvalidStage(#[from] nodes::NodeError),

    // ------ Run errors ------

    /// A run was requested on a pipeline with no stages.
    #[error("no nodes: add some nodes to your pipeline first")]
    NoStages,

    /// The executor is already running a pipeline.
    #[error("a pipeline run is already in progress")]
    AlreadyRunning,

    /// A stage failed; the run stopped there.
    #[error("stage '{stage_id}' (#{index}) failed")]
    StageFailed {
        stage_id: String,
        index: usize,
    },

    // ------ User-facing errors ------

    /// A required input was missing or malformed. Raised before anything
    /// is mutated.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A simulated operation (connection test, import) reported failure.
    #[error("simulated failure: {0}")]
    SimulatedFailure(String),

    #[error("unknown template: '{0}'")]
    UnknownTemplate(String),

    // ------ Infrastructure ------

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence error from the db crate.
    #[error("database error: {0}")]
    Database(#[from] db::DbError),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

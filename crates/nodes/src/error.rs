//! Node-level error type.

use thiserror::Error;

use crate::StageKind;

/// Errors raised while interpreting a single stage.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    /// A kind string did not name one of `source | transform | destination`.
    #[error("unknown stage kind: '{0}'")]
    UnknownKind(String),

    /// A settings map could not be read as the form for its kind.
    #[error("invalid {kind} settings: {message}")]
    InvalidSettings {
        kind: StageKind,
        message: String,
    },
}

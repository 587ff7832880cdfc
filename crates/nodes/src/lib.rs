//! `nodes` crate — stage kinds, the per-kind settings forms, and the
//! [`OutcomeProvider`] seam every simulated operation draws its result from.
//!
//! The engine crate owns the pipeline graph; this crate only knows what a
//! single stage *is* and how its settings map is interpreted.

pub mod error;
pub mod kind;
pub mod forms;
pub mod traits;
pub mod mock;

pub use error::NodeError;
pub use kind::StageKind;
pub use forms::{Settings, StageForm};
pub use traits::{Outcome, OutcomeProvider};

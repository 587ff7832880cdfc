//! `db` crate — pure persistence layer.
//!
//! Holds the stored pipeline document and the [`PipelineRepository`]
//! key-value interface with an in-memory and a JSON-file backend.
//! No business logic lives here.

pub mod error;
pub mod models;
pub mod repository;

pub use error::DbError;
pub use models::{PipelineDraft, PipelineRecord, StoredEdge, StoredNode, StoredPosition};
pub use repository::{JsonFileStore, MemoryStore, PipelineRepository};

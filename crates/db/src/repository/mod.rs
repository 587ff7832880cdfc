//! The pipeline repository — a small key-value store keyed by pipeline name.
//!
//! Every backend implements [`PipelineRepository`]; the upsert rules live
//! in [`apply_upsert`] so both backends stamp timestamps identically.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{DbError, PipelineDraft, PipelineRecord};

pub mod memory;
pub mod file;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// Fetch the pipeline saved under `name`.
    async fn get(&self, name: &str) -> Result<PipelineRecord, DbError>;

    /// Overwrite the pipeline with the draft's name in place, or append it.
    async fn upsert(&self, draft: PipelineDraft) -> Result<PipelineRecord, DbError>;

    /// All saved pipelines in first-save order.
    async fn list(&self) -> Result<Vec<PipelineRecord>, DbError>;

    /// Returns `DbError::NotFound` if nothing was deleted.
    async fn delete(&self, name: &str) -> Result<(), DbError>;
}

/// Last-write-wins upsert over an ordered record list.
///
/// `created` survives an overwrite; `updated` is always strictly greater
/// than the value it replaces.
pub(crate) fn apply_upsert(
    records: &mut Vec<PipelineRecord>,
    draft: PipelineDraft,
    now: DateTime<Utc>,
) -> PipelineRecord {
    match records.iter().position(|r| r.name == draft.name) {
        Some(index) => {
            let existing = &mut records[index];
            let updated = if now > existing.updated {
                now
            } else {
                existing.updated + Duration::milliseconds(1)
            };
            *existing = PipelineRecord {
                name: draft.name,
                description: draft.description,
                schedule: draft.schedule,
                nodes: draft.nodes,
                edges: Some(draft.edges),
                created: existing.created,
                updated,
            };
            existing.clone()
        }
        None => {
            let record = PipelineRecord {
                name: draft.name,
                description: draft.description,
                schedule: draft.schedule,
                nodes: draft.nodes,
                edges: Some(draft.edges),
                created: now,
                updated: now,
            };
            records.push(record.clone());
            record
        }
    }
}

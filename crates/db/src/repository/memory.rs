//! In-process repository backend.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{apply_upsert, PipelineRepository};
use crate::{DbError, PipelineDraft, PipelineRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<PipelineRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PipelineRepository for MemoryStore {
    async fn get(&self, name: &str) -> Result<PipelineRecord, DbError> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| DbError::NotFound(name.to_owned()))
    }

    async fn upsert(&self, draft: PipelineDraft) -> Result<PipelineRecord, DbError> {
        let mut records = self.records.write().await;
        let record = apply_upsert(&mut records, draft, Utc::now());
        debug!(name = %record.name, "pipeline upserted in memory");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<PipelineRecord>, DbError> {
        Ok(self.records.read().await.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), DbError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.name != name);
        if records.len() == before {
            return Err(DbError::NotFound(name.to_owned()));
        }
        Ok(())
    }
}

//! JSON-file repository backend.
//!
//! The file is a JSON object of string keys, like browser local storage;
//! saved pipelines live as an array under [`SAVED_PIPELINES_KEY`]. Other
//! keys in the file are preserved untouched.
//!
//! Writes go to a sibling `<file>.tmp` which is then renamed over the
//! store, so an interrupted write leaves the previous contents intact.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{apply_upsert, PipelineRepository};
use crate::{DbError, PipelineDraft, PipelineRecord};

/// Key under which saved pipelines are stored.
pub const SAVED_PIPELINES_KEY: &str = "savedPipelines";

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_document(&self) -> Result<Map<String, Value>, DbError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read_records(&self) -> Result<(Map<String, Value>, Vec<PipelineRecord>), DbError> {
        let mut document = self.read_document().await?;
        let records = match document.remove(SAVED_PIPELINES_KEY) {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        Ok((document, records))
    }

    async fn write_records(
        &self,
        mut document: Map<String, Value>,
        records: &[PipelineRecord],
    ) -> Result<(), DbError> {
        document.insert(SAVED_PIPELINES_KEY.to_owned(), serde_json::to_value(records)?);
        let bytes = serde_json::to_vec_pretty(&document)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), count = records.len(), "storage file written");
        Ok(())
    }
}

#[async_trait]
impl PipelineRepository for JsonFileStore {
    async fn get(&self, name: &str) -> Result<PipelineRecord, DbError> {
        let _guard = self.lock.lock().await;
        let (_, records) = self.read_records().await?;
        records
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| DbError::NotFound(name.to_owned()))
    }

    async fn upsert(&self, draft: PipelineDraft) -> Result<PipelineRecord, DbError> {
        let _guard = self.lock.lock().await;
        let (document, mut records) = self.read_records().await?;
        let record = apply_upsert(&mut records, draft, Utc::now());
        self.write_records(document, &records).await?;
        info!(name = %record.name, path = %self.path.display(), "pipeline saved");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<PipelineRecord>, DbError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_records().await?.1)
    }

    async fn delete(&self, name: &str) -> Result<(), DbError> {
        let _guard = self.lock.lock().await;
        let (document, mut records) = self.read_records().await?;
        let before = records.len();
        records.retain(|r| r.name != name);
        if records.len() == before {
            return Err(DbError::NotFound(name.to_owned()));
        }
        self.write_records(document, &records).await?;
        info!(name, "pipeline deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, schedule: &str) -> PipelineDraft {
        PipelineDraft {
            name: name.into(),
            description: "nightly sync".into(),
            schedule: schedule.into(),
            nodes: vec![],
            edges: vec![],
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipelines.json");

        let first = JsonFileStore::new(&path).upsert(draft("etl", "0 0 * * *")).await.unwrap();
        let second = JsonFileStore::new(&path).upsert(draft("etl", "*/5 * * * *")).await.unwrap();

        let records = JsonFileStore::new(&path).list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].schedule, "*/5 * * * *");
        assert_eq!(second.created, first.created);
        assert!(second.updated > first.updated);
    }

    #[tokio::test]
    async fn unrelated_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, br#"{ "theme": "dark" }"#).await.unwrap();

        let store = JsonFileStore::new(&path);
        store.upsert(draft("etl", "")).await.unwrap();

        let raw: Value = serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[SAVED_PIPELINES_KEY].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.list().await, Err(DbError::Serialization(_))));
    }

    #[tokio::test]
    async fn interrupted_write_leaves_previous_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipelines.json");
        let store = JsonFileStore::new(&path);
        store.upsert(draft("etl", "0 0 * * *")).await.unwrap();

        // Half-written temp file from a crashed save.
        let temp = dir.path().join("pipelines.json.tmp");
        tokio::fs::write(&temp, b"{ \"savedPipel").await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        store.upsert(draft("sync", "")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
        assert!(!temp.exists());
    }
}

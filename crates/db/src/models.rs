//! Stored document structs.
//!
//! These are *persistence* models — they carry no domain behaviour and use
//! plain strings for stage kind and status. Domain types live in the
//! `engine` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// nodes / edges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StoredPosition {
    pub x: f64,
    pub y: f64,
}

/// One stage as it appears in a stored pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: String,
    /// `source`, `transform` or `destination`.
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub position: StoredPosition,
    /// `idle`, `running`, `success` or `error`.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "idle".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEdge {
    pub source: String,
    pub target: String,
}

// ---------------------------------------------------------------------------
// pipelines
// ---------------------------------------------------------------------------

/// What a caller hands to [`crate::PipelineRepository::upsert`]; the
/// repository owns the timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDraft {
    pub name: String,
    pub description: String,
    /// Cron expression, stored unvalidated.
    pub schedule: String,
    pub nodes: Vec<StoredNode>,
    pub edges: Vec<StoredEdge>,
}

/// A saved pipeline, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub nodes: Vec<StoredNode>,
    /// `None` for documents that only carry nodes; an unlinked pipeline
    /// is written as an empty list.
    #[serde(default)]
    pub edges: Option<Vec<StoredEdge>>,
    /// Hand-written documents may omit the timestamps.
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
}

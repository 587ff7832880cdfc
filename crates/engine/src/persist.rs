//! Saving and loading pipelines through a [`PipelineRepository`].
//!
//! Converts between the engine's graph and the stored document shape of
//! the `db` crate.

use db::{PipelineDraft, PipelineRecord, PipelineRepository, StoredEdge, StoredNode, StoredPosition};
use nodes::StageKind;
use tracing::{info, instrument};

use crate::graph::PipelineGraph;
use crate::models::{Position, Stage};
use crate::EngineError;

/// Pipeline-level properties saved alongside the stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMeta {
    pub name: String,
    pub description: String,
    /// Cron expression; not validated.
    pub schedule: String,
}

impl Default for PipelineMeta {
    fn default() -> Self {
        Self {
            name: "Customer Data ETL".to_owned(),
            description: String::new(),
            schedule: "0 0 * * *".to_owned(),
        }
    }
}

/// Save `graph` under `meta.name`, overwriting any pipeline of that name.
///
/// # Errors
/// [`EngineError::Validation`] for a blank name (the repository is not
/// touched); [`EngineError::Database`] from the repository.
#[instrument(skip_all, fields(name = %meta.name))]
pub async fn save_pipeline(
    repo: &dyn PipelineRepository,
    meta: &PipelineMeta,
    graph: &PipelineGraph,
) -> Result<PipelineRecord, EngineError> {
    if meta.name.trim().is_empty() {
        return Err(EngineError::validation("name", "pipeline name is required"));
    }

    let record = repo.upsert(draft_from_graph(meta, graph)).await?;
    info!(stages = graph.len(), updated = %record.updated, "pipeline saved");
    Ok(record)
}

/// Load the pipeline saved under `name`. Surrounding whitespace is
/// ignored, matching [`save_pipeline`].
pub async fn load_pipeline(
    repo: &dyn PipelineRepository,
    name: &str,
) -> Result<(PipelineMeta, PipelineGraph), EngineError> {
    let record = repo.get(name.trim()).await?;
    graph_from_record(&record)
}

/// Build the stored draft for `graph`.
pub fn draft_from_graph(meta: &PipelineMeta, graph: &PipelineGraph) -> PipelineDraft {
    PipelineDraft {
        name: meta.name.trim().to_owned(),
        description: meta.description.clone(),
        schedule: meta.schedule.clone(),
        nodes: graph.list_stages().iter().map(stored_node).collect(),
        edges: graph
            .links()
            .iter()
            .map(|link| StoredEdge {
                source: link.from.clone(),
                target: link.to.clone(),
            })
            .collect(),
    }
}

fn stored_node(stage: &Stage) -> StoredNode {
    StoredNode {
        id: stage.id.clone(),
        node_type: stage.kind().to_string(),
        name: stage.label.clone(),
        config: stage.settings.clone(),
        position: StoredPosition {
            x: stage.position.x,
            y: stage.position.y,
        },
        status: stage.run_state().to_string(),
    }
}

/// Rebuild a graph from a stored document.
///
/// Every stage comes back `idle`. A document with no `edges` field gets
/// its stages linked in sequence; an empty list stays unlinked.
///
/// # Errors
/// [`EngineError::InvalidStage`] if a node's `type` is not a stage kind.
pub fn graph_from_record(record: &PipelineRecord) -> Result<(PipelineMeta, PipelineGraph), EngineError> {
    let mut graph = PipelineGraph::new();
    for node in &record.nodes {
        let kind: StageKind = node.node_type.parse()?;
        graph.push_stage(Stage::new(
            node.id.clone(),
            kind,
            node.name.clone(),
            node.config.clone(),
            Position::new(node.position.x, node.position.y),
        ));
    }

    match &record.edges {
        Some(edges) => {
            for edge in edges {
                graph.add_link(edge.source.clone(), edge.target.clone());
            }
        }
        None => graph.link_consecutive(),
    }

    let meta = PipelineMeta {
        name: record.name.clone(),
        description: record.description.clone(),
        schedule: record.schedule.clone(),
    };
    Ok((meta, graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunState, Settings};
    use db::MemoryStore;
    use serde_json::json;

    fn sample_graph() -> PipelineGraph {
        let mut graph = PipelineGraph::new();
        let a = graph
            .add_stage(
                StageKind::Source,
                "MongoDB",
                json!({ "connectionString": "mongodb://localhost:27017/mydb" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .id;
        let b = graph.add_stage(StageKind::Destination, "BigQuery", Settings::new()).id;
        graph.add_link(a, b);
        graph
    }

    #[tokio::test]
    async fn save_then_load_restores_stages_and_links() {
        let repo = MemoryStore::new();
        let graph = sample_graph();
        let meta = PipelineMeta::default();

        save_pipeline(&repo, &meta, &graph).await.unwrap();
        let (loaded_meta, loaded) = load_pipeline(&repo, &meta.name).await.unwrap();

        assert_eq!(loaded_meta, meta);
        assert_eq!(loaded.list_stages(), graph.list_stages());
        assert_eq!(loaded.links(), graph.links());
    }

    #[tokio::test]
    async fn unlinked_graph_stays_unlinked_after_reload() {
        let repo = MemoryStore::new();
        let mut graph = PipelineGraph::new();
        graph.add_stage(StageKind::Source, "CSV File", Settings::new());
        graph.add_stage(StageKind::Destination, "S3 Bucket", Settings::new());
        let meta = PipelineMeta::default();

        save_pipeline(&repo, &meta, &graph).await.unwrap();
        let (_, loaded) = load_pipeline(&repo, &meta.name).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert!(loaded.links().is_empty());
    }

    #[tokio::test]
    async fn saving_twice_keeps_created_and_advances_updated() {
        let repo = MemoryStore::new();
        let mut graph = sample_graph();
        let meta = PipelineMeta::default();

        let first = save_pipeline(&repo, &meta, &graph).await.unwrap();
        graph.add_stage(StageKind::Transform, "Data Cleaner", Settings::new());
        let second = save_pipeline(&repo, &meta, &graph).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].nodes.len(), 3);
        assert_eq!(second.created, first.created);
        assert!(second.updated > first.updated);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_saving() {
        let repo = MemoryStore::new();
        let meta = PipelineMeta {
            name: "  ".into(),
            ..PipelineMeta::default()
        };

        let err = save_pipeline(&repo, &meta, &sample_graph()).await.unwrap_err();

        assert!(matches!(err, EngineError::Validation { field: "name", .. }));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn padded_name_loads_what_it_saved() {
        let repo = MemoryStore::new();
        let meta = PipelineMeta {
            name: " etl ".into(),
            ..PipelineMeta::default()
        };

        save_pipeline(&repo, &meta, &sample_graph()).await.unwrap();
        let (loaded_meta, loaded) = load_pipeline(&repo, " etl ").await.unwrap();

        assert_eq!(loaded_meta.name, "etl");
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn missing_pipeline_is_a_database_error() {
        let repo = MemoryStore::new();
        assert!(matches!(
            load_pipeline(&repo, "ghost").await,
            Err(EngineError::Database(db::DbError::NotFound(_)))
        ));
    }

    #[test]
    fn document_without_edges_is_linked_in_sequence_and_idle() {
        let record: PipelineRecord = serde_json::from_value(json!({
            "name": "legacy",
            "nodes": [
                { "id": "node-0", "type": "source", "name": "CSV File", "status": "success" },
                { "id": "node-1", "type": "transform", "name": "Filter Rows", "status": "running" },
                { "id": "node-2", "type": "destination", "name": "S3 Bucket" }
            ]
        }))
        .unwrap();

        let (_, graph) = graph_from_record(&record).unwrap();

        assert_eq!(graph.links().len(), 2);
        assert_eq!(graph.links()[1].to, "node-2");
        assert!(graph.list_stages().iter().all(|s| s.run_state() == RunState::Idle));
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let record: PipelineRecord = serde_json::from_value(json!({
            "name": "broken",
            "nodes": [{ "id": "n", "type": "sink", "name": "?" }]
        }))
        .unwrap();

        assert!(matches!(graph_from_record(&record), Err(EngineError::InvalidStage(_))));
    }
}

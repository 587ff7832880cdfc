//! `pipeline-builder` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`             — simulate a pipeline document or template.
//! - `validate`        — check a pipeline document's stages and links.
//! - `save`            — store a pipeline document.
//! - `list` / `show` / `delete` — manage stored pipelines.
//! - `templates`       — browse the template catalogue.
//! - `generate`        — build a pipeline from a prompt or a canned suggestion.
//! - `test-connection` — simulate a connection test.
//! - `import`          — simulate a data import.
//! - `export`          — write the sample data set in a given format.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use db::{JsonFileStore, PipelineRecord, PipelineRepository};
use engine::assistant::PipelineAssistant;
use engine::connections::ConnectionManager;
use engine::export::{ExportFormat, ExportRequest, Exporter};
use engine::import::{ImportKind, ImportRequest, Importer};
use engine::persist::graph_from_record;
use engine::{
    templates, ExecutorConfig, PipelineGraph, PipelineMeta, RunEvent, SimulatedExecutor,
    SimulationConfig, TokioScheduler,
};
use nodes::traits::RandomOutcome;

#[derive(Parser)]
#[command(
    name = "pipeline-builder",
    about = "Design pipelines and simulate their runs",
    version
)]
struct Cli {
    /// JSON file holding saved pipelines.
    #[arg(long, env = "PIPELINE_STORE", default_value = "pipelines.json", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a run of a pipeline document, a stored pipeline or a template.
    Run {
        /// Path to a pipeline JSON document.
        path: Option<PathBuf>,
        /// Run a stored pipeline by name instead.
        #[arg(long, conflicts_with_all = ["path", "template"])]
        name: Option<String>,
        /// Run a catalogue template (id or name) instead.
        #[arg(long, conflicts_with = "path")]
        template: Option<String>,
        /// Time each stage spends running.
        #[arg(long, env = "PIPELINE_STEP_INTERVAL_MS", default_value_t = 1500)]
        step_interval_ms: u64,
    },
    /// Validate a pipeline JSON document.
    Validate {
        path: PathBuf,
    },
    /// Store a pipeline JSON document, overwriting one of the same name.
    Save {
        path: PathBuf,
        /// Store under this name instead of the document's.
        #[arg(long)]
        name: Option<String>,
    },
    /// List stored pipelines.
    List,
    /// Print a stored pipeline.
    Show {
        name: String,
    },
    /// Delete a stored pipeline.
    Delete {
        name: String,
    },
    /// Browse the template catalogue.
    Templates {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Generate a pipeline from a prompt or a predefined suggestion.
    Generate {
        prompt: Option<String>,
        #[arg(long)]
        template: Option<String>,
        /// Store the result under this name.
        #[arg(long)]
        save: Option<String>,
    },
    /// Simulate testing a database connection.
    TestConnection {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "mongodb")]
        kind: String,
        #[arg(long)]
        connection_string: String,
    },
    /// Simulate importing data.
    Import {
        /// csv, mongodb, postgresql, mysql, api or cloud.
        #[arg(long)]
        kind: Option<ImportKind>,
        #[arg(long)]
        connection_string: Option<String>,
    },
    /// Export the sample data set.
    Export {
        /// csv, json, xml or sql.
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(long, default_value = "export_data")]
        file_name: String,
        #[arg(long)]
        no_headers: bool,
        /// Directory to write into.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = JsonFileStore::new(&cli.store);
    let simulation = SimulationConfig::default();

    match cli.command {
        Command::Run { path, name, template, step_interval_ms } => {
            let mut graph = match (path, name, template) {
                (Some(path), _, _) => read_document(&path).await?.1,
                (_, Some(name), _) => engine::load_pipeline(&store, &name).await?.1,
                (_, _, Some(key)) => templates::find(&key)?.instantiate(),
                (None, None, None) => bail!("give a document path, --name or --template"),
            };

            let config = ExecutorConfig {
                step_interval: Duration::from_millis(step_interval_ms),
            };
            let executor = SimulatedExecutor::new(config, Arc::new(TokioScheduler));
            let stages: Vec<(String, String)> = graph
                .list_stages()
                .iter()
                .map(|s| (s.label.clone(), s.kind().to_string()))
                .collect();
            executor
                .run_observed(&mut graph, |step| {
                    if let RunEvent::StageStarted { index, .. } = step.event {
                        let (label, kind) = &stages[index];
                        println!("[{}/{}] {label} ({kind})", index + 1, stages.len());
                    }
                })
                .await?;
            println!("Pipeline complete: {} stages succeeded", graph.len());
        }

        Command::Validate { path } => {
            let (_, graph) = read_document(&path).await?;
            graph.validate()?;
            let order: Vec<&str> = graph.list_stages().iter().map(|s| s.label.as_str()).collect();
            println!("Pipeline is valid. Execution order: {order:?}");
        }

        Command::Save { path, name } => {
            let (mut meta, graph) = read_document(&path).await?;
            if let Some(name) = name {
                meta.name = name;
            }
            let record = engine::save_pipeline(&store, &meta, &graph).await?;
            println!("Saved '{}' (updated {})", record.name, record.updated.to_rfc3339());
        }

        Command::List => {
            for record in store.list().await? {
                println!(
                    "{:<32} {:>3} stages  schedule '{}'  updated {}",
                    record.name,
                    record.nodes.len(),
                    record.schedule,
                    record.updated.to_rfc3339()
                );
            }
        }

        Command::Show { name } => {
            let record = store.get(&name).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Delete { name } => {
            store.delete(&name).await?;
            println!("Deleted '{name}'");
        }

        Command::Templates { category, search } => {
            for t in templates::filter(category.as_deref(), search.as_deref()) {
                println!(
                    "{:>2}  {:<32} {:<11} {:.1}★  {} uses  {} → {}",
                    t.id,
                    t.name,
                    t.category,
                    t.rating,
                    t.uses,
                    t.sources.join(", "),
                    t.destinations.join(", ")
                );
            }
        }

        Command::Generate { prompt, template, save } => {
            let assistant = PipelineAssistant::new(Arc::new(TokioScheduler), simulation.generation_delay);
            let suggestion = assistant
                .generate(prompt.as_deref().unwrap_or_default(), template.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&suggestion)?);

            if let Some(name) = save {
                let meta = PipelineMeta {
                    name,
                    description: suggestion.description.clone(),
                    ..PipelineMeta::default()
                };
                let record = engine::save_pipeline(&store, &meta, &suggestion.instantiate()).await?;
                println!("Saved '{}'", record.name);
            }
        }

        Command::TestConnection { name, kind, connection_string } => {
            let mut manager = ConnectionManager::new(
                Arc::new(TokioScheduler),
                Arc::new(RandomOutcome::new(simulation.connection_success_rate)),
                simulation.connection_test_delay,
            );
            let id = manager.add(&name, &kind, &connection_string)?.id.clone();
            match manager.test(&id).await {
                Some(status) => println!("{name}: {status}"),
                None => bail!("connection '{name}' disappeared during the test"),
            }
        }

        Command::Import { kind, connection_string } => {
            let importer = Importer::new(
                Arc::new(TokioScheduler),
                Arc::new(RandomOutcome::new(simulation.import_success_rate)),
                simulation.import_delay,
            );
            let request = ImportRequest {
                kind,
                connection_string,
                ..ImportRequest::default()
            };
            let report = importer.run(&request).await?;
            println!("Imported {} records from {}", report.records, report.kind);
        }

        Command::Export { format, file_name, no_headers, out_dir } => {
            let exporter = Exporter::new(Arc::new(TokioScheduler), simulation.export_delay);
            let request = ExportRequest {
                format,
                file_name,
                include_headers: !no_headers,
                ..ExportRequest::default()
            };
            let artifact = exporter.export(&request).await?;
            if let Some(body) = artifact.body {
                let target = out_dir.join(&artifact.file_name);
                tokio::fs::write(&target, body)
                    .await
                    .with_context(|| format!("cannot write {}", target.display()))?;
                info!(path = %target.display(), content_type = artifact.content_type, "export written");
                println!("Wrote {}", target.display());
            }
        }
    }

    Ok(())
}

/// Read a pipeline document from disk.
async fn read_document(path: &Path) -> anyhow::Result<(PipelineMeta, PipelineGraph)> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read file {}", path.display()))?;
    let record: PipelineRecord = serde_json::from_str(&content)
        .with_context(|| format!("invalid pipeline document {}", path.display()))?;
    Ok(graph_from_record(&record)?)
}

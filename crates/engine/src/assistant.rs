//! Pipeline assistant: turns a short prompt, or one of a few canned
//! suggestions, into a source → transform → destination pipeline.
//!
//! Generation is keyword matching over the lower-cased prompt, plus a
//! simulated thinking delay.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::graph::PipelineGraph;
use crate::models::{Settings, StageKind, StageSpec};
use crate::simulation::Scheduler;
use crate::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedStage {
    pub name: String,
    pub config: Settings,
}

impl SuggestedStage {
    fn new(name: &str, config: Value) -> Self {
        Self {
            name: name.to_owned(),
            config: match config {
                Value::Object(map) => map,
                _ => Settings::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSuggestion {
    pub name: String,
    pub description: String,
    pub sources: Vec<SuggestedStage>,
    pub transforms: Vec<SuggestedStage>,
    pub destinations: Vec<SuggestedStage>,
}

impl PipelineSuggestion {
    pub fn stage_specs(&self) -> Vec<StageSpec> {
        let group = |kind: StageKind, stages: &[SuggestedStage]| -> Vec<StageSpec> {
            stages
                .iter()
                .map(|s| StageSpec::new(kind, s.name.clone()).with_settings(s.config.clone()))
                .collect()
        };
        let mut specs = group(StageKind::Source, &self.sources);
        specs.extend(group(StageKind::Transform, &self.transforms));
        specs.extend(group(StageKind::Destination, &self.destinations));
        specs
    }

    /// A fresh graph with the suggested stages linked in sequence.
    pub fn instantiate(&self) -> PipelineGraph {
        PipelineGraph::from_specs(self.stage_specs(), true)
    }
}

/// The canned suggestions offered alongside free-text prompts.
pub fn predefined() -> Vec<PipelineSuggestion> {
    vec![
        PipelineSuggestion {
            name: "E-commerce Data Pipeline".into(),
            description: "Process customer orders and analytics".into(),
            sources: vec![SuggestedStage::new("Shopify API", json!({ "apiKey": "", "shopDomain": "" }))],
            transforms: vec![SuggestedStage::new("Data Cleaner", json!({ "rules": "remove_duplicates" }))],
            destinations: vec![SuggestedStage::new("Data Warehouse", json!({ "connectionString": "" }))],
        },
        PipelineSuggestion {
            name: "Financial Analytics".into(),
            description: "Process financial transactions".into(),
            sources: vec![SuggestedStage::new("Bank API", json!({ "apiKey": "", "accountId": "" }))],
            transforms: vec![SuggestedStage::new("Compliance Checker", json!({ "rules": "sox_compliance" }))],
            destinations: vec![SuggestedStage::new("BigQuery", json!({ "projectId": "", "dataset": "" }))],
        },
        PipelineSuggestion {
            name: "IoT Data Processing".into(),
            description: "Real-time sensor data analysis".into(),
            sources: vec![SuggestedStage::new("MQTT Broker", json!({ "brokerUrl": "", "topics": "" }))],
            transforms: vec![SuggestedStage::new("Anomaly Detector", json!({ "threshold": 3.0 }))],
            destinations: vec![SuggestedStage::new("Time Series DB", json!({ "connectionString": "" }))],
        },
    ]
}

/// Build a suggestion from the keywords in `prompt`.
///
/// Every group that matched nothing falls back to a single default stage,
/// so the result always has a source, a transform and a destination.
pub fn from_prompt(prompt: &str) -> PipelineSuggestion {
    let text = prompt.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    let mut sources = Vec::new();
    let mut transforms = Vec::new();
    let mut destinations = Vec::new();

    if has(&["api", "rest"]) {
        sources.push(SuggestedStage::new("REST API", json!({ "endpoint": "", "apiKey": "" })));
    }
    if has(&["database", "sql"]) {
        sources.push(SuggestedStage::new("PostgreSQL", json!({ "connectionString": "" })));
    }
    if has(&["mongo"]) {
        sources.push(SuggestedStage::new("MongoDB", json!({ "connectionString": "" })));
    }
    if has(&["csv", "file"]) {
        sources.push(SuggestedStage::new("CSV File", json!({ "filePath": "" })));
    }

    if has(&["clean", "validate"]) {
        transforms.push(SuggestedStage::new(
            "Data Cleaner",
            json!({ "rules": "remove_duplicates,validate_emails" }),
        ));
    }
    if has(&["transform", "map"]) {
        transforms.push(SuggestedStage::new("Field Mapper", json!({ "mappings": {} })));
    }
    if has(&["filter"]) {
        transforms.push(SuggestedStage::new("Filter Rows", json!({ "conditions": [] })));
    }

    if has(&["warehouse", "bigquery"]) {
        destinations.push(SuggestedStage::new("BigQuery", json!({ "projectId": "", "dataset": "" })));
    }
    if has(&["s3", "storage"]) {
        destinations.push(SuggestedStage::new("S3 Bucket", json!({ "bucketName": "", "region": "" })));
    }
    if has(&["email", "alert"]) {
        destinations.push(SuggestedStage::new("Email Alert", json!({ "recipients": [] })));
    }

    if sources.is_empty() {
        sources.push(SuggestedStage::new("REST API", json!({})));
    }
    if transforms.is_empty() {
        transforms.push(SuggestedStage::new("Data Cleaner", json!({})));
    }
    if destinations.is_empty() {
        destinations.push(SuggestedStage::new("Data Warehouse", json!({})));
    }

    PipelineSuggestion {
        name: "AI Generated Pipeline".into(),
        description: prompt.to_owned(),
        sources,
        transforms,
        destinations,
    }
}

/// Generates suggestions after a simulated delay.
pub struct PipelineAssistant {
    scheduler: Arc<dyn Scheduler>,
    delay: Duration,
}

impl PipelineAssistant {
    pub fn new(scheduler: Arc<dyn Scheduler>, delay: Duration) -> Self {
        Self { scheduler, delay }
    }

    /// A named predefined suggestion wins over the prompt.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] if both are empty.
    /// - [`EngineError::UnknownTemplate`] if `template` names no suggestion.
    pub async fn generate(
        &self,
        prompt: &str,
        template: Option<&str>,
    ) -> Result<PipelineSuggestion, EngineError> {
        let template = template.map(str::trim).filter(|t| !t.is_empty());
        if prompt.trim().is_empty() && template.is_none() {
            return Err(EngineError::validation(
                "prompt",
                "please enter a prompt or select a template",
            ));
        }

        let suggestion = match template {
            Some(name) => predefined()
                .into_iter()
                .find(|s| s.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| EngineError::UnknownTemplate(name.to_owned()))?,
            None => from_prompt(prompt),
        };

        self.scheduler.sleep(self.delay).await;
        info!(
            name = %suggestion.name,
            stages = suggestion.sources.len() + suggestion.transforms.len() + suggestion.destinations.len(),
            "pipeline suggestion generated"
        );
        Ok(suggestion)
    }
}

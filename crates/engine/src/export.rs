//! Sample-data export.
//!
//! Exports never read a pipeline: they serialise a fixed three-row sample
//! so the download flow has something to produce.

use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::simulation::Scheduler;
use crate::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Xml,
    Sql,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Sql => "sql",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Sql => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv"  => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xml"  => Ok(Self::Xml),
            "sql"  => Ok(Self::Sql),
            other  => Err(format!("unknown export format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleRecord {
    pub id: u32,
    pub name: &'static str,
    pub email: &'static str,
    pub status: &'static str,
}

pub const SAMPLE_RECORDS: [SampleRecord; 3] = [
    SampleRecord { id: 1, name: "John Doe", email: "john@example.com", status: "active" },
    SampleRecord { id: 2, name: "Jane Smith", email: "jane@example.com", status: "inactive" },
    SampleRecord { id: 3, name: "Bob Johnson", email: "bob@example.com", status: "active" },
];

/// Render the sample in `format`.
pub fn render(format: ExportFormat, include_headers: bool) -> Result<String, EngineError> {
    let body = match format {
        ExportFormat::Csv => {
            let mut out = String::new();
            if include_headers {
                out.push_str("id,name,email,status\n");
            }
            let rows: Vec<String> = SAMPLE_RECORDS
                .iter()
                .map(|r| format!("{},{},{},{}", r.id, r.name, r.email, r.status))
                .collect();
            out.push_str(&rows.join("\n"));
            out
        }
        ExportFormat::Json => serde_json::to_string_pretty(&SAMPLE_RECORDS)?,
        ExportFormat::Xml => {
            let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<records>\n");
            for r in &SAMPLE_RECORDS {
                // Writing to a String cannot fail.
                let _ = write!(
                    out,
                    "  <record>\n    <id>{}</id>\n    <name>{}</name>\n    <email>{}</email>\n    <status>{}</status>\n  </record>\n",
                    r.id,
                    xml_escape(r.name),
                    xml_escape(r.email),
                    xml_escape(r.status),
                );
            }
            out.push_str("</records>");
            out
        }
        ExportFormat::Sql => SAMPLE_RECORDS
            .iter()
            .map(|r| {
                format!(
                    "INSERT INTO users (id, name, email, status) VALUES ({}, '{}', '{}', '{}');",
                    r.id,
                    r.name.replace('\'', "''"),
                    r.email.replace('\'', "''"),
                    r.status.replace('\'', "''"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(body)
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Where the export goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportDestination {
    #[default]
    Download,
    Database { connection_string: String },
    Api { endpoint: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: Option<ExportFormat>,
    pub destination: ExportDestination,
    /// Without extension.
    pub file_name: String,
    pub include_headers: bool,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: None,
            destination: ExportDestination::Download,
            file_name: "export_data".to_owned(),
            include_headers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    /// Present only for downloads.
    pub body: Option<String>,
}

pub struct Exporter {
    scheduler: Arc<dyn Scheduler>,
    delay: Duration,
}

impl Exporter {
    pub fn new(scheduler: Arc<dyn Scheduler>, delay: Duration) -> Self {
        Self { scheduler, delay }
    }

    /// # Errors
    /// [`EngineError::Validation`] for a missing format, or a blank
    /// connection string / endpoint for database and API destinations.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportArtifact, EngineError> {
        let format = request
            .format
            .ok_or_else(|| EngineError::validation("format", "please select an export format"))?;

        match &request.destination {
            ExportDestination::Database { connection_string } if connection_string.trim().is_empty() => {
                return Err(EngineError::validation(
                    "connectionString",
                    "please provide a database connection string",
                ));
            }
            ExportDestination::Api { endpoint } if endpoint.trim().is_empty() => {
                return Err(EngineError::validation("endpoint", "please provide an API endpoint"));
            }
            _ => {}
        }

        self.scheduler.sleep(self.delay).await;

        let body = match request.destination {
            ExportDestination::Download => Some(render(format, request.include_headers)?),
            _ => None,
        };
        let artifact = ExportArtifact {
            file_name: format!("{}.{}", request.file_name, format.extension()),
            content_type: format.content_type(),
            body,
        };
        info!(file = %artifact.file_name, "export complete");
        Ok(artifact)
    }
}

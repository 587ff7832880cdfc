//! Simulated data import.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use nodes::OutcomeProvider;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::simulation::Scheduler;
use crate::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Csv,
    Mongodb,
    Postgresql,
    Mysql,
    Api,
    Cloud,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Csv => "csv",
            Self::Mongodb => "mongodb",
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Api => "api",
            Self::Cloud => "cloud",
        };
        f.write_str(s)
    }
}

impl FromStr for ImportKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv"        => Ok(Self::Csv),
            "mongodb"    => Ok(Self::Mongodb),
            "postgresql" => Ok(Self::Postgresql),
            "mysql"      => Ok(Self::Mysql),
            "api"        => Ok(Self::Api),
            "cloud"      => Ok(Self::Cloud),
            other        => Err(format!("unknown import type: {other}")),
        }
    }
}

/// What the user filled in. Only `kind` is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRequest {
    pub kind: Option<ImportKind>,
    pub connection_string: Option<String>,
    pub api_url: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub kind: ImportKind,
    pub records: u64,
}

/// Lower and upper (exclusive) bound of the record count a successful
/// import reports.
pub const IMPORTED_RECORDS: std::ops::Range<u64> = 1_000..11_000;

pub struct Importer {
    scheduler: Arc<dyn Scheduler>,
    outcomes: Arc<dyn OutcomeProvider>,
    delay: Duration,
}

impl Importer {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        outcomes: Arc<dyn OutcomeProvider>,
        delay: Duration,
    ) -> Self {
        Self { scheduler, outcomes, delay }
    }

    /// # Errors
    /// - [`EngineError::Validation`] if no import type was chosen (checked
    ///   before any delay).
    /// - [`EngineError::SimulatedFailure`] when the outcome provider fails
    ///   the import.
    #[instrument(skip_all, fields(kind = ?request.kind))]
    pub async fn run(&self, request: &ImportRequest) -> Result<ImportReport, EngineError> {
        let kind = request
            .kind
            .ok_or_else(|| EngineError::validation("importType", "please select an import type"))?;

        info!("import started");
        self.scheduler.sleep(self.delay).await;

        if !self.outcomes.next_outcome().is_success() {
            warn!("import failed");
            return Err(EngineError::SimulatedFailure(
                "could not connect to data source, please check your connection details".into(),
            ));
        }

        let records = rand::rng().random_range(IMPORTED_RECORDS);
        info!(records, "import complete");
        Ok(ImportReport { kind, records })
    }
}

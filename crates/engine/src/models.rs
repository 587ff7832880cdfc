//! Core domain models for the pipeline graph.
//!
//! A pipeline is an ordered list of [`Stage`]s plus the directed [`Link`]s
//! drawn between them. Persistence shapes live in the `db` crate; the
//! conversions are in [`crate::persist`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use nodes::{Settings, StageKind};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Canvas coordinate of a stage. Presentational only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Simulated execution status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Success,
    Error,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunState {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle"    => Ok(Self::Idle),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "error"   => Ok(Self::Error),
            other     => Err(format!("unknown run state: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One unit of a pipeline (a "node" on the canvas).
///
/// `kind` is fixed at creation and `run_state` belongs to the execution
/// simulation; both are read-only from outside the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: String,
    kind: StageKind,
    pub label: String,
    pub settings: Settings,
    pub position: Position,
    run_state: RunState,
}

impl Stage {
    pub(crate) fn new(
        id: String,
        kind: StageKind,
        label: String,
        settings: Settings,
        position: Position,
    ) -> Self {
        Self {
            id,
            kind,
            label,
            settings,
            position,
            run_state: RunState::Idle,
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub(crate) fn set_run_state(&mut self, state: RunState) {
        self.run_state = state;
    }
}

/// A stage that has not been placed on a graph yet.
///
/// Templates and the assistant produce these; the graph assigns ids and
/// positions when they are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub kind: StageKind,
    pub label: String,
    pub settings: Settings,
}

impl StageSpec {
    pub fn new(kind: StageKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            settings: Settings::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// Directed link from one stage to another. Duplicates and self-links are
/// allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: String,
    pub to: String,
}

impl Link {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn touches(&self, stage_id: &str) -> bool {
        self.from == stage_id || self.to == stage_id
    }
}

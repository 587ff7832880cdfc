//! The pipeline graph — the canonical list of stages and links for one
//! pipeline definition.
//!
//! Stages keep insertion order; that order is the execution order of the
//! simulated run. Links are visual only and never reorder anything.
//!
//! Deleting a stage also deletes every link touching it, so a graph built
//! through this API never holds dangling links. Graphs loaded from stored
//! documents might; [`PipelineGraph::validate`] reports them.

use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::layout::Placement;
use crate::models::{Link, Position, RunState, Settings, Stage, StageKind, StageSpec};
use crate::EngineError;

#[derive(Debug, Clone, Default)]
pub struct PipelineGraph {
    stages: Vec<Stage>,
    links: Vec<Link>,
    placement: Placement,
}

impl PipelineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph placing new stages with `placement`.
    pub fn with_placement(placement: Placement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }

    /// Build a graph from an ordered list of stage specs, cascading them
    /// left to right. With `auto_link`, each stage is linked to the next.
    pub fn from_specs(specs: Vec<StageSpec>, auto_link: bool) -> Self {
        let mut graph = Self::with_placement(Placement::Cascade);
        for spec in specs {
            graph.add_stage(spec.kind, spec.label, spec.settings);
        }
        if auto_link {
            graph.link_consecutive();
        }
        graph
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Append a new `idle` stage with a fresh id.
    pub fn add_stage(
        &mut self,
        kind: StageKind,
        label: impl Into<String>,
        settings: Settings,
    ) -> Stage {
        let id = format!("node-{}", Uuid::new_v4().simple());
        let position = self.placement.position_for(self.stages.len());
        let stage = Stage::new(id, kind, label.into(), settings, position);
        info!(stage_id = %stage.id, %kind, label = %stage.label, "stage added");
        self.stages.push(stage.clone());
        stage
    }

    /// Append an already-identified stage (document loads).
    pub(crate) fn push_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    /// Shallow-merge `settings` into the stage's map. Returns `false` (and
    /// changes nothing) when `id` is unknown.
    pub fn update_stage_settings(&mut self, id: &str, settings: Settings) -> bool {
        match self.stage_mut(id) {
            Some(stage) => {
                stage.settings.extend(settings);
                true
            }
            None => {
                debug!(stage_id = id, "settings update for unknown stage ignored");
                false
            }
        }
    }

    /// Replace the stage's settings wholesale.
    pub fn replace_stage_settings(&mut self, id: &str, settings: Settings) -> bool {
        self.stage_mut(id)
            .map(|stage| stage.settings = settings)
            .is_some()
    }

    pub fn rename_stage(&mut self, id: &str, label: impl Into<String>) -> bool {
        let label = label.into();
        self.stage_mut(id).map(|stage| stage.label = label).is_some()
    }

    /// Drag a stage to `position`.
    pub fn move_stage(&mut self, id: &str, position: Position) -> bool {
        self.stage_mut(id)
            .map(|stage| stage.position = position)
            .is_some()
    }

    /// Remove the stage with `id` and every link touching it.
    pub fn delete_stage(&mut self, id: &str) -> Option<Stage> {
        let index = self.stages.iter().position(|s| s.id == id)?;
        let stage = self.stages.remove(index);

        let before = self.links.len();
        self.links.retain(|link| !link.touches(id));
        info!(
            stage_id = id,
            links_removed = before - self.links.len(),
            "stage deleted"
        );
        Some(stage)
    }

    /// Stages in insertion order.
    pub fn list_stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    fn stage_mut(&mut self, id: &str) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    // -----------------------------------------------------------------------
    // Links
    // -----------------------------------------------------------------------

    /// Append a link. No endpoint, duplicate or cycle checks.
    pub fn add_link(&mut self, from: impl Into<String>, to: impl Into<String>) -> Link {
        let link = Link::new(from, to);
        debug!(from = %link.from, to = %link.to, "link added");
        self.links.push(link.clone());
        link
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |link| link.from == id)
    }

    /// Link every stage to the one after it.
    pub fn link_consecutive(&mut self) {
        let pairs: Vec<(String, String)> = self
            .stages
            .windows(2)
            .map(|w| (w[0].id.clone(), w[1].id.clone()))
            .collect();
        for (from, to) in pairs {
            self.add_link(from, to);
        }
    }

    /// Links whose endpoints do not resolve to a stage.
    pub fn dangling_links(&self) -> Vec<&Link> {
        let ids: HashSet<&str> = self.stages.iter().map(|s| s.id.as_str()).collect();
        self.links
            .iter()
            .filter(|link| !ids.contains(link.from.as_str()) || !ids.contains(link.to.as_str()))
            .collect()
    }

    /// Check stage ids are unique and every link endpoint resolves.
    ///
    /// # Errors
    /// - [`EngineError::DuplicateStageId`] if two stages share an ID.
    /// - [`EngineError::UnknownStageReference`] if a link references a missing stage.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut seen_ids: HashSet<&str> = HashSet::new();
        for stage in &self.stages {
            if !seen_ids.insert(stage.id.as_str()) {
                return Err(EngineError::DuplicateStageId(stage.id.clone()));
            }
        }

        for link in &self.links {
            if !seen_ids.contains(link.from.as_str()) {
                return Err(EngineError::UnknownStageReference {
                    stage_id: link.from.clone(),
                    side: "from",
                });
            }
            if !seen_ids.contains(link.to.as_str()) {
                return Err(EngineError::UnknownStageReference {
                    stage_id: link.to.clone(),
                    side: "to",
                });
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Run state
    // -----------------------------------------------------------------------

    pub fn reset_run_states(&mut self) {
        for stage in &mut self.stages {
            stage.set_run_state(RunState::Idle);
        }
    }

    pub(crate) fn set_run_state(&mut self, id: &str, state: RunState) -> bool {
        self.stage_mut(id).map(|s| s.set_run_state(state)).is_some()
    }

    pub fn run_states(&self) -> Vec<RunState> {
        self.stages.iter().map(Stage::run_state).collect()
    }
}

//! Configuration store: editing one stage's settings through its form.
//!
//! Saving replaces the settings map wholesale. A `name` entry in the
//! submitted map is not kept as a setting; it becomes the stage's label.

use nodes::{Settings, StageForm};
use serde_json::Value;
use tracing::info;

use crate::graph::PipelineGraph;
use crate::EngineError;

/// Settings key an editor uses to rename the stage.
pub const NAME_FIELD: &str = "name";

/// Open the form for stage `id`, pre-filled from its current settings.
///
/// Returns `Ok(None)` for an unknown id.
pub fn open_form(graph: &PipelineGraph, id: &str) -> Result<Option<StageForm>, EngineError> {
    let Some(stage) = graph.stage(id) else {
        return Ok(None);
    };
    Ok(Some(StageForm::from_settings(stage.kind(), &stage.settings)?))
}

/// Overwrite stage `id`'s settings with `settings`.
///
/// A non-blank string under [`NAME_FIELD`] renames the stage. Nothing is
/// validated. Returns `false` when `id` is unknown.
pub fn save(graph: &mut PipelineGraph, id: &str, mut settings: Settings) -> bool {
    if graph.stage(id).is_none() {
        return false;
    }

    if let Some(Value::String(name)) = settings.remove(NAME_FIELD) {
        let name = name.trim();
        if !name.is_empty() {
            graph.rename_stage(id, name);
        }
    }

    graph.replace_stage_settings(id, settings);
    info!(stage_id = id, "stage configuration saved");
    true
}

/// Save a typed form, optionally renaming the stage.
///
/// # Errors
/// [`EngineError::Validation`] if the form is for a different kind than the
/// stage.
pub fn save_form(
    graph: &mut PipelineGraph,
    id: &str,
    form: &StageForm,
    name: Option<&str>,
) -> Result<bool, EngineError> {
    let Some(stage) = graph.stage(id) else {
        return Ok(false);
    };
    if stage.kind() != form.kind() {
        return Err(EngineError::validation(
            "form",
            format!("a {} form cannot configure a {} stage", form.kind(), stage.kind()),
        ));
    }

    let mut settings = form.to_settings()?;
    if let Some(name) = name {
        settings.insert(NAME_FIELD.to_owned(), Value::String(name.to_owned()));
    }
    Ok(save(graph, id, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageKind;
    use nodes::forms::{SourceForm, TransformForm, TransformType};
    use serde_json::json;

    fn settings(value: Value) -> Settings {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn save_replaces_settings_and_lifts_name_into_label() {
        let mut graph = PipelineGraph::new();
        let id = graph
            .add_stage(StageKind::Source, "MongoDB", settings(json!({ "stale": true })))
            .id;

        let saved = save(
            &mut graph,
            &id,
            settings(json!({ "name": "Orders", "database": "shop", "collection": "orders" })),
        );

        let stage = graph.stage(&id).unwrap();
        assert!(saved);
        assert_eq!(stage.label, "Orders");
        assert_eq!(stage.settings, settings(json!({ "database": "shop", "collection": "orders" })));
    }

    #[test]
    fn blank_name_keeps_label() {
        let mut graph = PipelineGraph::new();
        let id = graph.add_stage(StageKind::Transform, "Data Cleaner", Settings::new()).id;

        save(&mut graph, &id, settings(json!({ "name": "   " })));

        assert_eq!(graph.stage(&id).unwrap().label, "Data Cleaner");
    }

    #[test]
    fn save_on_unknown_stage_is_a_noop() {
        let mut graph = PipelineGraph::new();
        graph.add_stage(StageKind::Source, "MongoDB", Settings::new());
        let before = graph.list_stages().to_vec();

        assert!(!save(&mut graph, "ghost", settings(json!({ "name": "x" }))));
        assert_eq!(graph.list_stages(), before.as_slice());
    }

    #[test]
    fn form_round_trips_through_the_stage() {
        let mut graph = PipelineGraph::new();
        let id = graph.add_stage(StageKind::Transform, "Mapper", Settings::new()).id;
        let form = StageForm::Transform(TransformForm {
            transform_type: Some(TransformType::Map),
            rules: Some("email -> contact_email".into()),
            validate_data: true,
        });

        assert!(save_form(&mut graph, &id, &form, Some("Field Mapper")).unwrap());

        assert_eq!(open_form(&graph, &id).unwrap(), Some(form));
        assert_eq!(graph.stage(&id).unwrap().label, "Field Mapper");
    }

    #[test]
    fn form_for_wrong_kind_is_rejected() {
        let mut graph = PipelineGraph::new();
        let id = graph.add_stage(StageKind::Destination, "S3", Settings::new()).id;

        let err = save_form(&mut graph, &id, &StageForm::Source(SourceForm::default()), None)
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation { field: "form", .. }));
        assert!(graph.stage(&id).unwrap().settings.is_empty());
    }
}

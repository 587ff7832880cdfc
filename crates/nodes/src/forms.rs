//! Per-kind settings forms.
//!
//! A stage's settings are an open key/value map; the engine never looks
//! inside it. The forms here are the fixed field sets an editor presents for
//! each [`StageKind`], serialised under the same keys the stored documents
//! use (`connectionString`, `validateData`, `destinationType`, ...).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{NodeError, StageKind};

/// Open-ended settings map attached to every stage.
pub type Settings = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Collection or table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformType {
    Filter,
    Map,
    Aggregate,
    Clean,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformForm {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub transform_type: Option<TransformType>,
    /// Free-text transformation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    /// Validate the data after the transform ran.
    #[serde(default)]
    pub validate_data: bool,
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationType {
    Database,
    Api,
    File,
    Webhook,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_type: Option<DestinationType>,
    /// Connection string or endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    /// Target table, collection or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

// ---------------------------------------------------------------------------
// StageForm
// ---------------------------------------------------------------------------

/// The editable form for one stage, keyed by its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageForm {
    Source(SourceForm),
    Transform(TransformForm),
    Destination(DestinationForm),
}

impl StageForm {
    /// A blank form for `kind`.
    pub fn empty(kind: StageKind) -> Self {
        match kind {
            StageKind::Source => Self::Source(SourceForm::default()),
            StageKind::Transform => Self::Transform(TransformForm::default()),
            StageKind::Destination => Self::Destination(DestinationForm::default()),
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Self::Source(_) => StageKind::Source,
            Self::Transform(_) => StageKind::Transform,
            Self::Destination(_) => StageKind::Destination,
        }
    }

    /// Field names the form for `kind` exposes, in display order.
    pub fn field_names(kind: StageKind) -> &'static [&'static str] {
        match kind {
            StageKind::Source => &["connectionString", "database", "collection"],
            StageKind::Transform => &["type", "rules", "validateData"],
            StageKind::Destination => &["destinationType", "connection", "target"],
        }
    }

    /// Read the form for `kind` out of a settings map.
    ///
    /// Keys the form does not know about are ignored; a known key holding a
    /// value of the wrong shape is an error.
    pub fn from_settings(kind: StageKind, settings: &Settings) -> Result<Self, NodeError> {
        let value = Value::Object(settings.clone());
        Ok(match kind {
            StageKind::Source => Self::Source(parse(kind, value)?),
            StageKind::Transform => Self::Transform(parse(kind, value)?),
            StageKind::Destination => Self::Destination(parse(kind, value)?),
        })
    }

    /// Serialise the form back into a settings map.
    pub fn to_settings(&self) -> Result<Settings, NodeError> {
        let value = match self {
            Self::Source(form) => serde_json::to_value(form),
            Self::Transform(form) => serde_json::to_value(form),
            Self::Destination(form) => serde_json::to_value(form),
        }
        .map_err(|e| NodeError::InvalidSettings {
            kind: self.kind(),
            message: e.to_string(),
        })?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(NodeError::InvalidSettings {
                kind: self.kind(),
                message: format!("form serialised to a non-object: {other}"),
            }),
        }
    }
}

fn parse<T: DeserializeOwned>(kind: StageKind, value: Value) -> Result<T, NodeError> {
    serde_json::from_value(value).map_err(|e| NodeError::InvalidSettings {
        kind,
        message: e.to_string(),
    })
}

//! The three stage kinds a pipeline is built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Role of a stage in the pipeline. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Source,
    Transform,
    Destination,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [Self::Source, Self::Transform, Self::Destination];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Transform => "transform",
            Self::Destination => "destination",
        }
    }

    /// Kind for a palette entry such as `"Data Sources-PostgreSQL"`.
    ///
    /// Anything that is neither a source nor a destination category lands
    /// on the canvas as a transform.
    pub fn from_palette_category(category: &str) -> Self {
        if category.contains("Sources") {
            Self::Source
        } else if category.contains("Destinations") {
            Self::Destination
        } else {
            Self::Transform
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Self::Source),
            "transform" => Ok(Self::Transform),
            "destination" => Ok(Self::Destination),
            other => Err(NodeError::UnknownKind(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_every_kind() {
        for kind in StageKind::ALL {
            assert_eq!(kind.to_string().parse::<StageKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            "sink".parse::<StageKind>(),
            Err(NodeError::UnknownKind("sink".into()))
        );
    }

    #[test]
    fn palette_categories_map_to_kinds() {
        assert_eq!(StageKind::from_palette_category("Data Sources"), StageKind::Source);
        assert_eq!(StageKind::from_palette_category("Destinations"), StageKind::Destination);
        assert_eq!(StageKind::from_palette_category("Data Quality"), StageKind::Transform);
    }
}

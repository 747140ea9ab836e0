use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a project in the publishing workflow.
///
/// Stages are totally ordered by [`Stage::order`]; "advance" always moves to the
/// stage whose order is one higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Draft,
    Edit,
    Cover,
    Format,
    Publish,
    Marketing,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Draft,
        Stage::Edit,
        Stage::Cover,
        Stage::Format,
        Stage::Publish,
        Stage::Marketing,
    ];

    pub fn order(self) -> u8 {
        match self {
            Stage::Draft => 1,
            Stage::Edit => 2,
            Stage::Cover => 3,
            Stage::Format => 4,
            Stage::Publish => 5,
            Stage::Marketing => 6,
        }
    }

    /// Serialized key (`"draft"`, `"edit"`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::Edit => "edit",
            Stage::Cover => "cover",
            Stage::Format => "format",
            Stage::Publish => "publish",
            Stage::Marketing => "marketing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Draft => "Draft",
            Stage::Edit => "Edit",
            Stage::Cover => "Cover",
            Stage::Format => "Format",
            Stage::Publish => "Publish",
            Stage::Marketing => "Marketing",
        }
    }

    pub fn from_order(order: u8) -> Option<Stage> {
        Self::ALL.iter().copied().find(|stage| stage.order() == order)
    }

    /// Next stage in the workflow, `None` once a project reaches marketing
    pub fn next(self) -> Option<Stage> {
        Self::from_order(self.order() + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Stage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.key() == wanted)
            .ok_or_else(|| UnknownVariant::new("stage", s))
    }
}

/// Three-value project state that predates stages.
///
/// Only ever read from old documents; the canonical project has no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyStatus {
    Drafting,
    Ready,
    Published,
}

impl LegacyStatus {
    pub fn key(self) -> &'static str {
        match self {
            LegacyStatus::Drafting => "drafting",
            LegacyStatus::Ready => "ready",
            LegacyStatus::Published => "published",
        }
    }

    /// Stage a legacy status maps to
    pub fn stage(self) -> Stage {
        match self {
            LegacyStatus::Drafting => Stage::Draft,
            LegacyStatus::Ready => Stage::Format,
            LegacyStatus::Published => Stage::Publish,
        }
    }

    /// Legacy status a project in `stage` would have carried
    pub fn for_stage(stage: Stage) -> LegacyStatus {
        match stage {
            Stage::Draft | Stage::Edit | Stage::Cover => LegacyStatus::Drafting,
            Stage::Format => LegacyStatus::Ready,
            Stage::Publish | Stage::Marketing => LegacyStatus::Published,
        }
    }
}

impl FromStr for LegacyStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drafting" => Ok(LegacyStatus::Drafting),
            "ready" => Ok(LegacyStatus::Ready),
            "published" => Ok(LegacyStatus::Published),
            other => Err(UnknownVariant::new("status", other)),
        }
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Returned when parsing a closed enum from user input fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

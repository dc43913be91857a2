//! Event vocabulary shared by instance and any-instance hubs.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ATTRIBUTE_CHANGE_PREFIX: &str = "change:";

/// Event key used by [`EventHub`](super::EventHub).
///
/// The lifecycle vocabulary is closed; `Custom` carries caller-defined names
/// passed to `Model::trigger`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventName {
    /// Instance constructed. Fired on the any-instance hub only.
    Initialize,
    /// Aggregate change, fired once after each mutating `set`.
    Change,
    /// One attribute's merged value changed (`change:<attr>`).
    AttributeChange(String),
    /// Backend accepted a save.
    Save,
    /// Backend accepted a destroy.
    Destroy,
    /// Any other caller-defined event.
    Custom(String),
}

impl EventName {
    /// Builds the `change:<attr>` key for one attribute.
    pub fn attribute_change(attribute: impl Into<String>) -> Self {
        Self::AttributeChange(attribute.into())
    }

    /// Parses a string event key. Unknown names become `Custom`.
    pub fn parse(value: &str) -> Self {
        match value {
            "initialize" => Self::Initialize,
            "change" => Self::Change,
            "save" => Self::Save,
            "destroy" => Self::Destroy,
            other => match other.strip_prefix(ATTRIBUTE_CHANGE_PREFIX) {
                Some(attribute) if !attribute.is_empty() => {
                    Self::AttributeChange(attribute.to_string())
                }
                _ => Self::Custom(other.to_string()),
            },
        }
    }

    /// Returns whether this key belongs to the fixed lifecycle vocabulary.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Initialize | Self::Save | Self::Destroy)
    }
}

impl Display for EventName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialize => write!(f, "initialize"),
            Self::Change => write!(f, "change"),
            Self::AttributeChange(attribute) => write!(f, "{ATTRIBUTE_CHANGE_PREFIX}{attribute}"),
            Self::Save => write!(f, "save"),
            Self::Destroy => write!(f, "destroy"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for EventName {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl From<&str> for EventName {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for EventName {
    fn from(value: String) -> Self {
        Self::parse(value.as_str())
    }
}

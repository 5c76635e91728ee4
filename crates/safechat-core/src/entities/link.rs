//! Parent/child supervision link and its surveillance level

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Standing read access a parent has to a child's chats.
///
/// Variants are declared weakest first so the derived `Ord` matches access
/// strength: `Mild < Medium < Strict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveillanceLevel {
    /// Never any standing access
    Mild,
    /// Access only while the chat carries a flag
    #[default]
    Medium,
    /// Always allowed
    Strict,
}

impl SurveillanceLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Medium => "medium",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for SurveillanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveillanceLevel {
    type Err = DomainError;

    /// Only the three exact lowercase values are accepted; nothing is coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "medium" => Ok(Self::Medium),
            "mild" => Ok(Self::Mild),
            other => Err(DomainError::InvalidSurveillanceLevel(other.to_string())),
        }
    }
}

/// ParentChildLink entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentChildLink {
    pub parent_id: Snowflake,
    pub child_id: Snowflake,
    pub surveillance_level: SurveillanceLevel,
    pub created_at: DateTime<Utc>,
}

impl ParentChildLink {
    pub fn new(parent_id: Snowflake, child_id: Snowflake, level: SurveillanceLevel) -> Self {
        Self {
            parent_id,
            child_id,
            surveillance_level: level,
            created_at: Utc::now(),
        }
    }
}

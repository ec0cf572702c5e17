//! Owner handle types.

use serde::Serialize;
use std::fmt;

/// An owner reference pulled out of a CODEOWNERS line.
///
/// A handle containing `/` is always a [`OwnerHandle::Team`] and is never
/// checked against organization membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OwnerHandle {
    /// An individual account: `@name`.
    Individual {
        /// The account login, without the `@`.
        name: String,
    },
    /// A team: `@org/team`.
    Team {
        /// The organization part.
        org: String,
        /// The team slug.
        team: String,
    },
}

impl OwnerHandle {
    /// Creates an individual handle.
    pub fn individual(name: impl Into<String>) -> Self {
        Self::Individual { name: name.into() }
    }

    /// Creates a team handle.
    pub fn team(org: impl Into<String>, team: impl Into<String>) -> Self {
        Self::Team {
            org: org.into(),
            team: team.into(),
        }
    }

    /// Returns true for team handles.
    pub fn is_team(&self) -> bool {
        matches!(self, Self::Team { .. })
    }

    /// Returns the individual login, or `None` for a team.
    pub fn individual_name(&self) -> Option<&str> {
        match self {
            Self::Individual { name } => Some(name),
            Self::Team { .. } => None,
        }
    }

    /// Returns the handle text as written after the `@`.
    pub fn handle_text(&self) -> String {
        match self {
            Self::Individual { name } => name.clone(),
            Self::Team { org, team } => format!("{}/{}", org, team),
        }
    }
}

impl fmt::Display for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual { name } => write!(f, "@{}", name),
            Self::Team { org, team } => write!(f, "@{}/{}", org, team),
        }
    }
}

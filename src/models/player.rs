//! Player identity models.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StatsError;

/// A user-supplied player name. Matching against remote names is
/// case-insensitive; equality and ordering of handles themselves is exact.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerHandle {
    pub name: String,
}

impl PlayerHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Case-insensitive comparison against a name returned by the remote service.
    pub fn matches(&self, other: &str) -> bool {
        names_match(&self.name, other)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerHandle({})", self.name)
    }
}

impl From<String> for PlayerHandle {
    fn from(s: String) -> Self {
        Self { name: s }
    }
}

impl From<&str> for PlayerHandle {
    fn from(s: &str) -> Self {
        Self {
            name: s.to_string(),
        }
    }
}

/// A player whose identifier has been confirmed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPlayer {
    pub name: String,
    pub remote_id: String,
}

impl ResolvedPlayer {
    /// Build a resolved player from a name-resolution response.
    ///
    /// The remote service does fuzzy matching, so the returned name must
    /// equal the requested one (case-folded) and the id must be present.
    pub fn from_lookup(
        requested: &str,
        returned_name: Option<&str>,
        id: Option<String>,
    ) -> Result<Self, StatsError> {
        let remote_id = match id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(StatsError::not_found(requested, "no player id returned")),
        };

        match returned_name {
            Some(name) if names_match(requested, name) => Ok(Self {
                name: name.to_string(),
                remote_id,
            }),
            Some(name) => Err(StatsError::not_found(
                requested,
                format!("closest match was {}", name),
            )),
            None => Err(StatsError::not_found(requested, "no player name returned")),
        }
    }
}

fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

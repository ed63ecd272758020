//! Lookup failure taxonomy.
//!
//! Every stage of the lookup pipeline returns a `StatsError`. Single-name
//! lookups stop at the first one; the batch orchestrator classifies them
//! into buckets instead of propagating.

use serde::Serialize;
use thiserror::Error;

/// Which remote stage of the refresh/fetch pair failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStage {
    /// The server-side recompute trigger (`/player-update/{id}`).
    Update,
    /// The full profile fetch (`/player/{id}`).
    Fetch,
}

impl std::fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshStage::Update => write!(f, "update"),
            RefreshStage::Fetch => write!(f, "fetch"),
        }
    }
}

/// Errors produced while looking up, aggregating or extracting players.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Player not found: {name} ({detail})")]
    PlayerNotFound { name: String, detail: String },

    #[error("Profile is private (rank: {})", rank.as_deref().unwrap_or("unknown"))]
    PrivateProfile { rank: Option<String> },

    #[error("Profile is private and has no rank")]
    EmptyPrivate,

    #[error("Profile {stage} failed: {detail}")]
    RefreshFailed { stage: RefreshStage, detail: String },

    #[error("Unexpected profile document: {0}")]
    ParseError(String),

    #[error("No player names found in image")]
    NoNamesFound,

    #[error("Image could not be decoded: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Text detection failed: {0}")]
    Detection(String),
}

/// Copyable tag for a `StatsError`, used for bucketing and message selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Private,
    RefreshFailed,
    Parse,
    NoNames,
    Image,
}

impl StatsError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StatsError::PlayerNotFound { .. } => FailureKind::NotFound,
            StatsError::PrivateProfile { .. } | StatsError::EmptyPrivate => FailureKind::Private,
            StatsError::RefreshFailed { .. } => FailureKind::RefreshFailed,
            StatsError::ParseError(_) => FailureKind::Parse,
            StatsError::NoNamesFound => FailureKind::NoNames,
            StatsError::ImageDecode(_) | StatsError::Detection(_) => FailureKind::Image,
        }
    }

    pub(crate) fn not_found(name: &str, detail: impl Into<String>) -> Self {
        StatsError::PlayerNotFound {
            name: name.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn refresh_failed(stage: RefreshStage, detail: impl Into<String>) -> Self {
        StatsError::RefreshFailed {
            stage,
            detail: detail.into(),
        }
    }
}

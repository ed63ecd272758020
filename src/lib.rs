//! # Rivals Stats
//!
//! Ranked match statistics for Marvel Rivals players, for one name or for
//! every name on a leaderboard screenshot.
//!
//! ## Architecture
//!
//! - **client**: Remote stats service protocol (resolve, refresh, fetch)
//! - **aggregate**: Profile document → report
//! - **roster**: Screenshot → candidate player names
//! - **pipeline**: Single-name lookup and report refresh
//! - **batch**: Roster lookups with bounded concurrency and failure buckets
//! - **present**: Plain-text rendering for the CLI
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod present;
pub mod roster;

pub use error::{FailureKind, RefreshStage, StatsError};
pub use models::*;

use std::time::Duration;

/// Parse a timeout such as "500ms", "10s", "2m" or a bare number of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(ms) = s.strip_suffix("ms") {
        return ms.trim().parse().ok().map(Duration::from_millis);
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}

//! Aggregated per-player report models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ranked performance on one hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroRecord {
    pub hero: String,
    pub matches: u32,
    pub wins: u32,
    /// Always `matches - wins`
    pub losses: u32,
    /// 0.0 to 100.0, two decimals
    pub win_rate_pct: f64,
    pub kd: f64,
    pub mvps: u32,
}

/// A hero seen in the recent match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentHero {
    pub hero: String,
    pub recent_matches: u32,
    pub recent_wins: u32,
    pub recent_win_rate_pct: f64,
}

/// Compact ranked report for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub username: String,
    pub rank: String,

    pub overall_matches: u32,
    pub overall_wins: u32,
    pub overall_win_rate_pct: f64,

    /// Most played ranked heroes, at most three
    pub top_heroes: Vec<HeroRecord>,

    /// Most played heroes in the match history, at most five
    pub recent_heroes: Vec<RecentHero>,

    /// Win rate over the whole match history
    pub recent_overall_win_rate_pct: f64,

    /// Newest match in the history
    pub last_match_at: Option<DateTime<Utc>>,

    /// Icon of the most played hero
    pub thumbnail_url: Option<String>,
}

impl Report {
    /// Ranked losses across all heroes.
    pub fn overall_losses(&self) -> u32 {
        self.overall_matches.saturating_sub(self.overall_wins)
    }

    pub fn top_hero(&self) -> Option<&HeroRecord> {
        self.top_heroes.first()
    }
}

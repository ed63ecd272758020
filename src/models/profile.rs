//! Raw profile document as returned by the remote stats service.
//!
//! Every field is optional here: the aggregator decides which missing
//! fields are fatal, so an incompatible schema surfaces as a `ParseError`
//! rather than a deserialization failure deep inside the client.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response of the name-resolution endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerIdResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

impl PlayerIdResponse {
    /// The identifier as a string; numeric ids are accepted too.
    pub fn id_string(&self) -> Option<String> {
        value_to_key(self.id.as_ref()?)
    }
}

/// Response of the refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Full per-player document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub player_name: Option<String>,

    #[serde(default)]
    pub is_profile_private: Option<bool>,

    #[serde(default)]
    pub stats: Option<RawStats>,

    /// Hero id → hero stats, in the order the service sent them.
    #[serde(default, deserialize_with = "ordered_hero_stats")]
    pub hero_stats: Option<Vec<(String, RawHeroStats)>>,

    #[serde(default)]
    pub match_history: Option<Vec<RawMatch>>,
}

impl RawProfile {
    /// The rank string, if the document carries one.
    pub fn rank(&self) -> Option<&str> {
        self.stats
            .as_ref()?
            .rank
            .as_ref()?
            .rank
            .as_deref()
            .filter(|r| !r.trim().is_empty())
    }

    pub fn is_private(&self) -> bool {
        self.is_profile_private.unwrap_or(false)
    }

    pub fn has_match_history(&self) -> bool {
        self.match_history
            .as_ref()
            .map(|h| !h.is_empty())
            .unwrap_or(false)
    }

    /// Look up a hero's stats by id.
    pub fn hero(&self, id: &str) -> Option<&RawHeroStats> {
        self.hero_stats
            .as_ref()?
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, stats)| stats)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub rank: Option<RawRank>,
    #[serde(default)]
    pub ranked: Option<RawRankedTotals>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRank {
    #[serde(default)]
    pub rank: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRankedTotals {
    #[serde(default)]
    pub total_matches: Option<u64>,
    #[serde(default)]
    pub total_wins: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHeroStats {
    #[serde(default)]
    pub hero_name: Option<String>,
    #[serde(default)]
    pub ranked: Option<RawRankedHero>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRankedHero {
    #[serde(default)]
    pub matches: Option<u64>,
    #[serde(default)]
    pub wins: Option<u64>,
    /// Number or numeric string, depending on the service version.
    #[serde(default)]
    pub kdr: Option<Value>,
    #[serde(default)]
    pub mvp: Option<u64>,
}

impl RawRankedHero {
    /// An empty `{}` sub-record counts as no ranked play.
    pub fn is_empty(&self) -> bool {
        self.matches.is_none() && self.wins.is_none() && self.kdr.is_none() && self.mvp.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub stats: Option<RawMatchStats>,
    /// Unix seconds.
    #[serde(default)]
    pub match_timestamp: Option<i64>,
}

impl RawMatch {
    /// Hero id as a lookup key into `hero_stats`.
    pub fn hero_id(&self) -> Option<String> {
        let id = self.stats.as_ref()?.hero.as_ref()?.id.as_ref()?;
        value_to_key(id)
    }

    pub fn is_win(&self) -> bool {
        self.stats
            .as_ref()
            .and_then(|s| s.is_win)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatchStats {
    #[serde(default)]
    pub hero: Option<RawMatchHero>,
    #[serde(default)]
    pub is_win: Option<bool>,
    #[serde(default)]
    pub kills: Option<u64>,
    #[serde(default)]
    pub deaths: Option<u64>,
    #[serde(default)]
    pub assists: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatchHero {
    #[serde(default)]
    pub id: Option<Value>,
}

/// Numeric or string JSON value as a map key.
fn value_to_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ordered_hero_stats<'de, D>(deserializer: D) -> Result<Option<Vec<(String, RawHeroStats)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<serde_json::Map<String, Value>> = Option::deserialize(deserializer)?;
    map.map(|entries| {
        entries
            .into_iter()
            .map(|(id, value)| {
                serde_json::from_value(value)
                    .map(|stats| (id.clone(), stats))
                    .map_err(|e| D::Error::custom(format!("hero_stats[{}]: {}", id, e)))
            })
            .collect()
    })
    .transpose()
}

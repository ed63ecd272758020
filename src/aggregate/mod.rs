//! Statistics aggregation.
//!
//! Turns a raw profile document into a [`Report`]:
//! - Overall ranked record and win rate
//! - Top three heroes by ranked matches
//! - Recent hero usage and win rate from the match history
//! - Private-profile detection
//!
//! All percentages are rounded to two decimals.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::StatsError;
use crate::models::{HeroCatalog, HeroRecord, RawProfile, RecentHero, Report};

/// Heroes kept in `Report::top_heroes`.
pub const TOP_HEROES: usize = 3;

/// Heroes kept in `Report::recent_heroes`.
pub const RECENT_HEROES: usize = 5;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Win rate as a percentage, 0 when no matches were played.
pub fn win_rate_pct(wins: u32, matches: u32) -> f64 {
    if matches == 0 {
        0.0
    } else {
        round2(wins as f64 / matches as f64 * 100.0)
    }
}

/// Aggregate a profile into a report.
///
/// An absent profile, a profile flagged private, or one without any match
/// history is reported as private: `PrivateProfile` when a rank is still
/// readable, `EmptyPrivate` otherwise.
pub fn aggregate(profile: Option<&RawProfile>, catalog: &HeroCatalog) -> Result<Report, StatsError> {
    let profile = match profile {
        Some(p) if !p.is_private() && p.has_match_history() => p,
        other => return Err(private_outcome(other)),
    };

    let rank = profile
        .rank()
        .ok_or_else(|| missing("stats.rank.rank"))?
        .to_string();

    let totals = profile
        .stats
        .as_ref()
        .and_then(|s| s.ranked.as_ref())
        .ok_or_else(|| missing("stats.ranked"))?;
    let overall_matches = to_count(
        totals.total_matches.ok_or_else(|| missing("stats.ranked.total_matches"))?,
        "stats.ranked.total_matches",
    )?;
    let overall_wins = to_count(
        totals.total_wins.ok_or_else(|| missing("stats.ranked.total_wins"))?,
        "stats.ranked.total_wins",
    )?;

    let mut top_heroes = hero_records(profile)?;
    top_heroes.sort_by(|a, b| b.matches.cmp(&a.matches));
    top_heroes.truncate(TOP_HEROES);

    let recent = recent_performance(profile)?;

    let thumbnail_url = top_heroes
        .first()
        .and_then(|hero| catalog.icon_for(&hero.hero))
        .map(str::to_string);

    Ok(Report {
        username: profile.player_name.clone().unwrap_or_default(),
        rank,
        overall_matches,
        overall_wins,
        overall_win_rate_pct: win_rate_pct(overall_wins, overall_matches),
        top_heroes,
        recent_heroes: recent.heroes,
        recent_overall_win_rate_pct: recent.overall_win_rate_pct,
        last_match_at: recent.last_match_at,
        thumbnail_url,
    })
}

fn private_outcome(profile: Option<&RawProfile>) -> StatsError {
    match profile.and_then(RawProfile::rank) {
        Some(rank) => StatsError::PrivateProfile {
            rank: Some(rank.to_string()),
        },
        None => StatsError::EmptyPrivate,
    }
}

fn missing(field: &str) -> StatsError {
    StatsError::ParseError(format!("missing {}", field))
}

fn to_count(value: u64, field: &str) -> Result<u32, StatsError> {
    u32::try_from(value).map_err(|_| StatsError::ParseError(format!("{} out of range", field)))
}

fn len_to_count(len: usize, field: &str) -> Result<u32, StatsError> {
    u32::try_from(len).map_err(|_| StatsError::ParseError(format!("{} too long", field)))
}

/// Per-hero ranked records in the service's hero order. Heroes without a
/// ranked sub-record are skipped.
pub fn hero_records(profile: &RawProfile) -> Result<Vec<HeroRecord>, StatsError> {
    let heroes = profile
        .hero_stats
        .as_ref()
        .ok_or_else(|| missing("hero_stats"))?;

    let mut records = Vec::with_capacity(heroes.len());
    for (id, stats) in heroes {
        let ranked = match &stats.ranked {
            Some(ranked) if !ranked.is_empty() => ranked,
            _ => continue,
        };

        let hero = stats
            .hero_name
            .clone()
            .ok_or_else(|| missing(&format!("hero_stats[{}].hero_name", id)))?;
        let matches = to_count(ranked.matches.unwrap_or(0), "ranked.matches")?;
        let wins = to_count(ranked.wins.unwrap_or(0), "ranked.wins")?;
        if wins > matches {
            return Err(StatsError::ParseError(format!(
                "{} has {} wins in {} matches",
                hero, wins, matches
            )));
        }

        records.push(HeroRecord {
            matches,
            wins,
            losses: matches - wins,
            win_rate_pct: win_rate_pct(wins, matches),
            kd: parse_kdr(ranked.kdr.as_ref(), &hero)?,
            mvps: to_count(ranked.mvp.unwrap_or(0), "ranked.mvp")?,
            hero,
        });
    }

    Ok(records)
}

/// Kill/death ratio sent either as a number or a numeric string.
fn parse_kdr(value: Option<&Value>, hero: &str) -> Result<f64, StatsError> {
    let kd = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match kd {
        Some(kd) if kd.is_finite() && kd >= 0.0 => Ok(kd),
        _ => Err(StatsError::ParseError(format!("{} has an invalid kdr", hero))),
    }
}

/// Recent-history summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentPerformance {
    pub heroes: Vec<RecentHero>,
    pub overall_win_rate_pct: f64,
    pub last_match_at: Option<DateTime<Utc>>,
}

/// Summarize the match history (newest first, as sent by the service).
///
/// Hero usage counts only matches whose hero id is in the profile's hero
/// table; the overall win rate covers every match in the history.
pub fn recent_performance(profile: &RawProfile) -> Result<RecentPerformance, StatsError> {
    let history = profile.match_history.as_deref().unwrap_or_default();
    let total_matches = len_to_count(history.len(), "match_history")?;

    let hero_names: HashMap<&str, &str> = profile
        .hero_stats
        .iter()
        .flatten()
        .filter_map(|(id, stats)| Some((id.as_str(), stats.hero_name.as_deref()?)))
        .collect();

    // First-appearance order, so equal counts keep newest-first ordering
    let mut heroes: Vec<RecentHero> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total_wins = 0u32;

    for entry in history {
        let won = entry.is_win();
        if won {
            total_wins += 1;
        }

        let Some(name) = entry
            .hero_id()
            .and_then(|id| hero_names.get(id.as_str()).copied())
        else {
            continue;
        };

        let slot = *index.entry(name).or_insert_with(|| {
            heroes.push(RecentHero {
                hero: name.to_string(),
                recent_matches: 0,
                recent_wins: 0,
                recent_win_rate_pct: 0.0,
            });
            heroes.len() - 1
        });
        let hero = &mut heroes[slot];
        hero.recent_matches += 1;
        if won {
            hero.recent_wins += 1;
        }
    }

    for hero in &mut heroes {
        hero.recent_win_rate_pct = win_rate_pct(hero.recent_wins, hero.recent_matches);
    }
    heroes.sort_by(|a, b| b.recent_matches.cmp(&a.recent_matches));
    heroes.truncate(RECENT_HEROES);

    let last_match_at = history
        .iter()
        .filter_map(|m| m.match_timestamp)
        .max()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    Ok(RecentPerformance {
        heroes,
        overall_win_rate_pct: win_rate_pct(total_wins, total_matches),
        last_match_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn profile(value: Value) -> RawProfile {
        serde_json::from_value(value).unwrap()
    }

    fn history_entry(hero_id: u64, win: bool) -> Value {
        json!({"stats": {"hero": {"id": hero_id}, "is_win": win}, "match_timestamp": 1_700_000_000})
    }

    fn base_profile(heroes: Value, history: Vec<Value>) -> RawProfile {
        profile(json!({
            "player_name": "ShadowFox99",
            "stats": {
                "rank": {"rank": "Diamond III"},
                "ranked": {"total_matches": 200, "total_wins": 120}
            },
            "hero_stats": heroes,
            "match_history": history
        }))
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(60.0), 60.0);
    }

    #[test]
    fn test_count_conversions_reject_overflow() {
        assert_eq!(len_to_count(42, "match_history").unwrap(), 42);
        assert!(matches!(
            len_to_count(u32::MAX as usize + 1, "match_history"),
            Err(StatsError::ParseError(_))
        ));
        assert!(matches!(
            to_count(u64::from(u32::MAX) + 1, "stats.ranked.total_matches"),
            Err(StatsError::ParseError(_))
        ));
    }

    #[test]
    fn test_win_rate_pct() {
        assert_eq!(win_rate_pct(1, 3), 33.33);
        assert_eq!(win_rate_pct(0, 0), 0.0);
        assert_eq!(win_rate_pct(5, 0), 0.0);
        assert_eq!(win_rate_pct(30, 50), 60.0);
    }

    #[test]
    fn test_end_to_end_report() {
        let p = base_profile(
            json!({
                "1011": {"hero_name": "Storm", "ranked": {"matches": 50, "wins": 30, "kdr": "2.5", "mvp": 4}}
            }),
            vec![history_entry(1011, true)],
        );

        let report = aggregate(Some(&p), &HeroCatalog::builtin()).unwrap();

        assert_eq!(report.username, "ShadowFox99");
        assert_eq!(report.rank, "Diamond III");
        assert_eq!(report.overall_matches, 200);
        assert_eq!(report.overall_wins, 120);
        assert_eq!(report.overall_win_rate_pct, 60.0);
        assert_eq!(report.overall_losses(), 80);
        assert_eq!(
            report.top_heroes,
            vec![HeroRecord {
                hero: "Storm".to_string(),
                matches: 50,
                wins: 30,
                losses: 20,
                win_rate_pct: 60.0,
                kd: 2.5,
                mvps: 4,
            }]
        );
        assert_eq!(
            report.thumbnail_url.as_deref(),
            Some("https://mrapi.org/assets/characters/storm-headbig.png")
        );
        assert_eq!(
            report.last_match_at,
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
        );
    }

    #[test]
    fn test_zero_matches_no_division() {
        let p = profile(json!({
            "player_name": "New",
            "stats": {"rank": {"rank": "Bronze III"}, "ranked": {"total_matches": 0, "total_wins": 0}},
            "hero_stats": {"1": {"hero_name": "Groot", "ranked": {"matches": 0, "wins": 0}}},
            "match_history": [{"stats": {"hero": {"id": 999}, "is_win": false}}]
        }));

        let report = aggregate(Some(&p), &HeroCatalog::builtin()).unwrap();

        assert_eq!(report.overall_win_rate_pct, 0.0);
        assert_eq!(report.top_heroes[0].win_rate_pct, 0.0);
        assert_eq!(report.top_heroes[0].losses, 0);
        assert!(report.recent_heroes.is_empty());
        assert_eq!(report.recent_overall_win_rate_pct, 0.0);
    }

    #[test]
    fn test_top_heroes_stable_on_ties() {
        let p = base_profile(
            json!({
                "2": {"hero_name": "B", "ranked": {"matches": 10, "wins": 5}},
                "1": {"hero_name": "A", "ranked": {"matches": 10, "wins": 2}},
                "3": {"hero_name": "C", "ranked": {"matches": 5, "wins": 1}},
                "4": {"hero_name": "D", "ranked": {"matches": 1, "wins": 1}}
            }),
            vec![history_entry(1, true)],
        );

        let report = aggregate(Some(&p), &HeroCatalog::builtin()).unwrap();
        let names: Vec<_> = report.top_heroes.iter().map(|h| h.hero.as_str()).collect();

        assert_eq!(names, vec!["B", "A", "C"]);
        for hero in &report.top_heroes {
            assert_eq!(hero.losses, hero.matches - hero.wins);
        }
    }

    #[test]
    fn test_heroes_without_ranked_are_skipped() {
        let p = base_profile(
            json!({
                "1": {"hero_name": "Loki"},
                "2": {"hero_name": "Hela", "ranked": {}},
                "3": {"hero_name": "Thor", "ranked": {"matches": 3, "wins": 1, "kdr": 1.25}}
            }),
            vec![history_entry(3, false)],
        );

        let records = hero_records(&p).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hero, "Thor");
        assert_eq!(records[0].win_rate_pct, 33.33);
        assert_eq!(records[0].kd, 1.25);
    }

    #[test]
    fn test_recent_performance() {
        let p = base_profile(
            json!({
                "1": {"hero_name": "Storm"},
                "2": {"hero_name": "Loki"},
                "3": {"hero_name": "Hela"}
            }),
            vec![
                history_entry(2, true),
                history_entry(1, true),
                history_entry(1, false),
                history_entry(2, false),
                history_entry(3, true),
                history_entry(1, true),
                history_entry(42, true), // not in hero table
            ],
        );

        let recent = recent_performance(&p).unwrap();

        assert_eq!(
            recent.heroes,
            vec![
                RecentHero {
                    hero: "Storm".to_string(),
                    recent_matches: 3,
                    recent_wins: 2,
                    recent_win_rate_pct: 66.67,
                },
                RecentHero {
                    hero: "Loki".to_string(),
                    recent_matches: 2,
                    recent_wins: 1,
                    recent_win_rate_pct: 50.0,
                },
                RecentHero {
                    hero: "Hela".to_string(),
                    recent_matches: 1,
                    recent_wins: 1,
                    recent_win_rate_pct: 100.0,
                },
            ]
        );
        // 5 wins over all 7 entries, including the unknown hero
        assert_eq!(recent.overall_win_rate_pct, 71.43);
    }

    #[test]
    fn test_recent_heroes_capped_at_five() {
        let heroes: serde_json::Map<String, Value> = (1..=7)
            .map(|i| (i.to_string(), json!({"hero_name": format!("H{}", i)})))
            .collect();
        let history = (1..=7).map(|i| history_entry(i, false)).collect();
        let p = base_profile(Value::Object(heroes), history);

        let recent = recent_performance(&p).unwrap();
        let names: Vec<_> = recent.heroes.iter().map(|h| h.hero.as_str()).collect();

        assert_eq!(names, vec!["H1", "H2", "H3", "H4", "H5"]);
    }

    #[test]
    fn test_private_with_rank() {
        let p = profile(json!({
            "is_profile_private": true,
            "stats": {"rank": {"rank": "Gold I"}}
        }));

        let err = aggregate(Some(&p), &HeroCatalog::builtin()).unwrap_err();
        match err {
            StatsError::PrivateProfile { rank } => assert_eq!(rank.as_deref(), Some("Gold I")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_private_without_rank() {
        let p = profile(json!({"is_profile_private": true}));
        assert!(matches!(
            aggregate(Some(&p), &HeroCatalog::builtin()),
            Err(StatsError::EmptyPrivate)
        ));

        assert!(matches!(
            aggregate(None, &HeroCatalog::builtin()),
            Err(StatsError::EmptyPrivate)
        ));
    }

    #[test]
    fn test_empty_history_is_private() {
        let p = base_profile(json!({}), vec![]);
        match aggregate(Some(&p), &HeroCatalog::builtin()).unwrap_err() {
            StatsError::PrivateProfile { rank } => {
                assert_eq!(rank.as_deref(), Some("Diamond III"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_are_parse_errors() {
        let no_ranked = profile(json!({
            "stats": {"rank": {"rank": "Gold I"}},
            "hero_stats": {},
            "match_history": [history_entry(1, true)]
        }));
        assert!(matches!(
            aggregate(Some(&no_ranked), &HeroCatalog::builtin()),
            Err(StatsError::ParseError(_))
        ));

        let no_rank = profile(json!({
            "stats": {"ranked": {"total_matches": 1, "total_wins": 1}},
            "hero_stats": {},
            "match_history": [history_entry(1, true)]
        }));
        assert!(matches!(
            aggregate(Some(&no_rank), &HeroCatalog::builtin()),
            Err(StatsError::ParseError(_))
        ));

        let no_heroes = profile(json!({
            "stats": {"rank": {"rank": "Gold I"}, "ranked": {"total_matches": 1, "total_wins": 1}},
            "match_history": [history_entry(1, true)]
        }));
        assert!(matches!(
            aggregate(Some(&no_heroes), &HeroCatalog::builtin()),
            Err(StatsError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_hero_records() {
        let too_many_wins = base_profile(
            json!({"1": {"hero_name": "Thor", "ranked": {"matches": 1, "wins": 2}}}),
            vec![history_entry(1, true)],
        );
        assert!(matches!(
            hero_records(&too_many_wins),
            Err(StatsError::ParseError(_))
        ));

        let bad_kdr = base_profile(
            json!({"1": {"hero_name": "Thor", "ranked": {"matches": 1, "wins": 1, "kdr": "n/a"}}}),
            vec![history_entry(1, true)],
        );
        assert!(matches!(hero_records(&bad_kdr), Err(StatsError::ParseError(_))));
    }
}

//! Plain-text rendering for the command line.

use std::fmt::Write;

use crate::config::ApiConfig;
use crate::error::{FailureKind, StatsError};
use crate::models::{BatchResult, HeroCatalog, Report};

/// Render a report as a text block.
pub fn render_report(report: &Report, catalog: &HeroCatalog) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📊 {}'s Stats", report.username);
    let _ = writeln!(out);
    let _ = writeln!(out, "🏆 Overall Stats");
    let _ = writeln!(out, "  • Rank: {}", report.rank);
    let _ = writeln!(out, "  • Win Rate: {}%", report.overall_win_rate_pct);
    let _ = writeln!(out, "  • Matches: {}", report.overall_matches);
    let _ = writeln!(out, "  • Wins: {}", report.overall_wins);

    let _ = writeln!(out);
    let _ = writeln!(out, "Most Played Heroes");
    if report.top_heroes.is_empty() {
        let _ = writeln!(out, "  No ranked heroes found.");
    }
    for hero in &report.top_heroes {
        let _ = writeln!(
            out,
            "  {} | WR {}% | {} matches | {} W / {} L | K/D {} | {} MVPs",
            hero.hero, hero.win_rate_pct, hero.matches, hero.wins, hero.losses, hero.kd, hero.mvps
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "⏳ Recently Played Heroes");
    if report.recent_heroes.is_empty() {
        let _ = writeln!(out, "  No recent matches found.");
    } else {
        for hero in &report.recent_heroes {
            let _ = writeln!(
                out,
                "  • {}: {} matches ({}% WR)",
                hero.hero, hero.recent_matches, hero.recent_win_rate_pct
            );
        }
        let _ = writeln!(
            out,
            "  Recent win rate: {}%",
            report.recent_overall_win_rate_pct
        );
    }
    if let Some(at) = report.last_match_at {
        let _ = writeln!(out, "  Last match: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", catalog.footer);
    out
}

/// User-facing message for a failed lookup.
pub fn failure_message(name: &str, err: &StatsError, api: &ApiConfig) -> String {
    match (err.kind(), err) {
        (_, StatsError::PrivateProfile { rank: Some(rank) }) => {
            format!("{}'s profile is private. Rank: {}", name, rank)
        }
        (FailureKind::Private, _) => format!("{}'s profile is private.", name),
        (FailureKind::NotFound, _) => format!(
            "Player {} not found. Check the name or look them up at {}",
            name,
            api.profile_url(name)
        ),
        (FailureKind::RefreshFailed, _) | (FailureKind::Parse, _) => format!(
            "Could not load stats for {} right now. Please try again later.",
            name
        ),
        (FailureKind::NoNames, _) => "No player names could be read from that image.".to_string(),
        (FailureKind::Image, _) => format!("Could not read that image: {}", err),
    }
}

/// Render a batch result as summary lines plus one report per success.
pub fn render_batch(result: &BatchResult, catalog: &HeroCatalog) -> String {
    let mut out = String::new();

    for report in &result.succeeded {
        let _ = writeln!(out, "{}", render_report(report, catalog));
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "=== Roster Results ===");
    let _ = writeln!(out, "Found:            {}", result.succeeded.len());
    let _ = writeln!(out, "Private:          {}", result.private.len());
    for handle in &result.private {
        let _ = writeln!(out, "  - {}", handle);
    }
    let _ = writeln!(out, "Not found:        {}", result.not_found.len());
    for handle in &result.not_found {
        let _ = writeln!(out, "  - {}", handle);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefreshStage;
    use crate::models::{HeroRecord, PlayerHandle};

    fn report() -> Report {
        Report {
            username: "Ace".to_string(),
            rank: "Gold II".to_string(),
            overall_matches: 3,
            overall_wins: 1,
            overall_win_rate_pct: 33.33,
            top_heroes: vec![HeroRecord {
                hero: "Storm".to_string(),
                matches: 3,
                wins: 1,
                losses: 2,
                win_rate_pct: 33.33,
                kd: 1.5,
                mvps: 0,
            }],
            recent_heroes: vec![],
            recent_overall_win_rate_pct: 0.0,
            last_match_at: None,
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_render_report() {
        let text = render_report(&report(), &HeroCatalog::builtin());

        assert!(text.starts_with("📊 Ace's Stats"));
        assert!(text.contains("Win Rate: 33.33%"));
        assert!(text.contains("Storm | WR 33.33% | 3 matches | 1 W / 2 L | K/D 1.5 | 0 MVPs"));
        assert!(text.contains("No recent matches found."));
        assert!(text.ends_with("Powered by RivalsX"));
    }

    #[test]
    fn test_failure_messages() {
        let api = ApiConfig::default();

        let msg = failure_message("Ghost", &StatsError::not_found("Ghost", "HTTP 404"), &api);
        assert!(msg.contains("https://tracker.gg/marvel-rivals/profile/ign/Ghost/overview"));

        let msg = failure_message(
            "Hidden",
            &StatsError::PrivateProfile {
                rank: Some("Gold I".to_string()),
            },
            &api,
        );
        assert_eq!(msg, "Hidden's profile is private. Rank: Gold I");

        let msg = failure_message("Hidden", &StatsError::EmptyPrivate, &api);
        assert_eq!(msg, "Hidden's profile is private.");

        let msg = failure_message(
            "Busy",
            &StatsError::RefreshFailed {
                stage: RefreshStage::Update,
                detail: "x".to_string(),
            },
            &api,
        );
        assert!(msg.contains("try again"));
    }

    #[test]
    fn test_render_batch() {
        let mut result = BatchResult::new();
        result.succeeded.push(report());
        result.private.insert(PlayerHandle::new("Hidden"));
        result.not_found.insert(PlayerHandle::new("Ghost"));

        let text = render_batch(&result, &HeroCatalog::builtin());
        assert!(text.contains("Found:            1"));
        assert!(text.contains("  - Hidden"));
        assert!(text.contains("  - Ghost"));
    }
}

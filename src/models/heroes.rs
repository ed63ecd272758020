//! Static hero display metadata.
//!
//! Built once at startup and shared read-only (behind an `Arc`) by every
//! lookup; nothing mutates a catalog after construction.

use std::collections::HashMap;

/// Base URL for hero head icons.
pub const DEFAULT_ICON_BASE_URL: &str = "https://mrapi.org/assets/characters";

/// Accent colour for rendered reports.
pub const DEFAULT_ACCENT_COLOR: u32 = 0x00b0f4;

const KNOWN_HEROES: &[&str] = &[
    "Bruce Banner",
    "The Punisher",
    "Storm",
    "Loki",
    "Doctor Strange",
    "Mantis",
    "Hawkeye",
    "Captain America",
    "Rocket Raccoon",
    "Hela",
    "Cloak & Dagger",
    "Black Panther",
    "Groot",
    "Magik",
    "Moon Knight",
    "Luna Snow",
    "Squirrel Girl",
    "Black Widow",
    "Iron Man",
    "Venom",
    "Spider-man",
    "Magneto",
    "Scarlet Witch",
    "Thor",
    "Mister Fantastic",
    "Winter Soldier",
    "Peni Parker",
    "Star-lord",
    "Namor",
    "Adam Warlock",
    "Jeff The Land Shark",
    "Psylocke",
    "Wolverine",
    "Invisible Woman",
    "Iron Fist",
];

/// Immutable hero name → icon table plus report styling.
#[derive(Debug, Clone)]
pub struct HeroCatalog {
    /// Keyed by lowercased hero name
    icons: HashMap<String, String>,
    pub accent_color: u32,
    pub footer: String,
}

impl HeroCatalog {
    /// Catalog of the known roster with icons under `icon_base_url`.
    pub fn new(icon_base_url: &str) -> Self {
        let base = icon_base_url.trim_end_matches('/');
        let icons = KNOWN_HEROES
            .iter()
            .map(|name| {
                (
                    name.to_lowercase(),
                    format!("{}/{}-headbig.png", base, hero_slug(name)),
                )
            })
            .collect();

        Self {
            icons,
            accent_color: DEFAULT_ACCENT_COLOR,
            footer: "Powered by RivalsX".to_string(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_ICON_BASE_URL)
    }

    /// Icon URL for a hero; names are matched case-insensitively.
    pub fn icon_for(&self, hero: &str) -> Option<&str> {
        self.icons.get(&hero.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl Default for HeroCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// "Cloak & Dagger" → "cloak-dagger"
fn hero_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_slug() {
        assert_eq!(hero_slug("Cloak & Dagger"), "cloak-dagger");
        assert_eq!(hero_slug("Spider-man"), "spider-man");
        assert_eq!(hero_slug("Jeff The Land Shark"), "jeff-the-land-shark");
        assert_eq!(hero_slug("Star-lord"), "star-lord");
    }

    #[test]
    fn test_builtin_icons() {
        let catalog = HeroCatalog::builtin();
        assert_eq!(catalog.len(), KNOWN_HEROES.len());
        assert_eq!(
            catalog.icon_for("Cloak & Dagger"),
            Some("https://mrapi.org/assets/characters/cloak-dagger-headbig.png")
        );
        // Service spelling differs in case from the table
        assert_eq!(
            catalog.icon_for("Spider-Man"),
            Some("https://mrapi.org/assets/characters/spider-man-headbig.png")
        );
        assert_eq!(catalog.icon_for("Nobody"), None);
    }

    #[test]
    fn test_custom_base_url() {
        let catalog = HeroCatalog::new("http://localhost/icons/");
        assert_eq!(
            catalog.icon_for("Storm"),
            Some("http://localhost/icons/storm-headbig.png")
        );
        assert_eq!(catalog.accent_color, 0x00b0f4);
    }
}

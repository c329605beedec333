//! Club website crawler pro zjištění lig, ve kterých klub hraje
//!
//! Tok dat na jeden klub:
//!   homepage → kandidátní podstránky (team/liga/kader…) → druhá úroveň
//!   → text ze všech stránek → `LeagueClassifier` → `ClubLeagueResult`
//!
//! Jeden sdílený browser tab, všechno sekvenčně.

pub mod browser;
pub mod crawl;
pub mod extract;
pub mod links;

use league_classifier::{Classification, LeagueCode};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub use browser::{BrowserOptions, ChromeSession, LoadedPage, PageLoader};
pub use crawl::ClubCrawler;
pub use extract::{extract_text, text_sample};
pub use links::discover_links;

/// Vstupní záznam klubu z registru (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubSource {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Výsledek crawlu jednoho klubu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubLeagueResult {
    pub id: String,
    pub name: String,
    pub website: String,
    #[serde(default)]
    pub women_leagues: BTreeSet<LeagueCode>,
    #[serde(default)]
    pub men_leagues: BTreeSet<LeagueCode>,
    #[serde(default)]
    pub youth_leagues: BTreeSet<LeagueCode>,
    #[serde(default)]
    pub all_leagues: BTreeSet<LeagueCode>,
    #[serde(default)]
    pub pages_scraped: Vec<String>,
    #[serde(default)]
    pub text_sample: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClubLeagueResult {
    pub fn new(source: &ClubSource) -> Self {
        Self {
            id: source.id.clone(),
            name: source.name.clone(),
            website: source.website.clone(),
            women_leagues: BTreeSet::new(),
            men_leagues: BTreeSet::new(),
            youth_leagues: BTreeSet::new(),
            all_leagues: BTreeSet::new(),
            pages_scraped: Vec::new(),
            text_sample: String::new(),
            error: None,
        }
    }

    pub fn apply(&mut self, c: Classification) {
        self.women_leagues = c.women;
        self.men_leagues = c.men;
        self.youth_leagues = c.youth;
        self.all_leagues = c.all;
    }

    pub fn has_leagues(&self) -> bool {
        !self.all_leagues.is_empty()
    }

    /// Kódy jako stringy (pro logy a eventy)
    pub fn league_strings(&self) -> Vec<String> {
        self.all_leagues.iter().map(|c| c.to_string()).collect()
    }
}

/// Limity a časování jednoho crawlu
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_candidates: usize,
    pub second_level_per_page: usize,
    pub max_second_level: usize,
    pub text_sample_chars: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_candidates: 15,
            second_level_per_page: 3,
            max_second_level: 10,
            text_sample_chars: 500,
        }
    }
}

/// Výchozí časování browseru pro crawler
pub const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(3000);

/// Načte registr klubů (JSON pole). Nečitelný vstup = fatální chyba běhu.
pub fn load_sources(path: &Path) -> Result<Vec<ClubSource>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read clubs file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse clubs file {}", path.display()))
}

/// Duplicitní ID v registru se crawlují jen jednou (první výskyt vyhrává).
/// Vrací i počet zahozených duplicit.
pub fn dedup_sources(sources: Vec<ClubSource>) -> (Vec<ClubSource>, usize) {
    let total = sources.len();
    let mut seen = HashSet::new();
    let unique: Vec<ClubSource> = sources.into_iter().filter(|s| seen.insert(s.id.clone())).collect();
    let dropped = total - unique.len();
    (unique, dropped)
}

// Registr exportuje ID někdy jako číslo, někdy jako string
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_source_accepts_numeric_id() {
        let raw = r#"[{"id": 42, "name": "VBC Bern", "website": "https://vbc.example"},
                      {"id": "abc", "name": "VC Lugano", "logo": "lugano.png"}]"#;
        let clubs: Vec<ClubSource> = serde_json::from_str(raw).unwrap();
        assert_eq!(clubs[0].id, "42");
        assert_eq!(clubs[1].id, "abc");
        assert_eq!(clubs[1].website, "");
        assert_eq!(clubs[1].logo.as_deref(), Some("lugano.png"));
    }

    #[test]
    fn test_dedup_sources_keeps_first() {
        let raw = r#"[{"id": 1, "name": "A"}, {"id": "2", "name": "B"}, {"id": "1", "name": "A again"}]"#;
        let clubs: Vec<ClubSource> = serde_json::from_str(raw).unwrap();
        let (unique, dropped) = dedup_sources(clubs);
        assert_eq!(dropped, 1);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].name, "A");
    }

    #[test]
    fn test_load_sources_missing_file_is_error() {
        assert!(load_sources(Path::new("/nonexistent/clubs.json")).is_err());
    }

    #[test]
    fn test_result_serializes_camel_case_codes() {
        let source = ClubSource {
            id: "7".into(),
            name: "Volley Club".into(),
            website: "https://volley.example".into(),
            logo: None,
        };
        let mut result = ClubLeagueResult::new(&source);
        result.all_leagues.insert(LeagueCode::L2);
        result.all_leagues.insert(LeagueCode::Nla);
        result.women_leagues.insert(LeagueCode::Nla);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["allLeagues"], serde_json::json!(["NLA", "2L"]));
        assert_eq!(json["womenLeagues"], serde_json::json!(["NLA"]));
        assert!(json.get("error").is_none());

        let back: ClubLeagueResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}

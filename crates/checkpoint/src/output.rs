//! Finální výstup crawleru + agregátní statistiky

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use club_crawler::ClubLeagueResult;
use league_classifier::LeagueCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub total_scraped: usize,
    pub with_leagues: usize,
    pub with_errors: usize,
    /// Počet klubů per seniorská liga. Mládežnické kódy sem nikdy nepatří.
    pub league_counts: BTreeMap<LeagueCode, usize>,
    pub unique_leagues: BTreeSet<LeagueCode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub scraped_at: DateTime<Utc>,
    pub statistics: RunStatistics,
    pub results: Vec<ClubLeagueResult>,
}

pub fn compute_statistics(results: &[ClubLeagueResult]) -> RunStatistics {
    let mut stats = RunStatistics {
        total_scraped: results.len(),
        league_counts: LeagueCode::SENIOR.iter().map(|c| (*c, 0)).collect(),
        ..Default::default()
    };

    for r in results {
        if r.has_leagues() {
            stats.with_leagues += 1;
        }
        if r.error.is_some() {
            stats.with_errors += 1;
        }
        for code in &r.all_leagues {
            stats.unique_leagues.insert(*code);
            if code.is_senior() {
                *stats.league_counts.entry(*code).or_insert(0) += 1;
            }
        }
    }

    stats
}

/// Zápis přes dočasný soubor + rename, takže čtenář nikdy neuvidí půlku JSONu
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let json = serde_json::to_string_pretty(value).context("serialize json")?;
    fs::write(tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(tmp, path).with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use club_crawler::ClubSource;
    use tempfile::TempDir;

    fn result(id: &str, codes: &[LeagueCode], error: Option<&str>) -> ClubLeagueResult {
        let mut r = ClubLeagueResult::new(&ClubSource {
            id: id.into(),
            name: format!("Club {id}"),
            website: String::new(),
            logo: None,
        });
        r.all_leagues = codes.iter().copied().collect();
        r.error = error.map(str::to_string);
        r
    }

    #[test]
    fn test_statistics_exclude_youth_from_league_counts() {
        let results = vec![
            result("1", &[LeagueCode::Nla, LeagueCode::U18], None),
            result("2", &[LeagueCode::U18, LeagueCode::Juniors], None),
            result("3", &[], Some("homepage failed: timeout")),
            result("4", &[LeagueCode::Nla, LeagueCode::L3], None),
        ];
        let stats = compute_statistics(&results);

        assert_eq!(stats.total_scraped, 4);
        assert_eq!(stats.with_leagues, 3);
        assert_eq!(stats.with_errors, 1);
        assert_eq!(stats.league_counts[&LeagueCode::Nla], 2);
        assert_eq!(stats.league_counts[&LeagueCode::L3], 1);
        assert_eq!(stats.league_counts[&LeagueCode::L5], 0);
        assert!(!stats.league_counts.contains_key(&LeagueCode::U18));
        assert!(!stats.league_counts.contains_key(&LeagueCode::Juniors));
        assert!(stats.unique_leagues.contains(&LeagueCode::U18));
    }

    #[test]
    fn test_output_json_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/club_leagues.json");
        let results = vec![result("1", &[LeagueCode::Nlb], None)];
        let output = RunOutput {
            scraped_at: Utc::now(),
            statistics: compute_statistics(&results),
            results,
        };
        write_json_atomic(&path, &output).unwrap();

        let raw: serde_json::Value = read_json(&path).unwrap();
        assert!(raw["scrapedAt"].is_string());
        assert_eq!(raw["statistics"]["totalScraped"], 1);
        assert_eq!(raw["statistics"]["leagueCounts"]["NLB"], 1);
        assert_eq!(raw["statistics"]["uniqueLeagues"], serde_json::json!(["NLB"]));
        assert_eq!(raw["results"][0]["allLeagues"], serde_json::json!(["NLB"]));
        assert!(!dir.path().join("out/club_leagues.json.tmp").exists());
    }
}

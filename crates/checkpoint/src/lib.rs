//! Checkpoint manager pro dlouhý batch crawl
//!
//! - při startu načte checkpoint (pokud existuje) a odvodí zpracovaná ID
//! - každých N nově dokončených klubů přepíše checkpoint celým snapshotem
//! - po čistém doběhnutí zapíše finální výstup a checkpoint smaže
//!
//! Existence checkpointu = nedokončený běh, dá se navázat.

pub mod output;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use club_crawler::ClubLeagueResult;
use logger::{now_iso, CheckpointSavedEvent, EventLogger};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use output::{compute_statistics, read_json, write_json_atomic, RunOutput, RunStatistics};

/// Po tolika selháních zápisu checkpointu za sebou se běh ukončí
pub const MAX_CONSECUTIVE_SAVE_FAILURES: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckpointFile {
    pub results: Vec<ClubLeagueResult>,
}

pub struct CheckpointManager {
    path: PathBuf,
    batch_size: usize,
    results: Vec<ClubLeagueResult>,
    processed: HashSet<String>,
    resumed: usize,
    completed_this_run: usize,
    consecutive_failures: usize,
    logger: Option<EventLogger>,
}

impl CheckpointManager {
    pub fn open(path: impl Into<PathBuf>, batch_size: usize) -> Result<Self> {
        let path = path.into();
        let results = if path.exists() {
            let file: CheckpointFile = read_json(&path).context("checkpoint is unreadable")?;
            dedup_by_id(file.results)
        } else {
            Vec::new()
        };

        let processed: HashSet<String> = results.iter().map(|r| r.id.clone()).collect();
        if !results.is_empty() {
            info!("♻️  Resuming from checkpoint {}: {} clubs already done", path.display(), results.len());
        }

        Ok(Self {
            path,
            batch_size: batch_size.max(1),
            resumed: results.len(),
            results,
            processed,
            completed_this_run: 0,
            consecutive_failures: 0,
            logger: None,
        })
    }

    pub fn with_logger(mut self, logger: EventLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    /// Kolik klubů bylo hotových už před tímto během
    pub fn resumed(&self) -> usize {
        self.resumed
    }

    pub fn completed_this_run(&self) -> usize {
        self.completed_this_run
    }

    pub fn results(&self) -> &[ClubLeagueResult] {
        &self.results
    }

    /// Přidá výsledek klubu. Každých `batch_size` nových klubů uloží snapshot.
    /// Chyba jen po opakovaném selhání zápisu checkpointu.
    pub fn record(&mut self, result: ClubLeagueResult) -> Result<()> {
        if !self.processed.insert(result.id.clone()) {
            warn!("Duplicate club id {} ignored", result.id);
            return Ok(());
        }
        self.results.push(result);
        self.completed_this_run += 1;

        if self.completed_this_run % self.batch_size == 0 {
            self.save_with_policy()?;
        }
        Ok(())
    }

    /// Selhání zápisu se zaloguje a běh pokračuje; po N selháních za sebou konec
    fn save_with_policy(&mut self) -> Result<()> {
        match self.save() {
            Ok(()) => {
                self.consecutive_failures = 0;
                info!("💾 Checkpoint saved: {} clubs", self.results.len());
                self.log_save(true, "ok".to_string());
                Ok(())
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    "Checkpoint write failed ({}/{}): {:#}",
                    self.consecutive_failures, MAX_CONSECUTIVE_SAVE_FAILURES, e
                );
                self.log_save(false, format!("{e:#}"));
                if self.consecutive_failures >= MAX_CONSECUTIVE_SAVE_FAILURES {
                    bail!(
                        "checkpoint {} failed {} times in a row: {:#}",
                        self.path.display(),
                        self.consecutive_failures,
                        e
                    );
                }
                Ok(())
            }
        }
    }

    /// Plný snapshot (přepis, ne append)
    pub fn save(&self) -> Result<()> {
        write_json_atomic(
            &self.path,
            &CheckpointFile {
                results: self.results.clone(),
            },
        )
    }

    /// Čistý konec: finální výstup, pak smazání checkpointu.
    /// Když zápis výstupu selže, checkpoint zůstává.
    pub fn finish(self, output_path: &Path) -> Result<RunOutput> {
        let output = RunOutput {
            scraped_at: Utc::now(),
            statistics: compute_statistics(&self.results),
            results: self.results,
        };

        if let Err(e) = write_json_atomic(output_path, &output) {
            // checkpoint musí obsahovat i výsledky od posledního snapshotu
            let snapshot = CheckpointFile { results: output.results };
            if let Err(save_err) = write_json_atomic(&self.path, &snapshot) {
                warn!("Final checkpoint write failed: {:#}", save_err);
            }
            return Err(e.context(format!("failed to write output {}", output_path.display())));
        }

        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to delete checkpoint {}", self.path.display()))?;
        }

        Ok(output)
    }

    fn log_save(&self, ok: bool, message: String) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(&CheckpointSavedEvent {
                ts: now_iso(),
                event: "CHECKPOINT_SAVED",
                path: self.path.display().to_string(),
                results: self.results.len(),
                ok,
                message,
            });
        }
    }
}

/// Duplicitní ID v checkpointu: vyhrává poslední výskyt, pořadí podle prvního
fn dedup_by_id(results: Vec<ClubLeagueResult>) -> Vec<ClubLeagueResult> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ClubLeagueResult> = Vec::with_capacity(results.len());
    for r in results {
        match index.get(&r.id) {
            Some(&i) => out[i] = r,
            None => {
                index.insert(r.id.clone(), out.len());
                out.push(r);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use club_crawler::ClubSource;
    use league_classifier::LeagueCode;
    use tempfile::TempDir;

    fn source(i: usize) -> ClubSource {
        ClubSource {
            id: format!("club-{i}"),
            name: format!("VBC {i}"),
            website: format!("https://vbc{i}.example"),
            logo: None,
        }
    }

    fn scraped(src: &ClubSource) -> ClubLeagueResult {
        let mut r = ClubLeagueResult::new(src);
        r.all_leagues.insert(LeagueCode::L2);
        r
    }

    fn checkpoint_len(path: &Path) -> usize {
        read_json::<CheckpointFile>(path).unwrap().results.len()
    }

    #[test]
    fn test_open_without_checkpoint_is_empty() {
        let dir = TempDir::new().unwrap();
        let cp = CheckpointManager::open(dir.path().join("cp.json"), 10).unwrap();
        assert_eq!(cp.resumed(), 0);
        assert!(cp.results().is_empty());
        assert!(!cp.is_processed("club-1"));
    }

    #[test]
    fn test_snapshot_every_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");
        let mut cp = CheckpointManager::open(&path, 10).unwrap();

        for i in 0..9 {
            cp.record(scraped(&source(i))).unwrap();
        }
        assert!(!path.exists());

        for i in 9..25 {
            cp.record(scraped(&source(i))).unwrap();
        }
        // snapshot po 10 a 20, zbylých 5 zatím jen v paměti
        assert_eq!(checkpoint_len(&path), 20);
        assert_eq!(cp.results().len(), 25);
    }

    #[test]
    fn test_resume_skips_processed_clubs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");
        let sources: Vec<ClubSource> = (0..50).map(source).collect();

        // první běh: 40 klubů, pak "pád"
        {
            let mut cp = CheckpointManager::open(&path, 10).unwrap();
            for src in &sources[..40] {
                cp.record(scraped(src)).unwrap();
            }
        }
        assert_eq!(checkpoint_len(&path), 40);

        // druhý běh nad stejným vstupem
        let mut cp = CheckpointManager::open(&path, 10).unwrap();
        assert_eq!(cp.resumed(), 40);
        let mut crawled = Vec::new();
        for src in &sources {
            if cp.is_processed(&src.id) {
                continue;
            }
            crawled.push(src.id.clone());
            cp.record(scraped(src)).unwrap();
        }
        let expected: Vec<String> = (40..50).map(|i| format!("club-{i}")).collect();
        assert_eq!(crawled, expected);

        let output_path = dir.path().join("club_leagues.json");
        let output = cp.finish(&output_path).unwrap();
        assert_eq!(output.results.len(), 50);
        let ids: HashSet<_> = output.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
        assert!(!path.exists());
        assert!(output_path.exists());
    }

    #[test]
    fn test_duplicate_ids_recorded_once() {
        let dir = TempDir::new().unwrap();
        let mut cp = CheckpointManager::open(dir.path().join("cp.json"), 10).unwrap();
        cp.record(scraped(&source(1))).unwrap();
        cp.record(scraped(&source(1))).unwrap();
        assert_eq!(cp.results().len(), 1);
        assert_eq!(cp.completed_this_run(), 1);
    }

    #[test]
    fn test_checkpoint_dedup_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");
        let mut first = scraped(&source(1));
        first.error = Some("old".into());
        let second = scraped(&source(1));
        write_json_atomic(&path, &CheckpointFile { results: vec![first, scraped(&source(2)), second] }).unwrap();

        let cp = CheckpointManager::open(&path, 10).unwrap();
        assert_eq!(cp.results().len(), 2);
        assert_eq!(cp.results()[0].id, "club-1");
        assert!(cp.results()[0].error.is_none());
    }

    #[test]
    fn test_repeated_save_failures_abort() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let mut cp = CheckpointManager::open(blocker.join("cp.json"), 1).unwrap();

        assert!(cp.record(scraped(&source(1))).is_ok());
        assert!(cp.record(scraped(&source(2))).is_ok());
        assert!(cp.record(scraped(&source(3))).is_err());
    }

    #[test]
    fn test_failed_output_keeps_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");
        let mut cp = CheckpointManager::open(&path, 1).unwrap();
        cp.record(scraped(&source(1))).unwrap();
        assert!(path.exists());

        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        assert!(cp.finish(&blocker.join("out.json")).is_err());
        assert!(path.exists());
    }

    #[test]
    fn test_failed_output_saves_unflushed_results() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");
        let mut cp = CheckpointManager::open(&path, 10).unwrap();
        for i in 0..13 {
            cp.record(scraped(&source(i))).unwrap();
        }
        assert_eq!(checkpoint_len(&path), 10);

        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        assert!(cp.finish(&blocker.join("out.json")).is_err());
        assert_eq!(checkpoint_len(&path), 13);

        let resumed = CheckpointManager::open(&path, 10).unwrap();
        assert_eq!(resumed.resumed(), 13);
        assert!(resumed.is_processed("club-12"));
    }
}

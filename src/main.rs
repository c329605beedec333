/// Club Leagues — League Crawler
///
/// Co dělá:
///   1. Načte registr klubů (CLUBS_FILE), zahodí duplicitní ID
///   2. Naváže na checkpoint, pokud předchozí běh nedoběhl
///   3. Sekvenčně projde weby klubů v jednom headless Chrome tabu
///   4. Klasifikuje ligy (ženy / muži / mládež) a ukládá checkpoint po dávkách
///   5. Na konci zapíše OUTPUT_FILE se statistikami a checkpoint smaže
///
/// Spuštění:
///   cargo run --bin league-crawler

use anyhow::{Context, Result};
use checkpoint::CheckpointManager;
use club_crawler::{dedup_sources, load_sources, ChromeSession, ClubCrawler};
use club_leagues::config::RunConfig;
use dotenv::dotenv;
use league_classifier::{LeagueClassifier, LeagueCode};
use logger::{now_iso, send_ntfy_alert, ClubScrapedEvent, EventLogger, RunCompletedEvent};
use std::env;
use std::fs::File;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!("=== Club Leagues — league crawler ===");

    // Single instance lock (dva běhy by si přepisovaly checkpoint)
    let lock_file_path = env::temp_dir().join("club_leagues_crawler.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another instance of league-crawler is already running! Exiting.");
            return Ok(());
        }
    };

    let cfg = RunConfig::from_env();
    info!("Clubs: {}", cfg.clubs_file.display());
    info!("Output: {}", cfg.output_file.display());
    info!("Logs: {}/", cfg.log_dir.display());

    let (mut clubs, duplicates) = dedup_sources(load_sources(&cfg.clubs_file)?);
    if duplicates > 0 {
        warn!("{} duplicate club ids in input, each crawled once", duplicates);
    }
    if let Some(max) = cfg.max_clubs {
        if clubs.len() > max {
            info!("MAX_CLUBS={} → crawling first {} of {} clubs", max, max, clubs.len());
            clubs.truncate(max);
        }
    }

    let events = EventLogger::new(&cfg.log_dir);
    let mut cp = CheckpointManager::open(&cfg.checkpoint_file, cfg.checkpoint_every)?
        .with_logger(EventLogger::new(&cfg.log_dir));

    let pending: Vec<_> = clubs.iter().filter(|c| !cp.is_processed(&c.id)).collect();
    info!(
        "📋 {} clubs total, {} done from checkpoint, {} to crawl",
        clubs.len(),
        clubs.len() - pending.len(),
        pending.len()
    );

    if !pending.is_empty() {
        let session = ChromeSession::launch(cfg.browser.clone())
            .await
            .context("failed to launch browser")?;
        let mut crawler = ClubCrawler::new(session, LeagueClassifier::new()?, cfg.crawl.clone());
        info!("🚀 READY: browser up, crawling.");

        for (i, club) in pending.iter().enumerate() {
            let result = crawler.crawl_club(club).await;
            let n = i + 1;

            match (&result.error, result.has_leagues()) {
                (Some(e), _) => warn!("[{}/{}] ❌ {}: {}", n, pending.len(), club.name, e),
                (None, true) => info!(
                    "[{}/{}] ✅ {}: {} ({} pages)",
                    n,
                    pending.len(),
                    club.name,
                    result.league_strings().join(", "),
                    result.pages_scraped.len()
                ),
                (None, false) => info!(
                    "[{}/{}] ⚪ {}: no leagues found ({} pages)",
                    n,
                    pending.len(),
                    club.name,
                    result.pages_scraped.len()
                ),
            }

            let _ = events.log(&ClubScrapedEvent {
                ts: now_iso(),
                event: "CLUB_SCRAPED",
                club_id: result.id.clone(),
                name: result.name.clone(),
                pages: result.pages_scraped.len(),
                leagues: result.league_strings(),
                error: result.error.clone(),
            });

            cp.record(result)?;

            if n < pending.len() {
                sleep(cfg.inter_club_delay).await;
            }
        }
        // drop = konec Chrome procesu
        drop(crawler);
    }

    let output = cp.finish(&cfg.output_file)?;
    let stats = &output.statistics;

    info!("=== Done ===");
    info!("Clubs: {}", stats.total_scraped);
    info!("With leagues: {}", stats.with_leagues);
    info!("With errors: {}", stats.with_errors);
    for code in LeagueCode::SENIOR {
        info!("  {:>4}: {}", code.as_str(), stats.league_counts.get(&code).copied().unwrap_or(0));
    }
    info!("Output: {}", cfg.output_file.display());

    let _ = events.log(&RunCompletedEvent {
        ts: now_iso(),
        event: "RUN_COMPLETED",
        source: "crawler".to_string(),
        total: stats.total_scraped,
        with_leagues: stats.with_leagues,
        with_errors: stats.with_errors,
        output: cfg.output_file.display().to_string(),
    });

    if let Some(topic) = &cfg.ntfy_topic {
        let msg = format!(
            "{} clubs, {} with leagues, {} errors",
            stats.total_scraped, stats.with_leagues, stats.with_errors
        );
        send_ntfy_alert(topic, &msg, "League crawl finished").await;
    }

    Ok(())
}

/// Club Leagues — Directory Scraper
///
/// Projde stránkovaný adresář federace, u každého klubu rozbalí akordeony
/// nabídky a přečte badge lig. Výstup: JSON list záznamů + souhrn flagů.
///
/// Spuštění:
///   DIRECTORY_URL=... cargo run --bin directory-scraper

use anyhow::{Context, Result};
use checkpoint::write_json_atomic;
use club_crawler::ChromeSession;
use club_leagues::config::DirectoryConfig;
use directory_scraper::{summarize, ChromeDirectoryPage, DirectoryDriver, DirectorySelectors};
use dotenv::dotenv;
use logger::{now_iso, send_ntfy_alert, EventLogger, RunCompletedEvent};
use std::env;
use std::fs::File;
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

    info!("=== Club Leagues — directory scraper ===");

    let lock_file_path = env::temp_dir().join("club_leagues_directory.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("Another instance of directory-scraper is already running! Exiting.");
            return Ok(());
        }
    };

    let cfg = DirectoryConfig::from_env()?;
    info!("Directory: {}", cfg.url);
    info!("Output: {}", cfg.output_file.display());

    let selectors = DirectorySelectors::default();
    let session = ChromeSession::launch(cfg.browser.clone())
        .await
        .context("failed to launch browser")?;
    let mut page = ChromeDirectoryPage::new(session, selectors.clone(), cfg.expand_settle);

    let driver = DirectoryDriver::new(selectors).with_logger(EventLogger::new(&cfg.log_dir));
    let run = driver.run(&mut page, &cfg.url).await?;
    drop(page);

    if run.stopped_early {
        warn!(
            "Pagination stopped at page {}/{}; writing partial result",
            run.pages_visited, run.pages_total
        );
    }
    if run.failed_expands > 0 {
        warn!("{} offering expands failed, those categories have no badges", run.failed_expands);
    }

    write_json_atomic(&cfg.output_file, &run.records)
        .with_context(|| format!("failed to write {}", cfg.output_file.display()))?;

    let summary = summarize(&run.records);
    info!("=== Done ===");
    info!("Clubs: {}", summary.total_clubs);
    info!("With email: {}", summary.with_email);
    info!("With leagues: {}", summary.with_leagues);
    for (flag, count) in &summary.per_flag {
        info!("  {:<18} {}", flag, count);
    }

    let events = EventLogger::new(&cfg.log_dir);
    let _ = events.log(&RunCompletedEvent {
        ts: now_iso(),
        event: "RUN_COMPLETED",
        source: "directory".to_string(),
        total: summary.total_clubs,
        with_leagues: summary.with_leagues,
        with_errors: run.failed_expands,
        output: cfg.output_file.display().to_string(),
    });

    if let Some(topic) = &cfg.ntfy_topic {
        let msg = format!(
            "{} clubs, {} with leagues, {}/{} pages",
            summary.total_clubs, summary.with_leagues, run.pages_visited, run.pages_total
        );
        send_ntfy_alert(topic, &msg, "Directory scrape finished").await;
    }

    Ok(())
}

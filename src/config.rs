/// Club Leagues — Konfigurace z env (+ .env přes dotenv)
///
/// Neplatná hodnota = warning + default, běh kvůli překlepu v .env nepadá.
/// Jedinou povinnou hodnotou je DIRECTORY_URL pro directory-scraper.

use anyhow::{bail, Result};
use club_crawler::{BrowserOptions, CrawlSettings, DEFAULT_NAV_TIMEOUT, DEFAULT_SETTLE};
use club_crawler::browser::DEFAULT_USER_AGENT;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Zdroj proměnných. Produkce čte env, testy podstrčí mapu.
pub trait VarSource {
    fn var(&self, key: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> VarSource for F {
    fn var(&self, key: &str) -> Option<String> {
        self(key)
    }
}

fn non_empty(src: &impl VarSource, key: &str) -> Option<String> {
    src.var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(src: &impl VarSource, key: &str, default: T) -> T {
    match non_empty(src, key) {
        None => default,
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("Invalid {}={:?}, using default", key, raw);
                default
            }
        },
    }
}

fn flag(src: &impl VarSource, key: &str, default: bool) -> bool {
    match non_empty(src, key).map(|v| v.to_ascii_lowercase()) {
        None => default,
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("Invalid {}={:?}, using default", key, v);
                default
            }
        },
    }
}

fn path(src: &impl VarSource, key: &str, default: &str) -> PathBuf {
    PathBuf::from(non_empty(src, key).unwrap_or_else(|| default.to_string()))
}

fn millis(src: &impl VarSource, key: &str, default: Duration) -> Duration {
    Duration::from_millis(parsed(src, key, default.as_millis() as u64))
}

fn browser_options(src: &impl VarSource, nav_timeout: Duration, settle: Duration) -> BrowserOptions {
    BrowserOptions {
        headless: flag(src, "HEADLESS", true),
        user_agent: non_empty(src, "USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        nav_timeout,
        settle,
        min_nav_interval: millis(src, "MIN_NAV_INTERVAL_MS", Duration::from_millis(500)),
    }
}

// ── league-crawler ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub clubs_file: PathBuf,
    pub output_file: PathBuf,
    pub checkpoint_file: PathBuf,
    pub log_dir: PathBuf,
    pub max_clubs: Option<usize>,
    pub checkpoint_every: usize,
    pub inter_club_delay: Duration,
    pub browser: BrowserOptions,
    pub crawl: CrawlSettings,
    pub ntfy_topic: Option<String>,
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self::from_source(&|key: &str| env::var(key).ok())
    }

    pub fn from_source(src: &impl VarSource) -> Self {
        let defaults = CrawlSettings::default();
        let nav_timeout = Duration::from_secs(parsed(src, "NAV_TIMEOUT_SECS", DEFAULT_NAV_TIMEOUT.as_secs()));

        Self {
            clubs_file: path(src, "CLUBS_FILE", "data/clubs.json"),
            output_file: path(src, "OUTPUT_FILE", "data/club_leagues.json"),
            checkpoint_file: path(src, "CHECKPOINT_FILE", "data/club_leagues.checkpoint.json"),
            log_dir: path(src, "LOG_DIR", "logs"),
            max_clubs: non_empty(src, "MAX_CLUBS").and_then(|raw| match raw.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    warn!("Invalid MAX_CLUBS={:?}, crawling all clubs", raw);
                    None
                }
            }),
            checkpoint_every: parsed(src, "CHECKPOINT_EVERY", 10usize).max(1),
            inter_club_delay: millis(src, "INTER_CLUB_DELAY_MS", Duration::from_millis(1500)),
            browser: browser_options(src, nav_timeout, millis(src, "SETTLE_MS", DEFAULT_SETTLE)),
            crawl: CrawlSettings {
                max_candidates: parsed(src, "MAX_CANDIDATES", defaults.max_candidates),
                max_second_level: parsed(src, "MAX_SECOND_LEVEL", defaults.max_second_level),
                second_level_per_page: parsed(src, "SECOND_LEVEL_PER_PAGE", defaults.second_level_per_page),
                ..defaults
            },
            ntfy_topic: non_empty(src, "NTFY_TOPIC"),
        }
    }
}

// ── directory-scraper ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub url: String,
    pub output_file: PathBuf,
    pub log_dir: PathBuf,
    pub expand_settle: Duration,
    pub browser: BrowserOptions,
    pub ntfy_topic: Option<String>,
}

impl DirectoryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&|key: &str| env::var(key).ok())
    }

    pub fn from_source(src: &impl VarSource) -> Result<Self> {
        let Some(url) = non_empty(src, "DIRECTORY_URL") else {
            bail!("DIRECTORY_URL is not set");
        };
        let nav_timeout = Duration::from_secs(parsed(src, "DIRECTORY_NAV_TIMEOUT_SECS", 15u64));

        Ok(Self {
            url,
            output_file: path(src, "DIRECTORY_OUTPUT_FILE", "data/directory_clubs.json"),
            log_dir: path(src, "LOG_DIR", "logs"),
            expand_settle: millis(src, "EXPAND_SETTLE_MS", Duration::from_millis(600)),
            browser: browser_options(src, nav_timeout, millis(src, "DIRECTORY_SETTLE_MS", Duration::from_millis(2500))),
            ntfy_topic: non_empty(src, "NTFY_TOPIC"),
        })
    }
}

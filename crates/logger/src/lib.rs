/// Club Leagues — Logger
/// JSONL event stream, NTFY run alerts

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ClubScrapedEvent {
    pub ts:        String,
    pub event:     &'static str,   // "CLUB_SCRAPED"
    pub club_id:   String,
    pub name:      String,
    pub pages:     usize,
    pub leagues:   Vec<String>,    // allLeagues jako kódy
    pub error:     Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CheckpointSavedEvent {
    pub ts:        String,
    pub event:     &'static str,   // "CHECKPOINT_SAVED"
    pub path:      String,
    pub results:   usize,
    pub ok:        bool,
    pub message:   String,
}

#[derive(Serialize, Debug)]
pub struct RunCompletedEvent {
    pub ts:            String,
    pub event:         &'static str,   // "RUN_COMPLETED"
    pub source:        String,         // "crawler" | "directory"
    pub total:         usize,
    pub with_leagues:  usize,
    pub with_errors:   usize,
    pub output:        String,
}

#[derive(Serialize, Debug)]
pub struct DirectoryPageEvent {
    pub ts:        String,
    pub event:     &'static str,   // "DIRECTORY_PAGE"
    pub page:      usize,
    pub of_pages:  usize,
    pub clubs:     usize,
    pub failed_expands: usize,
}

/// Pošli čitelný push alert na ntfy topic
pub async fn send_ntfy_alert(topic: &str, msg: &str, title: &str) {
    let client = reqwest::Client::new();
    match client
        .post(format!("https://ntfy.sh/{topic}"))
        .header("Title", title)
        .header("Tags", "volleyball")
        .body(msg.to_string())
        .send()
        .await
    {
        Ok(_)  => tracing::info!("NTFY sent: {}", title),
        Err(e) => tracing::warn!("NTFY failed: {}", e),
    }
}

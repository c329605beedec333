use anyhow::Result;
use checkpoint::{compute_statistics, read_json, CheckpointFile, RunOutput};
use league_classifier::LeagueCode;
use std::path::Path;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cp_path = std::env::var("CHECKPOINT_FILE")
        .unwrap_or_else(|_| "data/club_leagues.checkpoint.json".to_string());
    let out_path = std::env::var("OUTPUT_FILE").unwrap_or_else(|_| "data/club_leagues.json".to_string());

    println!("checkpoint_path={cp_path}");
    if Path::new(&cp_path).exists() {
        let file: CheckpointFile = read_json(Path::new(&cp_path))?;
        let stats = compute_statistics(&file.results);
        println!(
            "checkpoint: results={} with_leagues={} with_errors={} (run not finished)",
            stats.total_scraped, stats.with_leagues, stats.with_errors
        );
        if let Some(last) = file.results.last() {
            println!("last_club: id={} name={}", last.id, last.name);
        }
    } else {
        println!("checkpoint: <none>");
    }

    println!("output_path={out_path}");
    if Path::new(&out_path).exists() {
        let output: RunOutput = read_json(Path::new(&out_path))?;
        let s = &output.statistics;
        println!(
            "output: scraped_at={} total={} with_leagues={} with_errors={}",
            output.scraped_at.to_rfc3339(),
            s.total_scraped,
            s.with_leagues,
            s.with_errors
        );
        for code in LeagueCode::SENIOR {
            println!("  {}: {}", code, s.league_counts.get(&code).copied().unwrap_or(0));
        }
    } else {
        println!("output: <none>");
    }

    Ok(())
}

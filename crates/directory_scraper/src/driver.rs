//! Directory UI driver — stránkování + rozbalování akordeonů.
//!
//! Selhání jednoho expand = chybí ligy jedné kategorie jednoho klubu.
//! Selhání stránkování = předčasný konec s částečným (validním) výsledkem.
//! Jen načtení první stránky je fatální.

use anyhow::{Context, Result};
use async_trait::async_trait;
use logger::{now_iso, DirectoryPageEvent, EventLogger};
use tracing::{debug, info, warn};

use crate::parse::{parse_badges, parse_card, parse_offering_labels, parse_page_count, DirectorySelectors};
use crate::{DirectoryClubRecord, OfferingCategory};

/// Interaktivní stránka adresáře. Karty a akordeony se adresují indexem
/// v pořadí DOM na aktuální stránce výsledků.
#[async_trait]
pub trait DirectoryPage: Send {
    async fn open(&mut self, url: &str) -> Result<()>;
    async fn page_html(&mut self) -> Result<String>;
    async fn wait_for_cards(&mut self) -> Result<()>;
    /// Outer HTML všech karet na aktuální stránce
    async fn cards(&mut self) -> Result<Vec<String>>;
    /// Rozbalí akordeon a vrátí HTML odhaleného obsahu (po settle delay)
    async fn expand_offering(&mut self, card: usize, offering: usize) -> Result<String>;
    async fn collapse_offering(&mut self, card: usize, offering: usize) -> Result<()>;
    /// Přímý odkaz na stránku `page`; Ok(false) když odkaz neexistuje
    async fn goto_page(&mut self, page: usize) -> Result<bool>;
    /// Obecné "další"; Ok(false) když neexistuje
    async fn next_page(&mut self) -> Result<bool>;
}

/// Výsledek běhu adresáře
#[derive(Debug, Clone, Default)]
pub struct DirectoryRun {
    pub records: Vec<DirectoryClubRecord>,
    pub pages_total: usize,
    pub pages_visited: usize,
    pub failed_expands: usize,
    /// true = stránkování skončilo dřív než na poslední stránce
    pub stopped_early: bool,
}

pub struct DirectoryDriver {
    selectors: DirectorySelectors,
    logger: Option<EventLogger>,
}

impl DirectoryDriver {
    pub fn new(selectors: DirectorySelectors) -> Self {
        Self { selectors, logger: None }
    }

    pub fn with_logger(mut self, logger: EventLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub async fn run<P: DirectoryPage>(&self, page: &mut P, url: &str) -> Result<DirectoryRun> {
        page.open(url).await.with_context(|| format!("failed to load directory {url}"))?;
        let html = page.page_html().await.context("failed to read directory listing")?;

        let mut run = DirectoryRun {
            pages_total: parse_page_count(&html, &self.selectors),
            ..Default::default()
        };
        info!("📒 Directory: {} result pages", run.pages_total);

        let mut current = 1usize;
        loop {
            let before = run.records.len();
            let failed_before = run.failed_expands;
            self.scrape_current_page(page, &mut run).await;
            run.pages_visited += 1;

            let clubs = run.records.len() - before;
            info!("Page {}/{}: {} clubs", current, run.pages_total, clubs);
            if let Some(logger) = &self.logger {
                let _ = logger.log(&DirectoryPageEvent {
                    ts: now_iso(),
                    event: "DIRECTORY_PAGE",
                    page: current,
                    of_pages: run.pages_total,
                    clubs,
                    failed_expands: run.failed_expands - failed_before,
                });
            }

            if current >= run.pages_total {
                break;
            }

            let next = current + 1;
            if !self.advance(page, next).await {
                warn!("Pagination stopped at page {} of {}", current, run.pages_total);
                run.stopped_early = true;
                break;
            }
            current = next;
        }

        Ok(run)
    }

    async fn scrape_current_page<P: DirectoryPage>(&self, page: &mut P, run: &mut DirectoryRun) {
        if let Err(e) = page.wait_for_cards().await {
            warn!("Club cards did not render: {:#}", e);
        }

        let cards = match page.cards().await {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Failed to read club cards: {:#}", e);
                return;
            }
        };

        for (card_idx, card_html) in cards.iter().enumerate() {
            let mut record = parse_card(card_html, &self.selectors);
            let labels = parse_offering_labels(card_html, &self.selectors);

            for (offering_idx, label) in labels.iter().enumerate() {
                // Kontext kategorie se čte z nadpisu ještě před kliknutím
                let Some(category) = OfferingCategory::from_label(label) else {
                    debug!("{}: unknown offering {:?}", record.name, label);
                    continue;
                };
                record.offerings.entry(category).or_default();

                match page.expand_offering(card_idx, offering_idx).await {
                    Ok(revealed) => {
                        let badges = parse_badges(&revealed);
                        debug!("{} / {}: {:?}", record.name, category, badges);
                        record.offerings.entry(category).or_default().extend(badges);
                    }
                    Err(e) => {
                        warn!("{}: expand {:?} failed: {:#}", record.name, label, e);
                        run.failed_expands += 1;
                        continue;
                    }
                }

                if let Err(e) = page.collapse_offering(card_idx, offering_idx).await {
                    debug!("{}: collapse failed: {:#}", record.name, e);
                }
            }

            run.records.push(record);
        }
    }

    async fn advance<P: DirectoryPage>(&self, page: &mut P, next: usize) -> bool {
        match page.goto_page(next).await {
            Ok(true) => return true,
            Ok(false) => debug!("No direct link to page {}, trying next control", next),
            Err(e) => debug!("Direct link to page {} failed: {:#}", next, e),
        }
        match page.next_page().await {
            Ok(advanced) => advanced,
            Err(e) => {
                warn!("Next control failed: {:#}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Badge;
    use anyhow::anyhow;
    use league_classifier::LeagueCode;
    use std::collections::HashMap;

    /// Fake adresář: stránky karet + odhalený obsah per (stránka, karta, akordeon)
    struct FakeDirectory {
        listing: String,
        pages: Vec<Vec<String>>,
        revealed: HashMap<(usize, usize, usize), String>,
        current: usize,
        direct_links: bool,
        next_control: bool,
        fail_open: bool,
        expands: usize,
        collapses: usize,
    }

    impl FakeDirectory {
        fn new(pages: Vec<Vec<String>>) -> Self {
            let links: String = (1..=pages.len())
                .map(|n| format!(r#"<a class="page-link">{n}</a>"#))
                .collect();
            Self {
                listing: format!(r#"<nav class="pagination">{links}</nav>"#),
                pages,
                revealed: HashMap::new(),
                current: 0,
                direct_links: true,
                next_control: true,
                fail_open: false,
                expands: 0,
                collapses: 0,
            }
        }
    }

    #[async_trait]
    impl DirectoryPage for FakeDirectory {
        async fn open(&mut self, _url: &str) -> Result<()> {
            if self.fail_open {
                return Err(anyhow!("navigation timed out"));
            }
            Ok(())
        }
        async fn page_html(&mut self) -> Result<String> {
            Ok(self.listing.clone())
        }
        async fn wait_for_cards(&mut self) -> Result<()> {
            Ok(())
        }
        async fn cards(&mut self) -> Result<Vec<String>> {
            Ok(self.pages[self.current].clone())
        }
        async fn expand_offering(&mut self, card: usize, offering: usize) -> Result<String> {
            self.expands += 1;
            self.revealed
                .get(&(self.current, card, offering))
                .cloned()
                .ok_or_else(|| anyhow!("click intercepted"))
        }
        async fn collapse_offering(&mut self, _card: usize, _offering: usize) -> Result<()> {
            self.collapses += 1;
            Ok(())
        }
        async fn goto_page(&mut self, page: usize) -> Result<bool> {
            if self.direct_links && page <= self.pages.len() {
                self.current = page - 1;
                return Ok(true);
            }
            Ok(false)
        }
        async fn next_page(&mut self) -> Result<bool> {
            if self.next_control && self.current + 1 < self.pages.len() {
                self.current += 1;
                return Ok(true);
            }
            Ok(false)
        }
    }

    fn card(name: &str, labels: &[&str]) -> String {
        let offerings: String = labels
            .iter()
            .map(|l| format!(r#"<div class="club-offering"><button class="club-offering__header">{l}</button></div>"#))
            .collect();
        format!(r#"<div class="club-card"><h3 class="club-card__name">{name}</h3>{offerings}</div>"#)
    }

    fn badges_html(badges: &[&str]) -> String {
        let items: String = badges.iter().map(|b| format!("<li><span>{b}</span></li>")).collect();
        format!("<div class=\"club-offering\"><ul>{items}</ul></div>")
    }

    fn driver() -> DirectoryDriver {
        DirectoryDriver::new(DirectorySelectors::default())
    }

    #[tokio::test]
    async fn test_women_offering_sets_exact_badges() {
        let mut dir = FakeDirectory::new(vec![vec![card("VBC Frauenfeld", &["Volleyball Frauen (NLA – 5L)"])]]);
        dir.revealed.insert((0, 0, 0), badges_html(&["NLB", "1L", "2L", "3L", "4L"]));

        let run = driver().run(&mut dir, "https://directory.example").await.unwrap();
        assert_eq!(run.records.len(), 1);
        let r = &run.records[0];
        let w = OfferingCategory::Women;
        assert!(r.flag(w, Badge::League(LeagueCode::Nlb)));
        for code in [LeagueCode::L1, LeagueCode::L2, LeagueCode::L3, LeagueCode::L4] {
            assert!(r.flag(w, Badge::League(code)));
        }
        assert!(!r.flag(w, Badge::League(LeagueCode::Nla)));
        assert!(!r.flag(w, Badge::League(LeagueCode::L5)));
        assert!(!r.offers(OfferingCategory::Men));
        assert_eq!(dir.collapses, 1);
    }

    #[tokio::test]
    async fn test_failed_expand_only_skips_that_category() {
        let mut dir = FakeDirectory::new(vec![vec![
            card("VBC A", &["Volleyball Männer (NLA – 5L)", "Volleyball Frauen (NLA – 5L)"]),
            card("VBC B", &["Junioren (U13 – U23)"]),
        ]]);
        // (0,0,0) chybí → expand selže
        dir.revealed.insert((0, 0, 1), badges_html(&["3L"]));
        dir.revealed.insert((0, 1, 0), badges_html(&["U17", "U19"]));

        let run = driver().run(&mut dir, "https://directory.example").await.unwrap();
        assert_eq!(run.failed_expands, 1);
        assert_eq!(run.records.len(), 2);

        let a = &run.records[0];
        assert!(a.offers(OfferingCategory::Men));
        assert!(a.offerings[&OfferingCategory::Men].is_empty());
        assert!(a.flag(OfferingCategory::Women, Badge::League(LeagueCode::L3)));

        let b = &run.records[1];
        assert!(b.flag(OfferingCategory::BoysYouth, Badge::League(LeagueCode::U17)));
        assert!(b.flag(OfferingCategory::BoysYouth, Badge::League(LeagueCode::U19)));
    }

    #[tokio::test]
    async fn test_paginates_all_pages() {
        let mut dir = FakeDirectory::new(vec![
            vec![card("A", &[]), card("B", &[])],
            vec![card("C", &[])],
            vec![card("D", &[])],
        ]);
        let run = driver().run(&mut dir, "https://directory.example").await.unwrap();
        let names: Vec<_> = run.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(run.pages_total, 3);
        assert_eq!(run.pages_visited, 3);
        assert!(!run.stopped_early);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_control() {
        let mut dir = FakeDirectory::new(vec![vec![card("A", &[])], vec![card("B", &[])]]);
        dir.direct_links = false;
        let run = driver().run(&mut dir, "https://directory.example").await.unwrap();
        assert_eq!(run.records.len(), 2);
        assert!(!run.stopped_early);
    }

    #[tokio::test]
    async fn test_pagination_failure_returns_partial() {
        let mut dir = FakeDirectory::new(vec![vec![card("A", &[])], vec![card("B", &[])]]);
        dir.direct_links = false;
        dir.next_control = false;
        let run = driver().run(&mut dir, "https://directory.example").await.unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].name, "A");
        assert!(run.stopped_early);
    }

    #[tokio::test]
    async fn test_logs_one_event_per_page() {
        let logs = tempfile::TempDir::new().unwrap();
        let mut dir = FakeDirectory::new(vec![vec![card("A", &["Beachvolleyball"])], vec![card("B", &[])]]);
        let driver = driver().with_logger(EventLogger::new(logs.path()));
        driver.run(&mut dir, "https://directory.example").await.unwrap();

        let file = std::fs::read_dir(logs.path()).unwrap().next().unwrap().unwrap().path();
        let raw = std::fs::read_to_string(file).unwrap();
        let events: Vec<serde_json::Value> = raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "DIRECTORY_PAGE");
        assert_eq!(events[0]["page"], 1);
        assert_eq!(events[0]["failed_expands"], 1);
        assert_eq!(events[1]["of_pages"], 2);
    }

    #[tokio::test]
    async fn test_initial_load_failure_is_fatal() {
        let mut dir = FakeDirectory::new(vec![vec![card("A", &[])]]);
        dir.fail_open = true;
        assert!(driver().run(&mut dir, "https://directory.example").await.is_err());
        assert_eq!(dir.expands, 0);
    }
}

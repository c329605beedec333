//! Crawl orchestrator — jeden klub dovnitř, jeden `ClubLeagueResult` ven.
//! Nikdy nevrací chybu: selhání homepage = `error` + prázdné ligy.

use league_classifier::LeagueClassifier;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

use crate::browser::PageLoader;
use crate::extract::{extract_text, text_sample};
use crate::links::{discover_links, page_key};
use crate::{ClubLeagueResult, ClubSource, CrawlSettings};

pub struct ClubCrawler<L: PageLoader> {
    loader: L,
    classifier: LeagueClassifier,
    settings: CrawlSettings,
}

impl<L: PageLoader> ClubCrawler<L> {
    pub fn new(loader: L, classifier: LeagueClassifier, settings: CrawlSettings) -> Self {
        Self { loader, classifier, settings }
    }

    /// Vrátí loader (např. pro explicitní ukončení browseru)
    pub fn into_loader(self) -> L {
        self.loader
    }

    pub async fn crawl_club(&mut self, source: &ClubSource) -> ClubLeagueResult {
        let mut result = ClubLeagueResult::new(source);

        let home_url = match normalize_website(&source.website) {
            Some(url) => url,
            None => {
                result.error = Some(format!("invalid or missing website: {:?}", source.website));
                return result;
            }
        };

        let home = match self.loader.load(home_url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                result.error = Some(format!("homepage failed: {e:#}"));
                return result;
            }
        };

        // Redirect (www, https) → origin bereme z finální URL
        let site = Url::parse(&home.url).unwrap_or_else(|_| home_url.clone());

        let mut known: HashSet<String> = HashSet::new();
        known.insert(page_key(&home_url));
        known.insert(page_key(&site));

        let mut texts = vec![extract_text(&home.html)];
        result.pages_scraped.push(home.url.clone());

        let candidates = discover_links(&home.html, &site, &site, &known, self.settings.max_candidates);
        known.extend(candidates.iter().map(page_key));
        debug!("{}: {} candidate pages", source.name, candidates.len());

        // ── první úroveň + sběr druhé úrovně ──
        let mut second_level: Vec<Url> = Vec::new();
        for url in &candidates {
            let Some(page) = self.load_optional(url).await else { continue };
            texts.push(extract_text(&page.html));
            result.pages_scraped.push(page.url.clone());

            let room = self.settings.max_second_level.saturating_sub(second_level.len());
            if room == 0 {
                continue;
            }
            let page_url = Url::parse(&page.url).unwrap_or_else(|_| url.clone());
            let per_page = self.settings.second_level_per_page.min(room);
            let found = discover_links(&page.html, &page_url, &site, &known, per_page);
            known.extend(found.iter().map(page_key));
            second_level.extend(found);
        }

        // ── druhá úroveň, už bez dalšího hledání ──
        for url in &second_level {
            let Some(page) = self.load_optional(url).await else { continue };
            texts.push(extract_text(&page.html));
            result.pages_scraped.push(page.url.clone());
        }

        let text = texts.join("\n");
        result.apply(self.classifier.classify(&text));
        result.text_sample = text_sample(&text, self.settings.text_sample_chars);
        result
    }

    /// Podstránka: chyba se jen zaloguje a stránka se přeskočí
    async fn load_optional(&mut self, url: &Url) -> Option<crate::LoadedPage> {
        match self.loader.load(url.as_str()).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!("subpage skipped {}: {:#}", url, e);
                None
            }
        }
    }
}

/// Web z registru bývá bez schématu ("www.vbc.ch") nebo s mezerami
pub fn normalize_website(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

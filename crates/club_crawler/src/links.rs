//! Link discovery — hledá podstránky s týmy / ligami / kádry.
//!
//! Kandidát je odkaz, jehož href nebo text obsahuje klíčové slovo (DE/FR/IT/EN),
//! nebo jakýkoli odkaz uvnitř navigace / menu / headeru.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

pub const TEAM_KEYWORDS: &[&str] = &[
    // DE
    "team", "mannschaft", "liga", "meisterschaft", "spielbetrieb", "kader",
    "damen", "herren", "junioren", "juniorinnen", "nachwuchs", "jugend",
    "spielplan", "resultate", "tabelle",
    // FR
    "equipe", "équipe", "ligue", "championnat", "effectif", "seniors",
    "jeunesse", "relève", "releve", "dames", "hommes", "juniors",
    // IT
    "squadra", "squadre", "campionato", "giovanili", "donne", "uomini",
    "settore",
    // EN
    "roster", "league", "squad", "championship", "women", "youth",
];

const NAV_REGIONS: &str = "nav a[href], header a[href], [role=navigation] a[href], \
    [class*=menu] a[href], [id*=menu] a[href], [class*=nav] a[href]";

const SKIPPED_PREFIXES: [&str; 4] = ["mailto:", "tel:", "javascript:", "#"];

const SKIPPED_EXTENSIONS: [&str; 14] = [
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".zip",
    ".doc", ".docx", ".xls", ".xlsx", ".mp4", ".ics",
];

/// Kandidátní podstránky ze stránky `page_url`, jen v rámci webu `site`.
/// URL už obsažené v `known` se přeskakují; výsledek je deduplikovaný a oříznutý na `limit`.
pub fn discover_links(
    html: &str,
    page_url: &Url,
    site: &Url,
    known: &HashSet<String>,
    limit: usize,
) -> Vec<Url> {
    if limit == 0 {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else { return Vec::new() };
    let nav_ids: HashSet<_> = match Selector::parse(NAV_REGIONS) {
        Ok(sel) => document.select(&sel).map(|e| e.id()).collect(),
        Err(_) => HashSet::new(),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else { continue };
        let href = href.trim();
        let lower_href = href.to_lowercase();

        if href.is_empty() || SKIPPED_PREFIXES.iter().any(|p| lower_href.starts_with(p)) {
            continue;
        }

        let in_nav = nav_ids.contains(&anchor.id());
        if !in_nav {
            let text = anchor.text().collect::<String>().to_lowercase();
            let hit = TEAM_KEYWORDS
                .iter()
                .any(|k| lower_href.contains(k) || text.contains(k));
            if !hit {
                continue;
            }
        }

        let Ok(mut url) = page_url.join(href) else { continue };
        url.set_fragment(None);

        if !matches!(url.scheme(), "http" | "https") || !same_site(&url, site) {
            continue;
        }

        let path = url.path().to_lowercase();
        if SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            continue;
        }

        let key = page_key(&url);
        if known.contains(&key) || !seen.insert(key) {
            continue;
        }

        out.push(url);
        if out.len() >= limit {
            break;
        }
    }

    out
}

/// Stejný web: host bez "www." a explicitní port. http vs https se nerozlišuje
/// (kluby často redirectují jen jedním směrem).
pub fn same_site(a: &Url, b: &Url) -> bool {
    fn bare(u: &Url) -> Option<String> {
        u.host_str()
            .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    }
    match (bare(a), bare(b)) {
        (Some(ha), Some(hb)) => ha == hb && a.port() == b.port(),
        _ => false,
    }
}

/// Klíč pro deduplikaci: bez fragmentu, bez koncového lomítka, bez schématu
pub fn page_key(url: &Url) -> String {
    let host = url
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
        .unwrap_or_default();
    let path = url.path().trim_end_matches('/');
    match url.query() {
        Some(q) => format!("{host}{path}?{q}"),
        None => format!("{host}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_keyword_and_nav_links() {
        let html = r#"<html><body>
            <nav><a href="/kontakt">Kontakt</a><a href="/verein">Verein</a></nav>
            <main>
              <a href="/teams/damen-1">Damen 1</a>
              <a href="/news/2024">News</a>
              <a href="equipes.html">Nos équipes</a>
              <a href="https://other.example/liga">Liga extern</a>
              <a href="mailto:info@club.example">Mail</a>
              <a href="/spielplan.pdf">Spielplan</a>
              <a href="/teams/damen-1#top">Damen 1 again</a>
            </main></body></html>"#;
        let home = url("https://www.club.example/");
        let links = discover_links(html, &home, &home, &HashSet::new(), 15);
        let paths: Vec<_> = links.iter().map(|u| u.path().to_string()).collect();
        assert_eq!(paths, vec!["/kontakt", "/verein", "/teams/damen-1", "/equipes.html"]);
    }

    #[test]
    fn test_limit_and_known_urls() {
        let html = r#"<body>
            <a href="/team1">Team 1</a><a href="/team2">Team 2</a>
            <a href="/team3">Team 3</a><a href="/team4">Team 4</a></body>"#;
        let home = url("https://club.example/");
        let mut known = HashSet::new();
        known.insert(page_key(&url("https://club.example/team1/")));

        let links = discover_links(html, &home, &home, &known, 2);
        let paths: Vec<_> = links.iter().map(|u| u.path().to_string()).collect();
        assert_eq!(paths, vec!["/team2", "/team3"]);
    }

    #[test]
    fn test_relative_resolution_from_subpage() {
        let html = r#"<body><a href="../liga/tabelle">Tabelle</a></body>"#;
        let page = url("https://club.example/teams/herren/");
        let site = url("https://club.example/");
        let links = discover_links(html, &page, &site, &HashSet::new(), 5);
        assert_eq!(links[0].as_str(), "https://club.example/teams/liga/tabelle");
    }

    #[test]
    fn test_same_site_ignores_www_and_scheme() {
        assert!(same_site(&url("https://www.vbc.example/a"), &url("http://vbc.example/")));
        assert!(!same_site(&url("https://vbc.example/a"), &url("https://other.example/")));
        assert!(!same_site(&url("https://vbc.example:8443/a"), &url("https://vbc.example/")));
    }
}

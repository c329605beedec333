//! Čisté parsování markupu adresáře (karta klubu, akordeony, badge, stránkování).
//! Browser dodá HTML, tady se jen čte.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::{Badge, DirectoryClubRecord};
use league_classifier::LeagueCode;

/// Striktní slovník badge: NLA, NLB, <n>L, U<nn>, Senioren
static BADGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(NLA|NLB)|([1-9])L|U(\d{2})|(Senioren))$").expect("valid badge regex")
});

/// CSS selektory adresáře. Markup adresáře se mění, proto jsou na jednom místě.
#[derive(Debug, Clone)]
pub struct DirectorySelectors {
    pub card: String,
    pub name: String,
    pub city: String,
    pub email: String,
    pub offering: String,
    pub offering_header: String,
    pub page_link: String,
    pub next: String,
}

impl Default for DirectorySelectors {
    fn default() -> Self {
        Self {
            card: ".club-card".into(),
            name: ".club-card__name".into(),
            city: ".club-card__city".into(),
            email: "a[href^='mailto:']".into(),
            offering: ".club-offering".into(),
            offering_header: ".club-offering__header".into(),
            page_link: ".pagination a.page-link".into(),
            next: ".pagination a[rel=next], .pagination .next a, button[aria-label='Next page']".into(),
        }
    }
}

fn sel(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn clean_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(root: ElementRef<'_>, css: &str) -> Option<String> {
    let s = sel(css)?;
    root.select(&s)
        .next()
        .map(clean_text)
        .filter(|t| !t.is_empty())
}

/// Počet stránek = největší číslo v odkazech stránkování, jinak 1
pub fn parse_page_count(html: &str, selectors: &DirectorySelectors) -> usize {
    let document = Html::parse_document(html);
    let Some(s) = sel(&selectors.page_link) else { return 1 };
    document
        .select(&s)
        .filter_map(|e| clean_text(e).parse::<usize>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Jméno / město / e-mail z pevných uzlů karty
pub fn parse_card(card_html: &str, selectors: &DirectorySelectors) -> DirectoryClubRecord {
    let fragment = Html::parse_fragment(card_html);
    let root = fragment.root_element();

    let email = sel(&selectors.email).and_then(|s| {
        root.select(&s).next().and_then(|e| {
            e.value()
                .attr("href")
                .map(|h| h.trim_start_matches("mailto:").trim().to_string())
                .filter(|h| !h.is_empty())
                .or_else(|| Some(clean_text(e)).filter(|t| !t.is_empty()))
        })
    });

    DirectoryClubRecord {
        name: first_text(root, &selectors.name).unwrap_or_default(),
        city: first_text(root, &selectors.city),
        email,
        ..Default::default()
    }
}

/// Nadpisy všech akordeonů v kartě, ve stejném pořadí jako v DOM
pub fn parse_offering_labels(card_html: &str, selectors: &DirectorySelectors) -> Vec<String> {
    let fragment = Html::parse_fragment(card_html);
    let root = fragment.root_element();
    let (Some(offering), Some(header)) = (sel(&selectors.offering), sel(&selectors.offering_header)) else {
        return Vec::new();
    };

    root.select(&offering)
        .map(|o| o.select(&header).next().map(clean_text).unwrap_or_default())
        .collect()
}

/// Badge z odhaleného obsahu: jen listové elementy, jejichž text přesně sedí na slovník
pub fn parse_badges(revealed_html: &str) -> Vec<Badge> {
    let fragment = Html::parse_fragment(revealed_html);
    let mut out: Vec<Badge> = Vec::new();

    for node in fragment.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else { continue };
        if el.children().any(|c| c.value().is_element()) {
            continue;
        }
        if let Some(badge) = parse_badge(&clean_text(el)) {
            if !out.contains(&badge) {
                out.push(badge);
            }
        }
    }

    out
}

pub fn parse_badge(text: &str) -> Option<Badge> {
    let caps = BADGE_RE.captures(text.trim())?;
    if let Some(m) = caps.get(1) {
        return m.as_str().parse().ok().map(Badge::League);
    }
    if let Some(m) = caps.get(2) {
        return LeagueCode::from_tier(m.as_str().parse().ok()?).map(Badge::League);
    }
    if let Some(m) = caps.get(3) {
        return LeagueCode::from_age(m.as_str().parse().ok()?).map(Badge::League);
    }
    caps.get(4).map(|_| Badge::Seniors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
        <div class="club-card">
          <h3 class="club-card__name"> VBC  Musterstadt </h3>
          <span class="club-card__city">Bern</span>
          <a href="mailto:info@vbc-muster.ch">Kontakt</a>
          <div class="club-offering">
            <button class="club-offering__header">Volleyball Frauen (NLA – 5L)</button>
          </div>
          <div class="club-offering">
            <button class="club-offering__header">Juniorinnen (U13 – U23)</button>
          </div>
        </div>"#;

    #[test]
    fn test_parse_card_fields() {
        let record = parse_card(CARD, &DirectorySelectors::default());
        assert_eq!(record.name, "VBC Musterstadt");
        assert_eq!(record.city.as_deref(), Some("Bern"));
        assert_eq!(record.email.as_deref(), Some("info@vbc-muster.ch"));
        assert!(record.offerings.is_empty());
    }

    #[test]
    fn test_parse_card_missing_nodes() {
        let record = parse_card("<div class='club-card'></div>", &DirectorySelectors::default());
        assert_eq!(record.name, "");
        assert!(record.city.is_none());
        assert!(record.email.is_none());
    }

    #[test]
    fn test_offering_labels_in_order() {
        let labels = parse_offering_labels(CARD, &DirectorySelectors::default());
        assert_eq!(labels, vec!["Volleyball Frauen (NLA – 5L)", "Juniorinnen (U13 – U23)"]);
    }

    #[test]
    fn test_badges_only_from_strict_leaf_text() {
        let revealed = r#"
          <div class="club-offering">
            <button class="club-offering__header">Volleyball Frauen (NLA – 5L)</button>
            <ul>
              <li><span class="badge">NLB</span></li>
              <li><span class="badge">1L</span></li>
              <li><span class="badge"> 2L </span></li>
              <li>Training in 3L Halle</li>
              <li><span>U17</span><span>U12</span><span>Senioren</span><span>NLB</span></li>
            </ul>
          </div>"#;
        let badges = parse_badges(revealed);
        assert_eq!(
            badges,
            vec![
                Badge::League(LeagueCode::Nlb),
                Badge::League(LeagueCode::L1),
                Badge::League(LeagueCode::L2),
                Badge::League(LeagueCode::U17),
                Badge::Seniors,
            ]
        );
    }

    #[test]
    fn test_parse_badge_vocabulary() {
        assert_eq!(parse_badge("NLA"), Some(Badge::League(LeagueCode::Nla)));
        assert_eq!(parse_badge("5L"), Some(Badge::League(LeagueCode::L5)));
        assert_eq!(parse_badge("U23"), Some(Badge::League(LeagueCode::U23)));
        assert_eq!(parse_badge("Senioren"), Some(Badge::Seniors));
        assert_eq!(parse_badge("6L"), None);
        assert_eq!(parse_badge("U9"), None);
        assert_eq!(parse_badge("nla"), None);
        assert_eq!(parse_badge("NLA – 5L"), None);
    }

    #[test]
    fn test_page_count() {
        let s = DirectorySelectors::default();
        let html = r#"<nav class="pagination">
            <a class="page-link">1</a><a class="page-link">2</a><a class="page-link">17</a>
            <a class="page-link">»</a></nav>"#;
        assert_eq!(parse_page_count(html, &s), 17);
        assert_eq!(parse_page_count("<div>no pagination</div>", &s), 1);
    }
}

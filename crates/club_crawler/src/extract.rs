//! Text extractor — z HTML načtené stránky udělá jeden plochý string.
//!
//! Nikdy nepadá: chybějící regiony přispějí prázdným stringem.

use scraper::{ElementRef, Html, Node, Selector};
use unicode_normalization::UnicodeNormalization;

const SKIPPED: [&str; 5] = ["script", "style", "noscript", "template", "svg"];

const BLOCKS: [&str; 28] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "li", "main", "nav", "ol", "p", "section",
    "tr", "ul",
];

/// Regiony, které se přidávají navíc k celému body (duplicita nevadí, klasifikátor dělá set)
const REGIONS: [&str; 4] = [
    "table",
    "ul, ol, dl",
    "h1, h2, h3, h4, h5, h6",
    "[class*=team], [class*=Team], [class*=league], [class*=liga], [class*=ligue], \
     [class*=card], [class*=mannschaft], [class*=equipe], [class*=squadra]",
];

pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<String> = Vec::new();

    if let Some(body) = selector("body") {
        parts.extend(document.select(&body).map(inner_text));
    }

    for css in REGIONS {
        if let Some(sel) = selector(css) {
            parts.extend(document.select(&sel).map(inner_text));
        }
    }

    if let Some(sel) = selector("img[alt]") {
        parts.extend(
            document
                .select(&sel)
                .filter_map(|e| e.value().attr("alt"))
                .map(str::to_string),
        );
    }

    if let Some(sel) = selector("[title]") {
        parts.extend(
            document
                .select(&sel)
                .filter_map(|e| e.value().attr("title"))
                .map(str::to_string),
        );
    }

    normalize(&parts.join("\n"))
}

/// Prvních `max_chars` znaků (char-safe)
pub fn text_sample(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Aproximace innerText: blokové elementy lámou řádky, buňky tabulky oddělí tab
fn inner_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    render(el, &mut out);
    out
}

fn render(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                let name = e.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else { continue };
                match name {
                    "br" => out.push('\n'),
                    "td" | "th" => {
                        render(child_el, out);
                        out.push('\t');
                    }
                    n if BLOCKS.contains(&n) || n == "table" => {
                        out.push('\n');
                        render(child_el, out);
                        out.push('\n');
                    }
                    _ => render(child_el, out),
                }
            }
            _ => {}
        }
    }
}

/// Sjednotí whitespace po řádcích, zahodí prázdné řádky, NFC
fn normalize(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect();

    lines.join("\n").nfc().collect()
}

//! Statický ruleset: DE / FR / IT (+ EN) zápisy lig → kanonický kód.
//! Všechny patterny se kompilují case-insensitive.

use crate::LeagueCode;

/// Ženský kontext na řádku
pub const WOMEN_CONTEXT: &str = r"\b(?:damen\w*|frauen\w*|juniorinnen|m(?:ä|ae)dchen|women|womens|ladies|girls|f[ée]minin(?:e|es|s)?|femmes|dames|filles|donne|femminil[ei]|ragazze|d[1-9])\b";

/// Mužský kontext na řádku
pub const MEN_CONTEXT: &str = r"\b(?:herren\w*|m(?:ä|ae)nner\w*|junioren|knaben|buben|men|mens|boys|masculin(?:e|es|s)?|hommes|messieurs|gar[çc]ons|uomini|maschil[ei]|ragazzi|h[1-9])\b";

pub(crate) struct RuleSpec {
    pub key: String,
    pub pattern: String,
    pub code: LeagueCode,
}

fn spec(key: impl Into<String>, pattern: impl Into<String>, code: LeagueCode) -> RuleSpec {
    RuleSpec { key: key.into(), pattern: pattern.into(), code }
}

// (tier, DE ordinal, FR ordinal, IT ordinal)
const TIERS: [(u8, &str, &str, &str); 5] = [
    (1, "erste",  "premi[eè]re",   "prima"),
    (2, "zweite", "deuxi[eè]me|seconde", "seconda"),
    (3, "dritte", "troisi[eè]me",  "terza"),
    (4, "vierte", "quatri[eè]me",  "quarta"),
    (5, "f(?:ü|ue)nfte", "cinqui[eè]me", "quinta"),
];

pub(crate) fn rule_specs() -> Vec<RuleSpec> {
    let mut out = vec![
        // ── Nationalliga A ──
        spec("nla",          r"\bnla\b",                          LeagueCode::Nla),
        spec("nl_a",         r"\bnl\s*-?\s*a\b",                  LeagueCode::Nla),
        spec("nationalliga_a", r"\bnationalliga\s*a\b",           LeagueCode::Nla),
        spec("lna",          r"\blna\b",                          LeagueCode::Nla),
        spec("ligue_nationale_a", r"\bligue\s+nationale\s+a\b",   LeagueCode::Nla),
        spec("lega_nazionale_a",  r"\blega\s+nazionale\s+a\b",    LeagueCode::Nla),
        spec("national_league_a", r"\bnational\s+league\s+a\b",   LeagueCode::Nla),
        // ── Nationalliga B ──
        spec("nlb",          r"\bnlb\b",                          LeagueCode::Nlb),
        spec("nl_b",         r"\bnl\s*-?\s*b\b",                  LeagueCode::Nlb),
        spec("nationalliga_b", r"\bnationalliga\s*b\b",           LeagueCode::Nlb),
        spec("lnb",          r"\blnb\b",                          LeagueCode::Nlb),
        spec("ligue_nationale_b", r"\bligue\s+nationale\s+b\b",   LeagueCode::Nlb),
        spec("lega_nazionale_b",  r"\blega\s+nazionale\s+b\b",    LeagueCode::Nlb),
        spec("national_league_b", r"\bnational\s+league\s+b\b",   LeagueCode::Nlb),
        // ── Mládež (slovní) ──
        spec("juniors",      r"\bjuniors?\b",                     LeagueCode::Juniors),
        spec("juniores",     r"\bjuniores\b",                     LeagueCode::Juniors),
        spec("juniori",      r"\bjuniori\b",                      LeagueCode::Juniors),
        spec("kadetten",     r"\bkadett(?:en|innen)?\b",          LeagueCode::Cadets),
        spec("cadets",       r"\bcadet(?:te)?s?\b",               LeagueCode::Cadets),
        spec("cadetti",      r"\bcadett[ie]\b",                   LeagueCode::Cadets),
        spec("minimes",      r"\bminimes?\b",                     LeagueCode::Minimes),
        spec("minis",        r"\bminis\b",                        LeagueCode::Minimes),
        spec("minivolley",   r"\bmini[\s-]?volley(?:ball)?\b",    LeagueCode::Minimes),
        spec("nachwuchs",    r"\bnachwuchs\w*\b",                 LeagueCode::Nachwuchs),
        spec("releve",       r"\brel[eè]ve\b",                    LeagueCode::Nachwuchs),
        spec("settore_giovanile", r"\bsettore\s+giovanile\b",     LeagueCode::Nachwuchs),
        spec("giovanili",    r"\bgiovanili\b",                    LeagueCode::Nachwuchs),
    ];

    for (tier, de, fr, it) in TIERS {
        let Some(code) = LeagueCode::from_tier(tier) else { continue };
        out.push(spec(format!("{tier}_liga"),   format!(r"\b{tier}\.?\s*liga\b"), code));
        out.push(spec(format!("{tier}_liga_de"), format!(r"\b(?:{de})\s+liga\b"), code));
        out.push(spec(format!("{tier}l"),       format!(r"\b{tier}l\b"), code));
        out.push(spec(
            format!("{tier}_ligue"),
            format!(r"\b{tier}\s*(?:re|ère|ere|er|e|ème|eme|de|nde)?\s+ligue\b"),
            code,
        ));
        out.push(spec(format!("{tier}_ligue_fr"), format!(r"\b(?:{fr})\s+ligue\b"), code));
        out.push(spec(format!("{tier}_lega"),   format!(r"\b{tier}\s*(?:a|ª)?\s+lega\b"), code));
        out.push(spec(format!("{tier}_lega_it"), format!(r"\b(?:{it})\s+lega\b"), code));
        out.push(spec(format!("{tier}_league"), format!(r"\b{tier}(?:st|nd|rd|th)?\s+league\b"), code));
    }

    for age in 13u8..=23 {
        let Some(code) = LeagueCode::from_age(age) else { continue };
        out.push(spec(format!("u{age}"),       format!(r"\bu\s?-?\s?{age}\b"), code));
        out.push(spec(format!("under_{age}"),  format!(r"\bunder\s?-?\s?{age}\b"), code));
        out.push(spec(format!("moins_de_{age}"), format!(r"\bmoins\s+de\s+{age}\s+ans\b"), code));
    }

    out
}

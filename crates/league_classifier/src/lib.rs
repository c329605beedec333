//! League classifier pro klubové weby
//! Heuristika místo AI/ML - jednoduchý pravidlový systém nad DE/FR/IT textem
//!
//! Každý řádek textu se testuje proti všem pravidlům (`PatternRule`). Každý
//! zásah jde do `all`; pohlaví se přiřazuje jen podle kontextu na stejném řádku.

mod rules;

use anyhow::{Context, Result};
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use rules::{MEN_CONTEXT, WOMEN_CONTEXT};

/// Kanonický kód ligy. Uzavřený výčet, pořadí variant určuje pořadí ve výstupu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeagueCode {
    #[serde(rename = "NLA")] Nla,
    #[serde(rename = "NLB")] Nlb,
    #[serde(rename = "1L")]  L1,
    #[serde(rename = "2L")]  L2,
    #[serde(rename = "3L")]  L3,
    #[serde(rename = "4L")]  L4,
    #[serde(rename = "5L")]  L5,
    #[serde(rename = "U13")] U13,
    #[serde(rename = "U14")] U14,
    #[serde(rename = "U15")] U15,
    #[serde(rename = "U16")] U16,
    #[serde(rename = "U17")] U17,
    #[serde(rename = "U18")] U18,
    #[serde(rename = "U19")] U19,
    #[serde(rename = "U20")] U20,
    #[serde(rename = "U21")] U21,
    #[serde(rename = "U22")] U22,
    #[serde(rename = "U23")] U23,
    #[serde(rename = "JUNIORS")]   Juniors,
    #[serde(rename = "CADETS")]    Cadets,
    #[serde(rename = "MINIMES")]   Minimes,
    #[serde(rename = "NACHWUCHS")] Nachwuchs,
}

impl LeagueCode {
    pub const ALL: [LeagueCode; 22] = [
        LeagueCode::Nla, LeagueCode::Nlb,
        LeagueCode::L1, LeagueCode::L2, LeagueCode::L3, LeagueCode::L4, LeagueCode::L5,
        LeagueCode::U13, LeagueCode::U14, LeagueCode::U15, LeagueCode::U16,
        LeagueCode::U17, LeagueCode::U18, LeagueCode::U19, LeagueCode::U20,
        LeagueCode::U21, LeagueCode::U22, LeagueCode::U23,
        LeagueCode::Juniors, LeagueCode::Cadets, LeagueCode::Minimes, LeagueCode::Nachwuchs,
    ];

    /// Seniorské (dospělé) ligy, jediné, které jdou do agregátních statistik
    pub const SENIOR: [LeagueCode; 7] = [
        LeagueCode::Nla, LeagueCode::Nlb,
        LeagueCode::L1, LeagueCode::L2, LeagueCode::L3, LeagueCode::L4, LeagueCode::L5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeagueCode::Nla => "NLA",
            LeagueCode::Nlb => "NLB",
            LeagueCode::L1 => "1L",
            LeagueCode::L2 => "2L",
            LeagueCode::L3 => "3L",
            LeagueCode::L4 => "4L",
            LeagueCode::L5 => "5L",
            LeagueCode::U13 => "U13",
            LeagueCode::U14 => "U14",
            LeagueCode::U15 => "U15",
            LeagueCode::U16 => "U16",
            LeagueCode::U17 => "U17",
            LeagueCode::U18 => "U18",
            LeagueCode::U19 => "U19",
            LeagueCode::U20 => "U20",
            LeagueCode::U21 => "U21",
            LeagueCode::U22 => "U22",
            LeagueCode::U23 => "U23",
            LeagueCode::Juniors => "JUNIORS",
            LeagueCode::Cadets => "CADETS",
            LeagueCode::Minimes => "MINIMES",
            LeagueCode::Nachwuchs => "NACHWUCHS",
        }
    }

    /// Věková/mládežnická kategorie?
    pub fn is_youth(self) -> bool {
        !self.is_senior()
    }

    pub fn is_senior(self) -> bool {
        Self::SENIOR.contains(&self)
    }

    /// U13..U23 podle věku
    pub fn from_age(age: u8) -> Option<LeagueCode> {
        let idx = age.checked_sub(13)? as usize;
        if idx > 10 {
            return None;
        }
        Some(Self::ALL[7 + idx])
    }

    /// 1L..5L podle čísla ligy
    pub fn from_tier(tier: u8) -> Option<LeagueCode> {
        match tier {
            1 => Some(LeagueCode::L1),
            2 => Some(LeagueCode::L2),
            3 => Some(LeagueCode::L3),
            4 => Some(LeagueCode::L4),
            5 => Some(LeagueCode::L5),
            _ => None,
        }
    }
}

impl fmt::Display for LeagueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeagueCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| anyhow::anyhow!("unknown league code: {s}"))
    }
}

/// Jedno pravidlo: klíč (pro debug), matcher, kanonický kód
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub key: String,
    pub matcher: Regex,
    pub code: LeagueCode,
}

/// Výsledek klasifikace jednoho textového blobu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub women: BTreeSet<LeagueCode>,
    pub men: BTreeSet<LeagueCode>,
    pub youth: BTreeSet<LeagueCode>,
    pub all: BTreeSet<LeagueCode>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Genderový kontext jednoho řádku
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenderContext {
    pub women: bool,
    pub men: bool,
}

pub struct LeagueClassifier {
    rules: Vec<PatternRule>,
    rule_set: RegexSet,
    women: Regex,
    men: Regex,
}

impl LeagueClassifier {
    /// Zkompiluje ruleset. Chyba tady = vadný pattern v rules.rs, ne runtime stav.
    pub fn new() -> Result<Self> {
        let specs = rules::rule_specs();

        let mut rules = Vec::with_capacity(specs.len());
        for spec in &specs {
            let matcher = Regex::new(&format!("(?i){}", spec.pattern))
                .with_context(|| format!("invalid league pattern {}", spec.key))?;
            rules.push(PatternRule {
                key: spec.key.clone(),
                matcher,
                code: spec.code,
            });
        }

        let rule_set = RegexSet::new(rules.iter().map(|r| r.matcher.as_str()))
            .context("failed to build league rule set")?;

        Ok(Self {
            rules,
            rule_set,
            women: Regex::new(&format!("(?i){WOMEN_CONTEXT}")).context("invalid women context pattern")?,
            men: Regex::new(&format!("(?i){MEN_CONTEXT}")).context("invalid men context pattern")?,
        })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn gender_context(&self, line: &str) -> GenderContext {
        GenderContext {
            women: self.women.is_match(line),
            men: self.men.is_match(line),
        }
    }

    /// Kódy, které řádek obsahuje (bez ohledu na pohlaví), seřazené
    pub fn codes_in_line(&self, line: &str) -> BTreeSet<LeagueCode> {
        self.rule_set
            .matches(line)
            .into_iter()
            .map(|idx| self.rules[idx].code)
            .collect()
    }

    pub fn classify(&self, text: &str) -> Classification {
        let mut out = Classification::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let codes = self.codes_in_line(line);
            if codes.is_empty() {
                continue;
            }

            let ctx = self.gender_context(line);

            for code in codes {
                out.all.insert(code);

                if code.is_youth() {
                    out.youth.insert(code);
                    if ctx.women {
                        out.women.insert(code);
                    }
                    if ctx.men {
                        out.men.insert(code);
                    }
                } else if ctx.women {
                    // Oba kontexty na řádku → ženy mají přednost
                    out.women.insert(code);
                } else if ctx.men {
                    out.men.insert(code);
                }
            }
        }

        out
    }
}

/// Club Leagues — Directory Scraper
///
/// Alternativní zdroj: veřejný adresář klubů federace.
/// - stránkuje výsledky
/// - u každé karty klubu rozbalí "offering" akordeony
/// - čte přesné badge lig (NLA, NLB, 1L..5L, U13..U23, Senioren)
///
/// Bez jazykové inference, ale závislé na konkrétním markupu adresáře.

pub mod chrome;
pub mod driver;
pub mod parse;

use league_classifier::LeagueCode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use chrome::ChromeDirectoryPage;
pub use driver::{DirectoryDriver, DirectoryPage, DirectoryRun};
pub use parse::DirectorySelectors;

/// Kategorie nabídky podle nadpisu akordeonu
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OfferingCategory {
    Women,
    Men,
    GirlsYouth,
    BoysYouth,
    Kids,
    Beach,
}

impl OfferingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            OfferingCategory::Women => "women",
            OfferingCategory::Men => "men",
            OfferingCategory::GirlsYouth => "girlsYouth",
            OfferingCategory::BoysYouth => "boysYouth",
            OfferingCategory::Kids => "kids",
            OfferingCategory::Beach => "beach",
        }
    }

    /// "Volleyball Frauen (NLA – 5L)" → Women. Klíče se porovnávají se
    /// začátkem slov ("femminile" obsahuje "mini", ale není kids).
    /// Pořadí kontrol je důležité ("Beach Juniorinnen" je beach).
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.to_lowercase();
        let words: Vec<&str> = l.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        let has = |keys: &[&str]| words.iter().any(|w| keys.iter().any(|k| w.starts_with(k)));

        if has(&["beach"]) {
            Some(OfferingCategory::Beach)
        } else if has(&["kids", "mini"]) {
            Some(OfferingCategory::Kids)
        } else if has(&["juniorinnen", "mädchen", "maedchen", "girls", "filles", "ragazze"]) {
            Some(OfferingCategory::GirlsYouth)
        } else if has(&["junioren", "knaben", "buben", "boys", "garçons", "garcons", "ragazzi"]) {
            Some(OfferingCategory::BoysYouth)
        } else if has(&["frauen", "damen", "women", "femmes", "dames", "donne", "féminin", "feminin", "femminil"]) {
            Some(OfferingCategory::Women)
        } else if has(&["männer", "maenner", "herren", "hommes", "uomini", "masculin", "maschil"])
            || words.contains(&"men")
        {
            Some(OfferingCategory::Men)
        } else {
            None
        }
    }
}

impl fmt::Display for OfferingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge z uzavřeného slovníku adresáře
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Badge {
    League(LeagueCode),
    Seniors,
}

impl Badge {
    pub fn label(&self) -> String {
        match self {
            Badge::League(code) => code.to_string(),
            Badge::Seniors => "SENIOREN".to_string(),
        }
    }
}

impl From<Badge> for String {
    fn from(b: Badge) -> Self {
        b.label()
    }
}

impl TryFrom<String> for Badge {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        if s.eq_ignore_ascii_case("senioren") {
            return Ok(Badge::Seniors);
        }
        Ok(Badge::League(s.parse()?))
    }
}

/// Jeden klub z adresáře. Místo stovky bool sloupců: kategorie → set badge.
/// Kategorie s prázdným setem = klub ji nabízí, ale liga nebyla odhalena.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryClubRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub offerings: BTreeMap<OfferingCategory, BTreeSet<Badge>>,
}

impl DirectoryClubRecord {
    /// Jeden flag ze "širokého" schématu, např. womenNLB
    pub fn flag(&self, category: OfferingCategory, badge: Badge) -> bool {
        self.offerings
            .get(&category)
            .is_some_and(|badges| badges.contains(&badge))
    }

    pub fn offers(&self, category: OfferingCategory) -> bool {
        self.offerings.contains_key(&category)
    }

    /// Všechny nastavené flagy v širokém tvaru ("kids", "beach", "womenNLB", "boysYouthU17")
    pub fn flags(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for (category, badges) in &self.offerings {
            out.insert(category.to_string());
            for badge in badges {
                out.insert(flag_key(*category, *badge));
            }
        }
        out
    }

    pub fn has_leagues(&self) -> bool {
        self.offerings.values().any(|b| !b.is_empty())
    }
}

pub fn flag_key(category: OfferingCategory, badge: Badge) -> String {
    format!("{}{}", category.as_str(), badge.label())
}

/// Souhrn pro konzoli: kolik klubů má který flag
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySummary {
    pub total_clubs: usize,
    pub with_email: usize,
    pub with_leagues: usize,
    pub per_flag: BTreeMap<String, usize>,
}

pub fn summarize(records: &[DirectoryClubRecord]) -> DirectorySummary {
    let mut summary = DirectorySummary {
        total_clubs: records.len(),
        ..Default::default()
    };
    for record in records {
        if record.email.is_some() {
            summary.with_email += 1;
        }
        if record.has_leagues() {
            summary.with_leagues += 1;
        }
        for flag in record.flags() {
            *summary.per_flag.entry(flag).or_insert(0) += 1;
        }
    }
    summary
}

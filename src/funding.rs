//! Normalization of loosely-typed enrichment strings.
//!
//! Upstream enrichment carries free-text values like "Series A", "$1.2M", or
//! "51-200". Each family is normalized in exactly one place here, and both
//! the filter evaluator and the display layer go through these functions, so
//! there is no ad-hoc matching scattered across call sites.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeRange, NumericRange};

// ---------------------------------------------------------------------------
// Funding rounds
// ---------------------------------------------------------------------------

/// Known funding-round categories plus a raw fallback for strings the
/// normalizer does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FundingRound {
    PreSeed,
    Seed,
    SeriesA,
    SeriesB,
    SeriesC,
    SeriesD,
    SeriesE,
    Growth,
    Ipo,
    Other(String),
}

impl FundingRound {
    /// Normalize a raw enrichment string into a round category.
    pub fn parse(raw: &str) -> FundingRound {
        let folded: String = raw
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match folded.as_str() {
            "preseed" | "angel" => FundingRound::PreSeed,
            "seed" | "seedround" => FundingRound::Seed,
            "seriesa" | "a" | "around" => FundingRound::SeriesA,
            "seriesb" | "b" | "bround" => FundingRound::SeriesB,
            "seriesc" | "c" | "cround" => FundingRound::SeriesC,
            "seriesd" | "d" | "dround" => FundingRound::SeriesD,
            "seriese" | "e" | "eround" => FundingRound::SeriesE,
            "growth" | "latestage" | "privateequity" => FundingRound::Growth,
            "ipo" | "public" | "postipo" => FundingRound::Ipo,
            _ => FundingRound::Other(raw.trim().to_string()),
        }
    }

    /// Display label, also used as the serialized form.
    pub fn label(&self) -> String {
        match self {
            FundingRound::PreSeed => "Pre-Seed".to_string(),
            FundingRound::Seed => "Seed".to_string(),
            FundingRound::SeriesA => "Series A".to_string(),
            FundingRound::SeriesB => "Series B".to_string(),
            FundingRound::SeriesC => "Series C".to_string(),
            FundingRound::SeriesD => "Series D".to_string(),
            FundingRound::SeriesE => "Series E".to_string(),
            FundingRound::Growth => "Growth".to_string(),
            FundingRound::Ipo => "IPO".to_string(),
            FundingRound::Other(raw) => raw.clone(),
        }
    }
}

impl From<String> for FundingRound {
    fn from(raw: String) -> Self {
        FundingRound::parse(&raw)
    }
}

impl From<FundingRound> for String {
    fn from(round: FundingRound) -> Self {
        round.label()
    }
}

impl fmt::Display for FundingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ---------------------------------------------------------------------------
// Money strings
// ---------------------------------------------------------------------------

fn money_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "$1.2M", "€500k", "2B", "1,200,000"
        Regex::new(r"(?i)^\s*[$€£]?\s*([0-9]+(?:\.[0-9]+)?)\s*([kmb])?").expect("money regex")
    })
}

/// Parse a revenue/funding amount string into USD millions.
///
/// Suffix-less plain numbers are treated as absolute dollars.
/// Returns `None` when no leading number can be found.
pub fn parse_money_millions(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let caps = money_regex().captures(&cleaned)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;

    let millions = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(suffix) if suffix == "k" => value / 1_000.0,
        Some(suffix) if suffix == "m" => value,
        Some(suffix) if suffix == "b" => value * 1_000.0,
        _ => value / 1_000_000.0,
    };
    Some(millions)
}

/// Test a raw revenue string against a range in USD millions. Unparseable
/// revenue fails closed.
pub fn revenue_in_range(raw: &str, range: &NumericRange) -> bool {
    parse_money_millions(raw).map_or(false, |millions| range.contains(millions))
}

// ---------------------------------------------------------------------------
// Employee-count bands
// ---------------------------------------------------------------------------

/// Parse an employee-range tag like "51-200", "5001+", or "10".
pub fn parse_employee_range(raw: &str) -> Option<EmployeeRange> {
    let raw = raw.trim();
    if let Some(min) = raw.strip_suffix('+') {
        return Some(EmployeeRange {
            min: min.trim().parse().ok()?,
            max: None,
        });
    }
    if let Some((min, max)) = raw.split_once('-') {
        return Some(EmployeeRange {
            min: min.trim().parse().ok()?,
            max: Some(max.trim().parse().ok()?),
        });
    }
    let exact: u32 = raw.parse().ok()?;
    Some(EmployeeRange {
        min: exact,
        max: Some(exact),
    })
}

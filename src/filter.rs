//! Filter evaluation over merged companies.
//!
//! All active dimensions are AND-combined; values within a multi-value
//! dimension are OR-combined. Structural filters fail closed: a company with
//! no enrichment never matches a positive structural filter, but stays
//! includable by source/strength/keyword filters; enrichment absence is not
//! "explicitly zero".
//!
//! Hunt matching is advisory tagging, independent of pass/fail, unless a
//! hunt is explicitly selected as the active filter.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::funding::{revenue_in_range, FundingRound};
use crate::types::{
    CompanyMatch, CompanySource, FilterState, Hunt, MergedCompany, Scope, SourceFilter,
    StructuralFilters,
};

/// Evaluate a merged set against the active filter state, tagging each
/// passing company with the hunts it matches.
pub fn evaluate_companies(
    companies: &[MergedCompany],
    state: &FilterState,
    hunts: &[Hunt],
    now: DateTime<Utc>,
) -> Vec<CompanyMatch> {
    companies
        .iter()
        .filter_map(|company| {
            let matching_hunt_ids = matching_hunt_ids(company, hunts, now);
            if passes(company, state, &matching_hunt_ids, now) {
                Some(CompanyMatch {
                    company: company.clone(),
                    matching_hunt_ids,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Does this company pass every active filter dimension?
fn passes(
    company: &MergedCompany,
    state: &FilterState,
    matching_hunt_ids: &[String],
    now: DateTime<Utc>,
) -> bool {
    if !passes_source(company, state.source) {
        return false;
    }
    if let Some(required) = state.strength {
        if !company
            .my_contacts
            .iter()
            .any(|c| c.strength == Some(required))
        {
            return false;
        }
    }
    if !passes_connected_date(company, &state.connected_years, &state.connected_months) {
        return false;
    }
    if let Some(scope) = &state.scope {
        let in_scope = match scope {
            Scope::Space(id) => company.space_ids.contains(id),
            Scope::Connection(id) => company.connection_ids.contains(id),
        };
        if !in_scope {
            return false;
        }
    }
    if let Some(search) = state.search.as_deref() {
        let search = search.trim().to_lowercase();
        if !search.is_empty() && !search_haystack(company).contains(&search) {
            return false;
        }
    }
    if !state.ai_keywords.is_empty() {
        let haystack = keyword_haystack(company);
        if !state
            .ai_keywords
            .iter()
            .any(|kw| haystack.contains(&kw.to_lowercase()))
        {
            return false;
        }
    }
    if !state.exclude_keywords.is_empty() {
        let haystack = exclude_haystack(company);
        if state
            .exclude_keywords
            .iter()
            .any(|kw| haystack.contains(&kw.to_lowercase()))
        {
            return false;
        }
    }
    if !matches_structural_at(company, &state.structural, now) {
        return false;
    }
    // A hunt selected as the active filter turns tagging into exclusion.
    if let Some(active) = state.active_hunt_id.as_deref() {
        if !matching_hunt_ids.iter().any(|id| id == active) {
            return false;
        }
    }
    true
}

/// Hunt ids this company matches, regardless of whether it passes the active
/// filters. Inactive hunts never tag.
pub fn matching_hunt_ids(
    company: &MergedCompany,
    hunts: &[Hunt],
    now: DateTime<Utc>,
) -> Vec<String> {
    hunts
        .iter()
        .filter(|hunt| hunt.is_active && hunt_matches(company, hunt, now))
        .map(|hunt| hunt.id.clone())
        .collect()
}

/// A hunt matches by keywords OR by its structural snapshot. A hunt with no
/// keywords and no structural sub-filters never matches anything.
fn hunt_matches(company: &MergedCompany, hunt: &Hunt, now: DateTime<Utc>) -> bool {
    if !hunt.keywords.is_empty() {
        let haystack = keyword_haystack(company);
        if hunt.keywords.iter().any(|kw| haystack.contains(kw.as_str())) {
            return true;
        }
    }
    match &hunt.filters {
        Some(filters) if !filters.is_empty() => {
            matches_structural_at(company, filters, now)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Dimension checks
// ---------------------------------------------------------------------------

fn passes_source(company: &MergedCompany, filter: SourceFilter) -> bool {
    match filter {
        SourceFilter::All => true,
        SourceFilter::Mine => company.my_count > 0,
        SourceFilter::Shared => company.shared_count > 0,
        SourceFilter::Both => company.source == CompanySource::Both,
    }
}

/// Year/month tags over my contacts' first-seen dates. Empty tag lists are
/// wildcards for that sub-dimension.
fn passes_connected_date(company: &MergedCompany, years: &[i32], months: &[u32]) -> bool {
    if years.is_empty() && months.is_empty() {
        return true;
    }
    company.my_contacts.iter().any(|contact| {
        let Some(first_seen) = contact.first_seen_at else {
            return false;
        };
        let year_ok = years.is_empty() || years.contains(&first_seen.year());
        let month_ok = months.is_empty() || months.contains(&first_seen.month());
        year_ok && month_ok
    })
}

/// AND across every present structural dimension; each missing enrichment
/// field fails its dimension closed.
fn matches_structural_at(
    company: &MergedCompany,
    filters: &StructuralFilters,
    now: DateTime<Utc>,
) -> bool {
    let enrichment = company.enrichment.as_ref();

    if !filters.employee_ranges.is_empty() {
        let Some(count) = enrichment.and_then(|e| e.employee_count) else {
            return false;
        };
        if !filters.employee_ranges.iter().any(|r| r.contains(count)) {
            return false;
        }
    }

    if !filters.revenue_ranges.is_empty() {
        let Some(revenue) = enrichment.and_then(|e| e.revenue.as_deref()) else {
            return false;
        };
        if !filters
            .revenue_ranges
            .iter()
            .any(|range| revenue_in_range(revenue, range))
        {
            return false;
        }
    }

    if filters.founded_after.is_some() || filters.founded_before.is_some() {
        let Some(year) = enrichment.and_then(|e| e.founded_year) else {
            return false;
        };
        if filters.founded_after.map_or(false, |min| year < min) {
            return false;
        }
        if filters.founded_before.map_or(false, |max| year > max) {
            return false;
        }
    }

    if !filters.funding_rounds.is_empty() {
        let Some(raw) = enrichment.and_then(|e| e.funding_round.as_deref()) else {
            return false;
        };
        let round = FundingRound::parse(raw);
        if !filters.funding_rounds.contains(&round) {
            return false;
        }
    }

    if let Some(months) = filters.funded_within_months {
        let Some(funded_at) = enrichment.and_then(|e| e.last_funding_at) else {
            return false;
        };
        let cutoff = now - Duration::days(i64::from(months) * 30);
        if funded_at < cutoff {
            return false;
        }
    }

    if let Some(country) = filters.country.as_deref() {
        let matches = company
            .country
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case(country));
        if !matches {
            return false;
        }
    }

    if let Some(city) = filters.city.as_deref() {
        let matches = company
            .city
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case(city));
        if !matches {
            return false;
        }
    }

    if !filters.technologies.is_empty() {
        let stack = enrichment
            .map(|e| e.technologies.join(" ").to_lowercase())
            .unwrap_or_default();
        if stack.is_empty() {
            return false;
        }
        if !filters
            .technologies
            .iter()
            .any(|tech| stack.contains(&tech.to_lowercase()))
        {
            return false;
        }
    }

    if let Some(source) = filters.source {
        if !passes_source(company, source) {
            return false;
        }
    }

    if let Some(strength) = filters.strength {
        if !company
            .my_contacts
            .iter()
            .any(|c| c.strength == Some(strength))
        {
            return false;
        }
    }

    true
}

// ---------------------------------------------------------------------------
// Haystacks
// ---------------------------------------------------------------------------

/// Free-text search corpus: company name, domain, contact names and titles.
fn search_haystack(company: &MergedCompany) -> String {
    let mut parts: Vec<&str> = vec![&company.name, &company.domain];
    for contact in company.my_contacts.iter().chain(&company.shared_contacts) {
        parts.push(&contact.name);
        if let Some(title) = contact.title.as_deref() {
            parts.push(title);
        }
    }
    parts.join(" ").to_lowercase()
}

/// Keyword corpus: search haystack plus description, industry, and location.
fn keyword_haystack(company: &MergedCompany) -> String {
    let mut text = search_haystack(company);
    let enrichment = company.enrichment.as_ref();
    for extra in [
        enrichment.and_then(|e| e.description.as_deref()),
        enrichment.and_then(|e| e.industry.as_deref()),
        company.city.as_deref(),
        company.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        text.push(' ');
        text.push_str(&extra.to_lowercase());
    }
    text
}

/// Exclusion corpus: description, industry, and company name only.
fn exclude_haystack(company: &MergedCompany) -> String {
    let enrichment = company.enrichment.as_ref();
    [
        Some(company.name.as_str()),
        enrichment.and_then(|e| e.description.as_deref()),
        enrichment.and_then(|e| e.industry.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

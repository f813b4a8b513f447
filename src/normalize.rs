//! Source normalization: raw per-source records → common contact shape.
//!
//! Each contact gets a derived company domain (explicit domain → email
//! domain → the literal `"unknown"`) and a provenance tag. Missing domains
//! never raise; the downstream pipeline tolerates the `unknown` bucket.

use chrono::{DateTime, Utc};

use crate::strength::{classify_at, StrengthPolicy};
use crate::types::{
    ConnectionReach, NormalizedContact, Provenance, RawContact, ReachCompany, SourceData,
    SpaceReach,
};
use crate::util::domain_from_email;

/// Derive a contact's company domain. Fails silently to `"unknown"` rather
/// than raising when no domain can be resolved.
pub fn derive_company_domain(explicit: Option<&str>, email: &str) -> String {
    if let Some(domain) = explicit {
        let domain = domain.trim().to_lowercase();
        if !domain.is_empty() {
            return domain;
        }
    }
    domain_from_email(email).unwrap_or_else(|| "unknown".to_string())
}

fn project(raw: &RawContact, domain: String, provenance: Provenance) -> NormalizedContact {
    NormalizedContact {
        id: raw.id.clone(),
        name: raw.name.clone(),
        email: raw.email.trim().to_lowercase(),
        title: raw.title.clone(),
        company_name: raw.company_name.clone(),
        company_domain: domain,
        last_seen_at: raw.last_seen_at,
        meetings_count: raw.meetings_count,
        first_seen_at: raw.first_seen_at,
        linkedin_url: raw.linkedin_url.clone(),
        photo_url: raw.photo_url.clone(),
        city: raw.city.clone(),
        country: raw.country.clone(),
        headline: raw.headline.clone(),
        provenance,
        strength: None,
        company_data: raw.company_data.clone(),
    }
}

/// Normalize the user's own contacts. Strength is computed here and only
/// here; shared contacts never carry one.
pub fn normalize_own_contacts(
    contacts: &[RawContact],
    policy: &StrengthPolicy,
    now: DateTime<Utc>,
) -> Vec<NormalizedContact> {
    contacts
        .iter()
        .map(|raw| {
            let domain = derive_company_domain(raw.company_domain.as_deref(), &raw.email);
            let mut contact = project(raw, domain, Provenance::Mine);
            contact.strength = Some(classify_at(raw.last_seen_at, raw.meetings_count, policy, now));
            contact
        })
        .collect()
}

/// Normalize one shared company's contacts, filling in company-level name,
/// domain, and enrichment where the contact record lacks its own.
fn normalize_reach_company(company: &ReachCompany, provenance: &Provenance) -> Vec<NormalizedContact> {
    company
        .contacts
        .iter()
        .map(|raw| {
            let explicit = raw
                .company_domain
                .as_deref()
                .or(company.domain.as_deref());
            let domain = derive_company_domain(explicit, &raw.email);
            let mut contact = project(raw, domain, provenance.clone());
            if contact.company_name.is_none() {
                contact.company_name = company.name.clone();
            }
            if contact.company_data.is_none() {
                contact.company_data = company.company_data.clone();
            }
            contact
        })
        .collect()
}

/// Normalize all space-shared reach, tagging each contact with its space id.
pub fn normalize_space_reach(spaces: &[SpaceReach]) -> Vec<NormalizedContact> {
    spaces
        .iter()
        .flat_map(|space| {
            let provenance = Provenance::Space(space.space_id.clone());
            space
                .companies
                .iter()
                .flat_map(move |company| normalize_reach_company(company, &provenance))
        })
        .collect()
}

/// Normalize all connection-shared reach, tagging each contact with its
/// connection id.
pub fn normalize_connection_reach(connections: &[ConnectionReach]) -> Vec<NormalizedContact> {
    connections
        .iter()
        .flat_map(|connection| {
            let provenance = Provenance::Connection(connection.connection_id.clone());
            connection
                .companies
                .iter()
                .flat_map(move |company| normalize_reach_company(company, &provenance))
        })
        .collect()
}

/// Normalize all three sources in merge order: own contacts first, then
/// spaces, then connections. The merger's email dedup depends on this order
/// (own contacts win the bucket).
pub fn normalize_all(
    sources: &SourceData,
    policy: &StrengthPolicy,
    now: DateTime<Utc>,
) -> Vec<NormalizedContact> {
    let mut out = normalize_own_contacts(&sources.my_contacts, policy, now);
    out.extend(normalize_space_reach(&sources.space_reach));
    out.extend(normalize_connection_reach(&sources.connection_reach));
    out
}

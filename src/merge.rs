//! Company merger: normalized contacts → one `MergedCompany` per domain.
//!
//! Contacts are folded in normalization order (own, then spaces, then
//! connections). Dedup is by lower-cased email through an explicit per-company
//! index, since the same real contact can carry different synthetic ids
//! depending on source. Enrichment is first-write-wins: once a company is enriched,
//! later sources never overwrite it within a pass.

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::types::{
    CompanySource, ConnectionStrength, MergedCompany, NormalizedContact, Provenance,
};
use crate::util::company_name_from_domain;

struct CompanyAccumulator {
    company: MergedCompany,
    /// Email index for O(1) dedup across both contact buckets.
    emails: HashSet<String>,
}

impl CompanyAccumulator {
    fn new(domain: &str) -> Self {
        CompanyAccumulator {
            company: MergedCompany {
                domain: domain.to_string(),
                name: company_name_from_domain(domain),
                my_contacts: Vec::new(),
                shared_contacts: Vec::new(),
                my_count: 0,
                shared_count: 0,
                total_count: 0,
                best_strength: None,
                source: CompanySource::Shared,
                space_ids: BTreeSet::new(),
                connection_ids: BTreeSet::new(),
                enrichment: None,
                city: None,
                country: None,
                linkedin_url: None,
            },
            emails: HashSet::new(),
        }
    }

    /// Accumulate provenance and first-write-wins fields. Runs for every
    /// contact, including ones dropped by email dedup: a space still
    /// *reaches* this company even when its contact is a duplicate.
    fn absorb_metadata(&mut self, contact: &NormalizedContact) {
        match &contact.provenance {
            Provenance::Mine => {}
            Provenance::Space(id) => {
                self.company.space_ids.insert(id.clone());
            }
            Provenance::Connection(id) => {
                self.company.connection_ids.insert(id.clone());
            }
        }

        if let Some(name) = contact.company_name.as_deref() {
            if !name.trim().is_empty() && self.company.name == company_name_from_domain(&self.company.domain) {
                self.company.name = name.trim().to_string();
            }
        }

        // First-write-wins: only fill enrichment when none has landed yet.
        if self.company.enrichment.is_none() {
            self.company.enrichment = contact.company_data.clone();
        }
        if self.company.city.is_none() {
            self.company.city = contact.city.clone();
        }
        if self.company.country.is_none() {
            self.company.country = contact.country.clone();
        }
        if self.company.linkedin_url.is_none() {
            self.company.linkedin_url = contact.linkedin_url.clone();
        }
    }

    /// Append a contact unless its email is already present in either bucket.
    fn append(&mut self, contact: NormalizedContact) {
        if self.emails.contains(&contact.email) {
            return;
        }
        self.emails.insert(contact.email.clone());
        match contact.provenance {
            Provenance::Mine => self.company.my_contacts.push(contact),
            Provenance::Space(_) | Provenance::Connection(_) => {
                self.company.shared_contacts.push(contact)
            }
        }
        self.refresh();
    }

    /// Recompute counts, source, and best strength from the contact buckets.
    fn refresh(&mut self) {
        let company = &mut self.company;
        company.my_count = company.my_contacts.len();
        company.shared_count = company.shared_contacts.len();
        company.total_count = company.my_count + company.shared_count;
        company.source = if company.my_count > 0 && company.shared_count > 0 {
            CompanySource::Both
        } else if company.my_count > 0 {
            CompanySource::Mine
        } else {
            CompanySource::Shared
        };
        // Ord on ConnectionStrength is strong-first, so min() is strongest.
        company.best_strength = company
            .my_contacts
            .iter()
            .filter_map(|c| c.strength)
            .min();
    }
}

/// Natural result ordering, also the `relevance` sort: source priority
/// (both > mine > shared), then best strength, then descending contact
/// count, then domain as the deterministic tie-break.
pub(crate) fn natural_cmp(a: &MergedCompany, b: &MergedCompany) -> Ordering {
    (
        a.source.priority(),
        ConnectionStrength::rank(a.best_strength),
        Reverse(a.total_count),
        a.domain.as_str(),
    )
        .cmp(&(
            b.source.priority(),
            ConnectionStrength::rank(b.best_strength),
            Reverse(b.total_count),
            b.domain.as_str(),
        ))
}

/// Fold normalized contacts into merged companies, in natural order.
pub fn merge_companies(contacts: Vec<NormalizedContact>) -> Vec<MergedCompany> {
    let mut insertion_order: Vec<String> = Vec::new();
    let mut by_domain: HashMap<String, CompanyAccumulator> = HashMap::new();

    for contact in contacts {
        let domain = contact.company_domain.clone();
        let accumulator = by_domain.entry(domain.clone()).or_insert_with(|| {
            insertion_order.push(domain.clone());
            CompanyAccumulator::new(&domain)
        });
        accumulator.absorb_metadata(&contact);
        accumulator.append(contact);
    }

    let mut companies: Vec<MergedCompany> = insertion_order
        .into_iter()
        .filter_map(|domain| by_domain.remove(&domain))
        .map(|acc| acc.company)
        .collect();
    companies.sort_by(natural_cmp);
    companies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strength::StrengthPolicy;
    use crate::types::{CompanyEnrichment, RawContact, ReachCompany, SourceData, SpaceReach};
    use chrono::{Duration, Utc};

    fn own(email: &str, meetings: u32, days_ago: i64) -> NormalizedContact {
        NormalizedContact {
            id: format!("own-{email}"),
            name: "Own Contact".to_string(),
            email: email.to_string(),
            title: None,
            company_name: None,
            company_domain: crate::util::domain_from_email(email)
                .unwrap_or_else(|| "unknown".to_string()),
            last_seen_at: Utc::now() - Duration::days(days_ago),
            meetings_count: meetings,
            first_seen_at: None,
            linkedin_url: None,
            photo_url: None,
            city: None,
            country: None,
            headline: None,
            provenance: Provenance::Mine,
            strength: Some(crate::strength::classify_at(
                Utc::now() - Duration::days(days_ago),
                meetings,
                &StrengthPolicy::default(),
                Utc::now(),
            )),
            company_data: None,
        }
    }

    fn shared(email: &str, provenance: Provenance) -> NormalizedContact {
        NormalizedContact {
            id: format!("shared-{email}"),
            name: "Shared Contact".to_string(),
            email: email.to_string(),
            title: None,
            company_name: None,
            company_domain: crate::util::domain_from_email(email)
                .unwrap_or_else(|| "unknown".to_string()),
            last_seen_at: Utc::now(),
            meetings_count: 0,
            first_seen_at: None,
            linkedin_url: None,
            photo_url: None,
            city: None,
            country: None,
            headline: None,
            provenance,
            strength: None,
            company_data: None,
        }
    }

    fn with_enrichment(mut contact: NormalizedContact, employee_count: u32) -> NormalizedContact {
        contact.company_data = Some(CompanyEnrichment {
            employee_count: Some(employee_count),
            enriched_at: Some(Utc::now()),
            ..Default::default()
        });
        contact
    }

    #[test]
    fn test_acme_scenario() {
        // One own contact (5 meetings, seen 2 days ago) plus one
        // space-shared contact at the same domain.
        let merged = merge_companies(vec![
            own("alice@acme.com", 5, 2),
            shared("bob@acme.com", Provenance::Space("S1".to_string())),
        ]);
        assert_eq!(merged.len(), 1);
        let acme = &merged[0];
        assert_eq!(acme.domain, "acme.com");
        assert_eq!(acme.my_count, 1);
        assert_eq!(acme.shared_count, 1);
        assert_eq!(acme.source, CompanySource::Both);
        assert_eq!(acme.best_strength, Some(ConnectionStrength::Strong));
        assert!(acme.space_ids.contains("S1"));
    }

    #[test]
    fn test_email_dedup_across_buckets() {
        // Same email from own contacts and a space: stays in my_contacts only.
        let merged = merge_companies(vec![
            own("alice@acme.com", 5, 2),
            shared("alice@acme.com", Provenance::Space("S1".to_string())),
            shared("alice@acme.com", Provenance::Connection("C1".to_string())),
        ]);
        assert_eq!(merged.len(), 1);
        let acme = &merged[0];
        assert_eq!(acme.my_count, 1);
        assert_eq!(acme.shared_count, 0);
        assert_eq!(acme.total_count, 1);
        // The space and connection still reach the company.
        assert!(acme.space_ids.contains("S1"));
        assert!(acme.connection_ids.contains("C1"));
    }

    #[test]
    fn test_no_email_twice_within_shared() {
        let merged = merge_companies(vec![
            shared("bob@acme.com", Provenance::Space("S1".to_string())),
            shared("bob@acme.com", Provenance::Space("S2".to_string())),
        ]);
        assert_eq!(merged[0].shared_count, 1);
        assert_eq!(merged[0].space_ids.len(), 2);
    }

    #[test]
    fn test_count_invariant() {
        let merged = merge_companies(vec![
            own("a@acme.com", 2, 1),
            own("b@acme.com", 1, 40),
            shared("c@acme.com", Provenance::Space("S1".to_string())),
        ]);
        for company in &merged {
            assert_eq!(
                company.total_count,
                company.my_contacts.len() + company.shared_contacts.len()
            );
        }
    }

    #[test]
    fn test_source_derivation() {
        let merged = merge_companies(vec![
            own("a@mineonly.com", 2, 1),
            shared("b@sharedonly.com", Provenance::Space("S1".to_string())),
            own("c@bothco.com", 2, 1),
            shared("d@bothco.com", Provenance::Connection("C1".to_string())),
        ]);
        for company in &merged {
            match company.domain.as_str() {
                "mineonly.com" => assert_eq!(company.source, CompanySource::Mine),
                "sharedonly.com" => assert_eq!(company.source, CompanySource::Shared),
                "bothco.com" => assert_eq!(company.source, CompanySource::Both),
                other => panic!("unexpected domain {other}"),
            }
        }
    }

    #[test]
    fn test_enrichment_first_write_wins() {
        // Second contact carries richer enrichment, but the first write wins.
        let merged = merge_companies(vec![
            with_enrichment(own("a@acme.com", 2, 1), 40),
            with_enrichment(shared("b@acme.com", Provenance::Space("S1".to_string())), 9000),
        ]);
        assert_eq!(
            merged[0].enrichment.as_ref().unwrap().employee_count,
            Some(40)
        );
    }

    #[test]
    fn test_unenriched_first_contact_leaves_room_for_later_enrichment() {
        let merged = merge_companies(vec![
            own("a@acme.com", 2, 1),
            with_enrichment(shared("b@acme.com", Provenance::Space("S1".to_string())), 150),
        ]);
        assert_eq!(
            merged[0].enrichment.as_ref().unwrap().employee_count,
            Some(150)
        );
    }

    #[test]
    fn test_unknown_bucket_survives_merge() {
        let merged = merge_companies(vec![shared(
            "no-domain",
            Provenance::Space("S1".to_string()),
        )]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].domain, "unknown");
    }

    #[test]
    fn test_natural_order_source_then_strength_then_count() {
        let merged = merge_companies(vec![
            shared("x@sharedco.com", Provenance::Space("S1".to_string())),
            own("weak@weakco.com", 1, 60),
            own("a@bothco.com", 5, 1),
            shared("b@bothco.com", Provenance::Space("S1".to_string())),
            own("strong@strongco.com", 5, 1),
        ]);
        let domains: Vec<&str> = merged.iter().map(|c| c.domain.as_str()).collect();
        // both > mine(strong) > mine(weak) > shared
        assert_eq!(
            domains,
            vec!["bothco.com", "strongco.com", "weakco.com", "sharedco.com"]
        );
    }

    #[test]
    fn test_full_pipeline_from_sources() {
        let now = Utc::now();
        let sources = SourceData {
            my_contacts: vec![RawContact {
                id: "1".to_string(),
                name: "Alice".to_string(),
                email: "alice@acme.com".to_string(),
                title: Some("CTO".to_string()),
                company_name: Some("Acme".to_string()),
                company_domain: None,
                last_seen_at: now - Duration::days(2),
                meetings_count: 5,
                first_seen_at: None,
                linkedin_url: None,
                photo_url: None,
                city: None,
                country: None,
                headline: None,
                company_data: None,
            }],
            space_reach: vec![SpaceReach {
                space_id: "S1".to_string(),
                space_name: "Founders".to_string(),
                companies: vec![ReachCompany {
                    name: Some("Acme".to_string()),
                    domain: Some("acme.com".to_string()),
                    company_data: None,
                    contacts: vec![RawContact {
                        id: "2".to_string(),
                        name: "Bob".to_string(),
                        email: "bob@acme.com".to_string(),
                        title: None,
                        company_name: None,
                        company_domain: None,
                        last_seen_at: now,
                        meetings_count: 0,
                        first_seen_at: None,
                        linkedin_url: None,
                        photo_url: None,
                        city: None,
                        country: None,
                        headline: None,
                        company_data: None,
                    }],
                }],
            }],
            connection_reach: vec![],
        };
        let normalized =
            crate::normalize::normalize_all(&sources, &StrengthPolicy::default(), now);
        let merged = merge_companies(normalized);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Acme");
        assert_eq!(merged[0].source, CompanySource::Both);
        assert_eq!(merged[0].best_strength, Some(ConnectionStrength::Strong));
    }
}

//! Ranking, pagination, and scoped partitioning of filtered results.
//!
//! All sorts are stable with deterministic tie-breaks (domain last), so the
//! same filter state over the same merged set always yields the same ordered
//! output.

use crate::merge::natural_cmp;
use crate::types::{
    CompanyMatch, CompanyPage, ConnectionStrength, ScopedPartition, SortStrategy,
};

/// Fixed page size for unscoped views.
pub const PAGE_SIZE: usize = 50;

/// Order matches by the selected strategy. `Relevance` preserves the
/// merger's natural output order.
pub fn sort_matches(matches: &mut [CompanyMatch], strategy: SortStrategy) {
    match strategy {
        // The merger already emits natural order; re-sorting by the same
        // comparator keeps identical output even if the caller shuffled.
        SortStrategy::Relevance => {
            matches.sort_by(|a, b| natural_cmp(&a.company, &b.company));
        }
        SortStrategy::Name => {
            // Case-insensitive byte order, a stand-in for locale-aware
            // collation.
            matches.sort_by(|a, b| {
                a.company
                    .name
                    .to_lowercase()
                    .cmp(&b.company.name.to_lowercase())
                    .then_with(|| a.company.domain.cmp(&b.company.domain))
            });
        }
        SortStrategy::Contacts => {
            matches.sort_by(|a, b| {
                b.company
                    .total_count
                    .cmp(&a.company.total_count)
                    .then_with(|| a.company.domain.cmp(&b.company.domain))
            });
        }
        SortStrategy::Strength => {
            matches.sort_by(|a, b| {
                ConnectionStrength::rank(a.company.best_strength)
                    .cmp(&ConnectionStrength::rank(b.company.best_strength))
                    .then_with(|| a.company.domain.cmp(&b.company.domain))
            });
        }
    }
}

/// Stably move companies matching the given hunt to the front, without
/// disturbing relative order inside either partition.
pub fn hoist_hunt_matches(matches: &mut [CompanyMatch], hunt_id: &str) {
    // Stable sort on a boolean key is exactly a stable partition.
    matches.sort_by_key(|m| !m.matching_hunt_ids.iter().any(|id| id == hunt_id));
}

/// Slice the ranked set into one fixed-size page. Out-of-range page indexes
/// clamp to the last page; an empty result yields a well-formed empty page.
pub fn paginate(matches: Vec<CompanyMatch>, page: usize, page_size: usize) -> CompanyPage {
    let total = matches.len();
    let total_pages = total.div_ceil(page_size);
    let page = page.min(total_pages.saturating_sub(1));
    let items = matches
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .collect();
    CompanyPage {
        items,
        page,
        page_size,
        total,
        total_pages,
    }
}

/// Scoped-view split: companies the user can already reach alone
/// (`my_count > 0 && shared_count == 0`) vs everything the scope adds.
/// Both partitions are rendered in full; scoped views are expected to be
/// small, so this skips pagination.
pub fn partition_scoped(matches: Vec<CompanyMatch>) -> ScopedPartition {
    let (already_known, new_to_you): (Vec<CompanyMatch>, Vec<CompanyMatch>) = matches
        .into_iter()
        .partition(|m| m.company.my_count > 0 && m.company.shared_count == 0);
    ScopedPartition {
        new_to_you,
        already_known,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompanySource, MergedCompany};
    use std::collections::BTreeSet;

    fn entry(domain: &str, my: usize, shared: usize, hunt_ids: &[&str]) -> CompanyMatch {
        CompanyMatch {
            company: MergedCompany {
                domain: domain.to_string(),
                name: crate::util::company_name_from_domain(domain),
                my_contacts: Vec::new(),
                shared_contacts: Vec::new(),
                my_count: my,
                shared_count: shared,
                total_count: my + shared,
                best_strength: None,
                source: if my > 0 && shared > 0 {
                    CompanySource::Both
                } else if my > 0 {
                    CompanySource::Mine
                } else {
                    CompanySource::Shared
                },
                space_ids: BTreeSet::new(),
                connection_ids: BTreeSet::new(),
                enrichment: None,
                city: None,
                country: None,
                linkedin_url: None,
            },
            matching_hunt_ids: hunt_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let mut matches = vec![
            entry("zeta.com", 1, 0, &[]),
            entry("alpha.com", 1, 0, &[]),
            entry("beta.com", 1, 0, &[]),
        ];
        sort_matches(&mut matches, SortStrategy::Name);
        let domains: Vec<&str> = matches.iter().map(|m| m.company.domain.as_str()).collect();
        assert_eq!(domains, vec!["alpha.com", "beta.com", "zeta.com"]);
    }

    #[test]
    fn test_contacts_sort_descending_with_domain_tiebreak() {
        let mut matches = vec![
            entry("b.com", 1, 0, &[]),
            entry("a.com", 1, 0, &[]),
            entry("big.com", 3, 4, &[]),
        ];
        sort_matches(&mut matches, SortStrategy::Contacts);
        let domains: Vec<&str> = matches.iter().map(|m| m.company.domain.as_str()).collect();
        assert_eq!(domains, vec!["big.com", "a.com", "b.com"]);
    }

    #[test]
    fn test_hoist_preserves_relative_order() {
        let mut matches = vec![
            entry("a.com", 1, 0, &[]),
            entry("b.com", 1, 0, &["h1"]),
            entry("c.com", 1, 0, &[]),
            entry("d.com", 1, 0, &["h1"]),
        ];
        hoist_hunt_matches(&mut matches, "h1");
        let domains: Vec<&str> = matches.iter().map(|m| m.company.domain.as_str()).collect();
        assert_eq!(domains, vec!["b.com", "d.com", "a.com", "c.com"]);
    }

    #[test]
    fn test_pagination_slices_and_counts() {
        let matches: Vec<CompanyMatch> = (0..120)
            .map(|i| entry(&format!("c{i:03}.com"), 1, 0, &[]))
            .collect();
        let page = paginate(matches.clone(), 0, PAGE_SIZE);
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.total, 120);
        assert_eq!(page.total_pages, 3);

        let last = paginate(matches.clone(), 2, PAGE_SIZE);
        assert_eq!(last.items.len(), 20);

        // Out-of-range page clamps to the last page.
        let clamped = paginate(matches, 99, PAGE_SIZE);
        assert_eq!(clamped.page, 2);
        assert_eq!(clamped.items.len(), 20);
    }

    #[test]
    fn test_empty_result_is_well_formed() {
        let page = paginate(Vec::new(), 0, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 0);
    }

    #[test]
    fn test_scoped_partition_scenario() {
        // 10 companies: 4 with my>0 && shared==0 land in already_known,
        // the other 6 in new_to_you, none in both.
        let mut matches = Vec::new();
        for i in 0..4 {
            matches.push(entry(&format!("known{i}.com"), 2, 0, &[]));
        }
        for i in 0..3 {
            matches.push(entry(&format!("new{i}.com"), 0, 2, &[]));
        }
        for i in 0..3 {
            matches.push(entry(&format!("both{i}.com"), 1, 1, &[]));
        }
        let partition = partition_scoped(matches);
        assert_eq!(partition.already_known.len(), 4);
        assert_eq!(partition.new_to_you.len(), 6);
        assert!(partition
            .already_known
            .iter()
            .all(|m| m.company.domain.starts_with("known")));
    }
}

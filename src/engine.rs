//! Engine controller: owns the filter state, hunts, and memoized pipeline.
//!
//! Recomputation is a pure function of (sources, FilterState, hunts) and is
//! memoized against revision counters, so unrelated state changes (page
//! flips, event drains) never force a re-merge or re-filter. The controller
//! has an explicit lifecycle (created on view mount, `reset` on
//! logout/navigation) and is never a module-global singleton.

use chrono::{DateTime, Utc};

use crate::filter::evaluate_companies;
use crate::merge::merge_companies;
use crate::normalize::normalize_all;
use crate::rank::{hoist_hunt_matches, paginate, partition_scoped, sort_matches, PAGE_SIZE};
use crate::strength::StrengthPolicy;
use crate::types::{
    CompanyMatch, ConnectionStrength, FilterState, Hunt, HuntEvent, MergedCompany, Scope,
    SortStrategy, SourceData, SourceFilter, StructuralFilters, ViewResult,
};

/// Engine-level tunables.
#[derive(Debug, Clone, Copy)]
pub struct EnginePolicy {
    pub strength: StrengthPolicy,
    pub page_size: usize,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        EnginePolicy {
            strength: StrengthPolicy::default(),
            page_size: PAGE_SIZE,
        }
    }
}

struct MergedCache {
    data_rev: u64,
    companies: Vec<MergedCompany>,
}

struct RankedCache {
    data_rev: u64,
    view_rev: u64,
    matches: Vec<CompanyMatch>,
}

/// The relationship aggregation engine. One instance per mounted view.
pub struct ReachEngine {
    policy: EnginePolicy,
    sources: SourceData,
    filter: FilterState,
    sort: SortStrategy,
    hunts: Vec<Hunt>,
    page: usize,
    data_rev: u64,
    view_rev: u64,
    merged_cache: Option<MergedCache>,
    ranked_cache: Option<RankedCache>,
    recompute_count: u64,
    events: Vec<HuntEvent>,
}

impl ReachEngine {
    pub fn new(policy: EnginePolicy) -> Self {
        ReachEngine {
            policy,
            sources: SourceData::default(),
            filter: FilterState::default(),
            sort: SortStrategy::default(),
            hunts: Vec::new(),
            page: 0,
            data_rev: 0,
            view_rev: 0,
            merged_cache: None,
            ranked_cache: None,
            recompute_count: 0,
            events: Vec::new(),
        }
    }

    /// Drop all state except the policy (logout / navigation).
    pub fn reset(&mut self) {
        *self = ReachEngine::new(self.policy);
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn hunts(&self) -> &[Hunt] {
        &self.hunts
    }

    pub fn sort(&self) -> SortStrategy {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Replace the raw source lists (new fetch completed).
    pub fn set_sources(&mut self, sources: SourceData) {
        self.sources = sources;
        self.data_rev += 1;
        self.page = 0;
    }

    /// Mutate the filter state. Invalidates the view and resets the page
    /// only when the mutation actually changed something.
    pub fn update_filter(&mut self, mutate: impl FnOnce(&mut FilterState)) {
        let before = self.filter.clone();
        mutate(&mut self.filter);
        if self.filter != before {
            self.view_rev += 1;
            self.page = 0;
        }
    }

    /// Scope to one space or connection (or clear the scope). Selecting a
    /// scope clears the coarse source/strength filters: the two are
    /// mutually exclusive at the controller level, the evaluator itself
    /// never auto-clears.
    pub fn set_scope(&mut self, scope: Option<Scope>) {
        self.update_filter(|f| {
            if scope.is_some() {
                f.source = SourceFilter::All;
                f.strength = None;
            }
            f.scope = scope;
        });
    }

    pub fn set_source_filter(&mut self, source: SourceFilter) {
        self.update_filter(|f| f.source = source);
    }

    pub fn set_strength_filter(&mut self, strength: Option<ConnectionStrength>) {
        self.update_filter(|f| f.strength = strength);
    }

    /// Apply a free-text search. Called on explicit submit only, never per
    /// keystroke.
    pub fn submit_search(&mut self, search: Option<String>) {
        self.update_filter(|f| {
            f.search = search.filter(|s| !s.trim().is_empty());
        });
    }

    /// Select (or clear) a hunt as the active filter.
    pub fn select_hunt(&mut self, hunt_id: Option<String>) {
        self.update_filter(|f| f.active_hunt_id = hunt_id);
    }

    pub fn set_sort(&mut self, sort: SortStrategy) {
        if self.sort != sort {
            self.sort = sort;
            // Ordering changed, result size did not: keep the page index.
            self.view_rev += 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    // -----------------------------------------------------------------------
    // Hunts
    // -----------------------------------------------------------------------

    pub fn add_hunt(&mut self, hunt: Hunt) {
        self.events.push(HuntEvent::Created(hunt.clone()));
        self.hunts.push(hunt);
        self.view_rev += 1;
    }

    pub fn delete_hunt(&mut self, hunt_id: &str) {
        let before = self.hunts.len();
        self.hunts.retain(|h| h.id != hunt_id);
        if self.hunts.len() == before {
            return;
        }
        self.events.push(HuntEvent::Deleted(hunt_id.to_string()));
        if self.filter.active_hunt_id.as_deref() == Some(hunt_id) {
            self.filter.active_hunt_id = None;
            self.page = 0;
        }
        self.view_rev += 1;
    }

    pub fn set_hunt_active(&mut self, hunt_id: &str, is_active: bool) {
        if let Some(hunt) = self.hunts.iter_mut().find(|h| h.id == hunt_id) {
            if hunt.is_active != is_active {
                hunt.is_active = is_active;
                self.view_rev += 1;
            }
        }
    }

    /// Snapshot the current keyword list and structural filters into a new
    /// hunt ("save as hunt" after an AI search).
    pub fn save_search_as_hunt(&mut self, title: &str) -> Hunt {
        let filters = if self.filter.structural.is_empty() {
            None
        } else {
            Some(self.filter.structural.clone())
        };
        let hunt = Hunt::new(title, &self.filter.ai_keywords, filters);
        self.add_hunt(hunt.clone());
        hunt
    }

    /// Hunt lifecycle events for the external persistence collaborator.
    pub fn drain_events(&mut self) -> Vec<HuntEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Bridge integration
    // -----------------------------------------------------------------------

    /// Install an NL-parsed search: structural fields replace the current
    /// structural filters (clearing any scope or selected hunt), and the
    /// keyword list is swapped in whole, never left partially updated.
    pub fn apply_parsed_query(&mut self, mut filters: StructuralFilters, keywords: Vec<String>) {
        self.update_filter(|f| {
            f.scope = None;
            f.active_hunt_id = None;
            // Coarse source/strength parsed from the query lift out of the
            // structural object into the top-level filters.
            if let Some(source) = filters.source.take() {
                f.source = source;
            }
            if let Some(strength) = filters.strength.take() {
                f.strength = Some(strength);
            }
            f.structural = filters;
            f.ai_keywords = keywords;
        });
    }

    /// Distinct contact countries across all sources, for the NL-parsing
    /// request.
    pub fn available_countries(&self) -> Vec<String> {
        let mut countries = std::collections::BTreeSet::new();
        let reach_contacts = self
            .sources
            .space_reach
            .iter()
            .flat_map(|s| s.companies.iter())
            .chain(
                self.sources
                    .connection_reach
                    .iter()
                    .flat_map(|c| c.companies.iter()),
            )
            .flat_map(|company| company.contacts.iter());
        for contact in self.sources.my_contacts.iter().chain(reach_contacts) {
            if let Some(country) = contact.country.as_deref() {
                countries.insert(country.to_string());
            }
        }
        countries.into_iter().collect()
    }

    /// Names of the user's joined spaces, for the NL-parsing request.
    pub fn available_space_names(&self) -> Vec<String> {
        self.sources
            .space_reach
            .iter()
            .map(|s| s.space_name.clone())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Recomputation
    // -----------------------------------------------------------------------

    /// Compute the display-ready view using the current wall clock.
    pub fn compute(&mut self) -> ViewResult {
        self.compute_at(Utc::now())
    }

    /// Compute the display-ready view at an explicit instant (deterministic
    /// under test; one clock reading per pass).
    pub fn compute_at(&mut self, now: DateTime<Utc>) -> ViewResult {
        self.ensure_ranked(now);
        let matches = self
            .ranked_cache
            .as_ref()
            .map(|c| c.matches.clone())
            .unwrap_or_default();

        if self.filter.scope.is_some() {
            // Scoped views render both partitions in full instead of paging.
            ViewResult::Scoped(partition_scoped(matches))
        } else {
            ViewResult::Paged(paginate(matches, self.page, self.policy.page_size))
        }
    }

    fn ensure_merged(&mut self, now: DateTime<Utc>) {
        let fresh = self
            .merged_cache
            .as_ref()
            .is_some_and(|c| c.data_rev == self.data_rev);
        if fresh {
            return;
        }
        let normalized = normalize_all(&self.sources, &self.policy.strength, now);
        let companies = merge_companies(normalized);
        log::debug!(
            "reach engine: merged {} companies from {} own / {} spaces / {} connections",
            companies.len(),
            self.sources.my_contacts.len(),
            self.sources.space_reach.len(),
            self.sources.connection_reach.len(),
        );
        self.merged_cache = Some(MergedCache {
            data_rev: self.data_rev,
            companies,
        });
    }

    fn ensure_ranked(&mut self, now: DateTime<Utc>) {
        let fresh = self
            .ranked_cache
            .as_ref()
            .is_some_and(|c| c.data_rev == self.data_rev && c.view_rev == self.view_rev);
        if fresh {
            return;
        }
        self.ensure_merged(now);
        let companies = self
            .merged_cache
            .as_ref()
            .map(|c| c.companies.as_slice())
            .unwrap_or(&[]);

        let mut matches = evaluate_companies(companies, &self.filter, &self.hunts, now);
        sort_matches(&mut matches, self.sort);
        if let Some(active) = self.filter.active_hunt_id.as_deref() {
            hoist_hunt_matches(&mut matches, active);
        }
        self.recompute_count += 1;
        self.ranked_cache = Some(RankedCache {
            data_rev: self.data_rev,
            view_rev: self.view_rev,
            matches,
        });
    }

    /// How many times the filtered view was rebuilt (memoization telemetry).
    #[cfg(test)]
    pub(crate) fn recompute_count(&self) -> u64 {
        self.recompute_count
    }
}

impl Default for ReachEngine {
    fn default() -> Self {
        ReachEngine::new(EnginePolicy::default())
    }
}

//! Core domain types for the reach engine.
//!
//! Three raw relationship sources (own contacts, space reach, connection
//! reach) are normalized into a common contact shape, merged into one
//! `MergedCompany` per domain, then filtered and ranked. All display-facing
//! types serialize to camelCase JSON for the UI layer.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::funding::FundingRound;

// ---------------------------------------------------------------------------
// Strength & provenance
// ---------------------------------------------------------------------------

/// Three-tier relationship strength derived from recency and meeting
/// frequency. Ordering is strong-tightest: `Strong < Medium < Weak`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStrength {
    Strong,
    Medium,
    Weak,
}

impl ConnectionStrength {
    /// Sort rank: strong(0) < medium(1) < weak(2); no strength at all ranks 3.
    pub fn rank(strength: Option<ConnectionStrength>) -> u8 {
        match strength {
            Some(ConnectionStrength::Strong) => 0,
            Some(ConnectionStrength::Medium) => 1,
            Some(ConnectionStrength::Weak) => 2,
            None => 3,
        }
    }
}

/// Which source contributed a contact to a merged company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Provenance {
    /// The user's own contact list.
    Mine,
    /// Shared by a space the user belongs to.
    Space(String),
    /// Shared by an accepted 1:1 connection.
    Connection(String),
}

// ---------------------------------------------------------------------------
// Raw input shapes (supplied by the data-fetching collaborator)
// ---------------------------------------------------------------------------

/// Company-level enrichment carried on a contact record. All fields are
/// advisory; a missing field never matches a positive structural filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEnrichment {
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    /// Raw revenue string as supplied upstream (e.g. "$1.2M").
    #[serde(default)]
    pub revenue: Option<String>,
    /// Raw funding round string (e.g. "Series A"). Normalized on demand via
    /// `funding::FundingRound`.
    #[serde(default)]
    pub funding_round: Option<String>,
    #[serde(default)]
    pub last_funding_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// When the enrichment was fetched. Presence marks a company as enriched;
    /// first-write-wins during merging keys off this.
    #[serde(default)]
    pub enriched_at: Option<DateTime<Utc>>,
}

/// A raw contact record from any of the three sources. Owned by whichever
/// collaborator fetched it; immutable for the duration of one aggregation
/// pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    pub id: String,
    pub name: String,
    /// Unique within a source. Dedup across sources is by email, not id.
    pub email: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_domain: Option<String>,
    pub last_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub meetings_count: u32,
    #[serde(default)]
    pub first_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub company_data: Option<CompanyEnrichment>,
}

/// A company entry inside a space's or connection's shared reach.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachCompany {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub company_data: Option<CompanyEnrichment>,
    #[serde(default)]
    pub contacts: Vec<RawContact>,
}

/// Companies visible through one joined space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceReach {
    pub space_id: String,
    pub space_name: String,
    #[serde(default)]
    pub companies: Vec<ReachCompany>,
}

/// Companies visible through one accepted 1:1 connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReach {
    pub connection_id: String,
    pub connection_name: String,
    #[serde(default)]
    pub companies: Vec<ReachCompany>,
}

/// The three independently-fetched source lists. Any of them may be partial
/// or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceData {
    #[serde(default)]
    pub my_contacts: Vec<RawContact>,
    #[serde(default)]
    pub space_reach: Vec<SpaceReach>,
    #[serde(default)]
    pub connection_reach: Vec<ConnectionReach>,
}

// ---------------------------------------------------------------------------
// Normalized & merged shapes
// ---------------------------------------------------------------------------

/// A raw contact projected to the common shape, tagged with provenance.
/// Created fresh on every aggregation pass; never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedContact {
    pub id: String,
    pub name: String,
    /// Lower-cased so dedup is case-insensitive.
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Derived domain, or the literal `"unknown"` when none could be resolved.
    pub company_domain: String,
    pub last_seen_at: DateTime<Utc>,
    pub meetings_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub provenance: Provenance,
    /// Computed for `mine` contacts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<ConnectionStrength>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_data: Option<CompanyEnrichment>,
}

/// Whether a merged company is reachable through the user's own contacts,
/// shared reach, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanySource {
    Mine,
    Shared,
    Both,
}

impl CompanySource {
    /// Relevance priority: both(0) > mine(1) > shared(2).
    pub fn priority(self) -> u8 {
        match self {
            CompanySource::Both => 0,
            CompanySource::Mine => 1,
            CompanySource::Shared => 2,
        }
    }
}

/// One company per derived domain, aggregated across all sources.
///
/// Invariants (maintained by the merger, covered by tests):
/// - an email appears in at most one of `my_contacts`/`shared_contacts`
/// - `total_count == my_contacts.len() + shared_contacts.len()`
/// - `source == Both` iff both counts are > 0
/// - enrichment, once set, is never overwritten within a pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCompany {
    pub domain: String,
    pub name: String,
    pub my_contacts: Vec<NormalizedContact>,
    /// Space- and connection-sourced contacts, deduplicated by email against
    /// each other and against `my_contacts`.
    pub shared_contacts: Vec<NormalizedContact>,
    pub my_count: usize,
    pub shared_count: usize,
    pub total_count: usize,
    /// Strongest strength among `my_contacts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_strength: Option<ConnectionStrength>,
    pub source: CompanySource,
    /// Spaces through which this company is reachable. Ordered for
    /// deterministic output.
    pub space_ids: BTreeSet<String>,
    pub connection_ids: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<CompanyEnrichment>,
    // Contact-level location/profile fields, first-write-wins like enrichment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Filters & hunts
// ---------------------------------------------------------------------------

/// Coarse source filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    #[default]
    All,
    Mine,
    Shared,
    Both,
}

/// View scope: a single space or a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Scope {
    Space(String),
    Connection(String),
}

/// An inclusive employee-count band, e.g. `51-200` or `5001+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRange {
    pub min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl EmployeeRange {
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

/// An inclusive numeric band over a continuous quantity (revenue in USD
/// millions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericRange {
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// Structural filter values. Shared between the live `FilterState`, a hunt's
/// saved snapshot, and the NL-parsed filter object, so all three evaluate
/// through the same code path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFilters {
    #[serde(default)]
    pub employee_ranges: Vec<EmployeeRange>,
    /// USD millions.
    #[serde(default)]
    pub revenue_ranges: Vec<NumericRange>,
    #[serde(default)]
    pub founded_after: Option<i32>,
    #[serde(default)]
    pub founded_before: Option<i32>,
    #[serde(default)]
    pub funding_rounds: Vec<FundingRound>,
    /// Companies whose last funding event is at most this many months old.
    #[serde(default)]
    pub funded_within_months: Option<u32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub source: Option<SourceFilter>,
    #[serde(default)]
    pub strength: Option<ConnectionStrength>,
}

impl StructuralFilters {
    /// True when no structural dimension is present at all. A hunt whose
    /// snapshot is empty (and which has no keywords) never matches anything.
    pub fn is_empty(&self) -> bool {
        self.employee_ranges.is_empty()
            && self.revenue_ranges.is_empty()
            && self.founded_after.is_none()
            && self.founded_before.is_none()
            && self.funding_rounds.is_empty()
            && self.funded_within_months.is_none()
            && self.country.is_none()
            && self.city.is_none()
            && self.technologies.is_empty()
            && self.source.is_none()
            && self.strength.is_none()
    }
}

/// A saved search: keywords and/or a structural filter snapshot that can be
/// toggled on to tag matching companies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunt {
    pub id: String,
    pub title: String,
    /// Lower-cased tokens, each longer than 2 characters. Shorter tokens are
    /// dropped at construction.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub filters: Option<StructuralFilters>,
    #[serde(default = "default_hunt_active")]
    pub is_active: bool,
}

fn default_hunt_active() -> bool {
    true
}

impl Hunt {
    /// Create a hunt with a fresh id. Keywords are lower-cased and tokens of
    /// length <= 2 are dropped.
    pub fn new(title: &str, keywords: &[String], filters: Option<StructuralFilters>) -> Self {
        Hunt {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            keywords: crate::util::hunt_keywords(keywords),
            filters,
            is_active: true,
        }
    }
}

/// Result ordering strategy. `Relevance` preserves the merger's natural
/// output order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    #[default]
    Relevance,
    Name,
    Contacts,
    Strength,
}

/// The full set of active filter predicates. Mutated only by explicit user
/// actions or by the query translator bridge; read by the evaluator on every
/// recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub source: SourceFilter,
    #[serde(default)]
    pub strength: Option<ConnectionStrength>,
    #[serde(default)]
    pub scope: Option<Scope>,
    /// Free-text search. Only set on explicit submit, never per keystroke.
    #[serde(default)]
    pub search: Option<String>,
    /// AI-expanded or manually entered keyword list (OR-combined).
    #[serde(default)]
    pub ai_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    /// Connected-date year tags; empty = wildcard.
    #[serde(default)]
    pub connected_years: Vec<i32>,
    /// Connected-date month tags (1-12); empty = wildcard.
    #[serde(default)]
    pub connected_months: Vec<u32>,
    #[serde(default)]
    pub structural: StructuralFilters,
    /// A hunt explicitly selected as the active filter. Turns hunt matching
    /// from advisory tagging into exclusion.
    #[serde(default)]
    pub active_hunt_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

/// A merged company that passed the active filters, tagged with the hunts it
/// matches. Hunt tags are advisory and recomputed per pass, never persisted
/// on the company itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMatch {
    #[serde(flatten)]
    pub company: MergedCompany,
    pub matching_hunt_ids: Vec<String>,
}

/// One fixed-size page of ranked results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPage {
    pub items: Vec<CompanyMatch>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Scoped (single space / single connection) views split the result instead
/// of paginating: `already_known` holds companies the user can already reach
/// alone, everything else is new reach. Exhaustive and disjoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedPartition {
    pub new_to_you: Vec<CompanyMatch>,
    pub already_known: Vec<CompanyMatch>,
}

/// Display-ready engine output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "view")]
pub enum ViewResult {
    Paged(CompanyPage),
    Scoped(ScopedPartition),
}

/// Hunt lifecycle events for the external persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "hunt")]
pub enum HuntEvent {
    Created(Hunt),
    Deleted(String),
}

//! Reachlens: relationship aggregation and filtered search.
//!
//! Merges contact reach from three sources (your own network, shared
//! spaces, 1:1 connections) into one deduplicated per-company view, then
//! filters, ranks, and paginates it deterministically. Saved "hunts" tag
//! matching companies across every view, and an async bridge translates
//! natural-language queries into filter state with last-request-wins
//! semantics.
//!
//! The pipeline is pure and synchronous (`normalize` → `merge` → `filter`
//! → `rank`); [`engine::ReachEngine`] owns the state and memoizes
//! recomputation, and only [`bridge::QueryBridge`] is async.

pub mod bridge;
pub mod engine;
pub mod error;
pub mod filter;
pub mod funding;
pub mod merge;
pub mod normalize;
pub mod rank;
pub mod strength;
pub mod types;
pub mod util;

pub use bridge::{KeywordExpander, ParseRequest, ParsedQuery, QueryBridge, QueryParser, SearchOutcome};
pub use engine::{EnginePolicy, ReachEngine};
pub use error::BridgeError;
pub use strength::StrengthPolicy;
pub use types::{
    CompanyMatch, CompanyPage, CompanySource, ConnectionStrength, FilterState, Hunt, HuntEvent,
    MergedCompany, Scope, ScopedPartition, SortStrategy, SourceData, SourceFilter,
    StructuralFilters, ViewResult,
};

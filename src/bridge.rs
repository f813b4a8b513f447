//! Query translator bridge: turns a natural-language query into filter
//! state via two external collaborators (a parser and a keyword expander).
//!
//! The bridge is strictly last-request-wins. Every submission takes a fresh
//! generation token; after each await the token is re-checked, and a stale
//! submission discards its result instead of touching the engine. Filter
//! state is therefore only ever written by the newest submission, and the
//! keyword list is swapped in whole.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::engine::ReachEngine;
use crate::error::BridgeError;
use crate::types::StructuralFilters;
use crate::util::normalize_keywords;

/// Context handed to the NL parser alongside the raw query, so it can
/// ground country and space references in values that actually exist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub query: String,
    pub available_countries: Vec<String>,
    pub available_space_names: Vec<String>,
}

/// Parser output: structural filter fields plus free-form semantic
/// keywords that structural filters cannot express.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    #[serde(default)]
    pub filters: StructuralFilters,
    #[serde(default)]
    pub semantic_keywords: Vec<String>,
    /// Human-readable summary of how the query was understood, passed
    /// through to the UI untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Translates a natural-language query into a [`ParsedQuery`].
#[async_trait]
pub trait QueryParser: Send + Sync {
    async fn parse(&self, request: ParseRequest) -> Result<ParsedQuery, BridgeError>;
}

/// Expands a query description into related terms (synonyms, adjacent
/// industry vocabulary). Receives one composed text: the parser's
/// explanation, when present, followed by the semantic keywords.
#[async_trait]
pub trait KeywordExpander: Send + Sync {
    async fn expand(&self, text: &str) -> Result<Vec<String>, BridgeError>;
}

/// Terminal state of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SearchOutcome {
    /// Parse and expansion both succeeded; filters are installed.
    Applied {
        keywords: Vec<String>,
        explanation: Option<String>,
    },
    /// Parse succeeded but expansion failed; the un-expanded semantic
    /// keywords are installed instead.
    FallbackApplied {
        keywords: Vec<String>,
        explanation: Option<String>,
        error: String,
    },
    /// Parsing failed. Filter state is left exactly as it was.
    ParseFailed { error: String },
    /// A newer submission arrived while this one was in flight; its result
    /// was discarded without touching the engine.
    Superseded,
}

/// Serializes NL submissions against a shared engine handle.
pub struct QueryBridge {
    parser: Arc<dyn QueryParser>,
    expander: Arc<dyn KeywordExpander>,
    generation: AtomicU64,
}

impl QueryBridge {
    pub fn new(parser: Arc<dyn QueryParser>, expander: Arc<dyn KeywordExpander>) -> Self {
        QueryBridge {
            parser,
            expander,
            generation: AtomicU64::new(0),
        }
    }

    fn is_stale(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != token
    }

    /// Submit one query. Parses, expands, and installs the result into the
    /// engine unless a newer submission superseded this one along the way.
    ///
    /// Single attempt per collaborator, no internal retries: expansion
    /// failure degrades to the raw semantic keywords, parse failure leaves
    /// the engine untouched.
    pub async fn submit(&self, engine: &Mutex<ReachEngine>, query: &str) -> SearchOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let request = {
            let engine = engine.lock();
            ParseRequest {
                query: query.to_string(),
                available_countries: engine.available_countries(),
                available_space_names: engine.available_space_names(),
            }
        };

        let parsed = match self.parser.parse(request).await {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("NL query parse failed: {err}");
                return SearchOutcome::ParseFailed {
                    error: err.to_string(),
                };
            }
        };
        if self.is_stale(token) {
            log::debug!("NL query superseded after parse, discarding");
            return SearchOutcome::Superseded;
        }

        let semantic = normalize_keywords(&parsed.semantic_keywords);
        let (keywords, expansion_error) = if semantic.is_empty() {
            // Nothing to expand; a purely structural query is still valid.
            (Vec::new(), None)
        } else {
            // The expander sees the parser's own reading of the query plus
            // the semantic keywords as one text.
            let text = match parsed.explanation.as_deref() {
                Some(explanation) => format!("{explanation} {}", semantic.join(" ")),
                None => semantic.join(" "),
            };
            match self.expander.expand(&text).await {
                Ok(expanded) => {
                    // Originals first, expansions after, deduped.
                    let mut combined = semantic.clone();
                    combined.extend(expanded);
                    (normalize_keywords(&combined), None)
                }
                Err(err) => {
                    log::warn!("keyword expansion failed, using raw keywords: {err}");
                    (semantic.clone(), Some(err))
                }
            }
        };

        // The authoritative staleness check holds the engine lock, so a
        // newer submission cannot finish between the check and the apply.
        {
            let mut engine = engine.lock();
            if self.is_stale(token) {
                log::debug!("NL query superseded after expansion, discarding");
                return SearchOutcome::Superseded;
            }
            engine.apply_parsed_query(parsed.filters, keywords.clone());
        }

        match expansion_error {
            None => SearchOutcome::Applied {
                keywords,
                explanation: parsed.explanation,
            },
            Some(err) => SearchOutcome::FallbackApplied {
                keywords,
                explanation: parsed.explanation,
                error: err.to_string(),
            },
        }
    }
}

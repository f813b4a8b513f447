//! Connection strength classification (pure, no I/O).
//!
//! Strength is derived from how recently and how often the user has met a
//! contact. The numeric cutoffs are product policy and configurable; two
//! rules are hard invariants regardless of policy values:
//! - a single meeting is never `Strong` or `Medium`
//! - the three tiers are ordered strong-tightest, weak-loosest

use chrono::{DateTime, Utc};

use crate::types::ConnectionStrength;

/// Tunable classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthPolicy {
    /// Seen within this many days (and meeting the frequency floor) → strong.
    pub strong_recency_days: i64,
    /// Seen within this many days → at least medium.
    pub medium_recency_days: i64,
    /// Minimum meetings for a strong classification.
    pub strong_meetings_floor: u32,
}

impl Default for StrengthPolicy {
    fn default() -> Self {
        StrengthPolicy {
            strong_recency_days: 7,
            medium_recency_days: 21,
            strong_meetings_floor: 2,
        }
    }
}

/// Classify a contact's strength at an explicit point in time.
///
/// `now` is injected so classification is deterministic under test and so a
/// whole aggregation pass shares one clock reading.
pub fn classify_at(
    last_seen_at: DateTime<Utc>,
    meetings_count: u32,
    policy: &StrengthPolicy,
    now: DateTime<Utc>,
) -> ConnectionStrength {
    // One meeting is never more than weak, regardless of recency.
    if meetings_count <= 1 {
        return ConnectionStrength::Weak;
    }

    // A future last_seen_at (clock skew upstream) counts as just-seen.
    let days_since = (now - last_seen_at).num_days().max(0);

    if days_since <= policy.strong_recency_days && meetings_count >= policy.strong_meetings_floor {
        ConnectionStrength::Strong
    } else if days_since <= policy.medium_recency_days {
        ConnectionStrength::Medium
    } else {
        ConnectionStrength::Weak
    }
}

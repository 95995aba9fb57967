use serde::{Deserialize, Serialize};

// ============================================================================
// Feature Usage
// ============================================================================

/// One feature's metering state, as persisted in the ledger.
///
/// Timestamps are RFC 3339 UTC strings; a fixed `+00:00` offset keeps their
/// lexicographic order chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub id: i64,
    pub feature_name: String,
    pub usage_count: i64,
    /// Maximum permitted invocations; 0 means unlimited.
    pub usage_limit: i64,
    pub first_used: String,
    pub last_used: String,
    /// Reserved flag; no code path currently deactivates a record.
    pub is_active: bool,
    pub notes: Option<String>,
}

/// How many invocations a feature has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemainingUsage {
    Unlimited,
    Remaining(i64),
}

impl FeatureUsage {
    /// Invocations left before the ceiling, or `Unlimited` when no ceiling
    /// is set.
    pub fn remaining_usage(&self) -> RemainingUsage {
        if self.usage_limit == 0 {
            RemainingUsage::Unlimited
        } else {
            RemainingUsage::Remaining((self.usage_limit - self.usage_count).max(0))
        }
    }

    /// Whether the feature has consumed its entire ceiling.
    pub fn is_limit_reached(&self) -> bool {
        self.usage_limit > 0 && self.usage_count >= self.usage_limit
    }

    /// Ceiling consumption as 0–100; always 0 for unlimited features.
    pub fn usage_percentage(&self) -> f64 {
        if self.usage_limit == 0 {
            0.0
        } else {
            (self.usage_count as f64 / self.usage_limit as f64 * 100.0).min(100.0)
        }
    }
}

// ============================================================================
// Usage Summary
// ============================================================================

/// Aggregate statistics computed over the full ledger at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_features: i64,
    pub active_features: i64,
    pub total_usage_count: i64,
    pub features_at_limit: i64,
    /// Feature with the highest usage count; ties go to the first record in
    /// ledger order (most recently used). `None` when the ledger is empty.
    pub most_used_feature: Option<String>,
    /// Most recent `last_used` across all records, RFC 3339 UTC.
    pub last_activity: Option<String>,
}

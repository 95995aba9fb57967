//! Domain layer for premium feature metering.
//!
//! The manager owns the limit policy: the store only knows how to read and
//! write rows, while every record-or-reject decision and the aggregate
//! summary live here.

use std::sync::{Mutex, PoisonError};

use crate::config::LedgerConfig;
use crate::db::models::{FeatureUsage, UsageSummary};
use crate::db::repos::feature_usage;
use crate::db::{self, DbPool};
use crate::error::AppError;

/// Records premium feature invocations and enforces per-feature ceilings.
///
/// All mutations run under one process-wide lock, for any feature name.
/// That sacrifices per-feature write concurrency for an at-most-one-writer
/// invariant over the read-check-write limit sequence.
pub struct UsageManager {
    pool: DbPool,
    write_lock: Mutex<()>,
}

impl UsageManager {
    /// Open (or create) the ledger at the configured path.
    pub fn open(config: &LedgerConfig) -> Result<Self, AppError> {
        let pool = db::init_db(config)?;
        Ok(Self::new(pool))
    }

    /// Wrap an already-initialized pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Record one invocation of `feature_name`, creating the record on
    /// first use.
    ///
    /// Returns `Ok(false)` without mutating anything when the feature has
    /// already consumed the ceiling stored on its record. The check runs
    /// against the previously stored limit, never the `usage_limit`
    /// argument; on every successful call the argument is persisted as the
    /// new ceiling. A limit of 0 means unlimited.
    pub fn record_usage(&self, feature_name: &str, usage_limit: i64) -> Result<bool, AppError> {
        if feature_name.trim().is_empty() {
            return Err(AppError::Validation("Feature name cannot be empty".into()));
        }

        // A poisoned lock only means another writer panicked mid-call;
        // every mutation is a single statement, so the ledger is intact.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = feature_usage::get(&self.pool, feature_name).map_err(|e| {
            tracing::error!(feature = %feature_name, error = %e, "Failed to read usage record");
            e
        })?;

        if let Some(ref usage) = current {
            if usage.usage_limit > 0 && usage.usage_count >= usage.usage_limit {
                tracing::warn!(
                    feature = %feature_name,
                    current = usage.usage_count,
                    limit = usage.usage_limit,
                    "Premium feature usage limit exceeded"
                );
                return Ok(false);
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let result = match current {
            None => feature_usage::insert_new(&self.pool, feature_name, usage_limit, &now),
            Some(_) => {
                feature_usage::increment_existing(&self.pool, feature_name, usage_limit, &now)
            }
        };
        if let Err(e) = result {
            tracing::error!(feature = %feature_name, error = %e, "Failed to record feature usage");
            return Err(e);
        }

        tracing::info!(feature = %feature_name, "Premium feature usage recorded");
        Ok(true)
    }

    /// Current record for one feature, if it has ever been used.
    pub fn get_feature_usage(&self, feature_name: &str) -> Result<Option<FeatureUsage>, AppError> {
        feature_usage::get(&self.pool, feature_name)
    }

    /// All records, most recently used first.
    pub fn get_all_feature_usage(&self) -> Result<Vec<FeatureUsage>, AppError> {
        feature_usage::list_all(&self.pool)
    }

    /// Zero a feature's count and restart its timestamps. A name with no
    /// record is a logged no-op, not an error.
    pub fn reset_feature_usage(&self, feature_name: &str) -> Result<(), AppError> {
        // Same lock as record_usage, so a reset can never interleave with
        // a concurrent increment.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = chrono::Utc::now().to_rfc3339();
        let affected = feature_usage::reset_usage(&self.pool, feature_name, &now).map_err(|e| {
            tracing::error!(feature = %feature_name, error = %e, "Failed to reset feature usage");
            e
        })?;

        if affected {
            tracing::info!(feature = %feature_name, "Premium feature usage reset");
        } else {
            tracing::warn!(feature = %feature_name, "No premium feature found to reset");
        }
        Ok(())
    }

    /// Aggregate statistics over a single full-ledger snapshot.
    ///
    /// `most_used_feature` ties go to the first record in ledger order,
    /// i.e. the most recently used of the tied features.
    pub fn usage_summary(&self) -> Result<UsageSummary, AppError> {
        let all = self.get_all_feature_usage().map_err(|e| {
            tracing::error!(error = %e, "Failed to generate usage summary");
            e
        })?;

        // Strictly-greater replacement keeps the first maximum seen.
        let mut most_used: Option<&FeatureUsage> = None;
        for usage in &all {
            match most_used {
                Some(best) if usage.usage_count <= best.usage_count => {}
                _ => most_used = Some(usage),
            }
        }
        let most_used = most_used.map(|u| u.feature_name.clone());
        let last_activity = all.iter().map(|u| u.last_used.clone()).max();

        Ok(UsageSummary {
            total_features: all.len() as i64,
            active_features: all.iter().filter(|u| u.is_active).count() as i64,
            total_usage_count: all.iter().map(|u| u.usage_count).sum(),
            features_at_limit: all.iter().filter(|u| u.is_limit_reached()).count() as i64,
            most_used_feature: most_used,
            last_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::db::models::RemainingUsage;

    fn manager() -> UsageManager {
        UsageManager::new(init_test_db().unwrap())
    }

    #[test]
    fn first_use_creates_record_with_count_one() {
        let m = manager();
        assert!(m.record_usage("Test Feature", 10).unwrap());

        let usage = m.get_feature_usage("Test Feature").unwrap().unwrap();
        assert_eq!(usage.usage_count, 1);
        assert_eq!(usage.usage_limit, 10);
        assert_eq!(usage.first_used, usage.last_used);
    }

    #[test]
    fn blank_name_is_rejected_before_storage() {
        let m = manager();
        assert!(matches!(
            m.record_usage("", 5),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            m.record_usage("   ", 5),
            Err(AppError::Validation(_))
        ));
        assert!(m.get_all_feature_usage().unwrap().is_empty());
    }

    #[test]
    fn limit_allows_exactly_limit_uses_then_rejects_idempotently() {
        let m = manager();
        for i in 1..=3 {
            assert!(m.record_usage("Limited Feature", 3).unwrap(), "call {i}");
        }

        // Rejection leaves the count pinned at the ceiling, every time.
        for _ in 0..2 {
            assert!(!m.record_usage("Limited Feature", 3).unwrap());
            let usage = m.get_feature_usage("Limited Feature").unwrap().unwrap();
            assert_eq!(usage.usage_count, 3);
            assert!(usage.is_limit_reached());
            assert_eq!(usage.remaining_usage(), RemainingUsage::Remaining(0));
        }
    }

    #[test]
    fn unlimited_feature_never_rejects() {
        let m = manager();
        for _ in 0..100 {
            assert!(m.record_usage("Unlimited Feature", 0).unwrap());
        }
        let usage = m.get_feature_usage("Unlimited Feature").unwrap().unwrap();
        assert_eq!(usage.usage_count, 100);
        assert!(!usage.is_limit_reached());
        assert_eq!(usage.remaining_usage(), RemainingUsage::Unlimited);
    }

    #[test]
    fn rejection_checks_the_stored_limit_not_the_argument() {
        let m = manager();
        assert!(m.record_usage("Tightened", 10).unwrap()); // stored 1/10

        // Passing limit 1 cannot reject this call; only history can.
        // The new limit is persisted, so the call after it is rejected.
        assert!(m.record_usage("Tightened", 1).unwrap());
        let usage = m.get_feature_usage("Tightened").unwrap().unwrap();
        assert_eq!(usage.usage_count, 2);
        assert_eq!(usage.usage_limit, 1);

        assert!(!m.record_usage("Tightened", 100).unwrap());

        // Raising the ceiling requires a reset first; the rejected call
        // above persisted nothing.
        let usage = m.get_feature_usage("Tightened").unwrap().unwrap();
        assert_eq!(usage.usage_count, 2);
        assert_eq!(usage.usage_limit, 1);
    }

    #[test]
    fn cloud_sync_scenario_ten_then_rejected() {
        let m = manager();
        for i in 1..=10 {
            assert!(m.record_usage("Cloud Sync", 10).unwrap(), "call {i}");
        }
        assert!(!m.record_usage("Cloud Sync", 10).unwrap());

        let usage = m.get_feature_usage("Cloud Sync").unwrap().unwrap();
        assert_eq!(usage.usage_count, 10);
        assert!(usage.is_limit_reached());
        assert_eq!(usage.remaining_usage(), RemainingUsage::Remaining(0));
    }

    #[test]
    fn reset_zeroes_count_and_missing_name_is_a_no_op() {
        let m = manager();
        for _ in 0..3 {
            m.record_usage("Reset Test", 10).unwrap();
        }
        m.reset_feature_usage("Reset Test").unwrap();

        let usage = m.get_feature_usage("Reset Test").unwrap().unwrap();
        assert_eq!(usage.usage_count, 0);
        assert_eq!(usage.first_used, usage.last_used);

        // After a reset the ceiling is available again.
        assert!(m.record_usage("Reset Test", 10).unwrap());

        m.reset_feature_usage("Never Seen").unwrap();
        assert_eq!(m.get_feature_usage("Never Seen").unwrap(), None);
    }

    #[test]
    fn summary_over_mixed_features() {
        let m = manager();
        for _ in 0..2 {
            m.record_usage("Feature A", 10).unwrap();
        }
        for _ in 0..5 {
            m.record_usage("Feature B", 5).unwrap();
        }
        m.record_usage("Feature C", 0).unwrap();

        let summary = m.usage_summary().unwrap();
        assert_eq!(summary.total_features, 3);
        assert_eq!(summary.active_features, 3);
        assert_eq!(summary.total_usage_count, 8);
        assert_eq!(summary.features_at_limit, 1);
        assert_eq!(summary.most_used_feature.as_deref(), Some("Feature B"));
        assert!(summary.last_activity.is_some());
    }

    #[test]
    fn summary_of_empty_ledger() {
        let m = manager();
        let summary = m.usage_summary().unwrap();
        assert_eq!(summary.total_features, 0);
        assert_eq!(summary.active_features, 0);
        assert_eq!(summary.total_usage_count, 0);
        assert_eq!(summary.features_at_limit, 0);
        assert_eq!(summary.most_used_feature, None);
        assert_eq!(summary.last_activity, None);
    }

    #[test]
    fn most_used_tie_break_is_deterministic() {
        let m = manager();
        m.record_usage("Tie A", 0).unwrap();
        m.record_usage("Tie B", 0).unwrap();

        // Same counts: repeated summaries must agree with each other and
        // with ledger order.
        let first = m.usage_summary().unwrap().most_used_feature;
        let second = m.usage_summary().unwrap().most_used_feature;
        assert_eq!(first, second);
        let ledger_first = m.get_all_feature_usage().unwrap()[0].feature_name.clone();
        assert_eq!(first.as_deref(), Some(ledger_first.as_str()));
    }

    #[test]
    fn concurrent_recording_loses_no_updates() {
        use std::sync::Arc;

        let m = Arc::new(manager());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let m = Arc::clone(&m);
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    assert!(m.record_usage("Shared Feature", 0).unwrap());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let usage = m.get_feature_usage("Shared Feature").unwrap().unwrap();
        assert_eq!(usage.usage_count, 100);
    }

    #[test]
    fn concurrent_limited_recording_accepts_exactly_the_ceiling() {
        use std::sync::atomic::{AtomicI64, Ordering};
        use std::sync::Arc;

        let m = Arc::new(manager());
        let accepted = Arc::new(AtomicI64::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let m = Arc::clone(&m);
            let accepted = Arc::clone(&accepted);
            handles.push(std::thread::spawn(move || {
                for _ in 0..10 {
                    if m.record_usage("Contended", 15).unwrap() {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(accepted.load(Ordering::SeqCst), 15);
        let usage = m.get_feature_usage("Contended").unwrap().unwrap();
        assert_eq!(usage.usage_count, 15);
    }
}

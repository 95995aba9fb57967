//! Store primitives for the `PremiumFeatureUsage` table.
//!
//! Each function is a single SQL statement, so every mutation commits
//! atomically at the storage layer. Serializing the read-check-write limit
//! sequence is the manager's job, not the store's.

use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::FeatureUsage;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_usage(row: &Row) -> rusqlite::Result<FeatureUsage> {
    Ok(FeatureUsage {
        id: row.get("Id")?,
        feature_name: row.get("FeatureName")?,
        usage_count: row.get("UsageCount")?,
        usage_limit: row.get("UsageLimit")?,
        first_used: row.get("FirstUsed")?,
        last_used: row.get("LastUsed")?,
        is_active: row.get::<_, i64>("IsActive")? != 0,
        notes: row.get("Notes")?,
    })
}

/// Point lookup by feature name. A miss is `Ok(None)`, not an error.
pub fn get(pool: &DbPool, feature_name: &str) -> Result<Option<FeatureUsage>, AppError> {
    let conn = pool.get()?;
    let record = conn
        .query_row(
            "SELECT Id, FeatureName, UsageCount, LastUsed, FirstUsed, UsageLimit, IsActive, Notes
             FROM PremiumFeatureUsage
             WHERE FeatureName = ?1",
            params![feature_name],
            row_to_usage,
        )
        .optional()?;
    Ok(record)
}

/// Create the record for a feature seen for the first time: count 1, both
/// timestamps set to `now`.
pub fn insert_new(
    pool: &DbPool,
    feature_name: &str,
    usage_limit: i64,
    now: &str,
) -> Result<(), AppError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO PremiumFeatureUsage
         (FeatureName, UsageCount, LastUsed, FirstUsed, UsageLimit, IsActive)
         VALUES (?1, 1, ?2, ?2, ?3, 1)",
        params![feature_name, now, usage_limit],
    )?;
    Ok(())
}

/// Bump an existing record: count + 1, `LastUsed` refreshed, and the limit
/// overwritten with the caller's latest value. One UPDATE, so the pair
/// commits together.
pub fn increment_existing(
    pool: &DbPool,
    feature_name: &str,
    usage_limit: i64,
    now: &str,
) -> Result<(), AppError> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE PremiumFeatureUsage
         SET UsageCount = UsageCount + 1, LastUsed = ?1, UsageLimit = ?2
         WHERE FeatureName = ?3",
        params![now, usage_limit, feature_name],
    )?;
    Ok(())
}

/// All records, most recently used first; equal timestamps fall back to
/// insertion order.
pub fn list_all(pool: &DbPool) -> Result<Vec<FeatureUsage>, AppError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT Id, FeatureName, UsageCount, LastUsed, FirstUsed, UsageLimit, IsActive, Notes
         FROM PremiumFeatureUsage
         ORDER BY LastUsed DESC, Id ASC",
    )?;
    let rows = stmt.query_map([], row_to_usage)?;
    let results: Vec<FeatureUsage> = rows.collect::<Result<Vec<_>, _>>().map_err(AppError::Database)?;
    Ok(results)
}

/// Zero the usage count and restart both timestamps at `now`. Returns
/// whether a row was actually affected so the caller can log a miss.
pub fn reset_usage(pool: &DbPool, feature_name: &str, now: &str) -> Result<bool, AppError> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE PremiumFeatureUsage
         SET UsageCount = 0, FirstUsed = ?1, LastUsed = ?1
         WHERE FeatureName = ?2",
        params![now, feature_name],
    )?;
    Ok(rows > 0)
}

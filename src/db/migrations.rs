use rusqlite::Connection;

use crate::error::AppError;

/// Run the idempotent schema migration. Safe to call on every open.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running ledger schema migration");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Feature usage ledger schema ready");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Premium Feature Usage
-- ============================================================================

CREATE TABLE IF NOT EXISTS PremiumFeatureUsage (
    Id            INTEGER PRIMARY KEY AUTOINCREMENT,
    FeatureName   TEXT NOT NULL UNIQUE,
    UsageCount    INTEGER NOT NULL DEFAULT 0,
    LastUsed      DATETIME NOT NULL,
    FirstUsed     DATETIME NOT NULL,
    UsageLimit    INTEGER NOT NULL DEFAULT 0,
    IsActive      BOOLEAN NOT NULL DEFAULT 1,
    Notes         TEXT
);
CREATE INDEX IF NOT EXISTS idx_pfu_last_used ON PremiumFeatureUsage(LastUsed);

"#;

//! Premium feature usage metering for the inventory desktop app.
//!
//! The ledger records how many times named premium features are invoked,
//! enforces optional per-feature ceilings, and derives aggregate
//! statistics. State lives in a single local SQLite file; all writes are
//! serialized through one process-wide lock so the read-check-write limit
//! sequence can never race.
//!
//! ```no_run
//! use usage_ledger::{LedgerConfig, UsageManager};
//!
//! # fn main() -> Result<(), usage_ledger::AppError> {
//! let manager = UsageManager::open(&LedgerConfig::default())?;
//! if manager.record_usage("Cloud Sync", 10)? {
//!     println!("recorded");
//! } else {
//!     println!("limit reached");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod usage;

pub use config::LedgerConfig;
pub use db::models::{FeatureUsage, RemainingUsage, UsageSummary};
pub use error::AppError;
pub use usage::UsageManager;

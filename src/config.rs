use std::path::{Path, PathBuf};

/// Default ledger filename, created in the working directory when no
/// explicit path is configured.
pub const DEFAULT_DB_FILE: &str = "premium_features.db";

/// Where the ledger database file lives.
///
/// The path is the only configuration input the ledger takes; everything
/// else (schema, pragmas) is fixed at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub db_path: PathBuf,
}

impl LedgerConfig {
    /// Ledger at an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { db_path: path.into() }
    }

    /// Ledger inside the per-user data directory for the given app name,
    /// e.g. `~/.local/share/<app_name>/premium_features.db` on Linux.
    /// Falls back to the working directory when no data dir is known.
    pub fn in_data_dir(app_name: &str) -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            db_path: base.join(app_name).join(DEFAULT_DB_FILE),
        }
    }

    /// Directory that must exist before the database file can be created.
    pub fn parent_dir(&self) -> Option<&Path> {
        self.db_path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::at_path(DEFAULT_DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_working_directory_file() {
        let config = LedgerConfig::default();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE));
        assert_eq!(config.parent_dir(), None);
    }

    #[test]
    fn data_dir_path_ends_with_app_and_filename() {
        let config = LedgerConfig::in_data_dir("ssec-inventory");
        assert!(config.db_path.ends_with(
            Path::new("ssec-inventory").join(DEFAULT_DB_FILE)
        ));
    }
}

// src/config.rs

use std::{env, path::PathBuf};

pub const DEFAULT_EXPORT_FILE: &str = "query-results.csv";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings for the CLI. The engine itself takes no configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory CSV exports are written to.
    pub export_dir: PathBuf,
    pub export_filename: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            export_dir: PathBuf::from("."),
            export_filename: DEFAULT_EXPORT_FILE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// `RESULTKIT_EXPORT_DIR`, `RESULTKIT_EXPORT_FILE`, `RESULTKIT_LOG`;
    /// unset or blank variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        Settings {
            export_dir: get("RESULTKIT_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            export_filename: get("RESULTKIT_EXPORT_FILE").unwrap_or(defaults.export_filename),
            log_filter: get("RESULTKIT_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

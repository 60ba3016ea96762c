//! Configuration file handling.
//!
//! Loads `.table_deps.json` from the current directory, or the file given
//! with `--config`. Every field is optional and falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{AdvisoryThresholds, CallSiteOptions, EngineOptions, SqlOptions};

/// Name of the implicit configuration file.
pub const DEFAULT_CONFIG_FILE: &str = ".table_deps.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Dialect, table-name case policy, auxiliary table tagging
    pub sql: SqlOptions,
    /// Call-site heuristic settings
    pub call_sites: CallSiteOptions,
    /// Advisory thresholds
    pub advisories: AdvisoryThresholds,
    /// Fail when skipped queries plus unresolved calls exceed this
    pub max_errors: Option<usize>,
    /// Worker threads for classification and resolution; rayon's default when unset
    pub max_workers: Option<usize>,
    /// Only functions in these packages are analyzed; all packages when empty
    pub include_packages: Vec<String>,
    /// Functions in these packages are dropped, even when also included
    pub exclude_packages: Vec<String>,
}

impl ConfigFile {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `.table_deps.json` in the current directory is used when present and
    /// defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether functions from `package` take part in the analysis.
    pub fn includes_package(&self, package: &str) -> bool {
        if self.exclude_packages.iter().any(|p| p == package) {
            return false;
        }
        self.include_packages.is_empty() || self.include_packages.iter().any(|p| p == package)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            sql: self.sql.clone(),
            call_sites: self.call_sites.clone(),
            advisories: self.advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AuxiliaryTables, Dialect, MarkerMatch};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: ConfigFile = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.sql.dialect, Dialect::PostgreSql);
        assert_eq!(config.call_sites.container_marker, "queries");
        assert!(config.call_sites.exported_only);
        assert_eq!(config.advisories.max_tables_per_function, 5);
        assert_eq!(config.max_errors, None);
    }

    #[test]
    fn test_full_deserialization() {
        let json = r#"
        {
            "sql": {
                "dialect": "mysql",
                "case_sensitive_tables": true,
                "auxiliary_tables": "read"
            },
            "call_sites": {
                "container_marker": "Store",
                "marker_match": "suffix",
                "extra_primitives": ["Health"],
                "exported_only": false
            },
            "advisories": {
                "max_tables_per_function": 8
            },
            "max_errors": 3,
            "max_workers": 2,
            "include_packages": ["service", "handler"],
            "exclude_packages": ["handler"]
        }
        "#;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(config.sql.dialect, Dialect::MySql);
        assert!(config.sql.case_sensitive);
        assert_eq!(config.sql.auxiliary_tables, AuxiliaryTables::Read);
        assert_eq!(config.call_sites.marker_match, MarkerMatch::Suffix);
        assert_eq!(config.call_sites.extra_primitives, vec!["Health".to_string()]);
        assert_eq!(config.advisories.max_tables_per_function, 8);
        assert_eq!(config.advisories.max_functions_per_table, 10);
        assert_eq!(config.max_errors, Some(3));
        assert_eq!(config.max_workers, Some(2));
        assert_eq!(config.include_packages, vec!["service".to_string(), "handler".to_string()]);
        assert_eq!(config.exclude_packages, vec!["handler".to_string()]);
    }

    #[test]
    fn test_every_package_included_by_default() {
        let config = ConfigFile::default();
        assert!(config.includes_package("service"));
        assert!(config.includes_package(""));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let config: ConfigFile = serde_json::from_str(
            r#"{"include_packages": ["service", "handler"], "exclude_packages": ["handler"]}"#,
        )
        .unwrap();
        assert!(config.includes_package("service"));
        assert!(!config.includes_package("handler"));
        assert!(!config.includes_package("main"));
    }

    #[test]
    fn test_invalid_dialect_rejected() {
        let result: Result<ConfigFile, _> = serde_json::from_str(r#"{"sql": {"dialect": "oracle"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"max_errors": 0}"#).unwrap();
        let config = ConfigFile::load(Some(file.path())).unwrap();
        assert_eq!(config.max_errors, Some(0));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = ConfigFile::load(Some(Path::new("/nonexistent/.table_deps.json")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = ConfigFile::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_engine_options_carry_settings() {
        let config: ConfigFile = serde_json::from_str(r#"{"sql": {"dialect": "standard"}}"#).unwrap();
        assert_eq!(config.engine_options().sql.dialect, Dialect::Standard);
    }
}

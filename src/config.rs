//! Configuration for tree search sessions
//!
//! This module contains the tuning constants and the `SearchConfig` loaded from
//! `KODEGEN_TREE_SEARCH_*` environment variables.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Number of hits accumulated before a batch is handed to the consumer
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Root used when the query has no location or the location cannot be parsed
pub const DEFAULT_ROOT: &str = "/";

/// Environment variable prefix for all configuration keys
pub const ENV_PREFIX: &str = "KODEGEN_TREE_SEARCH_";

/// Options applied to every session started by an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hits per delivered batch (the last batch may be shorter)
    pub batch_size: usize,
    /// Visit and report entries whose name starts with '.'
    pub include_hidden: bool,
    /// Descend into symlinked directories (cycles are cut by identity dedup)
    pub follow_symlinks: bool,
    /// Maximum directory depth to traverse (None = unlimited)
    /// 0 = root entries only, 1 = root + immediate subdirectories, etc.
    pub max_depth: Option<usize>,
    /// Wall-clock budget for one session; the session finishes incomplete when exceeded
    pub timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            include_hidden: false,
            follow_symlinks: true,
            max_depth: None,
            timeout_ms: None,
        }
    }
}

impl SearchConfig {
    /// Load configuration from the process environment, falling back to defaults
    ///
    /// # Errors
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, SearchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    /// Returns error if a value is present but cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get("BATCH_SIZE") {
            config.batch_size = parse_value("BATCH_SIZE", &raw)?;
        }
        if let Some(raw) = get("INCLUDE_HIDDEN") {
            config.include_hidden = parse_bool("INCLUDE_HIDDEN", &raw)?;
        }
        if let Some(raw) = get("FOLLOW_SYMLINKS") {
            config.follow_symlinks = parse_bool("FOLLOW_SYMLINKS", &raw)?;
        }
        if let Some(raw) = get("MAX_DEPTH") {
            config.max_depth = Some(parse_value("MAX_DEPTH", &raw)?);
        }
        if let Some(raw) = get("TIMEOUT_MS") {
            config.timeout_ms = Some(parse_value("TIMEOUT_MS", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde and the env loader cannot express
    ///
    /// # Errors
    /// Returns error if `batch_size` is zero
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.batch_size == 0 {
            return Err(SearchError::InvalidConfig {
                key: "batch_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, SearchError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| {
        log::warn!("Invalid value for {ENV_PREFIX}{key}: {raw}");
        SearchError::InvalidConfig {
            key: format!("{ENV_PREFIX}{key}"),
            message: e.to_string(),
        }
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, SearchError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => parse_value(key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = SearchConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.batch_size, 500);
        assert!(config.follow_symlinks);
    }

    #[test]
    fn reads_every_key() {
        let config = SearchConfig::from_lookup(lookup(&[
            ("BATCH_SIZE", "64"),
            ("INCLUDE_HIDDEN", "yes"),
            ("FOLLOW_SYMLINKS", "0"),
            ("MAX_DEPTH", "3"),
            ("TIMEOUT_MS", " 2500 "),
        ]))
        .expect("config");

        assert_eq!(config.batch_size, 64);
        assert!(config.include_hidden);
        assert!(!config.follow_symlinks);
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.timeout_ms, Some(2500));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = SearchConfig::from_lookup(lookup(&[("BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = SearchConfig::from_lookup(lookup(&[("MAX_DEPTH", "deep")])).unwrap_err();
        match err {
            SearchError::InvalidConfig { key, .. } => {
                assert_eq!(key, "KODEGEN_TREE_SEARCH_MAX_DEPTH");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = SearchConfig::from_lookup(lookup(&[("BATCH_SIZE", "  ")])).expect("config");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }
}

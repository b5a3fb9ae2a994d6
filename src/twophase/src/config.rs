use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where pruning tables are persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCacheMode {
    /// The platform cache directory.
    #[default]
    Auto,
    /// Always generate the tables in memory.
    Disabled,
    /// A specific cache file.
    Path(PathBuf),
}

/// Solver configuration, in TOML format. Every field is optional.
///
/// ```toml
/// max_phase1_depth = 20
/// max_phase2_depth = 24
/// timeout_secs = 5.0
/// threads = 4
/// target_length = 22
/// axes = 0b000_001
/// table_cache = "disabled"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Give up on phase 1 beyond this many moves.
    pub max_phase1_depth: u8,
    /// Give up on phase 2 beyond this many moves.
    pub max_phase2_depth: u8,
    /// Wall-clock budget for one solve.
    pub timeout_secs: Option<f64>,
    /// Search node budget for one solve.
    pub node_limit: Option<u64>,
    /// Threads sharing phase 1 of one solve by first move.
    pub threads: usize,
    /// Keep searching longer phase 1 sequences until the total is at most
    /// this many moves.
    pub target_length: Option<usize>,
    /// How many phase 2 searches to try for a shorter total once any
    /// solution is known.
    pub phase2_attempt_limit: usize,
    /// Which views of the cube phase 1 searches, one bit per
    /// [`Orientation`](crate::symmetry::Orientation): the cube as given and
    /// rotated twice about the URF-DBL diagonal, then the same for the
    /// inverse cube. Zero searches the cube as given.
    pub axes: u8,
    pub table_cache: TableCacheMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_phase1_depth: 20,
            max_phase2_depth: 24,
            timeout_secs: None,
            node_limit: None,
            threads: 1,
            target_length: None,
            phase2_attempt_limit: 1000,
            axes: 0b11_1111,
            table_cache: TableCacheMode::Auto,
        }
    }
}

impl SolverConfig {
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// # Errors
    ///
    /// Fails if `contents` is not a valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(SolverConfig::from_toml("").unwrap(), SolverConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = SolverConfig::from_toml(
            r#"
            max_phase1_depth = 12
            timeout_secs = 2.5
            table_cache = { path = "/tmp/tables.bin" }
            "#,
        )
        .unwrap();
        assert_eq!(config.max_phase1_depth, 12);
        assert_eq!(config.max_phase2_depth, 24);
        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(
            config.table_cache,
            TableCacheMode::Path(PathBuf::from("/tmp/tables.bin"))
        );

        assert_eq!(config.axes, 0b11_1111);

        let config = SolverConfig::from_toml("axes = 0b001_001").unwrap();
        assert_eq!(config.axes, 0b1001);

        let config = SolverConfig::from_toml(r#"table_cache = "disabled""#).unwrap();
        assert_eq!(config.table_cache, TableCacheMode::Disabled);
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            SolverConfig::from_toml("threads = \"many\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SolverConfig::from_file(Path::new("/nonexistent/twophase.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}

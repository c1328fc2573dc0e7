//! Engine configuration: the options table from §6, plus the ambient
//! loading/validation layer (TOML via `serde` + `toml`, typed errors via
//! `thiserror`) that the kernel itself has no use for but any embedding
//! application will.

use crate::align::AlignParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All tunables the scoring kernel consults. Every field has a documented
/// default (see `Default` impl below) and deserializes with that default
/// when absent from a config file, so partial config files are valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Floor below which a token-pair score is treated as noise.
    pub minimum_match: f64,
    /// Absolute minimum item score for inclusion in results.
    pub thresh_include: f64,
    /// Fraction of the best-so-far item score required for inclusion.
    pub thresh_relative_to_best: f64,
    /// Per-field boosted score above which an item stops scanning fields.
    pub field_good_enough: f64,
    /// Bonus added per matching prefix character.
    pub bonus_match_start: f64,
    /// Bonus added per in-order matched lane.
    pub bonus_token_order: f64,
    /// Per-field multiplicative decay applied to the position bonus.
    pub bonus_position_decay: f64,
    /// Enable tokenised (per-token) scoring.
    pub score_per_token: bool,
    /// Additionally compute the fused (whole-string) score and take the max.
    pub score_test_fused: bool,
    /// Rounding quantum applied to the final item score.
    pub score_round: f64,
    /// Drop query tokens shorter than this.
    pub token_query_min_length: usize,
    /// Drop field tokens shorter than this.
    pub token_field_min_length: usize,
    /// Truncate query tokens longer than this.
    pub token_query_max_length: usize,
    /// Truncate field tokens longer than this.
    pub token_field_max_length: usize,
    /// Reject field tokens shorter than this fraction of the query token.
    pub token_min_rel_size: f64,
    /// Reject field tokens longer than this multiple of the query token.
    pub token_max_rel_size: f64,
    /// Maximum number of results returned; `0` means unlimited.
    pub output_limit: usize,
    /// Scoring weights for the highlight aligner (C8).
    pub align: AlignParams,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            minimum_match: 1.0,
            thresh_include: 2.0,
            thresh_relative_to_best: 0.5,
            field_good_enough: 20.0,
            bonus_match_start: 0.5,
            bonus_token_order: 2.0,
            bonus_position_decay: 0.7,
            score_per_token: true,
            score_test_fused: false,
            score_round: 0.1,
            token_query_min_length: 2,
            token_field_min_length: 3,
            token_query_max_length: 64,
            token_field_max_length: 64,
            token_min_rel_size: 0.6,
            token_max_rel_size: 6.0,
            output_limit: 0,
            align: AlignParams::default(),
        }
    }
}

/// Failure modes for loading an [`Options`] value from disk. These are
/// ordinary I/O/parse errors, distinct from the kernel's scoring functions
/// (which never fail — see §7).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config as TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Options {
    /// Parse options from a TOML document. Missing fields fall back to
    /// [`Options::default`].
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load and parse options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let opts = Options::from_toml_str("minimum_match = 2.5\n").unwrap();
        assert_eq!(opts.minimum_match, 2.5);
        assert_eq!(opts.thresh_include, Options::default().thresh_include);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Options::from_toml_str("minimum_match = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Options::from_file("/nonexistent/path/does-not-exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

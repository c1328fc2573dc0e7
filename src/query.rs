//! Prepared query representation shared across C3–C7.
//!
//! Tokenising and packing a query string is done once per search call, not
//! once per item, since the same [`Query`] is scored against every record
//! in the index.

use crate::alphabet::{build_alphabet_map, AlphabetMap};
use crate::config::Options;
use crate::normalize::{normalize, tokenize};
use crate::pack::{pack_query_tokens, Group};
use std::cell::Cell;

/// A query string, normalised, tokenised, and packed once up front.
pub struct Query {
    pub tokens: Vec<Vec<char>>,
    /// The full normalised query string, truncated to `token_query_max_length`
    /// characters, kept separately from [`Query::tokens`] so words dropped by
    /// per-token min-length filtering (e.g. "a" in "a cat") still take part
    /// in fused (whole-string) scoring.
    pub fused_tokens: Vec<char>,
    pub groups: Vec<Group>,
    pub fused_map: AlphabetMap,
    /// Best fused (whole-string) score seen so far for the item currently
    /// being scored. Scratch state: reset per item via
    /// [`Query::reset_fused_score`], read back via [`Query::fused_score`].
    fused_score: Cell<f64>,
}

impl Query {
    /// Normalise, tokenise, and pack `raw` into a ready-to-score [`Query`].
    pub fn prepare(raw: &str, opts: &Options) -> Self {
        let normalized = normalize(raw);
        let tokens = tokenize(
            &normalized,
            opts.token_query_min_length,
            opts.token_query_max_length,
        );
        let mut fused_tokens: Vec<char> = normalized.chars().collect();
        fused_tokens.truncate(opts.token_query_max_length);
        let fused_map = build_alphabet_map(&fused_tokens);
        let groups = pack_query_tokens(&tokens);

        Query {
            tokens,
            fused_tokens,
            groups,
            fused_map,
            fused_score: Cell::new(0.0),
        }
    }

    /// Number of query tokens after tokenisation (post min/max-length
    /// filtering).
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Record a freshly computed fused score for the item currently being
    /// scored, keeping the running maximum across its fields.
    pub fn update_fused_score(&self, candidate: f64) {
        if candidate > self.fused_score.get() {
            self.fused_score.set(candidate);
        }
    }

    /// The running-maximum fused score recorded since the last reset.
    pub fn fused_score(&self) -> f64 {
        self.fused_score.get()
    }

    /// Clear the fused-score scratch slot before scoring the next item.
    pub fn reset_fused_score(&self) {
        self.fused_score.set(0.0);
    }
}

//! C6 — Field Scorer.
//!
//! Scores one field's tokens against the prepared query: for every query
//! lane (a packed token or a solo long token), scans all of this field's
//! tokens and keeps the best score seen plus the field-token index that
//! produced it, then adds a bonus for lanes whose best match landed in
//! increasing field-token order. Token assignment (C5) is deliberately not
//! used here — the item-scoring path only needs each lane's best match, not
//! an exclusive one-to-one pairing. C5 is reserved for on-demand
//! highlighting (see [`crate::engine`]), where a single pairing is actually
//! needed to hand C8 one substring per query token.
//!
//! When fused scoring is enabled, also scores the whole query string
//! against the whole field text and folds the result into the query's
//! running fused-score maximum for this item.

use crate::config::Options;
use crate::pack::Group;
use crate::packed_score::score_packed;
use crate::query::Query;
use crate::token_score::score_token;
use crate::util::join_tokens;

pub struct FieldOutcome {
    /// This field's contribution to the item score: the sum of per-lane
    /// best scores plus the in-order bonus. Zero when `score_per_token` is
    /// disabled.
    pub score: f64,
    /// Best score seen for each query lane against this field's tokens, in
    /// query-token order. Folded into the item-level per-lane accumulator
    /// by [`crate::aggregate`].
    pub lane_best: Vec<f64>,
}

/// Build the lane × field-token score matrix for `query` against
/// `field_tokens`, dispatching each query group to C3 (solo long token) or
/// C4 (packed lanes). Shared by [`score_field`]'s per-lane reduction and by
/// the engine's on-demand highlighting path, which needs the full matrix to
/// run the C5 assignment solver.
pub fn build_score_matrix(query: &Query, field_tokens: &[Vec<char>], opts: &Options) -> Vec<Vec<f64>> {
    let n_query_tokens = query.token_count();
    let mut matrix = vec![vec![0.0f64; field_tokens.len()]; n_query_tokens];

    // `pack_query_tokens` visits tokens in `query.tokens` order and either
    // appends them to the current packed group or spins off a solo long
    // group, so walking groups (and, within a packed group, its lanes) in
    // order reproduces the original token order exactly — a plain running
    // counter is enough to map each lane back to its matrix row.
    let mut row = 0usize;
    for group in &query.groups {
        match group {
            Group::Packed(pack) => {
                for (col, field_token) in field_tokens.iter().enumerate() {
                    let lane_scores = score_packed(pack, field_token, opts);
                    for (lane, score) in lane_scores.into_iter().enumerate() {
                        matrix[row + lane][col] = score;
                    }
                }
                row += pack.tokens.len();
            }
            Group::Long { token, map } => {
                for (col, field_token) in field_tokens.iter().enumerate() {
                    matrix[row][col] = score_token(token, map, field_token, opts);
                }
                row += 1;
            }
        }
    }

    matrix
}

/// Score `field_tokens` (one field's already-tokenised text) against
/// `query`.
pub fn score_field(query: &Query, field_tokens: &[Vec<char>], opts: &Options) -> FieldOutcome {
    let n_query_tokens = query.token_count();

    if opts.score_test_fused {
        let field_fused = join_tokens(field_tokens);
        let fused = score_token(&query.fused_tokens, &query.fused_map, &field_fused, opts);
        query.update_fused_score(fused);
    }

    if !opts.score_per_token || n_query_tokens == 0 || field_tokens.is_empty() {
        return FieldOutcome {
            score: 0.0,
            lane_best: vec![0.0; n_query_tokens],
        };
    }

    let matrix = build_score_matrix(query, field_tokens, opts);

    let mut lane_best = vec![0.0f64; n_query_tokens];
    let mut lane_best_index: Vec<Option<usize>> = vec![None; n_query_tokens];
    for (lane, row) in matrix.iter().enumerate() {
        for (col, &score) in row.iter().enumerate() {
            if score > lane_best[lane] {
                lane_best[lane] = score;
                lane_best_index[lane] = Some(col);
            }
        }
    }

    let mut last_index: Option<usize> = None;
    let mut order_bonus = 0.0;
    let mut sum = 0.0;
    for (score, idx) in lane_best.iter().zip(lane_best_index.iter()) {
        sum += score;
        if *score > opts.minimum_match {
            if let Some(j) = idx {
                if last_index.map_or(true, |last| *j > last) {
                    order_bonus += opts.bonus_token_order;
                }
                last_index = Some(*j);
            }
        }
    }

    FieldOutcome {
        score: sum + order_bonus,
        lane_best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn field_tokens(words: &[&str]) -> Vec<Vec<char>> {
        words.iter().map(|w| chars(w)).collect()
    }

    #[test]
    fn matching_field_scores_higher_than_unrelated_field() {
        let opts = Options::default();
        let query = Query::prepare("davinci code", &opts);

        let matching = score_field(&query, &field_tokens(&["the", "davinci", "code"]), &opts);
        let unrelated = score_field(&query, &field_tokens(&["completely", "unrelated", "text"]), &opts);

        assert!(matching.score > unrelated.score);
    }

    #[test]
    fn in_order_tokens_score_higher_than_reversed() {
        let opts = Options::default();
        let query = Query::prepare("alpha beta", &opts);

        let in_order = score_field(&query, &field_tokens(&["alpha", "beta"]), &opts);
        let reversed = score_field(&query, &field_tokens(&["beta", "alpha"]), &opts);

        assert!(in_order.score > reversed.score);
    }

    #[test]
    fn fused_scoring_updates_query_running_max() {
        let mut opts = Options::default();
        opts.score_test_fused = true;
        let query = Query::prepare("davinci code", &opts);
        query.reset_fused_score();

        score_field(&query, &field_tokens(&["davinci", "code"]), &opts);
        assert!(query.fused_score() > 0.0);
    }

    #[test]
    fn disabling_per_token_scoring_yields_zero_score() {
        let mut opts = Options::default();
        opts.score_per_token = false;
        let query = Query::prepare("davinci code", &opts);
        let outcome = score_field(&query, &field_tokens(&["davinci", "code"]), &opts);
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn both_lanes_get_their_own_best_even_against_one_field_token() {
        // No exclusive assignment at this layer: two query tokens can both
        // report their best score against the very same field token.
        let opts = Options::default();
        let query = Query::prepare("cat dog", &opts);
        let outcome = score_field(&query, &field_tokens(&["catdog"]), &opts);
        assert_eq!(outcome.lane_best.len(), 2);
        assert!(outcome.lane_best[0] > 0.0);
        assert!(outcome.lane_best[1] > 0.0);
    }
}

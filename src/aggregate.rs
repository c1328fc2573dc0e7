//! C7 — Item Aggregator.
//!
//! Combines the C6 scores of every field on a record into one item score:
//! fields are weighted by a position decay that favours earlier fields
//! (title before description before tags), the item score tracks the best
//! boosted field score seen so far (not a sum — a single excellent field
//! match should not be diluted by mediocre ones elsewhere on the record),
//! scanning stops early once a field is "good enough" on its own, and —
//! for multi-token queries — that per-field best is blended with the
//! query's aggregate per-lane score (the best match each query token found
//! in *any* field, summed, or the fused whole-string score if that's
//! higher).

use crate::config::Options;
use crate::field_score::score_field;
use crate::query::Query;
use crate::util::round_to;

pub struct ItemScore {
    pub total: f64,
    /// Index of the field whose boosted score drove `total`, useful for
    /// deciding which field's highlight ranges to surface.
    pub best_field_index: Option<usize>,
}

/// Score one item's fields (already tokenised per field) against `query`.
pub fn score_item(query: &Query, fields: &[Vec<Vec<char>>], opts: &Options) -> ItemScore {
    query.reset_fused_score();

    let n_tokens = query.token_count();
    let mut lane_best_overall = vec![0.0f64; n_tokens];
    let mut position_bonus = 1.0f64;
    let mut item_score = 0.0f64;
    let mut best_field_index = None;

    for (idx, field_tokens) in fields.iter().enumerate() {
        let outcome = score_field(query, field_tokens, opts);

        for (lane, &score) in outcome.lane_best.iter().enumerate() {
            if score > lane_best_overall[lane] {
                lane_best_overall[lane] = score;
            }
        }

        let weighted = outcome.score * (1.0 + position_bonus);
        if weighted > item_score {
            item_score = weighted;
            best_field_index = Some(idx);
        }

        if weighted > opts.field_good_enough {
            break;
        }

        position_bonus *= opts.bonus_position_decay;
    }

    let total = if n_tokens <= 1 {
        item_score
    } else {
        let query_score = lane_best_overall.iter().sum::<f64>().max(query.fused_score());
        0.5 * item_score + 0.5 * query_score
    };

    ItemScore {
        total: round_to(total, opts.score_round),
        best_field_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn field(words: &[&str]) -> Vec<Vec<char>> {
        words.iter().map(|w| chars(w)).collect()
    }

    #[test]
    fn earlier_field_match_outweighs_later_field_match() {
        let opts = Options::default();
        let query = Query::prepare("vinci", &opts);

        let title_match = vec![field(&["davinci", "code"]), field(&["irrelevant", "notes"])];
        let tags_match = vec![field(&["irrelevant", "notes"]), field(&["davinci", "code"])];

        let scored_title = score_item(&query, &title_match, &opts);
        let scored_tags = score_item(&query, &tags_match, &opts);

        assert!(scored_title.total > scored_tags.total);
    }

    #[test]
    fn field_good_enough_stops_scanning_remaining_fields() {
        let mut opts = Options::default();
        opts.field_good_enough = 0.01; // trivially satisfied by any match
        let query = Query::prepare("davinci", &opts);

        let fields = vec![field(&["davinci"]), field(&["davinci", "davinci", "davinci"])];
        let scored = score_item(&query, &fields, &opts);
        // only the first field's score should be counted (position_bonus == 1.0)
        let solo = score_item(&query, &vec![field(&["davinci"])], &opts);
        assert_eq!(scored.total, solo.total);
    }

    #[test]
    fn single_token_query_skips_fused_blend() {
        let mut opts = Options::default();
        opts.score_test_fused = true;
        let query = Query::prepare("davinci", &opts);
        let fields = vec![field(&["davinci", "code"])];
        let scored = score_item(&query, &fields, &opts);
        assert_eq!(query.token_count(), 1);
        assert!(scored.total > 0.0);
    }

    #[test]
    fn no_matching_fields_scores_zero() {
        let opts = Options::default();
        let query = Query::prepare("davinci", &opts);
        let fields = vec![field(&["completely", "unrelated"])];
        let scored = score_item(&query, &fields, &opts);
        assert_eq!(scored.total, 0.0);
    }

    #[test]
    fn a_strong_field_is_not_diluted_by_a_weak_one() {
        // Item score tracks the best boosted field, not a sum across
        // fields — a perfect title match should not be dragged down just
        // because the record also has an unrelated tags field.
        let opts = Options::default();
        let query = Query::prepare("davinci", &opts);

        let one_good_field = vec![field(&["davinci"])];
        let good_plus_noise = vec![field(&["davinci"]), field(&["totally", "unrelated", "noise"])];

        let solo = score_item(&query, &one_good_field, &opts);
        let with_noise = score_item(&query, &good_plus_noise, &opts);
        assert_eq!(solo.total, with_noise.total);
    }

    #[test]
    fn multi_token_query_blends_per_lane_best_across_fields() {
        // "brown" only appears in the second field, "davinci" only in the
        // first — neither field alone matches both tokens, but the
        // per-lane accumulator credits each token's best match wherever it
        // occurred, so the blended total is still positive.
        let opts = Options::default();
        let query = Query::prepare("davinci brown", &opts);
        let fields = vec![field(&["davinci", "code"]), field(&["dawn", "brown"])];
        let scored = score_item(&query, &fields, &opts);
        assert!(scored.total > 0.0);
    }
}

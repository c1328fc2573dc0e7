//! C8 — Local Aligner.
//!
//! Smith–Waterman with affine gap penalties, used to turn an already-chosen
//! query-token/field-token pairing into substring ranges worth highlighting
//! in the displayed field text. Matches require equal characters — there is
//! no mismatch score, only matches and gaps — since the output is meant to
//! mark literal shared substrings, not a general edit script.

use crate::util::common_prefix_len;
use serde::{Deserialize, Serialize};

/// Scoring weights for the aligner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignParams {
    /// Score awarded per matching character.
    pub match_weight: f64,
    /// Penalty for opening a new gap.
    pub gap_open: f64,
    /// Penalty for extending an existing gap by one more character.
    pub gap_extend: f64,
    /// Gaps of this many characters or fewer are bridged into one range
    /// instead of splitting it.
    pub bridge_gap: usize,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            match_weight: 1.0,
            gap_open: -0.1,
            gap_extend: -0.01,
            bridge_gap: 2,
        }
    }
}

/// A half-open `[start, end)` range into `field`, left-to-right ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Trace {
    Stop,
    Up,
    Left,
    Diag,
}

/// Align `query` against `field` and return the field-text ranges worth
/// highlighting. Returns an empty list if no positive-scoring alignment
/// exists (e.g. no characters in common).
pub fn align_highlight(query: &[char], field: &[char], params: &AlignParams) -> Vec<AlignRange> {
    let qn = query.len();
    let fl = field.len();
    if qn == 0 || fl == 0 {
        return Vec::new();
    }

    let rows = qn + 1;
    let cols = fl + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    // `h`/`e`/`f` only ever need the previous and current row: the `e`
    // recurrence reads the current row's previous column, `f` and the
    // diagonal read the previous row. Only `trace` needs a full `rows *
    // cols` table, since backtracking has to revisit arbitrary earlier
    // cells.
    let mut h_prev = vec![0.0f64; cols];
    let mut h_curr = vec![0.0f64; cols];
    let mut f_prev = vec![0.0f64; cols];
    let mut f_curr = vec![0.0f64; cols];
    let mut trace = vec![Trace::Stop; rows * cols];

    let mut v_max = 0.0f64;
    let mut i_max = 0usize;
    let mut j_max = 0usize;

    for i in 1..rows {
        let mut e = 0.0f64; // best score ending with a gap in the query (field consumed), current row only
        for j in 1..cols {
            let e_open = h_curr[j - 1] + params.gap_open + params.gap_extend;
            let e_ext = e + params.gap_extend;
            e = e_open.max(e_ext).max(0.0);

            let f_open = h_prev[j] + params.gap_open + params.gap_extend;
            let f_ext = f_prev[j] + params.gap_extend;
            f_curr[j] = f_open.max(f_ext).max(0.0);

            let diag = if query[i - 1] == field[j - 1] {
                h_prev[j - 1] + params.match_weight
            } else {
                f64::MIN
            };

            let mut best = 0.0;
            let mut t = Trace::Stop;
            if diag > best {
                best = diag;
                t = Trace::Diag;
            }
            if f_curr[j] > best {
                best = f_curr[j];
                t = Trace::Up;
            }
            if e > best {
                best = e;
                t = Trace::Left;
            }
            h_curr[j] = best;
            trace[idx(i, j)] = t;

            if best > v_max {
                v_max = best;
                i_max = i;
                j_max = j;
            }
        }

        // `h_curr[0]` and `f_curr` are fully overwritten (columns 1..cols)
        // before the next row reads them, so no reset is needed here — row
        // 0's boundary column stays 0.0 for the whole run.
        std::mem::swap(&mut h_prev, &mut h_curr);
        std::mem::swap(&mut f_prev, &mut f_curr);
    }

    if v_max <= 0.0 {
        return Vec::new();
    }

    // `trace[i][j] == Stop` is set exactly when that cell's best score was
    // <= 0.0 (see the loop above), so checking it is equivalent to checking
    // the (no-longer-materialised) full `h` matrix for a positive score.
    let mut matched: Vec<usize> = Vec::new();
    let (mut ci, mut cj) = (i_max, j_max);
    while ci > 0 && cj > 0 {
        match trace[idx(ci, cj)] {
            Trace::Diag => {
                matched.push(cj - 1);
                ci -= 1;
                cj -= 1;
            }
            Trace::Up => ci -= 1,
            Trace::Left => cj -= 1,
            Trace::Stop => break,
        }
    }
    matched.reverse(); // traceback runs right-to-left; put positions back in display order

    let mut ranges: Vec<AlignRange> = Vec::new();
    for pos in matched {
        if let Some(last) = ranges.last_mut() {
            if pos <= last.end + params.bridge_gap {
                last.end = pos + 1;
                continue;
            }
        }
        ranges.push(AlignRange {
            start: pos,
            end: pos + 1,
        });
    }

    let prefix = common_prefix_len(query, field);
    if prefix > 0 {
        let extend_first = ranges
            .first()
            .map_or(false, |r| r.start <= prefix + params.bridge_gap);
        if extend_first {
            ranges[0].start = 0;
        } else {
            ranges.insert(
                0,
                AlignRange {
                    start: 0,
                    end: prefix,
                },
            );
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn exact_match_is_one_range() {
        let params = AlignParams::default();
        let ranges = align_highlight(&chars("wall"), &chars("wall"), &params);
        assert_eq!(ranges, vec![AlignRange { start: 0, end: 4 }]);
    }

    #[test]
    fn disjoint_strings_yield_no_ranges() {
        let params = AlignParams::default();
        let ranges = align_highlight(&chars("xyz"), &chars("abc"), &params);
        assert!(ranges.is_empty());
    }

    #[test]
    fn prefix_aligned_subsequence_is_found() {
        // "assurance" vs "insurgence": common aligned substring around "sur...nce"
        let params = AlignParams::default();
        let ranges = align_highlight(&chars("assurance"), &chars("insurgence"), &params);
        assert!(!ranges.is_empty());
        let total_highlighted: usize = ranges.iter().map(|r| r.end - r.start).sum();
        assert!(total_highlighted >= 4);
    }

    #[test]
    fn close_gap_is_bridged_into_one_range() {
        let params = AlignParams {
            bridge_gap: 2,
            ..AlignParams::default()
        };
        // "abXXcd" vs "abcd": a single 2-char gap should bridge into one range.
        let ranges = align_highlight(&chars("abcd"), &chars("abXXcd"), &params);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0], AlignRange { start: 0, end: 6 });
    }
}

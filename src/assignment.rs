//! C5 — Token Assignment Solver.
//!
//! Finds the best one-to-one matching between query tokens (rows) and field
//! tokens (columns) of a score matrix, under per-row inclusion thresholds,
//! via memoised depth-first search over a bitmask of used columns.

use crate::alphabet::WORD_BITS;
use crate::config::Options;
use rustc_hash::FxHashMap;

/// Small constant bounding recursion depth: when rows heavily outnumber
/// columns, the matrix is transposed before solving (see [`solve_assignment`]).
const FLIP_SLACK: usize = 4;

pub struct AssignmentResult {
    /// Sum of scores for the chosen assignment.
    pub total: f64,
    /// `mapping[i] = Some(j)` if query token `i` was matched to field token
    /// `j`; `None` if it was left unmatched.
    pub mapping: Vec<Option<usize>>,
}

/// Solve the assignment problem for `matrix[query_token][field_token]`.
/// Field tokens beyond [`WORD_BITS`] are ignored (in input order) — the
/// solver's bitmask of used columns can't represent more than a word's
/// worth of candidates.
pub fn solve_assignment(matrix: &[Vec<f64>], opts: &Options) -> AssignmentResult {
    let m = matrix.len();
    if m == 0 {
        return AssignmentResult {
            total: 0.0,
            mapping: Vec::new(),
        };
    }
    let n_full = matrix[0].len();
    let n = n_full.min(WORD_BITS);

    if m > n + FLIP_SLACK && n > 0 {
        // Recursing over `m` rows directly would mean a recursion depth of
        // `m`; transposing keeps it at `n` (<= WORD_BITS) instead. The
        // genuine field-token cap (`n`) stays on the field-token axis, which
        // after the transpose is the *row* count of `transposed` — it needs
        // no further capping here, unlike the query-token axis, which has no
        // spec-mandated limit but still can't exceed the solver's
        // WORD_BITS-wide "used columns" bitmask once it becomes the column
        // axis. If there are more query tokens than that, keep the
        // WORD_BITS best-scoring ones (by best score against any field
        // token) rather than the first WORD_BITS by position, so a genuine
        // best match past position WORD_BITS is never silently dropped.
        let mut query_cols: Vec<usize> = (0..m).collect();
        if m > WORD_BITS {
            query_cols.sort_by(|&a, &b| {
                let best_a = matrix[a][..n].iter().cloned().fold(0.0, f64::max);
                let best_b = matrix[b][..n].iter().cloned().fold(0.0, f64::max);
                best_b.partial_cmp(&best_a).unwrap()
            });
            query_cols.truncate(WORD_BITS);
            query_cols.sort_unstable();
        }

        let transposed: Vec<Vec<f64>> = (0..n)
            .map(|j| query_cols.iter().map(|&i| matrix[i][j]).collect())
            .collect();
        let flipped = solve_core(&transposed, opts, query_cols.len());
        let mut mapping = vec![None; m];
        for (col, row_opt) in flipped.mapping.iter().enumerate() {
            if let Some(row) = row_opt {
                mapping[query_cols[*row]] = Some(col);
            }
        }
        return AssignmentResult {
            total: flipped.total,
            mapping,
        };
    }

    solve_core(matrix, opts, n)
}

/// Core solve over `matrix`, whose first `n` columns of every row are
/// eligible for assignment. `n` is always the genuine, already-capped
/// column count of *this* `matrix` — the field-token count when called on
/// the original orientation, or the (possibly truncated) query-token count
/// when called on the transpose — passed explicitly by the caller rather
/// than re-derived from `matrix[0].len()`, which after a flip no longer
/// means "field-token count".
fn solve_core(matrix: &[Vec<f64>], opts: &Options, n: usize) -> AssignmentResult {
    let m = matrix.len();

    let thresholds: Vec<f64> = (0..m)
        .map(|i| {
            let best = matrix[i][..n].iter().cloned().fold(0.0, f64::max);
            (best * opts.thresh_relative_to_best).max(opts.minimum_match)
        })
        .collect();

    let qualifying: Vec<Vec<usize>> = (0..m)
        .map(|i| (0..n).filter(|&j| matrix[i][j] >= thresholds[i]).collect())
        .collect();

    let qualifying_rows: Vec<usize> = (0..m).filter(|&i| !qualifying[i].is_empty()).collect();

    if qualifying_rows.is_empty() {
        return AssignmentResult {
            total: 0.0,
            mapping: vec![None; m],
        };
    }

    if qualifying_rows.len() == 1 {
        let i = qualifying_rows[0];
        let best_j = qualifying[i]
            .iter()
            .copied()
            .max_by(|&a, &b| matrix[i][a].partial_cmp(&matrix[i][b]).unwrap())
            .unwrap();
        let mut mapping = vec![None; m];
        mapping[i] = Some(best_j);
        return AssignmentResult {
            total: matrix[i][best_j],
            mapping,
        };
    }

    let mut memo: FxHashMap<(usize, u32), (f64, i32)> = FxHashMap::default();
    dfs(0, 0, matrix, &thresholds, n, &mut memo);

    let mut mapping = vec![None; m];
    let mut used: u32 = 0;
    let mut total = 0.0;
    for row in 0..m {
        let (_, choice) = *memo.get(&(row, used)).unwrap();
        if choice >= 0 {
            let j = choice as usize;
            mapping[row] = Some(j);
            used |= 1 << j;
            total += matrix[row][j];
        }
    }

    AssignmentResult { total, mapping }
}

fn dfs(
    row: usize,
    used: u32,
    matrix: &[Vec<f64>],
    thresholds: &[f64],
    n: usize,
    memo: &mut FxHashMap<(usize, u32), (f64, i32)>,
) -> (f64, i32) {
    if row == matrix.len() {
        return (0.0, -1);
    }
    if let Some(&cached) = memo.get(&(row, used)) {
        return cached;
    }

    let (skip_score, _) = dfs(row + 1, used, matrix, thresholds, n, memo);
    let mut best_score = skip_score;
    let mut best_choice: i32 = -1;

    for j in 0..n {
        if used & (1 << j) != 0 {
            continue;
        }
        if matrix[row][j] < thresholds[row] {
            continue;
        }
        let (rest, _) = dfs(row + 1, used | (1 << j), matrix, thresholds, n, memo);
        let candidate = matrix[row][j] + rest;
        if candidate > best_score {
            best_score = candidate;
            best_choice = j as i32;
        }
    }

    let result = (best_score, best_choice);
    memo.insert((row, used), result);
    result
}

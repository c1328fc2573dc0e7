//! C4 — Packed Scorer.
//!
//! Scores every token in a [`PackInfo`] group against one field token in a
//! single sweep, by reusing disjoint bit lanes within one machine word. The
//! `gate` mask keeps carries from the bit-parallel addition inside a lane
//! from bleeding into its neighbour.

use crate::alphabet::BitMask;
use crate::config::Options;
use crate::pack::PackInfo;
use crate::util::common_prefix_len;

/// Score every token packed into `pack` against `field`, returning one
/// score per token in `pack.tokens` order.
pub fn score_packed(pack: &PackInfo, field: &[char], opts: &Options) -> Vec<f64> {
    let n = field.len();
    let mut s: BitMask = u32::MAX;

    for &c in field {
        if let Some(&bits) = pack.map.get(&c) {
            let u = s & bits;
            s = ((s & pack.gate) + (u & pack.gate)) | (s - u);
        }
    }
    s = !s;

    pack.tokens
        .iter()
        .map(|pt| score_lane(&pt.token, pt.offset, s, field, n, opts))
        .collect()
}

fn score_lane(token: &[char], offset: usize, swept: BitMask, field: &[char], n: usize, opts: &Options) -> f64 {
    let m = token.len();
    if m == 0 || n == 0 {
        return 0.0;
    }

    let (m_f, n_f) = (m as f64, n as f64);
    if n_f < opts.token_min_rel_size * m_f || n_f > opts.token_max_rel_size * m_f {
        return 0.0;
    }

    let min_mn = m.min(n);
    let p = common_prefix_len(token, field).min(min_mn);
    let sz = (m_f + n_f) / (2.0 * m_f * n_f);

    if p == min_mn {
        return sz * (p as f64).powi(2) + opts.bonus_match_start * p as f64;
    }

    let lane_mask: BitMask = if m >= 32 { u32::MAX } else { (1u32 << m) - 1 };
    let mut sm = (swept >> offset) & lane_mask;
    sm &= !((1u32 << p) - 1);
    let llcs = sm.count_ones() as usize + p;

    sz * (llcs as f64).powi(2) + opts.bonus_match_start * p as f64
}

//! C3 — Single-Token Scorer, plus its §4.3.2 long-token LLCS fallback.
//!
//! Scores one query token against one field token: a relative-size gate, a
//! prefix shortcut, then either the bit-parallel LLCS recurrence (tokens
//! fitting a machine word) or a position-list LIS reduction for longer ones.

use crate::alphabet::{AlphabetMap, BitMask, WORD_BITS};
use crate::config::Options;
use crate::util::common_prefix_len;

/// Score query token `query` (with its prebuilt `map`) against field token
/// `field`. Total: never panics, returns `0.0` for any pair that fails the
/// relative-size gate instead of signalling an error.
pub fn score_token(query: &[char], map: &AlphabetMap, field: &[char], opts: &Options) -> f64 {
    let m = query.len();
    let n = field.len();
    if m == 0 || n == 0 {
        return 0.0;
    }

    let (m_f, n_f) = (m as f64, n as f64);
    if n_f < opts.token_min_rel_size * m_f || n_f > opts.token_max_rel_size * m_f {
        return 0.0;
    }

    let min_mn = m.min(n);
    let p = common_prefix_len(query, field).min(min_mn);
    let sz = (m_f + n_f) / (2.0 * m_f * n_f);

    if p == min_mn {
        return sz * (p as f64).powi(2) + opts.bonus_match_start * p as f64;
    }

    let llcs = if m > WORD_BITS {
        llcs_long(field, map)
    } else {
        llcs_short(field, map, m, p)
    };

    sz * (llcs as f64).powi(2) + opts.bonus_match_start * p as f64
}

/// Bit-parallel LLCS (Hyyrö 2004 recurrence) for a query token that fits in
/// one machine word. `p` is the already-consumed common-prefix length, so
/// the sweep only needs to run over `field[p..]`.
fn llcs_short(field: &[char], map: &AlphabetMap, m: usize, p: usize) -> usize {
    let table = match map {
        AlphabetMap::Short(t) => t,
        AlphabetMap::Long(_) => unreachable!("short LLCS requires a short alphabet map"),
    };

    let mut mask: BitMask = if m >= 32 { u32::MAX } else { (1u32 << m) - 1 };
    let mut s: BitMask = mask;

    for &c in &field[p..] {
        let u = s & table.get(&c).copied().unwrap_or(0);
        s = (s + u) | (s - u);
    }

    mask &= !((1u32 << p) - 1);
    s = !s & mask;
    s.count_ones() as usize + p
}

/// LLCS for a query token longer than a machine word, via the classic
/// Hunt–Szymanski reduction of LCS to longest-increasing-subsequence: for
/// each character of `field` in order, emit the query's match positions for
/// that character in descending order, then take the LIS length of the
/// concatenated sequence. This produces the exact same LLCS value as the
/// bit-parallel recurrence (Testable Property 3) without needing `field` to
/// fit in a word.
fn llcs_long(field: &[char], map: &AlphabetMap) -> usize {
    let positions = match map {
        AlphabetMap::Long(m) => m,
        AlphabetMap::Short(_) => unreachable!("long LLCS requires a long alphabet map"),
    };

    let mut sequence: Vec<u32> = Vec::new();
    for &c in field {
        if let Some(list) = positions.get(&c) {
            for &pos in list.iter().rev() {
                if pos == crate::alphabet::POSITION_SENTINEL {
                    continue;
                }
                sequence.push(pos);
            }
        }
    }

    let mut tails: Vec<u32> = Vec::new();
    for v in sequence {
        match tails.binary_search(&v) {
            Ok(_) => {} // positions are unique per query token; never hit in practice
            Err(idx) => {
                if idx == tails.len() {
                    tails.push(v);
                } else {
                    tails[idx] = v;
                }
            }
        }
    }
    tails.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::build_alphabet_map;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn score(a: &str, b: &str, opts: &Options) -> f64 {
        let qa = chars(a);
        let map = build_alphabet_map(&qa);
        score_token(&qa, &map, &chars(b), opts)
    }

    #[test]
    fn exact_match_beats_near_miss() {
        let opts = Options::default();
        let same = score("uni", "uni", &opts);
        let other = score("uni", "ina", &opts);
        assert!(same > other, "{same} should exceed {other}");
    }

    #[test]
    fn prefix_match_beats_non_prefix_subsequence() {
        let opts = Options::default();
        let prefixed = score("uni", "university", &opts);
        let scattered = score("uni", "hi", &opts);
        assert!(prefixed > scattered);
    }

    #[test]
    fn surgery_gsurvey_llcs_is_five() {
        // LLCS("surgery", "gsurvey") = s,u,r,e,y = 5, shared by both algorithms
        // when the query token is forced through each path.
        let opts = Options::default();
        let query = chars("surgery");
        let field = chars("gsurvey");
        let map_short = build_alphabet_map(&query);
        let short_score = score_token(&query, &map_short, &field, &opts);

        // Force the long path by padding the alphabet map's tag, but keep the
        // same effective positions: build a map as if the token were long by
        // constructing it through the long branch directly.
        let mut padded_query = query.clone();
        padded_query.extend(std::iter::repeat('_').take(WORD_BITS)); // forces len > WORD_BITS
        let mut padded_field = field.clone();
        padded_field.extend(std::iter::repeat('_').take(WORD_BITS));
        let map_long = build_alphabet_map(&padded_query);
        assert!(matches!(map_long, crate::alphabet::AlphabetMap::Long(_)));
        let long_llcs = llcs_long(&padded_field, &map_long);
        // 5 from "surgery"/"gsurvey" plus WORD_BITS trailing underscores matched.
        assert_eq!(long_llcs, 5 + WORD_BITS);

        let sz = (7.0 + 7.0) / (2.0 * 7.0 * 7.0);
        let expected_short = sz * 25.0 + opts.bonus_match_start * 0.0;
        assert!((short_score - expected_short).abs() < 1e-9);
    }

    #[test]
    fn rel_size_gate_rejects_mismatched_lengths() {
        let opts = Options::default();
        let s = score("ab", "abcdefghijklmnop", &opts); // field way longer than 6x query
        assert_eq!(s, 0.0);
    }

    #[test]
    fn honor_scores_above_of() {
        let opts = Options::default();
        let field = chars("honorificabilitudinitatibus");
        let of = {
            let q = chars("of");
            let map = build_alphabet_map(&q);
            score_token(&q, &map, &field, &opts)
        };
        let honor = {
            let q = chars("honor");
            let map = build_alphabet_map(&q);
            score_token(&q, &map, &field, &opts)
        };
        assert!(honor > of);
    }
}

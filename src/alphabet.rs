//! C1 — Alphabet Map Builder.
//!
//! A token is represented either as a per-character bitmask (short tokens,
//! `len <= WORD_BITS`) or a per-character sorted position list terminated by
//! a sentinel (long tokens). The two are kept as distinct variants so the
//! scorer can dispatch on the tag rather than probe a capacity.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A single machine word used as the bit-parallel scoring lane.
pub type BitMask = u32;

/// Usable bits per word. One bit (the top of `u32`) is kept free as the
/// overflow buffer the bit-parallel LCS recurrence relies on to let a carry
/// propagate without corrupting an unrelated high bit.
pub const WORD_BITS: usize = 31;

/// Position list sentinel: larger than any real token position.
pub const POSITION_SENTINEL: u32 = u32::MAX;

/// A character's match positions within a long token, terminated by
/// [`POSITION_SENTINEL`]. Most tokens hit only a handful of distinct
/// characters more than once, so a small inline buffer avoids heap churn.
pub type PositionList = SmallVec<[u32; 8]>;

/// Per-character lookup built from a single token.
#[derive(Debug, Clone)]
pub enum AlphabetMap {
    /// `len(token) <= WORD_BITS`: one bit per position, keyed by character.
    Short(FxHashMap<char, BitMask>),
    /// `len(token) > WORD_BITS`: ascending position lists, sentinel-terminated.
    Long(FxHashMap<char, PositionList>),
}

impl AlphabetMap {
    pub fn is_short(&self) -> bool {
        matches!(self, AlphabetMap::Short(_))
    }
}

/// Build the alphabet map for `token`, picking the short or long
/// representation based on its length.
pub fn build_alphabet_map(token: &[char]) -> AlphabetMap {
    if token.len() <= WORD_BITS {
        let mut map: FxHashMap<char, BitMask> = FxHashMap::default();
        for (i, &c) in token.iter().enumerate() {
            *map.entry(c).or_insert(0) |= 1 << i;
        }
        AlphabetMap::Short(map)
    } else {
        let mut map: FxHashMap<char, PositionList> = FxHashMap::default();
        for (i, &c) in token.iter().enumerate() {
            map.entry(c).or_default().push(i as u32);
        }
        for positions in map.values_mut() {
            positions.push(POSITION_SENTINEL);
        }
        AlphabetMap::Long(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn short_token_sets_one_bit_per_position() {
        let map = build_alphabet_map(&chars("aba"));
        match map {
            AlphabetMap::Short(m) => {
                assert_eq!(m.get(&'a'), Some(&0b101));
                assert_eq!(m.get(&'b'), Some(&0b010));
                assert_eq!(m.get(&'c'), None);
            }
            AlphabetMap::Long(_) => panic!("expected short variant"),
        }
    }

    #[test]
    fn long_token_lists_positions_with_sentinel() {
        let token: Vec<char> = std::iter::repeat('x').take(WORD_BITS + 5).collect();
        let map = build_alphabet_map(&token);
        match map {
            AlphabetMap::Long(m) => {
                let positions = m.get(&'x').unwrap();
                assert_eq!(positions.len(), WORD_BITS + 5 + 1);
                assert_eq!(*positions.last().unwrap(), POSITION_SENTINEL);
            }
            AlphabetMap::Short(_) => panic!("expected long variant"),
        }
    }

    #[test]
    fn boundary_length_is_short() {
        let token: Vec<char> = std::iter::repeat('q').take(WORD_BITS).collect();
        assert!(build_alphabet_map(&token).is_short());
    }
}

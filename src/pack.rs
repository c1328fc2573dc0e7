//! C2 — Token Packer.
//!
//! Greedy first-fit packing of short query tokens into groups that each fit
//! a single machine word. Long tokens (`len > WORD_BITS`) always get their
//! own solo group using the long-token alphabet variant.

use crate::alphabet::{build_alphabet_map, AlphabetMap, BitMask, WORD_BITS};
use rustc_hash::FxHashMap;

/// One query token placed at `offset` bits within a packed group's word.
#[derive(Debug, Clone)]
pub struct PackedToken {
    pub token: Vec<char>,
    pub offset: usize,
}

/// A group of short tokens sharing one machine word, plus the combined
/// alphabet map and carry-blocking gate (see module docs on [`Group`]).
#[derive(Debug, Clone, Default)]
pub struct PackInfo {
    pub tokens: Vec<PackedToken>,
    pub map: FxHashMap<char, BitMask>,
    pub gate: BitMask,
}

/// One packing unit produced by [`pack_query_tokens`]: either several short
/// tokens sharing a word, or a single long token scored on its own.
#[derive(Debug, Clone)]
pub enum Group {
    Packed(PackInfo),
    Long { token: Vec<char>, map: AlphabetMap },
}

impl Group {
    pub fn len(&self) -> usize {
        match self {
            Group::Packed(p) => p.tokens.len(),
            Group::Long { .. } => 1,
        }
    }
}

#[derive(Default)]
struct Builder {
    tokens: Vec<PackedToken>,
    map: FxHashMap<char, BitMask>,
    gate: BitMask,
    offset: usize,
}

impl Builder {
    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn push(&mut self, token: Vec<char>) {
        let len = token.len();
        for (i, &c) in token.iter().enumerate() {
            *self.map.entry(c).or_insert(0) |= 1 << (self.offset + i);
        }
        if len > 0 {
            self.gate |= ((1u32 << (len - 1)) - 1) << self.offset;
        }
        self.tokens.push(PackedToken {
            token,
            offset: self.offset,
        });
        self.offset += len;
    }

    fn finish(self) -> PackInfo {
        PackInfo {
            tokens: self.tokens,
            map: self.map,
            gate: self.gate,
        }
    }
}

/// Pack `tokens` (in input order) into scoring groups.
pub fn pack_query_tokens(tokens: &[Vec<char>]) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut builder = Builder::default();

    for token in tokens {
        let len = token.len();

        // Must agree with `build_alphabet_map`'s Short/Long boundary
        // (`len <= WORD_BITS` => Short) so a `Group::Long` never wraps a
        // `AlphabetMap::Short`.
        if len > WORD_BITS {
            if !builder.is_empty() {
                groups.push(Group::Packed(std::mem::take(&mut builder).finish()));
            }
            let map = build_alphabet_map(token);
            groups.push(Group::Long {
                token: token.clone(),
                map,
            });
            continue;
        }

        if builder.offset + len > WORD_BITS {
            groups.push(Group::Packed(std::mem::take(&mut builder).finish()));
        }
        builder.push(token.clone());
    }

    if !builder.is_empty() {
        groups.push(Group::Packed(builder.finish()));
    }

    groups
}

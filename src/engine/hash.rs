//! The Transposition Table
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use std::sync::atomic::{AtomicU64, Ordering};
use chess::{Move, Zobrist};
use crate::engine::Score;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Indicates the kind of bound a transposition table score places on the true score.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is a lower bound (the node failed high)
    Lower = 0,
    /// The stored score is exact
    Exact = 1,
    /// The stored score is an upper bound (no move improved alpha)
    Upper = 2,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The payload of a successful probe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashEntry {
    /// The score recorded for the position
    pub score: Score,
    /// What kind of bound the score is
    pub bound: Bound,
    /// The best move found when the entry was recorded
    pub best_move: Move,
}

// Each slot is a single 64-bit word:
//
//   bits  0..16   best move
//   bits 16..22   score, sign extended from six bits
//   bits 22..24   bound type
//   bits 24..64   hash tag (the high 40 bits of the probe key)
//
// The tag proves that the slot belongs to the probing key; an all-zero word is an empty slot.
const MOVE_MASK: u64 = 0xffff;
const SCORE_SHIFT: u32 = 16;
const BOUND_SHIFT: u32 = 22;
const TAG_SHIFT: u32 = 24;

fn pack(key: Zobrist, score: Score, bound: Bound, best_move: Move) -> u64 {
    (u64::from(key) >> TAG_SHIFT << TAG_SHIFT)
        | ((bound as u64) << BOUND_SHIFT)
        | (((score as u8 as u64) & 0x3f) << SCORE_SHIFT)
        | u64::from(u16::from(best_move))
}

fn unpack(word: u64) -> Option<HashEntry> {
    let best_move = Move::try_from((word & MOVE_MASK) as u16).ok()?;
    // sign extend the six-bit score
    let score = ((word >> SCORE_SHIFT) as u8) << 2;
    let score = (score as i8 >> 2) as Score;
    let bound = match (word >> BOUND_SHIFT) & 0x3 {
        0 => Bound::Lower,
        1 => Bound::Exact,
        2 => Bound::Upper,
        _ => return None,
    };

    Some(HashEntry { score, bound, best_move })
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A fixed-size transposition table with lock-free shared access.
///
/// The table holds a power of two number of eight-byte slots, indexed by the low bits of the
/// probe key, with the key's high bits stored in the slot as a tag. Stores always replace
/// whatever the slot held. All access is through relaxed atomic loads and stores of the whole
/// word, so concurrent searchers can share the table without locks: an entry is written or read
/// in one piece, and a slot overwritten by another thread simply fails the tag check and reads
/// as a miss. Lost updates are harmless for the same reason; at worst a speedup is forgone.
#[derive(Debug)]
pub struct HashTable {
    slots: Vec<AtomicU64>,
    mask: u64,
}

impl HashTable {
    /// Creates a zeroed table with `2^bits` slots, occupying `8 * 2^bits` bytes.
    pub fn new(bits: u32) -> HashTable {
        let len = 1usize << bits;
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || AtomicU64::new(0));

        HashTable { slots, mask: (len - 1) as u64 }
    }

    /// Looks up the entry for `key`, if one is present.
    pub fn probe(&self, key: Zobrist) -> Option<HashEntry> {
        let key = u64::from(key);
        let word = self.slots[(key & self.mask) as usize].load(Ordering::Relaxed);

        if word >> TAG_SHIFT == key >> TAG_SHIFT {
            unpack(word)
        } else {
            None
        }
    }

    /// Records an entry for `key`, unconditionally replacing the previous occupant of its slot.
    pub fn store(&self, key: Zobrist, score: Score, bound: Bound, best_move: Move) {
        let word = pack(key, score, bound, best_move);
        self.slots[(u64::from(key) & self.mask) as usize].store(word, Ordering::Relaxed);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use chess::{Position, Square};

    fn key_for(fen: &str) -> Zobrist {
        fen.parse::<Position>().expect("valid fen").zobrist_key()
    }

    #[test]
    fn probe_returns_what_store_recorded() {
        let table = HashTable::new(12);
        let key = Position::new().zobrist_key();
        let mv = Move::new(Square::G1, Square::F3);

        assert_eq!(table.probe(key), None);

        table.store(key, 1, Bound::Exact, mv);
        assert_eq!(table.probe(key), Some(HashEntry {
            score: 1,
            bound: Bound::Exact,
            best_move: mv,
        }));

        // negative scores survive the six-bit packing
        table.store(key, -1, Bound::Upper, mv);
        assert_eq!(table.probe(key).expect("hit").score, -1);
    }

    #[test]
    fn mismatched_tags_miss() {
        let table = HashTable::new(12);
        let a = key_for("K1k5/8/8/8/8/8/8/8 w - - 0 1");
        let b = key_for("K1k5/8/8/8/8/8/8/8 b - - 0 1");

        table.store(a, 1, Bound::Exact, Move::new(Square::A8, Square::A7));
        assert_eq!(table.probe(b), None);
    }

    #[test]
    fn stores_replace_unconditionally() {
        let table = HashTable::new(12);
        let key = Position::new().zobrist_key();

        table.store(key, 0, Bound::Upper, Move::new(Square::G1, Square::F3));
        table.store(key, 1, Bound::Lower, Move::new(Square::B1, Square::C3));

        let entry = table.probe(key).expect("hit");
        assert_eq!(entry.score, 1);
        assert_eq!(entry.bound, Bound::Lower);
        assert_eq!(entry.best_move, Move::new(Square::B1, Square::C3));
    }

    #[test]
    fn depth_salted_keys_do_not_collide() {
        let table = HashTable::new(12);
        let key = Position::new().zobrist_key();

        table.store(key.with_depth(3), 1, Bound::Exact, Move::new(Square::G1, Square::F3));
        assert_eq!(table.probe(key.with_depth(2)), None);
        assert!(table.probe(key.with_depth(3)).is_some());
    }
}

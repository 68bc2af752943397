//! Contains structure and data for Zobrist hash keys
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use crate::{Color, File, Piece, Square};

/// The largest search depth which can be mixed into a key with
/// [`with_depth`](struct.Zobrist.html#method.with_depth)
pub const MAX_KEYED_DEPTH: usize = 255;

lazy_static! {
    static ref KEYS: Keys = Keys::new();
}

struct Keys {
    piece_placement: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    castling_rights: [u64; 16],
    ep_file: [u64; File::COUNT],
    black_move: u64,
    depth: [u64; MAX_KEYED_DEPTH + 1],
}

impl Keys {
    fn new() -> Keys {
        // a fixed seed keeps keys identical across runs and threads
        let mut rng = StdRng::seed_from_u64(0x7ab5_16c9_7d4c_9a33);

        let mut piece_placement = [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT];
        for color in piece_placement.iter_mut() {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.next_u64();
                }
            }
        }

        // rights masks are keyed as a whole, so the empty mask keys to zero
        let mut castling_rights = [0; 16];
        for key in castling_rights.iter_mut().skip(1) {
            *key = rng.next_u64();
        }

        let mut ep_file = [0; File::COUNT];
        for key in ep_file.iter_mut() {
            *key = rng.next_u64();
        }

        let black_move = rng.next_u64();

        let mut depth = [0; MAX_KEYED_DEPTH + 1];
        for key in depth.iter_mut() {
            *key = rng.next_u64();
        }

        Keys {
            piece_placement,
            castling_rights,
            ep_file,
            black_move,
            depth,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
///
/// The key is assembled by XOR of one random constant per board feature, so it can be updated
/// incrementally as moves are made: toggling a feature twice removes it again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles piece placement
    pub fn toggle_piece_placement(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= KEYS.piece_placement[c as usize][p as usize][sq as usize];
    }

    /// Toggles an en passant file
    pub fn toggle_ep_file(&mut self, file: File) {
        self.0 ^= KEYS.ep_file[file as usize];
    }

    /// Toggles the full four-bit castling rights mask
    pub fn toggle_castling_rights(&mut self, rights: u8) {
        self.0 ^= KEYS.castling_rights[rights as usize & 0xf];
    }

    /// Toggles whose turn it is
    pub fn toggle_turn(&mut self) {
        self.0 ^= KEYS.black_move;
    }

    /// Returns the key salted with the given search depth.
    ///
    /// Transposition table entries are probed and stored under the salted key, so an entry
    /// recorded with `depth` remaining can never be confused with one for the same position at a
    /// different depth. Depth zero leaves the key unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `depth` exceeds [`MAX_KEYED_DEPTH`](constant.MAX_KEYED_DEPTH.html).
    pub fn with_depth(self, depth: usize) -> Zobrist {
        Zobrist(self.0 ^ KEYS.depth[depth].wrapping_mul(depth as u64))
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::UpperHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::LowerHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Octal for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Binary for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to get a hash table index
    ///
    /// # Example
    /// ```rust
    /// use chess::Position;
    ///
    /// let pos = Position::new();
    /// let hash_table_size: usize = 0x10_0000;
    /// let index = u64::from(pos.zobrist_key()) as usize & (hash_table_size - 1);
    /// ```
    fn from(key: Zobrist) -> Self {
        key.0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_is_the_identity() {
        let mut key = Zobrist::new();
        key.toggle_piece_placement(Color::White, Piece::Knight, Square::G1);
        assert_ne!(key, Zobrist::new());
        key.toggle_piece_placement(Color::White, Piece::Knight, Square::G1);
        assert_eq!(key, Zobrist::new());
    }

    #[test]
    fn empty_castling_rights_key_to_zero() {
        let mut key = Zobrist::new();
        key.toggle_castling_rights(0);
        assert_eq!(key, Zobrist::new());
        key.toggle_castling_rights(0xf);
        assert_ne!(key, Zobrist::new());
    }

    #[test]
    fn depth_salts_are_distinct() {
        let key = Zobrist::new();
        assert_eq!(key.with_depth(0), key);

        let mut salted = std::collections::HashSet::new();
        for depth in 0..=MAX_KEYED_DEPTH {
            salted.insert(u64::from(key.with_depth(depth)));
        }
        assert_eq!(salted.len(), MAX_KEYED_DEPTH + 1);
    }

    #[test]
    fn keys_are_deterministic() {
        let mut a = Zobrist::new();
        let mut b = Zobrist::new();
        a.toggle_turn();
        b.toggle_turn();
        assert_eq!(a, b);
    }
}

//! Provides data and functions used to compute attacks
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use lazy_static::lazy_static;
use super::*;
use crate::{Color, File, Square};

lazy_static! {
    static ref TABLES: Tables = Tables::new();
}

// Directions are ordered so that the opposite of direction d is d + 4.
const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1),
];
const NORTH: usize = 0;
const NORTH_EAST: usize = 1;
const SOUTH_EAST: usize = 3;
const SOUTH: usize = 4;
const SOUTH_WEST: usize = 5;
const NORTH_WEST: usize = 7;

struct Tables {
    king: [Bitboard; Square::COUNT],
    knight: [Bitboard; Square::COUNT],
    pawn: [[Bitboard; Square::COUNT]; Color::COUNT],
    file_mask: [u64; Square::COUNT],
    diag_mask: [u64; Square::COUNT],
    anti_mask: [u64; Square::COUNT],
    rank_attacks: [[u8; 64]; File::COUNT],
    between: [[Bitboard; Square::COUNT]; Square::COUNT],
    line: [[Bitboard; Square::COUNT]; Square::COUNT],
    ray: [[Bitboard; Square::COUNT]; Square::COUNT],
}

impl Tables {
    fn new() -> Tables {
        // one ray per direction and origin, excluding the origin itself
        let mut rays = [[0u64; Square::COUNT]; 8];
        for (d, &(dx, dy)) in DIRECTIONS.iter().enumerate() {
            for sq in 0..Square::COUNT {
                rays[d][sq] = walk(sq, &[(dx, dy)], true);
            }
        }

        let mut king = [Bitboard::new(); Square::COUNT];
        let mut knight = [Bitboard::new(); Square::COUNT];
        let mut pawn = [[Bitboard::new(); Square::COUNT]; Color::COUNT];
        let mut file_mask = [0u64; Square::COUNT];
        let mut diag_mask = [0u64; Square::COUNT];
        let mut anti_mask = [0u64; Square::COUNT];
        for sq in 0..Square::COUNT {
            king[sq] = Bitboard::from(walk(sq, &DIRECTIONS, false));
            knight[sq] = Bitboard::from(walk(sq,
                &[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)], false));
            pawn[Color::White as usize][sq] = Bitboard::from(walk(sq, &[(-1, 1), (1, 1)], false));
            pawn[Color::Black as usize][sq] = Bitboard::from(walk(sq, &[(-1, -1), (1, -1)], false));

            file_mask[sq] = rays[NORTH][sq] | rays[SOUTH][sq];
            diag_mask[sq] = rays[NORTH_EAST][sq] | rays[SOUTH_WEST][sq];
            anti_mask[sq] = rays[NORTH_WEST][sq] | rays[SOUTH_EAST][sq];
        }

        // sliding attacks along a single rank, indexed by the occupancy of its six
        // inner squares
        let mut rank_attacks = [[0u8; 64]; File::COUNT];
        for file in 0..File::COUNT {
            for occ in 0..64 {
                let occ = (occ << 1) as u8;
                let mut att = 0u8;
                for f in file + 1..File::COUNT {
                    att |= 1 << f;
                    if occ & (1 << f) != 0 {
                        break;
                    }
                }
                for f in (0..file).rev() {
                    att |= 1 << f;
                    if occ & (1 << f) != 0 {
                        break;
                    }
                }
                rank_attacks[file][(occ >> 1) as usize] = att;
            }
        }

        let mut between = [[Bitboard::new(); Square::COUNT]; Square::COUNT];
        let mut line = [[Bitboard::new(); Square::COUNT]; Square::COUNT];
        let mut ray = [[Bitboard::new(); Square::COUNT]; Square::COUNT];
        for a in 0..Square::COUNT {
            for d in 0..8 {
                let opp = (d + 4) % 8;
                for b in Bitboard::from(rays[d][a]) {
                    let b = b as usize;
                    between[a][b] = Bitboard::from(rays[d][a] & rays[opp][b]);
                    line[a][b] = Bitboard::from(rays[d][a] | rays[opp][a] | (1 << a));
                    ray[a][b] = Bitboard::from(rays[d][a]);
                }
            }
        }

        Tables {
            king, knight, pawn,
            file_mask, diag_mask, anti_mask,
            rank_attacks,
            between, line, ray,
        }
    }
}

/// Collects the squares reached by taking each step in `steps` from `sq`, walking repeatedly
/// in the same direction when `slide` is set.
fn walk(sq: usize, steps: &[(i8, i8)], slide: bool) -> u64 {
    let mut board = 0;

    for &(dx, dy) in steps {
        let mut file = (sq % File::COUNT) as i8 + dx;
        let mut rank = (sq / File::COUNT) as i8 + dy;

        while (0..8).contains(&file) && (0..8).contains(&rank) {
            board |= 1u64 << (rank * 8 + file);
            if !slide {
                break;
            }
            file += dx;
            rank += dy;
        }
    }

    board
}

/// Computes the attacks along a single masked line using the subtract-and-byte-swap trick.
///
/// Works for files, diagonals and anti-diagonals, where each rank holds at most one square of
/// the line, but not for ranks.
fn hyperbola(sq: Square, occ: Bitboard, mask: u64) -> u64 {
    let piece = 1u64 << sq as u64;
    let masked = u64::from(occ) & mask;

    let mut att = masked.wrapping_sub(piece.wrapping_mul(2));
    att ^= masked.swap_bytes()
        .wrapping_sub(piece.swap_bytes().wrapping_mul(2))
        .swap_bytes();

    att & mask
}

/// Computes sliding attacks along the rank of `sq` based on the occupied squares
/// given by `occ`
///
/// This function is similar to [`rook_attacks`](fn.rook_attacks.html), but only computes attacks
/// along a single rank. This is useful for determining if the space is clear between the
/// king and a rook as required for castling.
///
/// ```rust
/// use chess::Square;
/// use chess::bitboard::{Bitboard, rank_attacks};
///
/// // squares occupied by white rooks
/// let rooks = Bitboard::from(Square::A1) | Square::H1.into();
/// // occupied squares (those on the first rank, anyway)
/// let occ = rooks | Square::D1.into() | Square::E1.into();
/// // rooks with no pieces between them and the king on e1
/// let mut visible_rooks = rank_attacks(Square::E1, occ) & rooks;
/// assert_eq!(visible_rooks.pop(), Some(Square::H1));
/// assert_eq!(visible_rooks.pop(), None);
/// ```
pub fn rank_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let rank = sq.rank() as usize;
    let inner = ((u64::from(occ) >> (rank * 8 + 1)) & 0o77) as usize;

    Bitboard::from((TABLES.rank_attacks[sq.file() as usize][inner] as u64) << (rank * 8))
}

/// Computes knight-like attacks to or from `sq`
///
/// See the module-level documentation for more information about
/// [this function](index.html#direct-attacks-knights-and-kings) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    TABLES.knight[sq as usize]
}

/// Computes king-like attacks to or from `sq`
///
/// See the module-level documentation for more information about
/// [this function](index.html#direct-attacks-knights-and-kings) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    TABLES.king[sq as usize]
}

/// Computes the squares attacked by a pawn of color `c` standing on `sq`
#[inline]
pub fn pawn_attacks(c: Color, sq: Square) -> Bitboard {
    TABLES.pawn[c as usize][sq as usize]
}

/// Computes bishop-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
///
/// See the module-level documentation for more information about
/// [this function](index.html#sliding-attacks-bishops-rooks-and-queens) and
/// [other attack functions](index.html#moves-and-attacks).
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let diag = hyperbola(sq, occ, TABLES.diag_mask[sq as usize]);
    let anti = hyperbola(sq, occ, TABLES.anti_mask[sq as usize]);

    Bitboard::from(diag | anti)
}

/// Computes rook-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
///
/// See the module-level documentation for more information about
/// [this function](index.html#sliding-attacks-bishops-rooks-and-queens) and
/// [other attack functions](index.html#moves-and-attacks).
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let file = hyperbola(sq, occ, TABLES.file_mask[sq as usize]);

    Bitboard::from(file) | rank_attacks(sq, occ)
}

/// Computes queen-like attacks to or from `sq` based on the occupied squares
/// given by `occ`
///
/// See the module-level documentation for more information about
/// [this function](index.html#sliding-attacks-bishops-rooks-and-queens) and
/// [other attack functions](index.html#moves-and-attacks).
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Returns the squares strictly between `a` and `b`
///
/// The result is empty unless the two squares share a rank, file or diagonal.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    TABLES.between[a as usize][b as usize]
}

/// Returns the full line (edge to edge) through `a` and `b`, including both squares
///
/// The result is empty unless the two squares share a rank, file or diagonal.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    TABLES.line[a as usize][b as usize]
}

/// Returns the squares from `a` through `b` and on to the edge of the board, excluding `a`
///
/// The result is empty unless the two squares share a rank, file or diagonal.
#[inline]
pub fn ray(a: Square, b: Square) -> Bitboard {
    TABLES.ray[a as usize][b as usize]
}

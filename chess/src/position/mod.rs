//! Contains structures related to the `Position`.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::fmt;
use super::*;

use crate::bitboard::*;
use crate::moves::MoveType;

use Color::*;
use Piece::*;

pub mod zobrist;
use zobrist::Zobrist;

pub(crate) const CASTLE_KING_SIDE: u8 = 0x1;
pub(crate) const CASTLE_QUEEN_SIDE: u8 = 0x2;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game, as well
/// as castling availability and en passant legality.
///
/// The board is packed into eight 64-bit words: one bitboard per piece type holding the pieces of
/// both colors, one bitboard distinguishing the black pieces, and the remaining state (castling
/// rights, en passant file, halfmove clock and side to move) alongside the incrementally
/// maintained [`Zobrist`](zobrist/struct.Zobrist.html) key.
///
/// # Instantiation
/// There are three typical ways of creating a new `Position` structure.
///  -  The [`new`](#method.new) method creates a `Position` structure containing the standard
///     starting position.
///  -  The [`from_fen_str`](#method.from_fen_str) method (along with its synonyms `from_str` and
///     `str::parse`) creates a new `Position` structure from a string containing [Forsyth-Edwards
///     Notation (FEN)](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation).
///  -  As a result of [`make`](#method.make).
///
/// # Generating Moves
/// The most important thing that can be done with a `Position` is to generate the legal
/// [`Move`](../struct.Move.html)s from it, using the operations of the
/// [`movegen`](../movegen/index.html) module. Unlike a pseudo-legal generator, every move handed
/// out can be played directly with [`make`](#method.make):
///
/// ```rust
/// use chess::Position;
/// use chess::movegen;
///
/// let pos = Position::new();
///
/// for mv in movegen::legal_moves(&pos) {
///     let new_pos = pos.make(mv);
///     // do something useful
/// }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    zobrist: Zobrist,
    kinds: [Bitboard; Piece::COUNT],
    black: Bitboard,
    turn: Color,
    castling_rights: u8,
    ep_file: Option<File>,
    halfmove_clock: u16,
}

impl Position {
    /// Returns the standard starting Position.
    pub fn new() -> Position {
        let mut pos = Position {
            zobrist: Zobrist::new(),
            kinds: [
                // pawns
                Bitboard::from(0x00ff_0000_0000_ff00u64),
                // knights
                Bitboard::from(0x4200_0000_0000_0042u64),
                // bishops
                Bitboard::from(0x2400_0000_0000_0024u64),
                // rooks
                Bitboard::from(0x8100_0000_0000_0081u64),
                // queens
                Bitboard::from(0x0800_0000_0000_0008u64),
                // kings
                Bitboard::from(0x1000_0000_0000_0010u64),
            ],
            black: Bitboard::from(0xffff_0000_0000_0000u64),
            turn: White,
            castling_rights: 0xf,
            ep_file: None,
            halfmove_clock: 0,
        };
        pos.zobrist = pos.compute_key();

        pos
    }

    /// Parse a position from a string containing [Forsyth-Edwards
    /// Notation (FEN)](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation).
    ///
    /// The position is checked against the board invariants: one king per side, no pawns on the
    /// first or last rank, the side not on move cannot be in check, castling rights require the
    /// king and rook to be on their original squares, and the en passant square must be
    /// consistent with a pawn having just advanced two squares.
    pub fn from_fen_str(s: &str) -> Result<Position> {
        use Error::*;

        let mut pos = Position {
            zobrist: Zobrist::new(),
            kinds: [Bitboard::new(); Piece::COUNT],
            black: Bitboard::new(),
            turn: White,
            castling_rights: 0,
            ep_file: None,
            halfmove_clock: 0,
        };
        let mut fields = s.trim().split_whitespace();

        // parse the board
        if let Some(board) = fields.next() {
            let mut r = Rank::COUNT - 1;
            let mut f = 0;
            for c in board.chars() {
                match c {
                    '1' ..= '8' => {
                        f += c.to_digit(10).expect("INFALLIBLE") as usize;
                        if f > 8 {
                            return Err(ParseError);
                        }
                    }
                    '/' => {
                        if f == File::COUNT && r > 0 {
                            r -= 1;
                            f = 0;
                        } else {
                            return Err(ParseError);
                        }
                    }
                    _ => {
                        let sq = match (f.try_into(), r.try_into()) {
                            (Ok(f), Ok(r)) => Square::from_coord(f, r),
                            _ => return Err(ParseError),
                        };
                        let color = if c.is_uppercase() { White } else { Black };
                        let piece: Piece = c.to_string().parse()?;

                        pos.kinds[piece as usize].insert(sq);
                        if color == Black {
                            pos.black.insert(sq);
                        }

                        f += 1;
                    }
                }
            }
            if r > 0 || f < 8 {
                return Err(ParseError);
            }
        } else {
            return Err(ParseError);
        }

        // parse the turn
        match fields.next() {
            Some(turn) => { pos.turn = turn.parse()?; },
            None => return Err(ParseError),
        }

        // parse the castling flags
        match fields.next() {
            Some("-") => {},
            Some(castling_flags) => {
                for c in castling_flags.chars() {
                    match c {
                        'K' => pos.castling_rights |= CASTLE_KING_SIDE,
                        'Q' => pos.castling_rights |= CASTLE_QUEEN_SIDE,
                        'k' => pos.castling_rights |= CASTLE_KING_SIDE << 2,
                        'q' => pos.castling_rights |= CASTLE_QUEEN_SIDE << 2,
                        _ => return Err(ParseError),
                    }
                }
            },
            None => return Err(ParseError),
        }

        // parse en passant square
        match fields.next() {
            Some("-") => {},
            Some(ep_square) => {
                let sq: Square = ep_square.parse()?;
                let expected_rank = if pos.turn == White { Rank::R6 } else { Rank::R3 };
                if sq.rank() != expected_rank {
                    return Err(ParseError);
                }
                pos.ep_file = Some(sq.file());
            },
            None => return Err(ParseError),
        }

        // parse half move clock, if present
        if let Some(plies) = fields.next() {
            match plies.parse() {
                Ok(plies) => { pos.halfmove_clock = plies; },
                Err(_) => return Err(ParseError),
            }
        }

        // parse and discard the move number, if present
        if let Some(move_num) = fields.next() {
            if move_num.parse::<usize>().is_err() {
                return Err(ParseError);
            }
        }

        pos.validate()?;

        // an en passant file is only kept when a capture is actually available, so that
        // positions reached by different routes hash identically
        if let Some(file) = pos.ep_file {
            let victim_rank = if pos.turn == White { Rank::R5 } else { Rank::R4 };
            let victim: Bitboard = Square::from_coord(file, victim_rank).into();
            let capturers = (victim.shift_xy(-1, 0) | victim.shift_xy(1, 0))
                & pos.occupied_by_piece(pos.turn, Pawn);
            if capturers.is_empty() {
                pos.ep_file = None;
            }
        }

        pos.zobrist = pos.compute_key();

        Ok(pos)
    }

    /// Checks the invariants described in [`from_fen_str`](#method.from_fen_str).
    fn validate(&self) -> Result<()> {
        use Error::*;

        // exactly one king per side
        for &c in &[White, Black] {
            if self.occupied_by_piece(c, King).len() != 1 {
                return Err(InvalidKingCount);
            }
        }

        // no pawns on the first or last rank
        let edge_ranks = Bitboard::from(Rank::R1) | Rank::R8.into();
        if self.kinds[Pawn as usize].intersects(edge_ranks) {
            return Err(InvalidPawnRank);
        }

        // the king of the side not on move must not be attacked
        if self.square_attacked_by(self.king_location(!self.turn), self.turn) {
            return Err(KingCapturable);
        }

        // castling rights require the king and rook on their original squares
        for &(color, king_sq, rook_sq, right) in &[
            (White, Square::E1, Square::H1, CASTLE_KING_SIDE),
            (White, Square::E1, Square::A1, CASTLE_QUEEN_SIDE),
            (Black, Square::E8, Square::H8, CASTLE_KING_SIDE << 2),
            (Black, Square::E8, Square::A8, CASTLE_QUEEN_SIDE << 2),
        ] {
            if self.castling_rights & right != 0
                && (self.king_location(color) != king_sq
                    || !self.occupied_by_piece(color, Rook).contains(rook_sq)) {
                return Err(InvalidCastlingFlags);
            }
        }

        // the en passant square must be empty and the captured pawn present
        if let Some(file) = self.ep_file {
            let (ep_rank, victim_rank) = if self.turn == White {
                (Rank::R6, Rank::R5)
            } else {
                (Rank::R3, Rank::R4)
            };
            if self.occupied().contains(Square::from_coord(file, ep_rank)) {
                return Err(EnPassantSquareOccupied);
            }
            if !self.occupied_by_piece(!self.turn, Pawn)
                .contains(Square::from_coord(file, victim_rank)) {
                return Err(MissingEnPassantPawn);
            }
        }

        Ok(())
    }

    /// Converts the position to a FEN string.
    pub fn to_fen_str(&self) -> String {
        // the board
        let mut board = String::new();
        for r in (0..Rank::COUNT).rev() {
            let mut count = 0;
            for f in 0..File::COUNT {
                let sq = Square::from_coord(
                    f.try_into().expect("INFALLIBLE"),
                    r.try_into().expect("INFALLIBLE"));

                if let Some((c, p)) = self.piece_at(sq) {
                    if count > 0 {
                        board += &count.to_string();
                        count = 0;
                    }

                    if c == White {
                        board += &p.to_string();
                    } else {
                        board += &p.to_string().to_lowercase();
                    }
                } else {
                    count += 1;
                }
            }
            if count > 0 {
                board += &count.to_string();
            }
            if r > 0 {
                board += "/";
            }
        }

        // whose turn it is
        let turn = self.turn.to_string();

        // castling rights
        let mut castling = String::new();
        for &(flag, right) in &[
            ("K", CASTLE_KING_SIDE), ("Q", CASTLE_QUEEN_SIDE),
            ("k", CASTLE_KING_SIDE << 2), ("q", CASTLE_QUEEN_SIDE << 2),
        ] {
            if self.castling_rights & right != 0 {
                castling += flag;
            }
        }
        if castling.is_empty() {
            castling += "-";
        }

        // en passant square
        let ep_square = match self.ep_file {
            Some(file) => {
                let rank = if self.turn == White { Rank::R6 } else { Rank::R3 };
                Square::from_coord(file, rank).to_string()
            },
            None => "-".to_string(),
        };

        // the move counters; full move numbers are not tracked
        format!("{} {} {} {} {} 1", board, turn, castling, ep_square, self.halfmove_clock)
    }

    /// Returns the color whose turn it is.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the en-passant file, if any.
    pub fn en_passant_file(&self) -> Option<File> {
        self.ep_file
    }

    /// Returns the number of plies which count toward the fifty move rule.
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Returns `true` if king-side castling rights are available for `c`.
    pub fn has_king_side_castling_rights(&self, c: Color) -> bool {
        self.castling_rights & (CASTLE_KING_SIDE << (2 * c as u8)) != 0
    }

    /// Returns `true` if queen-side castling rights are available for `c`.
    pub fn has_queen_side_castling_rights(&self, c: Color) -> bool {
        self.castling_rights & (CASTLE_QUEEN_SIDE << (2 * c as u8)) != 0
    }

    /// Returns a `Bitboard` of all occupied `Square`s.
    pub fn occupied(&self) -> Bitboard {
        self.kinds.iter().fold(Bitboard::new(), |occ, &b| occ | b)
    }

    /// Returns a `Bitboard` of `Squares` occupied by player `c`.
    pub fn occupied_by(&self, c: Color) -> Bitboard {
        match c {
            White => self.occupied() ^ self.black,
            Black => self.black,
        }
    }

    /// Returns a `Bitboard` of `Squares` occupied by the given `Piece` type of either color.
    pub fn occupied_by_kind(&self, p: Piece) -> Bitboard {
        self.kinds[p as usize]
    }

    /// Returns a `Bitboard` of `Squares` occupied by the given `Piece` and `Color`.
    pub fn occupied_by_piece(&self, c: Color, p: Piece) -> Bitboard {
        self.kinds[p as usize] & self.occupied_by(c)
    }

    /// Returns the square where the king of the given color is located.
    pub fn king_location(&self, c: Color) -> Square {
        self.occupied_by_piece(c, King).peek().expect("INFALLIBLE")
    }

    /// Returns the color and type of piece, if any, at the given location.
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let color = if self.black.contains(sq) { Black } else { White };
        self.kind_at(sq).map(|piece| (color, piece))
    }

    /// Returns the type of piece, if any, at the given location.
    pub(crate) fn kind_at(&self, sq: Square) -> Option<Piece> {
        for (kind, board) in self.kinds.iter().enumerate() {
            if board.contains(sq) {
                return Some(kind.try_into().expect("INFALLIBLE"));
            }
        }

        None
    }

    /// Return the position's Zobrist key.
    pub fn zobrist_key(&self) -> Zobrist {
        self.zobrist
    }

    /// Calculate the position's Zobrist key from scratch.
    ///
    /// The key maintained incrementally by [`make`](#method.make) always equals the recomputed
    /// key; this method exists so that the equivalence can be checked.
    pub fn compute_key(&self) -> Zobrist {
        let mut key = Zobrist::new();

        if self.turn == Black {
            key.toggle_turn();
        }

        if let Some(file) = self.ep_file {
            key.toggle_ep_file(file);
        }

        key.toggle_castling_rights(self.castling_rights);

        for &c in &[White, Black] {
            for &p in &[Pawn, Knight, Bishop, Rook, Queen, King] {
                for sq in self.occupied_by_piece(c, p) {
                    key.toggle_piece_placement(c, p, sq);
                }
            }
        }

        key
    }

    /// Returns all pieces of either color which attack `sq`, given the occupancy `occ`.
    ///
    /// Passing an occupancy other than [`occupied`](#method.occupied) allows attacks to be
    /// probed with pieces removed, for example to see through the king when testing its
    /// flight squares.
    pub fn attackers_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let queens = self.kinds[Queen as usize];
        let white = self.occupied() ^ self.black;

        (knight_attacks(sq) & self.kinds[Knight as usize])
            | (king_attacks(sq) & self.kinds[King as usize])
            | (rook_attacks(sq, occ) & (self.kinds[Rook as usize] | queens))
            | (bishop_attacks(sq, occ) & (self.kinds[Bishop as usize] | queens))
            | (pawn_attacks(White, sq) & self.kinds[Pawn as usize] & self.black)
            | (pawn_attacks(Black, sq) & self.kinds[Pawn as usize] & white)
    }

    /// Returns `true` if `sq` is attacked by a piece of color `c`.
    pub fn square_attacked_by(&self, sq: Square, c: Color) -> bool {
        self.square_attacked_by_occ(sq, c, self.occupied())
    }

    /// Returns `true` if `sq` is attacked by a piece of color `c`, given the occupancy `occ`.
    pub fn square_attacked_by_occ(&self, sq: Square, c: Color, occ: Bitboard) -> bool {
        self.attackers_to(sq, occ).intersects(self.occupied_by(c))
    }

    /// Returns the pieces of the side not on move which attack the king of the side on move.
    pub fn checkers(&self) -> Bitboard {
        self.attackers_to(self.king_location(self.turn), self.occupied())
            & self.occupied_by(!self.turn)
    }

    /// Returns `true` if the color to move is in check.
    pub fn in_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    /// Returns the pieces of either color which are the sole blocker between one of `sliders`
    /// and the square `sq`.
    ///
    /// A blocker of the king's square is a pinned piece when it belongs to the king's side, and
    /// a discovered-check candidate when it belongs to the slider's side.
    pub fn slider_blockers(&self, sliders: Bitboard, sq: Square) -> Bitboard {
        let queens = self.kinds[Queen as usize];
        let occ = self.occupied();

        // snipers are sliders that would attack sq if the board were otherwise empty
        let snipers = ((rook_attacks(sq, Bitboard::new())
                    & (self.kinds[Rook as usize] | queens))
                | (bishop_attacks(sq, Bitboard::new())
                    & (self.kinds[Bishop as usize] | queens)))
            & sliders;

        let mut blockers = Bitboard::new();
        for sniper in snipers {
            let blocking = between(sq, sniper) & occ;
            if blocking.len() == 1 {
                blockers |= blocking;
            }
        }

        blockers
    }

    /// Returns `true` if the legal move `m` puts the opposing king in check.
    ///
    /// Both direct checks and discovered checks are detected, as are the unusual checks
    /// delivered by the castling rook, a promoted piece, or the disappearance of an en passant
    /// victim.
    pub fn gives_check(&self, m: Move) -> bool {
        let us = self.turn;
        let them = !us;
        let ksq = self.king_location(them);
        let occ = self.occupied();
        let orig = m.origin();
        let dest = m.destination();
        let piece = self.kind_at(orig).expect("INFALLIBLE");

        // direct check from the destination square
        let direct = match piece {
            Pawn => pawn_attacks(them, ksq).contains(dest),
            Knight => knight_attacks(ksq).contains(dest),
            Bishop => bishop_attacks(ksq, occ).contains(dest),
            Rook => rook_attacks(ksq, occ).contains(dest),
            Queen => queen_attacks(ksq, occ).contains(dest),
            King => false,
        };
        if direct {
            return true;
        }

        // discovered check: the mover steps off the line between a slider and the king
        if self.slider_blockers(self.occupied_by(us), ksq).contains(orig)
            && !line(orig, ksq).contains(dest) {
            return true;
        }

        match m.move_type() {
            MoveType::Promotion(prom) => {
                // the promoted piece attacks from the destination with the pawn gone
                let occ = occ ^ orig.into();
                match Piece::from(prom) {
                    Knight => knight_attacks(ksq).contains(dest),
                    Bishop => bishop_attacks(ksq, occ).contains(dest),
                    Rook => rook_attacks(ksq, occ).contains(dest),
                    Queen => queen_attacks(ksq, occ).contains(dest),
                    _ => unreachable!(),
                }
            },
            MoveType::EnPassant => {
                // the captured pawn may unmask a slider on its rank or diagonal
                let capt_sq = Square::from_coord(dest.file(), orig.rank());
                let occ = (occ ^ orig.into() ^ capt_sq.into()) | dest.into();
                let queens = self.kinds[Queen as usize];

                ((rook_attacks(ksq, occ) & (self.kinds[Rook as usize] | queens))
                        | (bishop_attacks(ksq, occ) & (self.kinds[Bishop as usize] | queens)))
                    .intersects(self.occupied_by(us))
            },
            MoveType::CastleKingSide | MoveType::CastleQueenSide => {
                let rank = orig.rank();
                let (rook_orig, rook_dest) = if m.move_type() == MoveType::CastleKingSide {
                    (Square::from_coord(File::H, rank), Square::from_coord(File::F, rank))
                } else {
                    (Square::from_coord(File::A, rank), Square::from_coord(File::D, rank))
                };
                let occ = (occ ^ orig.into() ^ rook_orig.into())
                    | dest.into() | rook_dest.into();

                rook_attacks(ksq, occ).contains(rook_dest)
            },
            _ => false,
        }
    }

    /// Make the legal move `m`, returning the resulting position.
    ///
    /// The moves produced by the [`movegen`](../movegen/index.html) operations are fully legal,
    /// so this function does not re-validate them. The Zobrist key of the result is updated
    /// incrementally as pieces are moved.
    pub fn make(&self, m: Move) -> Position {
        let mut pos = self.clone();
        let us = self.turn;
        let them = !us;
        let orig = m.origin();
        let dest = m.destination();
        let piece = self.kind_at(orig).expect("INFALLIBLE");

        // remove any captured piece, including the en passant victim which does not stand on
        // the destination square
        if m.is_capture() {
            let (capt_sq, capt_pc) = if m.is_en_passant() {
                (Square::from_coord(dest.file(), orig.rank()), Pawn)
            } else {
                (dest, self.kind_at(dest).expect("INFALLIBLE"))
            };

            pos.kinds[capt_pc as usize].toggle(capt_sq);
            if them == Black {
                pos.black.toggle(capt_sq);
            }
            pos.zobrist.toggle_piece_placement(them, capt_pc, capt_sq);
        }

        // move the piece to its new location, promoting if required
        let mask = Bitboard::from(orig) | dest.into();
        pos.zobrist.toggle_piece_placement(us, piece, orig);
        match m.promotion() {
            Some(prom) => {
                let prom: Piece = prom.into();
                pos.kinds[Pawn as usize].toggle(orig);
                pos.kinds[prom as usize].toggle(dest);
                pos.zobrist.toggle_piece_placement(us, prom, dest);
            },
            None => {
                pos.kinds[piece as usize] ^= mask;
                pos.zobrist.toggle_piece_placement(us, piece, dest);
            },
        }
        if us == Black {
            pos.black ^= mask;
        }

        // relocate the rook for castling moves
        if m.is_castling() {
            let rank = orig.rank();
            let (rook_orig, rook_dest) = if dest.file() == File::G {
                (Square::from_coord(File::H, rank), Square::from_coord(File::F, rank))
            } else {
                (Square::from_coord(File::A, rank), Square::from_coord(File::D, rank))
            };

            let mask = Bitboard::from(rook_orig) | rook_dest.into();
            pos.kinds[Rook as usize] ^= mask;
            if us == Black {
                pos.black ^= mask;
            }
            pos.zobrist.toggle_piece_placement(us, Rook, rook_orig);
            pos.zobrist.toggle_piece_placement(us, Rook, rook_dest);
        }

        // update castling rights: the king's pair when the king moves, a single rook's bit when
        // that rook moves or is captured
        let mut rights = pos.castling_rights;
        if piece == King {
            rights &= !((CASTLE_KING_SIDE | CASTLE_QUEEN_SIDE) << (2 * us as u8));
        }
        for &(corner, right) in &[
            (Square::H1, CASTLE_KING_SIDE),
            (Square::A1, CASTLE_QUEEN_SIDE),
            (Square::H8, CASTLE_KING_SIDE << 2),
            (Square::A8, CASTLE_QUEEN_SIDE << 2),
        ] {
            if orig == corner || dest == corner {
                rights &= !right;
            }
        }
        if rights != pos.castling_rights {
            pos.zobrist.toggle_castling_rights(pos.castling_rights);
            pos.zobrist.toggle_castling_rights(rights);
            pos.castling_rights = rights;
        }

        // update the en passant file; it is only recorded when an enemy pawn is in position to
        // capture, so that transposed positions hash identically
        if let Some(file) = pos.ep_file {
            pos.zobrist.toggle_ep_file(file);
            pos.ep_file = None;
        }
        if m.is_advance2() {
            let dest_board = Bitboard::from(dest);
            let adjacent = (dest_board.shift_xy(-1, 0) | dest_board.shift_xy(1, 0))
                & (pos.kinds[Pawn as usize] & pos.occupied_by(them));
            if !adjacent.is_empty() {
                pos.ep_file = Some(dest.file());
                pos.zobrist.toggle_ep_file(dest.file());
            }
        }

        // update the halfmove clock
        if piece == Pawn || m.is_capture() {
            pos.halfmove_clock = 0;
        } else {
            pos.halfmove_clock += 1;
        }

        // switch turns
        pos.turn = them;
        pos.zobrist.toggle_turn();

        debug_assert_eq!(pos.zobrist, pos.compute_key(), "incremental key out of sync");

        pos
    }
}

impl Default for Position {
    /// Returns the standard starting Position.
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Display for Position {
    /// Writes out the position using FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_fen_str().fmt(f)
    }
}

impl fmt::Debug for Position {
    /// Writes out the position using FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_fen_str().fmt(f)
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a position from a FEN string.
    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen_str(s)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    /// Position::new() must return the standard starting position.
    ///
    /// Depends on to_fen_str() working properly.
    #[test]
    fn new_returns_the_standard_starting_position() {
        assert_eq!(Position::new().to_fen_str(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    /// Tests for Position::from_fen_str()
    mod from_fen_str {
        use super::*;
        use Error::*;

        #[test]
        fn empty_string_returns_error() {
            assert_eq!(Position::from_fen_str(""), Err(ParseError));
            assert_eq!(Position::from_fen_str(" \t\r\n"), Err(ParseError));
        }

        #[test]
        fn invalid_empty_square_count_returns_error() {
            assert_eq!(Position::from_fen_str("0K1k5/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/9/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
        }

        #[test]
        fn rank_too_long_returns_error() {
            assert_eq!(Position::from_fen_str("K1k6/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5b/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
        }

        #[test]
        fn rank_too_short_returns_error() {
            assert_eq!(Position::from_fen_str("K1k4/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/b6 w - - 0 1"), Err(ParseError));
        }

        #[test]
        fn wrong_rank_count_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8 w - - 0 1"), Err(ParseError));
        }

        #[test]
        fn turn_set_correctly() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1")
                .expect("valid fen").turn(), Color::White);
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 b - - 0 1")
                .expect("valid fen").turn(), Color::Black);
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 x - - 0 1"), Err(ParseError));
        }

        #[test]
        fn castling_flags_set_correctly() {
            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w Kk - 0 1")
                .expect("valid fen");
            assert!(pos.has_king_side_castling_rights(Color::White));
            assert!(!pos.has_queen_side_castling_rights(Color::White));
            assert!(pos.has_king_side_castling_rights(Color::Black));
            assert!(!pos.has_queen_side_castling_rights(Color::Black));

            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w Qq - 0 1")
                .expect("valid fen");
            assert!(!pos.has_king_side_castling_rights(Color::White));
            assert!(pos.has_queen_side_castling_rights(Color::White));

            let pos = Position::from_fen_str("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1")
                .expect("valid fen");
            assert!(!pos.has_king_side_castling_rights(Color::White));
            assert!(!pos.has_queen_side_castling_rights(Color::Black));

            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w x - 0 1"), Err(ParseError));
        }

        #[test]
        fn en_passant_square_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/6Pp/8/8/8/8 w - h6 0 1")
                .expect("valid fen");
            assert_eq!(pos.en_passant_file(), Some(File::H));

            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 0 1").expect("valid fen");
            assert_eq!(pos.en_passant_file(), None);

            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - x 0 1"), Err(ParseError));
        }

        #[test]
        fn uncapturable_en_passant_square_is_dropped() {
            // a black pawn just advanced two squares, but no white pawn can take it
            let pos = Position::from_fen_str("K1k5/8/8/7p/8/8/8/8 w - h6 0 1")
                .expect("valid fen");
            assert_eq!(pos.en_passant_file(), None);
        }

        #[test]
        fn halfmove_clock_set_correctly() {
            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - 42 1").expect("valid fen");
            assert_eq!(pos.halfmove_clock(), 42);

            let pos = Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - -").expect("valid fen");
            assert_eq!(pos.halfmove_clock(), 0);

            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/8 w - - x 1"), Err(ParseError));
        }

        #[test]
        fn multiple_kings_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/7K/8 w - - 0 1"),
                Err(InvalidKingCount));
        }

        #[test]
        fn missing_king_returns_error() {
            assert_eq!(Position::from_fen_str("K7/8/8/8/8/8/8/8 w - - 0 1"),
                Err(InvalidKingCount));
        }

        #[test]
        fn pawns_on_first_or_last_rank_returns_error() {
            assert_eq!(Position::from_fen_str("K1k4p/8/8/8/8/8/8/8 w - - 0 1"),
                Err(InvalidPawnRank));
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/P7 w - - 0 1"),
                Err(InvalidPawnRank));
        }

        #[test]
        fn capturable_king_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/8/8/8/8/2R5 w - - 0 1"),
                Err(KingCapturable));
        }

        #[test]
        fn en_passant_square_occupied_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/7p/6Pp/8/8/8/8 w - h6 0 1"),
                Err(EnPassantSquareOccupied));
        }

        #[test]
        fn missing_en_passant_capture_pawn_returns_error() {
            assert_eq!(Position::from_fen_str("K1k5/8/8/6P1/8/8/8/8 w - h6 0 1"),
                Err(MissingEnPassantPawn));
        }

        #[test]
        fn castling_rights_when_king_or_rook_has_moved_returns_error() {
            assert_eq!(Position::from_fen_str("2k5/8/8/8/8/8/7K/R6R w K - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("2k5/8/8/8/8/8/8/4K3 w Q - 0 1"),
                Err(InvalidCastlingFlags));
            assert_eq!(Position::from_fen_str("4k3/8/8/8/8/8/8/2K5 w kq - 0 1"),
                Err(InvalidCastlingFlags));
        }

        #[test]
        fn back_to_identical_fen() {
            let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
            assert_eq!(Position::from_fen_str(fen).expect("valid fen").to_fen_str(), fen);

            let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
            assert_eq!(Position::from_fen_str(fen).expect("valid fen").to_fen_str(), fen);
        }
    }

    mod attacks_and_checks {
        use super::*;
        use Square::*;

        #[test]
        fn checkers_are_detected() {
            let pos: Position = "K1k5/8/8/8/8/8/8/2R5 b - - 0 1".parse().expect("valid fen");
            assert!(pos.in_check());
            assert_eq!(pos.checkers(), Bitboard::from(C1));

            let pos = Position::new();
            assert!(!pos.in_check());
            assert!(pos.checkers().is_empty());
        }

        #[test]
        fn blockers_and_pins() {
            // the knight on e4 is pinned against the king by the rook on e8
            let pos: Position = "4r2k/8/8/8/4N3/8/8/4K3 w - - 0 1".parse().expect("valid fen");
            let blockers = pos.slider_blockers(pos.occupied_by(Color::Black), E1);
            assert_eq!(blockers, Bitboard::from(E4));

            // two pieces on the line pin nothing
            let pos: Position = "4r2k/8/4B3/8/4N3/8/8/4K3 w - - 0 1".parse().expect("valid fen");
            let blockers = pos.slider_blockers(pos.occupied_by(Color::Black), E1);
            assert!(blockers.is_empty());
        }

        #[test]
        fn direct_and_discovered_checks() {
            // the bishop checks directly from b5; the knight move does not check
            let pos: Position = "4k3/8/8/8/8/8/3N4/4KB2 w - - 0 1".parse().expect("valid fen");
            assert!(!pos.gives_check(Move::new(D2, F3)));
            assert!(pos.gives_check(Move::new(F1, B5)));

            // any knight move off the e-file uncovers the rook behind it
            let pos: Position = "4k3/8/8/8/4N3/8/8/4R1K1 w - - 0 1".parse().expect("valid fen");
            assert!(pos.gives_check(Move::new(E4, C5)));
            assert!(pos.gives_check(Move::new(E4, G5)));
            // the rook itself stepping aside does not check
            assert!(!pos.gives_check(Move::new(E1, D1)));
            assert!(!pos.gives_check(Move::new(G1, H1)));
        }
    }
}

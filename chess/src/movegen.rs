//! Legal move generation, stratified for search ordering
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Every operation in this module produces only fully legal moves: pinned pieces are confined to
//! their pin rays, the king never steps onto an attacked square, and when the side to move is in
//! check only evading moves are produced. The moves can therefore be played directly with
//! [`Position::make`](../struct.Position.html#method.make).
//!
//! The move set is available in several strata so that a search can order its work:
//!
//!  -  [`legal_moves`](fn.legal_moves.html) produces every legal move.
//!  -  [`evasions`](fn.evasions.html) is the generator to use when the mover is in check.
//!  -  [`checking_moves`](fn.checking_moves.html) produces the legal moves which put the
//!     opposing king in check, including discovered checks.
//!  -  [`captures`](fn.captures.html) and [`quiet_moves`](fn.quiet_moves.html) partition the
//!     legal moves into capturing and non-capturing moves.
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::*;
use crate::bitboard::*;

use Color::*;
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Receives generated moves one at a time.
///
/// Generating through a sink lets [`count_moves`](fn.count_moves.html) share the generation
/// logic of the list-producing operations without building a list.
trait MoveSink {
    fn push(&mut self, m: Move);
}

impl MoveSink for Vec<Move> {
    fn push(&mut self, m: Move) {
        Vec::push(self, m);
    }
}

struct MoveCounter(usize);

impl MoveSink for MoveCounter {
    fn push(&mut self, _: Move) {
        self.0 += 1;
    }
}

/// Which part of the legal move set to produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Targets {
    All,
    Captures,
    Quiets,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Returns the number of legal moves and whether the side to move is in check.
pub fn count_moves(pos: &Position) -> (usize, bool) {
    let mut counter = MoveCounter(0);
    let in_check = generate(pos, Targets::All, &mut counter);

    (counter.0, in_check)
}

/// Returns all legal moves from this position.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut list = Vec::new();
    generate(pos, Targets::All, &mut list);

    list
}

/// Returns all legal moves when the side to move is in check.
///
/// The result is the same set of moves as [`legal_moves`](fn.legal_moves.html); a search calls
/// this in place of `legal_moves` whenever the in-check flag from
/// [`count_moves`](fn.count_moves.html) is set, and takes the moves in the order produced
/// without further sorting.
pub fn evasions(pos: &Position) -> Vec<Move> {
    legal_moves(pos)
}

/// Returns the legal moves which put the opposing king in check.
///
/// Both direct and discovered checks are included. A checking capture appears here (and in
/// [`captures`](fn.captures.html)), deduplication is by move identity.
pub fn checking_moves(pos: &Position) -> Vec<Move> {
    legal_moves(pos).into_iter().filter(|&m| pos.gives_check(m)).collect()
}

/// Returns the legal capturing moves, including en passant captures and capturing promotions.
pub fn captures(pos: &Position) -> Vec<Move> {
    let mut list = Vec::new();
    generate(pos, Targets::Captures, &mut list);

    list
}

/// Returns the legal non-capturing moves, including castling and quiet promotions.
///
/// Together with [`captures`](fn.captures.html) this partitions
/// [`legal_moves`](fn.legal_moves.html): the two sets are disjoint and their union is the full
/// legal move set.
pub fn quiet_moves(pos: &Position) -> Vec<Move> {
    let mut list = Vec::new();
    generate(pos, Targets::Quiets, &mut list);

    list
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Generates the requested stratum of legal moves into `sink`, returning whether the side to
/// move is in check.
fn generate<S: MoveSink>(pos: &Position, what: Targets, sink: &mut S) -> bool {
    let us = pos.turn();
    let them = !us;
    let occ = pos.occupied();
    let own = pos.occupied_by(us);
    let theirs = pos.occupied_by(them);
    let ksq = pos.king_location(us);
    let checkers = pos.attackers_to(ksq, occ) & theirs;

    let gen = Generator {
        pos, us, them, occ, theirs, ksq,
        pinned: pos.slider_blockers(theirs, ksq) & own,
    };

    // king moves are generated the same way in and out of check
    let king_targets = match what {
        Targets::All => !own,
        Targets::Captures => theirs,
        Targets::Quiets => !occ,
    };
    for dest in king_attacks(ksq) & king_targets {
        // the king sees through itself along any checking ray
        if !pos.square_attacked_by_occ(dest, them, occ ^ ksq.into()) {
            sink.push(if theirs.contains(dest) {
                Move::new_capture(ksq, dest)
            } else {
                Move::new(ksq, dest)
            });
        }
    }

    if checkers.is_empty() {
        let capture_targets = if what != Targets::Quiets { theirs } else { Bitboard::new() };
        let quiet_targets = if what != Targets::Captures { !occ } else { Bitboard::new() };

        gen.pieces(capture_targets, quiet_targets, sink);
        gen.pawns(capture_targets, quiet_targets, sink);
        if what != Targets::Quiets {
            gen.en_passant(sink);
        }
        if what != Targets::Captures {
            gen.castling(sink);
        }

        false
    } else {
        if checkers.len() == 1 {
            // a single check can also be met by capturing the checker or, if the checker
            // slides, blocking its path
            let checker = checkers.peek().expect("INFALLIBLE");
            let block = match pos.kind_at(checker) {
                Some(Bishop) | Some(Rook) | Some(Queen) => between(checker, ksq),
                _ => Bitboard::new(),
            };

            let capture_targets = if what != Targets::Quiets { checkers } else { Bitboard::new() };
            let quiet_targets = if what != Targets::Captures { block } else { Bitboard::new() };

            gen.pieces(capture_targets, quiet_targets, sink);
            gen.pawns(capture_targets, quiet_targets, sink);
            if what != Targets::Quiets {
                gen.en_passant(sink);
            }
        }

        true
    }
}

/// The board context shared by the generation routines.
struct Generator<'a> {
    pos: &'a Position,
    us: Color,
    them: Color,
    occ: Bitboard,
    theirs: Bitboard,
    ksq: Square,
    pinned: Bitboard,
}

impl<'a> Generator<'a> {
    /// A pinned piece stays on the line through its king and itself.
    fn pin_ok(&self, orig: Square, dest: Square) -> bool {
        !self.pinned.contains(orig) || line(self.ksq, orig).contains(dest)
    }

    /// Generates knight, bishop, rook and queen moves to the given disjoint target sets.
    fn pieces<S: MoveSink>(&self, capture_targets: Bitboard, quiet_targets: Bitboard, sink: &mut S) {
        let targets = capture_targets | quiet_targets;

        for &piece in &[Knight, Bishop, Rook, Queen] {
            for orig in self.pos.occupied_by_piece(self.us, piece) {
                let attacks = match piece {
                    Knight => knight_attacks(orig),
                    Bishop => bishop_attacks(orig, self.occ),
                    Rook => rook_attacks(orig, self.occ),
                    Queen => queen_attacks(orig, self.occ),
                    _ => unreachable!(),
                };

                let mut dests = attacks & targets;
                if self.pinned.contains(orig) {
                    dests &= line(self.ksq, orig);
                }

                for dest in dests {
                    sink.push(if capture_targets.contains(dest) {
                        Move::new_capture(orig, dest)
                    } else {
                        Move::new(orig, dest)
                    });
                }
            }
        }
    }

    /// Generates pawn advances, captures and promotions to the given disjoint target sets.
    ///
    /// En passant captures are produced separately by
    /// [`en_passant`](#method.en_passant).
    fn pawns<S: MoveSink>(&self, capture_targets: Bitboard, quiet_targets: Bitboard, sink: &mut S) {
        let pawns = self.pos.occupied_by_piece(self.us, Pawn);
        let forward = if self.us == White { 1 } else { -1 };
        let promo_ranks = Bitboard::from(Rank::R1) | Rank::R8.into();
        let advance2_rank: Bitboard = if self.us == White {
            Rank::R4.into()
        } else {
            Rank::R5.into()
        };

        // single advances, only then two-square advances through an empty square
        let pushed = pawns.shift_y(forward) & !self.occ;
        for dest in pushed & quiet_targets {
            let orig = Bitboard::from(dest).shift_y(-forward).peek().expect("INFALLIBLE");
            if !self.pin_ok(orig, dest) {
                continue;
            }

            if promo_ranks.contains(dest) {
                for &prom in &Promotion::ALL {
                    sink.push(Move::new_promotion(orig, dest, prom, false));
                }
            } else {
                sink.push(Move::new(orig, dest));
            }
        }
        for dest in pushed.shift_y(forward) & !self.occ & advance2_rank & quiet_targets {
            let orig = Bitboard::from(dest).shift_y(-2 * forward).peek().expect("INFALLIBLE");
            if self.pin_ok(orig, dest) {
                sink.push(Move::new_advance2(orig, dest));
            }
        }

        // captures toward either side
        for &side in &[-1, 1] {
            for dest in pawns.shift_xy(side, forward) & capture_targets {
                let orig = Bitboard::from(dest).shift_xy(-side, -forward)
                    .peek().expect("INFALLIBLE");
                if !self.pin_ok(orig, dest) {
                    continue;
                }

                if promo_ranks.contains(dest) {
                    for &prom in &Promotion::ALL {
                        sink.push(Move::new_promotion(orig, dest, prom, true));
                    }
                } else {
                    sink.push(Move::new_capture(orig, dest));
                }
            }
        }
    }

    /// Generates legal en passant captures.
    ///
    /// The captured pawn does not stand on the destination square, so the usual pin masks do
    /// not apply. Instead the capture is played out on a scratch occupancy with both pawns
    /// removed, and rejected if any enemy piece then attacks the king; this also catches the
    /// rare case of a rook or queen exposed along the rank shared by the two pawns.
    fn en_passant<S: MoveSink>(&self, sink: &mut S) {
        let file = match self.pos.en_passant_file() {
            Some(file) => file,
            None => return,
        };

        let (ep_rank, victim_rank) = if self.us == White {
            (Rank::R6, Rank::R5)
        } else {
            (Rank::R3, Rank::R4)
        };
        let dest = Square::from_coord(file, ep_rank);
        let victim = Square::from_coord(file, victim_rank);
        let pawns = self.pos.occupied_by_piece(self.us, Pawn);

        for orig in pawns & pawn_attacks(self.them, dest) {
            let occ = (self.occ ^ orig.into() ^ victim.into()) | dest.into();
            let attackers = self.pos.attackers_to(self.ksq, occ)
                & self.theirs & !Bitboard::from(victim);

            if attackers.is_empty() {
                sink.push(Move::new_en_passant(orig, dest));
            }
        }
    }

    /// Generates legal castling moves. Never called while in check.
    fn castling<S: MoveSink>(&self, sink: &mut S) {
        let rank = if self.us == White { Rank::R1 } else { Rank::R8 };

        let mut sides = Vec::with_capacity(2);
        if self.pos.has_king_side_castling_rights(self.us) {
            sides.push((File::H, File::G, File::F));
        }
        if self.pos.has_queen_side_castling_rights(self.us) {
            sides.push((File::A, File::C, File::D));
        }

        for &(rook_file, king_dest, crossed) in &sides {
            let rook_sq = Square::from_coord(rook_file, rank);
            let dest = Square::from_coord(king_dest, rank);
            let crossed = Square::from_coord(crossed, rank);

            // the squares between king and rook must be empty, and the king may not cross or
            // land on an attacked square
            if between(self.ksq, rook_sq).intersects(self.occ) {
                continue;
            }
            if self.pos.square_attacked_by(crossed, self.them)
                || self.pos.square_attacked_by(dest, self.them) {
                continue;
            }

            sink.push(Move::new_castling(self.ksq, dest));
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn move_set(moves: &[Move]) -> BTreeSet<u16> {
        moves.iter().map(|&m| u16::from(m)).collect()
    }

    #[test]
    fn twenty_moves_from_the_starting_position() {
        let pos = Position::new();
        assert_eq!(count_moves(&pos), (20, false));
        assert_eq!(legal_moves(&pos).len(), 20);
        assert_eq!(captures(&pos).len(), 0);
        assert_eq!(quiet_moves(&pos).len(), 20);
    }

    #[test]
    fn count_matches_list_generation() {
        for fen in &[
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            let pos: Position = fen.parse().expect("valid fen");
            let (count, in_check) = count_moves(&pos);
            assert_eq!(count, legal_moves(&pos).len(), "{}", fen);
            assert_eq!(in_check, pos.in_check(), "{}", fen);
        }
    }

    #[test]
    fn captures_and_quiets_partition_the_legal_moves() {
        for fen in &[
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            // in check: the partition still holds within the evasion set
            "rnb1kbnr/pppp1ppp/8/4p3/5PPq/8/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        ] {
            let pos: Position = fen.parse().expect("valid fen");
            let legal = move_set(&legal_moves(&pos));
            let caps = move_set(&captures(&pos));
            let quiets = move_set(&quiet_moves(&pos));

            assert!(caps.is_disjoint(&quiets), "{}", fen);
            let union: BTreeSet<u16> = caps.union(&quiets).cloned().collect();
            assert_eq!(union, legal, "{}", fen);

            // checking moves are legal moves, already covered by the partition
            let checking = move_set(&checking_moves(&pos));
            assert!(checking.is_subset(&legal), "{}", fen);
            for m in legal_moves(&pos) {
                assert_eq!(checking.contains(&u16::from(m)), pos.gives_check(m), "{}", fen);
            }
        }
    }

    #[test]
    fn evasions_match_legal_moves_in_check() {
        let pos: Position = "rnb1kbnr/pppp1ppp/8/4p3/5PPq/8/PPPPP2P/RNBQKBNR w KQkq - 1 3"
            .parse().expect("valid fen");
        assert!(pos.in_check());
        assert_eq!(move_set(&evasions(&pos)), move_set(&legal_moves(&pos)));
    }

    #[test]
    fn checkmate_and_stalemate_have_no_moves() {
        // fool's mate
        let pos: Position = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
            .parse().expect("valid fen");
        assert_eq!(count_moves(&pos), (0, true));

        // a stalemated king
        let pos: Position = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().expect("valid fen");
        assert_eq!(count_moves(&pos), (0, false));
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let pos: Position = "4r1k1/8/8/8/8/3n4/8/4K3 w - - 0 1".parse().expect("valid fen");
        let moves = legal_moves(&pos);

        assert_eq!(pos.checkers().len(), 2);
        assert!(!moves.is_empty());
        for m in &moves {
            assert_eq!(m.origin(), Square::E1);
        }
    }

    #[test]
    fn pinned_pieces_stay_on_the_pin_ray() {
        // the e4 rook is pinned by the e8 rook and can only move along the e-file
        let pos: Position = "4r2k/8/8/8/4R3/8/8/4K3 w - - 0 1".parse().expect("valid fen");
        for m in legal_moves(&pos) {
            if m.origin() == Square::E4 {
                assert_eq!(m.destination().file(), File::E);
            }
        }

        // a pinned knight cannot move at all
        let pos: Position = "4r2k/8/8/8/4N3/8/8/4K3 w - - 0 1".parse().expect("valid fen");
        assert!(legal_moves(&pos).iter().all(|m| m.origin() != Square::E4));
    }

    #[test]
    fn castling_is_blocked_by_attacks_on_the_king_path() {
        // the black rook on f2 guards f1, forbidding king-side castling only
        let pos: Position = "4k2r/8/8/8/8/8/5r2/R3K2R w KQ - 0 1".parse().expect("valid fen");
        let moves = legal_moves(&pos);

        assert!(!moves.contains(&Move::new_castling(Square::E1, Square::G1)));
        assert!(moves.contains(&Move::new_castling(Square::E1, Square::C1)));

        // pieces between king and rook forbid castling
        let pos: Position = "4k3/8/8/8/8/8/8/R2QK2R w KQ - 0 1".parse().expect("valid fen");
        let moves = legal_moves(&pos);
        assert!(moves.contains(&Move::new_castling(Square::E1, Square::G1)));
        assert!(!moves.contains(&Move::new_castling(Square::E1, Square::C1)));
    }

    #[test]
    fn en_passant_exposing_the_king_is_rejected() {
        // capturing en passant would expose the a4 king to the h4 queen along the rank
        let pos: Position = "8/8/8/8/k2Pp2Q/8/8/4K3 b - d3 0 1".parse().expect("valid fen");
        assert!(legal_moves(&pos).iter().all(|m| !m.is_en_passant()));

        // the same capture is legal without the queen
        let pos: Position = "8/8/8/8/k2Pp3/8/8/4K3 b - d3 0 1".parse().expect("valid fen");
        assert!(legal_moves(&pos).iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn en_passant_can_capture_a_checking_pawn() {
        // the d-pawn just advanced two squares, checking the c5 king; exd3 removes it
        let pos: Position = "8/8/8/2k5/3Pp3/8/8/3K4 b - d3 0 1".parse().expect("valid fen");
        assert!(pos.in_check());

        let ep: Vec<Move> = legal_moves(&pos).into_iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to_string(), "e4d3");
    }

    #[test]
    fn promotions_come_in_all_four_flavors() {
        let pos: Position = "7k/P7/8/8/8/8/8/7K w - - 0 1".parse().expect("valid fen");
        let moves = legal_moves(&pos);
        let promotions = moves.iter().filter(|m| m.promotion().is_some()).count();
        assert_eq!(promotions, 4);
    }
}

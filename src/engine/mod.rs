//! The mate-finding engine
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The engine answers one question: can the side to move force checkmate within a given number
//! of plies? It runs a negamax search with alpha-beta pruning over a ternary score: +1 when the
//! side to move forces mate within the remaining depth, -1 when it is mated, and 0 otherwise.
//! The score carries no distance to mate; the [iterative deepening loop](fn.find_mate.html)
//! supplies that by stopping at the smallest depth which yields a nonzero root score.
//!
//! Searchers share a lock-free [transposition table](hash/struct.HashTable.html), and the
//! [Lazy SMP driver](smp/fn.search_root.html) runs several of them over the same root so that
//! their table entries cross-pollinate.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::time::{Duration, Instant};
use std::sync::Arc;
use log::debug;
use chess::{Move, Position, movegen};

pub mod hash;
pub mod smp;

use hash::{Bound, HashTable};

/// A search score: -1, 0 or +1, bounded by `±INFINITY` in the alpha-beta window.
pub type Score = i16;

/// The score for forcing checkmate within the remaining depth.
pub const MATE: Score = 1;

/// The initial bound of the alpha-beta window.
pub const INFINITY: Score = 1000;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Tunable parameters of the engine.
#[derive(Debug, Clone)]
pub struct Options {
    /// Log2 of the number of transposition table slots; the table occupies
    /// `8 * 2^tt_bits` bytes
    pub tt_bits: u32,
    /// The number of Lazy SMP workers spawned in addition to the driving thread
    pub threads: usize,
    /// Probe and store the shared transposition table
    pub use_hash: bool,
    /// Spawn Lazy SMP workers
    pub use_smp: bool,
    /// The upper bound on iterative deepening
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tt_bits: 26,
            threads: 16,
            use_hash: true,
            use_smp: true,
            max_depth: 100,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// What the search found at one iterative-deepening depth.
#[derive(Debug, Clone)]
pub struct DepthReport {
    /// The depth searched, in plies
    pub depth: usize,
    /// The root score: +1 forces mate, -1 is mated, 0 undecided at this depth
    pub score: Score,
    /// The root move achieving the score, if the root had any moves
    pub best_move: Option<Move>,
    /// Positions evaluated at depth zero
    pub leaf_nodes: u64,
    /// Positions whose moves were searched
    pub interior_nodes: u64,
    /// Leaves which were checkmate
    pub mate_nodes: u64,
    /// Wall-clock time spent on this depth
    pub elapsed: Duration,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Searches for a forced mate by iterative deepening, from depth zero up to
/// `opts.max_depth` (clamped to the largest depth the probe keys can carry).
///
/// After each depth completes, `report` receives the node counts and outcome for that depth;
/// the loop stops at the first depth with a nonzero root score (the side to move either forces
/// mate or is mated within the horizon) and returns that final report.
///
/// The transposition table is allocated once before the loop and shared by every worker across
/// all depths.
pub fn find_mate<F>(pos: &Position, opts: &Options, mut report: F) -> Option<DepthReport>
    where F: FnMut(&DepthReport) {
    debug!("searching for mate: {}", pos);
    let table = if opts.use_hash {
        Some(Arc::new(HashTable::new(opts.tt_bits)))
    } else {
        None
    };

    for depth in 0..=opts.max_depth.min(chess::position::zobrist::MAX_KEYED_DEPTH) {
        let start = Instant::now();
        let outcome = smp::search_root(pos, depth, opts, table.as_ref());
        let rep = DepthReport {
            depth,
            score: outcome.score,
            best_move: outcome.best_move,
            leaf_nodes: outcome.leaf_nodes,
            interior_nodes: outcome.interior_nodes,
            mate_nodes: outcome.mate_nodes,
            elapsed: start.elapsed(),
        };

        debug!("depth {}: score {} nodes {}/{}/{} in {:?}", depth, rep.score,
            rep.leaf_nodes, rep.interior_nodes, rep.mate_nodes, rep.elapsed);
        report(&rep);

        if rep.score != 0 {
            return Some(rep);
        }
    }

    None
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A single search thread: the recursive negamax with its node counters.
#[derive(Debug)]
pub struct Searcher<'a> {
    table: Option<&'a HashTable>,
    /// Positions evaluated at depth zero
    pub leaf_nodes: u64,
    /// Positions whose moves were searched
    pub interior_nodes: u64,
    /// Leaves which were checkmate
    pub mate_nodes: u64,
}

impl<'a> Searcher<'a> {
    /// Creates a searcher, optionally probing and storing the given table.
    pub fn new(table: Option<&'a HashTable>) -> Searcher<'a> {
        Searcher {
            table,
            leaf_nodes: 0,
            interior_nodes: 0,
            mate_nodes: 0,
        }
    }

    /// Searches `pos` to `depth` plies within the window `(alpha, beta)`, returning the score
    /// and the best root move.
    ///
    /// The search is fail-hard: the returned score never leaves the window. At depth zero the
    /// position is scored -1 if the side to move is checkmated and 0 otherwise; interior scores
    /// are the negation of the best child score.
    pub fn search(&mut self, pos: &Position, depth: usize, alpha: Score, beta: Score)
    -> (Score, Option<Move>) {
        if depth == 0 {
            self.leaf_nodes += 1;

            let (moves, in_check) = movegen::count_moves(pos);
            if moves == 0 && in_check {
                self.mate_nodes += 1;
                return (-MATE, None);
            }
            return (0, None);
        }

        // the probe key is salted with the remaining depth, since the meaning of a score
        // depends on how far below this node the search was allowed to look
        let probe_key = pos.zobrist_key().with_depth(depth);
        if let Some(table) = self.table {
            if let Some(entry) = table.probe(probe_key) {
                match entry.bound {
                    Bound::Exact => return (entry.score, Some(entry.best_move)),
                    Bound::Lower if entry.score >= beta => {
                        return (entry.score, Some(entry.best_move));
                    },
                    Bound::Upper if entry.score <= alpha => {
                        return (entry.score, Some(entry.best_move));
                    },
                    _ => {},
                }
            }
        }

        self.interior_nodes += 1;

        let moves = ordered_moves(pos);
        if moves.is_empty() {
            // checkmate or stalemate
            return (if pos.in_check() { -MATE } else { 0 }, None);
        }

        let mut alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut improved_alpha = false;

        for m in moves {
            let child = pos.make(m);
            let (child_score, _) = self.search(&child, depth - 1, -beta, -alpha);
            let child_score = -child_score;

            if child_score >= beta {
                if let Some(table) = self.table {
                    table.store(probe_key, child_score, Bound::Lower, m);
                }
                return (beta, Some(m));
            }

            if child_score > best_score {
                best_score = child_score;
                best_move = Some(m);
                if child_score > alpha {
                    alpha = child_score;
                    improved_alpha = true;
                }
            }
        }

        if let Some(table) = self.table {
            let bound = if improved_alpha { Bound::Exact } else { Bound::Upper };
            table.store(probe_key, best_score, bound,
                best_move.expect("INFALLIBLE"));
        }

        (alpha, best_move)
    }
}

/// Generates the legal moves in search order: when in check the evasions as generated, and
/// otherwise checking moves first, then the remaining captures, then the remaining quiet moves.
///
/// A checking capture is produced once, in the checking bucket; membership is decided by
/// [`Position::gives_check`], so discovered checks order early as well.
fn ordered_moves(pos: &Position) -> Vec<Move> {
    if pos.in_check() {
        return movegen::evasions(pos);
    }

    let mut moves = movegen::checking_moves(pos);
    moves.extend(movegen::captures(pos).into_iter().filter(|&m| !pos.gives_check(m)));
    moves.extend(movegen::quiet_moves(pos).into_iter().filter(|&m| !pos.gives_check(m)));

    moves
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    fn search_alone(fen: &str, depth: usize, table: Option<&HashTable>) -> Score {
        let pos: Position = fen.parse().expect("valid fen");
        let mut searcher = Searcher::new(table);
        searcher.search(&pos, depth, -INFINITY, INFINITY).0
    }

    #[test]
    fn checkmate_scores_minus_one_at_depth_zero() {
        // fool's mate
        assert_eq!(search_alone(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", 0, None), -MATE);
        // stalemate is no mate
        assert_eq!(search_alone("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 0, None), 0);
        // a quiet position is undecided
        assert_eq!(search_alone(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 0, None), 0);
    }

    #[test]
    fn mate_in_one_is_found_at_depth_one() {
        // back-rank mate with Ra8
        let table = HashTable::new(12);
        assert_eq!(search_alone("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 1, Some(&table)), MATE);
        // without the back-rank pawns there is no mate
        assert_eq!(search_alone("6k1/8/8/8/8/8/8/R3K3 w - - 0 1", 1, None), 0);
    }

    #[test]
    fn deeper_searches_still_find_the_mate() {
        // once a mate is within the horizon, widening the horizon cannot lose it
        let table = HashTable::new(12);
        for depth in 1..6 {
            assert_eq!(search_alone("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", depth,
                Some(&table)), MATE);
        }
    }

    #[test]
    fn scores_stay_ternary() {
        let table = HashTable::new(12);
        for depth in 0..4 {
            let score = search_alone(
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
                depth, Some(&table));
            assert!(score == -1 || score == 0 || score == 1);
        }
    }

    #[test]
    fn find_mate_reports_every_depth() {
        let pos: Position = "8/qQ5p/3pN2K/3pp1R1/4k3/7N/1b1PP3/8 w - - 0 1"
            .parse().expect("valid fen");
        let opts = Options {
            tt_bits: 16,
            threads: 2,
            max_depth: 5,
            ..Default::default()
        };

        let mut depths = Vec::new();
        let result = find_mate(&pos, &opts, |rep| depths.push(rep.depth));

        let result = result.expect("mate expected");
        assert_eq!(result.depth, 3);
        assert_eq!(result.score, MATE);
        assert!(result.best_move.is_some());
        assert_eq!(depths, vec![0, 1, 2, 3]);
    }
}

//! The Lazy SMP driver
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Lazy SMP runs several copies of the same root search at once, all sharing one transposition
//! table. The workers are not coordinated in any way; the speedup comes from collisions in the
//! table, where a subtree one worker has already resolved becomes an instant cutoff for
//! another. The driver thread's own result is the authoritative answer, so the workers' return
//! values are discarded and only their node counters are collected.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::sync::Arc;
use std::thread;
use chess::{Move, Position};
use crate::engine::{INFINITY, Options, Score, Searcher};
use crate::engine::hash::HashTable;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The outcome of one root search, with node counters summed over every thread.
#[derive(Debug, Clone)]
pub struct RootOutcome {
    /// The root score from the driving thread
    pub score: Score,
    /// The best root move from the driving thread
    pub best_move: Option<Move>,
    /// Positions evaluated at depth zero
    pub leaf_nodes: u64,
    /// Positions whose moves were searched
    pub interior_nodes: u64,
    /// Leaves which were checkmate
    pub mate_nodes: u64,
}

/// Searches the root position to the given depth, spawning `opts.threads` extra workers on the
/// shared table when Lazy SMP is enabled.
///
/// Every thread, the driver included, runs the identical root search; the driver joins the
/// workers before returning its own result.
pub fn search_root(pos: &Position, depth: usize, opts: &Options, table: Option<&Arc<HashTable>>)
-> RootOutcome {
    // workers only pay off once there is a tree to share; a table is required since the table
    // is the only channel between threads
    let workers = if opts.use_smp && table.is_some() && depth > 1 {
        opts.threads
    } else {
        0
    };

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let pos = pos.clone();
            let table = table.cloned();

            thread::spawn(move || {
                let mut searcher = Searcher::new(table.as_deref());
                searcher.search(&pos, depth, -INFINITY, INFINITY);

                (searcher.leaf_nodes, searcher.interior_nodes, searcher.mate_nodes)
            })
        })
        .collect();

    let mut driver = Searcher::new(table.map(|table| table.as_ref()));
    let (score, best_move) = driver.search(pos, depth, -INFINITY, INFINITY);

    let mut outcome = RootOutcome {
        score,
        best_move,
        leaf_nodes: driver.leaf_nodes,
        interior_nodes: driver.interior_nodes,
        mate_nodes: driver.mate_nodes,
    };
    for handle in handles {
        let (leaf, interior, mate) = handle.join().expect("search worker panicked");
        outcome.leaf_nodes += leaf;
        outcome.interior_nodes += interior;
        outcome.mate_nodes += mate;
    }

    outcome
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_do_not_change_the_root_score() {
        let pos: Position = "8/qQ5p/3pN2K/3pp1R1/4k3/7N/1b1PP3/8 w - - 0 1"
            .parse().expect("valid fen");

        let mut scores = Vec::new();
        for &threads in &[0, 1, 4] {
            let opts = Options {
                tt_bits: 16,
                threads,
                use_smp: threads > 0,
                ..Default::default()
            };
            let table = Arc::new(HashTable::new(opts.tt_bits));
            scores.push(search_root(&pos, 3, &opts, Some(&table)).score);
        }

        assert_eq!(scores, vec![1, 1, 1]);
    }
}

//! Module for counting and printing the number of variations from a given position
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::*;

/// Print the number of variations of the given `depth` for each legal move from `pos`
pub fn print(pos: &Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut total = 0;

    for m in movegen::legal_moves(pos) {
        let pos = pos.make(m);
        let count = count(&pos, depth - 1);
        total += count;
        println!("\t{:7}\t{:12}\t{}", m, count, pos);
    }

    total
}

/// Count the number of variations of the given `depth` from `pos`
pub fn count(pos: &Position, depth: usize) -> usize {
    match depth {
        0 => 1,
        // the moves at the horizon only need to be counted, not made
        1 => movegen::count_moves(pos).0,
        _ => {
            let mut total = 0;
            for m in movegen::legal_moves(pos) {
                total += count(&pos.make(m), depth - 1);
            }

            total
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_and_one() {
        let pos = Position::new();
        assert_eq!(count(&pos, 0), 1);
        assert_eq!(count(&pos, 1), 20);
        assert_eq!(count(&pos, 2), 400);
    }
}

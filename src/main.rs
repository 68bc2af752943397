//! The matefinder command-line harness.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fs::File;
use std::path::PathBuf;
use clap::{App, AppSettings, Arg, SubCommand, crate_version};
use simplelog::{WriteLogger, LevelFilter, Config};
use chess::{Position, variations};
use matefinder::engine;

fn main() -> Result<(), Error> {
    let matches =
        App::new("Matefinder")
            .version(crate_version!())
            .author("Mike Leany")
            .setting(AppSettings::SubcommandsNegateReqs)
            .about("Searches a position for a forced checkmate, deepening one ply at a time \
                    until a mate\nis found or the depth limit is reached.")
            .arg(Arg::with_name("fen")
                .value_name("FEN_STRING")
                .required(true)
                .multiple(true)
                .help("Position to search in Forsyth-Edwards Notation (FEN)"))
            .arg(Arg::with_name("depth")
                .long("depth")
                .short("d")
                .value_name("DEPTH")
                .takes_value(true)
                .default_value("100")
                .help("Depth limit for iterative deepening, in plies"))
            .arg(Arg::with_name("threads")
                .long("threads")
                .short("t")
                .value_name("N")
                .takes_value(true)
                .default_value("16")
                .help("Number of Lazy SMP worker threads"))
            .arg(Arg::with_name("tt-bits")
                .long("tt-bits")
                .value_name("BITS")
                .takes_value(true)
                .default_value("26")
                .help("Log2 of the transposition table slot count (8 bytes per slot)"))
            .arg(Arg::with_name("no-hash")
                .long("no-hash")
                .help("Disables the transposition table"))
            .arg(Arg::with_name("no-smp")
                .long("no-smp")
                .help("Disables the Lazy SMP workers"))
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("matefinder.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .default_value("info")
                .help("Sets the log level if logging is turned on"))
            .subcommand(SubCommand::with_name("counts")
                .about("Counts the number of variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required(true)
                    .help("Depth to search the position"))
                .arg(Arg::with_name("fen")
                    .value_name("FEN_STRING")
                    .default_value("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                    .hide_default_value(true)
                    .multiple(true)
                    .help("Position to search in Forsyth-Edwards Notation (FEN)")))
            .get_matches();

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = match matches.value_of("log-level") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(level) => return Err(Error(format!("{}: invalid log level", level))),
        None => unreachable!(),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            Config::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink())
    };

    match matches.subcommand() {
        (_, None) => {
            let opts = engine::Options {
                tt_bits: parse_arg(&matches, "tt-bits")?,
                threads: parse_arg(&matches, "threads")?,
                use_hash: !matches.is_present("no-hash"),
                use_smp: !matches.is_present("no-smp"),
                max_depth: parse_arg(&matches, "depth")?,
            };

            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let pos: Position = fen.parse()
                    .map_err(|err| Error(format!("{}: {}", fen, err)))?;

                println!("\n{}", fen);
                search(&pos, &opts);
            }
        },
        ("counts", Some(matches)) => {
            let depth = parse_arg(matches, "depth")?;

            println!();
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let pos = fen.parse()
                    .map_err(|err| Error(format!("{}: {}", fen, err)))?;
                println!("{}", fen);
                let count = variations::print(&pos, depth);
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        _ => unreachable!(),
    }

    Ok(())
}

/// Runs the iterative-deepening mate search, reporting node counts for every depth.
fn search(pos: &Position, opts: &engine::Options) {
    let result = engine::find_mate(pos, opts, |rep| {
        println!("Nodes (leaf/interior/mate): {} / {} / {}; Time: {:.3} s",
            rep.leaf_nodes, rep.interior_nodes, rep.mate_nodes, rep.elapsed.as_secs_f64());
        if rep.score == 0 {
            println!("No mate at depth {}", rep.depth);
        }
    });

    match result {
        Some(rep) => {
            println!("Mate found at depth {}", rep.depth);
            if let Some(best_move) = rep.best_move {
                println!("Best move: {}", best_move);
            }
        },
        None => println!("No mate within depth {}", opts.max_depth),
    }
}

/// Parses a numeric argument, reporting the offending value on failure.
fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches<'_>, name: &str) -> Result<T, Error> {
    let value = matches.value_of(name).expect("INFALLIBLE");
    value.parse().map_err(|_| Error(format!("{}: invalid value for --{}", value, name)))
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }

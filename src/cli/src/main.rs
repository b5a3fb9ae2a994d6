use std::{
    io::{self, BufRead},
    num::NonZeroUsize,
    path::PathBuf,
    thread,
};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, info};
use twophase::{
    CubeState, SolverConfig, SolverEngine,
    batch::solve_batch,
    cache,
    config::TableCacheMode,
    facelet::encode,
    moves::{format_moves, parse_moves},
    scramble::random_scramble,
    singmaster::to_singmaster,
};

/// Solves Rubik's cubes with the two-phase algorithm
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Solver configuration file, in TOML format. Flags override it.
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one cube.
    Solve {
        /// 54 facelets in `U R F D L B` face order, or Singmaster cubies with
        /// `--singmaster`.
        cube: String,
        /// Read the cube as 20 Singmaster cubie tokens.
        #[arg(long, conflicts_with = "colors")]
        singmaster: bool,
        /// Read the facelets as arbitrary colours, named by the centres.
        #[arg(long)]
        colors: bool,
        /// Give up on either phase beyond this many moves.
        #[arg(long)]
        max_length: Option<u8>,
        /// Give up after this many seconds.
        #[arg(long)]
        timeout: Option<f64>,
        /// Give up after visiting this many search nodes.
        #[arg(long)]
        node_limit: Option<u64>,
        /// Threads to share phase 1 between.
        #[arg(long)]
        threads: Option<usize>,
        /// Keep searching until the solution is at most this long.
        #[arg(long)]
        target: Option<usize>,
        /// Views of the cube to search, one bit each: as given, rotated
        /// once and twice about the URF-DBL diagonal, then the same three for
        /// the inverse cube.
        #[arg(long)]
        axes: Option<u8>,
    },
    /// Print a random scramble and the cube it produces.
    Scramble {
        #[arg(long, short, default_value_t = 25)]
        length: usize,
        /// Seed for a reproducible scramble.
        #[arg(long, short)]
        seed: Option<u64>,
    },
    /// Apply a move sequence to the solved cube and print its facelets.
    Apply {
        /// The move sequence, e.g. "R U' F2".
        moves: String,
    },
    /// Solve one cube per line of stdin, printing solutions in input order.
    Batch {
        /// Cubes solved at once. Defaults to the number of cores.
        #[arg(long, short)]
        jobs: Option<usize>,
    },
    /// Build the pruning tables, or check the cached ones.
    Tables,
}

fn main() -> color_eyre::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let mut config = match &cli.config {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };

    match cli.command {
        Commands::Solve {
            cube,
            singmaster,
            colors,
            max_length,
            timeout,
            node_limit,
            threads,
            target,
            axes,
        } => {
            if let Some(max_length) = max_length {
                config.max_phase1_depth = max_length;
                config.max_phase2_depth = max_length;
            }
            config.timeout_secs = timeout.or(config.timeout_secs);
            config.node_limit = node_limit.or(config.node_limit);
            config.threads = threads.unwrap_or(config.threads);
            config.target_length = target.or(config.target_length);
            config.axes = axes.unwrap_or(config.axes);

            let engine = SolverEngine::new(config)?;
            let solution = if singmaster {
                engine.solve_singmaster(&cube)?
            } else if colors {
                engine.solve_colors(&cube)?
            } else {
                engine.solve_facelets(&cube)?
            };
            info!(
                "{} phase 1 moves, {} nodes in {:.3}s",
                solution.phase1_len,
                solution.nodes,
                solution.elapsed.as_secs_f64()
            );
            println!("{solution}");
        }
        Commands::Scramble { length, seed } => {
            let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            let scramble = random_scramble(length, &mut rng);
            println!("{}", format_moves(&scramble));
            println!("{}", encode(&CubeState::SOLVED.apply_moves(&scramble)));
        }
        Commands::Apply { moves } => {
            let state = CubeState::SOLVED.apply_moves(&parse_moves(&moves)?);
            println!("{}", encode(&state));
            println!("{}", to_singmaster(&state));
        }
        Commands::Batch { jobs } => {
            let jobs = jobs.unwrap_or_else(|| {
                thread::available_parallelism().map_or(1, NonZeroUsize::get)
            });
            let lines = io::stdin()
                .lock()
                .lines()
                .filter_map_ok(|line| {
                    let line = line.trim();
                    (!line.is_empty()).then(|| line.to_owned())
                })
                .collect::<Result<Vec<_>, _>>()?;

            let engine = SolverEngine::new(config)?;
            let mut failures = 0;
            solve_batch(&engine, &lines, jobs, |_, result| match result {
                Ok(solution) => println!("{solution}"),
                Err(e) => {
                    failures += 1;
                    println!("error: {e}");
                }
            })?;
            if failures > 0 {
                return Err(eyre!("{failures} of {} cubes failed", lines.len()));
            }
        }
        Commands::Tables => {
            let path = cache::resolve(&config.table_cache);
            let tables = cache::load_or_generate(&config.table_cache)?;
            for table in tables.pruning_tables() {
                println!(
                    "{}: {} entries, depth {}",
                    table.name(),
                    table.data().len(),
                    table.depth()
                );
            }
            match (path, &config.table_cache) {
                (Some(path), _) => println!("Cache: {}", path.display()),
                (None, TableCacheMode::Disabled) => println!("Cache: disabled"),
                (None, _) => println!("Cache: no cache directory on this platform"),
            }
        }
    }

    Ok(())
}

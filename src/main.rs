use std::io::Write;

use anyhow::{bail, Context};
use clap::{value_t, App, Arg};
use crossterm::tty::IsTty;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use slider_astar::generator;
use slider_astar::present::{render_board, render_solution};
use slider_astar::{
    solve_with_options, Heuristic, LinearConflict, Manhattan, Puzzle, SearchOptions,
};

type Error = anyhow::Error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = driver() {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn driver() -> Result<(), Error> {
    let matches = App::new("slider-astar")
        .version("0.1.0")
        .about("Solve sliding-tile puzzles optimally with A* search")
        .arg(
            Arg::with_name("size")
                .long("size")
                .short("n")
                .value_name("N")
                .default_value("3")
                .help("Board side length"),
        )
        .arg(
            Arg::with_name("steps")
                .long("steps")
                .value_name("K")
                .default_value("200")
                .help("Random moves used to scramble the goal"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed for a reproducible scramble"),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .value_name("TILES")
                .help("Start state as a row-major list, e.g. \"3,7,4,5,0,6,8,2,1\""),
        )
        .arg(
            Arg::with_name("heuristic")
                .long("heuristic")
                .value_name("NAME")
                .possible_values(&["manhattan", "enhanced", "both"])
                .default_value("both"),
        )
        .arg(
            Arg::with_name("limit")
                .long("limit")
                .value_name("STATES")
                .help("Give up after evaluating this many states"),
        )
        .arg(
            Arg::with_name("quiet")
                .long("quiet")
                .short("q")
                .help("Only print the summary, not every move"),
        )
        .get_matches();

    let start = match matches.value_of("start") {
        Some(tiles) => tiles
            .parse::<Puzzle>()
            .context("Could not read --start")?,
        None => {
            let size = value_t!(matches, "size", usize)?;
            let steps = value_t!(matches, "steps", usize)?;
            match matches.value_of("seed") {
                Some(_) => {
                    let seed = value_t!(matches, "seed", u64)?;
                    generator::random_walk(size, steps, &mut StdRng::seed_from_u64(seed))?
                }
                None => generator::scramble(size, steps)?,
            }
        }
    };
    let goal = Puzzle::goal(start.size())?;

    if !start.is_solvable_towards(&goal) {
        bail!("This puzzle cannot reach the goal:\n{}", start);
    }
    if start.size() > 4 {
        warn!("Boards larger than 4x4 are unlikely to finish in reasonable memory");
    }

    let mut options = SearchOptions::default().with_verbose(100_000);
    if matches.is_present("limit") {
        options = options.with_limit(value_t!(matches, "limit", usize)?);
    }

    let heuristics: Vec<&dyn Heuristic> = match matches.value_of("heuristic") {
        Some("manhattan") => vec![&Manhattan as &dyn Heuristic],
        Some("enhanced") => vec![&LinearConflict as &dyn Heuristic],
        _ => vec![&Manhattan as &dyn Heuristic, &LinearConflict],
    };

    let stdout = std::io::stdout();
    let styled = stdout.is_tty();
    let mut out = stdout.lock();

    writeln!(out, "Start:")?;
    render_board(&mut out, &start, None, styled)?;

    for heuristic in heuristics {
        let solution = solve_with_options(&start, &goal, heuristic, options.clone())
            .with_context(|| format!("Search with {} failed", heuristic.name()))?;
        info!(
            "{}: {} moves, {} states evaluated",
            heuristic.name(),
            solution.moves,
            solution.evaluated
        );

        if matches.is_present("quiet") {
            writeln!(
                out,
                "{}: {} moves, {} states evaluated",
                heuristic.name(),
                solution.moves,
                solution.evaluated
            )?;
        } else {
            render_solution(&mut out, &solution, styled)?;
        }
    }

    Ok(())
}

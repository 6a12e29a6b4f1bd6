use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use slide_meet::board::board_area;
use slide_meet::moves::{apply_moves, MoveCounts};
use slide_meet::orientation::{restore_moves, transpose};
use slide_meet::problem::{ProblemSet, ReferenceSet, ResultFile};
use slide_meet::{solve_towards, Arrangement, Cell, ParseError, ProblemError, SolverConfig};

#[derive(Parser, Debug)]
#[command(name = "slide-meet", version, about = "Sliding-tile puzzle solver")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Solve every problem in a problem file, appending answers to a result file.
    Solve(SolveArgs),
    /// Scramble a canonical board, solve it and print each step.
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct SolverFlags {
    /// Let every stage run without a time limit.
    #[arg(long = "no-timeout")]
    no_timeout: bool,

    /// Seconds allowed per stage attempt.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Disable frontier pruning (plain bidirectional BFS).
    #[arg(long = "no-prune")]
    no_prune: bool,

    /// Rounds between frontier pruning passes.
    #[arg(long, default_value_t = 3usize.pow(8))]
    prune_interval: usize,

    /// Prune the goal-side frontier as well.
    #[arg(long)]
    prune_backward: bool,

    /// Combined visited-state ceiling per search.
    #[arg(long, default_value_t = 20_000_000)]
    max_visited: usize,

    /// Fall back to split stages when the whole-board search fails.
    #[arg(long)]
    staged_fallback: bool,
}

impl SolverFlags {
    fn config(&self) -> SolverConfig {
        SolverConfig::default()
            .with_max_visited(self.max_visited)
            .with_prune_interval((!self.no_prune).then_some(self.prune_interval))
            .with_prune_backward(self.prune_backward)
            .with_stage_budget((!self.no_timeout).then(|| Duration::from_secs(self.timeout)))
            .with_staged_fallback(self.staged_fallback)
    }
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Problem file.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Earlier result file; problems with an answer there are skipped.
    #[arg(short = 'r', long = "reference")]
    reference: Option<PathBuf>,

    /// Result file (default: result_<stem>_<start>_<end>.txt).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// First problem index to solve.
    #[arg(short = 's', long = "start", default_value_t = 0)]
    start: usize,

    /// Last problem index to solve (inclusive).
    #[arg(short = 'e', long = "end", default_value_t = 4999)]
    end: usize,

    /// Solve each board transposed and map the answer back.
    #[arg(long)]
    rotate: bool,

    #[command(flatten)]
    solver: SolverFlags,
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(long, default_value_t = 4)]
    width: usize,

    #[arg(long, default_value_t = 4)]
    height: usize,

    /// Random blank moves applied to the solved board.
    #[arg(long, default_value_t = 40)]
    steps: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Cell index to turn into a wall; repeatable.
    #[arg(long = "wall")]
    walls: Vec<usize>,

    #[command(flatten)]
    solver: SolverFlags,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error("invalid demo board: {0}")]
    Board(#[from] ParseError),

    #[error("wall index {index} is outside a {width}x{height} board")]
    WallOutOfRange {
        index: usize,
        width: usize,
        height: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.cmd {
        Cmd::Solve(args) => run_solve(args),
        Cmd::Demo(args) => run_demo(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_solve(args: &SolveArgs) -> Result<(), CliError> {
    let set = ProblemSet::load(&args.input)?;
    let references = match &args.reference {
        Some(path) => ReferenceSet::load(path)?,
        None => ReferenceSet::default(),
    };
    if set.is_empty() {
        warn!(path = %args.input.display(), "problem file lists no problems");
        return Ok(());
    }

    let (mut first, mut last) = (args.start, args.end);
    if first > last {
        std::mem::swap(&mut first, &mut last);
    }
    let last = last.min(set.len() - 1);

    let results = ResultFile::new(
        args.output
            .clone()
            .unwrap_or_else(|| ResultFile::default_name(&args.input, first, last)),
    );
    let config = args.solver.config();
    info!(
        problems = set.len(),
        first,
        last,
        output = %results.path().display(),
        ?config,
        "starting batch"
    );

    let batch_start = Instant::now();
    let mut totals = MoveCounts::default();
    let mut solved = 0usize;
    for (index, problem) in set.problems.iter().enumerate() {
        if index < first || index > last || references.is_solved(index) {
            results.append("")?;
            continue;
        }

        let board = &problem.arrangement;
        info!(
            index,
            width = board.width(),
            height = board.height(),
            pattern = %board.to_pattern(),
            "solving"
        );

        let started = Instant::now();
        let answer = if args.rotate {
            solve_towards(&transpose(board), &transpose(&board.goal()), &config)
                .into_moves()
                .map(|moves| restore_moves(&moves))
        } else {
            solve_towards(board, &board.goal(), &config).into_moves()
        };
        let elapsed = started.elapsed();

        match &answer {
            Some(moves) => {
                solved += 1;
                let counts = moves.counts();
                totals.add(counts);
                info!(index, %counts, moves = %moves, ?elapsed, "solved");
            }
            None => warn!(index, ?elapsed, "no solution found"),
        }
        results.append(&answer.map(|m| m.to_string()).unwrap_or_default())?;
    }

    info!(
        solved,
        %totals,
        elapsed = ?batch_start.elapsed(),
        "batch finished"
    );
    let limits = set.limits;
    if totals.left > limits.left
        || totals.right > limits.right
        || totals.up > limits.up
        || totals.down > limits.down
    {
        warn!(%totals, %limits, "move totals exceed the problem file limits");
    }
    Ok(())
}

fn canonical_board(width: usize, height: usize, walls: &[usize]) -> Result<Arrangement, CliError> {
    let area = board_area(width, height)?;
    if let Some(&index) = walls.iter().find(|&&i| i >= area) {
        return Err(CliError::WallOutOfRange {
            index,
            width,
            height,
        });
    }
    let mut cells: Vec<Cell> = (0..area)
        .map(|i| if walls.contains(&i) { Cell::WALL } else { Cell::tile(i + 1) })
        .collect();
    if let Some(open) = cells.iter().rposition(|c| !c.is_wall()) {
        cells[open] = Cell::BLANK;
    }
    Ok(Arrangement::from_cells(width, height, cells)?)
}

fn render(board: &Arrangement) -> String {
    let mut out = String::new();
    for row in board.cells().chunks(board.width()) {
        for &cell in row {
            let text = format!("{:>2} ", cell.to_string());
            let text = text.as_str();
            let styled = if cell.is_wall() {
                text.dark_grey().to_string()
            } else if cell.is_blank() {
                text.reverse().to_string()
            } else {
                text.bold().to_string()
            };
            out.push_str(&styled);
        }
        out.push('\n');
    }
    out
}

fn run_demo(args: &DemoArgs) -> Result<(), CliError> {
    let goal = canonical_board(args.width, args.height, &args.walls)?;
    println!("Initial Puzzle:\n{}", render(&goal));

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut puzzle = goal.clone();
    puzzle.scramble(&mut rng, args.steps);
    println!("Shuffled Puzzle:\n{}", render(&puzzle));

    let started = Instant::now();
    let outcome = solve_towards(&puzzle, &goal, &args.solver.config());
    let Some(moves) = outcome.clone().into_moves() else {
        warn!(?outcome, elapsed = ?started.elapsed(), "no solution found");
        return Ok(());
    };
    println!(
        "Found a solution with {} moves in {:?}: {}",
        moves.len(),
        started.elapsed(),
        moves
    );

    let mut board = puzzle;
    for &mv in moves.iter() {
        board = match apply_moves(&board, &[mv]) {
            Ok(next) => next,
            Err(err) => {
                error!("{err}");
                break;
            }
        };
        println!("{}\n{}", mv, render(&board));
    }
    Ok(())
}

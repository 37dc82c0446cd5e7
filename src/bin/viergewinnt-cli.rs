#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::must_use_candidate,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::io::{self, BufRead, Write};
use viergewinnt_solver::replay::{ReplayConfig, replay};
use viergewinnt_solver::{
    Board, CellPosition, Game, GameResult, MoveOutcome, MoveResult, Solver, SolverConfig,
    WinResult, search_best_move,
};

/// Play Vier gewinnt against the computer.
#[derive(Parser, Debug)]
#[command(name = "viergewinnt-cli", about = "Play Vier gewinnt against the computer")]
struct Cli {
    /// Number of columns
    #[arg(long, default_value_t = 7)]
    width: u16,

    /// Number of rows
    #[arg(long, default_value_t = 6)]
    height: u16,

    /// Number of players (2 to 6)
    #[arg(long, default_value_t = 2)]
    players: u8,

    /// How many of the players are human; they move first
    #[arg(long, default_value_t = 1)]
    humans: u8,

    /// Search depth of the computer in plies
    #[arg(long, default_value_t = 8)]
    depth: u8,

    /// Search the root moves on a single thread
    #[arg(long)]
    sequential: bool,

    /// Instead of playing, replay a fixed opening in this many games and
    /// report the throughput
    #[arg(long, value_name = "GAMES")]
    replay: Option<u64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

fn print_board(board: &Board, highlight: &[CellPosition]) {
    // Row 0 is the top row, so rows print in storage order.
    for row in 0..board.height() {
        for col in 0..board.width() {
            let symbol = match board.cell(row, col) {
                _ if highlight.contains(&CellPosition::new(row, col)) => '*',
                0 => '.',
                player => char::from(b'0' + player),
            };
            print!("{symbol} ");
        }
        println!();
    }

    for _ in 0..board.width() {
        print!("--");
    }
    println!();

    for col_id in (0..board.width()).map(|i| (i + 1) % 10) {
        print!("{col_id} ");
    }
    println!();
}

/// Reads a 1-based column from stdin. Returns `None` on end of input.
fn read_column(game: &Game, input: &mut impl BufRead) -> Result<Option<usize>> {
    loop {
        print!("Player {}, choose your move (column): ", game.current_player());
        for col in game.board().available_columns_iter().map(|x| x + 1) {
            print!("{col},");
        }
        println!();
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            // adapt to index
            Ok(col) if col >= 1 => return Ok(Some(col - 1)),
            _ => println!("'{}' is not a column", line.trim()),
        }
    }
}

fn play(cli: &Cli) -> Result<()> {
    if cli.humans > cli.players {
        bail!("{} humans do not fit into a game of {} players", cli.humans, cli.players);
    }

    let mut game = Game::new(cli.width, cli.height, cli.players)?;
    let mut solver = Solver::new(SolverConfig {
        depth: cli.depth,
        parallel: !cli.sequential,
        ..SolverConfig::default()
    })?;
    let mut input = io::stdin().lock();

    println!("Let's play viergewinnt against the computer.");
    let MoveResult { position, result } = loop {
        println!("----------------");
        print_board(game.board(), &[]);
        println!();

        let player = game.current_player();
        let col = if player <= cli.humans {
            match read_column(&game, &mut input)? {
                Some(col) => col,
                None => return Ok(()),
            }
        } else {
            let col = search_best_move(&mut solver, &game)
                .context("computer found no move")?;
            println!(
                "Computer (player {player}) chose column {} after {} positions",
                col + 1,
                solver.node_count()
            );
            col
        };

        match game.place(col) {
            MoveOutcome::Illegal(e) => println!("{e}, try again"),
            MoveOutcome::Continuing(_) => {}
            MoveOutcome::Terminal(result) => break result,
        }
    };

    println!("----------------");
    match result {
        GameResult::Win(player) => {
            let cells = match game.board().check_win_detailed(position.row, position.col) {
                WinResult::Win { cells, .. } => cells,
                WinResult::NoWin => Vec::new(),
            };
            print_board(game.board(), &cells);
            if player <= cli.humans {
                println!("Player {player} won!");
            } else {
                println!("Computer (player {player}) won!");
            }
        }
        GameResult::Draw | GameResult::NoResult => {
            print_board(game.board(), &[]);
            println!("Gameover: draw");
        }
    }
    Ok(())
}

fn run_replay(cli: &Cli, games: u64) -> Result<()> {
    let config = ReplayConfig {
        games,
        width: cli.width,
        height: cli.height,
        players: cli.players,
        ..ReplayConfig::default()
    };
    let report = replay(&config)?;
    println!(
        "{} games took {:.3} seconds ({:.0} games/s)",
        report.games,
        report.elapsed.as_secs_f64(),
        report.games_per_second()
    );
    if report.errors > 0 {
        println!("Encountered {} errors during replay", report.errors);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    SimpleLogger::new()
        .with_level(cli.log_level)
        .init()
        .context("failed to set up logging")?;

    match cli.replay {
        Some(games) => run_replay(&cli, games),
        None => play(&cli),
    }
}

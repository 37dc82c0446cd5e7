//! Replays a fixed move sequence on many independent games in parallel.
//!
//! Useful to measure the raw speed of placement and win detection. Every
//! worker owns its games; the only shared state is the error counter.

use crate::error::ReplayError;
use crate::game::Game;
use log::{info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReplayConfig {
    /// Games to play in total.
    pub games: u64,
    /// Worker threads, `0` for one per CPU.
    pub threads: usize,
    pub width: u16,
    pub height: u16,
    pub players: u8,
    /// Columns played in every game.
    pub moves: Vec<usize>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            games: 1_000_000,
            threads: 0,
            width: 7,
            height: 6,
            players: 2,
            moves: vec![0, 1, 0, 1, 0, 1, 0],
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReplayReport {
    pub games: u64,
    /// Games in which a move was rejected.
    pub errors: u64,
    pub elapsed: Duration,
}

impl ReplayReport {
    #[must_use]
    pub fn games_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.games as f64 / secs
        } else {
            f64::INFINITY
        }
    }
}

/// Plays `config.moves` in `config.games` fresh games.
///
/// # Errors
/// [`ReplayError::Game`] if the game configuration is invalid,
/// [`ReplayError::ThreadPool`] if the workers cannot be started.
pub fn replay(config: &ReplayConfig) -> Result<ReplayReport, ReplayError> {
    let template = Game::new(config.width, config.height, config.players)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let workers = pool.current_num_threads() as u64;
    let per_worker = config.games / workers;
    let remainder = config.games % workers;
    info!(
        "replaying {} games of {} moves on {workers} threads",
        config.games,
        config.moves.len()
    );

    let errors = AtomicU64::new(0);
    let start = Instant::now();
    pool.install(|| {
        (0..workers).into_par_iter().for_each(|worker| {
            let games = per_worker + u64::from(worker == workers - 1) * remainder;
            let failed = run_batch(&template, &config.moves, games);
            errors.fetch_add(failed, Ordering::Relaxed);
        });
    });
    let elapsed = start.elapsed();

    let report = ReplayReport {
        games: config.games,
        errors: errors.into_inner(),
        elapsed,
    };
    info!(
        "{} games took {:.3}s ({:.0} games/s)",
        report.games,
        elapsed.as_secs_f64(),
        report.games_per_second()
    );
    if report.errors > 0 {
        warn!("encountered {} errors during replay", report.errors);
    }
    Ok(report)
}

/// Returns the number of games with a rejected move.
fn run_batch(template: &Game, moves: &[usize], games: u64) -> u64 {
    let mut failed = 0;
    for _ in 0..games {
        let mut game = template.clone();
        if moves.iter().any(|&col| game.place(col).is_illegal()) {
            failed += 1;
        }
    }
    failed
}

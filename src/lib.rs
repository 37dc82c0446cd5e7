//! _Vier gewinnt_ (Connect Four) for two to six players on boards of
//! arbitrary size, together with a negamax solver that picks moves for the
//! computer player.
//!
//! ```
//! use viergewinnt_solver::{Game, MoveOutcome, Solver};
//!
//! let mut game = Game::new(7, 6, 2).unwrap();
//! let mut solver = Solver::with_depth(4).unwrap();
//!
//! let col = solver.get_best_move(&game).unwrap();
//! assert!(matches!(game.place(col), MoveOutcome::Continuing(_)));
//! assert_eq!(game.current_player(), 2);
//! ```

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

mod ai_player;
mod board;
mod error;
mod game;
pub mod replay;
pub mod solver;
pub mod table;
mod zobrist;

pub use ai_player::search_best_move;
pub use board::{Board, CellPosition, GameResult, MAX_DIMENSION, SERIES_LEN, WinResult};
pub use error::{GameError, PlacementError, ReplayError, SearchError};
pub use game::{Game, MoveOutcome, MoveResult, PLAYER_COUNT_RANGE};
pub use solver::{Solver, SolverConfig, TablePolicy};

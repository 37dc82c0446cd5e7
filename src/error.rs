//! Error types of the game and the solver.

/// Errors raised while constructing a [`crate::Board`] or [`crate::Game`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum GameError {
    #[error("invalid board dimensions {width}x{height} (allowed: 1..=1000)")]
    InvalidDimensions { width: u16, height: u16 },

    #[error("invalid number of players {0} (allowed: 2..=6)")]
    InvalidPlayerCount(u8),
}

/// Errors of a single placement. The board is left untouched and the caller
/// is expected to retry with another column.
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum PlacementError {
    #[error("column {col} is out of bounds (width {width})")]
    OutOfBounds { col: usize, width: usize },

    /// Column is full.
    #[error("column {0} is full")]
    ColumnFull(usize),
}

/// Errors of the solver.
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum SearchError {
    #[error("no legal move left on the board")]
    NoLegalMoves,

    #[error("search depth must be at least one ply")]
    InvalidDepth,

    #[error("transposition table needs at least one shard")]
    InvalidShardCount,
}

/// Errors of the replay harness.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("invalid game configuration: {0}")]
    Game(#[from] GameError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

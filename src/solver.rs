//! Negamax search with alpha-beta pruning and a transposition table.
//!
//! Scores are always from the point of view of the player to move. With more
//! than two players the search runs for one root player and treats all other
//! players as a single adversary: they maximise together, and a win by any of
//! them is a loss for the root player.

use crate::board::{Board, GameResult};
use crate::error::SearchError;
use crate::game::{Game, MoveOutcome, MoveResult};
use crate::table::{Bound, Entry, PositionKey, TranspositionTable};
use log::{debug, trace};
use rayon::prelude::*;

/// Score of a won position. The number of plies left on the board is added,
/// so that faster wins score higher.
pub const WIN_SCORE: i32 = 1 << 24;

/// Larger than every reachable score.
const INFINITY: i32 = 1 << 30;

/// Bonus for an open cell that completes a horizontal series.
const THREAT_SCORE: i64 = 32;

/// What happens to the transposition table between two searches.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum TablePolicy {
    /// Every top-level call starts with an empty table.
    #[default]
    ClearPerSearch,
    /// Entries are reused by later calls.
    Persist,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SolverConfig {
    /// Plies searched from the root.
    pub depth: u8,
    /// Evaluate the root moves on the rayon thread pool.
    pub parallel: bool,
    pub table_policy: TablePolicy,
    /// Independently locked parts of the transposition table.
    pub table_shards: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            depth: 8,
            parallel: true,
            table_policy: TablePolicy::default(),
            table_shards: 64,
        }
    }
}

/// Picks moves for the computer player.
#[derive(Debug)]
pub struct Solver {
    config: SolverConfig,
    table: TranspositionTable,
    node_count: u64,
}

impl Solver {
    /// # Errors
    /// [`SearchError::InvalidDepth`] for a depth of zero,
    /// [`SearchError::InvalidShardCount`] for a table without shards.
    pub fn new(config: SolverConfig) -> Result<Self, SearchError> {
        if config.depth == 0 {
            return Err(SearchError::InvalidDepth);
        }
        if config.table_shards == 0 {
            return Err(SearchError::InvalidShardCount);
        }

        Ok(Self {
            config,
            table: TranspositionTable::new(config.table_shards),
            node_count: 0,
        })
    }

    /// Default configuration with the given depth.
    ///
    /// # Errors
    /// [`SearchError::InvalidDepth`] for a depth of zero.
    pub fn with_depth(depth: u8) -> Result<Self, SearchError> {
        Self::new(SolverConfig {
            depth,
            ..SolverConfig::default()
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Positions visited by the last top-level call.
    #[must_use]
    pub const fn node_count(&self) -> u64 {
        self.node_count
    }

    /// Positions currently stored in the transposition table.
    #[must_use]
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    fn begin_search(&mut self) {
        self.node_count = 0;
        if self.config.table_policy == TablePolicy::ClearPerSearch {
            trace!("clearing {} table entries", self.table.len());
            self.table.clear();
        }
    }

    /// Value of the position for the player to move, searched with the
    /// configured depth. A full board is a draw and scores `0`.
    pub fn solve(&mut self, game: &Game) -> i32 {
        self.begin_search();

        let order = move_order(game.board().width());
        let mut search = Search::new(&self.table, &order, game.current_player());
        let mut game = game.clone();
        let score = search.negamax(&mut game, self.config.depth, -INFINITY, INFINITY);

        self.node_count = search.nodes;
        debug!("solved position: score {score}, {} nodes", self.node_count);
        score
    }

    /// Returns the best column for the player to move.
    ///
    /// A column that wins immediately is always chosen. Otherwise every legal
    /// column is searched and the one with the best score wins; on equal
    /// scores the leftmost column is chosen.
    ///
    /// # Errors
    /// [`SearchError::NoLegalMoves`] if the board is full.
    pub fn get_best_move(&mut self, game: &Game) -> Result<usize, SearchError> {
        if game.board().is_full() {
            return Err(SearchError::NoLegalMoves);
        }
        self.begin_search();

        let mut root = game.clone();
        if let Some(col) = winning_column(&mut root) {
            self.node_count = 1;
            debug!("immediate win in column {col}");
            return Ok(col);
        }

        let order = move_order(root.board().width());
        let candidates = order
            .iter()
            .copied()
            .filter(|&col| root.board().can_place(col))
            .collect::<Vec<_>>();

        let depth = self.config.depth - 1;
        let table = &self.table;
        let root = &root;
        let player = root.current_player();
        let order = order.as_slice();
        let score_move = |col: usize| -> (usize, i32, u64) {
            let mut child = root.clone();
            let mut search = Search::new(table, order, player);
            let score = match child.place(col) {
                MoveOutcome::Continuing(_) => {
                    search.child_score(&mut child, player, depth, -INFINITY, INFINITY)
                }
                MoveOutcome::Terminal(MoveResult {
                    result: GameResult::Win(_),
                    ..
                }) => win_score(child.board()),
                MoveOutcome::Terminal(_) => 0,
                MoveOutcome::Illegal(_) => -INFINITY,
            };
            (col, score, search.nodes)
        };

        let scored = if self.config.parallel {
            candidates.par_iter().map(|&col| score_move(col)).collect::<Vec<_>>()
        } else {
            candidates.iter().map(|&col| score_move(col)).collect::<Vec<_>>()
        };

        self.node_count = 1 + scored.iter().map(|&(_, _, nodes)| nodes).sum::<u64>();

        let mut best = None;
        for &(col, score, _) in &scored {
            trace!("column {col}: score {score}");
            match best {
                Some((best_col, best_score))
                    if best_score > score || (best_score == score && best_col < col) => {}
                _ => best = Some((col, score)),
            }
        }

        let (col, score) = best.ok_or(SearchError::NoLegalMoves)?;
        debug!(
            "best move: column {col} (score {score}, {} nodes)",
            self.node_count
        );
        Ok(col)
    }
}

/// Columns sorted by their distance to the center, left first on ties.
#[must_use]
pub fn move_order(width: usize) -> Vec<usize> {
    let mut order = (0..width).collect::<Vec<_>>();
    order.sort_by_key(|&col| (2 * col).abs_diff(width.saturating_sub(1)));
    order
}

/// Score of a position that was just won, for the winner.
fn win_score(board: &Board) -> i32 {
    let remaining = board.max_moves() - board.moves_played();
    WIN_SCORE + i32::try_from(remaining).unwrap_or(0)
}

/// Plays `col` and takes it back. Returns the win score if the move wins
/// for the player to move.
fn probe_win(game: &mut Game, col: usize) -> Option<i32> {
    let outcome = game.place(col);
    let score = match outcome {
        MoveOutcome::Terminal(MoveResult {
            result: GameResult::Win(_),
            ..
        }) => Some(win_score(game.board())),
        _ => None,
    };
    if !outcome.is_illegal() {
        game.undo(col);
    }
    score
}

/// First column, from the left, in which the player to move wins at once.
fn winning_column(game: &mut Game) -> Option<usize> {
    (0..game.board().width()).find(|&col| probe_win(game, col).is_some())
}

/// Whether `a` and `b` play on the same side of a search run for `root`.
const fn same_side(a: u8, b: u8, root: u8) -> bool {
    (a == root) == (b == root)
}

/// Static evaluation at the search horizon, for the side to move of a
/// search run for `root`.
///
/// Occupancy is weighted by the distance to the center column. Open cells
/// that complete a horizontal series add a bonus for `root` and a penalty
/// for everyone else.
#[must_use]
pub fn evaluate(game: &Game, root: u8) -> i32 {
    let board = game.board();
    let width = board.width();
    let height = board.height();

    let mut score = 0i64;
    for col in 0..width {
        let weight = (width - (2 * col).abs_diff(width - 1)) as i64;
        let occupied = height - board.free_slots_in_column(col);
        for row in height - occupied..height {
            if board.cell(row, col) == root {
                score += weight;
            } else {
                score -= weight;
            }
        }

        if let Some(row) = board.next_row(col) {
            if board.completes_horizontal(row, col, root) {
                score += THREAT_SCORE;
            }
            if (1..=game.number_of_players())
                .filter(|&other| other != root)
                .any(|other| board.completes_horizontal(row, col, other))
            {
                score -= THREAT_SCORE;
            }
        }
    }

    if game.current_player() != root {
        score = -score;
    }
    let limit = i64::from(WIN_SCORE - 1);
    score.clamp(-limit, limit) as i32
}

/// State of one search worker. Each worker owns its game and node counter;
/// only the table is shared.
struct Search<'a> {
    table: &'a TranspositionTable,
    order: &'a [usize],
    root: u8,
    nodes: u64,
}

impl<'a> Search<'a> {
    const fn new(table: &'a TranspositionTable, order: &'a [usize], root: u8) -> Self {
        Self {
            table,
            order,
            root,
            nodes: 0,
        }
    }

    /// Value of the position after `mover` made a move, for `mover`. The
    /// sign only flips when the turn passes to the other side.
    fn child_score(
        &mut self,
        game: &mut Game,
        mover: u8,
        depth: u8,
        alpha: i32,
        beta: i32,
    ) -> i32 {
        if same_side(mover, game.current_player(), self.root) {
            self.negamax(game, depth, alpha, beta)
        } else {
            -self.negamax(game, depth, -beta, -alpha)
        }
    }

    fn negamax(&mut self, game: &mut Game, depth: u8, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;

        if game.board().is_full() {
            return 0;
        }
        if let Some(score) = self.order.iter().find_map(|&col| probe_win(game, col)) {
            return score;
        }
        if depth == 0 {
            return evaluate(game, self.root);
        }

        let alpha_original = alpha;
        let key = PositionKey::of(game, self.root);
        if let Some(entry) = self.table.get(key).filter(|entry| entry.depth >= depth) {
            match entry.bound {
                Bound::Exact => return entry.score,
                Bound::LowerBound => alpha = alpha.max(entry.score),
                Bound::UpperBound => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return entry.score;
            }
        }

        let mover = game.current_player();
        let mut best = -INFINITY;
        for &col in self.order {
            let score = match game.place(col) {
                MoveOutcome::Illegal(_) => continue,
                MoveOutcome::Continuing(_) => self.child_score(game, mover, depth - 1, alpha, beta),
                MoveOutcome::Terminal(MoveResult {
                    result: GameResult::Win(_),
                    ..
                }) => win_score(game.board()),
                MoveOutcome::Terminal(_) => 0,
            };
            game.undo(col);

            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        let bound = if best <= alpha_original {
            Bound::UpperBound
        } else if best >= beta {
            Bound::LowerBound
        } else {
            Bound::Exact
        };
        self.table.store(
            key,
            Entry {
                score: best,
                depth,
                bound,
            },
        );
        best
    }
}

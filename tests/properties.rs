//! Property-based tests for the board invariants and the solver.

use proptest::prelude::*;
use viergewinnt_solver::solver::{WIN_SCORE, evaluate};
use viergewinnt_solver::{
    Board, CellPosition, Game, GameResult, MoveOutcome, PlacementError, Solver, SolverConfig,
};

/// Board dimensions small enough to fill quickly.
fn arb_dimensions() -> impl Strategy<Value = (u16, u16)> {
    (1u16..=9, 1u16..=8)
}

/// Random column choices together with the player of each move.
fn arb_moves() -> impl Strategy<Value = Vec<(usize, u8)>> {
    proptest::collection::vec((0usize..12, 1u8..=6), 0..80)
}

/// Checks the fill invariant: a cell is occupied iff it lies below the
/// free part of its column.
fn assert_gravity(board: &Board) {
    let mut occupied = 0;
    for col in 0..board.width() {
        let fill = board.height() - board.free_slots_in_column(col);
        for row in 0..board.height() {
            let expected_occupied = row >= board.height() - fill;
            assert_eq!(board.cell(row, col) != 0, expected_occupied);
        }
        occupied += fill;
    }
    assert_eq!(occupied, board.moves_played());
}

/// Plays the columns on a 7x6 board until a move would end the game.
/// Illegal columns are skipped.
fn game_from_columns(players: u8, columns: &[usize]) -> Game {
    let mut game = Game::new(7, 6, players).unwrap();
    for &col in columns {
        match game.place(col) {
            MoveOutcome::Illegal(_) | MoveOutcome::Continuing(_) => {}
            MoveOutcome::Terminal(_) => {
                game.undo(col);
                break;
            }
        }
    }
    game
}

/// Score of a position that was just won, for the winner.
fn win_score(board: &Board) -> i32 {
    WIN_SCORE + i32::try_from(board.max_moves() - board.moves_played()).unwrap()
}

/// Value of the move in `col` for the player to move, `None` if illegal.
fn reference_move_score(game: &mut Game, col: usize, root: u8, depth: u8) -> Option<i32> {
    let mover = game.current_player();
    let score = match game.place(col) {
        MoveOutcome::Illegal(_) => return None,
        MoveOutcome::Continuing(_) => {
            let next = game.current_player();
            if (mover == root) == (next == root) {
                reference_negamax(game, root, depth)
            } else {
                -reference_negamax(game, root, depth)
            }
        }
        MoveOutcome::Terminal(result) => match result.result {
            GameResult::Win(_) => win_score(game.board()),
            GameResult::Draw | GameResult::NoResult => 0,
        },
    };
    game.undo(col);
    Some(score)
}

/// Full-width negamax without pruning or memo, for the side to move of a
/// search run for `root`.
fn reference_negamax(game: &mut Game, root: u8, depth: u8) -> i32 {
    if game.board().is_full() {
        return 0;
    }
    let width = game.board().width();
    let immediate_win = (0..width).find_map(|col| {
        let mover = game.current_player();
        let outcome = game.place(col);
        if outcome.is_illegal() {
            return None;
        }
        let score = matches!(outcome.terminal(), Some(m) if m.result == GameResult::Win(mover))
            .then(|| win_score(game.board()));
        game.undo(col);
        score
    });
    if let Some(score) = immediate_win {
        return score;
    }
    if depth == 0 {
        return evaluate(game, root);
    }

    (0..width)
        .filter_map(|col| reference_move_score(game, col, root, depth - 1))
        .max()
        .unwrap()
}

proptest! {
    #[test]
    fn placement_follows_gravity((width, height) in arb_dimensions(), moves in arb_moves()) {
        let mut board = Board::new(width, height).unwrap();
        for (col, player) in moves {
            let before = board.clone();
            match board.place(col, player) {
                Ok(pos) => {
                    prop_assert_eq!(pos.col, col);
                    prop_assert_eq!(Some(pos.row), before.next_row(col));
                    prop_assert_eq!(pos.row, before.free_slots_in_column(col) - 1);
                    prop_assert_eq!(board.cell(pos.row, col), player);
                    prop_assert_eq!(board.moves_played(), before.moves_played() + 1);
                }
                Err(PlacementError::OutOfBounds { col: c, width: w }) => {
                    prop_assert!(col >= board.width());
                    prop_assert_eq!((c, w), (col, board.width()));
                    prop_assert_eq!(&board, &before);
                }
                Err(PlacementError::ColumnFull(c)) => {
                    prop_assert_eq!(c, col);
                    prop_assert_eq!(before.free_slots_in_column(col), 0);
                    prop_assert_eq!(&board, &before);
                }
            }
            assert_gravity(&board);
        }
    }

    #[test]
    fn undo_reverts_place((width, height) in arb_dimensions(), moves in arb_moves()) {
        let mut board = Board::new(width, height).unwrap();
        let mut history = vec![board.clone()];
        let mut played = Vec::new();
        for (col, player) in moves {
            if board.place(col, player).is_ok() {
                played.push(col);
                history.push(board.clone());
            }
        }

        while let Some(col) = played.pop() {
            history.pop();
            prop_assert!(board.undo(col).is_some());
            let previous = history.last().unwrap();
            prop_assert_eq!(&board, previous);
            prop_assert_eq!(board.hash(), previous.hash());
        }
        prop_assert_eq!(board.hash(), 0);
    }

    #[test]
    fn no_result_before_seven_moves(moves in proptest::collection::vec((0usize..7, 1u8..=2), 0..7)) {
        let mut board = Board::new(7, 6).unwrap();
        for (col, player) in moves {
            let pos = board.place(col, player).unwrap();
            prop_assert_eq!(board.check_win(pos), GameResult::NoResult);
        }
    }

    #[test]
    fn check_win_is_pure(moves in arb_moves(), row in 0usize..6, col in 0usize..7) {
        let mut board = Board::new(7, 6).unwrap();
        for (c, player) in moves {
            let _ = board.place(c % 7, player);
        }
        let snapshot = board.clone();
        let first = board.check_win(CellPosition::new(row, col));
        for _ in 0..3 {
            prop_assert_eq!(board.check_win(CellPosition::new(row, col)), first);
        }
        prop_assert_eq!(&board, &snapshot);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn solve_matches_plain_negamax(
        players in 2u8..=3,
        columns in proptest::collection::vec(0usize..7, 0..16),
        depth in 3u8..=5,
    ) {
        let mut game = game_from_columns(players, &columns);
        let root = game.current_player();
        let mut solver = Solver::new(SolverConfig {
            depth,
            parallel: false,
            ..SolverConfig::default()
        })
        .unwrap();

        let expected = reference_negamax(&mut game, root, depth);
        prop_assert_eq!(solver.solve(&game), expected);
    }

    #[test]
    fn best_move_matches_plain_negamax(
        players in 2u8..=3,
        columns in proptest::collection::vec(0usize..7, 0..16),
        depth in 3u8..=4,
        parallel in any::<bool>(),
    ) {
        let mut game = game_from_columns(players, &columns);
        let root = game.current_player();
        let mut solver = Solver::new(SolverConfig {
            depth,
            parallel,
            ..SolverConfig::default()
        })
        .unwrap();

        let scores = (0..game.board().width())
            .filter_map(|col| {
                reference_move_score(&mut game, col, root, depth - 1).map(|score| (col, score))
            })
            .collect::<Vec<_>>();
        // an immediate win outscores every later one, so the leftmost best
        // column is also the leftmost winning one
        let best = scores.iter().map(|&(_, score)| score).max().unwrap();
        let expected = scores.iter().find(|&&(_, score)| score == best).unwrap().0;
        prop_assert_eq!(solver.get_best_move(&game), Ok(expected));
    }
}

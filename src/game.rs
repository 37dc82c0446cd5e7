//! Game logic: turn order on top of the [`Board`].

use crate::board::{Board, CellPosition, GameResult};
use crate::error::{GameError, PlacementError};

/// Allowed numbers of players.
pub const PLAYER_COUNT_RANGE: core::ops::RangeInclusive<u8> = 2..=6;

/// Position and result of the move that ended the game.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MoveResult {
    pub position: CellPosition,
    pub result: GameResult,
}

/// Outcome of [`Game::place`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MoveOutcome {
    /// The move was rejected, nothing changed. Retry with another column.
    Illegal(PlacementError),
    /// Game continues, the turn passed to the next player.
    Continuing(CellPosition),
    /// The move won or filled the board.
    Terminal(MoveResult),
}

impl MoveOutcome {
    /// The result of a terminal move, `None` otherwise.
    #[must_use]
    pub const fn terminal(self) -> Option<MoveResult> {
        match self {
            Self::Terminal(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_illegal(self) -> bool {
        matches!(self, Self::Illegal(_))
    }
}

/// Game with all its state.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Game {
    board: Board,
    number_of_players: u8,
    current_player: u8,
}

impl Game {
    /// Creates a new game; player `1` starts.
    ///
    /// # Errors
    /// [`GameError::InvalidPlayerCount`] for less than two or more than six
    /// players, [`GameError::InvalidDimensions`] for an invalid board size.
    pub fn new(width: u16, height: u16, number_of_players: u8) -> Result<Self, GameError> {
        if !PLAYER_COUNT_RANGE.contains(&number_of_players) {
            return Err(GameError::InvalidPlayerCount(number_of_players));
        }

        Ok(Self {
            board: Board::new(width, height)?,
            number_of_players,
            current_player: 1,
        })
    }

    /// Drops a coin of the current player into `col`.
    ///
    /// The turn only passes on if the game continues, so after a win
    /// [`Self::current_player`] is the winner.
    pub fn place(&mut self, col: usize) -> MoveOutcome {
        let position = match self.board.place(col, self.current_player) {
            Ok(position) => position,
            Err(e) => return MoveOutcome::Illegal(e),
        };

        let result = self.board.check_win(position);
        if result.is_terminal() {
            return MoveOutcome::Terminal(MoveResult { position, result });
        }

        self.current_player = self.current_player % self.number_of_players + 1;
        MoveOutcome::Continuing(position)
    }

    /// Takes back the topmost coin of `col`. Its owner is to move again.
    pub fn undo(&mut self, col: usize) -> Option<CellPosition> {
        let owner = self.board.top_player(col)?;
        let position = self.board.undo(col)?;
        self.current_player = owner;
        Some(position)
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub const fn current_player(&self) -> u8 {
        self.current_player
    }

    #[must_use]
    pub const fn number_of_players(&self) -> u8 {
        self.number_of_players
    }

    /// Number of coins played so far.
    #[must_use]
    pub const fn round(&self) -> usize {
        self.board.moves_played()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_count_is_validated() {
        assert_eq!(Game::new(7, 6, 1), Err(GameError::InvalidPlayerCount(1)));
        assert_eq!(Game::new(7, 6, 7), Err(GameError::InvalidPlayerCount(7)));
        assert!(Game::new(7, 6, 2).is_ok());
        assert!(Game::new(7, 6, 6).is_ok());
        assert_eq!(
            Game::new(0, 6, 2),
            Err(GameError::InvalidDimensions {
                width: 0,
                height: 6
            })
        );
    }

    #[test]
    fn test_turns_rotate() {
        let mut game = Game::new(7, 6, 3).unwrap();
        let players = (0..6)
            .map(|col| {
                let player = game.current_player();
                assert!(matches!(game.place(col), MoveOutcome::Continuing(_)));
                player
            })
            .collect::<Vec<_>>();
        assert_eq!(players, [1, 2, 3, 1, 2, 3]);
        assert_eq!(game.round(), 6);
    }

    #[test]
    fn test_illegal_move_keeps_turn() {
        let mut game = Game::new(4, 1, 2).unwrap();
        assert!(matches!(game.place(0), MoveOutcome::Continuing(_)));
        assert_eq!(game.current_player(), 2);

        assert_eq!(
            game.place(0),
            MoveOutcome::Illegal(PlacementError::ColumnFull(0))
        );
        assert_eq!(
            game.place(4),
            MoveOutcome::Illegal(PlacementError::OutOfBounds { col: 4, width: 4 })
        );
        assert!(game.place(4).is_illegal());
        assert_eq!(game.current_player(), 2);
        assert_eq!(game.round(), 1);
    }

    #[test]
    fn test_win_keeps_winner_as_current_player() {
        let mut game = Game::new(7, 6, 2).unwrap();
        for col in [0, 0, 1, 1, 2, 2] {
            assert_eq!(game.place(col).terminal(), None);
        }

        let outcome = game.place(3);
        assert_eq!(
            outcome.terminal(),
            Some(MoveResult {
                position: CellPosition::new(5, 3),
                result: GameResult::Win(1),
            })
        );
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn test_undo_restores_turn() {
        let mut game = Game::new(7, 6, 2).unwrap();
        let start = game.clone();

        game.place(3);
        game.place(3);
        assert_eq!(game.current_player(), 1);

        assert_eq!(game.undo(3), Some(CellPosition::new(4, 3)));
        assert_eq!(game.current_player(), 2);
        assert_eq!(game.undo(3), Some(CellPosition::new(5, 3)));
        assert_eq!(game, start);
        assert_eq!(game.undo(3), None);
    }
}

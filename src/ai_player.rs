use crate::{Game, SearchError, Solver};

/// Move of the computer player.
///
/// # Errors
/// [`SearchError::NoLegalMoves`] if the board is full.
pub fn search_best_move(solver: &mut Solver, game: &Game) -> Result<usize, SearchError> {
    // Optimization: Take middle when not taken yet
    if game.round() < 2 {
        let middle = game.board().width() / 2;
        if game.board().free_slots_in_column(middle) == game.board().height() {
            return Ok(middle);
        }
    }

    solver.get_best_move(game)
}

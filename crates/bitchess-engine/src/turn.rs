//! Validated turns: the checked entry point for changing a [`Position`].

use bitchess_core::Move;
use thiserror::Error;
use tracing::debug;

use crate::movegen::legal_moves;
use crate::Position;

/// Error returned when a turn is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Plays `m` if it is legal for the side to move.
///
/// Returns the move as generated, carrying its capture and check flags. On
/// error the position is left exactly as it was.
pub fn apply_turn(position: &mut Position, m: Move) -> Result<Move, TurnError> {
    let legal = if m.color() == position.side_to_move {
        legal_moves(position).find(&m)
    } else {
        None
    };

    let Some(legal) = legal else {
        debug!(mv = %m.to_uci(), side = %position.side_to_move, "rejected turn");
        return Err(TurnError::IllegalMove(m.to_uci()));
    };

    position.apply_move(legal);
    Ok(legal)
}

/// Reverses the last turn. A no-op returning `None` when nothing has been
/// played.
pub fn undo_last_move(position: &mut Position) -> Option<Move> {
    position.undo_last_move()
}

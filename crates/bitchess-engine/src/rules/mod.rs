//! Game-over and draw detection.
//!
//! The [`RuleSet`] trait separates end-of-game policy from move generation.
//! Conditions that can be read off a single position (mate, stalemate, the
//! fifty-move rule, insufficient material) are decided here; repetition needs
//! the position history and is decided by [`Game`](crate::Game).

mod draw;
mod standard;

pub use draw::{is_fifty_move_draw, is_insufficient_material, DrawRules};
pub use standard::StandardChess;

use std::fmt;

use crate::{MoveList, Position};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// White wins by checkmate.
    WhiteWins,
    /// Black wins by checkmate.
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

impl GameResult {
    /// Result tag as written in game records: `1-0`, `0-1` or `1/2-1/2`.
    pub const fn score(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => f.write_str("white wins"),
            GameResult::BlackWins => f.write_str("black wins"),
            GameResult::Draw(reason) => write!(f, "draw by {reason}"),
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// No legal moves and not in check.
    Stalemate,
    /// Neither side can force mate.
    InsufficientMaterial,
    /// The halfmove clock reached the configured limit.
    FiftyMoveRule,
    /// The same position occurred the configured number of times.
    ThreefoldRepetition,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMoveRule => "fifty-move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
        };
        f.write_str(reason)
    }
}

/// End-of-game policy for a variant.
///
/// Methods that try moves take the position mutably; every one of them
/// restores it before returning.
///
/// # Example
///
/// ```
/// use bitchess_engine::rules::{RuleSet, StandardChess};
///
/// let rules = StandardChess::default();
/// let mut position = rules.initial_position();
/// assert_eq!(rules.legal_moves(&mut position).len(), 20);
/// assert!(rules.game_result(&mut position).is_none());
/// ```
pub trait RuleSet {
    /// Returns the initial position for this variant.
    fn initial_position(&self) -> Position;

    /// All legal moves for the side to move.
    fn legal_moves(&self, position: &mut Position) -> MoveList;

    /// Returns true if the side to move is in check.
    fn is_check(&self, position: &Position) -> bool;

    /// Returns true if neither side has enough material to mate.
    fn is_insufficient_material(&self, position: &Position) -> bool;

    /// Returns the result if the game is over, otherwise `None`.
    ///
    /// Repetition is not considered; see [`Game`](crate::Game).
    fn game_result(&self, position: &mut Position) -> Option<GameResult>;

    /// Returns true if the game is over.
    fn is_game_over(&self, position: &mut Position) -> bool {
        self.game_result(position).is_some()
    }
}

//! Full game management with history tracking.
//!
//! The [`Game`] struct layers what a single [`Position`] cannot know on top
//! of it: the hashes of every position reached (for repetition), the move
//! log in SAN, and the result once the game has ended.

use bitchess_core::{FenError, Move, Piece, Square};
use thiserror::Error;
use tracing::debug;

use crate::movegen::{is_in_check, legal_moves};
use crate::rules::{DrawReason, DrawRules, GameResult, RuleSet, StandardChess};
use crate::san::{move_to_san, san_to_move, SanError};
use crate::turn::apply_turn;
use crate::{MoveList, Position};

/// A recorded move in game history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMove {
    /// The move as played, with capture and check flags.
    pub mov: Move,
    /// SAN notation for the move.
    pub san: String,
    /// Zobrist hash of the position before the move.
    pub hash_before: u64,
}

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("invalid SAN: {0}")]
    InvalidSan(#[from] SanError),
    #[error("game has already ended")]
    GameAlreadyOver,
}

/// A chess game with history tracking.
///
/// Unlike [`Position`], which represents a single board state, `Game` tracks
/// the hashes of all positions reached so that repetition can be detected,
/// and settles the result after every turn.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    rules: StandardChess,
    /// Hash of every position reached, starting position included.
    hashes: Vec<u64>,
    moves: Vec<GameMove>,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A new game from the standard starting position with default draw
    /// rules.
    pub fn new() -> Self {
        Self::with_rules(DrawRules::default())
    }

    /// A new game from the standard starting position.
    pub fn with_rules(draw_rules: DrawRules) -> Self {
        let rules = StandardChess::new(draw_rules);
        Self::from_position_with_rules(rules.initial_position(), draw_rules)
    }

    /// A game continuing from `position` with default draw rules.
    pub fn from_position(position: Position) -> Self {
        Self::from_position_with_rules(position, DrawRules::default())
    }

    pub fn from_position_with_rules(position: Position, draw_rules: DrawRules) -> Self {
        let hash = position.zobrist_hash();
        let mut game = Game {
            position,
            rules: StandardChess::new(draw_rules),
            hashes: vec![hash],
            moves: Vec::new(),
            result: None,
        };
        game.check_game_end();
        game
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn draw_rules(&self) -> &DrawRules {
        &self.rules.draw_rules
    }

    /// All legal moves in the current position; empty once the game is over.
    pub fn legal_moves(&mut self) -> MoveList {
        if self.result.is_some() {
            return MoveList::new();
        }
        self.rules.legal_moves(&mut self.position)
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_in_check(&self.position, self.position.side_to_move)
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn move_history(&self) -> &[GameMove] {
        &self.moves
    }

    /// Number of half-moves (plies) played.
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Plays `m` if legal and returns it as generated.
    pub fn apply_turn(&mut self, m: Move) -> Result<Move, GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }

        let Some(generated) = legal_moves(&mut self.position).find(&m) else {
            debug!(mv = %m.to_uci(), "rejected illegal move");
            return Err(GameError::IllegalMove(m.to_uci()));
        };
        let san = move_to_san(&mut self.position, generated);
        let hash_before = self.position.zobrist_hash();
        let played = apply_turn(&mut self.position, generated)
            .map_err(|_| GameError::IllegalMove(m.to_uci()))?;

        self.moves.push(GameMove {
            mov: played,
            san,
            hash_before,
        });
        self.hashes.push(self.position.zobrist_hash());
        self.check_game_end();
        Ok(played)
    }

    /// Plays a move given in SAN.
    pub fn make_move_san(&mut self, san: &str) -> Result<Move, GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }
        let m = san_to_move(&mut self.position, san)?;
        self.apply_turn(m)
    }

    /// Plays a move given in coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, GameError> {
        if self.result.is_some() {
            return Err(GameError::GameAlreadyOver);
        }

        let illegal = || GameError::IllegalMove(uci.to_string());
        let (from, to, promotion) = parse_uci(uci).ok_or_else(illegal)?;
        let m = self
            .legal_moves()
            .iter()
            .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion)
            .copied()
            .ok_or_else(illegal)?;
        self.apply_turn(m)
    }

    /// Takes back the last move, reopening the game if it had ended.
    pub fn undo(&mut self) -> Option<Move> {
        let undone = self.position.undo_last_move()?;
        self.moves.pop();
        self.hashes.pop();
        self.result = None;
        Some(undone)
    }

    /// How many times the current position has occurred in this game.
    pub fn position_count(&self) -> usize {
        let current = self.position.zobrist_hash();
        self.hashes.iter().filter(|&&h| h == current).count()
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    fn check_game_end(&mut self) {
        self.result = self.rules.game_result(&mut self.position).or_else(|| {
            let repetitions = self.position_count();
            (repetitions >= self.rules.draw_rules.repetition_count).then(|| {
                debug!(repetitions, "game over by repetition");
                GameResult::Draw(DrawReason::ThreefoldRepetition)
            })
        });
    }
}

fn parse_uci(uci: &str) -> Option<(Square, Square, Option<Piece>)> {
    let from = Square::from_algebraic(uci.get(0..2)?)?;
    let to = Square::from_algebraic(uci.get(2..4)?)?;
    let promotion = match uci.get(4..) {
        Some("") => None,
        Some(p) if p.len() == 1 => {
            let piece = p.chars().next()?.to_ascii_uppercase();
            Some(Piece::from_letter(piece).filter(|p| p.is_promotion_target())?)
        }
        _ => return None,
    };
    Some((from, to, promotion))
}

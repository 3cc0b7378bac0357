//! Bitboard chess rules engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets with bit utilities
//! - [`Position`] - board state with an undo stack for exact unmove
//! - Attack, check and pin detection
//! - Data-driven pseudo-legal generation and the legal move filter
//! - [`apply_turn`] / [`undo_last_move`] - validated turns
//! - [`RuleSet`] - game-over and draw detection
//! - [`Game`] - repetition tracking and a SAN move log
//!
//! # Architecture
//!
//! Each (color, piece) pair has a 64-bit board where each bit is a square.
//! Generation runs position → attacks → pseudo-legal moves → legal filter.
//! Applying a move pushes an undo record; undoing pops it and restores the
//! castling rights, en-passant target and clocks that the boards alone
//! cannot recover.
//!
//! # Example
//!
//! ```
//! use bitchess_engine::{apply_turn, legal_moves, Game, Position};
//!
//! let mut position = Position::startpos();
//! let moves = legal_moves(&mut position);
//! assert_eq!(moves.len(), 20);
//! apply_turn(&mut position, moves[0]).unwrap();
//!
//! let mut game = Game::new();
//! game.make_move_san("e4").unwrap();
//! game.make_move_san("e5").unwrap();
//! println!("Position after 1.e4 e5: {}", game.to_fen());
//! ```

mod bitboard;
mod game;
pub mod movegen;
mod position;
pub mod rules;
pub mod san;
mod turn;
mod zobrist;

pub use bitboard::{Bitboard, BitboardIter};
pub use game::{Game, GameError, GameMove};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    attackers_to_square, has_legal_move, is_in_check, is_square_attacked, legal_moves, pinned,
    pseudo_legal_moves, MoveList,
};
pub use position::{Position, Snapshot, Undo};
pub use rules::{DrawReason, DrawRules, GameResult, RuleSet, StandardChess};
pub use san::{move_to_san, san_to_move, SanError};
pub use turn::{apply_turn, undo_last_move, TurnError};

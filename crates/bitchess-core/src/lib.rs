//! Value types shared by the bitchess crates.
//!
//! - [`Color`], [`Piece`] and the board coordinates [`Square`], [`File`], [`Rank`]
//! - [`Move`] with its notation and [`MoveFlag`]
//! - [`CastlingRights`] and the fixed castling geometry in [`CastleSide`]
//! - FEN field parsing via [`FenFields`]

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::{CastleSide, CastlingRights};
pub use color::Color;
pub use fen::{castling_field, FenError, FenFields};
pub use mov::{Move, MoveError, MoveFlag};
pub use piece::Piece;
pub use square::{File, Rank, Square};

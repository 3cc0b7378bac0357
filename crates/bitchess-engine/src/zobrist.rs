//! Zobrist keys for position hashing.
//!
//! A position's key XORs one random value per occupied (color, piece,
//! square), one for Black to move, one per castling right held, and one for
//! the file of the en-passant target. History and clocks never contribute.

use bitchess_core::{Color, Piece, Square};

use crate::Position;

/// The random values mixed into a position key.
pub struct ZobristKeys {
    /// `[color][piece][square]`.
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One per right bit, in `CastlingRights` bit order.
    castling: [u64; 4],
    en_passant_file: [u64; 8],
}

/// Fills the key table from a fixed xorshift stream so keys are stable
/// across runs and builds.
const fn generate_keys() -> ZobristKeys {
    const fn next(mut x: u64) -> u64 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    }

    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let mut pieces = [[[0u64; 64]; 6]; 2];
    let mut castling = [0u64; 4];
    let mut en_passant_file = [0u64; 8];

    let mut color = 0;
    while color < 2 {
        let mut piece = 0;
        while piece < 6 {
            let mut sq = 0;
            while sq < 64 {
                state = next(state);
                pieces[color][piece][sq] = state;
                sq += 1;
            }
            piece += 1;
        }
        color += 1;
    }

    state = next(state);
    let black_to_move = state;

    let mut i = 0;
    while i < 4 {
        state = next(state);
        castling[i] = state;
        i += 1;
    }

    let mut i = 0;
    while i < 8 {
        state = next(state);
        en_passant_file[i] = state;
        i += 1;
    }

    ZobristKeys {
        pieces,
        black_to_move,
        castling,
        en_passant_file,
    }
}

pub static ZOBRIST: ZobristKeys = generate_keys();

impl ZobristKeys {
    #[inline]
    pub const fn piece_key(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.index() as usize]
    }

    /// Computes the key of `position` from scratch.
    pub fn hash(&self, position: &Position) -> u64 {
        let mut key = 0u64;
        for color in Color::ALL {
            for piece in Piece::ALL {
                for sq in position.pieces(color, piece) {
                    key ^= self.piece_key(color, piece, sq);
                }
            }
        }
        if position.side_to_move == Color::Black {
            key ^= self.black_to_move;
        }
        let rights = position.castling.raw();
        for (bit, value) in self.castling.iter().enumerate() {
            if rights & (1 << bit) != 0 {
                key ^= value;
            }
        }
        if let Some(ep) = position.en_passant {
            key ^= self.en_passant_file[ep.file_index() as usize];
        }
        key
    }
}

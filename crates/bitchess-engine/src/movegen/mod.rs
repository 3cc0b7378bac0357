//! Move generation.
//!
//! Pseudo-legal generation lives here: one pawn generator, one generic
//! generator driven by each piece's [`Motion`](attacks::Motion), and the
//! castling generator. [`legal_moves`] filters the result down to the legal
//! set.

mod attacks;
mod legal;
pub mod perft;

use bitchess_core::{CastleSide, Color, Move, MoveFlag, Piece, Square};

use crate::{Bitboard, Position};

pub use attacks::{
    attackers_to_square, bishop_attacks, is_along_ray, is_in_check, is_square_attacked,
    king_attacks, knight_attacks, motion, pawn_attacks, piece_attacks, pinned, queen_attacks,
    ray_direction, rook_attacks, slider, squares_between, stepper, Motion, BISHOP_RAYS,
    KING_STEPS, KNIGHT_STEPS, ROOK_RAYS,
};
pub(crate) use legal::Speculation;
pub use legal::{has_legal_move, legal_moves};

/// A list of moves with a fixed maximum capacity.
///
/// No position has more than 218 legal moves, so a fixed-size array avoids
/// heap allocation during generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Membership by move identity; annotations are ignored.
    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// The listed move equal to `m`, carrying this list's annotations.
    pub fn find(&self, m: &Move) -> Option<Move> {
        self.iter().find(|candidate| *candidate == m).copied()
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Every geometrically valid move for `color`, ignoring whether it leaves
/// that side's king attacked. Capture flags are set; check flags are not.
pub fn pseudo_legal_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    generate_pawn_moves(position, color, &mut moves);
    for piece in [
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ] {
        generate_piece_moves(position, color, piece, &mut moves);
    }
    generate_castling_moves(position, color, &mut moves);
    moves
}

/// Pushes, double pushes, captures, promotions and en passant.
pub fn generate_pawn_moves(position: &Position, color: Color, moves: &mut MoveList) {
    let occupied = position.occupied_all();
    let theirs = position.occupied_by(color.opposite());
    let forward = color.pawn_direction();

    for from in position.pieces(color, Piece::Pawn) {
        if let Some(one) = from.offset(0, forward).filter(|sq| !occupied.contains(*sq)) {
            push_pawn_move(color, from, one, false, moves);
            if from.rank_index() == color.pawn_rank() as i8 {
                if let Some(two) = one.offset(0, forward).filter(|sq| !occupied.contains(*sq)) {
                    moves.push(Move::with_flag(
                        color,
                        Piece::Pawn,
                        from,
                        two,
                        MoveFlag::DoublePush,
                    ));
                }
            }
        }

        for to in pawn_attacks(from, color) & theirs {
            push_pawn_move(color, from, to, true, moves);
        }

        if let Some(target) = position.en_passant {
            let enemy_pawns = position.pieces(color.opposite(), Piece::Pawn);
            let victim_present = target
                .offset(0, -forward)
                .is_some_and(|victim| enemy_pawns.contains(victim));
            if from.rank_index() == color.en_passant_rank() as i8
                && pawn_attacks(from, color).contains(target)
                && victim_present
            {
                moves.push(Move::en_passant(color, from, target));
            }
        }
    }
}

fn push_pawn_move(
    color: Color,
    from: Square,
    to: Square,
    capture: bool,
    moves: &mut MoveList,
) {
    if to.rank_index() == color.promotion_rank() as i8 {
        for piece in Piece::PROMOTIONS {
            if let Ok(m) = Move::promotion(color, from, to, piece) {
                moves.push(m.with_capture(capture));
            }
        }
    } else {
        moves.push(Move::new(color, Piece::Pawn, from, to).with_capture(capture));
    }
}

/// Stepper and slider moves for one non-pawn piece type.
pub fn generate_piece_moves(position: &Position, color: Color, piece: Piece, moves: &mut MoveList) {
    let own = position.occupied_by(color);
    let theirs = position.occupied_by(color.opposite());
    let occupied = own | theirs;

    for from in position.pieces(color, piece) {
        for to in piece_attacks(piece, color, from, occupied) & !own {
            moves.push(Move::new(color, piece, from, to).with_capture(theirs.contains(to)));
        }
    }
}

/// Castles whose right is held, whose rook is home, whose between squares
/// are empty, and whose king path (start, transit, destination) is not
/// attacked. An attacked start square means the king is in check, so no
/// castle is produced out of check.
pub fn generate_castling_moves(position: &Position, color: Color, moves: &mut MoveList) {
    let occupied = position.occupied_all();
    let them = color.opposite();

    for side in CastleSide::ALL {
        if !position.castling.has(color, side)
            || !position.pieces(color, Piece::King).contains(side.king_from(color))
            || !position.pieces(color, Piece::Rook).contains(side.rook_from(color))
        {
            continue;
        }
        if (occupied & Bitboard(side.between_mask(color))).is_not_empty() {
            continue;
        }
        if side
            .king_path(color)
            .iter()
            .any(|&sq| is_square_attacked(position, sq, them))
        {
            continue;
        }
        moves.push(Move::castle(color, side));
    }
}

//! Castling rights and the fixed castling geometry.

use crate::{Color, Square};

/// Which wing a king castles towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    /// O-O, king to the g-file.
    Kingside,
    /// O-O-O, king to the c-file.
    Queenside,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    /// The right bit guarding this castle for `color`.
    #[inline]
    pub const fn right(self, color: Color) -> u8 {
        match (color, self) {
            (Color::White, CastleSide::Kingside) => CastlingRights::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queenside) => CastlingRights::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::Kingside) => CastlingRights::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queenside) => CastlingRights::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn king_from(self, color: Color) -> Square {
        match color {
            Color::White => Square::E1,
            Color::Black => Square::E8,
        }
    }

    #[inline]
    pub const fn king_to(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::Kingside) => Square::G1,
            (Color::White, CastleSide::Queenside) => Square::C1,
            (Color::Black, CastleSide::Kingside) => Square::G8,
            (Color::Black, CastleSide::Queenside) => Square::C8,
        }
    }

    #[inline]
    pub const fn rook_from(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::Kingside) => Square::H1,
            (Color::White, CastleSide::Queenside) => Square::A1,
            (Color::Black, CastleSide::Kingside) => Square::H8,
            (Color::Black, CastleSide::Queenside) => Square::A8,
        }
    }

    #[inline]
    pub const fn rook_to(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::Kingside) => Square::F1,
            (Color::White, CastleSide::Queenside) => Square::D1,
            (Color::Black, CastleSide::Kingside) => Square::F8,
            (Color::Black, CastleSide::Queenside) => Square::D8,
        }
    }

    /// Squares strictly between king and rook; all must be empty.
    pub const fn between_mask(self, color: Color) -> u64 {
        let rank_shift = color.back_rank() as u32 * 8;
        let first_rank: u64 = match self {
            CastleSide::Kingside => 0b0110_0000,
            CastleSide::Queenside => 0b0000_1110,
        };
        first_rank << rank_shift
    }

    /// Squares the king stands on, crosses, or lands on; none may be attacked.
    pub const fn king_path(self, color: Color) -> [Square; 3] {
        let from = self.king_from(color);
        let to = self.king_to(color);
        let transit = self.rook_to(color);
        [from, transit, to]
    }

    /// Castle side implied by a king's destination square, if it is one.
    pub const fn from_king_destination(color: Color, to: Square) -> Option<CastleSide> {
        if to.index() == CastleSide::Kingside.king_to(color).index() {
            Some(CastleSide::Kingside)
        } else if to.index() == CastleSide::Queenside.king_to(color).index() {
            Some(CastleSide::Queenside)
        } else {
            None
        }
    }
}

/// Four castling-right bits. Bits only ever clear during a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    /// Rights from raw bits; bits above the low four are dropped.
    #[inline]
    pub const fn new(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & side.right(color) != 0
    }

    #[inline]
    pub fn remove(&mut self, color: Color, side: CastleSide) {
        self.0 &= !side.right(color);
    }

    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        for side in CastleSide::ALL {
            self.remove(color, side);
        }
    }

    /// Clears the right tied to a rook home square. Used both when a rook
    /// leaves its corner and when something captures on it.
    pub fn remove_for_rook_square(&mut self, sq: Square) {
        for color in Color::ALL {
            for side in CastleSide::ALL {
                if side.rook_from(color) == sq {
                    self.remove(color, side);
                }
            }
        }
    }
}

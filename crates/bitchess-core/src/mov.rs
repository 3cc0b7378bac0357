//! Move representation and notation.

use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::{CastleSide, Color, Piece, Square};

/// A move that cannot exist on any board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("cannot promote to {0}")]
    InvalidPromotion(Piece),

    #[error("square index {0} is outside 0..=63")]
    SquareOutOfRange(u8),
}

/// How a move is carried out on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Plain step, slide or capture.
    Normal = 0,
    /// Pawn double push from its starting rank.
    DoublePush = 1,
    /// O-O.
    CastleKingside = 2,
    /// O-O-O.
    CastleQueenside = 3,
    /// Pawn capture onto the en-passant target.
    EnPassant = 4,
    PromoteKnight = 5,
    PromoteBishop = 6,
    PromoteRook = 7,
    PromoteQueen = 8,
}

impl MoveFlag {
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self {
            MoveFlag::PromoteKnight => Some(Piece::Knight),
            MoveFlag::PromoteBishop => Some(Piece::Bishop),
            MoveFlag::PromoteRook => Some(Piece::Rook),
            MoveFlag::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Flag promoting to `piece`, or an error for pawns and kings.
    pub const fn promote_to(piece: Piece) -> Result<MoveFlag, MoveError> {
        match piece {
            Piece::Knight => Ok(MoveFlag::PromoteKnight),
            Piece::Bishop => Ok(MoveFlag::PromoteBishop),
            Piece::Rook => Ok(MoveFlag::PromoteRook),
            Piece::Queen => Ok(MoveFlag::PromoteQueen),
            Piece::Pawn | Piece::King => Err(MoveError::InvalidPromotion(piece)),
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion_piece().is_some()
    }

    #[inline]
    pub const fn castle_side(self) -> Option<CastleSide> {
        match self {
            MoveFlag::CastleKingside => Some(CastleSide::Kingside),
            MoveFlag::CastleQueenside => Some(CastleSide::Queenside),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        self.castle_side().is_some()
    }
}

/// A move value.
///
/// Identity is the mover's color, piece, origin, destination and promotion
/// piece. The capture and check flags are annotations computed against a
/// position and take no part in equality or hashing; the remaining flag bits
/// (double push, castle, en passant) follow from the identity.
#[derive(Clone, Copy)]
pub struct Move {
    color: Color,
    piece: Piece,
    from: Square,
    to: Square,
    flag: MoveFlag,
    capture: bool,
    check: bool,
}

impl Move {
    /// Placeholder filling unused move list slots; never legal.
    pub const NULL: Move = Move {
        color: Color::White,
        piece: Piece::Pawn,
        from: Square::A1,
        to: Square::A1,
        flag: MoveFlag::Normal,
        capture: false,
        check: false,
    };

    /// A plain move of `piece` from `from` to `to`.
    #[inline]
    pub const fn new(color: Color, piece: Piece, from: Square, to: Square) -> Self {
        Self::with_flag(color, piece, from, to, MoveFlag::Normal)
    }

    /// A move with an explicit flag. The flag must agree with the piece; for
    /// caller-built promotions prefer [`Move::promotion`].
    #[inline]
    pub const fn with_flag(
        color: Color,
        piece: Piece,
        from: Square,
        to: Square,
        flag: MoveFlag,
    ) -> Self {
        Move {
            color,
            piece,
            from,
            to,
            flag,
            capture: false,
            check: false,
        }
    }

    /// A plain move built from raw square indices.
    pub const fn try_new(color: Color, piece: Piece, from: u8, to: u8) -> Result<Self, MoveError> {
        let from = match Square::try_from_index(from) {
            Ok(sq) => sq,
            Err(e) => return Err(e),
        };
        let to = match Square::try_from_index(to) {
            Ok(sq) => sq,
            Err(e) => return Err(e),
        };
        Ok(Self::new(color, piece, from, to))
    }

    /// A pawn promotion. Pawns and kings are rejected.
    pub const fn promotion(
        color: Color,
        from: Square,
        to: Square,
        promote_to: Piece,
    ) -> Result<Self, MoveError> {
        match MoveFlag::promote_to(promote_to) {
            Ok(flag) => Ok(Self::with_flag(color, Piece::Pawn, from, to, flag)),
            Err(e) => Err(e),
        }
    }

    /// The king move of a castle.
    pub const fn castle(color: Color, side: CastleSide) -> Self {
        let flag = match side {
            CastleSide::Kingside => MoveFlag::CastleKingside,
            CastleSide::Queenside => MoveFlag::CastleQueenside,
        };
        Self::with_flag(color, Piece::King, side.king_from(color), side.king_to(color), flag)
    }

    /// A pawn capturing en passant onto `to`.
    pub const fn en_passant(color: Color, from: Square, to: Square) -> Self {
        Self::with_flag(color, Piece::Pawn, from, to, MoveFlag::EnPassant).with_capture(true)
    }

    #[inline]
    pub const fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    #[inline]
    pub const fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    #[inline]
    pub const fn color(self) -> Color {
        self.color
    }

    #[inline]
    pub const fn piece(self) -> Piece {
        self.piece
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        self.flag
    }

    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        self.flag.promotion_piece()
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.capture
    }

    #[inline]
    pub const fn is_check(self) -> bool {
        self.check
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.flag.is_castling()
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.flag, MoveFlag::EnPassant)
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        matches!(self.flag, MoveFlag::DoublePush)
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(self) -> String {
        match self.promotion_piece() {
            Some(piece) => format!(
                "{}{}{}",
                self.from,
                self.to,
                piece.letter().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Context-free algebraic notation: piece letter (none for pawns), origin
    /// file for pawn captures, `x` on capture, destination, `=<PIECE>` on
    /// promotion, `+` on check; castles render as `O-O` / `O-O-O`.
    pub fn notation(self) -> String {
        self.to_string()
    }

    fn identity(&self) -> (Color, Piece, Square, Square, Option<Piece>) {
        (self.color, self.piece, self.from, self.to, self.promotion_piece())
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flag.castle_side() {
            Some(CastleSide::Kingside) => f.write_str("O-O")?,
            Some(CastleSide::Queenside) => f.write_str("O-O-O")?,
            None => {
                if self.piece != Piece::Pawn {
                    write!(f, "{}", self.piece.letter())?;
                }
                if self.capture {
                    if self.piece == Piece::Pawn {
                        write!(f, "{}", self.from.file())?;
                    }
                    f.write_str("x")?;
                }
                write!(f, "{}", self.to)?;
                if let Some(piece) = self.promotion_piece() {
                    write!(f, "={}", piece.letter())?;
                }
            }
        }
        if self.check {
            f.write_str("+")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {})", self.to_uci(), self)
    }
}

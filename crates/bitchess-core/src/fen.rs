//! FEN (Forsyth-Edwards Notation) field splitting and validation.
//!
//! Only the text level is handled here. Turning the fields into board masks
//! is the engine's job.

use thiserror::Error;

use crate::{CastlingRights, Color, Piece, Square};

/// Errors from parsing a FEN string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The six FEN fields, validated and decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Pieces as `(square, piece, color)`, in placement order (a8 first).
    pub placement: Vec<(Square, Piece, Color)>,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl FenFields {
    /// The standard initial position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        let [placement, active, castling, en_passant, halfmove, fullmove] = parts[..] else {
            return Err(FenError::InvalidPartCount(parts.len()));
        };

        Ok(FenFields {
            placement: parse_placement(placement)?,
            side_to_move: parse_active_color(active)?,
            castling: parse_castling(castling)?,
            en_passant: parse_en_passant(en_passant)?,
            halfmove_clock: halfmove
                .parse()
                .map_err(|_| FenError::InvalidHalfmoveClock(halfmove.to_string()))?,
            fullmove_number: fullmove
                .parse()
                .map_err(|_| FenError::InvalidFullmoveNumber(fullmove.to_string()))?,
        })
    }
}

fn parse_placement(field: &str) -> Result<Vec<(Square, Piece, Color)>, FenError> {
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            rows.len()
        )));
    }

    let mut pieces = Vec::with_capacity(32);
    for (row, text) in rows.iter().enumerate() {
        let rank = 7 - row as i8;
        let mut file = 0i8;
        for c in text.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as i8;
                if file > 8 {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "rank {} overflows",
                        rank + 1
                    )));
                }
            } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                let sq = Square::from_coords(file, rank).ok_or_else(|| {
                    FenError::InvalidPiecePlacement(format!("rank {} overflows", rank + 1))
                })?;
                pieces.push((sq, piece, color));
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    rank + 1
                )));
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                rank + 1,
                file
            )));
        }
    }
    Ok(pieces)
}

fn parse_active_color(field: &str) -> Result<Color, FenError> {
    match field {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        other => Err(FenError::InvalidActiveColor(other.to_string())),
    }
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut bits = 0u8;
    for c in field.chars() {
        bits |= match c {
            'K' => CastlingRights::WHITE_KINGSIDE,
            'Q' => CastlingRights::WHITE_QUEENSIDE,
            'k' => CastlingRights::BLACK_KINGSIDE,
            'q' => CastlingRights::BLACK_QUEENSIDE,
            _ => {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{}' in '{}'",
                    c, field
                )))
            }
        };
    }
    Ok(CastlingRights::new(bits))
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    match Square::from_algebraic(field) {
        Some(sq) if sq.rank_index() == 2 || sq.rank_index() == 5 => Ok(Some(sq)),
        _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
    }
}

/// Renders castling rights as the FEN field (`KQkq`, `-`, ...).
pub fn castling_field(rights: CastlingRights) -> String {
    if rights == CastlingRights::NONE {
        return "-".to_string();
    }
    [
        (CastlingRights::WHITE_KINGSIDE, 'K'),
        (CastlingRights::WHITE_QUEENSIDE, 'Q'),
        (CastlingRights::BLACK_KINGSIDE, 'k'),
        (CastlingRights::BLACK_QUEENSIDE, 'q'),
    ]
    .iter()
    .filter(|(bit, _)| rights.raw() & bit != 0)
    .map(|&(_, c)| c)
    .collect()
}

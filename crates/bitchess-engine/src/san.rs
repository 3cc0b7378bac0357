//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN extends the context-free notation of [`Move`] with origin
//! disambiguation and a `#` suffix on mate, both of which need the position.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "Qh5#"

use bitchess_core::{CastleSide, File, Move, Piece, Rank, Square};
use thiserror::Error;

use crate::movegen::{has_legal_move, legal_moves, MoveList, Speculation};
use crate::Position;

/// Error type for SAN parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,
    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),
    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),
    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
}

/// Renders `m` in SAN for the position before the move.
///
/// Capture and check flags are taken from the generated move, so a bare
/// caller-built move renders correctly. A move that is not legal here falls
/// back to its context-free notation and the position is not touched.
pub fn move_to_san(position: &mut Position, m: Move) -> String {
    let legal = legal_moves(position);
    let Some(m) = legal.find(&m) else {
        return m.notation();
    };

    let mut san = match m.flag().castle_side() {
        Some(CastleSide::Kingside) => "O-O".to_string(),
        Some(CastleSide::Queenside) => "O-O-O".to_string(),
        None => {
            let mut san = String::new();
            if m.piece() != Piece::Pawn {
                san.push(m.piece().letter());
                san.push_str(&disambiguation(&legal, m));
            }
            if m.is_capture() {
                if m.piece() == Piece::Pawn {
                    san.push(m.from().file().to_char());
                }
                san.push('x');
            }
            san.push_str(&m.to().to_algebraic());
            if let Some(piece) = m.promotion_piece() {
                san.push('=');
                san.push(piece.letter());
            }
            san
        }
    };

    if m.is_check() {
        let mut after = Speculation::new(position, m);
        san.push(if has_legal_move(&mut after) { '+' } else { '#' });
    }
    san
}

/// Parses SAN into the matching legal move.
///
/// Check, mate and annotation suffixes are ignored. Castling accepts both
/// letter `O` and digit `0` forms.
pub fn san_to_move(position: &mut Position, san: &str) -> Result<Move, SanError> {
    let san = san.trim();
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    let body = san.trim_end_matches(['+', '#', '!', '?']);
    let legal = legal_moves(position);

    let castle = match body {
        "O-O" | "0-0" => Some(CastleSide::Kingside),
        "O-O-O" | "0-0-0" => Some(CastleSide::Queenside),
        _ => None,
    };
    if let Some(side) = castle {
        return legal
            .iter()
            .find(|m| m.flag().castle_side() == Some(side))
            .copied()
            .ok_or_else(|| SanError::NoMatchingMove(san.to_string()));
    }

    let parsed = parse_san_components(body)?;
    let mut matching = legal.iter().filter(|m| parsed.matches(m));
    match (matching.next(), matching.next()) {
        (Some(&m), None) => Ok(m),
        (None, _) => Err(SanError::NoMatchingMove(san.to_string())),
        (Some(_), Some(_)) => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
    capture: bool,
}

impl ParsedSan {
    fn matches(&self, m: &Move) -> bool {
        m.piece() == self.piece
            && m.to() == self.to
            && m.promotion_piece() == self.promotion
            && self.from_file.map_or(true, |f| m.from().file() == f)
            && self.from_rank.map_or(true, |r| m.from().rank() == r)
            && (!self.capture || m.is_capture())
    }
}

fn parse_san_components(san: &str) -> Result<ParsedSan, SanError> {
    let invalid = || SanError::InvalidFormat(san.to_string());

    let (piece, rest) = match san.chars().next() {
        Some(c) if c.is_ascii_uppercase() => {
            let piece = Piece::from_letter(c).ok_or_else(invalid)?;
            (piece, &san[1..])
        }
        Some(_) => (Piece::Pawn, san),
        None => return Err(SanError::Empty),
    };

    let (rest, promotion) = match rest.split_once('=') {
        Some((head, promo)) => {
            let mut chars = promo.chars();
            let piece = match (chars.next(), chars.next()) {
                (Some(c), None) => Piece::from_letter(c)
                    .filter(|p| p.is_promotion_target())
                    .ok_or_else(invalid)?,
                _ => return Err(invalid()),
            };
            (head, Some(piece))
        }
        None => (rest, None),
    };

    let capture = rest.contains('x');
    let squares: Vec<char> = rest.chars().filter(|&c| c != 'x').collect();
    if squares.len() < 2 || squares.len() > 4 {
        return Err(invalid());
    }

    let (prefix, dest) = squares.split_at(squares.len() - 2);
    let to = match (File::from_char(dest[0]), Rank::from_char(dest[1])) {
        (Some(file), Some(rank)) => Square::new(file, rank),
        _ => return Err(invalid()),
    };

    let (from_file, from_rank) = match prefix {
        [] => (None, None),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => (Some(file), None),
            (None, Some(rank)) => (None, Some(rank)),
            (None, None) => return Err(invalid()),
        },
        [f, r] => match (File::from_char(*f), Rank::from_char(*r)) {
            (Some(file), Some(rank)) => (Some(file), Some(rank)),
            _ => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };

    Ok(ParsedSan {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
        capture,
    })
}

/// Origin qualifier for a piece move: nothing, file, rank, or both, in the
/// order SAN prefers them.
fn disambiguation(legal: &MoveList, m: Move) -> String {
    let from = m.from();
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|o| o.piece() == m.piece() && o.to() == m.to() && o.from() != from)
        .map(|o| o.from())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != from.file()) {
        from.file().to_char().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
        from.rank().to_char().to_string()
    } else {
        from.to_algebraic()
    }
}

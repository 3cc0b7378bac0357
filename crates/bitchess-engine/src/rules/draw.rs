//! Draw conditions that can be read off a single position.

use bitchess_core::{Color, Piece};
use serde::{Deserialize, Serialize};

use crate::{Bitboard, Position};

const LIGHT_SQUARES: Bitboard = Bitboard(0x55AA_55AA_55AA_55AA);

/// Tunable draw policy.
///
/// Missing fields take their defaults when deserialized, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DrawRules {
    /// Halfmove clock value that ends the game. Counts plies, so the default
    /// of 100 is fifty moves by each side.
    pub fifty_move_plies: u32,
    /// Occurrences of one position that end the game.
    pub repetition_count: usize,
    /// Treat two knights of one side against a bare king as a draw.
    pub knight_pair_is_draw: bool,
    /// Check for insufficient material after every turn.
    pub detect_insufficient_material: bool,
}

impl Default for DrawRules {
    fn default() -> Self {
        DrawRules {
            fifty_move_plies: 100,
            repetition_count: 3,
            knight_pair_is_draw: false,
            detect_insufficient_material: true,
        }
    }
}

/// True once the halfmove clock has reached the configured limit.
pub fn is_fifty_move_draw(position: &Position, rules: &DrawRules) -> bool {
    position.halfmove_clock >= rules.fifty_move_plies
}

/// True if neither side can force mate with what is left on the board.
///
/// Any pawn, rook or queen keeps the game alive. With minor pieces only, the
/// game is drawn with at most one minor, with one knight each, with a bishop
/// against a knight, or when every bishop stands on the same square color
/// and there are no knights. A lone pair of knights against a bare king is a
/// draw only when [`DrawRules::knight_pair_is_draw`] is set.
pub fn is_insufficient_material(position: &Position, rules: &DrawRules) -> bool {
    let heavy = Color::ALL.iter().any(|&color| {
        [Piece::Pawn, Piece::Rook, Piece::Queen]
            .iter()
            .any(|&piece| position.pieces(color, piece).is_not_empty())
    });
    if heavy {
        return false;
    }

    let knights = |color: Color| position.pieces(color, Piece::Knight).count();
    let bishops = |color: Color| position.pieces(color, Piece::Bishop);
    let (white_knights, black_knights) = (knights(Color::White), knights(Color::Black));
    let all_bishops = bishops(Color::White) | bishops(Color::Black);
    let total_knights = white_knights + black_knights;
    let minors = total_knights + all_bishops.count();

    if minors <= 1 {
        return true;
    }

    if total_knights == 0 {
        let light = (all_bishops & LIGHT_SQUARES).is_not_empty();
        let dark = (all_bishops & !LIGHT_SQUARES).is_not_empty();
        return !(light && dark);
    }

    if minors == 2 {
        if total_knights == 2 {
            return white_knights == 1 || rules.knight_pair_is_draw;
        }
        // one knight, one bishop
        let white_minors = white_knights + bishops(Color::White).count();
        return white_minors == 1;
    }

    false
}

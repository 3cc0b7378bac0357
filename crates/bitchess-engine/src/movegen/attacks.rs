//! Piece geometry and attack queries.
//!
//! Every piece but the pawn is described by data: a step table for knights
//! and kings, a ray set for bishops, rooks and queens. Two generic walkers
//! (the stepper and the slider) turn that data into destination masks, and
//! the same masks answer "who attacks this square" in reverse.

use bitchess_core::{Color, Piece, Square};

use crate::{Bitboard, Position};

/// Knight jumps as (file delta, rank delta).
pub const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// The eight neighbouring squares. Doubles as the queen's ray set.
pub const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Pawn capture steps, indexed by color.
const PAWN_CAPTURE_STEPS: [[(i8, i8); 2]; 2] = [[(-1, 1), (1, 1)], [(-1, -1), (1, -1)]];

const KNIGHT_ATTACKS: [Bitboard; 64] = step_table(&KNIGHT_STEPS);
const KING_ATTACKS: [Bitboard; 64] = step_table(&KING_STEPS);
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    step_table(&PAWN_CAPTURE_STEPS[0]),
    step_table(&PAWN_CAPTURE_STEPS[1]),
];

/// How a non-pawn piece moves.
#[derive(Debug, Clone, Copy)]
pub enum Motion {
    /// One step to each square of a precomputed table.
    Step(&'static [Bitboard; 64]),
    /// Repeated steps along each ray until something blocks.
    Slide(&'static [(i8, i8)]),
}

/// Movement data for `piece`; pawns have none since pushes and captures
/// differ.
pub const fn motion(piece: Piece) -> Option<Motion> {
    match piece {
        Piece::Pawn => None,
        Piece::Knight => Some(Motion::Step(&KNIGHT_ATTACKS)),
        Piece::Bishop => Some(Motion::Slide(&BISHOP_RAYS)),
        Piece::Rook => Some(Motion::Slide(&ROOK_RAYS)),
        Piece::Queen => Some(Motion::Slide(&KING_STEPS)),
        Piece::King => Some(Motion::Step(&KING_ATTACKS)),
    }
}

/// Builds a per-square mask of single steps. Steps that leave the board are
/// dropped by `Square::from_coords`, so nothing wraps across an edge.
const fn step_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut index = 0;
    while index < 64 {
        let file = (index % 8) as i8;
        let rank = (index / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            let (df, dr) = steps[i];
            if let Some(to) = Square::from_coords(file + df, rank + dr) {
                bits |= to.bitboard();
            }
            i += 1;
        }
        table[index] = Bitboard(bits);
        index += 1;
    }
    table
}

/// Stepper: the table entry for `from`.
#[inline]
pub fn stepper(table: &[Bitboard; 64], from: Square) -> Bitboard {
    table[from.index() as usize]
}

/// Slider: walks each ray from `from`, including the first occupied square
/// and stopping there.
pub fn slider(rays: &[(i8, i8)], from: Square, occupied: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in rays {
        let mut cursor = from;
        while let Some(next) = cursor.offset(df, dr) {
            attacks.set(next);
            if occupied.contains(next) {
                break;
            }
            cursor = next;
        }
    }
    attacks
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    stepper(&KNIGHT_ATTACKS, sq)
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    stepper(&KING_ATTACKS, sq)
}

/// Squares a `color` pawn on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider(&BISHOP_RAYS, sq, occupied)
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider(&ROOK_RAYS, sq, occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider(&KING_STEPS, sq, occupied)
}

/// Squares a `color` `piece` on `from` attacks given the board occupancy.
pub fn piece_attacks(piece: Piece, color: Color, from: Square, occupied: Bitboard) -> Bitboard {
    match motion(piece) {
        None => pawn_attacks(from, color),
        Some(Motion::Step(table)) => stepper(table, from),
        Some(Motion::Slide(rays)) => slider(rays, from, occupied),
    }
}

/// Squares from which a `by` piece of type `piece` would attack `sq`.
/// Attack geometry is symmetric except for pawns, which look backwards.
fn reverse_attacks(piece: Piece, by: Color, sq: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Pawn => pawn_attacks(sq, by.opposite()),
        _ => piece_attacks(piece, by, sq, occupied),
    }
}

/// Origin squares of every `by` piece attacking `sq`.
pub fn attackers_to_square(position: &Position, sq: Square, by: Color) -> Bitboard {
    let occupied = position.occupied_all();
    Piece::ALL.into_iter().fold(Bitboard::EMPTY, |acc, piece| {
        acc | (reverse_attacks(piece, by, sq, occupied) & position.pieces(by, piece))
    })
}

/// True if any `by` piece attacks `sq`, whoever is to move.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let occupied = position.occupied_all();
    Piece::ALL.into_iter().any(|piece| {
        (reverse_attacks(piece, by, sq, occupied) & position.pieces(by, piece)).is_not_empty()
    })
}

/// True if `color`'s king is attacked. A side without a king is never in
/// check.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    position
        .king_square(color)
        .is_some_and(|king| is_square_attacked(position, king, color.opposite()))
}

/// Unit step from `from` towards `to` when both share a rank, file or
/// diagonal.
pub fn ray_direction(from: Square, to: Square) -> Option<(i8, i8)> {
    let df = to.file_index() - from.file_index();
    let dr = to.rank_index() - from.rank_index();
    if (df, dr) == (0, 0) {
        return None;
    }
    if df == 0 || dr == 0 || df.abs() == dr.abs() {
        Some((df.signum(), dr.signum()))
    } else {
        None
    }
}

/// Squares strictly between `a` and `b`; empty unless they are aligned.
pub fn squares_between(a: Square, b: Square) -> Bitboard {
    let Some((df, dr)) = ray_direction(a, b) else {
        return Bitboard::EMPTY;
    };
    let mut between = Bitboard::EMPTY;
    let mut cursor = a;
    while let Some(next) = cursor.offset(df, dr) {
        if next == b {
            break;
        }
        between.set(next);
        cursor = next;
    }
    between
}

/// True if `target` lies on the line through `origin` and `through`.
pub fn is_along_ray(origin: Square, through: Square, target: Square) -> bool {
    let (ax, ay) = (
        through.file_index() - origin.file_index(),
        through.rank_index() - origin.rank_index(),
    );
    let (bx, by) = (
        target.file_index() - origin.file_index(),
        target.rank_index() - origin.rank_index(),
    );
    ax * by - ay * bx == 0
}

/// True if the piece on `piece_sq` shields the king on `king_sq` from an
/// enemy slider: walking out from the king, `piece_sq` is the first occupied
/// square and the next one holds an enemy queen, or a rook on a rank or file,
/// or a bishop on a diagonal.
pub fn pinned(position: &Position, piece_sq: Square, king_sq: Square) -> bool {
    let Some((Piece::King, us)) = position.piece_at(king_sq) else {
        return false;
    };
    if position.piece_of(piece_sq, us).is_none() {
        return false;
    }
    let Some((df, dr)) = ray_direction(king_sq, piece_sq) else {
        return false;
    };

    let occupied = position.occupied_all();
    let mut cursor = king_sq;
    let mut shield_seen = false;
    while let Some(next) = cursor.offset(df, dr) {
        cursor = next;
        if !occupied.contains(next) {
            continue;
        }
        if !shield_seen {
            if next != piece_sq {
                return false;
            }
            shield_seen = true;
            continue;
        }
        let orthogonal = df == 0 || dr == 0;
        return match position.piece_of(next, us.opposite()) {
            Some(Piece::Queen) => true,
            Some(Piece::Rook) => orthogonal,
            Some(Piece::Bishop) => !orthogonal,
            _ => false,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn squares(names: &[&str]) -> Bitboard {
        names.iter().map(|n| sq(n)).collect()
    }

    #[test]
    fn knight_steps_never_wrap() {
        assert_eq!(knight_attacks(Square::A1), squares(&["b3", "c2"]));
        assert_eq!(knight_attacks(Square::H8), squares(&["g6", "f7"]));
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
        assert_eq!(knight_attacks(Square::H1), squares(&["g3", "f2"]));
    }

    #[test]
    fn king_steps_never_wrap() {
        assert_eq!(king_attacks(Square::H1), squares(&["g1", "g2", "h2"]));
        assert_eq!(king_attacks(Square::A8), squares(&["b8", "a7", "b7"]));
    }

    #[test]
    fn pawn_attacks_by_color() {
        assert_eq!(pawn_attacks(sq("a2"), Color::White), squares(&["b3"]));
        assert_eq!(pawn_attacks(sq("e7"), Color::Black), squares(&["d6", "f6"]));
        assert_eq!(pawn_attacks(sq("h7"), Color::Black), squares(&["g6"]));
    }

    #[test]
    fn slider_stops_on_first_blocker() {
        let occupied = squares(&["d6", "f4"]);
        let attacks = rook_attacks(sq("d4"), occupied);
        assert!(attacks.contains(sq("d6")));
        assert!(!attacks.contains(sq("d7")));
        assert!(attacks.contains(sq("f4")));
        assert!(!attacks.contains(sq("g4")));
        assert!(attacks.contains(sq("a4")));
        assert!(attacks.contains(sq("d1")));
        assert_eq!(attacks.count(), 2 + 2 + 3 + 3);
    }

    #[test]
    fn bishop_rays_do_not_wrap_files() {
        let attacks = bishop_attacks(sq("h4"), Bitboard::EMPTY);
        assert_eq!(attacks, squares(&["g5", "f6", "e7", "d8", "g3", "f2", "e1"]));
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn square_attacks_ignore_side_to_move() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1").unwrap();
        assert!(is_square_attacked(&pos, sq("d3"), Color::White));
        assert!(is_square_attacked(&pos, sq("f3"), Color::White));
        assert!(!is_square_attacked(&pos, sq("e3"), Color::White));
        assert!(is_square_attacked(&pos, sq("d7"), Color::Black));
    }

    #[test]
    fn attackers_collects_every_piece_type() {
        let pos = Position::from_fen("4k3/8/2n5/1q6/4p3/5P2/2B1K3/8 w - - 0 1").unwrap();
        let attackers = attackers_to_square(&pos, sq("e4"), Color::White);
        assert_eq!(attackers, squares(&["f3", "c2"]));
        let checkers = attackers_to_square(&pos, sq("e2"), Color::Black);
        assert_eq!(checkers, squares(&["b5"]));
        assert!(is_in_check(&pos, Color::White));
        assert!(!is_in_check(&pos, Color::Black));
    }

    #[test]
    fn between_and_rays() {
        assert_eq!(squares_between(sq("a1"), sq("d4")), squares(&["b2", "c3"]));
        assert_eq!(squares_between(sq("e1"), sq("e8")).count(), 6);
        assert_eq!(squares_between(sq("e1"), sq("f3")), Bitboard::EMPTY);
        assert_eq!(squares_between(sq("e1"), sq("e2")), Bitboard::EMPTY);

        assert!(is_along_ray(sq("e1"), sq("e4"), sq("e7")));
        assert!(is_along_ray(sq("a1"), sq("c3"), sq("b2")));
        assert!(!is_along_ray(sq("a1"), sq("c3"), sq("c4")));
    }

    #[test]
    fn pin_detection() {
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(pinned(&pos, sq("e2"), Square::E1));

        let diagonal = Position::from_fen("6k1/8/b7/8/8/8/3R4/4K3 w - - 0 1").unwrap();
        assert!(!pinned(&diagonal, sq("d2"), Square::E1));
        let diagonal = Position::from_fen("6k1/8/8/8/1b6/8/3R4/4K3 w - - 0 1").unwrap();
        assert!(pinned(&diagonal, sq("d2"), Square::E1));

        let wrong_slider = Position::from_fen("4b1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(!pinned(&wrong_slider, sq("e2"), Square::E1));

        let two_shields =
            Position::from_fen("4r1k1/8/8/8/4P3/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(!pinned(&two_shields, sq("e2"), Square::E1));
        assert!(!pinned(&two_shields, sq("e4"), Square::E1));
    }
}

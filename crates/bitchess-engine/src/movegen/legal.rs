//! Legal move filter.
//!
//! The number of pieces checking the mover's king decides how far the
//! pseudo-legal set is cut: no check keeps everything except pinned pieces
//! leaving their ray, a single check keeps king moves plus captures of the
//! checker and blocks, a double check keeps king moves only. King moves and
//! en-passant captures are settled by trying them on the board.

use std::ops::{Deref, DerefMut};

use bitchess_core::{Move, Piece};

use super::attacks::{attackers_to_square, is_along_ray, is_in_check, pinned, squares_between};
use super::{pseudo_legal_moves, MoveList};
use crate::{Bitboard, Position};

/// A move applied for inspection. Dropping it undoes the move, so the
/// position is restored on every exit path.
pub(crate) struct Speculation<'a> {
    position: &'a mut Position,
}

impl<'a> Speculation<'a> {
    pub(crate) fn new(position: &'a mut Position, m: Move) -> Self {
        position.apply_move(m);
        Speculation { position }
    }
}

impl Deref for Speculation<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for Speculation<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        self.position.undo_last_move();
    }
}

fn leaves_king_safe(position: &mut Position, m: Move) -> bool {
    let after = Speculation::new(position, m);
    !is_in_check(&after, m.color())
}

fn gives_check(position: &mut Position, m: Move) -> bool {
    let after = Speculation::new(position, m);
    is_in_check(&after, m.color().opposite())
}

/// The legal moves for the side to move, without check annotation.
pub(crate) fn filter_legal(position: &mut Position) -> MoveList {
    let us = position.side_to_move;
    let candidates = pseudo_legal_moves(position, us);

    let Some(king_sq) = position.king_square(us) else {
        return candidates;
    };

    let checkers = attackers_to_square(position, king_sq, us.opposite());
    let evasion_targets = match checkers.first_square() {
        None => Some(Bitboard::FULL),
        Some(checker) if checkers.count() == 1 => {
            let slider = position
                .piece_of(checker, us.opposite())
                .is_some_and(Piece::is_slider);
            let blocks = if slider {
                squares_between(king_sq, checker)
            } else {
                Bitboard::EMPTY
            };
            Some(Bitboard::from_square(checker) | blocks)
        }
        Some(_) => None,
    };

    let mut legal = MoveList::new();
    for &m in &candidates {
        let keep = if m.piece() == Piece::King {
            m.is_castle() || leaves_king_safe(position, m)
        } else if m.is_en_passant() {
            leaves_king_safe(position, m)
        } else {
            match evasion_targets {
                Some(targets) => {
                    targets.contains(m.to())
                        && (!pinned(position, m.from(), king_sq)
                            || is_along_ray(king_sq, m.from(), m.to()))
                }
                None => false,
            }
        };
        if keep {
            legal.push(m);
        }
    }
    legal
}

/// All legal moves for the side to move, each annotated with whether it
/// gives check. Capture flags come from generation.
///
/// The position is mutated while moves are tried and restored before this
/// returns. An empty list means the game is over.
pub fn legal_moves(position: &mut Position) -> MoveList {
    let candidates = filter_legal(position);
    let mut annotated = MoveList::new();
    for &m in &candidates {
        annotated.push(m.with_check(gives_check(position, m)));
    }
    annotated
}

/// True if the side to move has at least one legal move.
pub fn has_legal_move(position: &mut Position) -> bool {
    !filter_legal(position).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitchess_core::{CastleSide, Color, Square};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn legal(fen: &str) -> (Position, MoveList) {
        let mut pos = Position::from_fen(fen).unwrap();
        let moves = legal_moves(&mut pos);
        (pos, moves)
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let (_, moves) = legal(bitchess_core::FenFields::STARTPOS);
        assert_eq!(moves.len(), 20);
        assert_eq!(moves.iter().filter(|m| m.piece() == Piece::Pawn).count(), 16);
        assert_eq!(moves.iter().filter(|m| m.piece() == Piece::Knight).count(), 4);
    }

    #[test]
    fn generation_leaves_position_untouched() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.save_snapshot();
        let moves = legal_moves(&mut pos);
        assert_eq!(moves.len(), 48);
        assert_eq!(pos.save_snapshot(), before);
        assert!(pos.history().is_empty());
    }

    #[test]
    fn pinned_piece_stays_on_its_ray() {
        let (_, moves) = legal("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        let rook_moves: Vec<Square> = moves
            .iter()
            .filter(|m| m.piece() == Piece::Rook)
            .map(|m| m.to())
            .collect();
        assert_eq!(rook_moves.len(), 6);
        assert!(rook_moves.iter().all(|to| to.file_index() == 4));
        assert!(rook_moves.contains(&sq("e8")));

        let (_, moves) = legal("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(moves.iter().all(|m| m.piece() == Piece::King));
    }

    #[test]
    fn single_slider_check_allows_capture_or_block() {
        let (_, moves) = legal("4k3/8/8/8/r6K/8/1N3B2/8 w - - 0 1");
        for m in moves.iter().filter(|m| m.piece() != Piece::King) {
            let between = squares_between(sq("h4"), sq("a4"));
            assert!(m.to() == sq("a4") || between.contains(m.to()), "{m:?}");
        }
        let non_king: Vec<Move> = moves
            .iter()
            .filter(|m| m.piece() != Piece::King)
            .copied()
            .collect();
        let knight = |to: &str| Move::new(Color::White, Piece::Knight, sq("b2"), sq(to));
        let bishop = |to: &str| Move::new(Color::White, Piece::Bishop, sq("f2"), sq(to));
        assert!(non_king.contains(&knight("a4")));
        assert!(non_king.contains(&knight("c4")));
        assert!(non_king.contains(&bishop("d4")));
        assert!(!non_king.contains(&knight("d3")));
        assert!(!non_king.contains(&bishop("e3")));
        assert!(!non_king.contains(&bishop("g3")));
        assert_eq!(non_king.len(), 3);
    }

    #[test]
    fn knight_check_cannot_be_blocked() {
        let (_, moves) = legal("4k3/8/8/8/8/3n4/8/4K2R w K - 0 1");
        for m in moves.iter() {
            assert!(m.piece() == Piece::King || m.to() == sq("d3"), "{m:?}");
        }
        assert!(!moves.iter().any(|m| m.is_castle()));
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let (_, moves) = legal("4k3/8/8/8/1b6/3n4/8/R3K3 w - - 0 1");
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.piece() == Piece::King));
    }

    #[test]
    fn king_cannot_retreat_along_checking_ray() {
        let (_, moves) = legal("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        assert!(!moves.iter().any(|m| m.to() == sq("f1")));
        assert!(moves.iter().any(|m| m.to() == sq("e2")));
    }

    #[test]
    fn en_passant_capturing_the_checker() {
        let (_, moves) = legal("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        assert!(moves
            .iter()
            .any(|m| m.is_en_passant() && m.from() == sq("e4") && m.to() == sq("d3")));
    }

    #[test]
    fn en_passant_rank_discovery_is_illegal() {
        let (_, moves) = legal("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1");
        assert!(!moves.iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn check_annotation() {
        let (_, moves) = legal("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        let checking: Vec<Square> = moves.iter().filter(|m| m.is_check()).map(|m| m.to()).collect();
        assert_eq!(checking, vec![sq("a8")]);

        let (_, moves) = legal("5k2/8/8/8/8/8/8/4K2R w K - 0 1");
        let castle = moves
            .iter()
            .find(|m| m.is_castle())
            .copied()
            .unwrap();
        assert_eq!(castle, Move::castle(Color::White, CastleSide::Kingside));
        assert!(castle.is_check());
        assert_eq!(castle.to_string(), "O-O+");
    }

    #[test]
    fn checkmate_and_stalemate_have_no_moves() {
        let (mut mate, moves) =
            legal("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(moves.is_empty());
        assert!(is_in_check(&mate, Color::White));
        assert!(!has_legal_move(&mut mate));

        let (stale, moves) = legal("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(moves.is_empty());
        assert!(!is_in_check(&stale, Color::Black));
    }
}

//! Standard chess rules implementation.

use bitchess_core::Color;
use tracing::debug;

use super::draw::{is_fifty_move_draw, is_insufficient_material, DrawRules};
use super::{DrawReason, GameResult, RuleSet};
use crate::movegen::{has_legal_move, is_in_check, legal_moves};
use crate::{MoveList, Position};

/// Standard chess rules (FIDE), with the draw policy in [`DrawRules`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardChess {
    pub draw_rules: DrawRules,
}

impl StandardChess {
    pub const fn new(draw_rules: DrawRules) -> Self {
        StandardChess { draw_rules }
    }
}

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Position {
        Position::startpos()
    }

    fn legal_moves(&self, position: &mut Position) -> MoveList {
        legal_moves(position)
    }

    fn is_check(&self, position: &Position) -> bool {
        is_in_check(position, position.side_to_move)
    }

    fn is_insufficient_material(&self, position: &Position) -> bool {
        is_insufficient_material(position, &self.draw_rules)
    }

    fn game_result(&self, position: &mut Position) -> Option<GameResult> {
        let result = if !has_legal_move(position) {
            if self.is_check(position) {
                Some(match position.side_to_move {
                    Color::White => GameResult::BlackWins,
                    Color::Black => GameResult::WhiteWins,
                })
            } else {
                Some(GameResult::Draw(DrawReason::Stalemate))
            }
        } else if is_fifty_move_draw(position, &self.draw_rules) {
            Some(GameResult::Draw(DrawReason::FiftyMoveRule))
        } else if self.draw_rules.detect_insufficient_material
            && self.is_insufficient_material(position)
        {
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        } else {
            None
        };

        if let Some(result) = result {
            debug!(%result, halfmove_clock = position.halfmove_clock, "game over");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(fen: &str) -> Option<GameResult> {
        let mut pos = Position::from_fen(fen).unwrap();
        StandardChess::default().game_result(&mut pos)
    }

    #[test]
    fn initial_position() {
        let rules = StandardChess::default();
        let mut pos = rules.initial_position();
        assert_eq!(pos.to_fen(), bitchess_core::FenFields::STARTPOS);
        assert_eq!(rules.legal_moves(&mut pos).len(), 20);
        assert!(!rules.is_check(&pos));
        assert!(!rules.is_game_over(&mut pos));
    }

    #[test]
    fn checkmate_awards_the_other_side() {
        assert_eq!(
            result("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
            Some(GameResult::BlackWins)
        );
        assert_eq!(
            result("R5k1/5ppp/8/8/8/8/8/4K3 b - - 0 1"),
            Some(GameResult::WhiteWins)
        );
    }

    #[test]
    fn stalemate_is_a_draw() {
        assert_eq!(
            result("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"),
            Some(GameResult::Draw(DrawReason::Stalemate))
        );
    }

    #[test]
    fn mate_outranks_the_clock() {
        assert_eq!(
            result("R5k1/5ppp/8/8/8/8/8/4K3 b - - 100 70"),
            Some(GameResult::WhiteWins)
        );
        assert_eq!(
            result("6k1/5ppp/8/8/8/8/8/R3K3 w - - 100 70"),
            Some(GameResult::Draw(DrawReason::FiftyMoveRule))
        );
    }

    #[test]
    fn insufficient_material_can_be_disabled() {
        let fen = "4k3/8/8/8/8/8/8/3BK3 w - - 0 1";
        assert_eq!(
            result(fen),
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        );

        let rules = StandardChess::new(DrawRules {
            detect_insufficient_material: false,
            ..DrawRules::default()
        });
        let mut pos = Position::from_fen(fen).unwrap();
        assert!(rules.game_result(&mut pos).is_none());
    }
}

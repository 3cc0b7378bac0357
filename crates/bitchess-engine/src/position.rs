//! Board state: twelve piece masks, side to move, castling rights, en-passant
//! target, clocks and the undo stack.

use std::hash::{Hash, Hasher};

use bitchess_core::{
    castling_field, CastlingRights, Color, FenError, FenFields, Move, MoveFlag, Piece, Square,
};

use crate::zobrist::ZOBRIST;
use crate::Bitboard;

/// What `undo_last_move` needs to put a ply back. Board masks alone cannot
/// recover captured pieces, rights, the en-passant target or the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    pub mov: Move,
    pub captured: Option<Piece>,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
}

/// Board and flags without the undo stack, for checkpoint-style
/// save/restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    boards: [[Bitboard; 6]; 2],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// Complete game state.
///
/// Equality and hashing cover the boards, side to move, castling rights and
/// en-passant target only, so two positions reached by different move orders
/// compare equal. Clocks and history are ignored.
#[derive(Debug, Clone)]
pub struct Position {
    /// `boards[color][piece]`. No two masks share a bit.
    pub boards: [[Bitboard; 6]; 2],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// Square a pawn may capture onto en passant this ply.
    pub en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,
    /// Starts at 1 and increments after each Black move.
    pub fullmove_number: u32,
    history: Vec<Undo>,
}

impl Position {
    /// A board with no pieces, White to move.
    pub fn empty() -> Self {
        Position {
            boards: [[Bitboard::EMPTY; 6]; 2],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    /// The standard initial position.
    pub fn startpos() -> Self {
        let mut position = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for color in Color::ALL {
            for (file, piece) in back_rank.into_iter().enumerate() {
                let file = file as i8;
                if let Some(sq) = Square::from_coords(file, color.back_rank() as i8) {
                    position.put(color, piece, sq);
                }
                if let Some(sq) = Square::from_coords(file, color.pawn_rank() as i8) {
                    position.put(color, Piece::Pawn, sq);
                }
            }
        }
        position.castling = CastlingRights::ALL;
        position
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::parse(fen)?;
        let mut position = Position::empty();
        for (sq, piece, color) in fields.placement {
            position.put(color, piece, sq);
        }
        position.side_to_move = fields.side_to_move;
        position.castling = fields.castling;
        position.en_passant = fields.en_passant;
        position.halfmove_clock = fields.halfmove_clock;
        position.fullmove_number = fields.fullmove_number;
        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut gap = 0;
            for file in 0..8 {
                let Some(sq) = Square::from_coords(file, rank) else {
                    continue;
                };
                match self.piece_at(sq) {
                    Some((piece, color)) => {
                        if gap > 0 {
                            fen.push_str(&gap.to_string());
                            gap = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                fen.push_str(&gap.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), Square::to_algebraic);
        format!(
            "{} {} {} {} {} {}",
            fen,
            active,
            castling_field(self.castling),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Mask of `color`'s pieces of type `piece`.
    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.boards[color.index()][piece.index()]
    }

    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.boards[color.index()]
            .iter()
            .fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
    }

    #[inline]
    pub fn occupied_all(&self) -> Bitboard {
        self.occupied_by(Color::White) | self.occupied_by(Color::Black)
    }

    /// Piece and color on `sq`, searching both sides.
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        Color::ALL
            .into_iter()
            .find_map(|color| self.piece_of(sq, color).map(|piece| (piece, color)))
    }

    /// Piece of `color` on `sq`, if any.
    pub fn piece_of(&self, sq: Square, color: Color) -> Option<Piece> {
        Piece::ALL
            .into_iter()
            .find(|&piece| self.pieces(color, piece).contains(sq))
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).first_square()
    }

    /// Undo records, oldest first.
    pub fn history(&self) -> &[Undo] {
        &self.history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|undo| undo.mov)
    }

    /// Structural hash over boards, side to move, castling rights and
    /// en-passant target.
    pub fn zobrist_hash(&self) -> u64 {
        ZOBRIST.hash(self)
    }

    pub fn save_snapshot(&self) -> Snapshot {
        Snapshot {
            boards: self.boards,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Restores board and flags from `snapshot`. The undo stack no longer
    /// describes the restored board, so it is cleared.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        self.boards = snapshot.boards;
        self.side_to_move = snapshot.side_to_move;
        self.castling = snapshot.castling;
        self.en_passant = snapshot.en_passant;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
        self.history.clear();
    }

    /// Plays `m`, choosing the primitive from its flags and the board.
    ///
    /// `m` must come from move generation for this position (so its flags
    /// are right); legality is not checked here. See [`crate::apply_turn`]
    /// for the checked entry point.
    pub fn apply_move(&mut self, m: Move) {
        if m.is_castle() {
            self.apply_castle(m);
        } else if m.is_en_passant() {
            self.apply_en_passant(m);
        } else if m.promotion_piece().is_some() {
            self.apply_promotion(m);
        } else if self.piece_of(m.to(), m.color().opposite()).is_some() {
            self.apply_capture(m);
        } else {
            self.apply_quiet_move(m);
        }
    }

    /// Moves a piece to an empty square.
    pub fn apply_quiet_move(&mut self, m: Move) {
        debug_assert!(
            !self.occupied_all().contains(m.to()),
            "quiet move onto occupied {}",
            m.to()
        );
        self.push_undo(m, None);
        self.relocate(m.color(), m.piece(), m.from(), m.to());
        self.finish_ply(m, None);
    }

    /// Moves a piece onto an opponent piece, removing it.
    pub fn apply_capture(&mut self, m: Move) {
        let captured = self.piece_of(m.to(), m.color().opposite());
        debug_assert!(captured.is_some(), "capture onto empty {}", m.to());
        self.push_undo(m, captured);
        if let Some(piece) = captured {
            self.remove(m.color().opposite(), piece, m.to());
        }
        self.relocate(m.color(), m.piece(), m.from(), m.to());
        self.finish_ply(m, captured);
    }

    /// Moves king and rook together along the fixed castling geometry.
    ///
    /// # Panics
    ///
    /// Panics if `m` is not a castle.
    pub fn apply_castle(&mut self, m: Move) {
        let us = m.color();
        let Some(side) = m.flag().castle_side() else {
            panic!("{m:?} is not a castle");
        };
        self.push_undo(m, None);
        self.relocate(us, Piece::King, side.king_from(us), side.king_to(us));
        self.relocate(us, Piece::Rook, side.rook_from(us), side.rook_to(us));
        self.finish_ply(m, None);
    }

    /// Replaces the pawn with the promoted piece, capturing whatever stands
    /// on the destination.
    ///
    /// # Panics
    ///
    /// Panics if `m` is not a promotion.
    pub fn apply_promotion(&mut self, m: Move) {
        let Some(promoted) = m.promotion_piece() else {
            panic!("{m:?} is not a promotion");
        };
        let us = m.color();
        let captured = self.piece_of(m.to(), us.opposite());
        self.push_undo(m, captured);
        if let Some(piece) = captured {
            self.remove(us.opposite(), piece, m.to());
        }
        self.remove(us, m.piece(), m.from());
        self.put(us, promoted, m.to());
        self.finish_ply(m, captured);
    }

    /// Moves the pawn onto the target square and removes the enemy pawn
    /// standing beside it, one rank behind the target.
    pub fn apply_en_passant(&mut self, m: Move) {
        debug_assert!(m.is_en_passant(), "{m:?} is not en passant");
        let us = m.color();
        self.push_undo(m, Some(Piece::Pawn));
        if let Some(victim) = en_passant_victim(m) {
            self.remove(us.opposite(), Piece::Pawn, victim);
        }
        self.relocate(us, Piece::Pawn, m.from(), m.to());
        self.finish_ply(m, Some(Piece::Pawn));
    }

    /// Reverses the last applied ply. Returns the move undone, or `None`
    /// (leaving the position untouched) when there is no history.
    pub fn undo_last_move(&mut self) -> Option<Move> {
        let undo = self.history.pop()?;
        let m = undo.mov;
        let us = m.color();
        let them = us.opposite();

        if let Some(side) = m.flag().castle_side() {
            self.relocate(us, Piece::King, side.king_to(us), side.king_from(us));
            self.relocate(us, Piece::Rook, side.rook_to(us), side.rook_from(us));
        } else if m.flag() == MoveFlag::EnPassant {
            self.relocate(us, Piece::Pawn, m.to(), m.from());
            if let Some(victim) = en_passant_victim(m) {
                self.put(them, Piece::Pawn, victim);
            }
        } else {
            let placed = m.promotion_piece().unwrap_or(m.piece());
            self.remove(us, placed, m.to());
            self.put(us, m.piece(), m.from());
            if let Some(piece) = undo.captured {
                self.put(them, piece, m.to());
            }
        }

        self.side_to_move = us;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_sub(1);
        }
        Some(m)
    }

    fn push_undo(&mut self, m: Move, captured: Option<Piece>) {
        self.history.push(Undo {
            mov: m,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
        });
    }

    /// Bookkeeping shared by every primitive once the pieces have moved.
    fn finish_ply(&mut self, m: Move, captured: Option<Piece>) {
        let us = m.color();

        if m.piece() == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if m.piece() == Piece::King {
            self.castling.remove_color(us);
        }
        self.castling.remove_for_rook_square(m.from());
        self.castling.remove_for_rook_square(m.to());

        self.en_passant = if m.is_double_push() {
            m.from().offset(0, us.pawn_direction())
        } else {
            None
        };

        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = us.opposite();
    }

    #[inline]
    fn put(&mut self, color: Color, piece: Piece, sq: Square) {
        self.boards[color.index()][piece.index()].set(sq);
    }

    #[inline]
    fn remove(&mut self, color: Color, piece: Piece, sq: Square) {
        self.boards[color.index()][piece.index()].clear(sq);
    }

    #[inline]
    fn relocate(&mut self, color: Color, piece: Piece, from: Square, to: Square) {
        self.remove(color, piece, from);
        self.put(color, piece, to);
    }
}

/// Square of the pawn an en-passant capture removes: beside the capturing
/// pawn, one rank back from the target as seen by the mover.
fn en_passant_victim(m: Move) -> Option<Square> {
    m.to().offset(0, -m.color().pawn_direction())
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.boards == other.boards
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.boards.hash(state);
        self.side_to_move.hash(state);
        self.castling.hash(state);
        self.en_passant.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitchess_core::CastleSide;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn startpos_matches_fen() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), FenFields::STARTPOS);
        assert_eq!(pos, Position::from_fen(FenFields::STARTPOS).unwrap());
        assert_eq!(pos.occupied_all().count(), 32);
        assert_eq!(pos.occupied_by(Color::Black).count(), 16);
    }

    #[test]
    fn fen_round_trips() {
        for fen in [
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w - - 0 1",
            "8/8/8/8/8/8/8/K6k b - - 12 40",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn piece_lookup_is_color_aware() {
        let pos = Position::startpos();
        assert_eq!(pos.piece_at(Square::E1), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(Square::D8), Some((Piece::Queen, Color::Black)));
        assert_eq!(pos.piece_at(sq("e4")), None);
        assert_eq!(pos.piece_of(Square::E1, Color::Black), None);
        assert_eq!(pos.piece_of(Square::E1, Color::White), Some(Piece::King));
        assert_eq!(pos.king_square(Color::Black), Some(Square::E8));
    }

    #[test]
    fn quiet_move_and_undo() {
        let mut pos = Position::startpos();
        let before = pos.save_snapshot();
        pos.apply_quiet_move(Move::new(Color::White, Piece::Knight, Square::G1, sq("f3")));
        assert_eq!(pos.piece_at(sq("f3")), Some((Piece::Knight, Color::White)));
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(pos.halfmove_clock, 1);
        assert_eq!(pos.history().len(), 1);

        assert!(pos.undo_last_move().is_some());
        assert_eq!(pos.save_snapshot(), before);
        assert!(pos.history().is_empty());
    }

    #[test]
    fn double_push_sets_target_for_one_ply() {
        let mut pos = Position::startpos();
        let push = Move::with_flag(
            Color::White,
            Piece::Pawn,
            sq("e2"),
            sq("e4"),
            MoveFlag::DoublePush,
        );
        pos.apply_move(push);
        assert_eq!(pos.en_passant, Some(sq("e3")));
        pos.apply_move(Move::new(Color::Black, Piece::Knight, Square::G8, sq("f6")));
        assert_eq!(pos.en_passant, None);
        assert_eq!(pos.fullmove_number, 2);

        pos.undo_last_move();
        assert_eq!(pos.en_passant, Some(sq("e3")));
        assert_eq!(pos.fullmove_number, 1);
    }

    #[test]
    fn capture_records_victim_and_resets_clock() {
        let mut pos = Position::from_fen("4k3/8/8/3p4/4N3/8/8/4K3 w - - 7 30").unwrap();
        let before = pos.save_snapshot();
        let m = Move::new(Color::White, Piece::Knight, sq("e4"), sq("d5"));
        pos.apply_move(m);
        assert_eq!(pos.history()[0].captured, Some(Piece::Pawn));
        assert_eq!(pos.halfmove_clock, 0);
        assert_eq!(pos.pieces(Color::Black, Piece::Pawn), Bitboard::EMPTY);

        pos.undo_last_move();
        assert_eq!(pos.save_snapshot(), before);
    }

    #[test]
    fn castle_moves_rook_and_clears_own_rights_only() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").unwrap();
        let before = pos.save_snapshot();
        pos.apply_castle(Move::castle(Color::White, CastleSide::Queenside));
        assert_eq!(pos.piece_at(Square::C1), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(Square::D1), Some((Piece::Rook, Color::White)));
        assert_eq!(pos.piece_at(Square::A1), None);
        assert_eq!(
            pos.castling.raw(),
            CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE
        );
        assert_eq!(pos.halfmove_clock, 4);

        pos.undo_last_move();
        assert_eq!(pos.save_snapshot(), before);
    }

    #[test]
    #[should_panic(expected = "is not a castle")]
    fn castle_primitive_rejects_plain_king_move() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        pos.apply_castle(Move::new(Color::White, Piece::King, Square::E1, Square::G1));
    }

    #[test]
    #[should_panic(expected = "is not a promotion")]
    fn promotion_primitive_rejects_plain_push() {
        let mut pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        pos.apply_promotion(Move::new(Color::White, Piece::Pawn, sq("a7"), sq("a8")));
    }

    #[test]
    fn rook_capture_on_home_square_clears_right() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/6b1/R3K2R b KQkq - 0 1").unwrap();
        pos.apply_move(Move::new(Color::Black, Piece::Bishop, sq("g2"), Square::H1));
        assert!(!pos.castling.has(Color::White, CastleSide::Kingside));
        assert!(pos.castling.has(Color::White, CastleSide::Queenside));
        assert!(pos.castling.has(Color::Black, CastleSide::Kingside));
        pos.undo_last_move();
        assert_eq!(pos.castling, CastlingRights::ALL);
        assert_eq!(pos.piece_at(Square::H1), Some((Piece::Rook, Color::White)));
    }

    #[test]
    fn promotion_with_capture_and_undo() {
        let mut pos = Position::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = pos.save_snapshot();
        let m = Move::promotion(Color::White, sq("a7"), sq("b8"), Piece::Knight).unwrap();
        pos.apply_move(m);
        assert_eq!(pos.piece_at(sq("b8")), Some((Piece::Knight, Color::White)));
        assert_eq!(pos.pieces(Color::White, Piece::Pawn), Bitboard::EMPTY);
        assert_eq!(pos.pieces(Color::Black, Piece::Rook), Bitboard::EMPTY);

        pos.undo_last_move();
        assert_eq!(pos.save_snapshot(), before);
        assert_eq!(pos.piece_at(sq("b8")), Some((Piece::Rook, Color::Black)));
    }

    #[test]
    fn en_passant_removes_pawn_behind_target() {
        let mut pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let before = pos.save_snapshot();
        pos.apply_en_passant(Move::en_passant(Color::White, sq("e5"), sq("d6")));
        assert_eq!(pos.piece_at(sq("d6")), Some((Piece::Pawn, Color::White)));
        assert_eq!(pos.piece_at(sq("d5")), None);
        assert_eq!(pos.en_passant, None);

        pos.undo_last_move();
        assert_eq!(pos.save_snapshot(), before);
    }

    #[test]
    fn black_en_passant_victim_is_above_target() {
        let mut pos = Position::from_fen("4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1").unwrap();
        pos.apply_move(Move::en_passant(Color::Black, sq("e4"), sq("d3")));
        assert_eq!(pos.piece_at(sq("d4")), None);
        assert_eq!(pos.piece_at(sq("d3")), Some((Piece::Pawn, Color::Black)));
    }

    #[test]
    fn undo_without_history_is_a_no_op() {
        let mut pos = Position::startpos();
        let before = pos.save_snapshot();
        assert_eq!(pos.undo_last_move(), None);
        assert_eq!(pos.save_snapshot(), before);
    }

    #[test]
    fn equality_ignores_clocks_and_history() {
        let mut a = Position::startpos();
        let b =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 9 9").unwrap();
        assert_eq!(a, b);

        a.apply_move(Move::new(Color::White, Piece::Knight, Square::G1, sq("f3")));
        a.apply_move(Move::new(Color::Black, Piece::Knight, Square::G8, sq("f6")));
        a.apply_move(Move::new(Color::White, Piece::Knight, sq("f3"), Square::G1));
        a.apply_move(Move::new(Color::Black, Piece::Knight, sq("f6"), Square::G8));
        assert_eq!(a, b);
        assert_eq!(a.zobrist_hash(), b.zobrist_hash());
    }

    #[test]
    fn snapshot_restore_clears_history() {
        let mut pos = Position::startpos();
        let saved = pos.save_snapshot();
        pos.apply_move(Move::new(Color::White, Piece::Knight, Square::B1, sq("c3")));
        pos.restore_snapshot(&saved);
        assert_eq!(pos.save_snapshot(), saved);
        assert!(pos.history().is_empty());
    }
}

//! Perft: leaf-node counts of the legal move tree, compared against known
//! values to validate generation together with apply/undo.

use tracing::trace;

use super::legal::filter_legal;
use crate::Position;

/// Number of leaf nodes `depth` plies below `position`.
///
/// Moves are applied and undone in place; `position` is unchanged on
/// return.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = filter_legal(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        position.apply_move(m);
        nodes += perft(position, depth - 1);
        position.undo_last_move();
    }
    nodes
}

/// Per-move node counts at `depth`, sorted by coordinate notation.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = filter_legal(position);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        position.apply_move(m);
        let nodes = perft(position, depth.saturating_sub(1));
        position.undo_last_move();
        trace!(mv = %m.to_uci(), nodes, "perft divide");
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_shallow() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 0), 1);
        assert_eq!(perft(&mut position, 1), 20);
        assert_eq!(perft(&mut position, 2), 400);
        assert_eq!(position, Position::startpos());
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut position = Position::startpos();
        let divide = perft_divide(&mut position, 2);
        assert_eq!(divide.len(), 20);
        assert!(divide.iter().all(|(_, nodes)| *nodes == 20));
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert_eq!(divide[0].0, "a2a3");
    }
}

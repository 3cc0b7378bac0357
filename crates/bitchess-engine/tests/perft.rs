//! Perft node counts for the standard test positions.
//!
//! Counts at the deeper plies take seconds in debug builds and are ignored
//! by default; run them with `--ignored` (preferably in release).

use bitchess_engine::{perft, perft_divide, Position};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn check(fen: &str, expected: &[u64]) {
    let mut position = Position::from_fen(fen).unwrap();
    let before = position.save_snapshot();
    for (depth, &nodes) in expected.iter().enumerate() {
        let depth = depth as u32 + 1;
        assert_eq!(perft(&mut position, depth), nodes, "{fen} at depth {depth}");
    }
    assert_eq!(position.save_snapshot(), before);
    assert!(position.history().is_empty());
}

#[test]
fn startpos() {
    check(bitchess_core::FenFields::STARTPOS, &[20, 400, 8_902]);
}

#[test]
#[ignore]
fn startpos_depth_4() {
    let mut position = Position::startpos();
    assert_eq!(perft(&mut position, 4), 197_281);
}

#[test]
fn kiwipete() {
    check(KIWIPETE, &[48, 2_039]);
}

#[test]
#[ignore]
fn kiwipete_depth_3() {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut position, 3), 97_862);
}

#[test]
fn position_3() {
    check(POSITION_3, &[14, 191, 2_812]);
}

#[test]
#[ignore]
fn position_3_depth_4() {
    let mut position = Position::from_fen(POSITION_3).unwrap();
    assert_eq!(perft(&mut position, 4), 43_238);
}

#[test]
fn position_4() {
    check(POSITION_4, &[6, 264]);
}

#[test]
#[ignore]
fn position_4_depth_3() {
    let mut position = Position::from_fen(POSITION_4).unwrap();
    assert_eq!(perft(&mut position, 3), 9_467);
}

#[test]
fn position_5() {
    check(POSITION_5, &[44, 1_486]);
}

#[test]
#[ignore]
fn position_5_depth_3() {
    let mut position = Position::from_fen(POSITION_5).unwrap();
    assert_eq!(perft(&mut position, 3), 62_379);
}

#[test]
fn kiwipete_divide() {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    let divide = perft_divide(&mut position, 2);
    assert_eq!(divide.len(), 48);
    assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 2_039);

    let castle = divide.iter().find(|(mv, _)| mv == "e1g1").unwrap();
    assert_eq!(castle.1, 43);
}

//! Self-play driver - plays random legal moves against itself.
//!
//! Exercises the rules engine end to end: every turn goes through legal
//! generation and validated application, and each game runs until the rules
//! declare it over or the ply limit is reached.

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use bitchess_engine::{Game, GameResult};
use clap::Parser;
use config::SelfPlayConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Plays random self-play games and reports how they ended.
#[derive(Parser)]
#[command(name = "self-play")]
#[command(about = "Plays random legal moves against itself")]
struct Args {
    /// Path to a TOML config file (defaults to ./selfplay.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long)]
    games: Option<u32>,

    /// Abandon a game after this many plies
    #[arg(long)]
    max_plies: Option<usize>,

    /// Seed for move selection
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Default)]
struct Tally {
    white_wins: u32,
    black_wins: u32,
    draws: BTreeMap<String, u32>,
    unfinished: u32,
}

impl Tally {
    fn record(&mut self, result: Option<GameResult>) {
        match result {
            Some(GameResult::WhiteWins) => self.white_wins += 1,
            Some(GameResult::BlackWins) => self.black_wins += 1,
            Some(GameResult::Draw(reason)) => {
                *self.draws.entry(reason.to_string()).or_default() += 1
            }
            None => self.unfinished += 1,
        }
    }
}

fn play_game(config: &SelfPlayConfig, rng: &mut StdRng) -> anyhow::Result<Game> {
    let mut game = Game::with_rules(config.draw_rules);
    while !game.is_game_over() && game.ply_count() < config.max_plies {
        let moves = game.legal_moves();
        let Some(&m) = moves.as_slice().choose(rng) else {
            break;
        };
        game.apply_turn(m)
            .with_context(|| format!("generated move rejected in {}", game.to_fen()))?;
    }
    Ok(game)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut config = SelfPlayConfig::load(args.config.as_deref())?;
    if let Some(games) = args.games {
        config.games = games;
    }
    if let Some(max_plies) = args.max_plies {
        config.max_plies = max_plies;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    tracing::info!(
        games = config.games,
        max_plies = config.max_plies,
        seed,
        "Starting self-play"
    );

    let mut tally = Tally::default();
    for index in 1..=config.games {
        let game = play_game(&config, &mut rng)?;
        match game.result() {
            Some(result) => tracing::info!(
                game = index,
                plies = game.ply_count(),
                score = result.score(),
                "Game over: {}",
                result
            ),
            None => tracing::info!(
                game = index,
                plies = game.ply_count(),
                "Game abandoned at ply limit"
            ),
        }
        tracing::debug!(game = index, fen = %game.to_fen(), "Final position");
        tally.record(game.result());
    }

    tracing::info!(
        white_wins = tally.white_wins,
        black_wins = tally.black_wins,
        unfinished = tally.unfinished,
        "Self-play finished"
    );
    for (reason, count) in &tally.draws {
        tracing::info!(count, "Draws by {}", reason);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitchess_engine::DrawReason;

    #[test]
    fn tally_counts_each_outcome() {
        let mut tally = Tally::default();
        tally.record(Some(GameResult::WhiteWins));
        tally.record(Some(GameResult::Draw(DrawReason::Stalemate)));
        tally.record(Some(GameResult::Draw(DrawReason::Stalemate)));
        tally.record(None);
        assert_eq!(tally.white_wins, 1);
        assert_eq!(tally.black_wins, 0);
        assert_eq!(tally.draws.get("stalemate"), Some(&2));
        assert_eq!(tally.unfinished, 1);
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let config = SelfPlayConfig {
            max_plies: 60,
            ..SelfPlayConfig::default()
        };
        let play = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            play_game(&config, &mut rng).unwrap()
        };
        let (a, b) = (play(7), play(7));
        assert_eq!(a.to_fen(), b.to_fen());
        assert!(a.ply_count() <= 60);
        assert_eq!(
            a.move_history().iter().map(|m| &m.san).collect::<Vec<_>>(),
            b.move_history().iter().map(|m| &m.san).collect::<Vec<_>>()
        );
    }
}

//! Parallel self-play across independent shards.
//!
//! Each shard owns its own evaluator, search engine and RNG, so nothing is
//! shared between rayon workers except the prototype game. Shard `s` is
//! seeded with `seed + s`, which makes a run reproducible for a fixed
//! shard count.

use crate::config::SelfPlayConfig;
use crate::driver::{SelfPlay, SelfPlayReport};
use anyhow::{Context, Result};
use qumalaq_core::Game;
use qumalaq_mcts::Evaluator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

/// Number of games assigned to each of `shards` shards.
pub fn shard_sizes(num_games: usize, shards: usize) -> Vec<usize> {
    let shards = shards.max(1);
    let base = num_games / shards;
    let extra = num_games % shards;
    (0..shards).map(|s| base + usize::from(s < extra)).collect()
}

/// Play `num_games` games split across `shards` parallel drivers.
///
/// `make_evaluator` is called once per shard, on the worker thread that
/// uses the evaluator.
pub fn run_sharded<G, E, F>(
    prototype: &G,
    config: &SelfPlayConfig,
    num_games: usize,
    shards: usize,
    seed: u64,
    make_evaluator: F,
) -> Result<SelfPlayReport>
where
    G: Game + Sync,
    E: Evaluator,
    F: Fn() -> Result<E> + Sync,
{
    let start = Instant::now();
    let sizes = shard_sizes(num_games, shards);
    info!(games = num_games, shards = sizes.len(), seed, "starting self-play");

    let reports: Vec<SelfPlayReport> = sizes
        .par_iter()
        .enumerate()
        .filter(|(_, games)| **games > 0)
        .map(|(shard, &games)| -> Result<SelfPlayReport> {
            let evaluator = make_evaluator()
                .with_context(|| format!("Failed to create evaluator for shard {shard}"))?;
            let rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(shard as u64));
            let mut selfplay = SelfPlay::new(config.clone(), evaluator, rng)?;
            let report = selfplay
                .play_games(prototype, games)
                .with_context(|| format!("Self-play failed in shard {shard}"))?;
            info!(shard, games, examples = report.examples.len(), "shard finished");
            Ok(report)
        })
        .collect::<Result<_>>()?;

    let mut merged = SelfPlayReport::default();
    for report in reports {
        merged.merge(report);
    }
    merged.elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(merged)
}

//! Self-play data generation and arena evaluation for Togyz Qumalaq.
//!
//! Generates training examples with batched root search and saves them in
//! MessagePack format for the Python training pipeline. Also plays the
//! search player against baseline opponents.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use qumalaq_core::Game;
use qumalaq_inference::OnnxEvaluator;
use qumalaq_mcts::games::TicTacToe;
use qumalaq_mcts::{Evaluator, MctsConfig, RootSearch, UniformEvaluator};
use qumalaq_selfplay::{
    play_arena, run_sharded, ArenaResult, CappedGamePolicy, ExampleWriter, MinimaxOpponent,
    Opponent, RandomOpponent, ReplayBuffer, RunMetadata, SelfPlayConfig,
};
use qumalaq_togyz::TogyzQumalaq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Togyz Qumalaq self-play and evaluation tool.
#[derive(Parser)]
#[command(name = "qumalaq-selfplay")]
#[command(about = "Generate self-play training data and evaluate models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate self-play games for training.
    Generate(GenerateArgs),

    /// Evaluate the search player against a baseline opponent.
    Evaluate(EvaluateArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GameKind {
    Togyz,
    Tictactoe,
}

impl GameKind {
    fn name(self) -> &'static str {
        match self {
            GameKind::Togyz => "togyz_qumalaq",
            GameKind::Tictactoe => "tictactoe",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Baseline {
    Random,
    Minimax,
}

#[derive(Args)]
struct GenerateArgs {
    /// Game to play.
    #[arg(long, value_enum, default_value = "togyz")]
    game: GameKind,

    /// Number of games to generate.
    #[arg(short, long, default_value = "32")]
    games: usize,

    /// Games played in lockstep by each driver.
    #[arg(long, default_value = "32")]
    games_per_batch: usize,

    /// Number of search simulations per move.
    #[arg(short, long, default_value = "200")]
    simulations: usize,

    /// Pending leaves evaluated together.
    #[arg(long, default_value = "64")]
    leaf_batch: usize,

    /// Ply after which moves are chosen greedily.
    #[arg(long, default_value = "15")]
    temperature_threshold: usize,

    /// Games are cut off after this many plies.
    #[arg(long, default_value = "200")]
    max_plies: usize,

    /// How games cut off by the ply cap are scored.
    #[arg(long, value_enum, default_value = "adjudicate")]
    capped: CappedGamePolicy,

    /// Independent self-play drivers run in parallel.
    #[arg(long, default_value = "1")]
    shards: usize,

    /// Most recent examples kept for writing.
    #[arg(long, default_value_t = ReplayBuffer::DEFAULT_CAPACITY)]
    replay_capacity: usize,

    /// Examples per output file.
    #[arg(long, default_value = "4096")]
    chunk_size: usize,

    /// Output directory for example files.
    #[arg(short, long, default_value = "data/selfplay")]
    output: PathBuf,

    /// ONNX policy/value model. Uniform priors are used if not specified.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log level, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Game to play.
    #[arg(long, value_enum, default_value = "togyz")]
    game: GameKind,

    /// Number of games to play.
    #[arg(short, long, default_value = "20")]
    games: usize,

    /// Number of search simulations per move.
    #[arg(short, long, default_value = "200")]
    simulations: usize,

    /// Opponent of the search player.
    #[arg(long, value_enum, default_value = "minimax")]
    baseline: Baseline,

    /// Minimax search depth.
    #[arg(short, long, default_value = "4")]
    depth: usize,

    /// Games are cut off after this many plies.
    #[arg(long, default_value = "200")]
    max_plies: usize,

    /// ONNX policy/value model. Uniform priors are used if not specified.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log level, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// The network if a model is given, uniform priors otherwise.
fn make_evaluator(
    model: Option<&Path>,
    encoding_len: usize,
    num_actions: usize,
) -> Result<Box<dyn Evaluator>> {
    match model {
        Some(path) => {
            let evaluator = OnnxEvaluator::new(path, encoding_len, num_actions)
                .with_context(|| format!("Failed to load model from {:?}", path))?;
            Ok(Box::new(evaluator))
        }
        None => Ok(Box::new(UniformEvaluator::new(num_actions))),
    }
}

fn evaluator_name(model: Option<&Path>) -> String {
    match model {
        Some(path) => format!("onnx:{}", path.display()),
        None => "uniform".to_string(),
    }
}

/// Run the generate command.
fn cmd_generate<G: Game + Sync>(prototype: &G, args: &GenerateArgs) -> Result<()> {
    let config = SelfPlayConfig::default()
        .with_mcts(
            MctsConfig::with_simulations(args.simulations).with_leaf_batch_size(args.leaf_batch),
        )
        .with_games_per_batch(args.games_per_batch)
        .with_temperature_threshold(args.temperature_threshold)
        .with_max_plies(args.max_plies)
        .with_capped_policy(args.capped);
    config.validate().context("Invalid self-play configuration")?;

    let model = args.model.as_deref();
    println!(
        "Generating {} {} games with {} simulations/move ({})",
        args.games,
        args.game.name(),
        args.simulations,
        evaluator_name(model)
    );
    println!("Output directory: {:?}", args.output);
    println!("Seed: {}", args.seed);

    let report = run_sharded(
        prototype,
        &config,
        args.games,
        args.shards,
        args.seed,
        || make_evaluator(model, prototype.encoding_len(), prototype.num_actions()),
    )?;

    let mut buffer = ReplayBuffer::new(args.replay_capacity, ReplayBuffer::DEFAULT_MIN_SIZE);
    buffer.extend(report.examples.iter().cloned());
    if !buffer.is_ready() {
        warn!(
            examples = buffer.len(),
            min_size = ReplayBuffer::DEFAULT_MIN_SIZE,
            "fewer examples than a training step needs"
        );
    }
    let kept: Vec<_> = buffer.iter().cloned().collect();

    let mut writer = ExampleWriter::create(&args.output)?;
    let files = writer.write_all(&kept, args.chunk_size)?;
    let metadata = RunMetadata::from_report(
        args.game.name(),
        args.seed,
        &evaluator_name(model),
        &config,
        &report,
        kept.len(),
    );
    writer.write_metadata(&metadata)?;
    info!(files = files.len(), examples = kept.len(), "training data written");

    println!("\nCompleted in {:.2}s", report.elapsed_ms as f64 / 1000.0);
    println!("Games generated: {}", report.num_games());
    println!("Examples written: {} ({} files)", kept.len(), files.len());
    println!("Average game length: {:.1} plies", report.avg_plies());
    println!("Capped games: {} ({} dropped)", report.capped(), report.dropped());
    println!("Average leaf batch: {:.1}", report.search.avg_leaf_batch());
    println!(
        "\nOutcomes: First wins: {}, Second wins: {}, Draws: {}",
        metadata.first_wins, metadata.second_wins, metadata.draws
    );

    Ok(())
}

/// Play the arena for one game and opponent.
fn run_arena<G, O>(prototype: &G, opponent: &mut O, args: &EvaluateArgs) -> Result<ArenaResult>
where
    G: Game,
    O: Opponent<G>,
{
    let evaluator = make_evaluator(
        args.model.as_deref(),
        prototype.encoding_len(),
        prototype.num_actions(),
    )?;
    let mut search = RootSearch::new(
        MctsConfig::for_evaluation(args.simulations),
        evaluator,
        ChaCha8Rng::seed_from_u64(args.seed),
    )?;

    println!(
        "\nPlaying {} games: search ({} sims, {}) vs {}",
        args.games,
        args.simulations,
        evaluator_name(args.model.as_deref()),
        opponent.name()
    );
    println!("================================================");

    let result = play_arena(&mut search, opponent, prototype, args.games, args.max_plies)?;
    Ok(result)
}

/// Run the evaluate command.
fn cmd_evaluate(args: &EvaluateArgs) -> Result<()> {
    let opponent_rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(1));

    let result = match (args.game, args.baseline) {
        (GameKind::Togyz, Baseline::Minimax) => run_arena(
            &TogyzQumalaq::new(),
            &mut MinimaxOpponent::new(args.depth),
            args,
        )?,
        (GameKind::Togyz, Baseline::Random) => run_arena(
            &TogyzQumalaq::new(),
            &mut RandomOpponent::new(opponent_rng),
            args,
        )?,
        (GameKind::Tictactoe, Baseline::Random) => run_arena(
            &TicTacToe::new(),
            &mut RandomOpponent::new(opponent_rng),
            args,
        )?,
        (GameKind::Tictactoe, Baseline::Minimax) => {
            bail!("the minimax baseline is only available for togyz")
        }
    };

    let percent = |n: usize| n as f32 / result.games.max(1) as f32 * 100.0;
    println!("\n================================================");
    println!("FINAL RESULTS");
    println!("================================================");
    println!("Search wins:   {} ({:.1}%)", result.wins, percent(result.wins));
    println!("Baseline wins: {} ({:.1}%)", result.losses, percent(result.losses));
    println!("Draws:         {} ({:.1}%)", result.draws, percent(result.draws));
    println!("------------------------------------------------");
    println!("Win rate: {:.1}%", result.win_rate() * 100.0);
    println!("Average game length: {:.1} plies", result.avg_plies());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            init_tracing(&args.log_level);
            match args.game {
                GameKind::Togyz => cmd_generate(&TogyzQumalaq::new(), &args),
                GameKind::Tictactoe => cmd_generate(&TicTacToe::new(), &args),
            }
        }
        Commands::Evaluate(args) => {
            init_tracing(&args.log_level);
            cmd_evaluate(&args)
        }
    }
}

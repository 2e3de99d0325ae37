//! FlowBot command-line host
//!
//! Plays one turn: builds the position, selects a move and prints it on
//! stdout. Logs go to stderr (`RUST_LOG`, default `info`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flowbot::board::{Board, Color, START_FEN};
use flowbot::eval::{EvalProfile, Evaluator, PieceSquareEvaluator};
use flowbot::reference::ReferenceEngine;
use flowbot::search::params::DEFAULT_DEPTH;
use flowbot::search::{CaptureFirstOrderer, Search, SearchParams};
use flowbot::selector::{MoveSelector, Selection};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Position to play from
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    /// Moves (UCI) applied to the position before searching
    #[arg(short, long, num_args = 1.., value_delimiter = ' ')]
    moves: Vec<String>,

    /// Search depth in plies
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Material weights
    #[arg(long, value_enum, default_value_t = EvalProfile::Classic)]
    profile: EvalProfile,

    /// Switch to endgame piece-square tables when material runs low
    #[arg(long)]
    endgame_tables: bool,

    /// Disable the position cache
    #[arg(long)]
    no_cache: bool,

    /// Search normally even when every move loses to a forced mate
    #[arg(long)]
    no_fallback: bool,

    /// Play the fixed opening as White on the first full moves
    #[arg(long)]
    opening: bool,

    /// Seed for the random fallback
    #[arg(long)]
    seed: Option<u64>,

    /// Load the position cache from this file and save it back afterwards
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// UCI engine to ask for a reference evaluation
    #[arg(long)]
    reference_engine: Option<String>,

    /// Depth for the reference engine
    #[arg(long, default_value_t = 12)]
    reference_depth: u8,

    /// Seconds to wait for the reference engine before giving up
    #[arg(long, default_value_t = 30)]
    reference_timeout: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut board = Board::from_fen(&args.fen)?;
    for uci in &args.moves {
        let mv = board
            .parse_uci(uci)
            .with_context(|| format!("applying --moves {}", args.moves.join(" ")))?;
        board.push(&mv)?;
    }
    info!("position {}", board.fen());

    let mut params = SearchParams::new()
        .depth(args.depth)
        .enable_cache(!args.no_cache)
        .enable_random_fallback(!args.no_fallback)
        .enable_opening_override(args.opening);
    if let Some(seed) = args.seed {
        params = params.seed(seed);
    }

    let evaluator =
        PieceSquareEvaluator::new(args.profile).with_endgame_tables(args.endgame_tables);
    let orderer = CaptureFirstOrderer::new(*evaluator.weights());
    let mut search = Search::with_parts(evaluator, orderer, params);

    if let Some(path) = &args.cache_file {
        if path.exists() {
            match search.load_cache(path) {
                Ok(entries) => info!("loaded {} cache entries from {}", entries, path.display()),
                Err(err) => warn!("ignoring cache file {}: {}", path.display(), err),
            }
        }
    }

    let mut selector = MoveSelector::from_search(search);
    match selector.select(&mut board)? {
        Selection::Play(result) => {
            println!("bestmove {}", result.uci());
            if let Some(score) = result.score {
                println!("score {}", score);
            }
        }
        Selection::GameOver(terminal) => {
            println!("bestmove (none)");
            println!("result {}", terminal);
        }
    }

    if let Some(path) = &args.reference_engine {
        let reference = ReferenceEngine::new(path.as_str(), args.reference_depth)
            .with_timeout(Duration::from_secs(args.reference_timeout));
        match reference.evaluate(&board) {
            Ok(report) => info!(
                "reference {} bestmove {} (static eval {})",
                report.score,
                report.bestmove.as_deref().unwrap_or("(none)"),
                selector.search().evaluator().evaluate(&board, Color::White)
            ),
            Err(err) => warn!("reference comparison skipped: {}", err),
        }
    }

    if let Some(path) = &args.cache_file {
        if let Err(err) = selector.search().save_cache(path) {
            warn!("could not save cache to {}: {}", path.display(), err);
        }
    }

    Ok(())
}

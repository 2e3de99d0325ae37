use clap::Parser;
use flowbot::board::{Board, Color, Role, START_FEN};
use flowbot::eval::{EvalProfile, PieceSquareEvaluator};

/// Print every term of the static evaluation of a position
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    #[arg(long, value_enum, default_value_t = EvalProfile::Classic)]
    profile: EvalProfile,

    #[arg(long)]
    endgame_tables: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let board = Board::from_fen(&args.fen)?;
    let evaluator =
        PieceSquareEvaluator::new(args.profile).with_endgame_tables(args.endgame_tables);

    println!("Loading FEN: {}", board.fen());
    println!("Side to move: {:?}", board.turn());
    println!("Profile: {}", args.profile.name());

    for role in Role::ALL {
        let white = board.pieces(role, Color::White).count();
        let black = board.pieces(role, Color::Black).count();
        println!(
            "{:?}: W={} B={} (weight {})",
            role,
            white,
            black,
            evaluator.weights().value(role)
        );
    }

    let terms = evaluator.breakdown(&board);
    println!("Material:   {}", terms.material);
    println!("Positional: {}", terms.positional);
    println!("Check:      {}", terms.check);
    println!("Endgame:    {}", terms.endgame);
    if let Some(terminal) = terms.terminal {
        println!("Terminal:   {}", terminal);
    }
    println!("Total (white): {}", terms.total);

    Ok(())
}

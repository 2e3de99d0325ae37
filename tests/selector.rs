use std::collections::BTreeSet;

use flowbot::board::{Board, Color, Terminal};
use flowbot::eval::{EvalProfile, PieceSquareEvaluator, MATE, MAX_EVAL};
use flowbot::search::{CaptureFirstOrderer, Search, SearchParams};
use flowbot::selector::{MoveSelector, PlayResult, Selection, SelectionReason};

fn play(selector: &mut MoveSelector, fen: &str) -> PlayResult {
    let mut board = Board::from_fen(fen).expect("Invalid FEN");
    match selector.select(&mut board).unwrap() {
        Selection::Play(result) => result,
        Selection::GameOver(terminal) => panic!("{} is already over: {}", fen, terminal),
    }
}

#[test]
fn start_position_depth_one() {
    let mut board = Board::new();
    let legal: Vec<String> = board
        .legal_moves()
        .iter()
        .map(flowbot::board::move_to_uci)
        .collect();
    assert_eq!(legal.len(), 20);

    let mut selector = MoveSelector::new(SearchParams::new());
    match selector.choose_move(&mut board, 1, Color::White).unwrap() {
        Selection::Play(result) => {
            assert!(legal.contains(&result.uci()), "{} is not legal", result.uci());
            let score = result.score.unwrap();
            assert!(score.abs() < MATE, "score {} should be finite", score);
            assert_eq!(result.reason, SelectionReason::Searched);
        }
        Selection::GameOver(t) => panic!("start position reported as {}", t),
    }
    assert_eq!(selector.search().stats().root_nodes, 20);
}

#[test]
fn mate_in_1_scholars() {
    // 1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    for depth in 1..=2 {
        let mut selector = MoveSelector::new(SearchParams::new().depth(depth));
        let result = play(&mut selector, fen);
        assert_eq!(result.uci(), "h5f7", "depth {}", depth);
        assert_eq!(result.score, Some(MATE));
        assert_eq!(result.reason, SelectionReason::ForcedMate);
    }
}

#[test]
fn mate_in_1_back_rank() {
    let mut selector = MoveSelector::new(SearchParams::new().depth(2));
    let result = play(&mut selector, "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1");
    assert_eq!(result.uci(), "a1a8");
    assert_eq!(result.reason, SelectionReason::ForcedMate);
}

#[test]
fn black_avoids_mate_in_one() {
    // Black to move; Ra8 mates unless the king gets air or the rank is covered
    let mut selector = MoveSelector::new(SearchParams::new().depth(2));
    let result = play(&mut selector, "6k1/5ppp/8/8/8/8/r4PPP/R5K1 b - - 0 1");
    assert!(result.score.unwrap() > -MATE, "{} walks into mate", result.uci());
}

#[test]
fn forced_loss_uses_seeded_fallback() {
    let fen = "7k/8/6K1/8/8/8/8/R7 b - - 0 1";
    let params = SearchParams::new().depth(2).seed(2024);

    let first = play(&mut MoveSelector::new(params.clone()), fen);
    let second = play(&mut MoveSelector::new(params), fen);
    assert_eq!(first.reason, SelectionReason::RandomFallback);
    assert_eq!(first.uci(), "h8g8");
    assert_eq!(first, second);
}

#[test]
fn forced_loss_fallback_varies_with_the_seed() {
    // Kg8, b6 and b5 all allow Ra8 mate
    let fen = "7k/1p6/6K1/8/8/8/8/R7 b - - 0 1";
    let mut played = BTreeSet::new();
    for seed in 0..20 {
        let result = play(&mut MoveSelector::new(SearchParams::new().depth(2).seed(seed)), fen);
        assert_eq!(result.reason, SelectionReason::RandomFallback);
        assert_eq!(result.score, Some(-MATE));
        played.insert(result.uci());
    }
    assert!(played.len() > 1, "every seed played {:?}", played);
    assert!(played.is_subset(&BTreeSet::from([
        "h8g8".to_string(),
        "b7b6".to_string(),
        "b7b5".to_string(),
    ])));
}

#[test]
fn huge_material_edge_is_not_mistaken_for_mate() {
    // Black's only move is Kxg8, after which White still has nine queens
    let fen = "6Bk/6NN/8/8/8/RRB5/QQQQ4/QQQQQ2K b - - 0 1";
    let mut selector = MoveSelector::new(SearchParams::new().depth(1));
    let result = play(&mut selector, fen);
    assert_eq!(result.uci(), "h8g8");
    assert_eq!(result.reason, SelectionReason::Searched);
    assert_eq!(result.score, Some(-MAX_EVAL));
}

#[test]
fn checkmated_root_reports_game_over() {
    let mut board =
        Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    let mut selector = MoveSelector::new(SearchParams::new());
    assert_eq!(
        selector.select(&mut board).unwrap(),
        Selection::GameOver(Terminal::Checkmate {
            loser: Color::White
        })
    );
}

#[test]
fn opening_override_sequence() {
    let mut selector = MoveSelector::new(SearchParams::new().enable_opening_override(true));
    let mut board = Board::new();

    let first = match selector.select(&mut board).unwrap() {
        Selection::Play(result) => result,
        other => panic!("{:?}", other),
    };
    assert_eq!(first.uci(), "e2e4");
    board.push(&first.mv).unwrap();
    let reply = board.parse_uci("e7e5").unwrap();
    board.push(&reply).unwrap();

    let second = match selector.select(&mut board).unwrap() {
        Selection::Play(result) => result,
        other => panic!("{:?}", other),
    };
    assert_eq!(second.uci(), "b1c3");
    assert_eq!(second.reason, SelectionReason::Opening);
    assert_eq!(selector.search().stats().nodes, 0);
}

#[test]
fn persisted_cache_reproduces_the_choice() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3";
    let path = std::env::temp_dir().join(format!("flowbot-selector-{}.bin", std::process::id()));

    let mut cold = MoveSelector::new(SearchParams::new().depth(3));
    let cold_result = play(&mut cold, fen);
    cold.search().save_cache(&path).unwrap();

    let mut warm = MoveSelector::new(SearchParams::new().depth(3));
    assert!(warm.search_mut().load_cache(&path).unwrap() > 0);
    let warm_result = play(&mut warm, fen);

    assert_eq!(warm_result, cold_result);
    assert!(warm.search().stats().nodes < cold.search().stats().nodes);

    // a different evaluator must not reuse those scores
    let heavy = Search::with_parts(
        PieceSquareEvaluator::new(EvalProfile::HeavyMinors),
        CaptureFirstOrderer::default(),
        SearchParams::new().depth(3),
    );
    let mut heavy = MoveSelector::from_search(heavy);
    assert!(heavy.search_mut().load_cache(&path).is_err());

    let _ = std::fs::remove_file(&path);
}

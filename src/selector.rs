//! Root move selection
//!
//! `MoveSelector` is what a host calls once per turn. It searches every root
//! move with a full window, keeps the first best one in enumeration order,
//! and applies the root policies around the search: the optional fixed
//! opening and the random move when every line loses to a forced mate.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::board::{move_to_uci, Board, Color, Move, Terminal};
use crate::error::EngineResult;
use crate::eval::{Evaluator, PieceSquareEvaluator, Score, MATE};
use crate::search::{CaptureFirstOrderer, MoveOrderer, Search, SearchParams, INFINITE};

/// Why a move was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Best score found by the search
    Searched,
    /// The search proved a forced mate and stopped early
    ForcedMate,
    /// Every move loses to a forced mate; one was drawn at random
    RandomFallback,
    /// Played from the fixed opening without searching
    Opening,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionReason::Searched => "searched",
            SelectionReason::ForcedMate => "forced mate",
            SelectionReason::RandomFallback => "random fallback",
            SelectionReason::Opening => "opening",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayResult {
    pub mv: Move,
    /// Score for the selecting side; None when no search ran
    pub score: Option<Score>,
    pub reason: SelectionReason,
}

impl PlayResult {
    pub fn uci(&self) -> String {
        move_to_uci(&self.mv)
    }
}

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Play(PlayResult),
    /// The position has no legal moves
    GameOver(Terminal),
}

impl Selection {
    pub fn play(&self) -> Option<&PlayResult> {
        match self {
            Selection::Play(result) => Some(result),
            Selection::GameOver(_) => None,
        }
    }
}

pub struct MoveSelector<E = PieceSquareEvaluator, O = CaptureFirstOrderer> {
    search: Search<E, O>,
    rng: StdRng,
}

impl MoveSelector<PieceSquareEvaluator, CaptureFirstOrderer> {
    pub fn new(params: SearchParams) -> Self {
        Self::from_search(Search::new(params))
    }
}

impl<E: Evaluator, O: MoveOrderer> MoveSelector<E, O> {
    pub fn from_search(search: Search<E, O>) -> Self {
        let rng = match search.params().seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { search, rng }
    }

    pub fn search(&self) -> &Search<E, O> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut Search<E, O> {
        &mut self.search
    }

    /// Pick a move for the side to move at the configured depth
    pub fn select(&mut self, board: &mut Board) -> EngineResult<Selection> {
        let depth = self.search.params().depth;
        let side = board.turn();
        self.choose_move(board, depth, side)
    }

    /// Pick the move maximizing `perspective`'s score after a `depth`-ply
    /// search (root move included). `perspective` is normally the side to
    /// move.
    pub fn choose_move(
        &mut self,
        board: &mut Board,
        depth: u8,
        perspective: Color,
    ) -> EngineResult<Selection> {
        self.search.stats_mut().reset();
        self.search.stats_mut().start_timing();

        if let Some(terminal) = board.terminal() {
            info!("no legal moves: {}", terminal);
            return Ok(self.finish(Selection::GameOver(terminal)));
        }

        if let Some(mv) = self.opening_move(board) {
            let result = PlayResult {
                mv,
                score: None,
                reason: SelectionReason::Opening,
            };
            info!("bestmove {} ({})", result.uci(), result.reason);
            return Ok(self.finish(Selection::Play(result)));
        }

        let child_depth = depth.max(1) - 1;
        let moves = board.legal_moves();
        let mut best: Option<(Move, Score)> = None;
        let mut reason = SelectionReason::Searched;

        for mv in &moves {
            self.search.stats_mut().inc_root_node();
            let score = {
                let mut child = board.push_guard(mv)?;
                self.search
                    .search(&mut child, child_depth, -INFINITE, INFINITE, perspective)?
            };
            debug!("root {} score {}", move_to_uci(mv), score);

            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((mv.clone(), score));
            }
            if score >= MATE {
                reason = SelectionReason::ForcedMate;
                break;
            }
        }

        let Some((mut mv, score)) = best else {
            // unreachable: a non-terminal position has a legal move
            return Ok(self.finish(Selection::GameOver(Terminal::Stalemate)));
        };

        if score <= -MATE && self.search.params().enable_random_fallback {
            if let Some(random) = moves.as_slice().choose(&mut self.rng) {
                warn!(
                    "every move loses to a forced mate, playing {} at random",
                    move_to_uci(random)
                );
                mv = random.clone();
                reason = SelectionReason::RandomFallback;
            }
        }

        let result = PlayResult {
            mv,
            score: Some(score),
            reason,
        };
        info!("bestmove {} score {} ({})", result.uci(), score, reason);
        Ok(self.finish(Selection::Play(result)))
    }

    /// Close the timing window of the current selection
    fn finish(&mut self, selection: Selection) -> Selection {
        self.search.stats_mut().update_timing();
        info!("{}", self.search.stats());
        selection
    }

    /// Fixed opening move for White's first full moves, if enabled and legal
    fn opening_move(&self, board: &Board) -> Option<Move> {
        let params = self.search.params();
        if !params.enable_opening_override || board.turn() != Color::White {
            return None;
        }
        let index = usize::try_from(board.fullmoves()).ok()?.checked_sub(1)?;
        let san = params.opening.get(index)?;
        match board.parse_san(san) {
            Ok(mv) => Some(mv),
            Err(err) => {
                warn!("opening move skipped: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;

    fn played(selection: Selection) -> PlayResult {
        match selection {
            Selection::Play(result) => result,
            Selection::GameOver(terminal) => panic!("unexpected game over: {}", terminal),
        }
    }

    #[test]
    fn rook_mate_stops_early() {
        let mut board = Board::from_fen("6k1/8/6K1/8/8/8/8/R7 w - - 0 1").unwrap();
        let mut selector = MoveSelector::new(SearchParams::new().depth(2));
        let result = played(selector.select(&mut board).unwrap());
        assert_eq!(result.uci(), "a1a8");
        assert_eq!(result.score, Some(MATE));
        assert_eq!(result.reason, SelectionReason::ForcedMate);
        assert!(selector.search().stats().root_nodes <= board.legal_moves().len() as u64);
    }

    #[test]
    fn lost_position_falls_back_to_a_random_legal_move() {
        // Kg8 is forced and Ra8 mates
        let mut board = Board::from_fen("7k/8/6K1/8/8/8/8/R7 b - - 0 1").unwrap();
        let mut selector = MoveSelector::new(SearchParams::new().depth(2).seed(7));
        let result = played(selector.select(&mut board).unwrap());
        assert_eq!(result.reason, SelectionReason::RandomFallback);
        assert_eq!(result.uci(), "h8g8");
        assert_eq!(result.score, Some(-MATE));

        let mut selector =
            MoveSelector::new(SearchParams::new().depth(2).enable_random_fallback(false));
        let result = played(selector.select(&mut board).unwrap());
        assert_eq!(result.reason, SelectionReason::Searched);
    }

    #[test]
    fn fallback_draws_from_every_losing_move() {
        // Kg8, b6 and b5 all allow Ra8 mate
        let fen = "7k/1p6/6K1/8/8/8/8/R7 b - - 0 1";
        let legal: HashSet<String> = Board::from_fen(fen)
            .unwrap()
            .legal_moves()
            .iter()
            .map(move_to_uci)
            .collect();
        assert_eq!(legal.len(), 3);

        let mut seen = HashSet::new();
        for seed in 0..20 {
            let mut board = Board::from_fen(fen).unwrap();
            let mut selector = MoveSelector::new(SearchParams::new().depth(2).seed(seed));
            let result = played(selector.select(&mut board).unwrap());
            assert_eq!(result.reason, SelectionReason::RandomFallback, "seed {}", seed);
            assert_eq!(result.score, Some(-MATE));
            assert!(legal.contains(&result.uci()), "{} is not legal", result.uci());
            seen.insert(result.uci());
        }
        assert!(seen.len() > 1, "fallback always played {:?}", seen);
    }

    #[test]
    fn every_exit_records_search_time() {
        let mut selector =
            MoveSelector::new(SearchParams::new().enable_opening_override(true));

        let mut board = Board::new();
        let opening = played(selector.select(&mut board).unwrap());
        assert_eq!(opening.reason, SelectionReason::Opening);
        assert!(selector.search().stats().search_time > Duration::ZERO);

        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(matches!(
            selector.select(&mut board).unwrap(),
            Selection::GameOver(_)
        ));
        assert!(selector.search().stats().search_time > Duration::ZERO);
    }

    #[test]
    fn terminal_root_is_game_over() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut selector = MoveSelector::new(SearchParams::new());
        assert_eq!(
            selector.select(&mut board).unwrap(),
            Selection::GameOver(Terminal::Stalemate)
        );
    }

    #[test]
    fn opening_override_plays_fixed_moves() {
        let params = SearchParams::new().depth(2).enable_opening_override(true);
        let mut selector = MoveSelector::new(params);

        let mut board = Board::new();
        let first = played(selector.select(&mut board).unwrap());
        assert_eq!(first.uci(), "e2e4");
        assert_eq!(first.reason, SelectionReason::Opening);
        assert_eq!(first.score, None);

        board.push(&first.mv).unwrap();
        let reply = board.parse_san("e5").unwrap();
        board.push(&reply).unwrap();
        let second = played(selector.select(&mut board).unwrap());
        assert_eq!(second.uci(), "b1c3");

        // Black is never overridden
        board.push(&second.mv).unwrap();
        let third = played(selector.select(&mut board).unwrap());
        assert_ne!(third.reason, SelectionReason::Opening);
    }

    #[test]
    fn unplayable_opening_move_is_searched_instead() {
        let params = SearchParams::new()
            .depth(1)
            .enable_opening_override(true)
            .opening(["Ke2"]);
        let mut selector = MoveSelector::new(params);
        let mut board = Board::new();
        let result = played(selector.select(&mut board).unwrap());
        assert_eq!(result.reason, SelectionReason::Searched);
    }

    #[test]
    fn board_is_restored_after_selection() {
        let mut board = Board::new();
        let mut selector = MoveSelector::new(SearchParams::new().depth(2));
        played(selector.select(&mut board).unwrap());
        assert_eq!(board.ply(), 0);
        assert_eq!(board.fen(), crate::board::START_FEN);
    }
}

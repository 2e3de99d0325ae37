//! Alpha-beta search engine
//!
//! Fixed-depth negamax with alpha-beta pruning. Internally every node is
//! scored from the side to move; `search` converts to the caller's
//! perspective at the boundary, so the result is the same whichever color
//! the caller asks about, up to sign.

use std::path::Path;

use super::cache::{Bound, CacheKey, PositionCache};
use super::ordering::{CaptureFirstOrderer, MoveOrderer};
use super::params::SearchParams;
use super::stats::SearchStats;
use crate::board::{Board, Color};
use crate::error::EngineResult;
use crate::eval::{Evaluator, PieceSquareEvaluator, Score};

/// Wider than any score the evaluator produces
pub const INFINITE: Score = 30000;

/// Search engine parameterized by its leaf evaluator and move ordering
pub struct Search<E = PieceSquareEvaluator, O = CaptureFirstOrderer> {
    /// Leaf scorer
    evaluator: E,

    /// Move ordering policy
    orderer: O,

    /// Subtree scores, reused across calls on this instance
    cache: PositionCache,

    /// Search parameters
    params: SearchParams,

    /// Search statistics
    stats: SearchStats,
}

impl Search<PieceSquareEvaluator, CaptureFirstOrderer> {
    /// Classic evaluator with capture-first ordering
    pub fn new(params: SearchParams) -> Self {
        Self::with_parts(
            PieceSquareEvaluator::default(),
            CaptureFirstOrderer::default(),
            params,
        )
    }
}

impl<E: Evaluator, O: MoveOrderer> Search<E, O> {
    pub fn with_parts(evaluator: E, orderer: O, params: SearchParams) -> Self {
        Self {
            evaluator,
            orderer,
            cache: PositionCache::new(),
            params,
            stats: SearchStats::new(),
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    pub fn cache(&self) -> &PositionCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PositionCache {
        &mut self.cache
    }

    /// Get search statistics
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get search statistics (mutable)
    pub fn stats_mut(&mut self) -> &mut SearchStats {
        &mut self.stats
    }

    /// Static evaluation of `board` for `perspective`, counted in the stats
    pub fn evaluate(&mut self, board: &Board, perspective: Color) -> Score {
        self.stats.inc_evaluation();
        self.evaluator.evaluate(board, perspective)
    }

    /// Score `board` searched `depth` plies deep within `(alpha, beta)`,
    /// positive meaning good for `perspective`
    ///
    /// The board is returned in the state it was passed in, on success and
    /// on error alike. Only a move the oracle rejects or an unbalanced undo
    /// make this fail.
    pub fn search(
        &mut self,
        board: &mut Board,
        depth: u8,
        alpha: Score,
        beta: Score,
        perspective: Color,
    ) -> EngineResult<Score> {
        if board.turn() == perspective {
            self.negamax(board, depth, alpha, beta)
        } else {
            Ok(-self.negamax(board, depth, -beta, -alpha)?)
        }
    }

    /// Side-to-move negamax. Fails hard low (returns `alpha`), soft high.
    fn negamax(
        &mut self,
        board: &mut Board,
        depth: u8,
        mut alpha: Score,
        beta: Score,
    ) -> EngineResult<Score> {
        self.stats.inc_node();

        if depth == 0 {
            return Ok(self.evaluate(board, board.turn()));
        }

        let key = CacheKey::new(board, depth);
        if self.params.enable_cache {
            if let Some(score) = self.cache.probe(key, alpha, beta) {
                self.stats.inc_cache_hit();
                return Ok(score);
            }
        }

        let mut moves = board.legal_moves();
        if moves.is_empty() {
            // checkmate or stalemate, whatever the remaining depth
            return Ok(self.evaluate(board, board.turn()));
        }
        self.orderer.order(board, &mut moves);

        let original_alpha = alpha;
        for mv in &moves {
            let score = {
                let mut child = board.push_guard(mv)?;
                -self.negamax(&mut child, depth - 1, -beta, -alpha)?
            };

            if score >= beta {
                self.stats.inc_cutoff();
                self.store(key, score, Bound::Lower);
                return Ok(score);
            }
            if score > alpha {
                alpha = score;
            }
        }

        let bound = if alpha > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.store(key, alpha, bound);
        Ok(alpha)
    }

    fn store(&mut self, key: CacheKey, score: Score, bound: Bound) {
        if self.params.enable_cache {
            self.cache.put(key, score, bound);
            self.stats.inc_cache_store();
        }
    }

    /// Replace the cache with a snapshot written by the same evaluator
    pub fn load_cache(&mut self, path: &Path) -> EngineResult<usize> {
        self.cache = PositionCache::load(path, &self.evaluator.fingerprint())?;
        Ok(self.cache.len())
    }

    pub fn save_cache(&self, path: &Path) -> EngineResult<()> {
        self.cache.save(path, &self.evaluator.fingerprint())
    }
}

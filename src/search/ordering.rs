//! Move ordering
//!
//! Searching likely cutoff moves first shrinks the alpha-beta tree without
//! changing its result. Ordering is a pluggable policy so that the same
//! search can run with the capture-first heuristic or with the raw
//! enumeration order.

use std::cmp::Reverse;

use crate::board::{Board, Move};
use crate::eval::MaterialWeights;

/// Reorders candidate moves in place before a node searches them
pub trait MoveOrderer {
    fn order(&self, board: &Board, moves: &mut [Move]);
}

/// Captures before quiet moves; inside each group the more valuable moving
/// piece goes first. Ties keep enumeration order.
#[derive(Debug, Clone, Copy)]
pub struct CaptureFirstOrderer {
    weights: MaterialWeights,
}

impl Default for CaptureFirstOrderer {
    fn default() -> Self {
        Self::new(MaterialWeights::CLASSIC)
    }
}

impl CaptureFirstOrderer {
    pub fn new(weights: MaterialWeights) -> Self {
        Self { weights }
    }
}

impl MoveOrderer for CaptureFirstOrderer {
    fn order(&self, _board: &Board, moves: &mut [Move]) {
        // slice::sort_by_key is stable
        moves.sort_by_key(|mv| (!mv.is_capture(), Reverse(self.weights.value(mv.role()))));
    }
}

/// Leaves moves in the order the oracle produced them
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerationOrder;

impl MoveOrderer for EnumerationOrder {
    fn order(&self, _board: &Board, _moves: &mut [Move]) {}
}

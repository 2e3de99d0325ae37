//! Search statistics
//!
//! Tracks nodes visited, leaf evaluations, cutoffs, cache traffic and
//! timing for one move selection.

use std::fmt;
use std::time::{Duration, Instant};

/// Search statistics
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Total nodes visited, root moves included
    pub nodes: u64,

    /// Nodes at root ply
    pub root_nodes: u64,

    /// Static evaluations performed (leaves and terminal nodes)
    pub evaluations: u64,

    /// Beta cutoffs
    pub cutoffs: u64,

    /// Cache probes answered from a stored entry
    pub cache_hits: u64,

    /// Entries written to the cache
    pub cache_stores: u64,

    /// Search start time
    pub start_time: Option<Instant>,

    /// Time spent searching
    pub search_time: Duration,

    /// Nodes per second rate
    pub nps: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timing(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Update elapsed time and nodes per second
    pub fn update_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.search_time = start.elapsed();
            let elapsed_ms = self.search_time.as_millis() as u64;
            if elapsed_ms > 0 {
                self.nps = (self.nodes * 1000) / elapsed_ms;
            }
        }
    }

    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    pub fn inc_root_node(&mut self) {
        self.root_nodes += 1;
    }

    pub fn inc_evaluation(&mut self) {
        self.evaluations += 1;
    }

    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    pub fn inc_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn inc_cache_store(&mut self) {
        self.cache_stores += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes {} root {} evals {} cutoffs {} cache hits {} stores {} time {} ms nps {}",
            self.nodes,
            self.root_nodes,
            self.evaluations,
            self.cutoffs,
            self.cache_hits,
            self.cache_stores,
            self.search_time.as_millis(),
            self.nps
        )
    }
}

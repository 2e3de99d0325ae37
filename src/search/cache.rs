//! Position cache (transposition table) with bound-tagged entries
//!
//! Alpha-beta only returns an exact score when the true value falls inside
//! the window it was searched with. A fail-high return is a lower bound and
//! a fail-low return is an upper bound, so every entry records which of the
//! three it holds and `probe` reuses it only when that is enough to answer
//! the current window.
//!
//! Entries are keyed by the Zobrist hash of the position together with the
//! remaining depth. Nothing is evicted: the key space of one fixed-depth
//! search is bounded by the positions reachable at that depth.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::eval::Score;

/// Bumped whenever the snapshot layout or the key derivation changes
pub const SNAPSHOT_VERSION: u32 = 1;

/// What a stored score says about the true value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    /// The score is the value of the node
    Exact,
    /// Fail-high: the value is at least the score
    Lower,
    /// Fail-low: the value is at most the score
    Upper,
}

/// Position plus remaining depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: u64,
    pub depth: u8,
}

impl CacheKey {
    pub fn new(board: &Board, depth: u8) -> Self {
        Self {
            hash: board.zobrist(),
            depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub score: Score,
    pub bound: Bound,
}

impl CacheEntry {
    /// Score to return for a node searched with `(alpha, beta)`, if the
    /// entry is strong enough to decide it
    pub fn usable(&self, alpha: Score, beta: Score) -> Option<Score> {
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CacheSnapshot {
    version: u32,
    fingerprint: String,
    entries: Vec<(CacheKey, CacheEntry)>,
}

/// Memo of subtree scores owned by one search engine
#[derive(Debug, Default, Clone)]
pub struct PositionCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CacheKey) -> Option<CacheEntry> {
        self.entries.get(&key).copied()
    }

    /// Store a result. An exact entry is only replaced by another exact one.
    pub fn put(&mut self, key: CacheKey, score: Score, bound: Bound) {
        let entry = CacheEntry { score, bound };
        match self.entries.get(&key) {
            Some(existing) if existing.bound == Bound::Exact && bound != Bound::Exact => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    /// Window-aware lookup
    pub fn probe(&self, key: CacheKey, alpha: Score, beta: Score) -> Option<Score> {
        self.entries.get(&key)?.usable(alpha, beta)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write a snapshot tagged with the evaluator that produced the scores
    pub fn save(&self, path: &Path, fingerprint: &str) -> EngineResult<()> {
        let snapshot = CacheSnapshot {
            version: SNAPSHOT_VERSION,
            fingerprint: fingerprint.to_string(),
            entries: self.entries.iter().map(|(k, v)| (*k, *v)).collect(),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a snapshot, refusing one written by another evaluator or layout
    pub fn load(path: &Path, fingerprint: &str) -> EngineResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: CacheSnapshot = bincode::deserialize_from(reader)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EngineError::CacheFormat {
                message: format!(
                    "snapshot version {} (expected {})",
                    snapshot.version, SNAPSHOT_VERSION
                ),
            });
        }
        if snapshot.fingerprint != fingerprint {
            return Err(EngineError::CacheFormat {
                message: format!(
                    "snapshot written by evaluator '{}' (current '{}')",
                    snapshot.fingerprint, fingerprint
                ),
            });
        }

        Ok(Self {
            entries: snapshot.entries.into_iter().collect(),
        })
    }
}

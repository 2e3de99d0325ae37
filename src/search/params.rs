//! Search parameters and configuration
//!
//! Controls the fixed search depth, the position cache, and the root
//! selection policies (random fallback, opening override).

/// Default search depth in plies
pub const DEFAULT_DEPTH: u8 = 4;

/// Opening played by the override, one SAN move per full move
pub const DEFAULT_OPENING: [&str; 2] = ["e4", "Nc3"];

/// Search parameters for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Search depth in plies, counted from the root
    pub depth: u8,

    /// Memoize subtree scores in the position cache
    pub enable_cache: bool,

    /// Play a random legal move when every move loses to a forced mate
    pub enable_random_fallback: bool,

    /// Bypass the search on White's first full moves
    pub enable_opening_override: bool,

    /// SAN moves played by the opening override, indexed by full move - 1
    pub opening: Vec<String>,

    /// Seed for the fallback RNG (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            enable_cache: true,
            enable_random_fallback: true,
            enable_opening_override: false,
            opening: DEFAULT_OPENING.iter().map(|s| s.to_string()).collect(),
            seed: None,
        }
    }
}

impl SearchParams {
    /// Create new search params with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set search depth in plies (at least 1)
    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// Enable or disable the position cache
    pub fn enable_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Enable or disable the random move on forced loss
    pub fn enable_random_fallback(mut self, enable: bool) -> Self {
        self.enable_random_fallback = enable;
        self
    }

    /// Enable or disable the fixed opening
    pub fn enable_opening_override(mut self, enable: bool) -> Self {
        self.enable_opening_override = enable;
        self
    }

    /// Replace the SAN moves played by the opening override
    pub fn opening<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opening = moves.into_iter().map(Into::into).collect();
        self
    }

    /// Fix the fallback RNG seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

//! Search engine for FlowBot
//!
//! Negamax alpha-beta over the position oracle, with a bound-tagged
//! position cache and pluggable move ordering.

pub mod cache;
pub mod ordering;
pub mod params;
pub mod search;
pub mod stats;

pub use self::cache::{Bound, CacheEntry, CacheKey, PositionCache};
pub use self::ordering::{CaptureFirstOrderer, EnumerationOrder, MoveOrderer};
pub use self::params::SearchParams;
pub use self::search::{Search, INFINITE};
pub use self::stats::SearchStats;
pub use crate::board::Move;

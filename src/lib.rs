//! FlowBot: a fixed-depth alpha-beta chess move selector
//!
//! The host hands over a position once per turn and gets back one legal
//! move plus an optional score. Move generation and game rules come from
//! shakmaty; this crate supplies evaluation, search, and the root policies.

pub mod board;
pub mod error;
pub mod eval;
pub mod reference;
pub mod search;
pub mod selector;

pub use board::{Board, Terminal};
pub use error::{EngineError, EngineResult};
pub use eval::{EvalProfile, Evaluator, PieceSquareEvaluator, Score};
pub use search::{Search, SearchParams};
pub use selector::{MoveSelector, PlayResult, Selection, SelectionReason};

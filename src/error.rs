//! Error types for FlowBot
//!
//! Oracle contract violations are the only fatal class: they abort the
//! running search. Everything else (missing reference engine, unreadable
//! cache file) is reported so the caller can log it and carry on.

use thiserror::Error;

/// Errors raised by the engine and its collaborators
#[derive(Error, Debug)]
pub enum EngineError {
    /// FEN string could not be parsed or describes an impossible position
    #[error("Invalid FEN '{fen}': {message}")]
    InvalidFen { fen: String, message: String },

    /// A move that is not legal in the current position reached `push`
    #[error("Illegal move {uci} in position {fen}")]
    IllegalMove { uci: String, fen: String },

    /// `pop` was called with no pushed move to undo
    #[error("Cannot pop: no move has been pushed on top of {fen}")]
    UnbalancedPop { fen: String },

    /// SAN text is malformed or does not name a legal move
    #[error("Invalid SAN move '{san}' in position {fen}")]
    InvalidSan { san: String, fen: String },

    /// UCI text is malformed or does not name a legal move
    #[error("Invalid UCI move '{uci}' in position {fen}")]
    InvalidUciMove { uci: String, fen: String },

    /// Reading or writing a cache snapshot failed
    #[error("Cache file I/O failed: {0}")]
    CacheIo(#[from] std::io::Error),

    /// Cache snapshot could not be decoded or belongs to another profile
    #[error("Cache snapshot rejected: {message}")]
    CacheFormat { message: String },

    /// The external comparison engine could not be started
    #[error("Reference engine '{path}' unavailable: {message}")]
    ReferenceUnavailable { path: String, message: String },

    /// The external comparison engine answered with something unexpected
    #[error("Reference engine protocol error: {message}")]
    ReferenceProtocol { message: String },
}

impl EngineError {
    /// True for errors that mean the search state can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::IllegalMove { .. } | EngineError::UnbalancedPop { .. }
        )
    }
}

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        EngineError::CacheFormat {
            message: err.to_string(),
        }
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

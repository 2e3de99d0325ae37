//! Position oracle built on shakmaty
//!
//! `Board` keeps the full line of positions reached from its root so that
//! every `push` can be undone by a matching `pop`. The search never calls
//! `pop` directly: it goes through `MoveGuard`, which restores the position
//! when it leaves scope, including early returns and `?` propagation.

use std::ops::{Deref, DerefMut};

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position};

pub use shakmaty::{Bitboard, Color, Move, MoveList, Role, Square};

use crate::error::{EngineError, EngineResult};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Render a move in UCI long algebraic notation (e2e4, e7e8q, e1g1)
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// Game-ending state of a position with no legal moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Checkmate { loser: Color },
    Stalemate,
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Terminal::Checkmate { loser: Color::White } => write!(f, "0-1 (White is checkmated)"),
            Terminal::Checkmate { loser: Color::Black } => write!(f, "1-0 (Black is checkmated)"),
            Terminal::Stalemate => write!(f, "1/2-1/2 (stalemate)"),
        }
    }
}

/// Mutable chess position with push/pop history
#[derive(Debug, Clone)]
pub struct Board {
    /// Positions from the root to the current one; never empty
    history: Vec<Chess>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position
    pub fn new() -> Self {
        Self {
            history: vec![Chess::default()],
        }
    }

    /// Build a board from a FEN string
    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let parsed = Fen::from_ascii(fen.trim().as_bytes()).map_err(|e| EngineError::InvalidFen {
            fen: fen.to_string(),
            message: e.to_string(),
        })?;
        let pos: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|e| EngineError::InvalidFen {
                    fen: fen.to_string(),
                    message: e.to_string(),
                })?;
        Ok(Self { history: vec![pos] })
    }

    /// Replace the whole history with the position described by `fen`
    pub fn set_from_fen(&mut self, fen: &str) -> EngineResult<()> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    fn current(&self) -> &Chess {
        // history is never empty: constructors seed it and pop refuses the root
        &self.history[self.history.len() - 1]
    }

    /// Underlying shakmaty position
    pub fn position(&self) -> &Chess {
        self.current()
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.current().turn()
    }

    /// Full move number, starting at 1 and incremented after Black moves
    pub fn fullmoves(&self) -> u32 {
        self.current().fullmoves().get()
    }

    /// Number of moves currently pushed on top of the root position
    pub fn ply(&self) -> usize {
        self.history.len() - 1
    }

    pub fn legal_moves(&self) -> MoveList {
        self.current().legal_moves()
    }

    pub fn is_check(&self) -> bool {
        self.current().is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.current().is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.current().is_stalemate()
    }

    /// Checkmate or stalemate, found with a single move generation
    pub fn terminal(&self) -> Option<Terminal> {
        let pos = self.current();
        if !pos.legal_moves().is_empty() {
            return None;
        }
        if pos.is_check() {
            Some(Terminal::Checkmate {
                loser: pos.turn(),
            })
        } else {
            Some(Terminal::Stalemate)
        }
    }

    /// Occupancy of one piece kind for one color
    pub fn pieces(&self, role: Role, color: Color) -> Bitboard {
        let board = self.current().board();
        board.by_role(role) & board.by_color(color)
    }

    /// Squares occupied by any non-pawn, non-king piece of either color
    pub fn minor_and_major(&self) -> Bitboard {
        let board = self.current().board();
        board.occupied() & !board.pawns() & !board.kings()
    }

    /// Canonical FEN of the current position
    pub fn fen(&self) -> String {
        Fen::from_position(self.current().clone(), EnPassantMode::Legal).to_string()
    }

    /// 64-bit Zobrist key of the current position
    pub fn zobrist(&self) -> u64 {
        self.current()
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .0
    }

    /// Apply a move, failing if the oracle does not consider it legal
    pub fn push(&mut self, mv: &Move) -> EngineResult<()> {
        let current = self.current();
        if !current.is_legal(mv) {
            return Err(EngineError::IllegalMove {
                uci: move_to_uci(mv),
                fen: self.fen(),
            });
        }
        let mut next = current.clone();
        next.play_unchecked(mv);
        self.history.push(next);
        Ok(())
    }

    /// Undo the most recent `push`
    pub fn pop(&mut self) -> EngineResult<()> {
        if self.history.len() <= 1 {
            return Err(EngineError::UnbalancedPop { fen: self.fen() });
        }
        self.history.pop();
        Ok(())
    }

    /// Apply a move and return a guard that undoes it when dropped
    pub fn push_guard(&mut self, mv: &Move) -> EngineResult<MoveGuard<'_>> {
        let restore_len = self.history.len();
        self.push(mv)?;
        Ok(MoveGuard {
            board: self,
            restore_len,
        })
    }

    /// Resolve a SAN string (e4, Nc3, O-O, exd8=Q+) to a legal move
    pub fn parse_san(&self, san: &str) -> EngineResult<Move> {
        let invalid = || EngineError::InvalidSan {
            san: san.to_string(),
            fen: self.fen(),
        };
        let parsed: San = san.parse().map_err(|_| invalid())?;
        parsed.to_move(self.current()).map_err(|_| invalid())
    }

    /// Resolve a UCI string (e2e4, e7e8q) to a legal move
    pub fn parse_uci(&self, uci: &str) -> EngineResult<Move> {
        let wanted = uci.trim();
        self.legal_moves()
            .into_iter()
            .find(|mv| move_to_uci(mv) == wanted)
            .ok_or_else(|| EngineError::InvalidUciMove {
                uci: uci.to_string(),
                fen: self.fen(),
            })
    }
}

/// Scoped move application: the move is undone when the guard drops
pub struct MoveGuard<'a> {
    board: &'a mut Board,
    restore_len: usize,
}

impl Deref for MoveGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        // truncate rather than pop once: anything pushed through the guard goes too
        self.board.history.truncate(self.restore_len);
    }
}

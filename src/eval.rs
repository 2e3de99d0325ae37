//! Static evaluation: material balance plus piece-square tables
//!
//! Tables are written from White's point of view with rank 1 first, so
//! index 0 is a1 and index 63 is h8. Black pieces read the vertically
//! mirrored square (a8 reads the a1 entry).
//!
//! Checkmate and stalemate override every other term. The final score is
//! negated when the caller asks for Black's point of view.

use clap::ValueEnum;

use crate::board::{Board, Color, Role, Terminal};

/// Centipawn score
pub type Score = i32;

/// Forced win for the side the score belongs to
pub const MATE: Score = 9999;

/// Largest score a position that is not checkmate can get
pub const MAX_EVAL: Score = MATE - 1;

/// Dead draw
pub const DRAW: Score = 0;

/// Penalty applied to the side to move when it is in check
pub const CHECK_PENALTY: Score = 50;

/// Combined non-pawn, non-king material at or below which the endgame
/// tables take over for pawns and kings
pub const ENDGAME_MATERIAL: Score = 1600;

/// Convert a score seen by `side` into White's point of view
pub fn white_pov(score: Score, side: Color) -> Score {
    match side {
        Color::White => score,
        Color::Black => -score,
    }
}

// ============================================================================
// MATERIAL
// ============================================================================

/// Material weight of every piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialWeights {
    pub pawn: Score,
    pub knight: Score,
    pub bishop: Score,
    pub rook: Score,
    pub queen: Score,
    /// Nominal: both kings are always on the board, so this cancels out
    pub king: Score,
}

impl MaterialWeights {
    pub const CLASSIC: MaterialWeights = MaterialWeights {
        pawn: 100,
        knight: 320,
        bishop: 330,
        rook: 500,
        queen: 900,
        king: 20000,
    };

    pub const HEAVY_MINORS: MaterialWeights = MaterialWeights {
        pawn: 100,
        knight: 380,
        bishop: 390,
        rook: 500,
        queen: 900,
        king: 20000,
    };

    pub fn value(&self, role: Role) -> Score {
        match role {
            Role::Pawn => self.pawn,
            Role::Knight => self.knight,
            Role::Bishop => self.bishop,
            Role::Rook => self.rook,
            Role::Queen => self.queen,
            Role::King => self.king,
        }
    }
}

/// Named evaluation presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EvalProfile {
    /// Knight 320, bishop 330
    #[default]
    Classic,
    /// Knight 380, bishop 390: minor pieces are traded less eagerly
    HeavyMinors,
}

impl EvalProfile {
    pub fn weights(self) -> MaterialWeights {
        match self {
            EvalProfile::Classic => MaterialWeights::CLASSIC,
            EvalProfile::HeavyMinors => MaterialWeights::HEAVY_MINORS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EvalProfile::Classic => "classic",
            EvalProfile::HeavyMinors => "heavy-minors",
        }
    }
}

// ============================================================================
// PIECE-SQUARE TABLES (White's point of view, a1 = index 0)
// ============================================================================

#[rustfmt::skip]
const PAWN_PST: [Score; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10, -20, -20,  10,  10,   5,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,   5,  10,  25,  25,  10,   5,   5,
    10,  10,  20,  30,  30,  20,  10,  10,
    50,  50,  50,  50,  50,  50,  50,  50,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PST: [Score; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_PST: [Score; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_PST: [Score; 64] = [
     0,   0,   0,   5,   5,   0,   0,   0,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     5,  10,  10,  10,  10,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_PST: [Score; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -10,   5,   5,   5,   5,   5,   0, -10,
      0,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

/// Middlegame king: stay behind the pawns, preferably castled
#[rustfmt::skip]
const KING_PST: [Score; 64] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

/// Endgame pawn: every rank closer to promotion is worth more
#[rustfmt::skip]
const PAWN_ENDGAME_PST: [Score; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     10,  10,  10,  10,  10,  10,  10,  10,
     20,  20,  20,  20,  20,  20,  20,  20,
     40,  40,  40,  40,  40,  40,  40,  40,
     60,  60,  60,  60,  60,  60,  60,  60,
     80,  80,  80,  80,  80,  80,  80,  80,
    100, 100, 100, 100, 100, 100, 100, 100,
      0,   0,   0,   0,   0,   0,   0,   0,
];

/// Endgame king: leave the back rank
#[rustfmt::skip]
const KING_ENDGAME_PST: [Score; 64] = [
    -10, -10, -10, -10, -10, -10, -10, -10,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

/// Piece-square table for a piece kind
pub fn piece_square_table(role: Role, endgame: bool) -> &'static [Score; 64] {
    match (role, endgame) {
        (Role::Pawn, false) => &PAWN_PST,
        (Role::Pawn, true) => &PAWN_ENDGAME_PST,
        (Role::Knight, _) => &KNIGHT_PST,
        (Role::Bishop, _) => &BISHOP_PST,
        (Role::Rook, _) => &ROOK_PST,
        (Role::Queen, _) => &QUEEN_PST,
        (Role::King, false) => &KING_PST,
        (Role::King, true) => &KING_ENDGAME_PST,
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Static position scorer used at the leaves of the search
///
/// Implementations must be pure: the same position and perspective always
/// produce the same score, which is what makes cached subtree scores valid.
pub trait Evaluator {
    /// Score `board` for `perspective`: positive is good for that color
    fn evaluate(&self, board: &Board, perspective: Color) -> Score;

    /// Identifier stored alongside persisted cache entries
    fn fingerprint(&self) -> String;
}

/// Individual terms of one evaluation, all from White's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalBreakdown {
    pub material: Score,
    pub positional: Score,
    pub check: Score,
    pub terminal: Option<Terminal>,
    pub endgame: bool,
    pub total: Score,
}

/// Material + piece-square evaluator with check and terminal adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSquareEvaluator {
    profile: EvalProfile,
    weights: MaterialWeights,
    endgame_tables: bool,
}

impl Default for PieceSquareEvaluator {
    fn default() -> Self {
        Self::new(EvalProfile::Classic)
    }
}

impl PieceSquareEvaluator {
    pub fn new(profile: EvalProfile) -> Self {
        Self {
            profile,
            weights: profile.weights(),
            endgame_tables: false,
        }
    }

    /// Switch pawn and king tables once material thins out
    pub fn with_endgame_tables(mut self, enable: bool) -> Self {
        self.endgame_tables = enable;
        self
    }

    pub fn profile(&self) -> EvalProfile {
        self.profile
    }

    pub fn weights(&self) -> &MaterialWeights {
        &self.weights
    }

    fn is_endgame(&self, board: &Board) -> bool {
        if !self.endgame_tables {
            return false;
        }
        let mut remaining = 0;
        for color in Color::ALL {
            for role in [Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
                remaining += board.pieces(role, color).count() as Score * self.weights.value(role);
            }
        }
        remaining <= ENDGAME_MATERIAL
    }

    /// Evaluate and keep every term, White's point of view
    pub fn breakdown(&self, board: &Board) -> EvalBreakdown {
        let endgame = self.is_endgame(board);
        let mut material = 0;
        let mut positional = 0;

        for role in Role::ALL {
            let weight = self.weights.value(role);
            let table = piece_square_table(role, endgame);

            for sq in board.pieces(role, Color::White) {
                material += weight;
                positional += table[sq as usize];
            }
            for sq in board.pieces(role, Color::Black) {
                material -= weight;
                positional -= table[sq.flip_vertical() as usize];
            }
        }

        let check = if board.is_check() {
            white_pov(-CHECK_PENALTY, board.turn())
        } else {
            0
        };

        let terminal = board.terminal();
        let total = match terminal {
            Some(Terminal::Checkmate { loser }) => white_pov(-MATE, loser),
            Some(Terminal::Stalemate) => DRAW,
            // only the terminal override may reach the mate sentinel
            None => (material + positional + check).clamp(-MAX_EVAL, MAX_EVAL),
        };

        EvalBreakdown {
            material,
            positional,
            check,
            terminal,
            endgame,
            total,
        }
    }
}

impl Evaluator for PieceSquareEvaluator {
    fn evaluate(&self, board: &Board, perspective: Color) -> Score {
        white_pov(self.breakdown(board).total, perspective)
    }

    fn fingerprint(&self) -> String {
        if self.endgame_tables {
            format!("{}+endgame", self.profile.name())
        } else {
            self.profile.name().to_string()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! External reference engine
//!
//! Drives an independent UCI engine (Stockfish or anything that speaks the
//! protocol) to get a second opinion on a position. Purely diagnostic: the
//! result is logged next to our own choice and never fed back into it.

use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::{Board, Color};
use crate::error::{EngineError, EngineResult};

/// Evaluation reported by the reference engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceScore {
    Centipawns(i32),
    /// Moves to mate; negative when the side it is reported for gets mated
    Mate(i32),
}

impl ReferenceScore {
    /// UCI scores are relative to the side to move; flip them for Black
    pub fn to_white_pov(self, side_to_move: Color) -> Self {
        match (self, side_to_move) {
            (score, Color::White) => score,
            (ReferenceScore::Centipawns(cp), Color::Black) => ReferenceScore::Centipawns(-cp),
            (ReferenceScore::Mate(n), Color::Black) => ReferenceScore::Mate(-n),
        }
    }
}

impl fmt::Display for ReferenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceScore::Centipawns(cp) => write!(f, "cp {}", cp),
            ReferenceScore::Mate(n) => write!(f, "mate {}", n),
        }
    }
}

/// What the reference engine thought of one position, White's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceReport {
    pub score: ReferenceScore,
    pub bestmove: Option<String>,
}

/// Extract the score from an `info` line, if it carries one
pub fn parse_info_score(line: &str) -> Option<ReferenceScore> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.first() != Some(&"info") {
        return None;
    }

    let mut i = 1usize;
    while i < parts.len() {
        if parts[i] == "score" && i + 2 < parts.len() {
            let value: i32 = parts[i + 2].parse().ok()?;
            return match parts[i + 1] {
                "cp" => Some(ReferenceScore::Centipawns(value)),
                "mate" => Some(ReferenceScore::Mate(value)),
                _ => None,
            };
        }
        i += 1;
    }
    None
}

/// Move from a `bestmove` line; `(none)` and `0000` mean there is none
pub fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    Some(
        parts
            .next()
            .filter(|mv| *mv != "(none)" && *mv != "0000")
            .map(str::to_string),
    )
}

/// Wall-clock limit for a whole conversation with the reference engine
pub const DEFAULT_REFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Lines buffered from the engine before its reader thread blocks
const LINE_BUFFER: usize = 1024;

/// Launch configuration for the reference engine
#[derive(Debug, Clone)]
pub struct ReferenceEngine {
    path: String,
    depth: u8,
    timeout: Duration,
}

impl ReferenceEngine {
    pub fn new(path: impl Into<String>, depth: u8) -> Self {
        Self {
            path: path.into(),
            depth: depth.max(1),
            timeout: DEFAULT_REFERENCE_TIMEOUT,
        }
    }

    /// Give up on the engine after `timeout`, handshake included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start the engine, analyse `board` to the configured depth, shut it down
    pub fn evaluate(&self, board: &Board) -> EngineResult<ReferenceReport> {
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| EngineError::ReferenceUnavailable {
                path: self.path.clone(),
                message: err.to_string(),
            })?;

        let outcome = self.converse(&mut child, board);
        // the engine may already have exited on its own
        let _ = child.kill();
        let _ = child.wait();
        outcome
    }

    fn converse(&self, child: &mut Child, board: &Board) -> EngineResult<ReferenceReport> {
        let missing = |what: &str| EngineError::ReferenceProtocol {
            message: format!("no {} pipe", what),
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;

        let (tx, rx) = mpsc::sync_channel(LINE_BUFFER);
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut session = Session {
            stdin,
            rx,
            deadline: Instant::now() + self.timeout,
        };

        session.send("uci")?;
        session.wait_for("uciok")?;
        session.send("isready")?;
        session.wait_for("readyok")?;
        session.send(&format!("position fen {}", board.fen()))?;
        session.send(&format!("go depth {}", self.depth))?;

        let mut score = None;
        loop {
            let line = session.read_line()?;
            if let Some(found) = parse_info_score(&line) {
                score = Some(found);
            } else if let Some(bestmove) = parse_bestmove(&line) {
                let _ = session.send("quit");
                let score = score.ok_or_else(|| EngineError::ReferenceProtocol {
                    message: "bestmove arrived without a score".to_string(),
                })?;
                return Ok(ReferenceReport {
                    score: score.to_white_pov(board.turn()),
                    bestmove,
                });
            }
        }
    }
}

struct Session {
    stdin: ChildStdin,
    rx: Receiver<String>,
    deadline: Instant,
}

impl Session {
    fn send(&mut self, command: &str) -> EngineResult<()> {
        debug!("reference << {}", command);
        writeln!(self.stdin, "{}", command)
            .and_then(|_| self.stdin.flush())
            .map_err(|err| EngineError::ReferenceProtocol {
                message: format!("write '{}': {}", command, err),
            })
    }

    /// Next line from the engine, failing once the deadline has passed
    fn read_line(&mut self) -> EngineResult<String> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let line = self.rx.recv_timeout(remaining).map_err(|err| {
            let message = match err {
                RecvTimeoutError::Timeout => "timed out waiting for the engine".to_string(),
                RecvTimeoutError::Disconnected => "engine closed its output".to_string(),
            };
            EngineError::ReferenceProtocol { message }
        })?;
        let line = line.trim_end().to_string();
        debug!("reference >> {}", line);
        Ok(line)
    }

    fn wait_for(&mut self, token: &str) -> EngineResult<()> {
        loop {
            if self.read_line()?.trim() == token {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_centipawn_and_mate_scores() {
        let line = "info depth 12 seldepth 18 multipv 1 score cp 34 nodes 50211 pv e2e4 e7e5";
        assert_eq!(parse_info_score(line), Some(ReferenceScore::Centipawns(34)));

        let line = "info depth 5 score mate -2 nodes 900 pv h8g8";
        assert_eq!(parse_info_score(line), Some(ReferenceScore::Mate(-2)));
    }

    #[test]
    fn ignores_lines_without_a_score() {
        assert_eq!(parse_info_score("info string NNUE enabled"), None);
        assert_eq!(parse_info_score("info depth 3 currmove e2e4"), None);
        assert_eq!(parse_info_score("bestmove e2e4"), None);
        assert_eq!(parse_info_score("info score cp"), None);
        assert_eq!(parse_info_score(""), None);
    }

    #[test]
    fn parses_bestmove_lines() {
        assert_eq!(
            parse_bestmove("bestmove e2e4 ponder e7e5"),
            Some(Some("e2e4".to_string()))
        );
        assert_eq!(parse_bestmove("bestmove (none)"), Some(None));
        assert_eq!(parse_bestmove("info depth 1"), None);
    }

    #[test]
    fn scores_are_flipped_for_black() {
        let score = ReferenceScore::Centipawns(120);
        assert_eq!(score.to_white_pov(Color::White), score);
        assert_eq!(score.to_white_pov(Color::Black), ReferenceScore::Centipawns(-120));
        assert_eq!(
            ReferenceScore::Mate(3).to_white_pov(Color::Black),
            ReferenceScore::Mate(-3)
        );
        assert_eq!(ReferenceScore::Mate(-1).to_string(), "mate -1");
    }

    #[cfg(unix)]
    fn assert_times_out(program: &str) {
        if !std::path::Path::new(program).exists() {
            return;
        }
        let engine = ReferenceEngine::new(program, 8).with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = engine.evaluate(&Board::new()).unwrap_err();
        assert!(
            matches!(&err, EngineError::ReferenceProtocol { message } if message.contains("timed out")),
            "{}: {}",
            program,
            err
        );
        assert!(!err.is_fatal());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn silent_engine_times_out() {
        // echoes our commands back but never answers uciok
        assert_times_out("/bin/cat");
    }

    #[cfg(unix)]
    #[test]
    fn chatty_engine_times_out() {
        // streams lines forever without ever answering
        assert_times_out("/usr/bin/yes");
    }

    #[test]
    fn default_timeout_is_kept_unless_overridden() {
        let engine = ReferenceEngine::new("stockfish", 0);
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.timeout(), DEFAULT_REFERENCE_TIMEOUT);
        let engine = engine.with_timeout(Duration::from_secs(2));
        assert_eq!(engine.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn missing_binary_is_reported_as_unavailable() {
        let engine = ReferenceEngine::new("/nonexistent/flowbot-reference-engine", 8);
        let err = engine.evaluate(&Board::new()).unwrap_err();
        assert!(matches!(err, EngineError::ReferenceUnavailable { .. }));
        assert!(!err.is_fatal());
    }
}

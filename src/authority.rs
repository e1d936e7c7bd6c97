use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, EnPassantMode, File, Move, Position, Square};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    White,
    Black,
}

/// The board coordinates a move resolved to, as square names ("e2", "e4").
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedMove {
    pub from: String,
    pub to: String,
}

/// The move-legality authority: validates a move in short algebraic notation
/// against the live position, applies it, and reports the squares it touched.
/// Cloning snapshots the whole replay state, which is what the merger relies
/// on at variation branch points.
pub trait LegalityAuthority: Clone {
    /// Plays `san` against the current position. Returns `None` and leaves the
    /// position untouched when the move is illegal or unparseable.
    fn play_san(&mut self, san: &str) -> Option<PlayedMove>;

    /// Reverts to the previous position. Returns false at the start position.
    fn undo(&mut self) -> bool;

    /// Returns to the start position.
    fn reset(&mut self);

    /// The current position in FEN.
    fn fen(&self) -> String;

    fn turn(&self) -> Color;
}

/// Default authority backed by shakmaty. Keeps the full position stack so
/// that undo is a pop.
#[derive(Clone)]
pub struct ShakmatyAuthority {
    initial: Chess,
    stack: Vec<Chess>,
}

impl ShakmatyAuthority {
    pub fn new() -> ShakmatyAuthority {
        ShakmatyAuthority {
            initial: Chess::default(),
            stack: Vec::new(),
        }
    }

    fn current(&self) -> &Chess {
        self.stack.last().unwrap_or(&self.initial)
    }

    /// Squares to show for a move. Castling is reported king-square to
    /// king-destination, not to the rook square shakmaty encodes.
    fn squares_of(m: &Move) -> (String, String) {
        match m {
            Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() {
                    File::G
                } else {
                    File::C
                };
                let to = Square::from_coords(file, king.rank());
                (king.to_string(), to.to_string())
            }
            _ => (
                m.from().map(|s| s.to_string()).unwrap_or_default(),
                m.to().to_string(),
            ),
        }
    }
}

impl Default for ShakmatyAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl LegalityAuthority for ShakmatyAuthority {
    fn play_san(&mut self, san: &str) -> Option<PlayedMove> {
        let san: SanPlus = san.parse().ok()?;
        let pos = self.current();
        let m = san.san.to_move(pos).ok()?;
        let (from, to) = Self::squares_of(&m);

        let mut next = pos.clone();
        next.play_unchecked(m);
        self.stack.push(next);

        Some(PlayedMove { from, to })
    }

    fn undo(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    fn reset(&mut self) {
        self.stack.clear();
    }

    fn fen(&self) -> String {
        Fen::from_position(self.current(), EnPassantMode::Legal).to_string()
    }

    fn turn(&self) -> Color {
        match self.current().turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_play_san_resolves_squares() {
        let mut authority = ShakmatyAuthority::new();
        let played = authority.play_san("e4").unwrap();

        assert_eq!(played, PlayedMove { from: "e2".to_string(), to: "e4".to_string() });
        assert_eq!(authority.turn(), Color::Black);
    }

    #[test]
    fn test_play_san_rejects_illegal_move() {
        let mut authority = ShakmatyAuthority::new();
        let fen_before = authority.fen();

        assert!(authority.play_san("Ke2").is_none());
        assert!(authority.play_san("not a move").is_none());
        assert_eq!(authority.fen(), fen_before);
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let mut authority = ShakmatyAuthority::new();
        authority.play_san("e4").unwrap();
        authority.play_san("e5").unwrap();

        assert!(authority.undo());
        assert_eq!(authority.turn(), Color::Black);
        assert!(authority.undo());
        assert_eq!(authority.fen(), START_FEN);
        assert!(!authority.undo());
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut authority = ShakmatyAuthority::new();
        authority.play_san("d4").unwrap();
        authority.play_san("d5").unwrap();
        authority.reset();

        assert_eq!(authority.fen(), START_FEN);
    }

    #[test]
    fn test_castling_reported_as_king_move() {
        let mut authority = ShakmatyAuthority::new();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O"] {
            assert!(authority.play_san(san).is_some(), "failed on {}", san);
        }

        // Replay the final move on a fresh clone to read its squares
        let mut replay = ShakmatyAuthority::new();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"] {
            replay.play_san(san);
        }
        let castle = replay.play_san("O-O").unwrap();
        assert_eq!(castle, PlayedMove { from: "e1".to_string(), to: "g1".to_string() });
    }

    #[test]
    fn test_clone_is_an_independent_snapshot() {
        let mut authority = ShakmatyAuthority::new();
        authority.play_san("e4").unwrap();

        let mut snapshot = authority.clone();
        snapshot.play_san("c5").unwrap();

        assert_eq!(authority.turn(), Color::Black);
        assert_eq!(snapshot.turn(), Color::White);
    }
}

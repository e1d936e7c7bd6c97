//! Opening tree engine for exploring a personal chess repertoire.
//!
//! A repertoire file holds one annotated game per opening. Loading it splits
//! the file into per-game chunks, parses each independently, and merges the
//! results into one deduplicated move tree tagged with provenance. The
//! navigation state machine then walks that tree move by move, keeping the
//! live position and the board view in sync.

pub mod authority;
pub mod codec;
pub mod navigate;
pub mod pgn;
pub mod session;
pub mod tree;

pub use authority::{Color, LegalityAuthority, PlayedMove, ShakmatyAuthority};
pub use navigate::{BoardView, NavigationState};
pub use session::Session;
pub use tree::{MoveNode, NodeId, OpeningTree};

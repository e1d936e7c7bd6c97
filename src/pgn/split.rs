use tracing::debug;

use crate::pgn::parse::{parse_game, GameRecord};

/// Result of parsing a whole repertoire file. Both lists can be non-empty at
/// the same time; a malformed game does not take its neighbours down with it.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub games: Vec<GameRecord>,
    pub errors: Vec<String>,
}

/// The tag that opens every game of a repertoire file. Used to re-segment the
/// raw text so each game parses independently.
const GAME_MARKER: &str = "[Event";

/// Separator inserted before each game marker. Control character, cannot
/// appear in PGN text.
const SEPARATOR: char = '\u{1}';

const RESULT_MARKERS: [&str; 4] = ["*", "1-0", "0-1", "1/2-1/2"];

fn split_into_chunks(text: &str) -> Vec<String> {
    text.replace(GAME_MARKER, &format!("{}{}", SEPARATOR, GAME_MARKER))
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// A final game whose move list was never terminated still imports with all
/// its moves captured.
fn ensure_terminated(chunk: &str) -> String {
    if RESULT_MARKERS.iter().any(|marker| chunk.ends_with(marker)) {
        chunk.to_string()
    } else {
        format!("{} *", chunk)
    }
}

/// Parses a multi-game repertoire file, isolating per-game failures.
///
/// Chunks that fail to parse contribute an error message; chunks that parse
/// but carry no usable opening name (typically blank trailing content) are
/// dropped silently.
pub fn parse_file(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    // Error labels count marker-opened chunks only, so preamble text ahead
    // of the first game never shifts the numbering users see.
    let mut game_number = 0usize;
    for chunk in split_into_chunks(text) {
        let is_game = chunk.starts_with(GAME_MARKER);
        if is_game {
            game_number += 1;
        }
        match parse_game(&ensure_terminated(&chunk)) {
            Ok(game) => {
                if game.opening_name.trim().is_empty() {
                    debug!(game_number, "dropping game chunk without an opening name");
                    continue;
                }
                outcome.games.push(game);
            }
            Err(e) => {
                if is_game {
                    outcome.errors.push(format!("game {}: {}", game_number, e));
                } else {
                    outcome.errors.push(format!("preamble: {}", e));
                }
            }
        }
    }

    outcome
}

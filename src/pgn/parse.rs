use indexmap::IndexMap;

use crate::pgn::error::PgnParseError;
use crate::pgn::tokenize::{tokenize_pgn, PgnToken};

/// One move of a game, with the commentary and alternate continuations the
/// source attached to it. A variation branch is an alternative *to* this move,
/// starting from the position before it.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntry {
    pub san: String,
    pub comments: Vec<String>,
    pub variations: Vec<Vec<MoveEntry>>,
}

impl MoveEntry {
    fn new(san: String) -> MoveEntry {
        MoveEntry {
            san,
            comments: Vec::new(),
            variations: Vec::new(),
        }
    }
}

/// One parsed game of a repertoire file. The opening name comes from the
/// `Event` tag; the remaining tags are kept in source order.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub tags: IndexMap<String, String>,
    pub opening_name: String,
    pub moves: Vec<MoveEntry>,
}

fn validate_tag_placement(tokens: &[PgnToken]) -> Result<(), PgnParseError> {
    let mut can_tag_be_placed = true;

    for token in tokens {
        match token {
            PgnToken::Tag(tag) => {
                if !can_tag_be_placed {
                    return Err(PgnParseError::InvalidTagPlacement(tag.clone()));
                }
            }
            _ => {
                can_tag_be_placed = false;
            }
        }
    }

    Ok(())
}

fn validate_result_placement(tokens: &[PgnToken]) -> Result<(), PgnParseError> {
    let mut result_placed = false;

    for token in tokens {
        if let PgnToken::Result(result) = token {
            if result_placed {
                return Err(PgnParseError::InvalidResultPlacement(result.clone()));
            }
            result_placed = true;
        }
    }

    Ok(())
}

/// Ensure that all variations start after a move
fn validate_variation_start_placement(tokens: &[PgnToken]) -> Result<(), PgnParseError> {
    let mut last_token_was_move = false;

    for token in tokens {
        match token {
            PgnToken::Move(_) => {
                last_token_was_move = true;
            }
            PgnToken::StartVariation => {
                if !last_token_was_move {
                    return Err(PgnParseError::InvalidVariationStart(
                        "Variation does not start after a move".to_string(),
                    ));
                }
                last_token_was_move = false;
            }
            PgnToken::MoveNumberAndPeriods(_, _) | PgnToken::Tag(_) | PgnToken::Result(_) => {
                last_token_was_move = false;
            }
            _ => {}
        }
    }

    Ok(())
}

fn validate_variation_closure(tokens: &[PgnToken]) -> Result<(), PgnParseError> {
    let mut open_variations = 0;

    for token in tokens {
        match token {
            PgnToken::StartVariation => {
                open_variations += 1;
            }
            PgnToken::EndVariation => {
                open_variations -= 1;
                if open_variations < 0 {
                    return Err(PgnParseError::InvalidVariationClosure(
                        "There is no open variation".to_string(),
                    ));
                }
            }
            _ => {}
        }
    }

    if open_variations != 0 {
        return Err(PgnParseError::InvalidVariationClosure(
            "Variation is not closed".to_string(),
        ));
    }

    Ok(())
}

fn validate_move_numbers(tokens: &[PgnToken]) -> Result<(), PgnParseError> {
    let mut stack = Vec::new();
    let mut halfmove: u16 = 1;

    for token in tokens {
        match token {
            PgnToken::MoveNumberAndPeriods(found_fullmove, _) => {
                let expected_fullmove = (halfmove + 1) / 2;
                if *found_fullmove != expected_fullmove {
                    return Err(PgnParseError::IncorrectMoveNumber(found_fullmove.to_string()));
                }
            }
            PgnToken::Move(_) => {
                halfmove += 1;
            }
            PgnToken::StartVariation => {
                stack.push(halfmove);
                halfmove -= 1;
            }
            PgnToken::EndVariation => {
                halfmove = match stack.pop() {
                    Some(halfmove) => halfmove,
                    None => {
                        return Err(PgnParseError::InvalidVariationClosure(
                            "There is no open variation".to_string(),
                        ))
                    }
                };
            }
            _ => {}
        }
    }

    Ok(())
}

fn validate(tokens: &[PgnToken]) -> Result<(), PgnParseError> {
    validate_tag_placement(tokens)?;
    validate_result_placement(tokens)?;
    validate_variation_start_placement(tokens)?;
    validate_variation_closure(tokens)?;
    validate_move_numbers(tokens)?;

    Ok(())
}

/// Parses a tag pair body like `Event "Italian Game"`. The first value wins
/// when a tag is repeated.
fn parse_tag(raw: &str) -> Option<(String, String)> {
    let (key, rest) = raw.split_once(char::is_whitespace)?;
    let value = rest.trim().trim_matches('"');
    Some((key.to_string(), value.to_string()))
}

/// Parses one game chunk into a [`GameRecord`].
///
/// Legality of the moves is not checked here; the merger replays them against
/// the rules authority and resolves board coordinates at that point.
pub fn parse_game(chunk: &str) -> Result<GameRecord, PgnParseError> {
    let tokens = tokenize_pgn(chunk)?;
    parse_game_tokens(&tokens)
}

fn parse_game_tokens(tokens: &[PgnToken]) -> Result<GameRecord, PgnParseError> {
    validate(tokens)?;

    let mut tags: IndexMap<String, String> = IndexMap::new();

    // One frame per open variation; frame 0 is the main line. A popped frame
    // attaches to the last move of the enclosing line as an alternative to it.
    let mut frames: Vec<Vec<MoveEntry>> = vec![Vec::new()];

    for token in tokens {
        match token {
            PgnToken::Tag(tag) => {
                if let Some((key, value)) = parse_tag(tag) {
                    tags.entry(key).or_insert(value);
                }
            }
            PgnToken::Move(san) => {
                if let Some(frame) = frames.last_mut() {
                    frame.push(MoveEntry::new(san.clone()));
                }
            }
            PgnToken::Comment(comment) => {
                let trimmed = comment.trim();
                if trimmed.is_empty() {
                    continue;
                }
                // A comment before the first move of a line has no move to
                // attach to and is dropped
                if let Some(entry) = frames.last_mut().and_then(|f| f.last_mut()) {
                    entry.comments.push(trimmed.to_string());
                }
            }
            PgnToken::StartVariation => {
                frames.push(Vec::new());
            }
            PgnToken::EndVariation => {
                let line = match frames.pop() {
                    Some(line) => line,
                    None => {
                        return Err(PgnParseError::InvalidVariationClosure(
                            "There is no open variation".to_string(),
                        ))
                    }
                };
                match frames.last_mut().and_then(|f| f.last_mut()) {
                    Some(entry) => entry.variations.push(line),
                    None => {
                        return Err(PgnParseError::InvalidVariationStart(
                            "Variation does not start after a move".to_string(),
                        ))
                    }
                }
            }
            PgnToken::MoveNumberAndPeriods(_, _)
            | PgnToken::Annotation(_)
            | PgnToken::Result(_) => {}
        }
    }

    let moves = frames.pop().unwrap_or_default();
    let opening_name = tags.get("Event").cloned().unwrap_or_default();

    Ok(GameRecord {
        tags,
        opening_name,
        moves,
    })
}

use std::iter::Peekable;
use std::str::Chars;

use crate::pgn::error::PgnParseError;

/// Represents a token in a PGN string
#[derive(Debug, PartialEq, Clone)]
pub enum PgnToken {
    Tag(String),                       // Tag pair content (e.g., `Event "Italian Game"`)
    Move(String),                      // A move in short algebraic notation (e.g., "e4", "Nf3#", "O-O")
    MoveNumberAndPeriods(u16, usize),  // A move number and its trailing periods (e.g., "1.", "3...")
    StartVariation,                    // '('
    EndVariation,                      // ')'
    Comment(String),                   // Brace comment content (e.g., "{a sharp line}")
    Annotation(String),                // Suffix or NAG annotation ("!", "?!", "$19", ...)
    Result(String),                    // Game terminator ("1-0", "0-1", "1/2-1/2", "*")
}

/// Tokenizes a PGN string into a list of PgnTokens.
///
/// Semi-colon rest-of-line comments are skipped. Suffix annotations glued to a
/// move ("e4!?") are split into a separate `Annotation` token so that the move
/// text stays a clean merge key.
pub fn tokenize_pgn(pgn: &str) -> Result<Vec<PgnToken>, PgnParseError> {
    let mut tokens = Vec::new();
    let mut chars = pgn.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            _ if ch.is_ascii_whitespace() => {
                chars.next();
            }
            ';' => {
                // Rest-of-line comment
                collect_while(&mut chars, |c| c != '\n');
            }
            '[' => {
                chars.next();
                let tag = collect_while(&mut chars, |c| c != ']');
                if chars.next().is_none() {
                    return Err(PgnParseError::InvalidTag(tag));
                }
                tokens.push(PgnToken::Tag(tag));
            }
            '(' => {
                tokens.push(PgnToken::StartVariation);
                chars.next();
            }
            ')' => {
                tokens.push(PgnToken::EndVariation);
                chars.next();
            }
            '{' => {
                chars.next();
                let comment = collect_while(&mut chars, |c| c != '}');
                if chars.next().is_none() {
                    return Err(PgnParseError::InvalidComment(comment));
                }
                tokens.push(PgnToken::Comment(comment));
            }
            '!' | '?' => {
                let annotation = collect_while(&mut chars, |c| c == '!' || c == '?');
                tokens.push(PgnToken::Annotation(annotation));
            }
            '$' => {
                chars.next();
                let nag = collect_while(&mut chars, |c| c.is_ascii_digit());
                tokens.push(PgnToken::Annotation(format!("${}", nag)));
            }
            '*' => {
                tokens.push(PgnToken::Result("*".to_string()));
                chars.next();
            }
            _ if ch.is_ascii_digit() => {
                // A move number, a result ("1-0", "0-1", "1/2-1/2"), or
                // zero-notation castling ("0-0", "0-0-0")
                let word = collect_while(&mut chars, |c| {
                    !c.is_ascii_whitespace()
                        && c != '.'
                        && c != ')'
                        && c != '('
                        && c != '{'
                        && c != '!'
                        && c != '?'
                });
                if word.starts_with("0-0") {
                    tokens.push(PgnToken::Move(word.replace('0', "O")));
                } else if word.contains('-') {
                    tokens.push(PgnToken::Result(word));
                } else if let Ok(num) = word.parse::<u16>() {
                    let periods = collect_while(&mut chars, |c| c == '.');
                    tokens.push(PgnToken::MoveNumberAndPeriods(num, periods.len()));
                } else {
                    return Err(PgnParseError::InvalidToken(word));
                }
            }
            _ if ch.is_alphabetic() => {
                // A move ("e4", "Nf3", "O-O", "exd8=Q+", ...), possibly with
                // glued suffix annotations
                let word = collect_while(&mut chars, |c| {
                    !c.is_ascii_whitespace() && c != ')' && c != '(' && c != '{' && c != '!' && c != '?'
                });
                tokens.push(PgnToken::Move(word));
            }
            _ => {
                let invalid = collect_while(&mut chars, |c| !c.is_ascii_whitespace());
                return Err(PgnParseError::InvalidToken(invalid));
            }
        }
    }

    Ok(tokens)
}

/// Collects characters from the iterator while the condition holds
fn collect_while(chars: &mut Peekable<Chars>, condition: fn(char) -> bool) -> String {
    let mut content = String::new();

    while let Some(&ch) = chars.peek() {
        if !condition(ch) {
            break;
        }

        content.push(ch);
        chars.next();
    }

    content
}

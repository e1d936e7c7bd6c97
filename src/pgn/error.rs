use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum PgnParseError {
    InvalidTag(String),
    IncorrectMoveNumber(String),
    InvalidComment(String),
    InvalidVariationStart(String),
    InvalidVariationClosure(String),
    InvalidToken(String),
    InvalidResult(String),
    InvalidTagPlacement(String),
    InvalidResultPlacement(String),
}

impl Display for PgnParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PgnParseError::InvalidTag(tag) => write!(f, "Invalid tag: {}", tag),
            PgnParseError::IncorrectMoveNumber(num) => write!(f, "Incorrect move number: {}", num),
            PgnParseError::InvalidComment(comment) => write!(f, "Invalid comment: {}", comment),
            PgnParseError::InvalidVariationStart(variation) => write!(f, "Invalid variation start: {}", variation),
            PgnParseError::InvalidVariationClosure(variation) => write!(f, "Unfinished variation: {}", variation),
            PgnParseError::InvalidToken(token) => write!(f, "Invalid token: {}", token),
            PgnParseError::InvalidResult(result) => write!(f, "Invalid result: {}", result),
            PgnParseError::InvalidTagPlacement(tag) => write!(f, "Invalid tag placement: {}", tag),
            PgnParseError::InvalidResultPlacement(result) => write!(f, "Invalid result placement: {}", result),
        }
    }
}

impl Error for PgnParseError {}

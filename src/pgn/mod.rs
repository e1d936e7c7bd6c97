mod error;
mod parse;
mod split;
mod tokenize;

pub use error::*;
pub use parse::*;
pub use split::*;
pub use tokenize::*;

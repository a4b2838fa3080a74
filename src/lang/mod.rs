/*!
# Rust Language Module

This Rust module provides lexical analysis and parsing of the BASIC language.

*/

pub type LineNumber = u32;
pub type Column = std::ops::Range<usize>;

pub const MAX_LINE_NUMBER: LineNumber = 65529;
pub const MAX_LINE_LEN: usize = 1024;

#[macro_use]
mod error;
mod lex;
mod line;
mod parse;

pub mod ast;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use error::ErrorKind;
pub use lex::lex;
pub use line::Line;
pub use parse::parse;
pub use parse::parse_expression;
pub use parse::parse_print;
pub use parse::PrintItem;

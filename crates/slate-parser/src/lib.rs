//! Slate parser: token stream to AST.

mod parse_expr;
mod parse_stmt;
mod parse_type;
mod parser;

pub use parser::{ParseResult, Parser};

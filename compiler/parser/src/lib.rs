use thiserror::Error;

pub use expr::{parse, parse_assignment, MAX_NESTING};
pub use parser::Parser;

mod expr;
mod parser;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: no matching ')' for this '('")]
    UnmatchedParen { line: u32 },
    #[error("unexpected end of input inside an expression")]
    UnexpectedEnd,
    #[error("line {line}: '{text}' is not a binary operator")]
    InvalidOperator { line: u32, text: String },
    #[error("line {line}: malformed call")]
    MalformedCall { line: u32 },
    #[error("line {line}: expected an operand, found '{found}'")]
    ExpectedOperand { line: u32, found: String },
    #[error("line {line}: expression nested deeper than {limit} levels")]
    NestingTooDeep { line: u32, limit: usize },
    #[error("line {line}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        line: u32,
        expected: &'static str,
        found: String,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

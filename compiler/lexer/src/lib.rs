use std::fmt::{Display, Formatter};

use thiserror::Error;

pub use lex::Lexer;

mod lex;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    #[error("line {line}: unexpected character '{ch}'")]
    UnexpectedChar { line: u32, ch: char },
    #[error("line {line}: unterminated literal")]
    UnterminatedLiteral { line: u32 },
}

/// A classified slice of the source text. Tokens borrow from the source and
/// are cheap to copy, so the parser and the AST hold them by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub text: &'src str,
    pub kind: TokenKind,
    pub line: u32,
}

impl<'src> Token<'src> {
    pub fn new(text: &'src str, kind: TokenKind, line: u32) -> Self {
        Self { text, kind, line }
    }

    /// True for a punctuator with exactly this spelling
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.text == punct
    }

    /// Tokens that may open a declaration
    pub fn is_decl_specifier(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::StorageClass
                | TokenKind::TypeSpecifier
                | TokenKind::TypeQualifier
                | TokenKind::FuncSpecifier
                | TokenKind::AlignmentSpecifier
        )
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    StringLiteral,
    CharLiteral,
    IntLiteral,
    Identifier,

    // Declaration words
    StorageClass,
    TypeSpecifier,
    TypeQualifier,
    FuncSpecifier,
    AlignmentSpecifier,

    Punctuator,
    Keyword,
}

pub const STORAGE_CLASS_SPECIFIERS: [&str; 6] =
    ["typedef", "extern", "static", "_Thread_local", "auto", "register"];

pub const TYPE_SPECIFIERS: [&str; 11] = [
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
    "_Complex",
];

pub const TYPE_QUALIFIERS: [&str; 4] = ["const", "restrict", "volatile", "_Atomic"];

pub const FUNCTION_SPECIFIERS: [&str; 2] = ["inline", "_Noreturn"];

pub const ALIGNMENT_SPECIFIERS: [&str; 1] = ["_Alignas"];

pub const KEYWORDS: [&str; 17] = [
    "alignof", "break", "case", "continue", "default", "do", "else", "enum", "for", "goto", "if",
    "return", "sizeof", "struct", "switch", "union", "while",
];

/// Ordered longest first so the scanner can take the first prefix match
pub const PUNCTUATORS: [&str; 48] = [
    "...", "<<=", ">>=", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*=",
    "/=", "%=", "+=", "-=", "&=", "^=", "|=", "##", "[", "]", "(", ")", "{", "}", ",", "#", ".",
    "&", "*", "+", "-", "~", "!", "/", "%", "<", ">", "^", "|", "?", ":", ";", "=",
];

/// Classify an identifier-shaped word
pub fn classify_word(word: &str) -> TokenKind {
    if STORAGE_CLASS_SPECIFIERS.contains(&word) {
        TokenKind::StorageClass
    } else if TYPE_SPECIFIERS.contains(&word) {
        TokenKind::TypeSpecifier
    } else if TYPE_QUALIFIERS.contains(&word) {
        TokenKind::TypeQualifier
    } else if FUNCTION_SPECIFIERS.contains(&word) {
        TokenKind::FuncSpecifier
    } else if ALIGNMENT_SPECIFIERS.contains(&word) {
        TokenKind::AlignmentSpecifier
    } else if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    }
}

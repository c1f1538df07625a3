use std::str::Chars;

use crate::{classify_word, LexError, Token, TokenKind, PUNCTUATORS};

const EOF: char = '\0';

pub struct Lexer<'src> {
    /// Source Text
    source: &'src str,

    /// Remaining source characters
    chars: Chars<'src>,
    line: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            line: 1,
        }
    }

    /// Scan the whole source, stopping at the first bad character
    pub fn tokenize(mut self) -> Result<Vec<Token<'src>>, LexError> {
        let mut tokens = vec![];

        while let Some(token) = self.scan_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Option<Token<'src>>, LexError> {
        self.skip_whitespace();

        let start = self.offset();
        let line = self.line;

        let kind = match self.peek() {
            EOF if self.chars.as_str().is_empty() => return Ok(None),
            '"' => self.quoted('"', TokenKind::StringLiteral)?,
            '\'' => self.quoted('\'', TokenKind::CharLiteral)?,
            '0'..='9' => self.number(),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier(start),
            c => {
                let rest = self.rest();

                match PUNCTUATORS.iter().find(|punct| rest.starts_with(**punct)) {
                    Some(punct) => {
                        // every punctuator is ASCII, so bytes == chars
                        for _ in 0..punct.len() {
                            self.advance();
                        }
                        TokenKind::Punctuator
                    }
                    None => return Err(LexError::UnexpectedChar { line, ch: c }),
                }
            }
        };

        let end = self.offset();

        Ok(Some(Token::new(&self.source[start..end], kind, line)))
    }

    fn skip_whitespace(&mut self) {
        while !self.chars.as_str().is_empty() && self.peek().is_whitespace() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
    }

    /// String and char literals, including the delimiters
    fn quoted(&mut self, delimiter: char, kind: TokenKind) -> Result<TokenKind, LexError> {
        let line = self.line;
        self.advance();

        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedLiteral { line }),
                Some('\\') => {
                    if self.advance().is_none() {
                        return Err(LexError::UnterminatedLiteral { line });
                    }
                }
                Some('\n') => self.line += 1,
                Some(c) if c == delimiter => return Ok(kind),
                Some(_) => {}
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        TokenKind::IntLiteral
    }

    fn identifier(&mut self, start: usize) -> TokenKind {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        classify_word(&self.source[start..self.offset()])
    }

    /// Get offset into source text
    fn offset(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }

    fn rest(&self) -> &'src str {
        &self.source[self.offset()..]
    }

    fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next()
    }
}

#[cfg(test)]
mod tests {
    use crate::TokenKind::*;

    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(src: &str) -> Vec<&str> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn declaration() {
        let src = "static unsigned int *p = &a;";
        let expected = vec![
            StorageClass,
            TypeSpecifier,
            TypeSpecifier,
            Punctuator,
            Identifier,
            Punctuator,
            Punctuator,
            Identifier,
            Punctuator,
        ];

        assert_eq!(kinds(src), expected)
    }

    #[test]
    fn expression_spelling() {
        let src = "a = f(b, 12) * (c+1);";
        let expected = vec![
            "a", "=", "f", "(", "b", ",", "12", ")", "*", "(", "c", "+", "1", ")", ";",
        ];

        assert_eq!(texts(src), expected)
    }

    #[test]
    fn longest_punctuator_wins() {
        assert_eq!(texts("a<<=b->c..."), vec!["a", "<<=", "b", "->", "c", "..."]);
        assert_eq!(texts("x==y=z"), vec!["x", "==", "y", "=", "z"]);
    }

    #[test]
    fn minus_is_never_part_of_a_literal() {
        assert_eq!(kinds("-5"), vec![Punctuator, IntLiteral]);
    }

    #[test]
    fn words_only_match_on_boundaries() {
        assert_eq!(kinds("iffy integer int"), vec![Identifier, Identifier, TypeSpecifier]);
        assert_eq!(
            kinds("while _Alignas inline const"),
            vec![Keyword, AlignmentSpecifier, FuncSpecifier, TypeQualifier]
        );
    }

    #[test]
    fn literals_with_escapes() {
        let tokens = Lexer::new(r#""a\"b" '\''"#).tokenize().unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, StringLiteral);
        assert_eq!(tokens[0].text, r#""a\"b""#);
        assert_eq!(tokens[1].kind, CharLiteral);
    }

    #[test]
    fn line_numbers() {
        let tokens = Lexer::new("a\nb\n\n  c").tokenize().unwrap();
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();

        assert_eq!(lines, vec![1, 2, 4])
    }

    #[test]
    fn unterminated_string() {
        let err = Lexer::new("x = \"abc").tokenize().unwrap_err();

        assert_eq!(err, LexError::UnterminatedLiteral { line: 1 })
    }

    #[test]
    fn unexpected_char() {
        let err = Lexer::new("a\n@").tokenize().unwrap_err();

        assert_eq!(err, LexError::UnexpectedChar { line: 2, ch: '@' })
    }

    #[test]
    fn empty_source() {
        assert!(Lexer::new("   \n\t").tokenize().unwrap().is_empty());
    }
}

use ast::*;
use lexer::{Token, TokenKind};

use crate::{parse, parse_assignment, ParseError, ParseResult};

/// Parses a flat sequence of declarations and expression statements
pub struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    cursor: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>]) -> Self {
        Self { tokens, cursor: 0 }
    }

    pub fn parse(&mut self) -> ParseResult<Program<'src>> {
        let mut items = vec![];

        while let Some(token) = self.peek() {
            if token.is_punct(";") {
                self.cursor += 1;
                continue;
            }

            let item = if token.is_decl_specifier() {
                Item::Declaration(self.parse_decl()?)
            } else {
                Item::Expression(self.parse_expr_stmt()?)
            };

            log::debug!("parsed item ending before token {}", self.cursor);
            items.push(item);
        }

        Ok(Program { items })
    }

    fn parse_decl(&mut self) -> ParseResult<Declaration<'src>> {
        let mut signed = true;

        while let Some(token) = self.peek().filter(|t| t.is_decl_specifier()) {
            if token.text == "unsigned" {
                signed = false;
            }
            self.cursor += 1;
        }

        let mut declarators = vec![self.parse_declarator()?];

        loop {
            match self.next() {
                Some(t) if t.is_punct(",") => declarators.push(self.parse_declarator()?),
                Some(t) if t.is_punct(";") => break,
                Some(t) => return Err(unexpected(t, "',' or ';' after a declarator")),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }

        Ok(Declaration {
            signed,
            declarators,
        })
    }

    fn parse_declarator(&mut self) -> ParseResult<Declarator<'src>> {
        let mut pointer_depth = 0;

        while self.peek().is_some_and(|t| t.is_punct("*")) {
            pointer_depth += 1;
            self.cursor += 1;
        }

        let name = self.expect_ident()?;

        let init = if self.peek().is_some_and(|t| t.is_punct("=")) {
            let (init, end) = parse_assignment(self.tokens, self.cursor + 1)?;
            self.cursor = end;
            Some(init)
        } else {
            None
        };

        Ok(Declarator {
            name,
            pointer_depth,
            init,
        })
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Ast<'src>> {
        let (expr, end) = parse(self.tokens, self.cursor)?;
        self.cursor = end;
        self.expect(";")?;
        Ok(expr)
    }

    fn expect_ident(&mut self) -> ParseResult<Token<'src>> {
        match self.next() {
            Some(t) if t.kind == TokenKind::Identifier => Ok(t),
            Some(t) => Err(unexpected(t, "an identifier")),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Checks if next token is the expected punctuator
    fn expect(&mut self, punct: &'static str) -> ParseResult<Token<'src>> {
        match self.next() {
            Some(t) if t.is_punct(punct) => Ok(t),
            Some(t) => Err(unexpected(t, punct)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.cursor).copied()
    }

    fn next(&mut self) -> Option<Token<'src>> {
        let token = self.peek()?;
        self.cursor += 1;
        Some(token)
    }
}

fn unexpected(found: Token<'_>, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        line: found.line,
        expected,
        found: found.text.to_string(),
    }
}

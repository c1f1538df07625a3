use ast::{Ast, BinaryOp, Node, UnaryOp};
use lexer::{Token, TokenKind};

use crate::{ParseError, ParseResult};

/// Deepest accepted expression. Parentheses, call argument lists, comma tails
/// and unary operators each open a level, and so does every operator node
/// on the way down the finished tree.
pub const MAX_NESTING: usize = 256;

/// Parse one expression starting at `offset`.
///
/// Returns the tree and the index of the `)` or `;` that ended it. A top level
/// `,` continues the expression as a right-associated comma chain.
pub fn parse<'src>(tokens: &[Token<'src>], offset: usize) -> ParseResult<(Ast<'src>, usize)> {
    let (tree, end) = build(tokens, offset, false)?;
    log::trace!("expression {} ends at token {}", tree, end);
    Ok((tree, end))
}

/// Like [`parse`], but a top level `,` also ends the expression
pub fn parse_assignment<'src>(
    tokens: &[Token<'src>],
    offset: usize,
) -> ParseResult<(Ast<'src>, usize)> {
    let (tree, end) = build(tokens, offset, true)?;
    log::trace!("assignment expression {} ends at token {}", tree, end);
    Ok((tree, end))
}

fn build<'src>(
    tokens: &[Token<'src>],
    offset: usize,
    stop_at_comma: bool,
) -> ParseResult<(Ast<'src>, usize)> {
    let parens = match_parens(tokens, offset);
    let builder = ExprBuilder {
        tokens,
        parens: &parens,
        stop_at_comma,
        depth: 0,
    };

    let (tree, end, _) = builder.expression(offset)?;
    Ok((tree, end))
}

/// Closing index for every `(` from `offset` up to the first `;`
fn match_parens(tokens: &[Token<'_>], offset: usize) -> Vec<Option<usize>> {
    let mut parens = vec![None; tokens.len()];
    let mut open = vec![];

    for (i, token) in tokens.iter().enumerate().skip(offset) {
        if token.is_punct("(") {
            open.push(i);
        } else if token.is_punct(")") {
            if let Some(start) = open.pop() {
                parens[start] = Some(i);
            }
        } else if token.is_punct(";") {
            break;
        }
    }

    parens
}

/// Tree, index of the next token, and height in operator levels
type Built<'src> = (Ast<'src>, usize, usize);

#[derive(Clone, Copy)]
struct ExprBuilder<'t, 'src> {
    tokens: &'t [Token<'src>],
    parens: &'t [Option<usize>],
    stop_at_comma: bool,
    depth: usize,
}

impl<'t, 'src> ExprBuilder<'t, 'src> {
    /// Nested groups and argument lists always accept commas
    fn nested(self) -> Self {
        Self {
            stop_at_comma: false,
            ..self
        }
    }

    /// One level further down, refused past the nesting limit
    fn deeper(self, at: &Token<'_>) -> ParseResult<Self> {
        if self.depth >= MAX_NESTING {
            return Err(too_deep(at));
        }

        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }

    fn check_height(self, height: usize, at: &Token<'_>) -> ParseResult<()> {
        if self.depth + height > MAX_NESTING {
            return Err(too_deep(at));
        }
        Ok(())
    }

    fn expression(self, offset: usize) -> ParseResult<Built<'src>> {
        let (mut root, mut cursor, mut height) = self.operand(offset)?;

        loop {
            let token = self.tokens.get(cursor).ok_or(ParseError::UnexpectedEnd)?;

            if token.is_punct(")") || token.is_punct(";") {
                return Ok((root, cursor, height));
            }

            if token.is_punct(",") {
                if self.stop_at_comma {
                    return Ok((root, cursor, height));
                }

                let (rest, end, rest_height) = self.deeper(token)?.expression(cursor + 1)?;
                let height = height.max(rest_height) + 1;
                self.check_height(height, token)?;
                return Ok((Ast::comma(root, Some(rest)), end, height));
            }

            let op = match token.kind {
                TokenKind::Punctuator => BinaryOp::from_punct(token.text),
                _ => None,
            }
            .ok_or_else(|| ParseError::InvalidOperator {
                line: token.line,
                text: token.text.to_string(),
            })?;

            let (right, next, right_height) = self.operand(cursor + 1)?;
            let (spliced, descended) = splice(root, op, right);

            height = height.max(descended + right_height) + 1;
            self.check_height(height, token)?;
            root = spliced;
            cursor = next;
        }
    }

    /// A single operand: a unary chain around a primary with its member accesses
    fn operand(self, offset: usize) -> ParseResult<Built<'src>> {
        let token = self.tokens.get(offset).ok_or(ParseError::UnexpectedEnd)?;

        if token.kind == TokenKind::Punctuator {
            if let Some(op) = UnaryOp::from_punct(token.text) {
                let (operand, next, height) = self.deeper(token)?.operand(offset + 1)?;
                self.check_height(height + 1, token)?;
                return Ok((Ast::unary(op, operand), next, height + 1));
            }
        }

        let (mut primary, mut cursor, mut height) = self.primary(offset)?;

        while let Some(dot) = self.tokens.get(cursor).filter(|t| t.is_punct(".")) {
            let member = match self.tokens.get(cursor + 1) {
                Some(t) if t.kind == TokenKind::Identifier => *t,
                Some(t) => {
                    return Err(ParseError::ExpectedOperand {
                        line: t.line,
                        found: t.text.to_string(),
                    })
                }
                None => return Err(ParseError::UnexpectedEnd),
            };

            height += 1;
            self.check_height(height, dot)?;
            primary = Ast::binary(BinaryOp::Dot, primary, Ast::leaf(member));
            cursor += 2;
        }

        Ok((primary, cursor, height))
    }

    /// Leaf, call, or parenthesized group
    fn primary(self, offset: usize) -> ParseResult<Built<'src>> {
        let token = self.tokens.get(offset).ok_or(ParseError::UnexpectedEnd)?;

        if token.is_punct("(") {
            let close = self.matching_paren(offset)?;
            let (inner, end, height) = self.deeper(token)?.nested().expression(offset + 1)?;

            if end != close {
                return Err(ParseError::UnmatchedParen { line: token.line });
            }

            return Ok((inner.into_grouped(), close + 1, height));
        }

        let opens_call = self
            .tokens
            .get(offset + 1)
            .is_some_and(|next| next.is_punct("("));

        match token.kind {
            TokenKind::Identifier if opens_call => self.call(offset),
            TokenKind::IntLiteral if opens_call => {
                Err(ParseError::MalformedCall { line: token.line })
            }
            TokenKind::Identifier | TokenKind::IntLiteral => Ok((Ast::leaf(*token), offset + 1, 0)),
            _ => Err(ParseError::ExpectedOperand {
                line: token.line,
                found: token.text.to_string(),
            }),
        }
    }

    fn call(self, offset: usize) -> ParseResult<Built<'src>> {
        let callee = self.tokens[offset];
        let open = offset + 1;

        let close = self
            .matching_paren(open)
            .map_err(|_| ParseError::MalformedCall { line: callee.line })?;

        if close == open + 1 {
            return Ok((Ast::call(callee, None), close + 1, 1));
        }

        let (args, end, height) = self
            .deeper(&callee)?
            .nested()
            .expression(open + 1)?;

        if end != close {
            return Err(ParseError::MalformedCall { line: callee.line });
        }

        // a lone argument still gets a comma node so call operands look the same
        let (args, height) = if matches!(args.node, Node::Comma { .. }) && !args.grouped {
            (args, height)
        } else {
            (Ast::comma(args, None), height + 1)
        };

        self.check_height(height + 1, &callee)?;
        Ok((Ast::call(callee, Some(args)), close + 1, height + 1))
    }

    /// Index of the `)` balancing the `(` at `open`
    fn matching_paren(self, open: usize) -> ParseResult<usize> {
        self.parens
            .get(open)
            .copied()
            .flatten()
            .ok_or(ParseError::UnmatchedParen {
                line: self.tokens[open].line,
            })
    }
}

fn too_deep(at: &Token<'_>) -> ParseError {
    ParseError::NestingTooDeep {
        line: at.line,
        limit: MAX_NESTING,
    }
}

/// Insert a new binary node into the tree. Walks down right children while the
/// new operator binds tighter than the node there; parenthesized groups are
/// never entered. The walked-to subtree becomes the new node's left child.
/// Also returns how many levels were walked.
fn splice<'src>(root: Ast<'src>, op: BinaryOp, right: Ast<'src>) -> (Ast<'src>, usize) {
    let mut spine = vec![];
    let mut node = root;

    while !node.grouped
        && matches!(node.node, Node::Binary { op: current, .. } if op.nests_under(current))
    {
        match node.into_node() {
            Node::Binary {
                op: current,
                left,
                right: inner,
            } => {
                spine.push((current, *left));
                node = *inner;
            }
            _ => unreachable!("only binary nodes are descended into"),
        }
    }

    let descended = spine.len();
    let mut tree = Ast::binary(op, node, right);

    while let Some((current, left)) = spine.pop() {
        tree = Ast::binary(current, left, tree);
    }

    (tree, descended)
}

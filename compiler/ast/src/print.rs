use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{Ast, Item, Node, Operator};

/// Compact s-expression form, used by tests and log output
impl Display for Ast<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.node {
            Node::Leaf(token) => write!(f, "{}", token.text),
            Node::Unary { op, operand } => {
                write!(f, "({} {})", Operator::from(*op).symbol(), operand)
            }
            Node::Binary { op, left, right } => {
                write!(f, "({} {} {})", Operator::from(*op).symbol(), left, right)
            }
            Node::Call {
                callee,
                args: Some(args),
            } => write!(f, "(call {} {})", callee.text, args),
            Node::Call { callee, args: None } => write!(f, "(call {})", callee.text),
            Node::Comma {
                head,
                tail: Some(tail),
            } => write!(f, "(, {} {})", head, tail),
            Node::Comma { head, tail: None } => write!(f, "(, {})", head),
        }
    }
}

impl Ast<'_> {
    /// Indented tree, one node per line, children two spaces deeper
    pub fn pretty(&self) -> String {
        let mut lines = vec![];
        self.pretty_lines(0, &mut lines);
        lines.iter().join("\n")
    }

    fn pretty_lines(&self, depth: usize, lines: &mut Vec<String>) {
        let label = match &self.node {
            Node::Leaf(token) => token.text.to_string(),
            Node::Unary { op, .. } => Operator::from(*op).symbol().to_string(),
            Node::Binary { op, .. } => Operator::from(*op).symbol().to_string(),
            Node::Call { callee, .. } => format!("call {}", callee.text),
            Node::Comma { .. } => Operator::Comma.symbol().to_string(),
        };

        let marker = if self.grouped { " [paren]" } else { "" };
        lines.push(format!("{}{}{}", "  ".repeat(depth), label, marker));

        for child in self.children() {
            child.pretty_lines(depth + 1, lines);
        }
    }

    fn children(&self) -> Vec<&Ast<'_>> {
        match &self.node {
            Node::Leaf(_) => vec![],
            Node::Unary { operand, .. } => vec![operand.as_ref()],
            Node::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::Call { args, .. } => args.iter().map(|a| a.as_ref()).collect(),
            Node::Comma { head, tail } => {
                let mut children = vec![head.as_ref()];
                children.extend(tail.as_deref());
                children
            }
        }
    }
}

impl Item<'_> {
    pub fn pretty(&self) -> String {
        let mut lines = vec![];

        match self {
            Item::Declaration(decl) => {
                for declarator in &decl.declarators {
                    lines.push(format!(
                        "decl {}{}{}",
                        if decl.signed { "" } else { "unsigned " },
                        "*".repeat(declarator.pointer_depth as usize),
                        declarator.name.text
                    ));

                    if let Some(init) = &declarator.init {
                        init.pretty_lines(1, &mut lines);
                    }
                }
            }
            Item::Expression(expr) => {
                lines.push("expr".to_string());
                expr.pretty_lines(1, &mut lines);
            }
        }

        lines.iter().join("\n")
    }
}

use lexer::Token;

#[cfg(feature = "node-count")]
use crate::live::LiveNode;

/// Defines AST datatypes

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Program<'src> {
    pub items: Vec<Item<'src>>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Item<'src> {
    Declaration(Declaration<'src>),
    Expression(Ast<'src>),
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Declaration<'src> {
    pub signed: bool,
    pub declarators: Vec<Declarator<'src>>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Declarator<'src> {
    pub name: Token<'src>,
    pub pointer_depth: u32,
    pub init: Option<Ast<'src>>,
}

/// One expression tree node. `grouped` marks a parenthesized sub-expression,
/// which later operators must not split apart.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Ast<'src> {
    pub node: Node<'src>,
    pub grouped: bool,
    #[cfg(feature = "node-count")]
    live: LiveNode,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Node<'src> {
    Leaf(Token<'src>),
    Unary {
        op: UnaryOp,
        operand: Box<Ast<'src>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Ast<'src>>,
        right: Box<Ast<'src>>,
    },
    /// `args` is always a comma chain, `None` for an empty argument list
    Call {
        callee: Token<'src>,
        args: Option<Box<Ast<'src>>>,
    },
    /// Right-associated chain; a lone call argument has no tail
    Comma {
        head: Box<Ast<'src>>,
        tail: Option<Box<Ast<'src>>>,
    },
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum UnaryOp {
    AddressOf,
    Dereference,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Add,
    Subtract,
    Dot,
    Assign,
}

/// Every operator tag a tree node can carry
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Operator {
    Multiply,
    Divide,
    Add,
    Subtract,
    Dot,
    Comma,
    Call,
    AddressOf,
    Dereference,
    Assign,
}

impl Operator {
    /// Lower binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Dot | Operator::Call => 1,
            Operator::AddressOf | Operator::Dereference => 2,
            Operator::Multiply | Operator::Divide => 3,
            Operator::Add | Operator::Subtract => 4,
            Operator::Assign => 14,
            Operator::Comma => 15,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Dot => ".",
            Operator::Comma => ",",
            Operator::Call => "call",
            Operator::AddressOf => "addr",
            Operator::Dereference => "deref",
            Operator::Assign => "=",
        }
    }
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Multiply => Operator::Multiply,
            BinaryOp::Divide => Operator::Divide,
            BinaryOp::Add => Operator::Add,
            BinaryOp::Subtract => Operator::Subtract,
            BinaryOp::Dot => Operator::Dot,
            BinaryOp::Assign => Operator::Assign,
        }
    }
}

impl From<UnaryOp> for Operator {
    fn from(op: UnaryOp) -> Self {
        match op {
            UnaryOp::AddressOf => Operator::AddressOf,
            UnaryOp::Dereference => Operator::Dereference,
        }
    }
}

impl BinaryOp {
    /// Infix operators only; member access is resolved on the operand itself
    pub fn from_punct(text: &str) -> Option<Self> {
        match text {
            "*" => Some(BinaryOp::Multiply),
            "/" => Some(BinaryOp::Divide),
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Subtract),
            "=" => Some(BinaryOp::Assign),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        Operator::from(self).precedence()
    }

    pub fn is_right_assoc(self) -> bool {
        self == BinaryOp::Assign
    }

    /// Whether a new `self` node must be placed below an existing `current` node
    pub fn nests_under(self, current: BinaryOp) -> bool {
        let (new, current) = (self.precedence(), current.precedence());
        new < current || (new == current && self.is_right_assoc())
    }
}

impl UnaryOp {
    pub fn from_punct(text: &str) -> Option<Self> {
        match text {
            "&" => Some(UnaryOp::AddressOf),
            "*" => Some(UnaryOp::Dereference),
            _ => None,
        }
    }
}

impl<'src> Ast<'src> {
    fn new(node: Node<'src>) -> Self {
        Self {
            node,
            grouped: false,
            #[cfg(feature = "node-count")]
            live: LiveNode::new(),
        }
    }

    pub fn leaf(token: Token<'src>) -> Self {
        Self::new(Node::Leaf(token))
    }

    pub fn unary(op: UnaryOp, operand: Ast<'src>) -> Self {
        Self::new(Node::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, left: Ast<'src>, right: Ast<'src>) -> Self {
        Self::new(Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn call(callee: Token<'src>, args: Option<Ast<'src>>) -> Self {
        Self::new(Node::Call {
            callee,
            args: args.map(Box::new),
        })
    }

    pub fn comma(head: Ast<'src>, tail: Option<Ast<'src>>) -> Self {
        Self::new(Node::Comma {
            head: Box::new(head),
            tail: tail.map(Box::new),
        })
    }

    /// Mark as a parenthesized sub-expression
    pub fn into_grouped(mut self) -> Self {
        self.grouped = true;
        self
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.node {
            Node::Leaf(_) => None,
            Node::Unary { op, .. } => Some((*op).into()),
            Node::Binary { op, .. } => Some((*op).into()),
            Node::Call { .. } => Some(Operator::Call),
            Node::Comma { .. } => Some(Operator::Comma),
        }
    }

    pub fn as_leaf(&self) -> Option<&Token<'src>> {
        match &self.node {
            Node::Leaf(token) => Some(token),
            _ => None,
        }
    }

    /// Line of the leftmost token in the subtree
    pub fn line(&self) -> u32 {
        match &self.node {
            Node::Leaf(token) | Node::Call { callee: token, .. } => token.line,
            Node::Unary { operand, .. } => operand.line(),
            Node::Binary { left, .. } => left.line(),
            Node::Comma { head, .. } => head.line(),
        }
    }

    /// Split a node into its parts without cloning; the node itself is dropped
    pub fn into_node(self) -> Node<'src> {
        self.node
    }
}

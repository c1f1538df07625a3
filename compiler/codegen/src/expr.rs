use ast::{Ast, BinaryOp, Declaration, Item, Node, Operator, Program, UnaryOp};
use lexer::{Token, TokenKind};
use lir::{Instruction, Register};

use crate::value::{AstNodeValue, Location};
use crate::{CodegenError, CodegenResult, CompileContext};

impl CompileContext {
    pub fn compile_program(&mut self, program: &Program<'_>) -> CodegenResult<()> {
        for item in &program.items {
            match item {
                Item::Declaration(decl) => self.compile_decl(decl)?,
                Item::Expression(expr) => {
                    let value = self.compile(expr)?;
                    log::debug!("statement `{}` left {:?}", expr, value.location);
                }
            }
        }

        Ok(())
    }

    fn compile_decl(&mut self, decl: &Declaration<'_>) -> CodegenResult<()> {
        for declarator in &decl.declarators {
            let var = self.define(&declarator.name, decl.signed, declarator.pointer_depth)?;

            if let Some(init) = &declarator.init {
                let value = self.compile(init)?;
                self.assign(&AstNodeValue::from(&var), &value, declarator.name.line)?;
            }
        }

        Ok(())
    }

    /// Post-order walk of one expression; the returned descriptor says where its value is
    pub fn compile(&mut self, tree: &Ast<'_>) -> CodegenResult<AstNodeValue> {
        match &tree.node {
            Node::Leaf(token) => self.compile_leaf(token),
            Node::Unary {
                op: UnaryOp::Dereference,
                operand,
            } => Ok(self.compile(operand)?.deref()),
            Node::Unary {
                op: UnaryOp::AddressOf,
                operand,
            } => {
                let value = self.compile(operand)?;
                self.address_of(&value, operand.line())
            }
            Node::Binary {
                op: BinaryOp::Assign,
                left,
                right,
            } => {
                let target = self.compile(left)?;
                let value = self.compile(right)?;
                self.assign(&target, &value, left.line())
            }
            Node::Binary {
                op: BinaryOp::Dot, ..
            }
            | Node::Call { .. } => Err(CodegenError::UnhandledOperator {
                op: tree.operator().map_or("?", Operator::symbol),
                line: tree.line(),
            }),
            Node::Binary { op, left, right } => {
                let lhs = self.compile(left)?;
                let rhs = self.compile(right)?;
                self.arithmetic(*op, &lhs, &rhs)
            }
            Node::Comma { head, tail } => {
                let head = self.compile(head)?;
                match tail {
                    Some(tail) => self.compile(tail),
                    None => Ok(head),
                }
            }
        }
    }

    fn compile_leaf(&mut self, token: &Token<'_>) -> CodegenResult<AstNodeValue> {
        match token.kind {
            TokenKind::IntLiteral => token
                .text
                .parse::<i64>()
                .map(AstNodeValue::literal)
                .map_err(|_| CodegenError::InvalidLiteral {
                    text: token.text.to_string(),
                    line: token.line,
                }),
            TokenKind::Identifier => self
                .symbols()
                .lookup(token.text)
                .map(AstNodeValue::from)
                .ok_or_else(|| CodegenError::UndefinedIdentifier {
                    name: token.text.to_string(),
                    line: token.line,
                }),
            // the parser only builds leaves from identifiers and integer literals
            _ => unreachable!("leaf token {:?}", token.kind),
        }
    }

    /// Operands go through the scratch pair and the result is spilled to a new slot
    fn arithmetic(
        &mut self,
        op: BinaryOp,
        lhs: &AstNodeValue,
        rhs: &AstNodeValue,
    ) -> CodegenResult<AstNodeValue> {
        let op = match op {
            BinaryOp::Add => lir::BinaryOp::Add,
            BinaryOp::Subtract => lir::BinaryOp::Sub,
            BinaryOp::Multiply => lir::BinaryOp::Mul,
            BinaryOp::Divide => lir::BinaryOp::Div,
            BinaryOp::Dot | BinaryOp::Assign => unreachable!("{:?} is not arithmetic", op),
        };

        self.materialize(lhs, 0, Register::SCRATCH_A);
        self.materialize(rhs, 0, Register::SCRATCH_B);
        self.emit(Instruction::Binary {
            op,
            dest: Register::SCRATCH_A,
            src: Register::SCRATCH_B,
        });

        let slot = self.push(Register::SCRATCH_A)?;
        Ok(AstNodeValue::stack_slot(slot, lhs.signed || rhs.signed))
    }

    fn address_of(&mut self, value: &AstNodeValue, line: u32) -> CodegenResult<AstNodeValue> {
        if value.is_indirect() {
            return Ok(AstNodeValue {
                indirection: value.indirection - 1,
                temporary: true,
                ..*value
            });
        }

        match value.location {
            Location::Stack(slot) => {
                self.frame_address(Register::SCRATCH_A, slot, 0);
                let pointer = self.push(Register::SCRATCH_A)?;
                Ok(AstNodeValue::stack_slot(pointer, false))
            }
            Location::Register(_) | Location::Immediate(_) => {
                Err(CodegenError::NotAddressable { line })
            }
        }
    }

    /// Stores `value` into `target` word by word and yields `target` itself
    fn assign(
        &mut self,
        target: &AstNodeValue,
        value: &AstNodeValue,
        line: u32,
    ) -> CodegenResult<AstNodeValue> {
        if !target.is_assignable() {
            return Err(CodegenError::NotAssignable { line });
        }

        for word in 0..target.width {
            self.materialize(value, word, Register::SCRATCH_A);

            if target.is_indirect() {
                let base = AstNodeValue {
                    indirection: target.indirection - 1,
                    width: 1,
                    ..*target
                };
                self.materialize(&base, 0, Register::SCRATCH_B);
                if word > 0 {
                    self.emit(Instruction::AddImm {
                        dest: Register::SCRATCH_B,
                        imm: word as u16,
                    });
                }
                self.store_scratch();
                continue;
            }

            match target.location {
                Location::Register(dest) => self.emit(Instruction::Mov {
                    dest,
                    src: Register::SCRATCH_A,
                }),
                Location::Stack(slot) => {
                    self.frame_address(Register::SCRATCH_B, slot, word);
                    self.store_scratch();
                }
                Location::Immediate(_) => unreachable!("literals are temporaries"),
            }
        }

        Ok(*target)
    }

    /// `store [r5], r4`
    fn store_scratch(&mut self) {
        self.emit(Instruction::Store {
            addr: Register::SCRATCH_B,
            src: Register::SCRATCH_A,
        });
    }
}

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::*;

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Register::R0 => "r0",
            Register::R1 => "r1",
            Register::R2 => "r2",
            Register::R3 => "r3",
            Register::R4 => "r4",
            Register::R5 => "r5",
            Register::Bp => "bp",
            Register::Sp => "sp",
        };
        write!(f, "{}", name)
    }
}

fn format_binary(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
    }
}

/// One line of listing text, mnemonic then operands
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Mov { dest, src } => write!(f, "mov {}, {}", dest, src),
            Instruction::Binary { op, dest, src } => {
                write!(f, "{} {}, {}", format_binary(*op), dest, src)
            }
            Instruction::Load { dest, addr } => write!(f, "load {}, [{}]", dest, addr),
            Instruction::Store { addr, src } => write!(f, "store [{}], {}", addr, src),
            Instruction::Push(src) => write!(f, "push {}", src),
            Instruction::MovImm { dest, imm } => write!(f, "movi {}, #{}", dest, imm),
            Instruction::AddImm { dest, imm } => write!(f, "addi {}, #{}", dest, imm),
            Instruction::SubImm { dest, imm } => write!(f, "subi {}, #{}", dest, imm),
            Instruction::LoadHigh { dest, imm } => write!(f, "lhi {}, #{}", dest, imm),
            Instruction::OrLow { dest, imm } => write!(f, "ori {}, #{}", dest, imm),
        }
    }
}

impl Display for InstructionStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iter().join("\n"))
    }
}

impl InstructionStream {
    /// Rendered listing, one entry per instruction
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(|i| i.to_string()).collect()
    }
}

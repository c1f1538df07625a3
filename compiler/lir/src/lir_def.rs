//! Defines the register machine instruction set.
//!
//! The machine is word addressed with 16 bit words. `push` decrements `sp`
//! and then stores, so with `sp == bp` on entry the k-th push of a program
//! lands at `bp - k`.

pub const WORD_BITS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    Bp,
    Sp,
}

impl Register {
    /// Registers the allocator may hand out, lowest first
    pub const POOL: [Register; 4] = [Register::R0, Register::R1, Register::R2, Register::R3];

    /// Scratch register for the first operand
    pub const SCRATCH_A: Register = Register::R4;

    /// Scratch register for the second operand and for store addresses
    pub const SCRATCH_B: Register = Register::R5;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Mov {
        dest: Register,
        src: Register,
    },
    /// `dest = dest op src`
    Binary {
        op: BinaryOp,
        dest: Register,
        src: Register,
    },
    Load {
        dest: Register,
        addr: Register,
    },
    Store {
        addr: Register,
        src: Register,
    },
    Push(Register),
    MovImm {
        dest: Register,
        imm: u8,
    },
    AddImm {
        dest: Register,
        imm: u16,
    },
    SubImm {
        dest: Register,
        imm: u16,
    },
    /// `dest = imm << 8`
    LoadHigh {
        dest: Register,
        imm: u8,
    },
    /// `dest = dest | imm`
    OrLow {
        dest: Register,
        imm: u8,
    },
}

/// Append-only output of a compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
}

impl InstructionStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

impl<'a> IntoIterator for &'a InstructionStream {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

use lexer::Token;
use lir::{Instruction, InstructionStream, Register, WORD_BITS};

use crate::value::{AstNodeValue, Location};
use crate::{CodeVariable, CodegenError, CodegenResult, RegisterAllocator, Storage, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Size of the allocatable pool, clamped to 2..=4
    pub register_count: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            register_count: RegisterAllocator::MAX_REGISTERS,
        }
    }
}

/// All mutable state of one compilation. Independent contexts never share anything.
#[derive(Debug)]
pub struct CompileContext {
    allocator: RegisterAllocator,
    symbols: SymbolTable,
    stream: InstructionStream,
    /// Words pushed so far; the next push lands at `bp - (frame_words + 1)`
    frame_words: u16,
}

impl CompileContext {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            allocator: RegisterAllocator::new(options.register_count),
            symbols: SymbolTable::new(),
            stream: InstructionStream::new(),
            frame_words: 0,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn stream(&self) -> &InstructionStream {
        &self.stream
    }

    pub fn frame_words(&self) -> u16 {
        self.frame_words
    }

    pub fn finish(self) -> InstructionStream {
        self.stream
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) {
        log::trace!("emit {}", instruction);
        self.stream.push(instruction);
    }

    /// Pushes `src` and returns the slot it landed in
    pub(crate) fn push(&mut self, src: Register) -> CodegenResult<u16> {
        let slot = self
            .frame_words
            .checked_add(1)
            .ok_or(CodegenError::FrameOverflow)?;

        self.emit(Instruction::Push(src));
        self.frame_words = slot;
        Ok(slot)
    }

    /// Registers a one word variable, in a register while the pool lasts and
    /// in a fresh frame slot afterwards
    pub fn define(
        &mut self,
        name: &Token<'_>,
        signed: bool,
        pointer_depth: u32,
    ) -> CodegenResult<CodeVariable> {
        if self.symbols.contains(name.text) {
            return Err(CodegenError::DuplicateDefinition {
                name: name.text.to_string(),
                line: name.line,
            });
        }

        let storage = match self.allocator.acquire() {
            Some(register) => Storage::Register(register),
            None => {
                log::debug!("register pool exhausted, '{}' spills to the frame", name.text);
                Storage::Stack(self.push(Register::SCRATCH_A)?)
            }
        };

        let variable = CodeVariable {
            name: name.text.to_string(),
            width: 1,
            signed,
            pointer_depth,
            storage,
        };
        log::debug!(
            "defined '{}' in {:?}, pointer depth {}",
            variable.name,
            variable.storage,
            variable.pointer_depth
        );

        self.symbols.define(variable, name.line).cloned()
    }

    /// Brings word `word` of `value` into `dest`, then follows its indirection.
    /// Nothing is emitted for a plain value already held in `dest`.
    pub fn materialize(&mut self, value: &AstNodeValue, word: u32, dest: Register) {
        if word >= value.width {
            self.extend_word(value.signed, dest);
            return;
        }

        match value.location {
            Location::Register(src) => {
                if src != dest {
                    self.emit(Instruction::Mov { dest, src });
                }
            }
            Location::Stack(slot) => {
                self.frame_address(dest, slot, word);
                self.emit(Instruction::Load { dest, addr: dest });
            }
            Location::Immediate(literal) => {
                let bits = (literal >> (WORD_BITS * word)) as u16;
                self.load_immediate(bits, dest);
            }
        }

        for _ in 0..value.indirection {
            self.emit(Instruction::Load { dest, addr: dest });
        }
    }

    /// `dest = bp - slot + word`
    pub(crate) fn frame_address(&mut self, dest: Register, slot: u16, word: u32) {
        self.emit(Instruction::Mov {
            dest,
            src: Register::Bp,
        });
        self.emit(Instruction::SubImm { dest, imm: slot });

        if word > 0 {
            self.emit(Instruction::AddImm {
                dest,
                imm: word as u16,
            });
        }
    }

    fn load_immediate(&mut self, bits: u16, dest: Register) {
        let [high, low] = bits.to_be_bytes();

        if high == 0 {
            self.emit(Instruction::MovImm { dest, imm: low });
            return;
        }

        self.emit(Instruction::LoadHigh { dest, imm: high });
        if low != 0 {
            self.emit(Instruction::OrLow { dest, imm: low });
        }
    }

    /// Words past the stored width read as the sign fill
    fn extend_word(&mut self, signed: bool, dest: Register) {
        if signed {
            self.load_immediate(u16::MAX, dest);
        } else {
            self.load_immediate(0, dest);
        }
    }
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new(CodegenOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use lexer::TokenKind;
    use test_log::test;

    use super::*;

    fn ident(text: &str) -> Token<'_> {
        Token::new(text, TokenKind::Identifier, 1)
    }

    fn listing(ctx: &CompileContext) -> Vec<String> {
        ctx.stream().lines()
    }

    #[test]
    fn register_value_already_in_place_is_free() {
        let mut ctx = CompileContext::default();
        let value = AstNodeValue {
            location: Location::Register(Register::SCRATCH_A),
            signed: true,
            width: 1,
            indirection: 0,
            temporary: false,
        };

        ctx.materialize(&value, 0, Register::SCRATCH_A);

        assert!(ctx.stream().is_empty());
    }

    #[test]
    fn register_value_moves_and_follows_pointers() {
        let mut ctx = CompileContext::default();
        let value = AstNodeValue {
            location: Location::Register(Register::R2),
            signed: true,
            width: 1,
            indirection: 2,
            temporary: false,
        };

        ctx.materialize(&value, 0, Register::SCRATCH_B);

        assert_eq!(
            listing(&ctx),
            ["mov r5, r2", "load r5, [r5]", "load r5, [r5]"]
        );
    }

    #[test]
    fn stack_value_is_loaded_from_the_frame() {
        let mut ctx = CompileContext::default();

        ctx.materialize(&AstNodeValue::stack_slot(3, true), 0, Register::SCRATCH_A);

        assert_eq!(listing(&ctx), ["mov r4, bp", "subi r4, #3", "load r4, [r4]"]);
    }

    #[test]
    fn small_literal_is_one_instruction() {
        let mut ctx = CompileContext::default();

        ctx.materialize(&AstNodeValue::literal(5), 0, Register::SCRATCH_A);

        assert_eq!(listing(&ctx), ["movi r4, #5"]);
    }

    #[test]
    fn literal_words_split_into_bytes() {
        let mut ctx = CompileContext::default();
        let value = AstNodeValue::literal(0x0001_1234);

        ctx.materialize(&value, 0, Register::SCRATCH_A);
        ctx.materialize(&value, 1, Register::SCRATCH_B);
        ctx.materialize(&AstNodeValue::literal(0x100), 0, Register::SCRATCH_A);

        assert_eq!(
            listing(&ctx),
            ["lhi r4, #18", "ori r4, #52", "movi r5, #1", "lhi r4, #1"]
        );
    }

    #[test]
    fn negative_literal_is_all_ones() {
        let mut ctx = CompileContext::default();

        ctx.materialize(&AstNodeValue::literal(-1), 3, Register::SCRATCH_A);

        assert_eq!(listing(&ctx), ["lhi r4, #255", "ori r4, #255"]);
    }

    #[test]
    fn words_past_width_follow_signedness() {
        let mut ctx = CompileContext::default();

        ctx.materialize(&AstNodeValue::stack_slot(1, true), 1, Register::SCRATCH_A);
        ctx.materialize(&AstNodeValue::stack_slot(1, false), 1, Register::SCRATCH_B);

        assert_eq!(listing(&ctx), ["lhi r4, #255", "ori r4, #255", "movi r5, #0"]);
    }

    #[test]
    fn define_spills_past_the_pool() {
        let mut ctx = CompileContext::new(CodegenOptions { register_count: 2 });

        let names = ["a", "b", "c", "d"];
        let storage: Vec<_> = names
            .iter()
            .map(|n| ctx.define(&ident(n), true, 0).unwrap().storage)
            .collect();

        assert_eq!(
            storage,
            [
                Storage::Register(Register::R0),
                Storage::Register(Register::R1),
                Storage::Stack(1),
                Storage::Stack(2),
            ]
        );
        assert_eq!(listing(&ctx), ["push r4", "push r4"]);
        assert_eq!(ctx.frame_words(), 2);
    }

    #[test]
    fn define_rejects_duplicates() {
        let mut ctx = CompileContext::default();
        ctx.define(&ident("a"), true, 0).unwrap();

        assert_eq!(
            ctx.define(&ident("a"), false, 1),
            Err(CodegenError::DuplicateDefinition {
                name: "a".to_string(),
                line: 1
            })
        );
        assert_eq!(ctx.symbols().len(), 1);
    }

    #[test]
    fn contexts_are_independent() {
        let mut first = CompileContext::default();
        let mut second = CompileContext::default();

        first.define(&ident("a"), true, 0).unwrap();
        let b = second.define(&ident("b"), true, 2).unwrap();

        assert_eq!(b.storage, Storage::Register(Register::R0));
        assert_eq!(b.pointer_depth, 2);
        assert!(second.symbols().lookup("a").is_none());
    }
}

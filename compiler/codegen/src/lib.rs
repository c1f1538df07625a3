use thiserror::Error;

pub use allocator::RegisterAllocator;
pub use context::{CodegenOptions, CompileContext};
pub use symbols::{CodeVariable, Storage, SymbolTable};
pub use value::{AstNodeValue, Location};

mod allocator;
mod context;
mod expr;
mod symbols;
mod value;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CodegenError {
    #[error("line {line}: '{name}' is not defined")]
    UndefinedIdentifier { name: String, line: u32 },
    #[error("line {line}: '{name}' is already defined")]
    DuplicateDefinition { name: String, line: u32 },
    #[error("line {line}: no code generation for operator '{op}'")]
    UnhandledOperator { op: &'static str, line: u32 },
    #[error("line {line}: left side of '=' is not assignable")]
    NotAssignable { line: u32 },
    #[error("line {line}: cannot take the address of a register or literal")]
    NotAddressable { line: u32 },
    #[error("line {line}: integer literal '{text}' does not fit in 64 bits")]
    InvalidLiteral { text: String, line: u32 },
    #[error("stack frame exceeds {} words", u16::MAX)]
    FrameOverflow,
}

pub type CodegenResult<T> = Result<T, CodegenError>;

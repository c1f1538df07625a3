use lir::Register;

use crate::{CodeVariable, Storage};

/// Width of an integer literal in machine words
pub const LITERAL_WIDTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Register(Register),
    /// Offset below `bp`
    Stack(u16),
    Immediate(i64),
}

/// Where an evaluated sub-expression lives. Each level of `indirection`
/// costs one load when the value is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstNodeValue {
    pub location: Location,
    pub signed: bool,
    pub width: u32,
    pub indirection: u32,
    /// Literals and computed results; only assignable through a pointer
    pub temporary: bool,
}

impl AstNodeValue {
    pub fn literal(value: i64) -> Self {
        Self {
            location: Location::Immediate(value),
            signed: true,
            width: LITERAL_WIDTH,
            indirection: 0,
            temporary: true,
        }
    }

    /// One word result that was pushed to the frame
    pub fn stack_slot(slot: u16, signed: bool) -> Self {
        Self {
            location: Location::Stack(slot),
            signed,
            width: 1,
            indirection: 0,
            temporary: true,
        }
    }

    /// Pointers always address a single word
    pub fn deref(self) -> Self {
        Self {
            indirection: self.indirection + 1,
            width: 1,
            ..self
        }
    }

    pub fn is_indirect(&self) -> bool {
        self.indirection > 0
    }

    /// Names a storage location that may be written
    pub fn is_assignable(&self) -> bool {
        self.is_indirect() || !self.temporary
    }
}

impl From<&CodeVariable> for AstNodeValue {
    fn from(var: &CodeVariable) -> Self {
        let location = match var.storage {
            Storage::Register(r) => Location::Register(r),
            Storage::Stack(slot) => Location::Stack(slot),
        };

        Self {
            location,
            signed: var.signed,
            width: var.width,
            indirection: 0,
            temporary: false,
        }
    }
}

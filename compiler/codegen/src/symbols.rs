use indexmap::IndexMap;
use lir::Register;

use crate::{CodegenError, CodegenResult};

/// Where a variable lives for the whole compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Register(Register),
    /// Offset below `bp`, always at least 1
    Stack(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeVariable {
    pub name: String,
    /// In machine words
    pub width: u32,
    pub signed: bool,
    /// Number of `*` in the declarator
    pub pointer_depth: u32,
    pub storage: Storage,
}

/// Variables in definition order, keyed by spelling
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    variables: IndexMap<String, CodeVariable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if the name is already taken; the existing entry is left untouched
    pub fn define(&mut self, variable: CodeVariable, line: u32) -> CodegenResult<&CodeVariable> {
        if self.variables.contains_key(&variable.name) {
            return Err(CodegenError::DuplicateDefinition {
                name: variable.name,
                line,
            });
        }

        let entry = self.variables.entry(variable.name.clone());
        Ok(entry.or_insert(variable))
    }

    pub fn lookup(&self, name: &str) -> Option<&CodeVariable> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeVariable> {
        self.variables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, storage: Storage) -> CodeVariable {
        CodeVariable {
            name: name.to_string(),
            width: 1,
            signed: true,
            pointer_depth: 0,
            storage,
        }
    }

    #[test]
    fn define_then_lookup() {
        let mut table = SymbolTable::new();
        table.define(var("a", Storage::Register(Register::R0)), 1).unwrap();
        table.define(var("b", Storage::Stack(1)), 1).unwrap();

        assert_eq!(
            table.lookup("b").map(|v| v.storage),
            Some(Storage::Stack(1))
        );
        assert!(table.lookup("c").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn keeps_definition_order() {
        let mut table = SymbolTable::new();
        for name in ["z", "a", "m"] {
            table.define(var(name, Storage::Stack(1)), 1).unwrap();
        }

        let names: Vec<_> = table.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut table = SymbolTable::new();
        table.define(var("a", Storage::Register(Register::R0)), 1).unwrap();

        let err = table.define(var("a", Storage::Stack(2)), 7).unwrap_err();

        assert_eq!(
            err,
            CodegenError::DuplicateDefinition {
                name: "a".to_string(),
                line: 7
            }
        );
        assert_eq!(
            table.lookup("a").map(|v| v.storage),
            Some(Storage::Register(Register::R0))
        );
    }
}

//! Semantic analysis: symbol table population, type checking, and object layout.

mod error;
pub mod layout;
mod populator;
mod symbol_table;
mod type_checker;

pub use error::{SemanticError, SemanticErrorKind};
pub use layout::{ClassLayout, FieldSlot, MethodSlot};
pub use populator::{Populator, ENTRY_METHOD};
pub use symbol_table::{ClassEntry, MethodEntry, Resolved, Storage, SymbolTable};
pub use type_checker::TypeChecker;
pub use crate::parser::Type;

use crate::parser::Program;

/// Populate a fresh symbol table from `program` and type check it
pub fn analyze(program: &Program) -> Result<SymbolTable, SemanticError> {
    let mut symbols = SymbolTable::new();
    Populator::new(&mut symbols).populate(program)?;
    TypeChecker::new(&mut symbols).check(program)?;
    Ok(symbols)
}

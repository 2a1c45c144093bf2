//! LLVM IR generation for type-checked programs.

mod error;
mod llvm_emitter;
mod value;

pub use error::CodegenError;
pub use llvm_emitter::LlvmEmitter;
pub use value::{IrType, Operand, Signature, Value};

use crate::parser::Program;
use crate::semantic::SymbolTable;

/// Lower `program` to LLVM IR text. `symbols` must come from a successful analysis.
pub fn generate(program: &Program, symbols: &SymbolTable) -> Result<String, CodegenError> {
    let mut ir = String::new();
    LlvmEmitter::new(symbols, &mut ir).emit(program)?;
    Ok(ir)
}

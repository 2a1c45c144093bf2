//! MJC - a MiniJava semantic analyzer and LLVM IR generator
//!
//! The pipeline lexes and parses a MiniJava program, builds a symbol table
//! with inheritance and override checks, type checks every method body and
//! lowers the result to textual LLVM IR with vtable dispatch and bounds checks.

pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod codegen;
pub mod diagnostics;
pub mod driver;

// Re-export commonly used types
pub use driver::{CompileOptions, Compilation, Driver};
pub use diagnostics::{Diagnostic, SourceLocation};

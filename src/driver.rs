//! Driver that orchestrates the compilation pipeline.

use tracing::{debug, info_span};

use crate::codegen;
use crate::diagnostics::{codes, Diagnostic, DiagnosticReporter};
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::semantic::{Populator, SymbolTable, TypeChecker};

/// Stage switches for one compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Generate LLVM IR after a successful analysis
    pub emit_ir: bool,
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            emit_ir: true,
            dump_tokens: false,
            dump_ast: false,
        }
    }
}

/// Output of a successful compilation
#[derive(Debug)]
pub struct Compilation {
    pub symbols: SymbolTable,
    /// `None` when IR generation was switched off
    pub ir: Option<String>,
}

/// The compilation driver
pub struct Driver {
    file: String,
    source: String,
    options: CompileOptions,
}

impl Driver {
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            options: CompileOptions::default(),
        }
    }

    pub fn set_emit_ir(&mut self, enabled: bool) {
        self.options.emit_ir = enabled;
    }

    pub fn set_dump_ast(&mut self, enabled: bool) {
        self.options.dump_ast = enabled;
    }

    pub fn set_dump_tokens(&mut self, enabled: bool) {
        self.options.dump_tokens = enabled;
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Run the compilation pipeline, stopping at the first failing stage
    pub fn compile(&self) -> Result<Compilation, Vec<Diagnostic>> {
        let mut reporter = DiagnosticReporter::new(&self.file, &self.source);

        // === Lexical Analysis ===
        let tokens = {
            let _span = info_span!("lex", file = %self.file).entered();
            Scanner::new(&self.source, &mut reporter).scan_tokens()
        };

        if self.options.dump_tokens {
            eprintln!("=== Tokens ===");
            for token in &tokens {
                eprintln!("  {:?}", token);
            }
            eprintln!();
        }

        if reporter.has_errors() {
            return Err(reporter.take_diagnostics());
        }

        // === Parsing ===
        let program = {
            let _span = info_span!("parse", file = %self.file).entered();
            Parser::new(tokens, &mut reporter).parse()
        };

        let program = match program {
            Some(program) if !reporter.has_errors() => program,
            _ => return Err(reporter.take_diagnostics()),
        };

        if self.options.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", program);
            eprintln!();
        }

        // === Semantic Analysis ===
        let mut symbols = SymbolTable::new();

        let populated = {
            let _span = info_span!("populate", file = %self.file).entered();
            Populator::new(&mut symbols).populate(&program)
        };
        let checked = populated.and_then(|()| {
            let _span = info_span!("typecheck", file = %self.file).entered();
            TypeChecker::new(&mut symbols).check(&program)
        });

        if let Err(err) = checked {
            debug!(line = err.line(), code = err.code(), "semantic analysis failed");
            reporter.report_span(err.to_diagnostic(), err.span, err.label());
            return Err(reporter.take_diagnostics());
        }

        debug!(
            classes = program.classes.len() + 1,
            methods = program.classes.iter().map(|c| c.methods.len()).sum::<usize>(),
            "analysis complete"
        );

        // === Code Generation ===
        let ir = if self.options.emit_ir {
            let _span = info_span!("codegen", file = %self.file).entered();
            match codegen::generate(&program, &symbols) {
                Ok(ir) => {
                    debug!(bytes = ir.len(), "emitted IR");
                    Some(ir)
                }
                Err(err) => {
                    reporter.add(Diagnostic::error(codes::INTERNAL_ERROR, err.to_string()));
                    return Err(reporter.take_diagnostics());
                }
            }
        } else {
            None
        };

        Ok(Compilation { symbols, ir })
    }
}

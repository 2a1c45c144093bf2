//! MiniJava Compiler CLI
//!
//! Usage: mjc [OPTIONS] <INPUT>...

use clap::Parser;
use colored::Colorize;
use mjc::semantic::layout::offset_report;
use mjc::{Diagnostic, Driver};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mjc")]
#[command(version = "0.1.0")]
#[command(about = "MiniJava Compiler - type checks MiniJava and emits LLVM IR", long_about = None)]
struct Args {
    /// Input MiniJava files (.java)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for generated .ll files (defaults to next to each input)
    #[arg(short = 'o', long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Run semantic checks only, without writing IR
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Print field offsets and method slots after analysis
    #[arg(long, default_value_t = false)]
    offsets: bool,

    /// Print the AST for debugging
    #[arg(long, default_value_t = false)]
    dump_ast: bool,

    /// Print tokens for debugging
    #[arg(long, default_value_t = false)]
    dump_tokens: bool,
}

fn main() -> ExitCode {
    // Initialize tracing if MJC_LOG is set
    if let Ok(filter) = EnvFilter::try_from_env("MJC_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();

    let mut failed = 0;
    for input in &args.inputs {
        if !compile_file(input, &args) {
            failed += 1;
        }
    }

    if failed > 0 {
        if args.inputs.len() > 1 {
            eprintln!(
                "\n{} of {} files failed",
                failed.to_string().red().bold(),
                args.inputs.len()
            );
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Compile one input, returning whether it succeeded
fn compile_file(input: &Path, args: &Args) -> bool {
    // Validate input file extension
    if input.extension().map_or(true, |ext| ext != "java") {
        eprintln!(
            "{}: input file must have .java extension: {}",
            "error".red().bold(),
            input.display()
        );
        return false;
    }

    // Read source file
    let source = match std::fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: could not read file '{}': {}",
                "error".red().bold(),
                input.display(),
                e
            );
            return false;
        }
    };

    let mut driver = Driver::new(input.to_string_lossy(), source);
    driver.set_emit_ir(!args.check);
    driver.set_dump_ast(args.dump_ast);
    driver.set_dump_tokens(args.dump_tokens);

    let compilation = match driver.compile() {
        Ok(compilation) => compilation,
        Err(diagnostics) => {
            report_failure(&diagnostics);
            return false;
        }
    };

    if args.offsets {
        print!("{}", offset_report(&compilation.symbols));
    }

    let Some(ir) = compilation.ir else {
        println!("{}: {}", "checked".green().bold(), input.display());
        return true;
    };

    let output = output_path(input, args.out_dir.as_deref());
    if let Err(e) = std::fs::write(&output, ir) {
        eprintln!(
            "{}: could not write file '{}': {}",
            "error".red().bold(),
            output.display(),
            e
        );
        return false;
    }

    println!(
        "{}: {} -> {}",
        "compiled".green().bold(),
        input.display(),
        output.display()
    );
    true
}

/// `<input>.ll`, placed in `out_dir` when one is given
fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let output = input.with_extension("ll");
    match (out_dir, output.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => output,
    }
}

fn report_failure(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("{}", diag);
    }

    let count = diagnostics.len();
    eprintln!(
        "\n{} generated",
        format!("{} error{}", count, if count == 1 { "" } else { "s" }).red().bold()
    );
}

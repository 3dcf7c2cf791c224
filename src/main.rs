// ----------------------------
// File: src/main.rs
// ----------------------------
//! Driver: argument handling, file I/O, stage wiring and exit codes.

use std::fs;
use std::process;

use clap::Parser;

use scc::back::CodeGenerator;
use scc::front::lexer::Scanner;
use scc::front::parser::Parser as SourceParser;
use scc::front::semantics::SemanticAnalyzer;
use scc::{CompileError, Options};

#[derive(Debug, clap::Parser)]
#[clap(version, about = "Small C-subset compiler emitting x86-64 assembly")]
struct Args {
    /// Input source file
    input: String,

    /// Output assembly file
    #[clap(short, long, default_value = "output.s")]
    output: String,

    /// Disable constant folding
    #[clap(long)]
    no_fold: bool,

    /// Disable dead-branch elimination
    #[clap(long)]
    no_dbe: bool,

    /// Print per-stage progress
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let options = Options {
        fold_constants: !args.no_fold,
        eliminate_dead_branches: !args.no_dbe,
    };

    let source = match fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("scc: error: could not read {}: {}", args.input, e);
            process::exit(1);
        }
    };
    if args.verbose {
        println!("Reading source file: {}", args.input);
    }

    let tokens = Scanner::new(&source).tokenize();
    if args.verbose {
        println!("Tokens generated: {}", tokens.len());
    }

    let mut program = match SourceParser::new(tokens).parse() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    if args.verbose {
        println!("Syntax analysis completed.");
    }

    let errors = SemanticAnalyzer::new().analyze(&mut program);
    if !errors.is_empty() {
        eprintln!("{}", CompileError::Semantic(errors));
        process::exit(1);
    }
    if args.verbose {
        println!("Semantic analysis completed.");
    }

    let assembly = CodeGenerator::new(&options).generate(&program);
    if args.verbose {
        println!("Code generation completed.");
    }

    if let Err(e) = fs::write(&args.output, assembly) {
        eprintln!("scc: error: could not write {}: {}", args.output, e);
        process::exit(1);
    }

    if args.verbose {
        println!("Assembly written to: {}", args.output);
        println!("To assemble and run:");
        println!("  gcc -no-pie {} -o program", args.output);
        println!("  ./program");
    }
}

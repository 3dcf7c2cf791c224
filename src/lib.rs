// ----------------------------
// File: src/lib.rs
// ----------------------------
//! Crate root: wires the compilation pipeline together.
//!
//! Data flow is strictly linear: source text → tokens → AST → annotated
//! AST → assembly text. The analyzer and the generator each populate their
//! own symbol table; nothing reaches back into an earlier stage.

pub mod back;
pub mod error;
pub mod front;
pub mod symtab;

pub use error::{CompileError, CompileResult};

use back::CodeGenerator;
use front::lexer::Scanner;
use front::parser::Parser;
use front::semantics::SemanticAnalyzer;

/// Caller-togglable behavior of the code generator.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub fold_constants: bool,
    pub eliminate_dead_branches: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { fold_constants: true, eliminate_dead_branches: true }
    }
}

/// Compile one translation unit into GNU-assembler x86-64 text.
pub fn compile(source: &str, options: &Options) -> CompileResult<String> {
    let tokens = Scanner::new(source).tokenize();
    let mut program = Parser::new(tokens).parse()?;

    let errors = SemanticAnalyzer::new().analyze(&mut program);
    if !errors.is_empty() {
        return Err(CompileError::Semantic(errors));
    }

    Ok(CodeGenerator::new(options).generate(&program))
}

// ----------------------------
// File: src/error.rs
// ----------------------------
//! Error types shared across the compilation pipeline.

use thiserror::Error;

use crate::front::ast::DataType;

pub type CompileResult<T> = Result<T, CompileError>;

/// A syntax violation. Fatal: the parser reports the first one and stops.
#[derive(Debug, Clone, Error)]
#[error("parse error at line {line}: {message} (got '{found}')")]
pub struct ParseError {
    pub line: u32,
    pub message: String,
    pub found: String,
}

impl ParseError {
    pub fn new(line: u32, message: impl Into<String>, found: impl Into<String>) -> Self {
        Self { line, message: message.into(), found: found.into() }
    }
}

/// One semantic violation. The analyzer accumulates these and keeps going.
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("undefined function '{0}'")]
    UndefinedFunction(String),

    #[error("function '{name}' expects {expected} arguments, got {got}")]
    ArityMismatch { name: String, expected: usize, got: usize },

    #[error("type mismatch in argument {index} of function '{name}'")]
    ArgumentTypeMismatch { name: String, index: usize },

    #[error("type mismatch in declaration of '{name}': cannot initialize {declared} from {found}")]
    DeclTypeMismatch { name: String, declared: DataType, found: DataType },

    #[error("type mismatch in assignment: cannot assign {found} to {target}")]
    AssignTypeMismatch { target: DataType, found: DataType },

    #[error("return type mismatch: expected {expected}, found {found}")]
    ReturnTypeMismatch { expected: DataType, found: DataType },

    #[error("function must return a value")]
    MissingReturnValue,

    #[error("variable '{0}' already declared in this scope")]
    Redeclaration(String),

    #[error("function '{0}' already declared")]
    FunctionRedeclaration(String),

    #[error("array index must be of integer type")]
    NonIntegerIndex,

    #[error("array access requires a named array")]
    UnnamedArrayBase,

    #[error("left side of assignment must be an lvalue")]
    NotAnLValue,

    #[error("no main function defined")]
    MissingMain,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{}", format_semantic(.0))]
    Semantic(Vec<SemanticError>),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

fn format_semantic(errors: &[SemanticError]) -> String {
    errors
        .iter()
        .map(|e| format!("semantic error: {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

use sqlparser::parser::ParserError;
use thiserror::Error;

/// A filter could not be turned into an executable predicate or SQL text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("row type must be a struct, found {rel_type}")]
    NotAStruct { rel_type: String },
    #[error("column {column} is out of range for a row of {width} columns")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("column {column} of type {rel_type} cannot be used in a filter")]
    UnsupportedColumnType { column: usize, rel_type: String },
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: String,
        right: String,
    },
    #[error("function '{name}' is not supported")]
    UnsupportedFunction { name: String },
    #[error("LIKE pattern must be a string literal")]
    NonLiteralPattern,
    #[error("'{value}' is not a valid {target} literal")]
    InvalidLiteral { value: String, target: &'static str },
    #[error("filter evaluates to {found}, not a boolean")]
    NotAPredicate { found: String },
}

/// A SQL statement could not be planned.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to parse SQL: {0}")]
    Parse(#[from] ParserError),
    #[error("unsupported SQL: {0}")]
    Unsupported(String),
    #[error("unknown table '{name}'")]
    UnknownTable { name: String },
    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

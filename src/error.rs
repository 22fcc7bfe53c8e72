//! Typed errors for every stage of the pipeline
//!
//! Reading and compiling fail with `ReadError` / `CompileError`. Evaluation
//! fails with a `Condition`, the same value user code can catch.

use crate::reader::SourceLoc;
use crate::value::Condition;
use thiserror::Error;

/// Pipeline result type
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed source text
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{loc}: {message}")]
pub struct ReadError {
    pub message: String,
    pub loc: SourceLoc,
}

impl ReadError {
    pub fn new(message: impl Into<String>, loc: SourceLoc) -> Self {
        ReadError {
            message: message.into(),
            loc,
        }
    }
}

/// A form that cannot be turned into an expression tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A breakpoint operation called from a function literal nested inside a
    /// coroutine body
    #[error("scope violation: `{op}` cannot be used inside a nested function literal: {form}")]
    ScopeViolation { op: String, form: String },

    #[error("recur is only allowed in tail position of a loop: {0}")]
    MisplacedRecur(String),

    #[error("recur expects {expected} argument(s), got {got}")]
    RecurArity { expected: usize, got: usize },

    #[error("breakpoint `{0}` is already registered in this table")]
    DuplicateBreakpoint(String),

    #[error("bad call to breakpoint `{op}`: {reason}")]
    BadBreakpointCall { op: String, reason: String },

    #[error("unknown coroutine flavor: {0}")]
    UnknownFlavor(String),
}

impl CompileError {
    pub fn syntax(message: impl Into<String>) -> Self {
        CompileError::Syntax(message.into())
    }
}

/// Any failure of `eval_all` and friends
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("runtime error: {0}")]
    Runtime(#[from] Condition),
}

impl std::error::Error for Condition {}

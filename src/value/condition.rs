//! Condition objects for the exception system
//!
//! Conditions are the runtime error values of the language. They carry:
//! - A kind (for catch-clause matching)
//! - A mandatory message (human-readable description)
//! - An optional payload value
//!
//! Every kind is a subkind of `error`, so `(catch :error e ...)` catches
//! anything a catch-all clause would.

use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Result of any runtime operation
pub type LResult<T> = Result<T, Condition>;

/// Condition kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Error,
    TypeError,
    ArityError,
    UndefinedVariable,
    DivisionByZero,
    /// A breakpoint operation was called outside the part of a coroutine
    /// body that the transform rewrites
    ScopeViolation,
    /// A trampoline level exceeded the configured step limit
    TrampolineLimit,
    /// Kind named by user code, e.g. `(error :timeout "too slow")`
    User(Rc<str>),
}

impl ConditionKind {
    /// Keyword spelling used by `catch` clauses and `error-kind`
    pub fn name(&self) -> &str {
        match self {
            ConditionKind::Error => "error",
            ConditionKind::TypeError => "type-error",
            ConditionKind::ArityError => "arity-error",
            ConditionKind::UndefinedVariable => "undefined-variable",
            ConditionKind::DivisionByZero => "division-by-zero",
            ConditionKind::ScopeViolation => "scope-violation",
            ConditionKind::TrampolineLimit => "trampoline-limit",
            ConditionKind::User(name) => name,
        }
    }

    /// Kind for a keyword name; unknown names become user kinds
    pub fn from_name(name: &str) -> Self {
        match name {
            "error" => ConditionKind::Error,
            "type-error" => ConditionKind::TypeError,
            "arity-error" => ConditionKind::ArityError,
            "undefined-variable" => ConditionKind::UndefinedVariable,
            "division-by-zero" => ConditionKind::DivisionByZero,
            "scope-violation" => ConditionKind::ScopeViolation,
            "trampoline-limit" => ConditionKind::TrampolineLimit,
            other => ConditionKind::User(Rc::from(other)),
        }
    }

    /// Check whether this kind is caught by a clause naming `name`
    pub fn is_a(&self, name: &str) -> bool {
        name == "error" || self.name() == name
    }
}

/// A condition object representing an exceptional situation
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub kind: ConditionKind,
    /// Human-readable message (mandatory)
    pub message: Rc<str>,
    /// Payload attached by `ex-info` or by `throw` of a non-condition value
    pub data: Value,
}

impl Condition {
    pub fn new(kind: ConditionKind, message: impl AsRef<str>) -> Self {
        Condition {
            kind,
            message: Rc::from(message.as_ref()),
            data: Value::Nil,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    // Named constructors

    pub fn error(msg: impl AsRef<str>) -> Self {
        Self::new(ConditionKind::Error, msg)
    }

    pub fn type_error(msg: impl AsRef<str>) -> Self {
        Self::new(ConditionKind::TypeError, msg)
    }

    pub fn arity_error(msg: impl AsRef<str>) -> Self {
        Self::new(ConditionKind::ArityError, msg)
    }

    pub fn undefined_variable(msg: impl AsRef<str>) -> Self {
        Self::new(ConditionKind::UndefinedVariable, msg)
    }

    pub fn division_by_zero(msg: impl AsRef<str>) -> Self {
        Self::new(ConditionKind::DivisionByZero, msg)
    }

    pub fn scope_violation(msg: impl AsRef<str>) -> Self {
        Self::new(ConditionKind::ScopeViolation, msg)
    }

    pub fn trampoline_limit(limit: u64) -> Self {
        Self::new(
            ConditionKind::TrampolineLimit,
            format!("trampoline exceeded step limit ({})", limit),
        )
    }

    /// Check the argument count of a native function
    pub fn check_arity(name: &str, args: &[Value], expected: usize) -> LResult<()> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(Self::arity_error(format!(
                "{}: expected {} argument{}, got {}",
                name,
                expected,
                if expected == 1 { "" } else { "s" },
                args.len()
            )))
        }
    }

    /// Build the condition raised when `(throw v)` is evaluated.
    ///
    /// A thrown condition is rethrown as is; any other value is wrapped in an
    /// `error` condition carrying the value as its payload.
    pub fn from_thrown(value: &Value) -> Self {
        match value {
            Value::Condition(cond) => (**cond).clone(),
            Value::String(s) => Self::error(&**s),
            other => Self::error(format!("uncaught value: {}", other)).with_data(other.clone()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl From<Condition> for Value {
    fn from(cond: Condition) -> Self {
        Value::Condition(Rc::new(cond))
    }
}

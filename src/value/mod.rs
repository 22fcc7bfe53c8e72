//! Runtime values
//!
//! `Value` doubles as the reader's output: source forms are plain lists,
//! vectors, symbols and literals that the converter turns into `Expr` trees.

pub mod closure;
pub mod condition;
pub mod coroutine;

pub use closure::{Closure, NativeFn, Thunk};
pub use condition::{Condition, ConditionKind, LResult};
pub use coroutine::{Execution, ExecutionState};

use crate::symbol::SymbolId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An interned symbol together with its spelling
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: Rc<str>,
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Rc<str>),
    Symbol(Symbol),
    Keyword(Rc<str>),
    List(Rc<Vec<Value>>),
    Vector(Rc<Vec<Value>>),
    Closure(Rc<Closure>),
    Native(NativeFn),
    Condition(Rc<Condition>),
    Thunk(Rc<Thunk>),
    Atom(Rc<RefCell<Value>>),
    Execution(Rc<Execution>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            // Lists and vectors with the same elements are equal
            (Value::List(a) | Value::Vector(a), Value::List(b) | Value::Vector(b)) => a == b,
            (Value::Condition(a), Value::Condition(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            (Value::Thunk(a), Value::Thunk(b)) => Rc::ptr_eq(a, b),
            (Value::Atom(a), Value::Atom(b)) => Rc::ptr_eq(a, b),
            (Value::Execution(a), Value::Execution(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn keyword(s: &str) -> Self {
        Value::Keyword(Rc::from(s))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(Rc::new(items))
    }

    pub fn native(name: &str, func: impl Fn(&[Value]) -> LResult<Value> + 'static) -> Self {
        Value::Native(NativeFn::new(name, func))
    }

    pub fn thunk(resume: Value) -> Self {
        Value::Thunk(Rc::new(Thunk::new(resume)))
    }

    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only nil and false are falsy
    #[inline(always)]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    pub fn is_thunk(&self) -> bool {
        matches!(self, Value::Thunk(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Native(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Closure(_) => "function",
            Value::Native(_) => "native-function",
            Value::Condition(_) => "condition",
            Value::Thunk(_) => "thunk",
            Value::Atom(_) => "atom",
            Value::Execution(_) => "execution",
        }
    }

    pub fn as_int(&self) -> LResult<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(Condition::type_error(format!(
                "expected integer, got {}",
                self.type_name()
            ))),
        }
    }

    pub fn as_float(&self) -> LResult<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            _ => Err(Condition::type_error(format!(
                "expected number, got {}",
                self.type_name()
            ))),
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// Elements of a list or vector
    pub fn as_seq(&self) -> LResult<&[Value]> {
        match self {
            Value::List(items) | Value::Vector(items) => Ok(items),
            Value::Nil => Ok(&[]),
            _ => Err(Condition::type_error(format!(
                "expected list or vector, got {}",
                self.type_name()
            ))),
        }
    }

    /// Apply this value as a function
    pub fn call(&self, args: &[Value]) -> LResult<Value> {
        crate::vm::apply(self, args)
    }

    /// Text used by `str` and `println`: strings without quotes
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", &**s),
            Value::Symbol(sym) => write!(f, "{}", sym.name),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::List(items) => write_seq(f, "(", items, ")"),
            Value::Vector(items) => write_seq(f, "[", items, "]"),
            Value::Closure(c) => match c.lambda.name_str() {
                Some(name) => write!(f, "#<fn {}>", name),
                None => write!(f, "#<fn>"),
            },
            Value::Native(n) => write!(f, "#<native {}>", n.name),
            Value::Condition(c) => write!(f, "#<condition {}>", c),
            Value::Thunk(_) => write!(f, "#<thunk>"),
            Value::Atom(a) => write!(f, "#<atom {}>", a.borrow()),
            Value::Execution(e) => write!(f, "{}", e),
        }
    }
}

//! Callable values: closures, native functions and trampoline thunks

use crate::compiler::ast::Lambda;
use crate::value::{LResult, Value};
use crate::vm::Env;
use std::fmt;
use std::rc::Rc;

/// Closure with captured environment
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Env,
}

impl Closure {
    pub fn new(lambda: Rc<Lambda>, env: Env) -> Self {
        Closure { lambda, env }
    }

    pub fn arity(&self) -> usize {
        self.lambda.params.len()
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure(arity={})", self.arity())
    }
}

type NativeBody = dyn Fn(&[Value]) -> LResult<Value>;

/// A function implemented in Rust
///
/// Native functions compare by identity. The CPS transform embeds some of
/// them directly in the trees it emits, so user code cannot shadow them.
#[derive(Clone)]
pub struct NativeFn {
    pub name: Rc<str>,
    func: Rc<NativeBody>,
}

impl NativeFn {
    pub fn new(name: &str, func: impl Fn(&[Value]) -> LResult<Value> + 'static) -> Self {
        NativeFn {
            name: Rc::from(name),
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> LResult<Value> {
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

/// Deferred resumption marker consumed by the trampoline
///
/// Wraps a zero-argument callable. Being its own variant of `Value` keeps a
/// pending resumption distinct from a function that merely returns another
/// function.
#[derive(Debug)]
pub struct Thunk {
    resume: Value,
}

impl Thunk {
    pub fn new(resume: Value) -> Self {
        Thunk { resume }
    }

    /// Invoke the wrapped callable
    pub fn force(&self) -> LResult<Value> {
        self.resume.call(&[])
    }
}

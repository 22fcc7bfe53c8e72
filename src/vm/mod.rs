//! The evaluator and its global state

pub mod env;
mod eval;

pub use env::Env;
pub use eval::{apply, eval};

use crate::breakpoint::{sentinel, BreakpointTable, Flavors};
use crate::compiler::ast::Expr;
use crate::compiler::cps::trampoline;
use crate::compiler::{CompileOptions, Converter};
use crate::error::CompileError;
use crate::symbol::{SymbolId, SymbolTable};
use crate::value::{LResult, Value};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Global definitions, shared by every closure
pub struct Globals {
    defs: RefCell<FxHashMap<SymbolId, Value>>,
    symbols: SymbolTable,
}

impl Globals {
    pub fn new(symbols: &SymbolTable) -> Self {
        Globals {
            defs: RefCell::new(FxHashMap::default()),
            symbols: symbols.clone(),
        }
    }

    pub fn define(&self, name: SymbolId, value: Value) {
        self.defs.borrow_mut().insert(name, value);
    }

    pub fn get(&self, name: SymbolId) -> Option<Value> {
        self.defs.borrow().get(&name).cloned()
    }

    pub fn is_defined(&self, name: SymbolId) -> bool {
        self.defs.borrow().contains_key(&name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

pub struct VM {
    globals: Rc<Globals>,
    symbols: SymbolTable,
    flavors: Flavors,
    options: CompileOptions,
}

impl VM {
    /// A VM with the default flavors and no primitives
    pub fn new(symbols: &SymbolTable) -> Self {
        VM {
            globals: Rc::new(Globals::new(symbols)),
            symbols: symbols.clone(),
            flavors: Flavors::with_defaults(symbols),
            options: CompileOptions::default(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn set_options(&mut self, options: CompileOptions) {
        self.options = options;
    }

    pub fn flavors(&self) -> &Flavors {
        &self.flavors
    }

    /// Define a global by name
    pub fn define(&self, name: &str, value: Value) {
        self.globals.define(self.symbols.intern(name), value);
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.symbols.get(name).and_then(|id| self.globals.get(id))
    }

    /// Add or replace a coroutine flavor.
    ///
    /// Each breakpoint of the flavor that has no global definition yet gets
    /// its scope-violation sentinel, so a call that escapes the transform
    /// fails with a clear condition instead of an undefined variable.
    pub fn register_flavor(&mut self, name: &str, table: BreakpointTable) {
        for op in table.ops() {
            if !self.globals.is_defined(op) {
                let op_name = self.symbols.name_or_placeholder(op);
                self.globals.define(op, sentinel(&op_name));
            }
        }
        debug!(flavor = name, breakpoints = table.len(), "registering flavor");
        self.flavors.register(name, table);
    }

    /// Convert a form into an expression tree, transforming coroutines
    pub fn compile(&self, form: &Value) -> Result<Expr, CompileError> {
        Converter::new(&self.symbols, &self.flavors, self.options).convert(form)
    }

    /// Evaluate an expression tree at top level.
    ///
    /// The evaluation runs in its own trampoline level: a thunk it returns
    /// is unwound and resumptions deferred during it complete before this
    /// returns.
    pub fn eval(&self, expr: &Expr) -> LResult<Value> {
        let env = Env::new(self.globals.clone());
        trampoline::trampoline(|| eval::eval(expr, &env))
    }
}

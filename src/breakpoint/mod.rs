//! Breakpoint tables: the extension surface of the CPS transform
//!
//! A breakpoint is an operation whose call sites inside a coroutine body are
//! rewritten instead of being evaluated in direct style. A table maps each
//! breakpoint's identifier to a handler that produces the replacement code
//! for a call site. Coroutine flavors are nothing more than named tables;
//! adding a flavor never touches the transformer.

mod await_handler;

pub use await_handler::{scope_violation, sentinel, AwaitHandler};

use crate::compiler::ast::Expr;
use crate::compiler::cps::LexicalEnv;
use crate::error::CompileError;
use crate::symbol::{SymbolId, SymbolTable};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Everything a handler knows about the call site it is rewriting
pub struct BreakpointSite<'a> {
    /// The operation being called
    pub op: SymbolId,
    /// Names lexically bound at the call site
    pub env: &'a LexicalEnv,
    /// Continuation that receives the call's value
    pub success: SymbolId,
    /// Continuation that receives an error raised after the suspension
    pub failure: SymbolId,
    pub symbols: &'a SymbolTable,
}

impl BreakpointSite<'_> {
    pub fn op_name(&self) -> String {
        self.symbols.name_or_placeholder(self.op).to_string()
    }
}

/// Generates replacement code for calls to one breakpoint operation
pub trait BreakpointHandler {
    /// Build the expression that replaces `(op args...)`.
    ///
    /// `args` are in source order. Each is either an atom or an expression
    /// with no reachable breakpoint; the replacement must evaluate each of
    /// them exactly once, left to right, before control leaves the call
    /// site. The replacement must eventually deliver exactly one value to
    /// `site.success` or one error to `site.failure`.
    fn generate(&self, site: &BreakpointSite<'_>, args: Vec<Expr>) -> Result<Expr, CompileError>;
}

/// Mapping from operation identifier to handler
#[derive(Clone, Default)]
pub struct BreakpointTable {
    handlers: FxHashMap<SymbolId, Rc<dyn BreakpointHandler>>,
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a breakpoint. Keys are unique.
    pub fn register(
        &mut self,
        symbols: &SymbolTable,
        name: &str,
        handler: Rc<dyn BreakpointHandler>,
    ) -> Result<(), CompileError> {
        let id = symbols.intern(name);
        if self.handlers.contains_key(&id) {
            return Err(CompileError::DuplicateBreakpoint(name.to_string()));
        }
        self.handlers.insert(id, handler);
        Ok(())
    }

    pub fn contains(&self, op: SymbolId) -> bool {
        self.handlers.contains_key(&op)
    }

    pub fn get(&self, op: SymbolId) -> Option<&Rc<dyn BreakpointHandler>> {
        self.handlers.get(&op)
    }

    pub fn ops(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.handlers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Flavor used by `(async ...)`
pub const DEFAULT_FLAVOR: &str = "async";

/// Named breakpoint tables selectable with `(coroutine :flavor ...)`
#[derive(Clone, Default)]
pub struct Flavors {
    tables: FxHashMap<Rc<str>, Rc<BreakpointTable>>,
}

impl Flavors {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in flavors: `async`, whose only breakpoint is `await`
    pub fn with_defaults(symbols: &SymbolTable) -> Self {
        let mut table = BreakpointTable::new();
        // A fresh table cannot already hold `await`
        let _ = table.register(symbols, "await", Rc::new(AwaitHandler));
        let mut flavors = Flavors::new();
        flavors.register(DEFAULT_FLAVOR, table);
        flavors
    }

    /// Add or replace a flavor
    pub fn register(&mut self, name: &str, table: BreakpointTable) {
        self.tables.insert(Rc::from(name), Rc::new(table));
    }

    pub fn get(&self, name: &str) -> Result<Rc<BreakpointTable>, CompileError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| CompileError::UnknownFlavor(name.to_string()))
    }
}

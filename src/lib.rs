//! # Tether - selective CPS coroutines for a small Lisp
//!
//! Tether compiles the bodies of coroutines into continuation-passing style,
//! but only along the control paths that can reach a *breakpoint*: a call
//! whose result arrives later, through a continuation. Everything else in a
//! coroutine body runs as ordinary direct-style code.
//!
//! ## Quick Start
//!
//! ```
//! use tether::{eval_all, register_primitives, SymbolTable, Value, VM};
//!
//! let symbols = SymbolTable::new();
//! let vm = VM::new(&symbols);
//! register_primitives(&vm);
//!
//! let code = r#"
//!   (def result (atom nil))
//!   (run (async (+ 1 (await resolved 2)))
//!        (fn [v] (reset! result v))
//!        (fn [e] (reset! result e)))
//!   (deref result)
//! "#;
//! assert_eq!(eval_all(code, &vm).unwrap(), Value::Int(3));
//! ```
//!
//! ## Architecture
//!
//! 1. **Reader** - Parse S-expressions from text
//! 2. **Converter** - Turn forms into expression trees; coroutine bodies are
//!    scope-checked and CPS-transformed here
//! 3. **VM** - Evaluate trees; thunks and resumed continuations are driven
//!    by the trampoline so the native stack stays bounded
//!
//! Breakpoints are registered per *flavor* (`BreakpointTable`); the
//! built-in `async` flavor has a single breakpoint, `await`.

pub mod breakpoint;
pub mod compiler;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod reader;
pub mod symbol;
pub mod value;
pub mod vm;

pub use breakpoint::{BreakpointHandler, BreakpointSite, BreakpointTable, Flavors};
pub use compiler::cps::{run, trampoline, unwind, CpsTransformer, TrampolineConfig};
pub use compiler::{CompileOptions, ScopeCheck};
pub use error::{CompileError, Error, ReadError};
pub use pipeline::{compile_all, eval_all};
pub use primitives::register_primitives;
pub use reader::{read_all, read_str};
pub use symbol::SymbolTable;
pub use value::{Condition, ConditionKind, Value};
pub use vm::VM;

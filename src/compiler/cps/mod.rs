//! Continuation-passing style transformation for coroutine bodies
//!
//! This module rewrites the parts of a coroutine body that can reach a
//! breakpoint into continuation-passing style, and provides the trampoline
//! that drives the result without growing the native stack.
//!
//! Key components:
//! - `TransformContext`: success/failure continuations, lexical names and
//!   the active loop head at a point in the body
//! - `CpsTransformer`: the selective transform itself
//! - `trampoline`: thunk forcing and deferred resumption

mod context;
pub mod trampoline;
mod transform;

pub use context::{LexicalEnv, LoopHead, TransformContext};
pub use trampoline::{run, trampoline, unwind, TrampolineConfig};
pub use transform::CpsTransformer;

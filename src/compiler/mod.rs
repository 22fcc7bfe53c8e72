pub mod analysis;
pub mod ast;
pub mod converters;
pub mod cps;

pub use converters::Converter;

/// What to do with a breakpoint used inside a function literal nested in a
/// coroutine body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeCheck {
    /// Refuse to compile the coroutine
    #[default]
    Reject,
    /// Compile it; the call reaches the breakpoint's global sentinel and
    /// raises a `scope-violation` condition when it runs
    Defer,
}

/// Compiler configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub scope_check: ScopeCheck,
}

//! Trampoline for driving CPS-transformed coroutines
//!
//! Transformed loops never re-enter their head by direct recursion: each
//! iteration returns a `Value::Thunk` and the unwind loop here forces it.
//! Resumed continuations handed out by breakpoint handlers go through
//! `resume`, which queues the work on the innermost active level instead of
//! running it on top of whatever stack invoked the continuation. Either
//! way the Rust stack depth stays bounded by the nesting depth of the
//! source, not by the number of iterations or suspensions.
//!
//! Levels nest: a thunk may itself start a trampoline (for instance by
//! calling `run`), which pushes a new level that is drained before the
//! outer one continues.

use crate::context;
use crate::value::{Condition, Execution, ExecutionState, LResult, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Configuration for trampoline execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrampolineConfig {
    /// Maximum number of thunks forced and deferred items run in a single
    /// level before it fails with a `trampoline-limit` condition
    pub step_limit: Option<u64>,
}

/// Work deferred to the innermost active level
pub type Deferred = Box<dyn FnOnce() -> LResult<Value>>;

struct Level {
    queue: VecDeque<Deferred>,
    steps: u64,
}

thread_local! {
    static LEVELS: RefCell<Vec<Level>> = const { RefCell::new(Vec::new()) };
    static CONFIG: Cell<TrampolineConfig> = const { Cell::new(TrampolineConfig { step_limit: None }) };
}

/// Install the configuration used by trampolines on this thread
pub fn set_config(config: TrampolineConfig) {
    CONFIG.with(|c| c.set(config));
}

pub fn config() -> TrampolineConfig {
    CONFIG.with(|c| c.get())
}

/// Is a trampoline level active on this thread?
pub fn is_active() -> bool {
    LEVELS.with(|levels| !levels.borrow().is_empty())
}

/// Pops its level when dropped, including when a step panics
struct LevelGuard {
    depth: usize,
}

impl LevelGuard {
    fn push() -> Self {
        let depth = LEVELS.with(|levels| {
            let mut levels = levels.borrow_mut();
            levels.push(Level {
                queue: VecDeque::new(),
                steps: 0,
            });
            levels.len()
        });
        trace!(depth, "trampoline level pushed");
        LevelGuard { depth }
    }
}

impl Drop for LevelGuard {
    fn drop(&mut self) {
        LEVELS.with(|levels| {
            let mut levels = levels.borrow_mut();
            debug_assert_eq!(levels.len(), self.depth);
            levels.pop();
        });
    }
}

/// Count one step against the innermost level's limit
fn step() -> LResult<()> {
    let Some(limit) = config().step_limit else {
        return Ok(());
    };
    let steps = LEVELS.with(|levels| {
        levels.borrow_mut().last_mut().map_or(0, |level| {
            level.steps += 1;
            level.steps
        })
    });
    if steps > limit {
        Err(Condition::trampoline_limit(limit))
    } else {
        Ok(())
    }
}

/// Force thunks until a non-thunk value is produced
fn drive(mut value: Value) -> LResult<Value> {
    while let Value::Thunk(thunk) = value {
        step()?;
        value = thunk.force()?;
    }
    Ok(value)
}

fn pop_deferred() -> Option<Deferred> {
    LEVELS.with(|levels| {
        levels
            .borrow_mut()
            .last_mut()
            .and_then(|level| level.queue.pop_front())
    })
}

/// Run every item queued on the current level, in order, including items
/// queued while draining. Returns the first error; later ones are logged.
fn drain() -> LResult<()> {
    let mut first_error = None;
    let mut drained = 0usize;
    while let Some(work) = pop_deferred() {
        drained += 1;
        let result = step().and_then(|_| work()).and_then(drive);
        if let Err(err) = result {
            if first_error.is_none() {
                first_error = Some(err);
            } else {
                warn!(error = %err, "additional error while draining trampoline level");
            }
        }
    }
    if drained > 0 {
        trace!(drained, "trampoline level drained");
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Run `start` inside a fresh trampoline level.
///
/// The value it returns is unwound, then every resumption deferred onto the
/// level is run to completion. An error from `start` takes precedence over
/// errors from deferred work.
pub fn trampoline(start: impl FnOnce() -> LResult<Value>) -> LResult<Value> {
    let _level = LevelGuard::push();
    let result = start().and_then(drive);
    let drained = drain();
    let value = result?;
    drained?;
    Ok(value)
}

/// Unwind `value`: force it while it is a thunk.
///
/// Safe to call from inside a thunk; the nested call gets its own level.
pub fn unwind(value: Value) -> LResult<Value> {
    trampoline(|| Ok(value))
}

/// Run resumed work.
///
/// Inside an active level the work is queued and `nil` is returned
/// immediately; the level runs it once the current step returns. With no
/// level active (a continuation invoked from outside any trampoline, e.g.
/// by an event loop callback) the work runs now in a level of its own.
pub fn resume(work: Deferred) -> LResult<Value> {
    let queued = LEVELS.with(|levels| match levels.borrow_mut().last_mut() {
        Some(level) => {
            level.queue.push_back(work);
            None
        }
        None => Some(work),
    });
    match queued {
        None => Ok(Value::Nil),
        Some(work) => trampoline(work),
    }
}

/// `(thunk f)`: wrap a zero-argument function as a deferred resumption
pub fn make_thunk(args: &[Value]) -> LResult<Value> {
    Condition::check_arity("thunk", args, 1)?;
    if !args[0].is_callable() {
        return Err(Condition::type_error(format!(
            "thunk: expected a function, got {}",
            args[0].type_name()
        )));
    }
    Ok(Value::thunk(args[0].clone()))
}

/// `make_thunk` as a value, for embedding in transformed trees
pub fn thunk_native() -> Value {
    Value::native("thunk", make_thunk)
}

/// Start a compiled coroutine.
///
/// `coroutine` is called with wrapped `resolve`/`reject` continuations inside
/// a fresh trampoline level, with a new execution current for its dynamic
/// extent. Everything the coroutine does synchronously, including
/// resumptions that happen before it first truly suspends, completes before
/// this returns. An error thrown before the first suspension is delivered to
/// `reject` rather than propagated; an error thrown by `reject` itself (or
/// by `resolve`) is propagated, and neither is ever called twice for it.
pub fn run(coroutine: &Value, resolve: Value, reject: Value) -> LResult<Rc<Execution>> {
    let execution = Rc::new(Execution::new());
    let on_success = settle(execution.clone(), ExecutionState::Completed, resolve);
    let on_failure = settle(execution.clone(), ExecutionState::Failed, reject);
    debug!(execution = execution.id(), "running coroutine");

    let snapshot = context::capture().with_execution(execution.clone());
    snapshot.enter(|| {
        trampoline(|| match coroutine.call(&[on_success, on_failure.clone()]) {
            Err(err) if !execution.is_terminal() => on_failure.call(&[err.into()]),
            other => other,
        })
    })?;
    Ok(execution)
}

/// Mark `execution` finished with `outcome`, then forward to `target`.
///
/// The forward is queued on the trampoline, so `target` runs after the
/// step that settled the coroutine has returned and outside every guard and
/// catch clause of the body. An error it throws leaves through the level
/// that runs it instead of re-entering the coroutine.
fn settle(execution: Rc<Execution>, outcome: ExecutionState, target: Value) -> Value {
    let name = match outcome {
        ExecutionState::Completed => "resolve",
        _ => "reject",
    };
    Value::native(name, move |args| {
        Condition::check_arity(name, args, 1)?;
        execution.finish(outcome);
        let (target, value) = (target.clone(), args[0].clone());
        let snapshot = context::capture();
        resume(Box::new(move || snapshot.enter(|| target.call(&[value]))))
    })
}

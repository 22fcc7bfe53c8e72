//! Thread-local dynamic context and its capture/restore wrapper.
//!
//! The dynamic context is what code can observe without it being passed
//! explicitly: the stack of `binding` frames and the coroutine execution
//! currently being driven. A resumed continuation may run long after (and
//! far away from) the call that suspended it, so breakpoint handlers
//! `capture` a `Snapshot` when they hand out continuations and `enter` it
//! around the resumed work. The previous context is reinstated by a drop
//! guard, so it is restored on normal return, on error and on unwinding.

use crate::symbol::SymbolId;
use crate::value::{Condition, Execution, LResult, Value};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// One `binding` form's worth of dynamic bindings
#[derive(Debug)]
pub struct BindingFrame {
    bindings: SmallVec<[(SymbolId, Value); 2]>,
    parent: Option<Rc<BindingFrame>>,
    depth: usize,
}

impl BindingFrame {
    fn lookup(&self, id: SymbolId) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(name, _)| *name == id)
            .map(|(_, value)| value)
    }
}

/// Captured dynamic context
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    bindings: Option<Rc<BindingFrame>>,
    execution: Option<Rc<Execution>>,
}

thread_local! {
    static CURRENT: RefCell<Snapshot> = RefCell::new(Snapshot::default());
}

/// Snapshot the dynamic context of the calling thread
pub fn capture() -> Snapshot {
    CURRENT.with(|ctx| ctx.borrow().clone())
}

/// The execution being driven, if any
pub fn current_execution() -> Option<Rc<Execution>> {
    CURRENT.with(|ctx| ctx.borrow().execution.clone())
}

/// Innermost dynamic binding of `id`
pub fn lookup_dynamic(id: SymbolId) -> Option<Value> {
    CURRENT.with(|ctx| {
        let ctx = ctx.borrow();
        let mut frame = ctx.bindings.as_deref();
        while let Some(f) = frame {
            if let Some(value) = f.lookup(id) {
                return Some(value.clone());
            }
            frame = f.parent.as_deref();
        }
        None
    })
}

/// Push a frame of dynamic bindings. Returns the depth to pass to
/// `pop_bindings` to undo the push.
pub fn push_bindings(bindings: SmallVec<[(SymbolId, Value); 2]>) -> usize {
    CURRENT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let depth = ctx.bindings.as_ref().map_or(0, |f| f.depth);
        ctx.bindings = Some(Rc::new(BindingFrame {
            bindings,
            parent: ctx.bindings.take(),
            depth: depth + 1,
        }));
        depth
    })
}

/// Drop binding frames until the stack is `depth` frames deep
pub fn pop_bindings(depth: usize) -> LResult<()> {
    CURRENT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let mut frame = ctx.bindings.clone();
        loop {
            let current = frame.as_ref().map_or(0, |f| f.depth);
            if current == depth {
                ctx.bindings = frame;
                return Ok(());
            }
            if current < depth {
                return Err(Condition::error(format!(
                    "binding frame {} is not active (depth is {})",
                    depth, current
                )));
            }
            frame = frame.and_then(|f| f.parent.clone());
        }
    })
}

/// Native behind `binding`: `(push-bindings 'name value ...)` returns the
/// depth to restore
pub fn push_bindings_native() -> Value {
    Value::native("push-bindings", |args| {
        if args.len() % 2 != 0 {
            return Err(Condition::arity_error(
                "push-bindings: expected name/value pairs",
            ));
        }
        let mut frame = SmallVec::new();
        for pair in args.chunks(2) {
            let Some(sym) = pair[0].as_symbol() else {
                return Err(Condition::type_error(format!(
                    "push-bindings: expected a symbol, got {}",
                    pair[0].type_name()
                )));
            };
            frame.push((sym.id, pair[1].clone()));
        }
        Ok(Value::Int(push_bindings(frame) as i64))
    })
}

/// Native behind `binding`: `(pop-bindings depth)`
pub fn pop_bindings_native() -> Value {
    Value::native("pop-bindings", |args| {
        Condition::check_arity("pop-bindings", args, 1)?;
        let depth = usize::try_from(args[0].as_int()?)
            .map_err(|_| Condition::type_error("pop-bindings: negative depth"))?;
        pop_bindings(depth)?;
        Ok(Value::Nil)
    })
}

impl Snapshot {
    /// The same context driving `execution`
    pub fn with_execution(mut self, execution: Rc<Execution>) -> Self {
        self.execution = Some(execution);
        self
    }

    pub fn execution(&self) -> Option<&Rc<Execution>> {
        self.execution.as_ref()
    }

    /// Run `f` with this snapshot installed as the current context
    pub fn enter<T>(&self, f: impl FnOnce() -> T) -> T {
        let _restore = Restore::install(self.clone());
        f()
    }

    /// Wrap a thunk so that forcing it also runs inside this context.
    ///
    /// Thunks produced by the wrapped thunk are wrapped in turn, so every
    /// step the trampoline takes on a resumed continuation sees the context
    /// captured at the suspension point.
    pub fn in_context(&self, value: Value) -> Value {
        match value {
            Value::Thunk(thunk) => {
                let snapshot = self.clone();
                Value::thunk(Value::native("in-context", move |_| {
                    let next = snapshot.enter(|| thunk.force())?;
                    Ok(snapshot.in_context(next))
                }))
            }
            other => other,
        }
    }
}

/// Reinstates the previous context when dropped
struct Restore {
    previous: Option<Snapshot>,
}

impl Restore {
    fn install(snapshot: Snapshot) -> Self {
        let previous = CURRENT.with(|ctx| std::mem::replace(&mut *ctx.borrow_mut(), snapshot));
        Restore {
            previous: Some(previous),
        }
    }
}

impl Drop for Restore {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            CURRENT.with(|ctx| *ctx.borrow_mut() = previous);
        }
    }
}

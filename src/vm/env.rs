//! Runtime environments: lexical frames over the global table

use super::Globals;
use crate::context;
use crate::symbol::SymbolId;
use crate::value::{Condition, LResult, Value};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

struct Frame {
    slots: SmallVec<[(SymbolId, Value); 4]>,
    parent: Option<Rc<Frame>>,
}

/// A chain of lexical frames ending in the globals
#[derive(Clone)]
pub struct Env {
    frame: Option<Rc<Frame>>,
    globals: Rc<Globals>,
}

impl Env {
    pub fn new(globals: Rc<Globals>) -> Self {
        Env {
            frame: None,
            globals,
        }
    }

    pub fn globals(&self) -> &Rc<Globals> {
        &self.globals
    }

    fn push(&self, slots: SmallVec<[(SymbolId, Value); 4]>) -> Env {
        Env {
            frame: Some(Rc::new(Frame {
                slots,
                parent: self.frame.clone(),
            })),
            globals: self.globals.clone(),
        }
    }

    pub fn bind(&self, name: SymbolId, value: Value) -> Env {
        let mut slots = SmallVec::new();
        slots.push((name, value));
        self.push(slots)
    }

    /// One frame holding every name; later duplicates win
    pub fn bind_all(&self, names: &[SymbolId], values: Vec<Value>) -> Env {
        self.push(names.iter().copied().zip(values).collect())
    }

    fn lookup_lexical(&self, id: SymbolId) -> Option<&Value> {
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            if let Some((_, value)) = f.slots.iter().rev().find(|(name, _)| *name == id) {
                return Some(value);
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// Lexical frames first, then dynamic bindings, then globals
    pub fn lookup(&self, id: SymbolId) -> LResult<Value> {
        if let Some(value) = self.lookup_lexical(id) {
            return Ok(value.clone());
        }
        if let Some(value) = context::lookup_dynamic(id) {
            return Ok(value);
        }
        self.globals.get(id).ok_or_else(|| {
            let name = self.globals.symbols().name_or_placeholder(id);
            Condition::undefined_variable(format!("undefined variable: {}", name))
                .with_data(Value::Symbol(crate::value::Symbol { id, name }))
        })
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut frame = self.frame.as_deref();
        while let Some(fr) = frame {
            depth += 1;
            frame = fr.parent.as_deref();
        }
        write!(f, "Env(depth={})", depth)
    }
}

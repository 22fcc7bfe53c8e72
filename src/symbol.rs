use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Interned symbol identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Default)]
struct Interned {
    map: FxHashMap<Rc<str>, SymbolId>,
    names: Vec<Rc<str>>,
    gensym_counter: u64,
}

/// Symbol interning table for fast symbol comparison
///
/// The table is a shared handle: cloning it yields another view of the same
/// interned names. The reader, the converter, the CPS transformer and the
/// evaluator all hold one, so fresh names minted while transforming a
/// coroutine are visible when the evaluator reports an error about them.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    inner: Rc<RefCell<Interned>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol, returning its ID
    pub fn intern(&self, name: &str) -> SymbolId {
        let mut inner = self.inner.borrow_mut();
        if let Some(&id) = inner.map.get(name) {
            return id;
        }

        let id = SymbolId(inner.names.len() as u32);
        let shared_name: Rc<str> = Rc::from(name);
        inner.names.push(shared_name.clone());
        inner.map.insert(shared_name, id);
        id
    }

    /// Get the name of a symbol by ID
    pub fn name(&self, id: SymbolId) -> Option<Rc<str>> {
        self.inner.borrow().names.get(id.0 as usize).cloned()
    }

    /// Name of a symbol, or a placeholder for ids this table never issued
    pub fn name_or_placeholder(&self, id: SymbolId) -> Rc<str> {
        self.name(id)
            .unwrap_or_else(|| Rc::from(format!("#<symbol:{}>", id.0)))
    }

    /// Check if a symbol exists
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.inner.borrow().map.get(name).copied()
    }

    /// Mint a symbol that has never been interned before.
    ///
    /// Names look like `k#3`. Candidates that were already interned (for
    /// instance because the form being compiled spells them) are skipped,
    /// so a generated name never captures a binding of the form it is
    /// inserted into.
    pub fn gensym(&self, prefix: &str) -> SymbolId {
        loop {
            let candidate = {
                let mut inner = self.inner.borrow_mut();
                inner.gensym_counter += 1;
                format!("{}#{}", prefix, inner.gensym_counter)
            };
            if self.get(&candidate).is_none() {
                return self.intern(&candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

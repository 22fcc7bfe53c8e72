//! State threaded down the CPS transform

use crate::symbol::SymbolId;
use std::rc::Rc;

/// Names lexically bound at a point in a coroutine body
///
/// Persistent: extending returns a new environment sharing its tail, so each
/// branch of the transform keeps its own view cheaply.
#[derive(Debug, Clone, Default)]
pub struct LexicalEnv {
    head: Option<Rc<EnvNode>>,
}

#[derive(Debug)]
struct EnvNode {
    name: SymbolId,
    parent: Option<Rc<EnvNode>>,
}

impl LexicalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&self, name: SymbolId) -> Self {
        LexicalEnv {
            head: Some(Rc::new(EnvNode {
                name,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn extend_all(&self, names: impl IntoIterator<Item = SymbolId>) -> Self {
        names.into_iter().fold(self.clone(), |env, name| env.extend(name))
    }

    pub fn contains(&self, name: SymbolId) -> bool {
        self.iter().any(|bound| bound == name)
    }

    /// Innermost binding first
    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        std::iter::successors(self.head.as_deref(), |node| node.parent.as_deref())
            .map(|node| node.name)
    }
}

/// The loop whose `recur`s are being compiled into trampolined re-entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopHead {
    pub name: SymbolId,
    pub arity: usize,
}

/// Transform context: where values and errors of the current subtree go
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// Continuation receiving the value of the subtree
    pub success: SymbolId,
    /// Continuation receiving errors raised after a suspension
    pub failure: SymbolId,
    pub env: LexicalEnv,
    pub loop_head: Option<LoopHead>,
}

impl TransformContext {
    pub fn new(success: SymbolId, failure: SymbolId) -> Self {
        TransformContext {
            success,
            failure,
            env: LexicalEnv::new().extend(success).extend(failure),
            loop_head: None,
        }
    }

    pub fn with_success(&self, success: SymbolId) -> Self {
        TransformContext {
            success,
            env: self.env.extend(success),
            ..self.clone()
        }
    }

    pub fn with_continuations(&self, success: SymbolId, failure: SymbolId) -> Self {
        TransformContext {
            success,
            failure,
            env: self.env.extend(success).extend(failure),
            ..self.clone()
        }
    }

    pub fn with_bound(&self, names: impl IntoIterator<Item = SymbolId>) -> Self {
        TransformContext {
            env: self.env.extend_all(names),
            ..self.clone()
        }
    }

    pub fn with_loop(&self, head: LoopHead) -> Self {
        TransformContext {
            loop_head: Some(head),
            env: self.env.extend(head.name),
            ..self.clone()
        }
    }
}

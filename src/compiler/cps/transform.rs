//! Selective CPS transformation of coroutine bodies
//!
//! Only the control paths that can reach a breakpoint call are rewritten.
//! Any subtree with no reachable breakpoint is emitted as an exact copy, so
//! synchronous code inside a coroutine pays nothing for the transform.
//!
//! The rewritten code follows one shape throughout: `cps(expr, ctx)`
//! returns code that delivers the value of `expr` by calling `ctx.success`
//! with it. A child that may suspend gets a fresh success continuation
//! `(fn [v] rest)` binding its value, where `rest` is the rewritten remainder
//! of its parent. Every synthesized continuation body runs inside a guard
//! that forwards errors to the failure continuation active at that point,
//! because a continuation runs on whatever stack resumed it, long after the
//! `try` that lexically encloses it has returned.
//!
//! Loops whose bodies suspend are compiled into a named head function; each
//! `recur` returns a thunk that re-enters the head, and the trampoline
//! forces it iteratively.

use super::context::{LoopHead, TransformContext};
use super::trampoline;
use crate::breakpoint::{BreakpointSite, BreakpointTable};
use crate::compiler::analysis::{contains_recur, reaches_breakpoint};
use crate::compiler::ast::{CatchClause, CatchKind, Expr};
use crate::error::CompileError;
use crate::symbol::{SymbolId, SymbolTable};
use crate::value::{Condition, Symbol, Value};
use tracing::trace;

type Result<T> = std::result::Result<T, CompileError>;

/// One staged child of a node whose children are evaluated in order
enum Step<'e> {
    /// Evaluate a breakpoint-free child early, into a temporary
    Bind(SymbolId, &'e Expr),
    /// Evaluate a suspending child; its value arrives as the named parameter
    Suspend(SymbolId, &'e Expr),
}

/// What a binding chain ends in
enum LetTail<'e> {
    /// Deliver the value of this body to the success continuation
    Deliver(&'e Expr),
    /// Emit this expression as is
    Raw(Expr),
}

/// CPS transformer for one breakpoint table
pub struct CpsTransformer<'a> {
    table: &'a BreakpointTable,
    symbols: &'a SymbolTable,
}

impl<'a> CpsTransformer<'a> {
    pub fn new(table: &'a BreakpointTable, symbols: &'a SymbolTable) -> Self {
        Self { table, symbols }
    }

    /// Compile a coroutine body into `(fn [k f] body')`.
    ///
    /// Calling the result starts the body immediately; its value is
    /// delivered to `k`. Errors raised before the first suspension are
    /// thrown to the caller, errors raised after one go to `f`.
    pub fn compile_coroutine(&self, body: &Expr) -> Result<Expr> {
        let k = self.symbols.gensym("k");
        let f = self.symbols.gensym("f");
        let ctx = TransformContext::new(k, f);
        let body = self.deliver(body, &ctx)?;
        Ok(Expr::lambda(None, vec![k, f], body))
    }

    /// Does `expr` have to be rewritten under `ctx`?
    pub fn needs_cps(&self, expr: &Expr, ctx: &TransformContext) -> bool {
        reaches_breakpoint(expr, self.table) || (ctx.loop_head.is_some() && contains_recur(expr))
    }

    /// Transform `expr`: unchanged when nothing in it suspends, otherwise
    /// rewritten to deliver its value to `ctx.success`.
    pub fn transform(&self, expr: &Expr, ctx: &TransformContext) -> Result<Expr> {
        if !self.needs_cps(expr, ctx) {
            return Ok(expr.clone());
        }
        self.cps(expr, ctx)
    }

    /// Code delivering the value of `expr` to `ctx.success`
    fn deliver(&self, expr: &Expr, ctx: &TransformContext) -> Result<Expr> {
        if self.needs_cps(expr, ctx) {
            self.cps(expr, ctx)
        } else {
            Ok(send(ctx.success, expr.clone()))
        }
    }

    fn gensym(&self, prefix: &str) -> SymbolId {
        self.symbols.gensym(prefix)
    }

    /// `(try body (catch e (failure e)))`
    fn guard(&self, body: Expr, failure: SymbolId) -> Expr {
        let e = self.gensym("e");
        Expr::Try {
            body: Box::new(body),
            catches: vec![CatchClause {
                kind: CatchKind::Any,
                var: e,
                body: send(failure, Expr::var(e)),
            }],
            finally: None,
        }
    }

    /// `(fn [param] body)` with `body` guarded by `failure`
    fn continuation(&self, param: SymbolId, body: Expr, failure: SymbolId) -> Expr {
        Expr::lambda(None, vec![param], self.guard(body, failure))
    }

    /// Can `expr` be evaluated later instead of now with the same result?
    fn is_stable(&self, expr: &Expr, ctx: &TransformContext) -> bool {
        match expr {
            Expr::Literal(_) => true,
            // Globals and dynamic bindings may change across a suspension
            Expr::Var(id) => ctx.env.contains(*id),
            _ => false,
        }
    }

    fn cps(&self, expr: &Expr, ctx: &TransformContext) -> Result<Expr> {
        match expr {
            Expr::Literal(_) | Expr::Var(_) | Expr::Lambda(_) => Ok(send(ctx.success, expr.clone())),
            Expr::Call { func, args } => self.cps_call(func, args, ctx),
            Expr::If { cond, then, else_ } => self.cps_if(cond, then, else_, ctx),
            Expr::Begin(exprs) => self.cps_begin(exprs, ctx),
            Expr::Let { bindings, body } => self.cps_let(bindings, LetTail::Deliver(body), ctx),
            Expr::Loop { bindings, body } => self.cps_loop(bindings, body, ctx),
            Expr::Recur(args) => self.cps_recur(args, ctx),
            Expr::Try {
                body,
                catches,
                finally,
            } => self.cps_try(body, catches, finally.as_deref(), ctx),
            Expr::Define { name, value } => {
                let name = *name;
                self.with_atoms(std::slice::from_ref(value.as_ref()), ctx, |mut atoms, inner| {
                    let value = atoms.pop().unwrap_or(Expr::Literal(Value::Nil));
                    Ok(send(
                        inner.success,
                        Expr::Define {
                            name,
                            value: Box::new(value),
                        },
                    ))
                })
            }
        }
    }

    /// Evaluate `children` left to right, then hand their values to `finish`.
    ///
    /// Children up to the last suspending one are reduced to atoms: literals
    /// and lexical variables stay, other breakpoint-free children are bound
    /// to temporaries in place, and suspending children are rewritten with a
    /// continuation binding their value. Children after the last suspending
    /// one are passed through untouched; they are evaluated by `finish`'s
    /// code after every earlier child, which preserves source order.
    fn with_atoms<'e>(
        &self,
        children: &'e [Expr],
        ctx: &TransformContext,
        finish: impl FnOnce(Vec<Expr>, &TransformContext) -> Result<Expr>,
    ) -> Result<Expr> {
        let Some(last) = children.iter().rposition(|c| self.needs_cps(c, ctx)) else {
            return finish(children.to_vec(), ctx);
        };

        let mut steps: Vec<(Step<'e>, TransformContext)> = Vec::new();
        let mut atoms = Vec::with_capacity(children.len());
        let mut inner = ctx.clone();
        for child in &children[..=last] {
            if self.needs_cps(child, &inner) {
                let v = self.gensym("v");
                steps.push((Step::Suspend(v, child), inner.clone()));
                inner = inner.with_bound([v]);
                atoms.push(Expr::var(v));
            } else if self.is_stable(child, &inner) {
                atoms.push(child.clone());
            } else {
                let t = self.gensym("t");
                steps.push((Step::Bind(t, child), inner.clone()));
                inner = inner.with_bound([t]);
                atoms.push(Expr::var(t));
            }
        }
        atoms.extend(children[last + 1..].iter().cloned());

        let mut body = finish(atoms, &inner)?;
        for (step, before) in steps.into_iter().rev() {
            body = match step {
                Step::Bind(t, child) => Expr::let_(vec![(t, child.clone())], body),
                Step::Suspend(v, child) => {
                    let k = self.gensym("k");
                    let cont = self.continuation(v, body, before.failure);
                    let child = self.cps(child, &before.with_success(k))?;
                    Expr::let_(vec![(k, cont)], child)
                }
            };
        }
        Ok(body)
    }

    fn cps_call(&self, func: &Expr, args: &[Expr], ctx: &TransformContext) -> Result<Expr> {
        if let Expr::Var(op) = func {
            if let Some(handler) = self.table.get(*op) {
                let op = *op;
                trace!(op = %self.symbols.name_or_placeholder(op), "suspension point");
                return self.with_atoms(args, ctx, |atoms, inner| {
                    let site = BreakpointSite {
                        op,
                        env: &inner.env,
                        success: inner.success,
                        failure: inner.failure,
                        symbols: self.symbols,
                    };
                    handler.generate(&site, atoms)
                });
            }
        }

        let mut children = Vec::with_capacity(args.len() + 1);
        children.push(func.clone());
        children.extend(args.iter().cloned());
        self.with_atoms(&children, ctx, |mut atoms, inner| {
            let func = atoms.remove(0);
            Ok(send(inner.success, Expr::call(func, atoms)))
        })
    }

    /// Both branches are rewritten, but the conditional stays a
    /// conditional: at run time only the selected branch is evaluated.
    fn cps_if(&self, cond: &Expr, then: &Expr, else_: &Expr, ctx: &TransformContext) -> Result<Expr> {
        self.with_atoms(std::slice::from_ref(cond), ctx, |mut atoms, inner| {
            let test = atoms.pop().unwrap_or(Expr::Literal(Value::Nil));
            Ok(Expr::if_(
                test,
                self.deliver(then, inner)?,
                self.deliver(else_, inner)?,
            ))
        })
    }

    fn cps_begin(&self, exprs: &[Expr], ctx: &TransformContext) -> Result<Expr> {
        let Some(i) = exprs.iter().position(|e| self.needs_cps(e, ctx)) else {
            return Ok(send(ctx.success, Expr::begin(exprs.to_vec())));
        };

        let mut seq: Vec<Expr> = exprs[..i].to_vec();
        let rest = &exprs[i + 1..];
        if rest.is_empty() {
            seq.push(self.cps(&exprs[i], ctx)?);
        } else {
            let k = self.gensym("k");
            let ignored = self.gensym("_");
            let rest = self.deliver(&Expr::begin(rest.to_vec()), &ctx.with_bound([ignored]))?;
            let cont = self.continuation(ignored, rest, ctx.failure);
            let current = self.cps(&exprs[i], &ctx.with_success(k))?;
            seq.push(Expr::let_(vec![(k, cont)], current));
        }
        Ok(Expr::begin(seq))
    }

    /// Sequential bindings; a suspending initializer's continuation binds
    /// the name and carries on with the remaining bindings.
    fn cps_let(
        &self,
        bindings: &[(SymbolId, Expr)],
        tail: LetTail<'_>,
        ctx: &TransformContext,
    ) -> Result<Expr> {
        let mut inner = ctx.clone();
        for (j, (name, init)) in bindings.iter().enumerate() {
            if self.needs_cps(init, &inner) {
                let rest = self.cps_let(&bindings[j + 1..], tail, &inner.with_bound([*name]))?;
                let k = self.gensym("k");
                let cont = self.continuation(*name, rest, ctx.failure);
                let init = self.cps(init, &inner.with_success(k))?;
                return Ok(Expr::let_(
                    bindings[..j].to_vec(),
                    Expr::let_(vec![(k, cont)], init),
                ));
            }
            inner = inner.with_bound([*name]);
        }

        let body = match tail {
            LetTail::Deliver(body) => self.deliver(body, &inner)?,
            LetTail::Raw(expr) => expr,
        };
        Ok(Expr::let_(bindings.to_vec(), body))
    }

    /// `(let [head (fn head [names] body')] (let [bindings] (head names)))`
    fn cps_loop(&self, bindings: &[(SymbolId, Expr)], body: &Expr, ctx: &TransformContext) -> Result<Expr> {
        let head = self.gensym("loop");
        let names: Vec<SymbolId> = bindings.iter().map(|(name, _)| *name).collect();
        let loop_ctx = ctx
            .with_loop(LoopHead {
                name: head,
                arity: names.len(),
            })
            .with_bound(names.iter().copied());

        let head_body = self.guard(self.deliver(body, &loop_ctx)?, ctx.failure);
        let head_fn = Expr::lambda(
            Some(Symbol {
                id: head,
                name: self.symbols.name_or_placeholder(head),
            }),
            names.clone(),
            head_body,
        );
        let enter = Expr::call(Expr::var(head), names.into_iter().map(Expr::var).collect());
        let start = self.cps_let(bindings, LetTail::Raw(enter), &ctx.with_bound([head]))?;
        Ok(Expr::let_(vec![(head, head_fn)], start))
    }

    /// `(thunk (fn [] (head args...)))`, with every argument evaluated
    /// before the thunk is built so that errors stay inside the guard.
    fn cps_recur(&self, args: &[Expr], ctx: &TransformContext) -> Result<Expr> {
        let Some(head) = ctx.loop_head else {
            return Err(CompileError::MisplacedRecur(
                Expr::Recur(args.to_vec()).display(self.symbols).to_string(),
            ));
        };
        if args.len() != head.arity {
            return Err(CompileError::RecurArity {
                expected: head.arity,
                got: args.len(),
            });
        }

        self.with_atoms(args, ctx, |atoms, inner| {
            let mut temps = Vec::new();
            let mut values = Vec::with_capacity(atoms.len());
            for atom in atoms {
                if self.is_stable(&atom, inner) {
                    values.push(atom);
                } else {
                    let t = self.gensym("t");
                    temps.push((t, atom));
                    values.push(Expr::var(t));
                }
            }
            let reenter = Expr::lambda(None, vec![], Expr::call(Expr::var(head.name), values));
            Ok(Expr::let_(
                temps,
                Expr::call(Expr::Literal(trampoline::thunk_native()), vec![reenter]),
            ))
        })
    }

    /// Catch clauses and cleanup stay in force after a suspension inside the
    /// protected body:
    ///
    /// ```text
    /// (let [k_ok    (fn [v] (do FINALLY (k v)))
    ///       k_fail  (fn [e] (do FINALLY (throw e)))         ; guarded by f
    ///       k_catch (fn [e] ((try (throw e)
    ///                          (catch :kind x (fn [] CLAUSE)) ...)))  ; guarded by k_fail
    ///   (try BODY (catch e (k_catch e))))
    /// ```
    ///
    /// BODY delivers to `k_ok` and fails to `k_catch`; clause bodies deliver
    /// to `k_ok` and fail to `k_fail`. The selected clause runs outside the
    /// `try` that selected it, so its own errors are not caught by sibling
    /// clauses.
    fn cps_try(
        &self,
        body: &Expr,
        catches: &[CatchClause],
        finally: Option<&Expr>,
        ctx: &TransformContext,
    ) -> Result<Expr> {
        if catches.is_empty() && finally.is_none() {
            return self.deliver(body, ctx);
        }

        let mut bindings = Vec::new();
        let mut scope = ctx.clone();

        let (k_ok, k_fail) = match finally {
            Some(cleanup) => {
                let k_ok = self.gensym("k");
                let v = self.gensym("v");
                let ok_body = self.deliver(
                    &Expr::begin(vec![cleanup.clone(), Expr::var(v)]),
                    &ctx.with_bound([v]),
                )?;
                bindings.push((k_ok, self.continuation(v, ok_body, ctx.failure)));

                let k_fail = self.gensym("f");
                let e = self.gensym("e");
                let fail_body = self.deliver(
                    &Expr::begin(vec![cleanup.clone(), rethrow(Expr::var(e))]),
                    &ctx.with_bound([e]),
                )?;
                bindings.push((k_fail, self.continuation(e, fail_body, ctx.failure)));

                scope = scope.with_bound([k_ok, k_fail]);
                (k_ok, k_fail)
            }
            None => (ctx.success, ctx.failure),
        };

        let k_catch = if catches.is_empty() {
            k_fail
        } else {
            let k_catch = self.gensym("f");
            let e = self.gensym("e");
            let handler_ctx = scope.with_continuations(k_ok, k_fail);
            let mut selectors = Vec::with_capacity(catches.len());
            for clause in catches {
                let clause_body = self.deliver(&clause.body, &handler_ctx.with_bound([clause.var]))?;
                selectors.push(CatchClause {
                    kind: clause.kind.clone(),
                    var: clause.var,
                    body: Expr::lambda(None, vec![], clause_body),
                });
            }
            let select = Expr::Try {
                body: Box::new(rethrow(Expr::var(e))),
                catches: selectors,
                finally: None,
            };
            let run_selected = Expr::call(select, vec![]);
            bindings.push((k_catch, self.continuation(e, run_selected, k_fail)));
            scope = scope.with_bound([k_catch]);
            k_catch
        };

        let body = self.deliver(body, &scope.with_continuations(k_ok, k_catch))?;
        Ok(Expr::let_(bindings, self.guard(body, k_catch)))
    }
}

/// `(k value)`
fn send(k: SymbolId, value: Expr) -> Expr {
    Expr::call(Expr::var(k), vec![value])
}

/// `(throw value)` with the native embedded, immune to shadowing
fn rethrow(value: Expr) -> Expr {
    let throw = Value::native("throw", |args| {
        Condition::check_arity("throw", args, 1)?;
        Err(Condition::from_thrown(&args[0]))
    });
    Expr::call(Expr::Literal(throw), vec![value])
}

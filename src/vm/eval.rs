//! Tree-walking evaluation of expression trees
//!
//! Tail positions of `if`, `do` and `let` are followed iteratively, and a
//! direct-style `loop` re-enters its body in place when the body finishes
//! with `recur`, so neither grows the native stack.

use super::env::Env;
use crate::compiler::ast::{CatchClause, Expr};
use crate::value::{Closure, Condition, LResult, Value};
use std::rc::Rc;

/// Outcome of evaluating an expression in tail position of a loop
enum Flow {
    Value(Value),
    Recur(Vec<Value>),
}

pub fn eval(expr: &Expr, env: &Env) -> LResult<Value> {
    match eval_flow(expr, env)? {
        Flow::Value(value) => Ok(value),
        Flow::Recur(_) => Err(Condition::error("recur outside of loop")),
    }
}

fn eval_args(args: &[Expr], env: &Env) -> LResult<Vec<Value>> {
    args.iter().map(|arg| eval(arg, env)).collect()
}

fn eval_flow(expr: &Expr, env: &Env) -> LResult<Flow> {
    let mut expr = expr;
    let mut env = env.clone();
    loop {
        match expr {
            Expr::Literal(value) => return Ok(Flow::Value(value.clone())),
            Expr::Var(id) => return env.lookup(*id).map(Flow::Value),
            Expr::Lambda(lambda) => {
                let closure = Closure::new(lambda.clone(), env.clone());
                return Ok(Flow::Value(Value::Closure(Rc::new(closure))));
            }

            Expr::Call { func, args } => {
                let func = eval(func, &env)?;
                let args = eval_args(args, &env)?;
                return apply(&func, &args).map(Flow::Value);
            }

            Expr::If { cond, then, else_ } => {
                expr = if eval(cond, &env)?.is_truthy() {
                    then.as_ref()
                } else {
                    else_.as_ref()
                };
            }

            Expr::Begin(exprs) => {
                let Some((last, init)) = exprs.split_last() else {
                    return Ok(Flow::Value(Value::Nil));
                };
                for e in init {
                    eval(e, &env)?;
                }
                expr = last;
            }

            Expr::Let { bindings, body } => {
                for (name, init) in bindings {
                    let value = eval(init, &env)?;
                    env = env.bind(*name, value);
                }
                expr = body.as_ref();
            }

            Expr::Loop { bindings, body } => {
                let names: Vec<_> = bindings.iter().map(|(name, _)| *name).collect();
                let mut loop_env = env.clone();
                for (name, init) in bindings {
                    let value = eval(init, &loop_env)?;
                    loop_env = loop_env.bind(*name, value);
                }
                loop {
                    match eval_flow(body, &loop_env)? {
                        Flow::Value(value) => return Ok(Flow::Value(value)),
                        Flow::Recur(values) => loop_env = env.bind_all(&names, values),
                    }
                }
            }

            Expr::Recur(args) => return eval_args(args, &env).map(Flow::Recur),

            Expr::Try {
                body,
                catches,
                finally,
            } => return eval_try(body, catches, finally.as_deref(), &env).map(Flow::Value),

            Expr::Define { name, value } => {
                let value = eval(value, &env)?;
                env.globals().define(*name, value.clone());
                return Ok(Flow::Value(value));
            }
        }
    }
}

fn eval_try(
    body: &Expr,
    catches: &[CatchClause],
    finally: Option<&Expr>,
    env: &Env,
) -> LResult<Value> {
    let result = match eval(body, env) {
        Ok(value) => Ok(value),
        Err(cond) => handle(cond, catches, env),
    };
    if let Some(cleanup) = finally {
        eval(cleanup, env)?;
    }
    result
}

/// Run the first clause accepting `cond`, or rethrow it
fn handle(cond: Condition, catches: &[CatchClause], env: &Env) -> LResult<Value> {
    let thrown = Value::from(cond.clone());
    match catches.iter().find(|clause| clause.kind.matches(&thrown)) {
        Some(clause) => eval(&clause.body, &env.bind(clause.var, thrown)),
        None => Err(cond),
    }
}

/// Apply a function value to arguments
pub fn apply(func: &Value, args: &[Value]) -> LResult<Value> {
    match func {
        Value::Native(native) => native.call(args),
        Value::Closure(closure) => call_closure(closure, args),
        other => Err(Condition::type_error(format!(
            "cannot call a {}: {}",
            other.type_name(),
            other
        ))),
    }
}

fn call_closure(closure: &Rc<Closure>, args: &[Value]) -> LResult<Value> {
    let lambda = &closure.lambda;
    Condition::check_arity(lambda.name_str().unwrap_or("fn"), args, lambda.params.len())?;
    let mut env = closure.env.clone();
    if let Some(name) = &lambda.name {
        env = env.bind(name.id, Value::Closure(closure.clone()));
    }
    let env = env.bind_all(&lambda.params, args.to_vec());
    eval(&lambda.body, &env)
}

//! Shared test helpers for the tether test suite.
//!
//! Provides canonical eval and setup functions, plus a deterministic timer
//! queue standing in for an event loop. The queue runs on a virtual clock:
//! `run_timers` fires callbacks in deadline order (ties in scheduling
//! order) and nothing ever sleeps.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use tether::{eval_all, register_primitives, Condition, SymbolTable, Value, VM};

struct Timer {
    deadline: u64,
    seq: u64,
    callback: Value,
    value: Value,
}

thread_local! {
    static TIMERS: RefCell<Vec<Timer>> = const { RefCell::new(Vec::new()) };
    static NOW: Cell<u64> = const { Cell::new(0) };
    static SEQ: Cell<u64> = const { Cell::new(0) };
}

fn schedule(ms: &Value, callback: Value, value: Value) -> Result<(), Condition> {
    let ms = u64::try_from(ms.as_int()?).map_err(|_| Condition::error("negative delay"))?;
    let seq = SEQ.with(|s| {
        s.set(s.get() + 1);
        s.get()
    });
    let deadline = NOW.with(|now| now.get()) + ms;
    TIMERS.with(|timers| {
        timers.borrow_mut().push(Timer {
            deadline,
            seq,
            callback,
            value,
        })
    });
    Ok(())
}

fn reset_timers() {
    TIMERS.with(|timers| timers.borrow_mut().clear());
    NOW.with(|now| now.set(0));
    SEQ.with(|s| s.set(0));
}

/// Current virtual time in milliseconds
pub fn now() -> u64 {
    NOW.with(|now| now.get())
}

/// Fire due timers until the queue is empty, advancing the virtual clock.
///
/// Returns the number of timers fired.
pub fn run_timers() -> Result<usize, String> {
    let mut fired = 0;
    loop {
        let next = TIMERS.with(|timers| {
            let mut timers = timers.borrow_mut();
            let index = timers
                .iter()
                .enumerate()
                .min_by_key(|(_, t)| (t.deadline, t.seq))
                .map(|(i, _)| i)?;
            Some(timers.remove(index))
        });
        let Some(timer) = next else {
            return Ok(fired);
        };
        NOW.with(|now| now.set(timer.deadline));
        timer
            .callback
            .call(&[timer.value])
            .map_err(|e| e.to_string())?;
        fired += 1;
    }
}

/// Timer operations usable with `await`:
///
/// - `(delay ms value k f)` resolves with `value` after `ms`
/// - `(fail-after ms message k f)` rejects with an error after `ms`
/// - `(now k f)` resolves at once with the virtual time
pub fn register_timers(vm: &VM) {
    vm.define(
        "delay",
        Value::native("delay", |args| {
            Condition::check_arity("delay", args, 4)?;
            schedule(&args[0], args[2].clone(), args[1].clone())?;
            Ok(Value::Nil)
        }),
    );
    vm.define(
        "fail-after",
        Value::native("fail-after", |args| {
            Condition::check_arity("fail-after", args, 4)?;
            let message = args[1].to_display_string();
            schedule(
                &args[0],
                args[3].clone(),
                Condition::new(tether::ConditionKind::User("timeout".into()), message).into(),
            )?;
            Ok(Value::Nil)
        }),
    );
    vm.define(
        "now",
        Value::native("now", |args| {
            Condition::check_arity("now", args, 2)?;
            args[0].call(&[Value::Int(now() as i64)])
        }),
    );
}

/// Set up a VM with primitives and timer operations.
///
/// Also clears the timer queue of the calling thread.
pub fn setup() -> VM {
    reset_timers();
    let symbols = SymbolTable::new();
    let vm = VM::new(&symbols);
    register_primitives(&vm);
    register_timers(&vm);
    vm
}

/// Evaluate tether source code through the full pipeline.
///
/// This is the canonical test eval. Timers scheduled by the program are
/// not fired; use `eval_settled` for programs that wait on them.
pub fn eval_source(input: &str) -> Result<Value, String> {
    let vm = setup();
    eval_all(input, &vm).map_err(|e| e.to_string())
}

/// Evaluate `program`, fire every timer, then evaluate `probe`
pub fn eval_settled(program: &str, probe: &str) -> Result<Value, String> {
    let vm = setup();
    eval_settled_with(&vm, program, probe)
}

pub fn eval_settled_with(vm: &VM, program: &str, probe: &str) -> Result<Value, String> {
    eval_all(program, vm).map_err(|e| e.to_string())?;
    run_timers()?;
    eval_all(probe, vm).map_err(|e| e.to_string())
}

/// Run `body` as an async coroutine, settle all timers and report how it
/// ended: `Ok(value)` if resolved, `Err(message)` if rejected.
///
/// Panics if neither continuation was invoked.
pub fn run_async(body: &str) -> Result<Value, String> {
    let vm = setup();
    run_async_with(&vm, body)
}

pub fn run_async_with(vm: &VM, body: &str) -> Result<Value, String> {
    let program = format!(
        r#"
        (def outcome (atom nil))
        (run (async {})
             (fn [v] (reset! outcome (list :ok v)))
             (fn [e] (reset! outcome (list :err e))))
        "#,
        body
    );
    let outcome = eval_settled_with(vm, &program, "(deref outcome)")?;
    match outcome.as_seq() {
        Ok([Value::Keyword(tag), value]) if &**tag == "ok" => Ok(value.clone()),
        Ok([Value::Keyword(tag), Value::Condition(cond)]) if &**tag == "err" => {
            Err(cond.to_string())
        }
        _ => panic!("coroutine never settled: {}", outcome),
    }
}

/// Ints into a vector value
pub fn ints(ns: &[i64]) -> Value {
    Value::vector(ns.iter().map(|n| Value::Int(*n)).collect())
}

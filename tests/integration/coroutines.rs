// Running coroutines: delivery, suspension through a timer queue, and
// execution state tracking

use crate::common::{eval_source, now, run_async, run_timers, setup};
use tether::{eval_all, Value};

#[test]
fn test_await_resolved_value() {
    assert_eq!(run_async("(+ 1 (await resolved 2))"), Ok(Value::Int(3)));
}

#[test]
fn test_body_without_await_resolves() {
    assert_eq!(run_async("(* 6 7)"), Ok(Value::Int(42)));
}

#[test]
fn test_sequential_delays_advance_the_clock() {
    assert_eq!(
        run_async("(+ (await delay 10 1) (await delay 5 2))"),
        Ok(Value::Int(3))
    );
    assert_eq!(now(), 15);
}

#[test]
fn test_synchronous_completion_before_run_returns() {
    let code = r#"
        (def out (atom nil))
        (run (async (+ (await resolved 1) (await resolved 2)))
             (fn [v] (reset! out v))
             (fn [e] (reset! out e)))
        (deref out)
    "#;
    assert_eq!(eval_source(code).unwrap(), Value::Int(3));
}

#[test]
fn test_rejection_reaches_failure_continuation() {
    assert_eq!(
        run_async(r#"(await rejected (ex-info :nope "no"))"#),
        Err("nope: no".to_string())
    );
    assert_eq!(
        run_async(r#"(await fail-after 5 "slow")"#),
        Err("timeout: slow".to_string())
    );
}

#[test]
fn test_error_after_resumption_reaches_failure_continuation() {
    assert_eq!(
        run_async(r#"(do (await delay 5 1) (error "after"))"#),
        Err("error: after".to_string())
    );
}

#[test]
fn test_pre_suspension_error_rejects_exactly_once() {
    let code = r#"
        (def rejections (atom 0))
        (def resolved-with (atom :never))
        (run (async (do (error "early") (await resolved 1)))
             (fn [v] (reset! resolved-with v))
             (fn [e] (swap! rejections inc)))
        (list (deref rejections) (deref resolved-with))
    "#;
    assert_eq!(
        eval_source(code).unwrap(),
        Value::list(vec![Value::Int(1), Value::keyword("never")])
    );
}

#[test]
fn test_error_thrown_by_resolve_propagates() {
    let err = eval_source(r#"(run (async 1) (fn [v] (error "in resolve")) (fn [e] nil))"#)
        .unwrap_err();
    assert!(err.contains("in resolve"), "got: {}", err);
}

#[test]
fn test_run_checks_its_arguments() {
    let err = eval_source("(run (async 1) 2 (fn [e] e))").unwrap_err();
    assert!(err.contains("run: expected a function"), "got: {}", err);
    let err = eval_source("(run (async 1))").unwrap_err();
    assert!(err.contains("arity-error"), "got: {}", err);
}

#[test]
fn test_ten_thousand_suspensions() {
    let body = "(loop [i 1 acc 0] (if (> i 10000) acc (recur (inc i) (+ acc (await resolved i)))))";
    assert_eq!(run_async(body), Ok(Value::Int(50_005_000)));
}

#[test]
fn test_nested_coroutine_awaited_as_operation() {
    let body = "(let [inner (async (+ 1 (await delay 5 2)))] (* 10 (await inner)))";
    assert_eq!(run_async(body), Ok(Value::Int(30)));
}

#[test]
fn test_concurrent_coroutines_interleave_by_deadline() {
    let vm = setup();
    let code = r#"
        (def log (atom []))
        (defn worker [name pause]
          (async (do (await delay pause nil)
                     (swap! log conj (str name 1))
                     (await delay pause nil)
                     (swap! log conj (str name 2)))))
        (run (worker "a" 30) (fn [v] v) (fn [e] (throw e)))
        (run (worker "b" 20) (fn [v] v) (fn [e] (throw e)))
    "#;
    eval_all(code, &vm).unwrap();
    assert_eq!(run_timers().unwrap(), 4);
    let log = eval_all("(deref log)", &vm).unwrap();
    let expected: Vec<Value> = ["b1", "a1", "b2", "a2"]
        .iter()
        .map(|s| Value::string(s))
        .collect();
    assert_eq!(log, Value::vector(expected));
}

#[test]
fn test_execution_state_transitions() {
    let vm = setup();
    eval_all(
        "(def ex (run (async (await delay 10 1)) (fn [v] v) (fn [e] e)))",
        &vm,
    )
    .unwrap();
    assert_eq!(
        eval_all("(execution-state ex)", &vm).unwrap(),
        Value::keyword("suspended")
    );
    run_timers().unwrap();
    assert_eq!(
        eval_all("(execution-state ex)", &vm).unwrap(),
        Value::keyword("completed")
    );
}

#[test]
fn test_failed_execution_state() {
    let code = r#"
        (def ex (run (async (error "x")) (fn [v] v) (fn [e] nil)))
        (execution-state ex)
    "#;
    assert_eq!(eval_source(code).unwrap(), Value::keyword("failed"));
}

#[test]
fn test_execution_state_inside_and_outside() {
    assert_eq!(
        run_async("(do (await delay 1 nil) (execution-state))"),
        Ok(Value::keyword("running"))
    );
    assert_eq!(eval_source("(execution-state)").unwrap(), Value::Nil);
}

// Breakpoints used outside the part of a coroutine body that is rewritten

use crate::common::{eval_source, run_async, run_async_with, setup};
use tether::{CompileOptions, ScopeCheck, Value};

#[test]
fn test_await_in_nested_fn_is_a_compile_error() {
    let err = eval_source("(async (let [f (fn [] (await resolved 1))] (f)))").unwrap_err();
    assert!(err.starts_with("compile error: scope violation"), "got: {}", err);
    assert!(err.contains("(await resolved 1)"), "got: {}", err);
}

#[test]
fn test_deferred_scope_check_rejects_at_run_time() {
    let mut vm = setup();
    vm.set_options(CompileOptions {
        scope_check: ScopeCheck::Defer,
    });
    let err = run_async_with(&vm, "(let [f (fn [] (await resolved 1))] (f))").unwrap_err();
    assert!(err.starts_with("scope-violation"), "got: {}", err);
}

#[test]
fn test_deferred_scope_check_only_fails_when_called() {
    let mut vm = setup();
    vm.set_options(CompileOptions {
        scope_check: ScopeCheck::Defer,
    });
    assert_eq!(
        run_async_with(&vm, "(let [f (fn [] (await resolved 1))] 5)"),
        Ok(Value::Int(5))
    );
}

#[test]
fn test_await_outside_any_coroutine() {
    let err = eval_source("(await resolved 1)").unwrap_err();
    assert!(err.contains("scope-violation"), "got: {}", err);
    let err = eval_source("(defn f [] (await resolved 1)) (f)").unwrap_err();
    assert!(err.contains("scope-violation"), "got: {}", err);
}

#[test]
fn test_nested_coroutine_has_its_own_scope() {
    assert_eq!(
        run_async("(let [inner (async (await resolved 2))] (+ 1 (await inner)))"),
        Ok(Value::Int(3))
    );
}

// try/catch/finally in direct code and across suspensions

use crate::common::{eval_source, ints, run_async, run_async_with, run_timers, setup};
use tether::{eval_all, Value};

#[test]
fn test_catch_matches_by_kind() {
    assert_eq!(
        eval_source("(try (/ 1 0) (catch :type-error e 1) (catch :division-by-zero e 2))")
            .unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        eval_source("(try (/ 1 0) (catch :error e (error-kind e)))").unwrap(),
        Value::keyword("division-by-zero")
    );
}

#[test]
fn test_user_kinds() {
    let code = r#"(try (error :timeout "too slow" 30) (catch :timeout e (list (error-message e) (error-data e))))"#;
    assert_eq!(
        eval_source(code).unwrap(),
        Value::list(vec![Value::string("too slow"), Value::Int(30)])
    );
}

#[test]
fn test_throw_plain_value() {
    assert_eq!(
        eval_source("(try (throw 5) (catch e (error-data e)))").unwrap(),
        Value::Int(5)
    );
}

#[test]
fn test_uncaught_kind_propagates() {
    let err = eval_source("(try (/ 1 0) (catch :type-error e 1))").unwrap_err();
    assert!(err.contains("division-by-zero"), "got: {}", err);
}

#[test]
fn test_finally_runs_on_every_exit() {
    let code = r#"
        (def log (atom []))
        (try (swap! log conj :body) (finally (swap! log conj :fin)))
        (try (try (error "x") (finally (swap! log conj :fin2))) (catch e nil))
        (deref log)
    "#;
    assert_eq!(
        eval_source(code).unwrap(),
        Value::vector(vec![
            Value::keyword("body"),
            Value::keyword("fin"),
            Value::keyword("fin2")
        ])
    );
}

#[test]
fn test_catch_after_resumption() {
    let body = r#"
        (try (do (await delay 10 1) (error :boom "late"))
             (catch :boom e (str "caught " (error-message e))))
    "#;
    assert_eq!(run_async(body), Ok(Value::string("caught late")));
}

#[test]
fn test_error_outside_protected_region_rejects() {
    let body = r#"
        (do (try (await delay 5 1) (catch :boom e 0))
            (await delay 5 1)
            (error :boom "late"))
    "#;
    assert_eq!(run_async(body), Err("boom: late".to_string()));
}

#[test]
fn test_rejected_operation_is_catchable() {
    assert_eq!(
        run_async(r#"(try (await fail-after 5 "slow") (catch :timeout e (str "recovered " (error-message e))))"#),
        Ok(Value::string("recovered slow"))
    );
    assert_eq!(
        run_async(r#"(try (await fail-after 5 "slow") (catch :type-error e 0))"#),
        Err("timeout: slow".to_string())
    );
}

#[test]
fn test_error_in_catch_clause_rejects() {
    assert_eq!(
        run_async(r#"(try (await rejected 1) (catch e (error "again")))"#),
        Err("error: again".to_string())
    );
}

#[test]
fn test_catch_resumes_the_rest_of_the_body() {
    assert_eq!(
        run_async("(+ 1 (try (await rejected 1) (catch e (await delay 5 10))))"),
        Ok(Value::Int(11))
    );
}

#[test]
fn test_finally_after_suspension() {
    let vm = setup();
    eval_all("(def log (atom []))", &vm).unwrap();
    assert_eq!(
        run_async_with(&vm, "(try (await delay 5 1) (finally (swap! log conj :ok)))"),
        Ok(Value::Int(1))
    );
    assert_eq!(
        run_async_with(&vm, r#"(try (await fail-after 5 "x") (finally (swap! log conj :failed)))"#),
        Err("timeout: x".to_string())
    );
    assert_eq!(
        eval_all("(deref log)", &vm).unwrap(),
        Value::vector(vec![Value::keyword("ok"), Value::keyword("failed")])
    );
}

#[test]
fn test_finally_can_suspend() {
    let vm = setup();
    eval_all("(def log (atom []))", &vm).unwrap();
    assert_eq!(
        run_async_with(
            &vm,
            "(try (swap! log conj 1) 10 (finally (await delay 5 nil) (swap! log conj 2)))"
        ),
        Ok(Value::Int(10))
    );
    assert_eq!(
        eval_all("(deref log)", &vm).unwrap(),
        Value::vector(vec![Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn test_error_in_resolve_bypasses_body_catch() {
    let vm = setup();
    let code = r#"
        (def log (atom []))
        (run (async (try (do (await resolved 1) 2)
                         (catch e (do (swap! log conj :caught) 3))))
             (fn [v] (swap! log conj v) (if (= v 2) (error "in resolve") v))
             (fn [e] (swap! log conj :rejected)))
    "#;
    let err = eval_all(code, &vm).unwrap_err();
    assert!(err.to_string().contains("in resolve"), "got: {}", err);
    assert_eq!(eval_all("(deref log)", &vm).unwrap(), ints(&[2]));
}

#[test]
fn test_error_in_resolve_after_timer_is_not_rejected() {
    let vm = setup();
    let code = r#"
        (def log (atom []))
        (def ex (run (async (try (+ 1 (await delay 5 1))
                                 (catch e (do (swap! log conj :caught) 0))))
                     (fn [v] (swap! log conj v) (error "in resolve"))
                     (fn [e] (swap! log conj :rejected))))
    "#;
    eval_all(code, &vm).unwrap();
    assert!(run_timers().is_err());
    assert_eq!(eval_all("(deref log)", &vm).unwrap(), ints(&[2]));
    assert_eq!(
        eval_all("(execution-state ex)", &vm).unwrap(),
        Value::keyword("completed")
    );
}

#[test]
fn test_error_in_reject_is_delivered_once() {
    let vm = setup();
    let code = r#"
        (def rejections (atom 0))
        (run (async (do (await resolved 1) (error "a")))
             (fn [v] v)
             (fn [e] (swap! rejections inc) (error "reject throws")))
    "#;
    let err = eval_all(code, &vm).unwrap_err();
    assert!(err.to_string().contains("reject throws"), "got: {}", err);
    assert_eq!(eval_all("(deref rejections)", &vm).unwrap(), Value::Int(1));
}

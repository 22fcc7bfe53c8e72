// Dynamic bindings across suspensions

use crate::common::{eval_settled, eval_source, run_async_with, setup};
use tether::{eval_all, Value};

fn strings(items: &[&str]) -> Value {
    Value::vector(items.iter().map(|s| Value::string(s)).collect())
}

#[test]
fn test_binding_in_direct_code() {
    let code = r#"
        (def user "nobody")
        (list (binding [user "ann"] (binding [user "bob"] user)) user)
    "#;
    assert_eq!(
        eval_source(code).unwrap(),
        Value::list(vec![Value::string("bob"), Value::string("nobody")])
    );
}

#[test]
fn test_binding_is_popped_on_error() {
    let code = r#"
        (def user "nobody")
        (try (binding [user "x"] (error "e")) (catch e user))
    "#;
    assert_eq!(eval_source(code).unwrap(), Value::string("nobody"));
}

#[test]
fn test_binding_survives_suspension() {
    let vm = setup();
    eval_all(r#"(def user "nobody") (def seen (atom []))"#, &vm).unwrap();
    let result = run_async_with(
        &vm,
        r#"(binding [user "ann"]
             (swap! seen conj user)
             (await delay 10 nil)
             (swap! seen conj user)
             user)"#,
    );
    assert_eq!(result, Ok(Value::string("ann")));
    assert_eq!(
        eval_all("(deref seen)", &vm).unwrap(),
        strings(&["ann", "ann"])
    );
    assert_eq!(eval_all("user", &vm).unwrap(), Value::string("nobody"));
}

#[test]
fn test_interleaved_coroutines_keep_their_own_bindings() {
    let program = r#"
        (def user "nobody")
        (def seen (atom []))
        (run (async (binding [user "a"] (await delay 20 nil) (swap! seen conj user)))
             (fn [v] v) (fn [e] (throw e)))
        (run (async (binding [user "b"] (await delay 10 nil) (swap! seen conj user)))
             (fn [v] v) (fn [e] (throw e)))
        (swap! seen conj user)
    "#;
    assert_eq!(
        eval_settled(program, "(deref seen)").unwrap(),
        strings(&["nobody", "b", "a"])
    );
}

#[test]
fn test_binding_is_popped_after_resumed_body() {
    let vm = setup();
    eval_all(r#"(def user "nobody")"#, &vm).unwrap();
    let result = run_async_with(
        &vm,
        r#"(let [inside (binding [user "ann"] (await delay 5 nil) user)]
             (list inside user))"#,
    );
    assert_eq!(
        result,
        Ok(Value::list(vec![Value::string("ann"), Value::string("nobody")]))
    );
}

// Loops in direct style and loops whose bodies suspend

use crate::common::{eval_source, ints, run_async, setup};
use tether::compiler::cps::trampoline;
use tether::{eval_all, TrampolineConfig, Value};

#[test]
fn test_direct_loop() {
    let code = "(loop [i 0 acc 0] (if (< i 100000) (recur (inc i) (+ acc i)) acc))";
    assert_eq!(eval_source(code).unwrap(), Value::Int(4_999_950_000));
}

#[test]
fn test_dotimes_and_while() {
    assert_eq!(
        eval_source("(def n (atom 0)) (dotimes [i 5] (swap! n + i)) (deref n)").unwrap(),
        Value::Int(10)
    );
    assert_eq!(
        eval_source("(def n (atom 0)) (while (< (deref n) 7) (swap! n inc)) (deref n)").unwrap(),
        Value::Int(7)
    );
}

#[test]
fn test_ordered_iteration_under_suspension() {
    // Later iterations wait less; order must still follow the iterations
    let body = "(loop [i 0 acc []] (if (< i 3) (recur (inc i) (conj acc (await delay (* 10 (- 3 i)) i))) acc))";
    assert_eq!(run_async(body), Ok(ints(&[0, 1, 2])));
}

#[test]
fn test_dotimes_with_await() {
    let body = "(let [acc (atom [])] (dotimes [i 3] (swap! acc conj (await delay (- 3 i) i))) (deref acc))";
    assert_eq!(run_async(body), Ok(ints(&[0, 1, 2])));
}

#[test]
fn test_while_with_await() {
    let body = "(let [n (atom 0)] (while (< (deref n) 3) (await delay 1 nil) (swap! n inc)) (deref n))";
    assert_eq!(run_async(body), Ok(Value::Int(3)));
}

#[test]
fn test_long_direct_loop_inside_coroutine() {
    let body = "(+ (await resolved 0) (loop [i 0] (if (< i 100000) (recur (inc i)) i)))";
    assert_eq!(run_async(body), Ok(Value::Int(100_000)));
}

#[test]
fn test_long_suspending_loop_with_delays() {
    let body = "(loop [i 0] (if (< i 2000) (recur (+ i (await delay 1 1))) i))";
    assert_eq!(run_async(body), Ok(Value::Int(2000)));
}

#[test]
fn test_recur_errors() {
    let err = eval_source("(loop [i 0] (recur))").unwrap_err();
    assert!(err.contains("recur expects 1 argument(s), got 0"), "got: {}", err);
    let err = eval_source("(loop [i 0] (+ 1 (recur i)))").unwrap_err();
    assert!(err.contains("recur is only allowed"), "got: {}", err);
    let err = eval_source("(loop [i 0] (fn [] (recur 1)))").unwrap_err();
    assert!(err.contains("recur is only allowed"), "got: {}", err);
}

#[test]
fn test_step_limit() {
    let vm = setup();
    trampoline::set_config(TrampolineConfig {
        step_limit: Some(100),
    });
    let result = eval_all(
        "(run (async (loop [i 0] (if (< i 1000) (recur (+ i (await resolved 1))) i))) (fn [v] v) (fn [e] e))",
        &vm,
    );
    trampoline::set_config(TrampolineConfig::default());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("trampoline-limit"), "got: {}", err);
}

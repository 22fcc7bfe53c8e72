// End-to-end evaluation of direct-style code: the host language around
// the coroutine transform

use crate::common::{eval_source, ints};
use tether::Value;

#[test]
fn test_simple_arithmetic() {
    assert_eq!(eval_source("(+ 1 2)").unwrap(), Value::Int(3));
    assert_eq!(eval_source("(- 10 4 3)").unwrap(), Value::Int(3));
    assert_eq!(eval_source("(* 2 3 4)").unwrap(), Value::Int(24));
    assert_eq!(eval_source("(mod 7 3)").unwrap(), Value::Int(1));
}

#[test]
fn test_division() {
    assert_eq!(eval_source("(/ 6 3)").unwrap(), Value::Int(2));
    assert_eq!(eval_source("(/ 7 2)").unwrap(), Value::Float(3.5));
    let err = eval_source("(/ 1 0)").unwrap_err();
    assert!(err.contains("division-by-zero"), "got: {}", err);
}

#[test]
fn test_globals_and_lets() {
    assert_eq!(
        eval_source("(def x 10) (let [y 2 z (* x y)] (+ z 1))").unwrap(),
        Value::Int(21)
    );
}

#[test]
fn test_recursive_function() {
    let code = "(defn fact [n] (if (<= n 1) 1 (* n (fact (dec n))))) (fact 10)";
    assert_eq!(eval_source(code).unwrap(), Value::Int(3_628_800));
}

#[test]
fn test_closures_capture_their_environment() {
    let code = "(defn adder [n] (fn [x] (+ x n))) (def add3 (adder 3)) (add3 4)";
    assert_eq!(eval_source(code).unwrap(), Value::Int(7));
}

#[test]
fn test_named_fn_literal_recurs_by_name() {
    let code = "((fn count-down [n] (if (= n 0) :done (count-down (dec n)))) 5)";
    assert_eq!(eval_source(code).unwrap(), Value::keyword("done"));
}

#[test]
fn test_vector_literals_evaluate_their_elements() {
    assert_eq!(eval_source("[1 (+ 1 1) 3]").unwrap(), ints(&[1, 2, 3]));
}

#[test]
fn test_quote() {
    assert_eq!(eval_source("(count '(a b c))").unwrap(), Value::Int(3));
    assert_eq!(eval_source("(first '(1 2))").unwrap(), Value::Int(1));
}

#[test]
fn test_atoms() {
    let code = "(def a (atom 1)) (swap! a + 10) (reset! a (* (deref a) 2)) (deref a)";
    assert_eq!(eval_source(code).unwrap(), Value::Int(22));
}

#[test]
fn test_strings() {
    assert_eq!(eval_source(r#"(str "a" 1 "b")"#).unwrap(), Value::string("a1b"));
    assert_eq!(eval_source(r#"(count "hello")"#).unwrap(), Value::Int(5));
}

#[test]
fn test_predicates() {
    assert_eq!(eval_source("(nil? nil)").unwrap(), Value::Bool(true));
    assert_eq!(eval_source("(fn? (fn [] 1))").unwrap(), Value::Bool(true));
    assert_eq!(eval_source("(fn? +)").unwrap(), Value::Bool(true));
    assert_eq!(eval_source("(number? 1.5)").unwrap(), Value::Bool(true));
    assert_eq!(eval_source(r#"(string? "s")"#).unwrap(), Value::Bool(true));
}

#[test]
fn test_undefined_variable() {
    let err = eval_source("(frobnicate 1)").unwrap_err();
    assert!(err.contains("undefined variable: frobnicate"), "got: {}", err);
}

#[test]
fn test_wrong_number_of_arguments() {
    let err = eval_source("((fn [x] x))").unwrap_err();
    assert!(err.contains("arity-error"), "got: {}", err);
    let err = eval_source("(inc 1 2)").unwrap_err();
    assert!(err.contains("inc: expected 1 argument"), "got: {}", err);
}

#[test]
fn test_read_errors_carry_locations() {
    let err = eval_source("(+ 1\n  (* 2 3)").unwrap_err();
    assert!(err.starts_with("read error: 1:1"), "got: {}", err);
    let err = eval_source("(+ 1 2))").unwrap_err();
    assert!(err.contains("unexpected closing parenthesis"), "got: {}", err);
}

#[test]
fn test_shebang_and_comments() {
    let code = "#!/usr/bin/env tether\n; a comment\n(+ 1 2) ; trailing\n";
    assert_eq!(eval_source(code).unwrap(), Value::Int(3));
}

// Conditionals and evaluation order with suspending subexpressions

use crate::common::{eval_source, ints, run_async, run_async_with, setup};
use tether::{eval_all, Value};

const NOTES: &str = "(def log (atom [])) (defn note [x] (swap! log conj x) x)";

#[test]
fn test_cond_short_circuits_suspending_tests() {
    let vm = setup();
    eval_all(NOTES, &vm).unwrap();
    let result = run_async_with(
        &vm,
        r#"(cond (await resolved true) (note 1)
                 (await resolved (note 2)) (note 3)
                 (await resolved false) (note 4)
                 :else (note 5))"#,
    );
    assert_eq!(result, Ok(Value::Int(1)));
    assert_eq!(eval_all("(deref log)", &vm).unwrap(), ints(&[1]));
}

#[test]
fn test_cond_falls_through_to_else() {
    let result = run_async("(cond (await resolved false) 1 (await resolved nil) 2 :else 3)");
    assert_eq!(result, Ok(Value::Int(3)));
    assert_eq!(eval_source("(cond false 1 :else 2)").unwrap(), Value::Int(2));
    assert_eq!(eval_source("(cond false 1)").unwrap(), Value::Nil);
}

#[test]
fn test_if_on_suspending_test() {
    assert_eq!(
        run_async("(if (await resolved false) :yes :no)"),
        Ok(Value::keyword("no"))
    );
    assert_eq!(
        run_async("(if (await delay 3 0) :yes :no)"),
        Ok(Value::keyword("yes"))
    );
}

#[test]
fn test_when_and_unless() {
    assert_eq!(
        run_async("(when (await resolved true) (await resolved 1) 2)"),
        Ok(Value::Int(2))
    );
    assert_eq!(run_async("(unless (await resolved true) 1)"), Ok(Value::Nil));
}

#[test]
fn test_and_or_short_circuit() {
    assert_eq!(
        run_async(r#"(and (await resolved 1) (await resolved nil) (error "unreached"))"#),
        Ok(Value::Nil)
    );
    assert_eq!(
        run_async(r#"(or (await resolved false) (await resolved 7) (error "unreached"))"#),
        Ok(Value::Int(7))
    );
    assert_eq!(eval_source("(and 1 2 3)").unwrap(), Value::Int(3));
    assert_eq!(eval_source("(or)").unwrap(), Value::Nil);
}

#[test]
fn test_sequential_let_across_suspensions() {
    assert_eq!(
        run_async("(let [a (await resolved 1) b (+ a (await delay 2 2))] (list a b))"),
        Ok(Value::list(vec![Value::Int(1), Value::Int(3)]))
    );
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let vm = setup();
    eval_all(NOTES, &vm).unwrap();
    let result = run_async_with(
        &vm,
        "(list (note 1) (await delay 5 (note 2)) (note 3) (await resolved (note 4)))",
    );
    assert_eq!(
        result,
        Ok(Value::list(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4)
        ]))
    );
    assert_eq!(eval_all("(deref log)", &vm).unwrap(), ints(&[1, 2, 3, 4]));
}

#[test]
fn test_direct_style_equivalence() {
    let direct = "(let [x 4] (if (< x 5) (* x (+ 1 2)) (- x)))";
    let suspended =
        "(let [x (await resolved 4)] (if (await resolved (< x 5)) (* x (+ (await resolved 1) 2)) (- x)))";
    assert_eq!(run_async(suspended), Ok(eval_source(direct).unwrap()));
}

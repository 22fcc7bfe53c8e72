// The selective transform as seen from source: what `--expand` prints

use crate::common::setup;
use tether::compile_all;

fn expand(code: &str) -> String {
    let vm = setup();
    let exprs = compile_all(code, &vm).unwrap();
    assert_eq!(exprs.len(), 1);
    exprs[0].display(vm.symbols()).to_string()
}

#[test]
fn test_plain_forms_are_not_touched() {
    assert_eq!(expand("(+ 1 2)"), "(+ 1 2)");
}

#[test]
fn test_breakpoint_free_body_is_delivered_unchanged() {
    let body = "(let [x 1] (if (< x 2) (do (println x) x) 0))";
    let vm = setup();
    let direct = compile_all(body, &vm).unwrap()[0]
        .display(vm.symbols())
        .to_string();
    let coroutine = compile_all(&format!("(async {})", body), &vm).unwrap()[0]
        .display(vm.symbols())
        .to_string();

    assert!(coroutine.starts_with("(fn [k#"), "got: {}", coroutine);
    assert!(
        coroutine.ends_with(&format!(" {}))", direct)),
        "got: {}",
        coroutine
    );
    assert!(!coroutine.contains("await-resume"));
}

#[test]
fn test_direct_loop_in_coroutine_stays_direct() {
    let out = expand("(async (loop [i 0] (if (< i 3) (recur (inc i)) i)))");
    assert!(!out.contains("#<native thunk>"), "got: {}", out);
    assert!(out.contains("(loop [i 0]"), "got: {}", out);
}

#[test]
fn test_await_is_rewritten() {
    let out = expand("(async (+ 1 (await resolved 2)))");
    assert!(out.contains("(resolved 2 (#<native await-resume>"), "got: {}", out);
    assert!(out.contains("(#<native await-reject>"), "got: {}", out);
    assert!(!out.contains("(await "), "got: {}", out);
}

#[test]
fn test_suspending_loop_uses_thunks() {
    let out = expand("(async (loop [i 0] (if (< i 3) (recur (+ i (await resolved 1))) i)))");
    assert!(out.contains("#<native thunk>"), "got: {}", out);
}

#[test]
fn test_only_the_suspending_branch_is_rewritten() {
    let out = expand("(async (if (< 1 2) (println :direct) (await resolved 1)))");
    assert!(out.contains("(println :direct)"), "got: {}", out);
}

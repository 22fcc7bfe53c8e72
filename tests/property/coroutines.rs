// Property-based tests for running coroutines
//
// A coroutine whose breakpoints resolve synchronously must deliver what
// the same program computes in direct style.

use super::strategies::arb_program;
use crate::common::{eval_source, run_async};
use proptest::prelude::*;
use tether::Value;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn suspended_programs_match_direct_style(program in arb_program()) {
        let direct = eval_source(&program.direct);
        let suspended = run_async(&program.suspended);
        prop_assert_eq!(suspended, direct, "program: {}", program.suspended);
    }

    #[test]
    fn delayed_values_arrive_in_order(delays in prop::collection::vec(0i64..20, 1..8)) {
        let items: Vec<String> = delays
            .iter()
            .enumerate()
            .map(|(i, d)| format!("(await delay {} {})", d, i))
            .collect();
        let body = format!("(vector {})", items.join(" "));
        let expected: Vec<Value> = (0..delays.len() as i64).map(Value::Int).collect();
        prop_assert_eq!(run_async(&body), Ok(Value::vector(expected)));
    }

    #[test]
    fn loop_sums_survive_suspension(n in 0i64..300) {
        let body = format!(
            "(loop [i 0 acc 0] (if (< i {}) (recur (inc i) (+ acc (await resolved i))) acc))",
            n
        );
        prop_assert_eq!(run_async(&body), Ok(Value::Int(n * (n - 1) / 2)));
    }
}

//! Proptest strategies for generating tether programs.

#![allow(dead_code)]

use proptest::prelude::*;

/// A program in two spellings: `direct` with plain values, `suspended`
/// with some of those values fetched through `(await resolved v)`.
#[derive(Debug, Clone)]
pub struct Program {
    pub direct: String,
    pub suspended: String,
}

impl Program {
    fn leaf(n: i64, suspend: bool) -> Self {
        let direct = n.to_string();
        let suspended = if suspend {
            format!("(await resolved {})", n)
        } else {
            direct.clone()
        };
        Program { direct, suspended }
    }

    fn combine(parts: &[Program], render: impl Fn(&[&str]) -> String) -> Self {
        let direct: Vec<&str> = parts.iter().map(|p| p.direct.as_str()).collect();
        let suspended: Vec<&str> = parts.iter().map(|p| p.suspended.as_str()).collect();
        Program {
            direct: render(&direct),
            suspended: render(&suspended),
        }
    }
}

/// Integer expressions over `+ - if let cond and or do`, small enough
/// that nothing overflows.
pub fn arb_program() -> impl Strategy<Value = Program> {
    let leaf = (-50i64..50, any::<bool>()).prop_map(|(n, s)| Program::leaf(n, s));
    leaf.prop_recursive(4, 48, 3, |inner| {
        prop_oneof![
            (prop::sample::select(vec!["+", "-"]), prop::collection::vec(inner.clone(), 1..4))
                .prop_map(|(op, args)| Program::combine(&args, |a| format!(
                    "({} {})",
                    op,
                    a.join(" ")
                ))),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(c, t, e)| {
                Program::combine(&[c, t, e], |a| {
                    format!("(if (< {} 0) {} {})", a[0], a[1], a[2])
                })
            }),
            (inner.clone(), inner.clone()).prop_map(|(x, body)| {
                Program::combine(&[x, body], |a| format!("(let [x {}] (- {} x))", a[0], a[1]))
            }),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(t, a, b)| {
                Program::combine(&[t, a, b], |p| {
                    format!("(cond (> {} 10) {} :else {})", p[0], p[1], p[2])
                })
            }),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| {
                Program::combine(&[a, b], |p| {
                    format!(
                        "(let [y {} z {}] (if (and (> y 0) (> z 0)) y z))",
                        p[0], p[1]
                    )
                })
            }),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| {
                Program::combine(&[a, b], |p| format!("(do {} {})", p[0], p[1]))
            }),
        ]
    })
}

/// Breakpoint-free source, including loops and exception handling
pub fn arb_direct_source() -> impl Strategy<Value = String> {
    arb_program().prop_flat_map(|p| {
        let body = p.direct;
        prop_oneof![
            Just(body.clone()),
            Just(format!(
                "(loop [i 0 acc 0] (if (< i 3) (recur (inc i) (+ acc {})) acc))",
                body
            )),
            Just(format!("(try {} (catch :error e 0) (finally (println 1)))", body)),
            Just(format!("(fn [y] (+ y {}))", body)),
        ]
    })
}

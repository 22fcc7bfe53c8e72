// Property-based tests for the transform itself

use super::strategies::arb_direct_source;
use proptest::prelude::*;
use tether::compiler::cps::{CpsTransformer, TransformContext};
use tether::{read_str, SymbolTable, VM};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Trees without a reachable breakpoint come back identical
    #[test]
    fn breakpoint_free_trees_are_unchanged(source in arb_direct_source()) {
        let symbols = SymbolTable::new();
        let vm = VM::new(&symbols);
        let form = read_str(&source, &symbols).unwrap();
        let expr = vm.compile(&form).unwrap();

        let table = vm.flavors().get("async").unwrap();
        let ctx = TransformContext::new(symbols.intern("k"), symbols.intern("f"));
        let transformed = CpsTransformer::new(&table, &symbols).transform(&expr, &ctx).unwrap();
        prop_assert_eq!(transformed, expr);
    }
}

//! End-to-end pipeline: source text → forms → expression trees → values

use crate::compiler::ast::Expr;
use crate::error::Result;
use crate::reader::read_all;
use crate::value::Value;
use crate::vm::VM;
use tracing::trace;

/// Read and convert every form of `source` without evaluating anything.
///
/// Coroutine bodies come back already transformed, which is what
/// `tether --expand` prints.
pub fn compile_all(source: &str, vm: &VM) -> Result<Vec<Expr>> {
    let forms = read_all(source, vm.symbols())?;
    let mut exprs = Vec::with_capacity(forms.len());
    for form in &forms {
        exprs.push(vm.compile(form)?);
    }
    Ok(exprs)
}

/// Evaluate every form of `source` in order, returning the last value.
///
/// Forms are compiled one at a time, so a definition is visible to the
/// conversion of the forms after it. Each form runs in its own trampoline
/// level.
pub fn eval_all(source: &str, vm: &VM) -> Result<Value> {
    let forms = read_all(source, vm.symbols())?;
    let mut result = Value::Nil;
    for (index, form) in forms.iter().enumerate() {
        let expr = vm.compile(form)?;
        trace!(index, "evaluating top-level form");
        result = vm.eval(&expr)?;
    }
    Ok(result)
}

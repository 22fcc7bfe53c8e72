use super::{Converter, Position, Result};
use crate::breakpoint::DEFAULT_FLAVOR;
use crate::compiler::analysis::{find_scope_violation, reaches_breakpoint};
use crate::compiler::ast::Expr;
use crate::compiler::cps::CpsTransformer;
use crate::compiler::ScopeCheck;
use crate::error::CompileError;
use crate::value::Value;
use tracing::debug;

impl Converter<'_> {
    /// `(async body...)`
    pub(super) fn convert_async(&self, list: &[Value], _pos: Position) -> Result<Expr> {
        self.coroutine(DEFAULT_FLAVOR, &list[1..])
    }

    /// `(coroutine :flavor body...)`
    pub(super) fn convert_coroutine(&self, list: &[Value], _pos: Position) -> Result<Expr> {
        match list.get(1) {
            Some(Value::Keyword(flavor)) => self.coroutine(flavor, &list[2..]),
            _ => Err(CompileError::syntax(
                "coroutine requires a flavor keyword",
            )),
        }
    }

    /// Convert, scope-check and transform a coroutine body.
    ///
    /// The result is a function of a success and a failure continuation.
    fn coroutine(&self, flavor: &str, body: &[Value]) -> Result<Expr> {
        let table = self.flavors.get(flavor)?;
        let body = self.convert_body(body, Position::TOP)?;

        if self.options.scope_check == ScopeCheck::Reject {
            if let Some(violation) = find_scope_violation(&body, &table) {
                return Err(CompileError::ScopeViolation {
                    op: self.symbols.name_or_placeholder(violation.op).to_string(),
                    form: violation.form.display(self.symbols).to_string(),
                });
            }
        }

        debug!(
            flavor,
            suspends = reaches_breakpoint(&body, &table),
            "compiling coroutine"
        );
        CpsTransformer::new(&table, self.symbols).compile_coroutine(&body)
    }
}

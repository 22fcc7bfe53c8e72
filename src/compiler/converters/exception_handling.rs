use super::{expect_symbol, Converter, Position, Result};
use crate::compiler::ast::{CatchClause, CatchKind, Expr};
use crate::error::CompileError;
use crate::value::Value;
use std::rc::Rc;

/// Is `form` a `(catch ...)` or `(finally ...)` clause?
fn clause_head(form: &Value) -> Option<&str> {
    let Value::List(items) = form else {
        return None;
    };
    match items.first() {
        Some(Value::Symbol(sym)) if matches!(&*sym.name, "catch" | "finally") => Some(&*sym.name),
        _ => None,
    }
}

impl Converter<'_> {
    /// `(try body... (catch e handler...) (catch :kind e handler...) (finally cleanup...))`
    ///
    /// Catch clauses are tried in order. `recur` cannot cross a `try`.
    pub(super) fn convert_try(&self, list: &[Value], _pos: Position) -> Result<Expr> {
        let forms = &list[1..];
        let split = forms
            .iter()
            .position(|form| clause_head(form).is_some())
            .unwrap_or(forms.len());
        let inner = Position::TOP;
        let body = self.convert_body(&forms[..split], inner)?;

        let mut catches = Vec::new();
        let mut finally = None;
        for clause in &forms[split..] {
            let Value::List(items) = clause else {
                return Err(CompileError::syntax(format!(
                    "expected catch or finally clause, got {}",
                    clause
                )));
            };
            if finally.is_some() {
                return Err(CompileError::syntax("finally must be the last clause of try"));
            }
            match clause_head(clause) {
                Some("catch") => catches.push(self.convert_catch(&items[1..], inner)?),
                Some(_) => finally = Some(Box::new(self.convert_body(&items[1..], inner)?)),
                None => {
                    return Err(CompileError::syntax(format!(
                        "expected catch or finally clause, got {}",
                        clause
                    )))
                }
            }
        }

        Ok(Expr::Try {
            body: Box::new(body),
            catches,
            finally,
        })
    }

    /// `e handler...` or `:kind e handler...`
    fn convert_catch(&self, rest: &[Value], pos: Position) -> Result<CatchClause> {
        let (kind, rest) = match rest.first() {
            Some(Value::Keyword(kind)) => (CatchKind::Kind(Rc::clone(kind)), &rest[1..]),
            _ => (CatchKind::Any, rest),
        };
        let Some((var, body)) = rest.split_first() else {
            return Err(CompileError::syntax("catch requires a variable"));
        };
        let var = expect_symbol(var, "catch variable")?;
        Ok(CatchClause {
            kind,
            var: var.id,
            body: self.convert_body(body, pos)?,
        })
    }
}

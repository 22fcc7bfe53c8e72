use super::{binding_pairs, Converter, Position, Result};
use crate::compiler::ast::Expr;
use crate::error::CompileError;
use crate::value::Value;

impl Converter<'_> {
    /// `(if test then else?)`
    pub(super) fn convert_if(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if list.len() < 3 || list.len() > 4 {
            return Err(CompileError::syntax("if requires 2 or 3 arguments"));
        }
        let cond = self.convert_at(&list[1], pos.operand())?;
        let then = self.convert_at(&list[2], pos)?;
        let else_ = match list.get(3) {
            Some(form) => self.convert_at(form, pos)?,
            None => Expr::Literal(Value::Nil),
        };
        Ok(Expr::if_(cond, then, else_))
    }

    pub(super) fn convert_do(&self, body: &[Value], pos: Position) -> Result<Expr> {
        self.convert_body(body, pos)
    }

    /// `(recur args...)`: only in tail position of a loop with as many
    /// bindings as there are arguments
    pub(super) fn convert_recur(&self, list: &[Value], pos: Position) -> Result<Expr> {
        let (Some(arity), true) = (pos.loop_arity, pos.tail) else {
            return Err(CompileError::MisplacedRecur(Value::list(list.to_vec()).to_string()));
        };
        let got = list.len() - 1;
        if got != arity {
            return Err(CompileError::RecurArity {
                expected: arity,
                got,
            });
        }
        Ok(Expr::Recur(self.convert_operands(&list[1..], pos)?))
    }

    /// `(cond test expr ... :else expr)` into nested conditionals
    pub(super) fn convert_cond(&self, list: &[Value], pos: Position) -> Result<Expr> {
        let clauses = &list[1..];
        if clauses.len() % 2 != 0 {
            return Err(CompileError::syntax(
                "cond requires an even number of forms",
            ));
        }
        let mut expr = Expr::Literal(Value::Nil);
        for pair in clauses.chunks(2).rev() {
            let then = self.convert_at(&pair[1], pos)?;
            expr = match &pair[0] {
                Value::Keyword(k) if &**k == "else" => then,
                test => Expr::if_(self.convert_at(test, pos.operand())?, then, expr),
            };
        }
        Ok(expr)
    }

    /// `(when test body...)`, or `(unless test body...)` when `when` is false
    pub(super) fn convert_when(&self, list: &[Value], pos: Position, when: bool) -> Result<Expr> {
        if list.len() < 2 {
            return Err(CompileError::syntax(format!(
                "{} requires a test",
                if when { "when" } else { "unless" }
            )));
        }
        let test = self.convert_at(&list[1], pos.operand())?;
        let body = self.convert_body(&list[2..], pos)?;
        let nil = Expr::Literal(Value::Nil);
        Ok(if when {
            Expr::if_(test, body, nil)
        } else {
            Expr::if_(test, nil, body)
        })
    }

    /// `(and a b ...)`: the first falsy value, or the last value
    pub(super) fn convert_and(&self, forms: &[Value], pos: Position) -> Result<Expr> {
        match forms {
            [] => Ok(Expr::Literal(Value::Bool(true))),
            [only] => self.convert_at(only, pos),
            [first, rest @ ..] => {
                let t = self.fresh("and");
                let first = self.convert_at(first, pos.operand())?;
                let rest = self.convert_and(rest, pos)?;
                Ok(Expr::let_(
                    vec![(t.id, first)],
                    Expr::if_(Expr::var(t.id), rest, Expr::var(t.id)),
                ))
            }
        }
    }

    /// `(or a b ...)`: the first truthy value, or the last value
    pub(super) fn convert_or(&self, forms: &[Value], pos: Position) -> Result<Expr> {
        match forms {
            [] => Ok(Expr::Literal(Value::Nil)),
            [only] => self.convert_at(only, pos),
            [first, rest @ ..] => {
                let t = self.fresh("or");
                let first = self.convert_at(first, pos.operand())?;
                let rest = self.convert_or(rest, pos)?;
                Ok(Expr::let_(
                    vec![(t.id, first)],
                    Expr::if_(Expr::var(t.id), Expr::var(t.id), rest),
                ))
            }
        }
    }

    /// `(while test body...)` as `(loop [] (if test (do body... (recur)) nil))`
    pub(super) fn convert_while(&self, list: &[Value], _pos: Position) -> Result<Expr> {
        if list.len() < 2 {
            return Err(CompileError::syntax("while requires a test"));
        }
        let inner = Position::loop_body(0);
        let test = self.convert_at(&list[1], inner.operand())?;
        let mut body: Vec<Expr> = self.convert_operands(&list[2..], inner)?;
        body.push(Expr::Recur(vec![]));
        Ok(Expr::Loop {
            bindings: vec![],
            body: Box::new(Expr::if_(
                test,
                Expr::begin(body),
                Expr::Literal(Value::Nil),
            )),
        })
    }

    /// `(dotimes [i n] body...)`: `body` with `i` bound to 0 .. n-1
    pub(super) fn convert_dotimes(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if list.len() < 2 {
            return Err(CompileError::syntax("dotimes requires a binding vector"));
        }
        let pairs = binding_pairs(&list[1], "dotimes binding")?;
        let [(counter, count)] = pairs.as_slice() else {
            return Err(CompileError::syntax(
                "dotimes binding must be [name count]",
            ));
        };
        let limit = self.fresh("limit");
        let count = self.convert_at(count, pos.operand())?;

        let inner = Position::loop_body(1);
        let mut body = self.convert_operands(&list[2..], inner)?;
        body.push(Expr::Recur(vec![Expr::call(
            Expr::var(self.symbols.intern("inc")),
            vec![Expr::var(counter.id)],
        )]));
        let test = Expr::call(
            Expr::var(self.symbols.intern("<")),
            vec![Expr::var(counter.id), Expr::var(limit.id)],
        );
        let looped = Expr::Loop {
            bindings: vec![(counter.id, Expr::Literal(Value::Int(0)))],
            body: Box::new(Expr::if_(test, Expr::begin(body), Expr::Literal(Value::Nil))),
        };
        Ok(Expr::let_(vec![(limit.id, count)], looped))
    }
}

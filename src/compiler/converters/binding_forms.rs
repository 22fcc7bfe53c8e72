use super::{binding_pairs, expect_symbol, expect_vector, ids, Converter, Position, Result};
use crate::compiler::ast::Expr;
use crate::context;
use crate::error::CompileError;
use crate::symbol::SymbolId;
use crate::value::{Symbol, Value};

impl Converter<'_> {
    /// `(let [name init ...] body...)`, bindings in sequence
    pub(super) fn convert_let(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if list.len() < 2 {
            return Err(CompileError::syntax("let requires a binding vector"));
        }
        let pairs = binding_pairs(&list[1], "let bindings")?;
        let mut bindings = Vec::with_capacity(pairs.len());
        for (name, init) in &pairs {
            bindings.push((name.id, self.convert_at(init, pos.operand())?));
        }
        let body = self.convert_body(&list[2..], pos)?;
        Ok(Expr::let_(bindings, body))
    }

    /// `(loop [name init ...] body...)`
    pub(super) fn convert_loop(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if list.len() < 2 {
            return Err(CompileError::syntax("loop requires a binding vector"));
        }
        let pairs = binding_pairs(&list[1], "loop bindings")?;
        let mut seen: Vec<SymbolId> = Vec::with_capacity(pairs.len());
        let mut bindings = Vec::with_capacity(pairs.len());
        for (name, init) in &pairs {
            if seen.contains(&name.id) {
                return Err(CompileError::syntax(format!(
                    "loop binding `{}` appears more than once",
                    name.name
                )));
            }
            seen.push(name.id);
            bindings.push((name.id, self.convert_at(init, pos.operand())?));
        }
        let body = self.convert_body(&list[2..], Position::loop_body(pairs.len()))?;
        Ok(Expr::Loop {
            bindings,
            body: Box::new(body),
        })
    }

    /// `(def name value)`
    pub(super) fn convert_def(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if list.len() != 3 {
            return Err(CompileError::syntax("def requires a name and a value"));
        }
        let name = expect_symbol(&list[1], "def name")?;
        let value = self.convert_at(&list[2], pos.operand())?;
        Ok(Expr::Define {
            name: name.id,
            value: Box::new(value),
        })
    }

    /// `(fn [params] body...)` or `(fn name [params] body...)`
    pub(super) fn convert_fn(&self, list: &[Value]) -> Result<Expr> {
        match list.get(1) {
            Some(Value::Symbol(name)) => self.function(Some(name.clone()), &list[2..]),
            Some(_) => self.function(None, &list[1..]),
            None => Err(CompileError::syntax("fn requires a parameter vector")),
        }
    }

    /// `(defn name [params] body...)`
    pub(super) fn convert_defn(&self, list: &[Value], _pos: Position) -> Result<Expr> {
        if list.len() < 3 {
            return Err(CompileError::syntax(
                "defn requires a name and a parameter vector",
            ));
        }
        let name = expect_symbol(&list[1], "defn name")?;
        let function = self.function(Some(name.clone()), &list[2..])?;
        Ok(Expr::Define {
            name: name.id,
            value: Box::new(function),
        })
    }

    /// `[params] body...` after the optional name
    fn function(&self, name: Option<Symbol>, rest: &[Value]) -> Result<Expr> {
        let Some((params, body)) = rest.split_first() else {
            return Err(CompileError::syntax("fn requires a parameter vector"));
        };
        let params = expect_vector(params, "fn parameters")?
            .iter()
            .map(|p| expect_symbol(p, "fn parameter"))
            .collect::<Result<Vec<_>>>()?;
        // A function body starts a new recur scope
        let body = self.convert_body(body, Position::TOP)?;
        Ok(Expr::lambda(name, ids(&params), body))
    }

    /// `(binding [name value ...] body...)`:
    ///
    /// ```text
    /// (let [depth (push-bindings 'name value ...)]
    ///   (try body... (finally (pop-bindings depth))))
    /// ```
    ///
    /// The push and pop natives are embedded as literals.
    pub(super) fn convert_binding(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if list.len() < 2 {
            return Err(CompileError::syntax("binding requires a binding vector"));
        }
        let pairs = binding_pairs(&list[1], "binding bindings")?;
        let mut args = Vec::with_capacity(pairs.len() * 2);
        for (name, value) in &pairs {
            args.push(Expr::Literal(Value::Symbol(name.clone())));
            args.push(self.convert_at(value, pos.operand())?);
        }

        let depth = self.fresh("depth");
        // recur cannot cross the implicit try
        let body = self.convert_body(&list[2..], Position::TOP)?;
        let pop = Expr::call(
            Expr::Literal(context::pop_bindings_native()),
            vec![Expr::var(depth.id)],
        );
        Ok(Expr::let_(
            vec![(
                depth.id,
                Expr::call(Expr::Literal(context::push_bindings_native()), args),
            )],
            Expr::Try {
                body: Box::new(body),
                catches: vec![],
                finally: Some(Box::new(pop)),
            },
        ))
    }
}

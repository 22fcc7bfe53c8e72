//! Value to expression conversion
//!
//! Converts source forms (the reader's `Value`s) into `Expr` trees. Special
//! forms map onto one node kind each; derived forms (`cond`, `and`, `while`,
//! `binding`, ...) are expanded into those nodes here and never reach the
//! evaluator or the CPS transform as forms of their own. Coroutine bodies
//! are converted, scope-checked and transformed as soon as they are seen.

mod binding_forms;
mod control_flow;
mod coroutines;
mod exception_handling;

use super::ast::Expr;
use super::CompileOptions;
use crate::breakpoint::Flavors;
use crate::error::CompileError;
use crate::symbol::{SymbolId, SymbolTable};
use crate::value::{Symbol, Value};

type Result<T> = std::result::Result<T, CompileError>;

/// Where a form sits relative to the innermost enclosing `loop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    /// Number of bindings of the loop a `recur` here would re-enter
    loop_arity: Option<usize>,
    /// Is the form in tail position of that loop?
    tail: bool,
}

impl Position {
    const TOP: Position = Position {
        loop_arity: None,
        tail: false,
    };

    fn loop_body(arity: usize) -> Self {
        Position {
            loop_arity: Some(arity),
            tail: true,
        }
    }

    /// A subform whose value is used by its parent
    fn operand(self) -> Self {
        Position {
            tail: false,
            ..self
        }
    }
}

/// Converts forms to expression trees
pub struct Converter<'a> {
    symbols: &'a SymbolTable,
    flavors: &'a Flavors,
    options: CompileOptions,
}

impl<'a> Converter<'a> {
    pub fn new(symbols: &'a SymbolTable, flavors: &'a Flavors, options: CompileOptions) -> Self {
        Converter {
            symbols,
            flavors,
            options,
        }
    }

    /// Convert one top-level form
    pub fn convert(&self, form: &Value) -> Result<Expr> {
        self.convert_at(form, Position::TOP)
    }

    fn convert_at(&self, form: &Value, pos: Position) -> Result<Expr> {
        match form {
            Value::Symbol(sym) => Ok(Expr::var(sym.id)),
            Value::Vector(items) => {
                let args = self.convert_operands(items, pos)?;
                Ok(Expr::call(Expr::var(self.symbols.intern("vector")), args))
            }
            Value::List(items) if items.is_empty() => Ok(Expr::Literal(form.clone())),
            Value::List(items) => self.convert_list(items, pos),
            _ => Ok(Expr::Literal(form.clone())),
        }
    }

    fn convert_list(&self, list: &[Value], pos: Position) -> Result<Expr> {
        if let Value::Symbol(head) = &list[0] {
            match &*head.name {
                "quote" => return self.convert_quote(list),
                "if" => return self.convert_if(list, pos),
                "do" => return self.convert_do(&list[1..], pos),
                "let" => return self.convert_let(list, pos),
                "loop" => return self.convert_loop(list, pos),
                "recur" => return self.convert_recur(list, pos),
                "try" => return self.convert_try(list, pos),
                "def" => return self.convert_def(list, pos),
                "fn" => return self.convert_fn(list),
                "defn" => return self.convert_defn(list, pos),
                "async" => return self.convert_async(list, pos),
                "coroutine" => return self.convert_coroutine(list, pos),
                "cond" => return self.convert_cond(list, pos),
                "when" => return self.convert_when(list, pos, true),
                "unless" => return self.convert_when(list, pos, false),
                "and" => return self.convert_and(&list[1..], pos),
                "or" => return self.convert_or(&list[1..], pos),
                "while" => return self.convert_while(list, pos),
                "dotimes" => return self.convert_dotimes(list, pos),
                "binding" => return self.convert_binding(list, pos),
                _ => {}
            }
        }

        let func = self.convert_at(&list[0], pos.operand())?;
        let args = self.convert_operands(&list[1..], pos)?;
        Ok(Expr::call(func, args))
    }

    fn convert_operands(&self, forms: &[Value], pos: Position) -> Result<Vec<Expr>> {
        forms
            .iter()
            .map(|form| self.convert_at(form, pos.operand()))
            .collect()
    }

    /// Convert a body: every form but the last is evaluated for effect
    fn convert_body(&self, forms: &[Value], pos: Position) -> Result<Expr> {
        let Some((last, init)) = forms.split_last() else {
            return Ok(Expr::Literal(Value::Nil));
        };
        let mut exprs = Vec::with_capacity(forms.len());
        for form in init {
            exprs.push(self.convert_at(form, pos.operand())?);
        }
        exprs.push(self.convert_at(last, pos)?);
        Ok(Expr::begin(exprs))
    }

    fn convert_quote(&self, list: &[Value]) -> Result<Expr> {
        if list.len() != 2 {
            return Err(CompileError::syntax("quote requires exactly 1 argument"));
        }
        Ok(Expr::Literal(list[1].clone()))
    }

    /// A gensym together with its spelling
    fn fresh(&self, prefix: &str) -> Symbol {
        let id = self.symbols.gensym(prefix);
        Symbol {
            id,
            name: self.symbols.name_or_placeholder(id),
        }
    }
}

/// The symbol a form names, or a syntax error mentioning `what`
fn expect_symbol(form: &Value, what: &str) -> Result<Symbol> {
    match form {
        Value::Symbol(sym) => Ok(sym.clone()),
        other => Err(CompileError::syntax(format!(
            "{} must be a symbol, got {}",
            what, other
        ))),
    }
}

/// Elements of a `[...]` form
fn expect_vector<'v>(form: &'v Value, what: &str) -> Result<&'v [Value]> {
    match form {
        Value::Vector(items) => Ok(items),
        other => Err(CompileError::syntax(format!(
            "{} must be a vector, got {}",
            what, other
        ))),
    }
}

/// `[name init name init ...]`
fn binding_pairs(form: &Value, what: &str) -> Result<Vec<(Symbol, Value)>> {
    let items = expect_vector(form, what)?;
    if items.len() % 2 != 0 {
        return Err(CompileError::syntax(format!(
            "{} requires an even number of forms",
            what
        )));
    }
    items
        .chunks(2)
        .map(|pair| Ok((expect_symbol(&pair[0], "binding name")?, pair[1].clone())))
        .collect()
}

fn ids(names: &[Symbol]) -> Vec<SymbolId> {
    names.iter().map(|sym| sym.id).collect()
}

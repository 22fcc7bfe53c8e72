use crate::symbol::{SymbolId, SymbolTable};
use crate::value::{Symbol, Value};
use std::fmt;
use std::rc::Rc;

/// Expression tree produced by the converter and rewritten by the CPS
/// transform
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Value),

    /// Variable reference (lexical, dynamic or global; resolved at run time)
    Var(SymbolId),

    /// Function call
    Call { func: Box<Expr>, args: Vec<Expr> },

    /// If expression
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        else_: Box<Expr>,
    },

    /// Begin (sequence of expressions)
    Begin(Vec<Expr>),

    /// Let binding, sequential scope
    Let {
        bindings: Vec<(SymbolId, Expr)>,
        body: Box<Expr>,
    },

    /// Loop head; `Recur` in tail position re-enters it with new bindings
    Loop {
        bindings: Vec<(SymbolId, Expr)>,
        body: Box<Expr>,
    },

    Recur(Vec<Expr>),

    /// Protected body, ordered catch clauses, optional cleanup
    Try {
        body: Box<Expr>,
        catches: Vec<CatchClause>,
        finally: Option<Box<Expr>>,
    },

    /// Define a global
    Define { name: SymbolId, value: Box<Expr> },

    /// Function literal
    Lambda(Rc<Lambda>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    /// Self-reference name of `(fn name [params] ...)`
    pub name: Option<Symbol>,
    pub params: Vec<SymbolId>,
    pub body: Expr,
}

impl Lambda {
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_ref().map(|sym| &*sym.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub kind: CatchKind,
    pub var: SymbolId,
    pub body: Expr,
}

/// Which conditions a catch clause accepts
#[derive(Debug, Clone, PartialEq)]
pub enum CatchKind {
    Any,
    Kind(Rc<str>),
}

impl CatchKind {
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (CatchKind::Any, _) => true,
            (CatchKind::Kind(name), Value::Condition(cond)) => cond.kind.is_a(name),
            (CatchKind::Kind(_), _) => false,
        }
    }
}

impl Expr {
    pub fn var(id: SymbolId) -> Self {
        Expr::Var(id)
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args,
        }
    }

    pub fn if_(cond: Expr, then: Expr, else_: Expr) -> Self {
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            else_: Box::new(else_),
        }
    }

    pub fn let_(bindings: Vec<(SymbolId, Expr)>, body: Expr) -> Self {
        if bindings.is_empty() {
            return body;
        }
        Expr::Let {
            bindings,
            body: Box::new(body),
        }
    }

    pub fn lambda(name: Option<Symbol>, params: Vec<SymbolId>, body: Expr) -> Self {
        Expr::Lambda(Rc::new(Lambda { name, params, body }))
    }

    /// Sequence; a single expression is returned as is
    pub fn begin(mut exprs: Vec<Expr>) -> Self {
        match exprs.len() {
            0 => Expr::Literal(Value::Nil),
            1 => exprs.remove(0),
            _ => Expr::Begin(exprs),
        }
    }

    /// Literals and variable references: no evaluation effects
    pub fn is_atom(&self) -> bool {
        matches!(self, Expr::Literal(_) | Expr::Var(_))
    }

    /// Render as S-expression text
    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, symbols }
    }
}

pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    symbols: &'a SymbolTable,
}

impl ExprDisplay<'_> {
    fn sub<'b>(&'b self, expr: &'b Expr) -> ExprDisplay<'b> {
        ExprDisplay {
            expr,
            symbols: self.symbols,
        }
    }

    fn name(&self, id: SymbolId) -> Rc<str> {
        self.symbols.name_or_placeholder(id)
    }

    fn bindings(&self, f: &mut fmt::Formatter<'_>, bindings: &[(SymbolId, Expr)]) -> fmt::Result {
        write!(f, "[")?;
        for (i, (name, init)) in bindings.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{} {}", self.name(*name), self.sub(init))?;
        }
        write!(f, "]")
    }

    fn exprs(&self, f: &mut fmt::Formatter<'_>, exprs: &[Expr]) -> fmt::Result {
        for expr in exprs {
            write!(f, " {}", self.sub(expr))?;
        }
        Ok(())
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            Expr::Literal(v @ (Value::Symbol(_) | Value::List(_))) => write!(f, "'{}", v),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Var(id) => write!(f, "{}", self.name(*id)),
            Expr::Call { func, args } => {
                write!(f, "({}", self.sub(func))?;
                self.exprs(f, args)?;
                write!(f, ")")
            }
            Expr::If { cond, then, else_ } => write!(
                f,
                "(if {} {} {})",
                self.sub(cond),
                self.sub(then),
                self.sub(else_)
            ),
            Expr::Begin(exprs) => {
                write!(f, "(do")?;
                self.exprs(f, exprs)?;
                write!(f, ")")
            }
            Expr::Let { bindings, body } | Expr::Loop { bindings, body } => {
                let head = if matches!(self.expr, Expr::Let { .. }) {
                    "let"
                } else {
                    "loop"
                };
                write!(f, "({} ", head)?;
                self.bindings(f, bindings)?;
                write!(f, " {})", self.sub(body))
            }
            Expr::Recur(args) => {
                write!(f, "(recur")?;
                self.exprs(f, args)?;
                write!(f, ")")
            }
            Expr::Try {
                body,
                catches,
                finally,
            } => {
                write!(f, "(try {}", self.sub(body))?;
                for clause in catches {
                    match &clause.kind {
                        CatchKind::Any => write!(f, " (catch {}", self.name(clause.var))?,
                        CatchKind::Kind(kind) => {
                            write!(f, " (catch :{} {}", kind, self.name(clause.var))?
                        }
                    }
                    write!(f, " {})", self.sub(&clause.body))?;
                }
                if let Some(finally) = finally {
                    write!(f, " (finally {})", self.sub(finally))?;
                }
                write!(f, ")")
            }
            Expr::Define { name, value } => {
                write!(f, "(def {} {})", self.name(*name), self.sub(value))
            }
            Expr::Lambda(lambda) => {
                write!(f, "(fn ")?;
                if let Some(name) = lambda.name_str() {
                    write!(f, "{} ", name)?;
                }
                write!(f, "[")?;
                for (i, param) in lambda.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", self.name(*param))?;
                }
                write!(f, "] {})", self.sub(&lambda.body))
            }
        }
    }
}

// SPDX: CC0-1.0

use crate::{lex::SubStr, stdlib, Number};
use core::fmt;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Pow => Right,
        }
    }

    /// Prefix operators take their operand from the right only.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg)
    }

    pub const fn fun(&self) -> (&'static str, Fun) {
        match self {
            Self::Neg => ("neg", Fun::new(1, stdlib::neg)),
            Self::Add => ("add", Fun::new(2, stdlib::add)),
            Self::Sub => ("sub", Fun::new(2, stdlib::sub)),
            Self::Mul => ("mul", Fun::new(2, stdlib::mul)),
            Self::Div => ("div", Fun::new(2, stdlib::div)),
            Self::Pow => ("pow", Fun::new(2, stdlib::pow)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprTyp {
    Val(Number),
    /// Variable or constant, named by the node's span.
    Ident,
    Operator {
        typ: OperatorTyp,
        args: Vec<Expr>,
    },
    /// Function call, named by the node's span.
    Call {
        args: Vec<Expr>,
    },
}

/// Parsed expression tree. Every node remembers where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub typ: ExprTyp,
    pub loc: SubStr,
}

impl Expr {
    /// Immediate children, left to right.
    pub fn args(&self) -> &[Expr] {
        match &self.typ {
            ExprTyp::Val(_) | ExprTyp::Ident => &[],
            ExprTyp::Operator { args, .. } | ExprTyp::Call { args } => args,
        }
    }

    /// Short description of this node alone, without its children.
    pub fn head(&self) -> String {
        match &self.typ {
            ExprTyp::Val(val) => format!("{val}"),
            ExprTyp::Ident => self.loc.get().to_string(),
            ExprTyp::Operator { typ, .. } => typ.fun().0.to_string(),
            ExprTyp::Call { .. } => self.loc.get().to_string(),
        }
    }
}

// s-expression form, e.g. `(add (pow x 2) 1)`
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args();
        if let ExprTyp::Val(_) | ExprTyp::Ident = self.typ {
            return write!(f, "{}", self.head());
        }
        write!(f, "({}", self.head())?;
        for arg in args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalErrTyp {
    ArgCount {
        name: IdentKey,
        arity: usize,
        found: usize,
    },
    UndefinedIdent {
        text: SubStr,
    },
    NullVar {
        text: SubStr,
    },
    NotAValue {
        text: SubStr,
    },
    NotAFunction {
        text: SubStr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            EvalErrTyp::ArgCount { name, arity, found } => write!(
                f,
                "function '{name}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),

            EvalErrTyp::UndefinedIdent { text } => {
                write!(f, "undefined identifier '{}'", text.get())
            }

            EvalErrTyp::NullVar { text } => {
                write!(
                    f,
                    "variable '{}' is declared but its value is not defined",
                    text.get()
                )
            }

            EvalErrTyp::NotAValue { text } => {
                write!(f, "function '{}' cannot be used as a value", text.get())
            }

            EvalErrTyp::NotAFunction { text } => {
                write!(f, "'{}' is not a function", text.get())
            }
        }
    }
}

#[derive(Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(Vec<Number>) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(Vec<Number>) -> Number) -> Self {
        Self { arity, fun }
    }
}

#[derive(Debug)]
pub enum Ident {
    Var(Option<Number>),
    Const(Number),
    Fun(Fun),
}

impl Ident {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Var(_) => "variable",
            Self::Const(_) => "constant",
            Self::Fun(_) => "function",
        }
    }
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Arc(SubStr),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Arc(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Arc(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

/// Binds a variable in the table, returning the previous entry.
pub fn set_var(idents: &mut Idents, name: &'static str, val: Option<Number>) -> Option<Ident> {
    idents.insert(name.into(), Ident::Var(val))
}

fn call(
    name: impl Into<IdentKey>,
    fun: &Fun,
    args: &[Expr],
    idents: &Idents,
    loc: &SubStr,
) -> Result<Number, EvalErr> {
    if args.len() != fun.arity {
        return Err(EvalErr {
            typ: EvalErrTyp::ArgCount {
                name: name.into(),
                arity: fun.arity,
                found: args.len(),
            },
            loc: loc.clone(),
        });
    }
    let vals = args
        .iter()
        .map(|arg| eval(arg, idents))
        .collect::<Result<Vec<Number>, _>>()?;
    Ok((fun.fun)(vals))
}

pub fn eval(expr: &Expr, idents: &Idents) -> Result<Number, EvalErr> {
    let fail = |typ| {
        Err(EvalErr {
            typ,
            loc: expr.loc.clone(),
        })
    };

    match &expr.typ {
        ExprTyp::Val(val) => Ok(*val),

        ExprTyp::Operator { typ, args } => {
            let (name, fun) = typ.fun();
            call(name, &fun, args, idents, &expr.loc)
        }

        ExprTyp::Ident => {
            let text = expr.loc.clone();
            match idents.get(&text.clone().into()) {
                Some(Ident::Var(Some(val)) | Ident::Const(val)) => Ok(*val),
                Some(Ident::Var(None)) => fail(EvalErrTyp::NullVar { text }),
                Some(Ident::Fun(_)) => fail(EvalErrTyp::NotAValue { text }),
                None => fail(EvalErrTyp::UndefinedIdent { text }),
            }
        }

        ExprTyp::Call { args } => {
            let text = expr.loc.clone();
            match idents.get(&text.clone().into()) {
                Some(Ident::Fun(fun)) => call(text, fun, args, idents, &expr.loc),
                Some(_) => fail(EvalErrTyp::NotAFunction { text }),
                None => fail(EvalErrTyp::UndefinedIdent { text }),
            }
        }
    }
}

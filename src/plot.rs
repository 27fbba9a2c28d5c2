// SPDX: CC0-1.0

use crate::{
    eval::{self, EvalErr, Expr, Idents},
    lex::{Lexer, SubStr},
    parse::{self, ParseErr},
    stdlib::{self, X},
    sweep, Domain, Number, Point, SweepErr,
};
use core::{fmt, ops::Range};
use std::sync::Arc;

/// One end of the y axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum YBound {
    #[default]
    Auto,
    Fixed(Number),
}

impl fmt::Display for YBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(val) => write!(f, "{val}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct YScale {
    pub auto: bool,
    pub min: Option<Number>,
    pub max: Option<Number>,
}

impl YScale {
    pub const AUTO: Self = Self {
        auto: true,
        min: None,
        max: None,
    };

    /// Axis bounds handed to the renderer. In manual mode each missing bound
    /// falls back to auto on its own.
    pub fn domain(&self) -> [YBound; 2] {
        if self.auto {
            return [YBound::Auto; 2];
        }
        [self.min, self.max].map(|bound| bound.map_or(YBound::Auto, YBound::Fixed))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlotConfig {
    pub expr: Arc<String>,
    pub domain: Domain,
    pub y: YScale,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Plot {
    pub points: Vec<Point<Number>>,
    pub y_domain: [YBound; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprErr {
    Parse(ParseErr),
    Eval(EvalErr),
}

impl ExprErr {
    pub fn loc(&self) -> &SubStr {
        match self {
            Self::Parse(err) => &err.loc,
            Self::Eval(err) => &err.loc,
        }
    }
}

impl fmt::Display for ExprErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Eval(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotErr {
    InvalidExpr(ExprErr),
    InvalidDomain { start: Number, end: Number },
    NoPoints,
}

impl fmt::Display for PlotErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExpr(err) => write!(f, "invalid expression: {err}"),
            Self::InvalidDomain { start, end } => write!(
                f,
                "invalid domain: x min ({start}) must be less than x max ({end}) and both finite"
            ),
            Self::NoPoints => write!(f, "no valid points to plot"),
        }
    }
}

impl From<ParseErr> for PlotErr {
    fn from(err: ParseErr) -> Self {
        Self::InvalidExpr(ExprErr::Parse(err))
    }
}

impl From<EvalErr> for PlotErr {
    fn from(err: EvalErr) -> Self {
        Self::InvalidExpr(ExprErr::Eval(err))
    }
}

impl From<SweepErr<EvalErr>> for PlotErr {
    fn from(err: SweepErr<EvalErr>) -> Self {
        match err {
            SweepErr::InvalidDomain(Range { start, end }) => Self::InvalidDomain { start, end },
            SweepErr::Eval(err) => err.into(),
            SweepErr::NoPoints => Self::NoPoints,
        }
    }
}

/// Lexes and parses `src` against the given identifiers.
pub fn compile(src: &Arc<String>, idents: &Idents) -> Result<Expr, PlotErr> {
    Ok(parse::parse(Lexer::new(src), idents)?)
}

/// Evaluates `src` once with `x` bound to the given value.
///
/// Non-finite results are values, not errors.
pub fn evaluate(src: &str, x: Number) -> Result<Number, PlotErr> {
    let src = Arc::new(src.to_string());
    let mut idents = stdlib::standard_idents();
    let expr = compile(&src, &idents)?;
    eval::set_var(&mut idents, X, Some(x));
    Ok(eval::eval(&expr, &idents)?)
}

/// Parses the expression once and samples it across the configured domain.
pub fn compute_plot(config: &PlotConfig) -> Result<Plot, PlotErr> {
    let mut idents = stdlib::standard_idents();
    let expr = compile(&config.expr, &idents)?;

    let points = sweep(
        |x| {
            eval::set_var(&mut idents, X, Some(x));
            eval::eval(&expr, &idents)
        },
        &config.domain,
    )?;

    Ok(Plot {
        points,
        y_domain: config.y.domain(),
    })
}

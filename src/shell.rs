// SPDX: CC0-1.0

use crate::{
    eval::{Expr, Ident, IdentKey, Idents},
    lex::{LexErrTyp, SubStr, TokTyp},
    parse::ParseErrTyp,
    plot::{ExprErr, PlotErr},
    stdlib, Number, Point,
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    PrintTree,
    Plot,
    SetWin,
    SetYScale,
    ZoomIn,
    ZoomOut,
    Reset,
    Points,
    Syntax,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::Plot,
            Self::SetWin,
            Self::SetYScale,
            Self::ZoomIn,
            Self::ZoomOut,
            Self::Reset,
            Self::Points,
            Self::Syntax,
            Self::PrintTree,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set expression to plot",
            Self::PrintTree => "print tree parsed from the expression (for debugging)",
            Self::Plot => "recompute and open the plot in gnuplot",
            Self::SetWin => "set x range",
            Self::SetYScale => "set y range or switch to automatic y range",
            Self::ZoomIn => "shrink x range around its center",
            Self::ZoomOut => "grow x range around its center",
            Self::Reset => "restore default x range and automatic y range",
            Self::Points => "print sampled points",
            Self::Syntax => "list supported operators, functions and constants",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::PrintTree => "tree",
            Self::Plot => "plot",
            Self::SetWin => "window",
            Self::SetYScale => "yscale",
            Self::ZoomIn => "zoomin",
            Self::ZoomOut => "zoomout",
            Self::Reset => "reset",
            Self::Points => "points",
            Self::Syntax => "syntax",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

/// Prompts for one line, trimmed. `None` means the input has ended.
pub fn input<R: BufRead, W: Write>(
    inp: R,
    out: W,
    prompt: impl fmt::Display,
) -> anyhow::Result<Option<String>> {
    fn inner<R: BufRead, W: Write>(
        mut inp: R,
        mut out: W,
        prompt: impl fmt::Display,
    ) -> io::Result<Option<String>> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut s = String::new();
        if inp.read_line(&mut s)? == 0 {
            return Ok(None);
        }
        Ok(Some(s.trim().to_string()))
    }

    let s = inner(inp, out, prompt).context("read from standard input failed")?;
    Ok(s)
}

/// Like [`input`], but an ended input reads as a blank line.
pub fn input_or_blank<R: BufRead, W: Write>(
    inp: R,
    out: W,
    prompt: impl fmt::Display,
) -> anyhow::Result<String> {
    Ok(input(inp, out, prompt)?.unwrap_or_default())
}

pub fn read_fromstr<R: BufRead, W: Write, T: core::str::FromStr>(
    inp: R,
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input_or_blank(inp, &mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

pub fn dump_tree<W: Write>(mut out: W, expr: &Expr, title: fmt::Arguments) -> io::Result<()> {
    fn node<W: Write>(out: &mut W, expr: &Expr, depth: usize) -> io::Result<()> {
        writeln!(out, "{}{}", "  ".repeat(depth), expr.head())?;
        for arg in expr.args() {
            node(out, arg, depth + 1)?;
        }
        Ok(())
    }

    writeln!(out, "{title}: ")?;
    node(&mut out, expr, 1)
}

pub fn dump_points<W: Write>(mut out: W, points: &[Point<Number>]) -> io::Result<()> {
    if points.is_empty() {
        writeln!(out, "  (empty)")?;
    }
    for Point { x, y } in points {
        writeln!(out, "  x: {x:>10.4}  f(x): {y:>12.4}")?;
    }
    Ok(())
}

pub fn syntax<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "operators: + - * / ^ (power), parentheses for grouping")?;
    writeln!(out, "functions: {}", stdlib::FUNCTIONS.join(", "))?;
    writeln!(out, "constants: {}", stdlib::CONSTANTS.join(", "))?;
    writeln!(out, "variable:  {}", stdlib::X)?;
    writeln!(out, "examples:  x^2, sin(x), x^3 - 2*x + 1, sqrt(x), e^x")?;
    Ok(())
}

/// Known identifier with the most similar name, if any is close enough.
pub fn most_similar<'a>(text: &str, idents: &'a Idents) -> Option<(&'a IdentKey, &'a Ident)> {
    let text = text.to_ascii_lowercase();
    idents
        .iter()
        .map(|(k, v)| {
            (
                strsim::normalized_damerau_levenshtein(&text, &k.get().to_ascii_lowercase()),
                (k, v),
            )
        })
        .filter(|(sim, _)| *sim > 0.3)
        .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
        .map(|(_, kv)| kv)
}

/// Explains a failed recompute: the message, the offending span of the
/// expression when there is one, and hints.
pub fn report<W: Write>(mut out: W, err: &PlotErr, idents: &Idents) -> io::Result<()> {
    let expr_err = match err {
        PlotErr::InvalidExpr(expr_err) => expr_err,
        PlotErr::InvalidDomain { .. } => {
            writeln!(out, "error: {err}")?;
            return writeln!(out, "note: use 'window' or 'reset' to fix the x range");
        }
        PlotErr::NoPoints => {
            writeln!(out, "error: {err}")?;
            return writeln!(
                out,
                "note: the expression is undefined or infinite everywhere in the x range"
            );
        }
    };

    underline(&mut out, expr_err.loc())?;
    writeln!(out, "error: {err}")?;

    let ExprErr::Parse(parse_err) = expr_err else {
        return Ok(());
    };
    match &parse_err.typ {
        ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => writeln!(
            out,
            "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
        )?,
        ParseErrTyp::LexErr(LexErrTyp::Unsupported(typ)) => match typ {
            TokTyp::XGreater | TokTyp::XLess => {
                writeln!(out, "note: expected an expression but found an inequality")?
            }
            TokTyp::XEqual => {
                writeln!(out, "note: expected an expression but found an equation")?
            }
            TokTyp::XPipe => writeln!(
                out,
                "note: use the 'abs' function to compute absolute value"
            )?,
            _ => writeln!(out, "note: use parentheses for grouping")?,
        },
        ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,
        ParseErrTyp::Adjacent => writeln!(
            out,
            "note: implicit multiplication is not supported, so for example '5x' would be '5*x'"
        )?,
        ParseErrTyp::UnknownIdent { .. } => {
            if let Some((key, ident)) = most_similar(parse_err.loc.get(), idents) {
                writeln!(out, "note: {} '{key}' has a similar name", ident.kind())?;
            }
        }
        ParseErrTyp::TooDeep => writeln!(
            out,
            "note: shorten the expression or simplify its nesting"
        )?,
        ParseErrTyp::ParenMismatch
        | ParseErrTyp::Empty
        | ParseErrTyp::MissingCall
        | ParseErrTyp::ArgCount { .. }
        | ParseErrTyp::MisplacedComma
        | ParseErrTyp::MissingOperand => {}
    }
    Ok(())
}

pub fn expr_invalid<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "error: the expression is invalid, see 'set'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{plot, stdlib::standard_idents, Domain};

    fn report_in(expr: &str, x: core::ops::Range<Number>) -> String {
        let config = plot::PlotConfig {
            expr: Arc::new(expr.to_string()),
            domain: Domain::new(x),
            y: plot::YScale::AUTO,
        };
        let err = plot::compute_plot(&config).expect_err("should fail");
        let mut buf = Vec::new();
        report(&mut buf, &err, &standard_idents()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn report_for(expr: &str) -> String {
        report_in(expr, -5.0..5.0)
    }

    #[test]
    fn commands_parse_by_name() {
        for c in Command::exhaustive() {
            assert_eq!(c.name().parse::<Command>(), Ok(*c));
        }
        assert_eq!("nope".parse::<Command>(), Err(()));
    }

    #[test]
    fn input_reports_end_of_input() {
        let mut inp: &[u8] = b"  zoomin \nlast";
        let mut out = Vec::new();
        assert_eq!(
            input(&mut inp, &mut out, "> ").unwrap().as_deref(),
            Some("zoomin")
        );
        assert_eq!(input(&mut inp, &mut out, "> ").unwrap().as_deref(), Some("last"));
        assert_eq!(input(&mut inp, &mut out, "> ").unwrap(), None);
        assert_eq!(input_or_blank(&mut inp, &mut out, "> ").unwrap(), "");
        assert_eq!(String::from_utf8(out).unwrap(), "> > > > ");

        let mut out = Vec::new();
        let parsed = read_fromstr::<_, _, bool>(&b"maybe\n"[..], &mut out, "? ", true).unwrap();
        assert!(parsed.is_err());
        assert!(String::from_utf8(out).unwrap().contains("parse error"));
        let parsed = read_fromstr::<_, _, bool>(&b""[..], Vec::new(), "? ", true).unwrap();
        assert_eq!(parsed, Ok(None));
    }

    #[test]
    fn underline_marks_span() {
        let src = Arc::new(String::from("1 + foo"));
        let mut buf = Vec::new();
        underline(&mut buf, &SubStr::new(Arc::clone(&src), 4, 3)).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1 + foo\n    ^^^\n");

        let mut buf = Vec::new();
        underline(&mut buf, &SubStr::eof(src)).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1 + foo\n       ^\n");
    }

    #[test]
    fn suggests_similar_names() {
        let idents = standard_idents();
        let (key, ident) = most_similar("sqr", &idents).expect("close to sqrt");
        assert_eq!(key.get(), "sqrt");
        assert_eq!(ident.kind(), "function");
        assert!(most_similar("zzzzzzzz", &idents).is_none());

        let text = report_for("sine(x)");
        assert!(text.contains("unknown function 'sine'"));
        assert!(text.contains("note: function 'sin' has a similar name"));
    }

    #[test]
    fn hints_for_common_mistakes() {
        assert!(report_for("2x").contains("implicit multiplication"));
        assert!(report_for("|x|").contains("'abs'"));
        assert!(report_for("y = x").contains("unknown identifier 'y'"));
        assert!(report_in("sqrt(x)", 1.0..-1.0).contains("x min (1)"));
        assert!(report_for("ln(-abs(x) - 1)").contains("no valid points"));
        assert!(report_for(&["x"; 1000].join("+")).contains("levels deep"));
    }

    #[test]
    fn tree_and_points_output() {
        let src = Arc::new(String::from("-x^2"));
        let expr = plot::compile(&src, &standard_idents()).unwrap();
        let mut buf = Vec::new();
        dump_tree(&mut buf, &expr, format_args!("tree")).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "tree: \n  neg\n    pow\n      x\n      2\n"
        );

        let mut buf = Vec::new();
        dump_points(&mut buf, &[Point { x: 0.5, y: -1.25 }]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "  x:     0.5000  f(x):      -1.2500\n"
        );
    }
}

// SPDX: CC0-1.0

// shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm),
// building the tree on the output stack instead of emitting postfix

use crate::{
    eval::{Associativity, Expr, ExprTyp, Ident, Idents, OperatorTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, Tok, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    Empty,
    UnknownIdent { call: bool },
    MissingCall,
    ArgCount { arity: usize, found: usize },
    MisplacedComma,
    MissingOperand,
    /// Two values next to each other, usually implicit multiplication.
    Adjacent,
    /// The tree would be deeper than [`MAX_DEPTH`].
    TooDeep,
}

/// Deepest tree the parser builds. Evaluating, printing and dropping a tree
/// recurse once per level.
pub const MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.loc.get();
        match &self.typ {
            ParseErrTyp::LexErr(err) => write!(f, "{err}"),
            ParseErrTyp::ParseNum(err) => write!(f, "invalid number '{text}': {err}"),
            ParseErrTyp::ParenMismatch => write!(f, "mismatched parentheses"),
            ParseErrTyp::Empty => write!(f, "expression is empty"),
            ParseErrTyp::UnknownIdent { call: true } => write!(f, "unknown function '{text}'"),
            ParseErrTyp::UnknownIdent { call: false } => write!(f, "unknown identifier '{text}'"),
            ParseErrTyp::MissingCall => {
                write!(f, "function '{text}' must be called, like '{text}(x)'")
            }
            ParseErrTyp::ArgCount { arity, found } => write!(
                f,
                "function '{text}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),
            ParseErrTyp::MisplacedComma => write!(f, "comma outside of a function's arguments"),
            ParseErrTyp::MissingOperand if self.loc.is_empty() => {
                write!(f, "expected a value at end of expression")
            }
            ParseErrTyp::MissingOperand => write!(f, "expected a value before '{text}'"),
            ParseErrTyp::Adjacent => write!(f, "expected an operator before '{text}'"),
            ParseErrTyp::TooDeep => write!(
                f,
                "expression nests more than {MAX_DEPTH} levels deep at '{text}'"
            ),
        }
    }
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    Fun { arity: usize },
    OpenParen { call: bool, base: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

fn err<T>(typ: ParseErrTyp, loc: SubStr) -> Result<T, ParseErr> {
    Err(ParseErr { typ, loc })
}

// output entries carry the depth of their tree
type Out = Vec<(Expr, usize)>;

fn push_node(
    out: &mut Out,
    args: Out,
    loc: SubStr,
    make: impl FnOnce(Vec<Expr>) -> ExprTyp,
) -> Result<(), ParseErr> {
    let depth = 1 + args.iter().map(|(_, depth)| *depth).max().unwrap_or(0);
    if depth > MAX_DEPTH {
        return err(ParseErrTyp::TooDeep, loc);
    }
    let args = args.into_iter().map(|(arg, _)| arg).collect();
    out.push((
        Expr {
            typ: make(args),
            loc,
        },
        depth,
    ));
    Ok(())
}

// pop the operator's operands off the output and push the combined node
fn apply(out: &mut Out, typ: OperatorTyp, loc: SubStr) -> Result<(), ParseErr> {
    let arity = typ.fun().1.arity;
    if out.len() < arity {
        return err(ParseErrTyp::MissingOperand, loc);
    }
    let args = out.split_off(out.len() - arity);
    push_node(out, args, loc, |args| ExprTyp::Operator { typ, args })
}

// move operators to the output until an open paren (left on the stack)
fn unwind(out: &mut Out, ops: &mut Vec<ShuntOp>) -> Result<Option<ShuntOp>, ParseErr> {
    while let Some(op) = ops.last() {
        let typ = match op.typ {
            ShuntOpTyp::OpenParen { .. } => return Ok(Some(op.clone())),
            ShuntOpTyp::Operator(typ) => typ,
            ShuntOpTyp::Fun { .. } => unreachable!("function is always below its open paren"),
        };
        let loc = op.loc.clone();
        ops.pop();
        apply(out, typ, loc)?;
    }
    Ok(None)
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Expr, ParseErr> {
    let src: Arc<String> = Arc::clone(lex.src());
    let mut lex = lex.peekable();
    let mut out: Out = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack
    let mut expect_operand = true;
    let mut seen_any = false;

    while let Some(tok) = lex.next() {
        let tok = tok?;
        seen_any = true;

        let starts_operand = matches!(
            tok.typ,
            TokTyp::Number | TokTyp::Ident | TokTyp::OpenParen
        );
        if starts_operand && !expect_operand {
            return err(ParseErrTyp::Adjacent, tok.loc);
        }

        match tok.typ {
            TokTyp::Number => {
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(e) => return err(ParseErrTyp::ParseNum(e), tok.loc),
                };
                out.push((
                    Expr {
                        typ: ExprTyp::Val(num),
                        loc: tok.loc,
                    },
                    1,
                ));
                expect_operand = false;
            }

            TokTyp::Ident => {
                let called = matches!(
                    lex.peek(),
                    Some(Ok(Tok {
                        typ: TokTyp::OpenParen,
                        ..
                    }))
                );
                match idents.get(&tok.loc.clone().into()) {
                    Some(Ident::Fun(fun)) => {
                        if !called {
                            return err(ParseErrTyp::MissingCall, tok.loc);
                        }
                        let paren = match lex.next() {
                            Some(Ok(paren)) => paren,
                            _ => unreachable!("peeked an open paren"),
                        };
                        ops.push(ShuntOp {
                            typ: ShuntOpTyp::Fun { arity: fun.arity },
                            loc: tok.loc,
                        });
                        ops.push(ShuntOp {
                            typ: ShuntOpTyp::OpenParen {
                                call: true,
                                base: out.len(),
                            },
                            loc: paren.loc,
                        });
                        expect_operand = true;
                    }
                    Some(Ident::Var(_) | Ident::Const(_)) => {
                        out.push((
                            Expr {
                                typ: ExprTyp::Ident,
                                loc: tok.loc,
                            },
                            1,
                        ));
                        expect_operand = false;
                    }
                    None => return err(ParseErrTyp::UnknownIdent { call: called }, tok.loc),
                }
            }

            TokTyp::Op(o1) if o1.is_prefix() => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
                expect_operand = true;
            }

            TokTyp::Op(o1) => {
                if expect_operand {
                    return err(ParseErrTyp::MissingOperand, tok.loc);
                }
                while let Some(o2) = ops.last() {
                    let ShuntOpTyp::Operator(typ2) = o2.typ else {
                        break;
                    };
                    if (typ2.precedence() > o1.precedence())
                        || ((typ2.precedence() == o1.precedence())
                            && (o1.associativity() == Associativity::Left))
                    {
                        let loc = o2.loc.clone();
                        ops.pop();
                        apply(&mut out, typ2, loc)?;
                    } else {
                        break;
                    }
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
                expect_operand = true;
            }

            TokTyp::Comma => {
                if expect_operand {
                    return err(ParseErrTyp::MisplacedComma, tok.loc);
                }
                match unwind(&mut out, &mut ops)? {
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen { call: true, .. },
                        ..
                    }) => {}
                    _ => return err(ParseErrTyp::MisplacedComma, tok.loc),
                }
                expect_operand = true;
            }

            TokTyp::OpenParen => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen {
                        call: false,
                        base: out.len(),
                    },
                    loc: tok.loc,
                });
                expect_operand = true;
            }

            TokTyp::CloseParen => {
                let empty_call = matches!(
                    ops.last(),
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen { call: true, base },
                        ..
                    }) if *base == out.len()
                );
                if expect_operand && !empty_call {
                    return err(ParseErrTyp::MissingOperand, tok.loc);
                }

                let Some(open) = unwind(&mut out, &mut ops)? else {
                    return err(ParseErrTyp::ParenMismatch, tok.loc);
                };
                ops.pop();

                if let ShuntOpTyp::OpenParen { call: true, base } = open.typ {
                    let (arity, name) = match ops.pop() {
                        Some(ShuntOp {
                            typ: ShuntOpTyp::Fun { arity },
                            loc,
                        }) => (arity, loc),
                        _ => unreachable!("call paren without function"),
                    };
                    let args = out.split_off(base);
                    if args.len() != arity {
                        return err(
                            ParseErrTyp::ArgCount {
                                arity,
                                found: args.len(),
                            },
                            name,
                        );
                    }
                    push_node(&mut out, args, name, |args| ExprTyp::Call { args })?;
                }
                expect_operand = false;
            }

            TokTyp::XGreater
            | TokTyp::XLess
            | TokTyp::XEqual
            | TokTyp::XPipe
            | TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly => unreachable!("unsupported token survived until parsing"),
        }
    }

    if !seen_any {
        return err(ParseErrTyp::Empty, SubStr::eof(src));
    }
    if expect_operand {
        return err(ParseErrTyp::MissingOperand, SubStr::eof(src));
    }

    if let Some(open) = unwind(&mut out, &mut ops)? {
        return err(ParseErrTyp::ParenMismatch, open.loc);
    }

    match (out.pop(), out.is_empty()) {
        (Some((expr, _)), true) => Ok(expr),
        (Some(_), false) => err(ParseErrTyp::Adjacent, out[out.len() - 1].0.loc.clone()),
        (None, _) => err(ParseErrTyp::Empty, SubStr::eof(src)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib;

    fn tree(src: &str) -> Result<String, (ParseErrTyp, String)> {
        let src = Arc::new(src.to_string());
        let idents = stdlib::standard_idents();
        parse(Lexer::new(&src), &idents)
            .map(|expr| expr.to_string())
            .map_err(|e| (e.typ, e.loc.get().to_string()))
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(tree("1 + 2 * 3").unwrap(), "(add 1 (mul 2 3))");
        assert_eq!(tree("1 - 2 - 3").unwrap(), "(sub (sub 1 2) 3)");
        assert_eq!(tree("8 / 4 / 2").unwrap(), "(div (div 8 4) 2)");
        assert_eq!(tree("2^3^2").unwrap(), "(pow 2 (pow 3 2))");
        assert_eq!(tree("(1 + 2) * 3").unwrap(), "(mul (add 1 2) 3)");
    }

    #[test]
    fn negation() {
        assert_eq!(tree("-x^2").unwrap(), "(neg (pow x 2))");
        assert_eq!(tree("-x*2").unwrap(), "(mul (neg x) 2)");
        assert_eq!(tree("2^-x").unwrap(), "(pow 2 (neg x))");
        assert_eq!(tree("--x").unwrap(), "(neg (neg x))");
        assert_eq!(tree("x-1").unwrap(), "(sub x 1)");
    }

    #[test]
    fn function_calls() {
        assert_eq!(tree("sin(x)").unwrap(), "(sin x)");
        assert_eq!(tree("exp(-x^2)").unwrap(), "(exp (neg (pow x 2)))");
        assert_eq!(
            tree("sqrt(abs(x)) + log(x)").unwrap(),
            "(add (sqrt (abs x)) (log x))"
        );
        assert_eq!(tree("e^x").unwrap(), "(pow e x)");
        assert_eq!(tree("2*pi").unwrap(), "(mul 2 pi)");
    }

    #[test]
    fn errors_point_at_the_culprit() {
        assert_eq!(
            tree("foo(x)"),
            Err((ParseErrTyp::UnknownIdent { call: true }, "foo".into()))
        );
        assert_eq!(
            tree("y + 1"),
            Err((ParseErrTyp::UnknownIdent { call: false }, "y".into()))
        );
        assert_eq!(tree("sin x"), Err((ParseErrTyp::MissingCall, "sin".into())));
        assert_eq!(tree("2x"), Err((ParseErrTyp::Adjacent, "x".into())));
        assert_eq!(tree("(x)(x)"), Err((ParseErrTyp::Adjacent, "(".into())));
        assert_eq!(tree("x * / 2"), Err((ParseErrTyp::MissingOperand, "/".into())));
        assert_eq!(tree("x +"), Err((ParseErrTyp::MissingOperand, "".into())));
        assert_eq!(tree("()"), Err((ParseErrTyp::MissingOperand, ")".into())));
        assert_eq!(tree("1, 2"), Err((ParseErrTyp::MisplacedComma, ",".into())));
        assert_eq!(tree("   "), Err((ParseErrTyp::Empty, "".into())));
    }

    #[test]
    fn parentheses_must_balance() {
        assert_eq!(tree("(x + 1"), Err((ParseErrTyp::ParenMismatch, "(".into())));
        assert_eq!(tree("x + 1)"), Err((ParseErrTyp::ParenMismatch, ")".into())));
        assert_eq!(
            tree("sin(x"),
            Err((ParseErrTyp::ParenMismatch, "(".into()))
        );
    }

    #[test]
    fn argument_counts_are_checked() {
        assert_eq!(
            tree("sin()"),
            Err((ParseErrTyp::ArgCount { arity: 1, found: 0 }, "sin".into()))
        );
        assert_eq!(
            tree("cos(x, 1)"),
            Err((ParseErrTyp::ArgCount { arity: 1, found: 2 }, "cos".into()))
        );
    }

    #[test]
    fn bad_number_and_lex_errors() {
        assert!(matches!(
            tree("1.2.3"),
            Err((ParseErrTyp::ParseNum(_), text)) if text == "1.2.3"
        ));
        assert_eq!(
            tree("|x|"),
            Err((
                ParseErrTyp::LexErr(LexErrTyp::Unsupported(TokTyp::XPipe)),
                "|".into()
            ))
        );
    }

    #[test]
    fn nesting_is_limited() {
        // a flat sum is left-deep, one level per operator
        let sum = |n| vec!["x"; n].join("+");
        assert!(tree(&sum(MAX_DEPTH)).is_ok());
        assert_eq!(tree(&sum(MAX_DEPTH + 1)), Err((ParseErrTyp::TooDeep, "+".into())));
        assert_eq!(tree(&sum(5000)), Err((ParseErrTyp::TooDeep, "+".into())));

        let negs = format!("{}x", "-".repeat(MAX_DEPTH));
        assert_eq!(tree(&negs), Err((ParseErrTyp::TooDeep, "-".into())));

        let calls = format!("{}x{}", "abs(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(tree(&calls), Err((ParseErrTyp::TooDeep, "abs".into())));

        // parentheses alone add no levels
        let parens = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
        assert_eq!(tree(&parens).unwrap(), "x");
    }
}

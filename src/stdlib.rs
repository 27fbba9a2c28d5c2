// SPDX: CC0-1.0

use crate::{eval::*, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

/// The one free variable of a plotted expression.
pub const X: &str = "x";

/// Functions callable from an expression, for help output.
pub const FUNCTIONS: &[&str] = &["sin", "cos", "tan", "log", "ln", "sqrt", "abs", "exp"];

/// Named constants usable in an expression, for help output.
pub const CONSTANTS: &[&str] = &["pi", "e"];

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    ret.insert(X.into(), Ident::Var(None));

    ret.insert("abs".into(), Ident::Fun(Fun::new(1, abs)));
    ret.insert("sqrt".into(), Ident::Fun(Fun::new(1, sqrt)));
    ret.insert("exp".into(), Ident::Fun(Fun::new(1, exp)));
    ret.insert("ln".into(), Ident::Fun(Fun::new(1, ln)));
    ret.insert("log".into(), Ident::Fun(Fun::new(1, log10)));

    // trig
    ret.insert("sin".into(), Ident::Fun(Fun::new(1, sin)));
    ret.insert("cos".into(), Ident::Fun(Fun::new(1, cos)));
    ret.insert("tan".into(), Ident::Fun(Fun::new(1, tan)));

    ret.insert("pi".into(), Ident::Const(consts::PI));
    ret.insert("e".into(), Ident::Const(consts::E));
    ret
}

#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    assert_eq!(args.len(), N);
    let mut ret = [0.0; N];
    ret.copy_from_slice(args);
    ret
}

pub fn neg(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    -x
}

pub fn add(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x + y
}

pub fn sub(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x - y
}

pub fn mul(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x * y
}

pub fn div(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x / y
}

pub fn pow(args: Vec<Number>) -> Number {
    let [x, exp] = expect_n::<2>(&args);
    x.powf(exp)
}

pub fn abs(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.abs()
}

pub fn sqrt(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.sqrt()
}

pub fn exp(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.exp()
}

pub fn ln(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.ln()
}

pub fn log10(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.log10()
}

pub fn sin(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.sin()
}

pub fn cos(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.cos()
}

pub fn tan(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    x.tan()
}

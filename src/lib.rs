// SPDX: CC0-1.0

pub mod eval;
pub mod gnuplot;
pub mod lex;
pub mod parse;
pub mod plot;
pub mod shell;
pub mod stdlib;
pub mod view;

use core::{fmt, ops::Range};

pub type Number = f64;

/// Number of steps across the domain; a sweep takes one more sample than this.
pub const SAMPLE_STEPS: u16 = 500;

/// Decimal places kept in sampled coordinates.
pub const ROUND_DIGITS: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Domain {
    pub x: Range<Number>,
}

impl Domain {
    pub const fn new(x: Range<Number>) -> Self {
        Self { x }
    }

    /// Distance between samples, or `None` if the domain can't be swept.
    pub fn step(&self) -> Option<Number> {
        let Range { start, end } = self.x;
        if !(start.is_finite() && end.is_finite()) || start >= end {
            return None;
        }
        let step = (end - start) / Number::from(SAMPLE_STEPS);
        (step.is_finite() && step > 0.0).then_some(step)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x.start, self.x.end)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SweepErr<E> {
    InvalidDomain(Range<Number>),
    Eval(E),
    NoPoints,
}

/// Rounds to [`ROUND_DIGITS`] decimal places. Values too large to scale are
/// returned unchanged.
pub fn round(val: Number) -> Number {
    let scale = Number::powi(10.0, ROUND_DIGITS);
    let scaled = (val * scale).round();
    if scaled.is_finite() {
        scaled / scale
    } else {
        val
    }
}

/// Samples `f` at evenly spaced points across `domain`, both ends included.
///
/// The first error from `f` aborts the sweep. Non-finite values are skipped,
/// and a sweep without a single finite value is an error. Returned points are
/// rounded and ordered by `x`.
pub fn sweep<F, E>(mut f: F, domain: &Domain) -> Result<Vec<Point<Number>>, SweepErr<E>>
where
    F: FnMut(Number) -> Result<Number, E>,
{
    let step = domain
        .step()
        .ok_or_else(|| SweepErr::InvalidDomain(domain.x.clone()))?;

    let mut points = Vec::with_capacity(usize::from(SAMPLE_STEPS) + 1);
    for i in 0..=SAMPLE_STEPS {
        let x = if i == SAMPLE_STEPS {
            domain.x.end
        } else {
            domain.x.start + step * Number::from(i)
        };
        let y = f(x).map_err(SweepErr::Eval)?;
        if y.is_finite() {
            points.push(Point {
                x: round(x),
                y: round(y),
            });
        }
    }

    if points.is_empty() {
        Err(SweepErr::NoPoints)
    } else {
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(x: Number) -> Result<Number, ()> {
        Ok(x)
    }

    #[test]
    fn sweep_covers_both_ends() {
        let points = sweep(ok, &Domain::new(-5.0..5.0)).unwrap();
        assert_eq!(points.len(), 501);
        assert_eq!(points[0].x, -5.0);
        assert_eq!(points[250].x, 0.0);
        assert_eq!(points[500].x, 5.0);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn sweep_rejects_bad_domains() {
        for x in [5.0..-5.0, 1.0..1.0, Number::NAN..1.0, 0.0..Number::INFINITY] {
            assert!(matches!(
                sweep(ok, &Domain::new(x)),
                Err(SweepErr::InvalidDomain(_))
            ));
        }
    }

    #[test]
    fn sweep_stops_at_first_error() {
        let mut calls = 0;
        let res = sweep(
            |x| {
                calls += 1;
                if x > 0.0 {
                    Err("positive")
                } else {
                    Ok(x)
                }
            },
            &Domain::new(-1.0..1.0),
        );
        assert_eq!(res, Err(SweepErr::Eval("positive")));
        assert_eq!(calls, 252);
    }

    #[test]
    fn sweep_skips_non_finite() {
        let points = sweep(|x| ok(1.0 / x), &Domain::new(-250.0..250.0)).unwrap();
        assert_eq!(points.len(), 500);
        assert!(points.iter().all(|p| p.x != 0.0 && p.y.is_finite()));

        let res = sweep(|_| ok(Number::NAN), &Domain::new(0.0..1.0));
        assert_eq!(res, Err(SweepErr::NoPoints));
    }

    #[test]
    fn round_keeps_four_places() {
        assert_eq!(round(1.234_56), 1.2346);
        assert_eq!(round(-0.000_04), -0.0);
        assert_eq!(round(Number::MAX), Number::MAX);
    }
}

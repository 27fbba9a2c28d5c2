// SPDX: CC0-1.0

//! Chart output as a gnuplot script plus a data file.

use crate::{plot::YBound, stdlib::X, Number, Point};
use core::ops::Range;
use std::io::{self, Write};

pub const LINE_COLOR: &str = "#2563eb";

#[derive(Clone, Debug)]
pub struct Chart<'a> {
    pub expr: &'a str,
    pub points: &'a [Point<Number>],
    pub y_domain: [YBound; 2],
    pub data_path: &'a str,
    pub svg_path: &'a str,
    pub resolution: [u32; 2],
}

/// Smallest and largest x in the data, or `None` if it spans nothing.
pub fn x_extent(points: &[Point<Number>]) -> Option<Range<Number>> {
    let first = points.first()?.x;
    let extent = points.iter().fold(first..first, |acc, p| {
        acc.start.min(p.x)..acc.end.max(p.x)
    });
    (extent.start < extent.end).then_some(extent)
}

fn bound(b: YBound) -> String {
    match b {
        YBound::Auto => String::from("*"),
        YBound::Fixed(val) => format!("{val}"),
    }
}

pub fn write_data<W: Write>(mut out: W, points: &[Point<Number>]) -> io::Result<()> {
    for Point { x, y } in points {
        writeln!(out, "{x} {y}")?;
    }
    Ok(())
}

pub fn write_script<W: Write>(mut out: W, chart: &Chart<'_>) -> io::Result<()> {
    writeln!(out, "reset")?;
    writeln!(out, "set term push")?;
    // set output info
    let [width, height] = chart.resolution;
    writeln!(out, "set terminal svg size {width},{height} enhanced")?;
    writeln!(out, "set output '{}'", chart.svg_path)?;

    // x follows the data, y follows the requested domain
    match x_extent(chart.points) {
        Some(Range { start, end }) => writeln!(out, "set xrange[{start}:{end}]")?,
        None => writeln!(out, "set autoscale x")?,
    }
    let [y_min, y_max] = chart.y_domain;
    writeln!(out, "set yrange[{}:{}]", bound(y_min), bound(y_max))?;

    // configure appearence
    writeln!(out, r#"set title "f({X}) = {}" noenhanced"#, chart.expr)?;
    writeln!(out, r#"set xlabel "{X}""#)?;
    writeln!(out, r#"set ylabel "f({X})""#)?;
    writeln!(out, "set tics out nomirror")?;
    writeln!(out, "set grid lt 1 lc '#e0e0e0' dt 2")?;
    // reference lines through the origin
    writeln!(out, "set xzeroaxis lt 1 lc '#999999' dt 2")?;
    writeln!(out, "set yzeroaxis lt 1 lc '#999999' dt 2")?;
    writeln!(out, "set key out vertical top right")?;

    writeln!(out, r#"plot '{}' \"#, chart.data_path)?;
    writeln!(out, r#"  using 1:2 with lines lw 2 lc '{LINE_COLOR}' \"#)?;
    writeln!(out, r#"  title "f({X})""#)?;

    // display window
    writeln!(out, "set term pop")?;
    writeln!(out, "replot")?;
    Ok(())
}

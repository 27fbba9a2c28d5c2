// SPDX: CC0-1.0

//! Interactive plot controls and the outcome of the last recompute.

use crate::{
    plot::{self, PlotConfig, PlotErr, YBound, YScale},
    Domain, Number, Point,
};
use core::ops::Range;
use std::sync::Arc;

pub const DEFAULT_EXPR: &str = "x^2";
pub const DEFAULT_X: Range<Number> = -5.0..5.0;

/// Width factor applied by [`View::zoom_in`].
pub const ZOOM_IN: Number = 0.7;
/// Width factor applied by [`View::zoom_out`].
pub const ZOOM_OUT: Number = 1.5;

/// Parses a numeric input, falling back to `default` for anything that isn't
/// a finite number.
pub fn parse_or(text: &str, default: Number) -> Number {
    parse_bound(text).unwrap_or(default)
}

/// Parses an optional bound; blank or non-numeric input means unset.
pub fn parse_bound(text: &str) -> Option<Number> {
    text.trim()
        .parse::<Number>()
        .ok()
        .filter(|val| val.is_finite())
}

/// Result of the last recompute. Points are cleared whenever it failed; the
/// y-axis domain always follows the current y settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotState {
    pub points: Vec<Point<Number>>,
    pub y_domain: [YBound; 2],
    pub error: Option<PlotErr>,
}

impl PlotState {
    /// Error text for display, empty when the last recompute succeeded.
    pub fn message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct View {
    expr: Arc<String>,
    x: Range<Number>,
    y: YScale,
    state: PlotState,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        let mut view = Self {
            expr: Arc::new(String::from(DEFAULT_EXPR)),
            x: DEFAULT_X,
            y: YScale::AUTO,
            state: PlotState::default(),
        };
        view.recompute();
        view
    }

    pub fn expr(&self) -> &Arc<String> {
        &self.expr
    }

    pub fn x(&self) -> &Range<Number> {
        &self.x
    }

    pub fn y(&self) -> &YScale {
        &self.y
    }

    pub fn state(&self) -> &PlotState {
        &self.state
    }

    pub fn config(&self) -> PlotConfig {
        PlotConfig {
            expr: Arc::clone(&self.expr),
            domain: Domain::new(self.x.clone()),
            y: self.y.clone(),
        }
    }

    pub fn y_domain(&self) -> [YBound; 2] {
        self.state.y_domain
    }

    pub fn recompute(&mut self) -> &PlotState {
        self.state = match plot::compute_plot(&self.config()) {
            Ok(plot) => PlotState {
                points: plot.points,
                y_domain: plot.y_domain,
                error: None,
            },
            Err(err) => PlotState {
                points: Vec::new(),
                y_domain: self.y.domain(),
                error: Some(err),
            },
        };
        &self.state
    }

    pub fn set_expr(&mut self, text: impl Into<String>) -> &PlotState {
        self.expr = Arc::new(text.into());
        self.recompute()
    }

    pub fn set_x_min(&mut self, text: &str) -> &PlotState {
        self.x.start = parse_or(text, DEFAULT_X.start);
        self.recompute()
    }

    pub fn set_x_max(&mut self, text: &str) -> &PlotState {
        self.x.end = parse_or(text, DEFAULT_X.end);
        self.recompute()
    }

    // y settings only affect rendering, so they refresh the y domain
    // without recomputing the points

    pub fn set_y_min(&mut self, text: &str) -> &PlotState {
        self.y.min = parse_bound(text);
        self.refresh_y()
    }

    pub fn set_y_max(&mut self, text: &str) -> &PlotState {
        self.y.max = parse_bound(text);
        self.refresh_y()
    }

    pub fn set_auto_y(&mut self, auto: bool) -> &PlotState {
        self.y.auto = auto;
        self.refresh_y()
    }

    fn refresh_y(&mut self) -> &PlotState {
        self.state.y_domain = self.y.domain();
        &self.state
    }

    fn scale_x(&mut self, factor: Number) -> &PlotState {
        let Range { start, end } = self.x;
        let center = (start + end) / 2.0;
        let half = (end - start) * factor / 2.0;
        self.x = center - half..center + half;
        self.recompute()
    }

    pub fn zoom_in(&mut self) -> &PlotState {
        self.scale_x(ZOOM_IN)
    }

    pub fn zoom_out(&mut self) -> &PlotState {
        self.scale_x(ZOOM_OUT)
    }

    /// Restores the default domain and turns auto y-scale back on. Manual
    /// y bounds are kept for the next time auto is turned off.
    pub fn reset(&mut self) -> &PlotState {
        self.x = DEFAULT_X;
        self.y.auto = true;
        self.recompute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(view: &View) -> Number {
        view.x().end - view.x().start
    }

    #[test]
    fn starts_with_defaults() {
        let view = View::new();
        assert_eq!(view.expr().as_str(), DEFAULT_EXPR);
        assert_eq!(*view.x(), DEFAULT_X);
        assert_eq!(view.state().points.len(), 501);
        assert_eq!(view.state().message(), "");
        assert_eq!(view.y_domain(), [YBound::Auto; 2]);
    }

    #[test]
    fn zoom_is_centered_and_lossy() {
        let mut view = View::new();
        view.set_x_min("-2");
        view.set_x_max("6");
        view.zoom_in();
        assert!((width(&view) - 8.0 * ZOOM_IN).abs() < 1e-12);
        assert!(((view.x().start + view.x().end) / 2.0 - 2.0).abs() < 1e-12);

        view.zoom_out();
        assert!((width(&view) - 8.0 * ZOOM_IN * ZOOM_OUT).abs() < 1e-12);
        assert!(((view.x().start + view.x().end) / 2.0 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reset_restores_domain_and_auto_y() {
        let mut view = View::new();
        view.zoom_out();
        view.zoom_out();
        view.set_x_min("100");
        view.set_auto_y(false);
        view.set_y_min("-3");
        view.reset();
        assert_eq!(*view.x(), -5.0..5.0);
        assert!(view.y().auto);
        assert_eq!(view.y_domain(), [YBound::Auto; 2]);
        assert_eq!(view.state().error, None);
    }

    #[test]
    fn bound_inputs_fall_back() {
        let mut view = View::new();
        view.set_x_min("abc");
        assert_eq!(view.x().start, -5.0);
        view.set_x_max("inf");
        assert_eq!(view.x().end, 5.0);
        view.set_x_max(" 0 ");
        assert_eq!(view.x().end, 0.0);

        view.set_auto_y(false);
        view.set_y_min("0");
        view.set_y_max("");
        assert_eq!(view.y_domain(), [YBound::Fixed(0.0), YBound::Auto]);
    }

    #[test]
    fn state_carries_the_y_domain() {
        let mut view = View::new();
        assert_eq!(view.state().y_domain, [YBound::Auto; 2]);

        let points = view.state().points.clone();
        view.set_auto_y(false);
        let state = view.set_y_max("30");
        assert_eq!(state.y_domain, [YBound::Auto, YBound::Fixed(30.0)]);
        assert_eq!(state.points, points);

        // a failed recompute still reports the y domain in use
        let state = view.set_expr("x +");
        assert!(state.error.is_some());
        assert_eq!(state.y_domain, [YBound::Auto, YBound::Fixed(30.0)]);

        view.set_expr("x^2");
        assert_eq!(view.state().y_domain, [YBound::Auto, YBound::Fixed(30.0)]);
        view.reset();
        assert_eq!(view.state().y_domain, [YBound::Auto; 2]);
    }

    #[test]
    fn failure_clears_points_and_success_clears_error() {
        let mut view = View::new();
        let state = view.set_expr("x +");
        assert!(state.points.is_empty());
        assert!(state.message().starts_with("invalid expression"));

        view.set_expr("sin(x)");
        view.set_x_min("5");
        view.set_x_max("-5");
        assert!(matches!(
            view.state().error,
            Some(PlotErr::InvalidDomain { .. })
        ));
        assert!(view.state().points.is_empty());

        view.reset();
        assert_eq!(view.state().message(), "");
        assert_eq!(view.state().points.len(), 501);
    }
}

//! Reusable UI widgets.

pub(crate) mod button;
pub(crate) mod calendar;
pub(crate) mod checkbox;
pub(crate) mod clock;
pub(crate) mod datetime;
pub(crate) mod dial;
pub(crate) mod image_view;
pub(crate) mod list_view;
pub(crate) mod movie;
pub(crate) mod radio;
pub(crate) mod slider;
pub(crate) mod text_input;

use std::time::Instant;

use crate::backend::{CursorShape, WindowEvent};
use crate::cli::RangeSpec;
use crate::render::{Canvas, Font};
use crate::ui::{Colors, FieldValue};

/// Trait for UI widgets.
///
/// Mouse events are delivered to every widget; keyboard events only to the
/// focused one.
pub(crate) trait Widget {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn x(&self) -> i32;
    fn y(&self) -> i32;
    fn set_position(&mut self, x: i32, y: i32);
    /// Returns true if the widget needs a redraw.
    fn process_event(&mut self, event: &WindowEvent) -> bool;
    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font);

    fn focusable(&self) -> bool {
        false
    }

    fn set_focus(&mut self, _focused: bool) {}

    fn cursor(&self) -> CursorShape {
        CursorShape::Default
    }

    /// When the widget next wants [`Widget::tick`] called.
    fn next_tick(&self) -> Option<Instant> {
        None
    }

    /// Advances timed state. Returns true if the widget needs a redraw.
    fn tick(&mut self, _now: Instant) -> bool {
        false
    }

    /// The widget's answer, if it produces one.
    fn value(&self) -> Option<FieldValue> {
        None
    }

    fn contains(&self, px: i32, py: i32) -> bool {
        point_in_rect(px, py, self.x(), self.y(), self.width(), self.height())
    }
}

/// An integer held inside `[min, max]`, shared by the slider and the dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounded {
    min: i64,
    max: i64,
    value: i64,
}

impl From<&RangeSpec> for Bounded {
    /// `RangeSpec::new` has already normalized the range.
    fn from(range: &RangeSpec) -> Self {
        Self {
            min: range.min,
            max: range.max,
            value: range.value,
        }
    }
}

impl Bounded {
    #[cfg(test)]
    pub fn new(min: i64, max: i64, value: i64) -> Self {
        Self::from(&RangeSpec::new("", min, max, value))
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn set(&mut self, value: i64) -> bool {
        let value = value.clamp(self.min, self.max);
        let changed = value != self.value;
        self.value = value;
        changed
    }

    pub fn step(&mut self, delta: i64) -> bool {
        self.set(self.value.saturating_add(delta))
    }

    /// One tenth of the range, at least one.
    pub fn page(&self) -> i64 {
        (self.max.saturating_sub(self.min) / 10).max(1)
    }

    /// Position of the value in the range, 0.0 at `min` and 1.0 at `max`.
    pub fn ratio(&self) -> f32 {
        let span = self.max.saturating_sub(self.min);
        if span == 0 {
            0.0
        } else {
            (self.value.saturating_sub(self.min)) as f32 / span as f32
        }
    }

    /// Value nearest to `ratio` along the range.
    pub fn at_ratio(&self, ratio: f32) -> i64 {
        let span = self.max.saturating_sub(self.min) as f64;
        self.min
            .saturating_add((ratio.clamp(0.0, 1.0) as f64 * span).round() as i64)
            .min(self.max)
    }
}

/// Check if a point is within a rectangle.
pub(crate) fn point_in_rect(px: i32, py: i32, x: i32, y: i32, w: u32, h: u32) -> bool {
    px >= x && px < x + w as i32 && py >= y && py < y + h as i32
}

/// Scales a logical length to physical pixels.
pub(crate) fn px(base: u32, scale: f32) -> u32 {
    (base as f32 * scale) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_takes_range_spec_as_is() {
        let spec = RangeSpec::new("Volume", 0, 100, 250);
        let b = Bounded::from(&spec);
        assert_eq!((b.min(), b.max(), b.value()), (0, 100, 100));
    }

    #[test]
    fn bounded_normalizes_inverted_range() {
        let b = Bounded::new(10, 5, 7);
        assert_eq!((b.min(), b.max(), b.value()), (10, 10, 10));
    }

    #[test]
    fn bounded_clamps_default_and_steps() {
        let mut b = Bounded::new(0, 100, 250);
        assert_eq!(b.value(), 100);
        assert!(!b.step(1));
        assert!(b.step(-b.page()));
        assert_eq!(b.value(), 90);
        assert!(b.set(-5));
        assert_eq!(b.value(), 0);
    }

    #[test]
    fn bounded_ratio_round_trip() {
        let b = Bounded::new(-50, 50, 0);
        assert_eq!(b.ratio(), 0.5);
        assert_eq!(b.at_ratio(0.25), -25);
        assert_eq!(b.at_ratio(2.0), 50);
        assert_eq!(Bounded::new(3, 3, 3).ratio(), 0.0);
        assert_eq!(Bounded::new(0, 5, 0).page(), 1);
    }

    #[test]
    fn rect_edges() {
        assert!(point_in_rect(10, 10, 10, 10, 5, 5));
        assert!(point_in_rect(14, 14, 10, 10, 5, 5));
        assert!(!point_in_rect(15, 10, 10, 10, 5, 5));
        assert!(!point_in_rect(9, 12, 10, 10, 5, 5));
    }

    #[test]
    fn scaling_truncates() {
        assert_eq!(px(32, 1.0), 32);
        assert_eq!(px(32, 1.5), 48);
        assert_eq!(px(5, 1.25), 6);
    }
}

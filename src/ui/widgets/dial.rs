//! Rotary knob over an integer range.
//!
//! The knob sweeps 300 degrees, from 150 degrees left of straight up (the
//! minimum) clockwise to 150 degrees right of it (the maximum).

use super::{Bounded, Widget, px};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keys},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_DIAMETER: u32 = 96;
const SWEEP_DEGREES: f32 = 300.0;
const HALF_SWEEP: f32 = SWEEP_DEGREES / 2.0;

/// Clockwise angle from straight up, in degrees, of the offset `(dx, dy)`
/// (screen coordinates, y grows downward). Range is (-180, 180].
pub(crate) fn angle_of(dx: f32, dy: f32) -> f32 {
    dx.atan2(-dy).to_degrees()
}

/// Ratio along the sweep for a given angle; angles past either end stick to it.
pub(crate) fn ratio_for_angle(degrees: f32) -> f32 {
    ((degrees + HALF_SWEEP) / SWEEP_DEGREES).clamp(0.0, 1.0)
}

/// Inverse of [`ratio_for_angle`].
pub(crate) fn angle_for_ratio(ratio: f32) -> f32 {
    ratio.clamp(0.0, 1.0) * SWEEP_DEGREES - HALF_SWEEP
}

pub(crate) struct Dial {
    range: Bounded,
    x: i32,
    y: i32,
    diameter: u32,
    scale: f32,
    cursor: (i32, i32),
    hovered: bool,
    dragging: bool,
    focused: bool,
}

impl Dial {
    pub fn new(range: Bounded, scale: f32) -> Self {
        Self {
            range,
            x: 0,
            y: 0,
            diameter: px(BASE_DIAMETER, scale),
            scale,
            cursor: (0, 0),
            hovered: false,
            dragging: false,
            focused: false,
        }
    }

    fn center(&self) -> (f32, f32) {
        let r = self.diameter as f32 / 2.0;
        (self.x as f32 + r, self.y as f32 + r)
    }

    fn over_knob(&self) -> bool {
        let (cx, cy) = self.center();
        let dx = self.cursor.0 as f32 - cx;
        let dy = self.cursor.1 as f32 - cy;
        let r = self.diameter as f32 / 2.0;
        dx * dx + dy * dy <= r * r
    }

    fn set_from_cursor(&mut self) -> bool {
        let (cx, cy) = self.center();
        let dx = self.cursor.0 as f32 - cx;
        let dy = self.cursor.1 as f32 - cy;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let ratio = ratio_for_angle(angle_of(dx, dy));
        let value = self.range.at_ratio(ratio);
        self.range.set(value)
    }
}

impl Widget for Dial {
    fn width(&self) -> u32 {
        self.diameter
    }

    fn height(&self) -> u32 {
        self.diameter
    }

    fn x(&self) -> i32 {
        self.x
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMove(pos) | WindowEvent::CursorEnter(pos) => {
                self.cursor = (pos.x as i32, pos.y as i32);
                if self.dragging {
                    return self.set_from_cursor();
                }
                let hovered = self.over_knob();
                let changed = hovered != self.hovered;
                self.hovered = hovered;
                changed
            }
            WindowEvent::ButtonPress(MouseButton::Left) if self.over_knob() => {
                self.dragging = true;
                self.set_from_cursor();
                true
            }
            WindowEvent::ButtonRelease(MouseButton::Left) if self.dragging => {
                self.dragging = false;
                true
            }
            WindowEvent::Scroll(direction) if self.hovered => match direction {
                ScrollDirection::Up | ScrollDirection::Right => self.range.step(1),
                ScrollDirection::Down | ScrollDirection::Left => self.range.step(-1),
            },
            WindowEvent::KeyPress(key) if self.focused => match key.keysym {
                keys::LEFT | keys::DOWN => self.range.step(-1),
                keys::RIGHT | keys::UP => self.range.step(1),
                keys::PAGE_DOWN => self.range.step(-self.range.page()),
                keys::PAGE_UP => self.range.step(self.range.page()),
                keys::HOME => self.range.set(self.range.min()),
                keys::END => self.range.set(self.range.max()),
                _ => false,
            },
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (cx, cy) = self.center();
        let r = self.diameter as f32 / 2.0 - 1.0;
        let face = if self.dragging {
            colors.button_pressed
        } else if self.hovered {
            colors.button_hover
        } else {
            colors.button
        };
        canvas.fill_circle(cx, cy, r, face);
        let outline = if self.focused {
            colors.input_border_focused
        } else {
            colors.button_outline
        };
        canvas.stroke_circle(cx, cy, r, outline, 1.0);

        // Tick marks at both ends and every tenth of the sweep.
        let tick_outer = r - 3.0 * self.scale;
        let tick_inner = r - 8.0 * self.scale;
        for i in 0..=10 {
            let a = angle_for_ratio(i as f32 / 10.0).to_radians();
            let (s, c) = a.sin_cos();
            canvas.draw_line(
                cx + s * tick_inner,
                cy - c * tick_inner,
                cx + s * tick_outer,
                cy - c * tick_outer,
                colors.muted_text,
                1.0 * self.scale,
            );
        }

        // Pointer
        let a = angle_for_ratio(self.range.ratio()).to_radians();
        let (s, c) = a.sin_cos();
        let inner = r * 0.45;
        let outer = r - 12.0 * self.scale;
        canvas.draw_line(
            cx + s * inner,
            cy - c * inner,
            cx + s * outer,
            cy - c * outer,
            colors.accent,
            3.0 * self.scale,
        );
        canvas.fill_circle(cx + s * outer, cy - c * outer, 3.0 * self.scale, colors.accent);

        let text = font
            .render(&self.range.value().to_string())
            .with_color(colors.text)
            .finish();
        canvas.draw_canvas(
            &text,
            cx as i32 - text.width() as i32 / 2,
            cy as i32 - text.height() as i32 / 2,
        );
    }

    fn focusable(&self) -> bool {
        true
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn value(&self) -> Option<FieldValue> {
        Some(FieldValue::Int(self.range.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CursorPos;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn angles_are_clockwise_from_up() {
        assert!(approx(angle_of(0.0, -1.0), 0.0));
        assert!(approx(angle_of(1.0, 0.0), 90.0));
        assert!(approx(angle_of(-1.0, 0.0), -90.0));
        assert!(approx(angle_of(0.0, 1.0).abs(), 180.0));
    }

    #[test]
    fn sweep_maps_to_ratio() {
        assert!(approx(ratio_for_angle(-150.0), 0.0));
        assert!(approx(ratio_for_angle(0.0), 0.5));
        assert!(approx(ratio_for_angle(150.0), 1.0));
        assert!(approx(ratio_for_angle(170.0), 1.0));
        assert!(approx(ratio_for_angle(-170.0), 0.0));
        assert!(approx(angle_for_ratio(0.25), -75.0));
    }

    #[test]
    fn dragging_to_the_right_sets_value() {
        let mut dial = Dial::new(Bounded::new(0, 300, 0), 1.0);
        let r = (BASE_DIAMETER / 2) as i16;
        dial.process_event(&WindowEvent::CursorMove(CursorPos {
            x: r,
            y: r - 10,
        }));
        dial.process_event(&WindowEvent::ButtonPress(MouseButton::Left));
        assert_eq!(dial.value(), Some(FieldValue::Int(150)));

        // Straight right is 90 degrees: (90 + 150) / 300 of the range.
        dial.process_event(&WindowEvent::CursorMove(CursorPos {
            x: r + 20,
            y: r,
        }));
        assert_eq!(dial.value(), Some(FieldValue::Int(240)));
    }

    #[test]
    fn wheel_needs_hover() {
        let mut dial = Dial::new(Bounded::new(0, 10, 5), 1.0);
        assert!(!dial.process_event(&WindowEvent::Scroll(ScrollDirection::Up)));
        dial.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 40,
            y: 40,
        }));
        dial.process_event(&WindowEvent::Scroll(ScrollDirection::Up));
        assert_eq!(dial.value(), Some(FieldValue::Int(6)));
    }
}

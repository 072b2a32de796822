//! Seven-segment wall clock, redrawn once a second.

use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime, Timelike};

use super::{Widget, px};
use crate::{
    backend::WindowEvent,
    render::{Canvas, Font, Rgba},
    ui::Colors,
};

const BASE_DIGIT_WIDTH: u32 = 24;
const BASE_DIGIT_HEIGHT: u32 = 44;
const BASE_STROKE: u32 = 5;
const BASE_SPACING: u32 = 6;
const BASE_COLON_WIDTH: u32 = 10;

// Segment bits, clockwise from the top with the middle bar last.
const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

/// Lit segments for a decimal digit. Anything else is blank.
pub(crate) fn segments(digit: char) -> u8 {
    match digit {
        '0' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
        '1' => SEG_B | SEG_C,
        '2' => SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,
        '3' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
        '4' => SEG_B | SEG_C | SEG_F | SEG_G,
        '5' => SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,
        '6' => SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
        '7' => SEG_A | SEG_B | SEG_C,
        '8' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
        '9' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
        _ => 0,
    }
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Time left until the wall clock reaches the next whole second.
fn until_next_second(time: NaiveTime) -> Duration {
    // Leap seconds report nanos past 1e9.
    let nanos = time.nanosecond().min(999_999_999);
    Duration::from_nanos(u64::from(1_000_000_000 - nanos))
}

pub(crate) struct Clock {
    text: String,
    due: Instant,
    x: i32,
    y: i32,
    digit_w: u32,
    digit_h: u32,
    stroke: u32,
    spacing: u32,
    colon_w: u32,
}

impl Clock {
    pub fn new(scale: f32) -> Self {
        let now = Local::now().time();
        Self::at(now, Instant::now() + until_next_second(now), scale)
    }

    fn at(time: NaiveTime, due: Instant, scale: f32) -> Self {
        Self {
            text: format_time(time),
            due,
            x: 0,
            y: 0,
            digit_w: px(BASE_DIGIT_WIDTH, scale),
            digit_h: px(BASE_DIGIT_HEIGHT, scale),
            stroke: px(BASE_STROKE, scale).max(1),
            spacing: px(BASE_SPACING, scale),
            colon_w: px(BASE_COLON_WIDTH, scale),
        }
    }

    /// Shows `time`. Returns true if the displayed text changed.
    fn show(&mut self, time: NaiveTime) -> bool {
        let text = format_time(time);
        if text == self.text {
            return false;
        }
        self.text = text;
        true
    }

    fn glyph_width(&self, c: char) -> u32 {
        if c == ':' { self.colon_w } else { self.digit_w }
    }

    fn draw_digit(&self, canvas: &mut Canvas, x: f32, y: f32, lit: u8, on: Rgba, off: Rgba) {
        let w = self.digit_w as f32;
        let h = self.digit_h as f32;
        let t = self.stroke as f32;
        let half = (h - t) / 2.0;
        let bars = [
            (SEG_A, x + t, y, w - 2.0 * t, t),
            (SEG_B, x + w - t, y + t, t, half - t),
            (SEG_C, x + w - t, y + half + t, t, half - t),
            (SEG_D, x + t, y + h - t, w - 2.0 * t, t),
            (SEG_E, x, y + half + t, t, half - t),
            (SEG_F, x, y + t, t, half - t),
            (SEG_G, x + t, y + half, w - 2.0 * t, t),
        ];
        for (bit, bx, by, bw, bh) in bars {
            let color = if lit & bit != 0 { on } else { off };
            canvas.fill_rect(bx, by, bw, bh, color);
        }
    }
}

impl Widget for Clock {
    fn width(&self) -> u32 {
        let glyphs: u32 = self.text.chars().map(|c| self.glyph_width(c)).sum();
        let gaps = self.text.chars().count().saturating_sub(1) as u32 * self.spacing;
        glyphs + gaps
    }

    fn height(&self) -> u32 {
        self.digit_h
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

    fn process_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, _font: &Font) {
        let on = colors.accent;
        let off = colors.muted_text.with_alpha(28);
        let mut x = self.x as f32;
        let y = self.y as f32;
        for c in self.text.chars() {
            if c == ':' {
                let r = self.stroke as f32 / 2.0 + 0.5;
                let cx = x + self.colon_w as f32 / 2.0;
                canvas.fill_circle(cx, y + self.digit_h as f32 * 0.3, r, on);
                canvas.fill_circle(cx, y + self.digit_h as f32 * 0.7, r, on);
            } else {
                self.draw_digit(canvas, x, y, segments(c), on, off);
            }
            x += (self.glyph_width(c) + self.spacing) as f32;
        }
    }

    fn next_tick(&self) -> Option<Instant> {
        Some(self.due)
    }

    fn tick(&mut self, now: Instant) -> bool {
        if now < self.due {
            return false;
        }
        let time = Local::now().time();
        self.due = now + until_next_second(time);
        self.show(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn eight_lights_everything() {
        assert_eq!(segments('8'), 0x7f);
        assert_eq!(segments('8').count_ones(), 7);
    }

    #[test]
    fn one_uses_right_side_only() {
        assert_eq!(segments('1'), SEG_B | SEG_C);
        assert_eq!(segments(':'), 0);
    }

    #[test]
    fn time_is_zero_padded() {
        assert_eq!(format_time(hms(7, 5, 3)), "07:05:03");
    }

    #[test]
    fn waits_for_the_next_whole_second() {
        let t = NaiveTime::from_hms_milli_opt(10, 0, 0, 250).unwrap();
        assert_eq!(until_next_second(t), Duration::from_millis(750));
        assert_eq!(until_next_second(hms(10, 0, 0)), Duration::from_secs(1));
    }

    #[test]
    fn showing_same_second_needs_no_redraw() {
        let mut clock = Clock::at(hms(12, 0, 0), Instant::now(), 1.0);
        assert!(!clock.show(hms(12, 0, 0)));
        assert!(clock.show(hms(12, 0, 1)));
    }

    #[test]
    fn tick_waits_for_deadline() {
        let due = Instant::now() + Duration::from_secs(60);
        let mut clock = Clock::at(hms(12, 0, 0), due, 1.0);
        assert!(!clock.tick(due - Duration::from_secs(1)));
        assert_eq!(clock.next_tick(), Some(due));
    }

    #[test]
    fn width_covers_digits_and_colons() {
        let clock = Clock::at(hms(12, 0, 0), Instant::now(), 1.0);
        let expected = 6 * BASE_DIGIT_WIDTH + 2 * BASE_COLON_WIDTH + 7 * BASE_SPACING;
        assert_eq!(clock.width(), expected);
    }
}

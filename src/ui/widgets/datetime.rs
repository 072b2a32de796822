//! Date-time editor with one selectable section at a time.

use chrono::{Datelike, Days, Local, Months, NaiveDateTime, TimeDelta, Timelike};

use super::{Widget, px};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keys},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_HEIGHT: u32 = 32;
const BASE_PADDING: u32 = 10;
const BASE_RADIUS: f32 = 5.0;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SAMPLE: &str = "0000-00-00 00:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Section {
    const ALL: [Section; 6] = [
        Section::Year,
        Section::Month,
        Section::Day,
        Section::Hour,
        Section::Minute,
        Section::Second,
    ];

    /// Character range of the section within the displayed text.
    fn span(self) -> (usize, usize) {
        match self {
            Section::Year => (0, 4),
            Section::Month => (5, 7),
            Section::Day => (8, 10),
            Section::Hour => (11, 13),
            Section::Minute => (14, 16),
            Section::Second => (17, 19),
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

/// Editable value plus the selected section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateTimeState {
    value: NaiveDateTime,
    section: Section,
}

impl DateTimeState {
    pub fn new(value: NaiveDateTime) -> Self {
        Self {
            value: value.with_nanosecond(0).unwrap_or(value),
            section: Section::Day,
        }
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn select(&mut self, section: Section) -> bool {
        let changed = section != self.section;
        self.section = section;
        changed
    }

    /// Moves the selected section left (negative) or right, stopping at the ends.
    pub fn move_section(&mut self, delta: isize) -> bool {
        let index = self
            .section
            .index()
            .saturating_add_signed(delta)
            .min(Section::ALL.len() - 1);
        self.select(Section::ALL[index])
    }

    /// Steps the selected section by `delta` units. Larger fields carry, and
    /// month or year steps clamp the day to the target month's length.
    pub fn step(&mut self, delta: i32) -> bool {
        let v = self.value;
        let months = |n: i32| {
            let m = Months::new(n.unsigned_abs());
            if n >= 0 {
                v.checked_add_months(m)
            } else {
                v.checked_sub_months(m)
            }
        };
        let next = match self.section {
            Section::Year => months(delta.saturating_mul(12)),
            Section::Month => months(delta),
            Section::Day => {
                let d = Days::new(delta.unsigned_abs() as u64);
                if delta >= 0 {
                    v.checked_add_days(d)
                } else {
                    v.checked_sub_days(d)
                }
            }
            Section::Hour => TimeDelta::try_hours(delta as i64).and_then(|d| v.checked_add_signed(d)),
            Section::Minute => {
                TimeDelta::try_minutes(delta as i64).and_then(|d| v.checked_add_signed(d))
            }
            Section::Second => {
                TimeDelta::try_seconds(delta as i64).and_then(|d| v.checked_add_signed(d))
            }
        };
        match next {
            Some(n) if n != v && n.year() >= 1 && n.year() <= 9999 => {
                self.value = n;
                true
            }
            _ => false,
        }
    }

    pub fn display(&self) -> String {
        self.value.format(DISPLAY_FORMAT).to_string()
    }
}

pub(crate) struct DateTimeEdit {
    state: DateTimeState,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    padding: u32,
    radius: f32,
    /// Pixel offset of each character boundary of the displayed text.
    stops: Vec<f32>,
    cursor: (i32, i32),
    hovered: bool,
    focused: bool,
}

impl DateTimeEdit {
    pub fn new(font: &Font, scale: f32) -> Self {
        let stops: Vec<f32> = (0..=SAMPLE.len())
            .map(|i| font.advance(&SAMPLE[..i]))
            .collect();
        let now = Local::now().naive_local();
        Self::sized(DateTimeState::new(now), stops, scale)
    }

    fn sized(state: DateTimeState, stops: Vec<f32>, scale: f32) -> Self {
        let padding = px(BASE_PADDING, scale);
        let text_w = stops.last().copied().unwrap_or(0.0).ceil() as u32;
        Self {
            state,
            x: 0,
            y: 0,
            width: text_w + padding * 2,
            height: px(BASE_HEIGHT, scale),
            padding,
            radius: BASE_RADIUS * scale,
            stops,
            cursor: (0, 0),
            hovered: false,
            focused: false,
        }
    }

    fn section_at(&self, cx: i32) -> Option<Section> {
        let rel = (cx - self.x - self.padding as i32) as f32;
        Section::ALL.into_iter().find(|s| {
            let (start, end) = s.span();
            let left = self.stops.get(start).copied().unwrap_or(0.0);
            // Widen each section to cover the separator that follows it.
            let right = self.stops.get(end + 1).copied().unwrap_or(f32::MAX);
            rel >= left && rel < right
        })
    }
}

impl Widget for DateTimeEdit {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
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
                self.hovered = self.contains(self.cursor.0, self.cursor.1);
                false
            }
            WindowEvent::CursorLeave => {
                self.hovered = false;
                false
            }
            WindowEvent::ButtonPress(MouseButton::Left) if self.hovered => {
                match self.section_at(self.cursor.0) {
                    Some(section) => self.state.select(section),
                    None => false,
                }
            }
            WindowEvent::Scroll(direction) if self.hovered => match direction {
                ScrollDirection::Up => self.state.step(1),
                ScrollDirection::Down => self.state.step(-1),
                _ => false,
            },
            WindowEvent::KeyPress(key) if self.focused => match key.keysym {
                keys::LEFT => self.state.move_section(-1),
                keys::RIGHT => self.state.move_section(1),
                keys::UP => self.state.step(1),
                keys::DOWN => self.state.step(-1),
                keys::PAGE_UP => self.state.step(10),
                keys::PAGE_DOWN => self.state.step(-10),
                keys::HOME => self.state.select(Section::Year),
                keys::END => self.state.select(Section::Second),
                _ => false,
            },
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (bg, border) = if self.focused {
            (colors.input_bg_focused, colors.input_border_focused)
        } else {
            (colors.input_bg, colors.input_border)
        };
        canvas.fill_rounded_rect(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            self.radius,
            bg,
        );
        canvas.stroke_rounded_rect(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            self.radius,
            border,
            1.0,
        );

        let text_x = self.x + self.padding as i32;
        if self.focused {
            let (start, end) = self.state.section().span();
            let left = self.stops.get(start).copied().unwrap_or(0.0);
            let right = self.stops.get(end).copied().unwrap_or(left);
            let inset = self.height as f32 * 0.18;
            canvas.fill_rect(
                text_x as f32 + left - 1.0,
                self.y as f32 + inset,
                right - left + 2.0,
                self.height as f32 - inset * 2.0,
                colors.accent.with_alpha(90),
            );
        }

        let text = font
            .render(&self.state.display())
            .with_color(colors.text)
            .finish();
        let text_y = self.y + (self.height as i32 - text.height() as i32) / 2;
        canvas.draw_canvas(&text, text_x, text_y);
    }

    fn focusable(&self) -> bool {
        true
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn value(&self) -> Option<FieldValue> {
        Some(FieldValue::DateTime(self.state.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn drops_sub_second_precision() {
        let v = at(2024, 1, 1, 0, 0, 0) + TimeDelta::milliseconds(750);
        assert_eq!(DateTimeState::new(v).value(), at(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn seconds_carry_into_the_next_day() {
        let mut state = DateTimeState::new(at(2024, 12, 31, 23, 59, 59));
        state.select(Section::Second);
        state.step(1);
        assert_eq!(state.value(), at(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn month_and_year_steps_clamp_day() {
        let mut state = DateTimeState::new(at(2024, 1, 31, 12, 0, 0));
        state.select(Section::Month);
        state.step(1);
        assert_eq!(state.value(), at(2024, 2, 29, 12, 0, 0));

        state.select(Section::Year);
        state.step(1);
        assert_eq!(state.value(), at(2025, 2, 28, 12, 0, 0));
    }

    #[test]
    fn day_steps_go_backwards() {
        let mut state = DateTimeState::new(at(2024, 3, 1, 8, 30, 0));
        assert_eq!(state.section(), Section::Day);
        state.step(-1);
        assert_eq!(state.value(), at(2024, 2, 29, 8, 30, 0));
    }

    #[test]
    fn section_navigation_stops_at_ends() {
        let mut state = DateTimeState::new(at(2024, 3, 1, 8, 30, 0));
        state.move_section(-5);
        assert_eq!(state.section(), Section::Year);
        assert!(!state.move_section(-1));
        state.move_section(10);
        assert_eq!(state.section(), Section::Second);
    }

    #[test]
    fn display_matches_fixed_layout() {
        let state = DateTimeState::new(at(2024, 3, 1, 8, 5, 9));
        let text = state.display();
        assert_eq!(text, "2024-03-01 08:05:09");
        assert_eq!(text.len(), SAMPLE.len());
        let (start, end) = Section::Minute.span();
        assert_eq!(&text[start..end], "05");
    }

    #[test]
    fn click_picks_section_from_stops() {
        // Monospace-like stops: 10px per character.
        let stops = (0..=SAMPLE.len()).map(|i| i as f32 * 10.0).collect();
        let mut edit = DateTimeEdit::sized(DateTimeState::new(at(2024, 3, 1, 8, 5, 9)), stops, 1.0);
        let padding = BASE_PADDING as i32;
        assert_eq!(edit.section_at(padding + 5), Some(Section::Year));
        assert_eq!(edit.section_at(padding + 62), Some(Section::Month));
        assert_eq!(edit.section_at(padding + 185), Some(Section::Second));
        edit.set_position(0, 0);
        assert_eq!(edit.width(), 190 + 2 * BASE_PADDING);
    }
}

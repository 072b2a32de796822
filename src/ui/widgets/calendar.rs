//! Month-grid date picker.

use chrono::{Datelike, Days, Local, Months, NaiveDate};

use super::{Widget, point_in_rect, px};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keys},
    render::{Canvas, Font, rgb},
    ui::{Colors, FieldValue},
};

const BASE_CELL_SIZE: u32 = 34;
const BASE_HEADER_HEIGHT: u32 = 36;
const BASE_DAY_HEADER_HEIGHT: u32 = 24;
const BASE_NAV_WIDTH: u32 = 28;
const GRID_ROWS: u32 = 6;

const DAY_NAMES: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Selected date plus navigation rules. The visible month is always the selected date's month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CalendarState {
    selected: NaiveDate,
}

impl CalendarState {
    pub fn new(selected: NaiveDate) -> Self {
        Self {
            selected,
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn set(&mut self, date: NaiveDate) -> bool {
        let changed = date != self.selected;
        self.selected = date;
        changed
    }

    pub fn step_days(&mut self, delta: i64) -> bool {
        let days = Days::new(delta.unsigned_abs());
        let next = if delta >= 0 {
            self.selected.checked_add_days(days)
        } else {
            self.selected.checked_sub_days(days)
        };
        next.is_some_and(|d| self.set(d))
    }

    /// Moves by whole months, clamping the day to the target month's length.
    pub fn step_months(&mut self, delta: i32) -> bool {
        let months = Months::new(delta.unsigned_abs());
        let next = if delta >= 0 {
            self.selected.checked_add_months(months)
        } else {
            self.selected.checked_sub_months(months)
        };
        next.is_some_and(|d| self.set(d))
    }

    pub fn first_of_month(&self) -> NaiveDate {
        self.selected.with_day(1).unwrap_or(self.selected)
    }

    /// Grid cell (0..42) holding `day` of the visible month, with Sunday as column 0.
    pub fn cell_of(&self, day: u32) -> u32 {
        self.first_of_month().weekday().num_days_from_sunday() + day - 1
    }

    /// Day of the visible month shown in grid cell `cell`, if any.
    pub fn day_at_cell(&self, cell: u32) -> Option<NaiveDate> {
        let lead = self.first_of_month().weekday().num_days_from_sunday();
        let day = cell.checked_sub(lead)? + 1;
        self.selected.with_day(day)
    }

    pub fn days_in_month(&self) -> u32 {
        let first = self.first_of_month();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(28)
    }
}

enum Hit {
    Prev,
    Next,
    Today,
    Day(NaiveDate),
}

pub(crate) struct Calendar {
    state: CalendarState,
    today: NaiveDate,
    x: i32,
    y: i32,
    cell: u32,
    header: u32,
    day_header: u32,
    nav: u32,
    today_width: u32,
    scale: f32,
    cursor: (i32, i32),
    hovered: bool,
    hovered_day: Option<NaiveDate>,
    focused: bool,
}

impl Calendar {
    pub fn new(font: &Font, scale: f32) -> Self {
        let today = Local::now().date_naive();
        let today_width = font.render("Today").measure().0.ceil() as u32;
        Self::sized(today, today_width, scale)
    }

    fn sized(today: NaiveDate, today_width: u32, scale: f32) -> Self {
        Self {
            state: CalendarState::new(today),
            today,
            x: 0,
            y: 0,
            cell: px(BASE_CELL_SIZE, scale),
            header: px(BASE_HEADER_HEIGHT, scale),
            day_header: px(BASE_DAY_HEADER_HEIGHT, scale),
            nav: px(BASE_NAV_WIDTH, scale),
            today_width: today_width + px(16, scale),
            scale,
            cursor: (0, 0),
            hovered: false,
            hovered_day: None,
            focused: false,
        }
    }

    fn grid_y(&self) -> i32 {
        self.y + (self.header + self.day_header) as i32
    }

    fn hit(&self, cx: i32, cy: i32) -> Option<Hit> {
        let w = self.width();
        if point_in_rect(cx, cy, self.x, self.y, self.nav, self.header) {
            return Some(Hit::Prev);
        }
        let next_x = self.x + (w - self.nav) as i32;
        if point_in_rect(cx, cy, next_x, self.y, self.nav, self.header) {
            return Some(Hit::Next);
        }
        let today_x = next_x - self.today_width as i32;
        if point_in_rect(cx, cy, today_x, self.y, self.today_width, self.header) {
            return Some(Hit::Today);
        }

        let grid_y = self.grid_y();
        if !point_in_rect(cx, cy, self.x, grid_y, self.cell * 7, self.cell * GRID_ROWS) {
            return None;
        }
        let col = (cx - self.x) as u32 / self.cell;
        let row = (cy - grid_y) as u32 / self.cell;
        self.state.day_at_cell(row * 7 + col).map(Hit::Day)
    }

    fn handle_key(&mut self, keysym: u32) -> bool {
        match keysym {
            keys::LEFT => self.state.step_days(-1),
            keys::RIGHT => self.state.step_days(1),
            keys::UP => self.state.step_days(-7),
            keys::DOWN => self.state.step_days(7),
            keys::PAGE_UP => self.state.step_months(-1),
            keys::PAGE_DOWN => self.state.step_months(1),
            keys::HOME => self.state.set(self.state.first_of_month()),
            keys::END => {
                let last = self.state.selected().with_day(self.state.days_in_month());
                last.is_some_and(|d| self.state.set(d))
            }
            _ => false,
        }
    }
}

impl Widget for Calendar {
    fn width(&self) -> u32 {
        self.cell * 7
    }

    fn height(&self) -> u32 {
        self.header + self.day_header + self.cell * GRID_ROWS
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
                let day = match self.hit(self.cursor.0, self.cursor.1) {
                    Some(Hit::Day(d)) => Some(d),
                    _ => None,
                };
                let changed = day != self.hovered_day;
                self.hovered_day = day;
                changed
            }
            WindowEvent::CursorLeave => {
                self.hovered = false;
                self.hovered_day.take().is_some()
            }
            WindowEvent::ButtonPress(MouseButton::Left) if self.hovered => {
                match self.hit(self.cursor.0, self.cursor.1) {
                    Some(Hit::Prev) => self.state.step_months(-1),
                    Some(Hit::Next) => self.state.step_months(1),
                    Some(Hit::Today) => self.state.set(self.today),
                    Some(Hit::Day(d)) => self.state.set(d),
                    None => false,
                }
            }
            WindowEvent::Scroll(direction) if self.hovered => match direction {
                ScrollDirection::Up => self.state.step_months(-1),
                ScrollDirection::Down => self.state.step_months(1),
                _ => false,
            },
            WindowEvent::KeyPress(key) if self.focused => self.handle_key(key.keysym),
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let scale = self.scale;
        let width = self.width();
        let radius = 8.0 * scale;
        let x = self.x;

        canvas.fill_rounded_rect(
            x as f32,
            self.y as f32,
            width as f32,
            self.height() as f32,
            radius,
            colors.input_bg,
        );

        // Header
        let header_bg = colors.input_bg.darken(0.03);
        canvas.fill_rounded_rect(
            x as f32,
            self.y as f32,
            width as f32,
            self.header as f32,
            radius,
            header_bg,
        );
        canvas.fill_rect(
            x as f32,
            self.y as f32 + self.header as f32 - radius,
            width as f32,
            radius,
            header_bg,
        );

        let center_in_header = |c: &Canvas| self.y + (self.header as i32 - c.height() as i32) / 2;

        let prev = font.render("<").with_color(colors.text).finish();
        canvas.draw_canvas(&prev, x + (self.nav as i32 - prev.width() as i32) / 2, center_in_header(&prev));
        let next = font.render(">").with_color(colors.text).finish();
        let next_x = x + (width - self.nav) as i32;
        canvas.draw_canvas(
            &next,
            next_x + (self.nav as i32 - next.width() as i32) / 2,
            center_in_header(&next),
        );

        let title = self.state.selected().format("%B %Y").to_string();
        let title_canvas = font.render(&title).with_color(colors.text).finish();
        canvas.draw_canvas(&title_canvas, x + self.nav as i32, center_in_header(&title_canvas));

        let today_canvas = font.render("Today").with_color(rgb(80, 160, 100)).finish();
        let today_x = next_x - self.today_width as i32;
        canvas.draw_canvas(
            &today_canvas,
            today_x + (self.today_width as i32 - today_canvas.width() as i32) / 2,
            center_in_header(&today_canvas),
        );

        // Day-of-week headers
        let day_header_y = self.y + self.header as i32;
        for (i, name) in DAY_NAMES.iter().enumerate() {
            let dt = font.render(name).with_color(colors.muted_text).finish();
            let dx = x + (i as u32 * self.cell) as i32 + (self.cell as i32 - dt.width() as i32) / 2;
            let dy = day_header_y + (self.day_header as i32 - dt.height() as i32) / 2;
            canvas.draw_canvas(&dt, dx, dy);
        }

        // Day grid
        let grid_y = self.grid_y();
        let inset = 2.0 * scale;
        let selected = self.state.selected();
        for day in 1..=self.state.days_in_month() {
            let Some(date) = selected.with_day(day) else {
                continue;
            };
            let cell = self.state.cell_of(day);
            let col = cell % 7;
            let cx = x + (col * self.cell) as i32;
            let cy = grid_y + ((cell / 7) * self.cell) as i32;
            let size = self.cell as f32 - inset * 2.0;

            let is_selected = date == selected;
            if is_selected {
                canvas.fill_rounded_rect(
                    cx as f32 + inset,
                    cy as f32 + inset,
                    size,
                    size,
                    4.0 * scale,
                    colors.accent,
                );
            } else if self.hovered_day == Some(date) {
                canvas.fill_rounded_rect(
                    cx as f32 + inset,
                    cy as f32 + inset,
                    size,
                    size,
                    4.0 * scale,
                    colors.input_bg.darken(0.08),
                );
            }
            if date == self.today && !is_selected {
                canvas.stroke_rounded_rect(
                    cx as f32 + inset * 2.0,
                    cy as f32 + inset * 2.0,
                    size - inset * 2.0,
                    size - inset * 2.0,
                    4.0 * scale,
                    colors.accent,
                    2.0 * scale,
                );
            }

            let text_color = if is_selected {
                rgb(255, 255, 255)
            } else if col == 0 {
                rgb(200, 100, 100)
            } else {
                colors.text
            };
            let dt = font.render(&day.to_string()).with_color(text_color).finish();
            canvas.draw_canvas(
                &dt,
                cx + (self.cell as i32 - dt.width() as i32) / 2,
                cy + (self.cell as i32 - dt.height() as i32) / 2,
            );
        }

        let border = if self.focused {
            colors.input_border_focused
        } else {
            colors.input_border
        };
        canvas.stroke_rounded_rect(
            x as f32,
            self.y as f32,
            width as f32,
            self.height() as f32,
            radius,
            border,
            1.0,
        );
    }

    fn focusable(&self) -> bool {
        true
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn value(&self) -> Option<FieldValue> {
        Some(FieldValue::Date(self.state.selected()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CursorPos, KeyEvent, Modifiers};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_steps_clamp_the_day() {
        let mut state = CalendarState::new(date(2024, 1, 31));
        state.step_months(1);
        assert_eq!(state.selected(), date(2024, 2, 29));
        state.step_months(-2);
        assert_eq!(state.selected(), date(2023, 12, 29));
    }

    #[test]
    fn day_steps_cross_year_boundaries() {
        let mut state = CalendarState::new(date(2023, 12, 28));
        state.step_days(7);
        assert_eq!(state.selected(), date(2024, 1, 4));
        state.step_days(-4);
        assert_eq!(state.selected(), date(2023, 12, 31));
    }

    #[test]
    fn grid_cells_follow_weekday() {
        // 1 September 2024 was a Sunday, 1 May 2024 a Wednesday.
        let state = CalendarState::new(date(2024, 9, 15));
        assert_eq!(state.cell_of(1), 0);
        assert_eq!(state.day_at_cell(14), Some(date(2024, 9, 15)));
        assert_eq!(state.days_in_month(), 30);
        assert_eq!(state.day_at_cell(30), None);

        let state = CalendarState::new(date(2024, 5, 2));
        assert_eq!(state.cell_of(1), 3);
        assert_eq!(state.day_at_cell(2), None);
        assert_eq!(state.day_at_cell(3), Some(date(2024, 5, 1)));
    }

    #[test]
    fn keyboard_navigation() {
        let mut cal = Calendar::sized(date(2024, 3, 10), 40, 1.0);
        let press = |cal: &mut Calendar, keysym| {
            cal.process_event(&WindowEvent::KeyPress(KeyEvent {
                keysym,
                modifiers: Modifiers::empty(),
            }))
        };
        assert!(!press(&mut cal, keys::RIGHT));
        cal.set_focus(true);
        press(&mut cal, keys::RIGHT);
        press(&mut cal, keys::DOWN);
        assert_eq!(cal.value(), Some(FieldValue::Date(date(2024, 3, 18))));
        press(&mut cal, keys::END);
        assert_eq!(cal.value(), Some(FieldValue::Date(date(2024, 3, 31))));
        press(&mut cal, keys::PAGE_DOWN);
        assert_eq!(cal.value(), Some(FieldValue::Date(date(2024, 4, 30))));
    }

    #[test]
    fn clicking_a_day_selects_it() {
        let mut cal = Calendar::sized(date(2024, 9, 15), 40, 1.0);
        // Cell for 2 September: row 0, column 1.
        let x = (BASE_CELL_SIZE + BASE_CELL_SIZE / 2) as i16;
        let y = (BASE_HEADER_HEIGHT + BASE_DAY_HEADER_HEIGHT + BASE_CELL_SIZE / 2) as i16;
        cal.process_event(&WindowEvent::CursorMove(CursorPos {
            x,
            y,
        }));
        assert!(cal.process_event(&WindowEvent::ButtonPress(MouseButton::Left)));
        assert_eq!(cal.value(), Some(FieldValue::Date(date(2024, 9, 2))));
    }

    #[test]
    fn wheel_changes_month() {
        let mut cal = Calendar::sized(date(2024, 9, 15), 40, 1.0);
        cal.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 5,
            y: 100,
        }));
        cal.process_event(&WindowEvent::Scroll(ScrollDirection::Up));
        assert_eq!(cal.value(), Some(FieldValue::Date(date(2024, 8, 15))));
    }
}

//! Exclusive group of labelled options.

use super::{Widget, px};
use crate::{
    backend::{MouseButton, WindowEvent, keys},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_ROW_HEIGHT: u32 = 26;
const BASE_MARK_SIZE: u32 = 16;
const BASE_LABEL_GAP: u32 = 8;

pub(crate) struct RadioGroup {
    options: Vec<String>,
    selected: usize,
    x: i32,
    y: i32,
    width: u32,
    row_height: u32,
    mark: u32,
    gap: u32,
    hovered_row: Option<usize>,
    focused: bool,
}

impl RadioGroup {
    /// The first option starts selected.
    pub fn new(options: Vec<String>, font: &Font, scale: f32) -> Self {
        let widest = options
            .iter()
            .map(|o| font.render(o).measure().0.ceil() as u32)
            .max()
            .unwrap_or(0);
        Self::sized(options, widest, scale)
    }

    fn sized(options: Vec<String>, widest: u32, scale: f32) -> Self {
        let mark = px(BASE_MARK_SIZE, scale);
        let gap = px(BASE_LABEL_GAP, scale);
        Self {
            options,
            selected: 0,
            x: 0,
            y: 0,
            width: mark + gap + widest,
            row_height: px(BASE_ROW_HEIGHT, scale),
            mark,
            gap,
            hovered_row: None,
            focused: false,
        }
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    fn select(&mut self, index: usize) -> bool {
        if index >= self.options.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        true
    }

    fn row_at(&self, cx: i32, cy: i32) -> Option<usize> {
        if !self.contains(cx, cy) {
            return None;
        }
        let row = ((cy - self.y) as u32 / self.row_height.max(1)) as usize;
        (row < self.options.len()).then_some(row)
    }
}

impl Widget for RadioGroup {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.row_height * self.options.len() as u32
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
                let row = self.row_at(pos.x as i32, pos.y as i32);
                let changed = row != self.hovered_row;
                self.hovered_row = row;
                changed
            }
            WindowEvent::CursorLeave => self.hovered_row.take().is_some(),
            WindowEvent::ButtonPress(MouseButton::Left) => match self.hovered_row {
                Some(row) => self.select(row),
                None => false,
            },
            WindowEvent::KeyPress(key) if self.focused => match key.keysym {
                keys::UP | keys::LEFT => self.select(self.selected.saturating_sub(1)),
                keys::DOWN | keys::RIGHT => self.select(self.selected + 1),
                keys::HOME => self.select(0),
                keys::END => self.select(self.options.len().saturating_sub(1)),
                _ => false,
            },
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        for (i, option) in self.options.iter().enumerate() {
            let row_y = self.y + (i as u32 * self.row_height) as i32;
            let r = self.mark as f32 / 2.0;
            let cx = self.x as f32 + r;
            let cy = row_y as f32 + self.row_height as f32 / 2.0;

            let ring = if (self.focused && i == self.selected) || self.hovered_row == Some(i) {
                colors.input_border_focused
            } else {
                colors.input_border
            };
            canvas.fill_circle(cx, cy, r, colors.input_bg);
            canvas.stroke_circle(cx, cy, r - 0.5, ring, 1.0);
            if i == self.selected {
                canvas.fill_circle(cx, cy, r * 0.5, colors.accent);
            }

            let text = font.render(option).with_color(colors.text).finish();
            let text_x = self.x + (self.mark + self.gap) as i32;
            let text_y = row_y + (self.row_height as i32 - text.height() as i32) / 2;
            canvas.draw_canvas(&text, text_x, text_y);
        }
    }

    fn focusable(&self) -> bool {
        !self.options.is_empty()
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn value(&self) -> Option<FieldValue> {
        Some(FieldValue::Choice(self.selected_option().map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CursorPos, KeyEvent, Modifiers};

    fn group() -> RadioGroup {
        RadioGroup::sized(vec!["red".into(), "green".into(), "blue".into()], 40, 1.0)
    }

    #[test]
    fn first_option_is_preselected() {
        assert_eq!(group().value(), Some(FieldValue::Choice(Some("red".into()))));
    }

    #[test]
    fn arrows_move_within_bounds() {
        let mut g = group();
        g.set_focus(true);
        let press = |g: &mut RadioGroup, keysym| {
            g.process_event(&WindowEvent::KeyPress(KeyEvent {
                keysym,
                modifiers: Modifiers::empty(),
            }))
        };
        assert!(!press(&mut g, keys::UP));
        press(&mut g, keys::DOWN);
        press(&mut g, keys::DOWN);
        assert!(!press(&mut g, keys::DOWN));
        assert_eq!(g.selected_option(), Some("blue"));
        press(&mut g, keys::HOME);
        assert_eq!(g.selected_option(), Some("red"));
    }

    #[test]
    fn click_selects_row() {
        let mut g = group();
        g.set_position(0, 50);
        g.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 5,
            y: 50 + BASE_ROW_HEIGHT as i16 + 1,
        }));
        assert!(g.process_event(&WindowEvent::ButtonPress(MouseButton::Left)));
        assert_eq!(g.selected_option(), Some("green"));
    }
}

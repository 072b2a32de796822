//! Single-selection list of text items.

use super::{Widget, point_in_rect, px};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keys},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_ROW_HEIGHT: u32 = 28;
const BASE_ROW_PADDING: u32 = 10;
const BASE_MIN_WIDTH: u32 = 240;
const BASE_SCROLLBAR_WIDTH: u32 = 6;
const MAX_VISIBLE_ROWS: usize = 6;

/// Selection and scroll position, independent of drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListState {
    len: usize,
    visible: usize,
    selected: Option<usize>,
    offset: usize,
}

impl ListState {
    pub fn new(len: usize, visible: usize) -> Self {
        Self {
            len,
            visible: visible.max(1),
            selected: None,
            offset: 0,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.len || self.selected == Some(index) {
            return false;
        }
        self.selected = Some(index);
        self.ensure_visible(index);
        true
    }

    /// Moves the selection by `delta` rows. With nothing selected, starts at the first row.
    pub fn move_by(&mut self, delta: isize) -> bool {
        if self.len == 0 {
            return false;
        }
        let target = match self.selected {
            None => 0,
            Some(i) => i.saturating_add_signed(delta).min(self.len - 1),
        };
        self.select(target)
    }

    pub fn select_last(&mut self) -> bool {
        self.len > 0 && self.select(self.len - 1)
    }

    pub fn scroll(&mut self, delta: isize) -> bool {
        let max_offset = self.len.saturating_sub(self.visible);
        let offset = self.offset.saturating_add_signed(delta).min(max_offset);
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }

    fn ensure_visible(&mut self, index: usize) {
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + self.visible {
            self.offset = index + 1 - self.visible;
        }
    }
}

pub(crate) struct ListView {
    items: Vec<String>,
    state: ListState,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    row_height: u32,
    scale: f32,
    hovered_row: Option<usize>,
    hovered: bool,
    focused: bool,
}

impl ListView {
    pub fn new(items: Vec<String>, font: &Font, scale: f32) -> Self {
        let widest = items
            .iter()
            .map(|item| font.render(item).measure().0.ceil() as u32)
            .max()
            .unwrap_or(0);
        Self::sized(items, widest, scale)
    }

    fn sized(items: Vec<String>, widest: u32, scale: f32) -> Self {
        let row_height = px(BASE_ROW_HEIGHT, scale);
        let visible = items.len().clamp(1, MAX_VISIBLE_ROWS);
        let width = (widest + px(BASE_ROW_PADDING, scale) * 2 + px(BASE_SCROLLBAR_WIDTH, scale))
            .max(px(BASE_MIN_WIDTH, scale));
        Self {
            state: ListState::new(items.len(), visible),
            items,
            x: 0,
            y: 0,
            width,
            height: row_height * visible as u32,
            row_height,
            scale,
            hovered_row: None,
            hovered: false,
            focused: false,
        }
    }

    fn row_at(&self, px: i32, py: i32) -> Option<usize> {
        if !point_in_rect(px, py, self.x, self.y, self.width, self.height) {
            return None;
        }
        let row = ((py - self.y) as u32 / self.row_height.max(1)) as usize + self.state.offset();
        (row < self.items.len()).then_some(row)
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.state.selected().and_then(|i| self.items.get(i)).map(String::as_str)
    }
}

impl Widget for ListView {
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
                let (cx, cy) = (pos.x as i32, pos.y as i32);
                self.hovered = self.contains(cx, cy);
                let row = self.row_at(cx, cy);
                let changed = row != self.hovered_row;
                self.hovered_row = row;
                changed
            }
            WindowEvent::CursorLeave => {
                self.hovered = false;
                self.hovered_row.take().is_some()
            }
            WindowEvent::ButtonPress(MouseButton::Left) => match self.hovered_row {
                Some(row) => self.state.select(row),
                None => false,
            },
            WindowEvent::Scroll(direction) if self.hovered => match direction {
                ScrollDirection::Up => self.state.scroll(-1),
                ScrollDirection::Down => self.state.scroll(1),
                _ => false,
            },
            WindowEvent::KeyPress(key) if self.focused => match key.keysym {
                keys::UP => self.state.move_by(-1),
                keys::DOWN => self.state.move_by(1),
                keys::PAGE_UP => self.state.move_by(-(MAX_VISIBLE_ROWS as isize)),
                keys::PAGE_DOWN => self.state.move_by(MAX_VISIBLE_ROWS as isize),
                keys::HOME => self.state.select(0),
                keys::END => self.state.select_last(),
                _ => false,
            },
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let radius = 5.0 * self.scale;
        let border = if self.focused {
            colors.input_border_focused
        } else {
            colors.input_border
        };
        canvas.fill_rounded_rect(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            radius,
            colors.input_bg,
        );

        let padding = px(BASE_ROW_PADDING, self.scale) as i32;
        let visible = (self.height / self.row_height.max(1)) as usize;
        let first = self.state.offset();
        for (slot, index) in (first..self.items.len()).take(visible).enumerate() {
            let row_y = self.y + (slot as u32 * self.row_height) as i32;
            let selected = self.state.selected() == Some(index);

            if selected {
                canvas.fill_rect(
                    self.x as f32 + 1.0,
                    row_y as f32,
                    self.width as f32 - 2.0,
                    self.row_height as f32,
                    colors.accent,
                );
            } else if self.hovered_row == Some(index) {
                canvas.fill_rect(
                    self.x as f32 + 1.0,
                    row_y as f32,
                    self.width as f32 - 2.0,
                    self.row_height as f32,
                    colors.input_bg.darken(0.08),
                );
            }

            let color = if selected {
                colors.window_bg
            } else {
                colors.text
            };
            let text = font.render(&self.items[index]).with_color(color).finish();
            let text_y = row_y + (self.row_height as i32 - text.height() as i32) / 2;
            canvas.draw_canvas(&text, self.x + padding, text_y);
        }

        if self.items.len() > visible {
            let bar_w = px(BASE_SCROLLBAR_WIDTH, self.scale) as f32;
            let track_h = self.height as f32;
            let thumb_h = (track_h * visible as f32 / self.items.len() as f32).max(bar_w * 2.0);
            let max_offset = (self.items.len() - visible) as f32;
            let thumb_y = self.y as f32 + (track_h - thumb_h) * (first as f32 / max_offset);
            canvas.fill_rounded_rect(
                (self.x + self.width as i32) as f32 - bar_w - 2.0,
                thumb_y,
                bar_w,
                thumb_h,
                bar_w / 2.0,
                colors.input_border,
            );
        }

        canvas.stroke_rounded_rect(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
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
        Some(FieldValue::Choice(self.selected_item().map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CursorPos;

    fn items(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item {i}")).collect()
    }

    #[test]
    fn starts_without_selection() {
        let list = ListView::sized(items(3), 50, 1.0);
        assert_eq!(list.value(), Some(FieldValue::Choice(None)));
    }

    #[test]
    fn keyboard_selection_is_clamped() {
        let mut state = ListState::new(3, 6);
        assert!(state.move_by(1));
        assert_eq!(state.selected(), Some(0));
        state.move_by(5);
        assert_eq!(state.selected(), Some(2));
        state.move_by(-10);
        assert_eq!(state.selected(), Some(0));
        assert!(!state.move_by(-1));
    }

    #[test]
    fn selection_scrolls_into_view() {
        let mut state = ListState::new(10, 4);
        state.select(6);
        assert_eq!(state.offset(), 3);
        state.select(1);
        assert_eq!(state.offset(), 1);
        assert!(state.select_last());
        assert_eq!(state.offset(), 6);
    }

    #[test]
    fn wheel_scroll_stops_at_ends() {
        let mut state = ListState::new(8, 6);
        assert!(!state.scroll(-1));
        assert!(state.scroll(5));
        assert_eq!(state.offset(), 2);
    }

    #[test]
    fn empty_list_ignores_navigation() {
        let mut state = ListState::new(0, 6);
        assert!(!state.move_by(1));
        assert!(!state.select_last());
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn click_selects_row_under_cursor() {
        let mut list = ListView::sized(items(3), 50, 1.0);
        list.set_position(0, 100);
        list.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 20,
            y: 100 + BASE_ROW_HEIGHT as i16 + 3,
        }));
        assert!(list.process_event(&WindowEvent::ButtonPress(MouseButton::Left)));
        assert_eq!(list.selected_item(), Some("item 1"));
    }
}

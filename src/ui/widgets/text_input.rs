//! Text input widget for single-line text entry.

use super::{Widget, px};
use crate::{
    backend::{CursorShape, Modifiers, MouseButton, WindowEvent, keys},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_INPUT_HEIGHT: u32 = 32;
const BASE_INPUT_RADIUS: f32 = 5.0;
const BASE_INPUT_PADDING: u32 = 8;

/// A single-line text input widget.
pub(crate) struct TextInput {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    padding: i32,
    radius: f32,
    text: String,
    cursor_pos: usize,
    focused: bool,
    hovered: bool,
}

impl TextInput {
    pub fn new(width: u32, scale: f32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height: px(BASE_INPUT_HEIGHT, scale),
            padding: px(BASE_INPUT_PADDING, scale) as i32,
            radius: BASE_INPUT_RADIUS * scale,
            text: String::new(),
            cursor_pos: 0,
            focused: false,
            hovered: false,
        }
    }

    /// Returns the current text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Converts a character position to a byte position.
    fn byte_position(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn insert_char(&mut self, c: char) {
        let byte_pos = self.byte_position(self.cursor_pos);
        self.text.insert(byte_pos, c);
        self.cursor_pos += 1;
    }

    /// Deletes the character before the cursor (backspace).
    fn delete_before(&mut self) -> bool {
        if self.cursor_pos == 0 {
            return false;
        }
        let start = self.byte_position(self.cursor_pos - 1);
        let end = self.byte_position(self.cursor_pos);
        self.text.drain(start..end);
        self.cursor_pos -= 1;
        true
    }

    /// Deletes the character after the cursor (delete).
    fn delete_after(&mut self) -> bool {
        if self.cursor_pos >= self.char_count() {
            return false;
        }
        let start = self.byte_position(self.cursor_pos);
        let end = self.byte_position(self.cursor_pos + 1);
        self.text.drain(start..end);
        true
    }

    fn handle_key(&mut self, keysym: u32, modifiers: Modifiers) -> bool {
        let ctrl = modifiers.contains(Modifiers::CTRL);
        match keysym {
            keys::BACKSPACE => self.delete_before(),
            keys::DELETE => self.delete_after(),
            keys::LEFT if ctrl => self.move_to(0),
            keys::LEFT => self.move_to(self.cursor_pos.saturating_sub(1)),
            keys::RIGHT if ctrl => self.move_to(self.char_count()),
            keys::RIGHT => self.move_to(self.cursor_pos + 1),
            keys::HOME => self.move_to(0),
            keys::END => self.move_to(self.char_count()),
            _ => false,
        }
    }

    fn move_to(&mut self, pos: usize) -> bool {
        let pos = pos.min(self.char_count());
        let moved = pos != self.cursor_pos;
        self.cursor_pos = pos;
        moved
    }
}

impl Widget for TextInput {
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
                self.hovered = self.contains(pos.x as i32, pos.y as i32);
                false
            }
            WindowEvent::ButtonPress(MouseButton::Left) if self.hovered => {
                // Clicking places the caret at the end; focus is handled by the dialog.
                self.move_to(self.char_count())
            }
            WindowEvent::TextInput(c) if self.focused => {
                self.insert_char(*c);
                true
            }
            WindowEvent::KeyPress(key_event) if self.focused => {
                self.handle_key(key_event.keysym, key_event.modifiers)
            }
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (bg_color, border_color) = if self.focused {
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
            bg_color,
        );
        canvas.stroke_rounded_rect(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            self.radius,
            border_color,
            1.0,
        );

        let available_width = (self.width as i32 - 2 * self.padding).max(1) as u32;

        // Keep the caret visible by scrolling the text left when it overflows.
        let before_cursor: String = self.text.chars().take(self.cursor_pos).collect();
        let caret_offset = if before_cursor.is_empty() {
            0
        } else {
            font.render(&before_cursor).finish().width() as i32
        };
        let scroll = (caret_offset - available_width as i32 + 2).max(0);

        if !self.text.is_empty() {
            let text_canvas = font.render(&self.text).with_color(colors.text).finish();
            let text_y = self.y + (self.height as i32 - text_canvas.height() as i32) / 2;

            let mut visible = Canvas::new(available_width, text_canvas.height());
            visible.draw_canvas(&text_canvas, -scroll, 0);
            canvas.draw_canvas(&visible, self.x + self.padding, text_y);
        }

        if self.focused {
            let cursor_x = self.x + self.padding + caret_offset - scroll;
            let inset = self.height as f32 * 0.2;
            canvas.fill_rect(
                cursor_x as f32,
                self.y as f32 + inset,
                1.0,
                self.height as f32 - inset * 2.0,
                colors.text,
            );
        }
    }

    fn focusable(&self) -> bool {
        true
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn cursor(&self) -> CursorShape {
        CursorShape::Text
    }

    fn value(&self) -> Option<FieldValue> {
        Some(FieldValue::Text(self.text().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::KeyEvent;

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    fn typed(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input.process_event(&WindowEvent::TextInput(c));
        }
    }

    #[test]
    fn ignores_typing_without_focus() {
        let mut input = TextInput::new(200, 1.0);
        typed(&mut input, "abc");
        assert_eq!(input.text(), "");
    }

    #[test]
    fn edits_at_cursor() {
        let mut input = TextInput::new(200, 1.0);
        input.set_focus(true);
        typed(&mut input, "hllo");
        input.process_event(&key(keys::HOME));
        input.process_event(&key(keys::RIGHT));
        typed(&mut input, "e");
        assert_eq!(input.text(), "hello");

        input.process_event(&key(keys::END));
        input.process_event(&key(keys::BACKSPACE));
        assert_eq!(input.text(), "hell");

        input.process_event(&key(keys::HOME));
        input.process_event(&key(keys::DELETE));
        assert_eq!(input.text(), "ell");
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut input = TextInput::new(200, 1.0);
        input.set_focus(true);
        typed(&mut input, "añb");
        input.process_event(&key(keys::LEFT));
        input.process_event(&key(keys::BACKSPACE));
        assert_eq!(input.text(), "ab");
        assert_eq!(input.value(), Some(FieldValue::Text("ab".into())));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = TextInput::new(200, 1.0);
        input.set_focus(true);
        assert!(!input.process_event(&key(keys::BACKSPACE)));
        assert!(!input.process_event(&key(keys::LEFT)));
        typed(&mut input, "x");
        assert!(!input.process_event(&key(keys::RIGHT)));
        assert!(!input.process_event(&key(keys::DELETE)));
    }

    #[test]
    fn commas_and_quotes_are_kept_verbatim() {
        let mut input = TextInput::new(200, 1.0);
        input.set_focus(true);
        typed(&mut input, "a,\"b\"");
        assert_eq!(input.text(), "a,\"b\"");
    }
}

//! Checkbox with an inline label.

use super::{Widget, px};
use crate::{
    backend::{MouseButton, WindowEvent},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_BOX_SIZE: u32 = 18;
const BASE_LABEL_GAP: u32 = 8;
const BASE_MIN_HEIGHT: u32 = 24;

pub(crate) struct Checkbox {
    label: String,
    checked: bool,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    box_size: u32,
    gap: u32,
    scale: f32,
    hovered: bool,
    focused: bool,
}

impl Checkbox {
    pub fn new(label: &str, checked: bool, font: &Font, scale: f32) -> Self {
        let (text_w, text_h) = font.render(label).measure();
        Self::sized(label, checked, text_w.ceil() as u32, text_h.ceil() as u32, scale)
    }

    fn sized(label: &str, checked: bool, text_w: u32, text_h: u32, scale: f32) -> Self {
        let box_size = px(BASE_BOX_SIZE, scale);
        let gap = px(BASE_LABEL_GAP, scale);
        Self {
            label: label.to_string(),
            checked,
            x: 0,
            y: 0,
            width: box_size + gap + text_w,
            height: text_h.max(box_size).max(px(BASE_MIN_HEIGHT, scale)),
            box_size,
            gap,
            scale,
            hovered: false,
            focused: false,
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    fn toggle(&mut self) -> bool {
        self.checked = !self.checked;
        true
    }
}

impl Widget for Checkbox {
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
                let hovered = self.contains(pos.x as i32, pos.y as i32);
                let changed = hovered != self.hovered;
                self.hovered = hovered;
                changed
            }
            WindowEvent::CursorLeave => {
                let changed = self.hovered;
                self.hovered = false;
                changed
            }
            WindowEvent::ButtonPress(MouseButton::Left) if self.hovered => self.toggle(),
            WindowEvent::TextInput(' ') if self.focused => self.toggle(),
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let box_x = self.x as f32;
        let box_y = self.y as f32 + (self.height - self.box_size) as f32 / 2.0;
        let size = self.box_size as f32;
        let radius = 3.0 * self.scale;

        let border = if self.focused || self.hovered {
            colors.input_border_focused
        } else {
            colors.input_border
        };
        canvas.fill_rounded_rect(box_x, box_y, size, size, radius, colors.input_bg);
        canvas.stroke_rounded_rect(box_x, box_y, size, size, radius, border, 1.0);

        if self.checked {
            let inset = 4.0 * self.scale;
            canvas.fill_rounded_rect(
                box_x + inset,
                box_y + inset,
                size - inset * 2.0,
                size - inset * 2.0,
                2.0 * self.scale,
                colors.accent,
            );
        }

        let text = font.render(&self.label).with_color(colors.text).finish();
        let text_x = self.x + (self.box_size + self.gap) as i32;
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
        Some(FieldValue::Bool(self.is_checked()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CursorPos;

    #[test]
    fn click_toggles() {
        let mut cb = Checkbox::sized("Opt", false, 40, 16, 1.0);
        cb.set_position(10, 10);
        cb.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 15,
            y: 15,
        }));
        assert!(cb.process_event(&WindowEvent::ButtonPress(MouseButton::Left)));
        assert!(cb.is_checked());
        cb.process_event(&WindowEvent::ButtonPress(MouseButton::Left));
        assert_eq!(cb.value(), Some(FieldValue::Bool(false)));
    }

    #[test]
    fn click_outside_is_ignored() {
        let mut cb = Checkbox::sized("Opt", true, 40, 16, 1.0);
        cb.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 500,
            y: 500,
        }));
        assert!(!cb.process_event(&WindowEvent::ButtonPress(MouseButton::Left)));
        assert!(cb.is_checked());
    }

    #[test]
    fn space_toggles_only_when_focused() {
        let mut cb = Checkbox::sized("Opt", false, 40, 16, 1.0);
        cb.process_event(&WindowEvent::TextInput(' '));
        assert!(!cb.is_checked());
        cb.set_focus(true);
        cb.process_event(&WindowEvent::TextInput(' '));
        assert!(cb.is_checked());
    }

    #[test]
    fn layout_includes_box_and_label() {
        let cb = Checkbox::sized("Opt", false, 40, 30, 1.0);
        assert_eq!(cb.width(), BASE_BOX_SIZE + BASE_LABEL_GAP + 40);
        assert_eq!(cb.height(), 30);
    }
}

//! Button widget.

use super::{Widget, point_in_rect, px};
use crate::{
    backend::{MouseButton, WindowEvent},
    render::{Canvas, Font},
    ui::Colors,
};

/// Push button. A click is a left press and release both over the button.
pub(crate) struct Button {
    label: String,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    radius: f32,
    hovered: bool,
    pressed: bool,
    clicked: bool,
}

pub(crate) const BASE_BUTTON_HEIGHT: u32 = 32;
const BASE_BUTTON_PADDING: u32 = 24;
const BASE_BUTTON_RADIUS: f32 = 5.0;
const BASE_MIN_BUTTON_WIDTH: u32 = 80;

impl Button {
    pub fn new(label: &str, font: &Font, scale: f32) -> Self {
        let (text_w, _) = font.render(label).measure();
        Self::sized(label, text_w.ceil() as u32, scale)
    }

    pub(crate) fn sized(label: &str, text_w: u32, scale: f32) -> Self {
        let width = (text_w + px(BASE_BUTTON_PADDING, scale) * 2).max(px(BASE_MIN_BUTTON_WIDTH, scale));
        Self {
            label: label.to_string(),
            x: 0,
            y: 0,
            width,
            height: px(BASE_BUTTON_HEIGHT, scale),
            radius: BASE_BUTTON_RADIUS * scale,
            hovered: false,
            pressed: false,
            clicked: false,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Returns true if the button was clicked this frame.
    pub fn was_clicked(&mut self) -> bool {
        let clicked = self.clicked;
        self.clicked = false;
        clicked
    }
}

impl Widget for Button {
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
                let hovered = point_in_rect(
                    pos.x as i32,
                    pos.y as i32,
                    self.x,
                    self.y,
                    self.width,
                    self.height,
                );
                let changed = hovered != self.hovered;
                self.hovered = hovered;
                changed
            }
            WindowEvent::CursorLeave => {
                self.hovered = false;
                self.pressed = false;
                true
            }
            WindowEvent::ButtonPress(MouseButton::Left) if self.hovered => {
                self.pressed = true;
                true
            }
            WindowEvent::ButtonRelease(MouseButton::Left) => {
                if self.pressed && self.hovered {
                    self.clicked = true;
                }
                let was_pressed = self.pressed;
                self.pressed = false;
                was_pressed
            }
            _ => false,
        }
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let bg_color = if self.pressed {
            colors.button_pressed
        } else if self.hovered {
            colors.button_hover
        } else {
            colors.button
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
            colors.button_outline,
            1.0,
        );

        let text_canvas = font
            .render(&self.label)
            .with_color(colors.button_text)
            .finish();
        let text_x = self.x + (self.width as i32 - text_canvas.width() as i32) / 2;
        let text_y = self.y + (self.height as i32 - text_canvas.height() as i32) / 2;
        canvas.draw_canvas(&text_canvas, text_x, text_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CursorPos;

    fn hover(button: &mut Button, x: i16, y: i16) {
        button.process_event(&WindowEvent::CursorMove(CursorPos { x, y }));
    }

    #[test]
    fn press_and_release_inside_clicks_once() {
        let mut ok = Button::sized("OK", 20, 1.0);
        hover(&mut ok, 5, 5);
        ok.process_event(&WindowEvent::ButtonPress(MouseButton::Left));
        ok.process_event(&WindowEvent::ButtonRelease(MouseButton::Left));
        assert!(ok.was_clicked());
        assert!(!ok.was_clicked());
    }

    #[test]
    fn release_outside_does_not_click() {
        let mut ok = Button::sized("OK", 20, 1.0);
        hover(&mut ok, 5, 5);
        ok.process_event(&WindowEvent::ButtonPress(MouseButton::Left));
        hover(&mut ok, 500, 500);
        ok.process_event(&WindowEvent::ButtonRelease(MouseButton::Left));
        assert!(!ok.was_clicked());
    }

    #[test]
    fn short_labels_get_minimum_width() {
        assert_eq!(Button::sized("OK", 10, 1.0).width(), BASE_MIN_BUTTON_WIDTH);
        assert_eq!(Button::sized("OK", 10, 2.0).height(), BASE_BUTTON_HEIGHT * 2);
        let wide = Button::sized("Cancel everything", 200, 1.0);
        assert_eq!(wide.width(), 200 + BASE_BUTTON_PADDING * 2);
    }
}

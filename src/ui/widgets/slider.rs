//! Horizontal slider over an integer range.

use super::{Bounded, Widget, point_in_rect, px};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keys},
    render::{Canvas, Font},
    ui::{Colors, FieldValue},
};

const BASE_TRACK_WIDTH: u32 = 260;
const BASE_TRACK_HEIGHT: u32 = 6;
const BASE_THUMB_SIZE: u32 = 20;
const BASE_VALUE_GAP: u32 = 12;

pub(crate) struct Slider {
    range: Bounded,
    x: i32,
    y: i32,
    track_width: u32,
    track_height: u32,
    thumb: u32,
    value_gap: u32,
    value_width: u32,
    height: u32,
    cursor: (i32, i32),
    thumb_hovered: bool,
    dragging: bool,
    focused: bool,
}

/// Maps a cursor x position to a 0..=1 ratio along a track whose thumb centre
/// travels from `start` to `start + travel`.
pub(crate) fn ratio_at(x: i32, start: i32, travel: u32) -> f32 {
    if travel == 0 {
        return 0.0;
    }
    ((x - start) as f32 / travel as f32).clamp(0.0, 1.0)
}

impl Slider {
    pub fn new(range: Bounded, font: &Font, scale: f32) -> Self {
        let widest = [range.min(), range.max()]
            .iter()
            .map(|v| font.render(&v.to_string()).measure())
            .fold((0.0f32, 0.0f32), |acc, (w, h)| (acc.0.max(w), acc.1.max(h)));
        Self::sized(range, widest.0.ceil() as u32, widest.1.ceil() as u32, scale)
    }

    fn sized(range: Bounded, value_width: u32, text_height: u32, scale: f32) -> Self {
        let thumb = px(BASE_THUMB_SIZE, scale);
        Self {
            range,
            x: 0,
            y: 0,
            track_width: px(BASE_TRACK_WIDTH, scale),
            track_height: px(BASE_TRACK_HEIGHT, scale).max(2),
            thumb,
            value_gap: px(BASE_VALUE_GAP, scale),
            value_width,
            height: thumb.max(text_height),
            cursor: (0, 0),
            thumb_hovered: false,
            dragging: false,
            focused: false,
        }
    }

    fn travel(&self) -> u32 {
        self.track_width.saturating_sub(self.thumb)
    }

    fn thumb_x(&self) -> i32 {
        self.x + (self.range.ratio() * self.travel() as f32) as i32
    }

    fn thumb_y(&self) -> i32 {
        self.y + (self.height as i32 - self.thumb as i32) / 2
    }

    fn set_from_cursor(&mut self) -> bool {
        let start = self.x + self.thumb as i32 / 2;
        let ratio = ratio_at(self.cursor.0, start, self.travel());
        let value = self.range.at_ratio(ratio);
        self.range.set(value)
    }

    fn on_track(&self, cx: i32, cy: i32) -> bool {
        point_in_rect(cx, cy, self.x, self.y, self.track_width, self.height)
    }
}

impl Widget for Slider {
    fn width(&self) -> u32 {
        self.track_width + self.value_gap + self.value_width
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
                if self.dragging {
                    return self.set_from_cursor();
                }
                let hovered = point_in_rect(
                    self.cursor.0,
                    self.cursor.1,
                    self.thumb_x(),
                    self.thumb_y(),
                    self.thumb,
                    self.thumb,
                );
                let changed = hovered != self.thumb_hovered;
                self.thumb_hovered = hovered;
                changed
            }
            WindowEvent::ButtonPress(MouseButton::Left)
                if self.on_track(self.cursor.0, self.cursor.1) =>
            {
                self.dragging = true;
                self.set_from_cursor();
                true
            }
            WindowEvent::ButtonRelease(MouseButton::Left) if self.dragging => {
                self.dragging = false;
                true
            }
            WindowEvent::Scroll(direction) if self.on_track(self.cursor.0, self.cursor.1) => {
                match direction {
                    ScrollDirection::Up | ScrollDirection::Right => self.range.step(1),
                    ScrollDirection::Down | ScrollDirection::Left => self.range.step(-1),
                }
            }
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
        let track_y = self.y as f32 + (self.height - self.track_height) as f32 / 2.0;
        let track_r = self.track_height as f32 / 2.0;
        canvas.fill_rounded_rect(
            self.x as f32,
            track_y,
            self.track_width as f32,
            self.track_height as f32,
            track_r,
            colors.input_bg.darken(0.1),
        );

        let thumb_x = self.thumb_x();
        let filled = (thumb_x - self.x) as f32 + self.thumb as f32 / 2.0;
        if filled > 0.0 {
            canvas.fill_rounded_rect(
                self.x as f32,
                track_y,
                filled,
                self.track_height as f32,
                track_r,
                colors.accent,
            );
        }

        let thumb_color = if self.dragging {
            colors.button_pressed
        } else if self.thumb_hovered {
            colors.button_hover
        } else {
            colors.button
        };
        let r = self.thumb as f32 / 2.0;
        let cx = thumb_x as f32 + r;
        let cy = self.thumb_y() as f32 + r;
        canvas.fill_circle(cx, cy, r, thumb_color);
        let outline = if self.focused {
            colors.input_border_focused
        } else {
            colors.button_outline
        };
        canvas.stroke_circle(cx, cy, r - 0.5, outline, 1.0);

        let text = font
            .render(&self.range.value().to_string())
            .with_color(colors.text)
            .finish();
        let text_x = self.x + (self.track_width + self.value_gap) as i32;
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
        Some(FieldValue::Int(self.range.value()))
    }
}

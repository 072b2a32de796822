//! Static picture, or a placeholder when the file cannot be decoded.

use std::path::Path;

use image::RgbaImage;

use super::{Widget, px};
use crate::{
    backend::WindowEvent,
    render::{Canvas, Font},
    ui::{
        Colors,
        media::{self, MAX_NATURAL_SIZE},
    },
};

const BASE_PLACEHOLDER_PADDING: u32 = 12;

pub(crate) enum Picture {
    Image(Canvas),
    /// Text shown in a framed box instead of the picture.
    Missing(String),
}

pub(crate) struct ImageView {
    picture: Picture,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    padding: u32,
}

impl ImageView {
    /// `image` is `None` when decoding failed; a placeholder naming `path` is shown instead.
    pub fn open(
        path: &Path,
        image: Option<&RgbaImage>,
        size: Option<(u32, u32)>,
        font: &Font,
        scale: f32,
    ) -> Self {
        let picture = image
            .and_then(|image| {
                let (w, h) = media::display_size(image.dimensions(), size, MAX_NATURAL_SIZE);
                media::to_canvas(image, (px(w, scale), px(h, scale)))
            })
            .map(Picture::Image)
            .unwrap_or_else(|| Picture::Missing(format!("Cannot load image: {}", path.display())));
        Self::with_picture(picture, font, scale)
    }

    pub(crate) fn with_picture(picture: Picture, font: &Font, scale: f32) -> Self {
        let padding = px(BASE_PLACEHOLDER_PADDING, scale);
        let (width, height) = match &picture {
            Picture::Image(canvas) => (canvas.width(), canvas.height()),
            Picture::Missing(text) => {
                let (w, h) = font.render(text).measure();
                (w.ceil() as u32 + padding * 2, h.ceil() as u32 + padding * 2)
            }
        };
        Self {
            picture,
            x: 0,
            y: 0,
            width,
            height,
            padding,
        }
    }
}

impl Widget for ImageView {
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

    fn process_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    fn draw_to(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        draw_picture(canvas, &self.picture, self.x, self.y, self.width, self.height, self.padding, colors, font);
    }
}

/// Draws a picture or its placeholder into the given box.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_picture(
    canvas: &mut Canvas,
    picture: &Picture,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    padding: u32,
    colors: &Colors,
    font: &Font,
) {
    match picture {
        Picture::Image(image) => canvas.draw_canvas(image, x, y),
        Picture::Missing(text) => {
            canvas.stroke_rounded_rect(
                x as f32,
                y as f32,
                width as f32,
                height as f32,
                4.0,
                colors.input_border,
                1.0,
            );
            let label = font.render(text).with_color(colors.muted_text).finish();
            canvas.draw_canvas(&label, x + padding as i32, y + padding as i32);
        }
    }
}

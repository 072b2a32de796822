mod text;

pub(crate) use text::Font;
use tiny_skia::{Color, IntSize, LineCap, Paint, PathBuilder, Pixmap, PixmapRef, Rect, Transform};

/// A canvas backed by a tiny-skia Pixmap.
/// Stores pixels in RGBA format internally, but can convert to ARGB for X11/Wayland.
pub struct Canvas {
    pub(crate) pixmap: Pixmap,
}

/// Upper bound on either side of a canvas, in device pixels.
pub(crate) const MAX_SIDE: u32 = 16384;

impl Canvas {
    /// Creates a transparent canvas. Each side is clamped to `1..=MAX_SIDE`,
    /// which always yields a valid pixmap size.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.clamp(1, MAX_SIDE), height.clamp(1, MAX_SIDE));
        Self {
            pixmap: Pixmap::new(width, height).expect("clamped canvas size is valid"),
        }
    }

    /// Builds a canvas from straight (non-premultiplied) RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        let mut data = Vec::with_capacity(rgba.len());
        for px in rgba.chunks_exact(4) {
            let a = px[3] as u32;
            data.push((px[0] as u32 * a / 255) as u8);
            data.push((px[1] as u32 * a / 255) as u8);
            data.push((px[2] as u32 * a / 255) as u8);
            data.push(px[3]);
        }
        let size = IntSize::from_wh(width, height)?;
        Some(Self {
            pixmap: Pixmap::from_vec(data, size)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills a rectangle with a color.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let rect = match Rect::from_xywh(x, y, w, h) {
            Some(r) => r,
            None => return,
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Fills a rounded rectangle with a color.
    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Strokes a rounded rectangle outline.
    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        color: Rgba,
        width: f32,
    ) {
        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Fills a circle centred on (cx, cy).
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Fills a closed polygon through `points`.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        for &(x, y) in rest {
            pb.line_to(x, y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Strokes a circle outline centred on (cx, cy).
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba, width: f32) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draws a straight line with round caps.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        pb.line_to(x1, y1);
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width,
            line_cap: LineCap::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draws another canvas onto this one at the given position.
    pub fn draw_canvas(&mut self, other: &Canvas, x: i32, y: i32) {
        self.draw_pixmap(other.pixmap.as_ref(), x, y);
    }

    /// Draws a pixmap onto this canvas at the given position.
    pub fn draw_pixmap(&mut self, src: PixmapRef, x: i32, y: i32) {
        self.pixmap.draw_pixmap(
            x,
            y,
            src,
            &tiny_skia::PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Returns the pixel data as ARGB (for X11/Wayland compatibility).
    /// The returned Vec has premultiplied alpha in ARGB format.
    pub fn as_argb(&self) -> Vec<u8> {
        let data = self.pixmap.data();
        let mut argb = Vec::with_capacity(data.len());

        // Convert RGBA to ARGB (premultiplied)
        for chunk in data.chunks_exact(4) {
            let r = chunk[0];
            let g = chunk[1];
            let b = chunk[2];
            let a = chunk[3];
            // ARGB order: B, G, R, A (little-endian u32)
            argb.push(b);
            argb.push(g);
            argb.push(r);
            argb.push(a);
        }

        argb
    }

    /// Fills a dialog background with subtle shadow and border.
    pub fn fill_dialog_bg(
        &mut self,
        width: f32,
        height: f32,
        bg_color: Rgba,
        border_color: Rgba,
        shadow_color: Rgba,
        radius: f32,
    ) {
        let shadow_offset = 3.0;
        let border_width = 1.0;

        // Draw shadow (slightly smaller to be fully covered by background)
        self.fill_rounded_rect(
            shadow_offset,
            shadow_offset,
            width - shadow_offset,
            height - shadow_offset,
            radius,
            shadow_color,
        );

        // Draw main background (covers shadow completely)
        self.fill_rounded_rect(0.0, 0.0, width, height, radius, bg_color);

        // Draw border (inset by half border width)
        let inset = border_width * 0.5;
        self.stroke_rounded_rect(
            inset,
            inset,
            width - inset * 2.0,
            height - inset * 2.0,
            radius,
            border_color,
            border_width,
        );
    }
}

/// Creates a rounded rectangle path.
fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();

    // Clamp radius to half the smallest dimension
    let r = r.min(w / 2.0).min(h / 2.0);

    // Top-left corner
    pb.move_to(x + r, y);
    // Top edge
    pb.line_to(x + w - r, y);
    // Top-right corner
    pb.quad_to(x + w, y, x + w, y + r);
    // Right edge
    pb.line_to(x + w, y + h - r);
    // Bottom-right corner
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    // Bottom edge
    pb.line_to(x + r, y + h);
    // Bottom-left corner
    pb.quad_to(x, y + h, x, y + h - r);
    // Left edge
    pb.line_to(x, y + r);
    // Top-left corner
    pb.quad_to(x, y, x + r, y);

    pb.close();
    pb.finish()
}

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a,
        }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: 255,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self {
            a,
            ..self
        }
    }

    /// Scales the colour channels towards black by `amount` (0.0..=1.0).
    pub fn darken(self, amount: f32) -> Self {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * k) as u8,
            g: (self.g as f32 * k) as u8,
            b: (self.b as f32 * k) as u8,
            a: self.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

/// Convenience function to create an RGB color.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    Rgba::rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_sizes_are_clamped() {
        let wide = Canvas::new(600_000_000, 1);
        assert_eq!((wide.width(), wide.height()), (MAX_SIDE, 1));
        let empty = Canvas::new(0, 0);
        assert_eq!((empty.width(), empty.height()), (1, 1));
    }

    #[test]
    fn from_rgba8_premultiplies() {
        let canvas = Canvas::from_rgba8(1, 1, &[200, 100, 50, 128]).unwrap();
        let px = canvas.pixmap.pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), (200u32 * 128 / 255) as u8);
        assert_eq!(px.blue(), (50u32 * 128 / 255) as u8);
    }

    #[test]
    fn from_rgba8_rejects_short_buffers() {
        assert!(Canvas::from_rgba8(2, 2, &[0; 12]).is_none());
    }

    #[test]
    fn zero_sized_canvas_is_bumped() {
        let canvas = Canvas::new(0, 0);
        assert_eq!((canvas.width(), canvas.height()), (1, 1));
    }

    #[test]
    fn darken_keeps_alpha() {
        let c = Rgba::new(100, 200, 50, 77).darken(0.5);
        assert_eq!(c, Rgba::new(50, 100, 25, 77));
    }

    #[test]
    fn polygon_fills_interior_only() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_polygon(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)], rgb(255, 0, 0));
        assert_eq!(canvas.pixmap.pixel(1, 1).unwrap().alpha(), 255);
        assert_eq!(canvas.pixmap.pixel(9, 9).unwrap().alpha(), 0);
    }

    #[test]
    fn empty_polygon_is_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_polygon(&[], rgb(255, 0, 0));
        assert_eq!(canvas.pixmap.pixel(0, 0).unwrap().alpha(), 0);
    }
}

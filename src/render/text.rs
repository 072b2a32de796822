use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use ab_glyph::{point, Font as _, FontArc, Glyph, OutlinedGlyph, PxScaleFont, ScaleFont};
use tiny_skia::{Pixmap, PremultipliedColorU8};

use super::{rgb, Canvas, Rgba};
use crate::error::Error;

/// Environment variable naming an explicit font file.
pub(crate) const FONT_ENV: &str = "ZENITY_FORMS_FONT";

/// File stems tried first, in order, when scanning font directories.
const PREFERRED: &[&str] = &[
    "Cantarell-Regular",
    "DejaVuSans",
    "NotoSans-Regular",
    "LiberationSans-Regular",
    "FreeSans",
    "Arial",
];

const SEARCH_DEPTH: usize = 5;

pub struct Font {
    font: PxScaleFont<FontArc>,
}

const BASE_FONT_SIZE: f32 = 18.0;

impl Font {
    /// Loads the system UI font with the given scale factor for crisp rendering.
    pub fn load(scale: f32) -> Result<Self, Error> {
        let inner = system_font().ok_or(Error::NoFont)?;
        Ok(Self {
            font: inner.into_scaled(BASE_FONT_SIZE * scale),
        })
    }

    /// Horizontal advance of a single line of text, including kerning.
    pub fn advance(&self, text: &str) -> f32 {
        let mut last = None;
        let mut x = 0.0;
        for c in text.chars() {
            let id = self.font.glyph_id(c);
            if let Some(last) = last {
                x += self.font.kern(last, id);
            }
            x += self.font.h_advance(id);
            last = Some(id);
        }
        x
    }

    /// Height of one line of text, including the line gap.
    pub fn line_height(&self) -> f32 {
        self.font.height() + self.font.line_gap()
    }

    /// Returns a renderer for the given text.
    pub fn render<'a>(&'a self, text: &'a str) -> TextRenderer<'a> {
        TextRenderer {
            font: self,
            text,
            color: rgb(255, 255, 255),
            max_width: f32::MAX,
        }
    }
}

pub struct TextRenderer<'a> {
    font: &'a Font,
    text: &'a str,
    color: Rgba,
    max_width: f32,
}

impl<'a> TextRenderer<'a> {
    pub fn with_color(self, color: Rgba) -> Self {
        Self {
            color,
            ..self
        }
    }

    pub fn with_max_width(self, max_width: f32) -> Self {
        Self {
            max_width,
            ..self
        }
    }

    /// Renders the text and returns a Canvas containing it.
    pub fn finish(self) -> Canvas {
        let glyphs = self.layout();

        if glyphs.is_empty() {
            return Canvas::new(1, 1);
        }

        let bounds = glyphs
            .iter()
            .map(|g| g.px_bounds())
            .reduce(|mut sum, next| {
                sum.min.x = f32::min(sum.min.x, next.min.x);
                sum.min.y = f32::min(sum.min.y, next.min.y);
                sum.max.x = f32::max(sum.max.x, next.max.x);
                sum.max.y = f32::max(sum.max.y, next.max.y);
                sum
            })
            .unwrap_or_default();

        // Add padding to avoid clipping
        let width = (bounds.width().ceil() as u32 + 2).max(1);
        let height = (bounds.height().ceil() as u32 + 2).max(1);

        let Some(mut pixmap) = Pixmap::new(width, height) else {
            return Canvas::new(1, 1);
        };
        let pixels = pixmap.pixels_mut();

        // Offset to account for bounds.min (which can be negative for some glyphs)
        let base_x = -bounds.min.x.floor() as i32 + 1;
        let base_y = -bounds.min.y.floor() as i32 + 1;

        for g in glyphs {
            let glyph_bounds = g.px_bounds();
            // Use floor for proper pixel alignment
            let gx = glyph_bounds.min.x.floor() as i32 + base_x;
            let gy = glyph_bounds.min.y.floor() as i32 + base_y;

            g.draw(|x, y, c| {
                let px = gx + x as i32;
                let py = gy + y as i32;

                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    let idx = (py as u32 * width + px as u32) as usize;
                    if let Some(pix) = pixels.get_mut(idx) {
                        // Premultiplied alpha blending
                        let a = (c * 255.0).round() as u8;
                        if a > 0 {
                            let r = (self.color.r as u32 * a as u32 / 255) as u8;
                            let g = (self.color.g as u32 * a as u32 / 255) as u8;
                            let b = (self.color.b as u32 * a as u32 / 255) as u8;

                            // Blend with existing pixel (SrcOver)
                            let existing = *pix;
                            if existing.alpha() == 0 {
                                if let Some(c) = PremultipliedColorU8::from_rgba(r, g, b, a) {
                                    *pix = c;
                                }
                            } else {
                                // Alpha composite
                                let ea = existing.alpha() as u32;
                                let er = existing.red() as u32;
                                let eg = existing.green() as u32;
                                let eb = existing.blue() as u32;

                                let inv_a = 255 - a as u32;
                                let out_a = (a as u32 + ea * inv_a / 255).min(255) as u8;
                                let out_r = (r as u32 + er * inv_a / 255).min(255) as u8;
                                let out_g = (g as u32 + eg * inv_a / 255).min(255) as u8;
                                let out_b = (b as u32 + eb * inv_a / 255).min(255) as u8;

                                if let Some(c) = PremultipliedColorU8::from_rgba(
                                    out_r, out_g, out_b, out_a,
                                ) {
                                    *pix = c;
                                }
                            }
                        }
                    }
                }
            });
        }

        Canvas {
            pixmap,
        }
    }

    /// Computes the size of the rendered text without actually rendering it.
    pub fn measure(&self) -> (f32, f32) {
        let glyphs = self.layout();

        let bounds = glyphs
            .iter()
            .map(|g| g.px_bounds())
            .reduce(|mut sum, next| {
                sum.min.x = f32::min(sum.min.x, next.min.x);
                sum.min.y = f32::min(sum.min.y, next.min.y);
                sum.max.x = f32::max(sum.max.x, next.max.x);
                sum.max.y = f32::max(sum.max.y, next.max.y);
                sum
            })
            .unwrap_or_default();

        (bounds.width(), bounds.height())
    }

    /// Performs text layout with soft wrapping.
    fn layout(&self) -> Vec<OutlinedGlyph> {
        let mut glyphs: Vec<Glyph> = Vec::new();

        let mut y: f32 = 0.0;
        for line in self.text.lines() {
            let mut x: f32 = 0.0;
            let mut last_softbreak: Option<usize> = None;
            let mut last = None;

            for c in line.chars() {
                let mut glyph = self.font.font.scaled_glyph(c);
                if let Some(last) = last {
                    x += self.font.font.kern(last, glyph.id);
                }
                // Round positions to pixel boundaries for crisp text
                glyph.position = point(x.round(), y.round());
                last = Some(glyph.id);

                x += self.font.font.h_advance(glyph.id);

                if c == ' ' || c == ZWSP {
                    last_softbreak = Some(glyphs.len());
                } else {
                    glyphs.push(glyph);

                    if x > self.max_width {
                        if let Some(i) = last_softbreak {
                            // Soft line break
                            y += self.font.line_height();
                            let x_diff = glyphs.get(i).map(|g| g.position.x).unwrap_or(0.0);
                            for glyph in &mut glyphs[i..] {
                                glyph.position.x -= x_diff;
                                glyph.position.y = y;
                            }
                            x -= x_diff;
                            last_softbreak = None;
                        }
                    }
                }
            }
            y += self.font.line_height();
        }

        glyphs
            .into_iter()
            .filter_map(|g| self.font.font.outline_glyph(g))
            .collect()
    }
}

const ZWSP: char = '\u{200b}';

/// Returns the process-wide UI font, discovering it on first use.
fn system_font() -> Option<FontArc> {
    static FONT: OnceLock<Option<FontArc>> = OnceLock::new();
    FONT.get_or_init(discover_font).clone()
}

fn discover_font() -> Option<FontArc> {
    if let Some(path) = std::env::var_os(FONT_ENV) {
        let path = PathBuf::from(path);
        match load_font_file(&path) {
            Some(font) => return Some(font),
            None => tracing::warn!("{FONT_ENV}={} is not a usable font", path.display()),
        }
    }

    let mut roots: Vec<PathBuf> = Vec::new();
    roots.extend(dirs::font_dir());
    roots.push(PathBuf::from("/usr/share/fonts"));
    roots.push(PathBuf::from("/usr/local/share/fonts"));

    let mut candidates = Vec::new();
    for root in &roots {
        collect_font_files(root, SEARCH_DEPTH, &mut candidates);
    }
    candidates.sort();

    for path in rank_candidates(candidates) {
        if let Some(font) = load_font_file(&path) {
            tracing::debug!(font = %path.display(), "loaded UI font");
            return Some(font);
        }
    }
    None
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    FontArc::try_from_vec(data).ok()
}

fn collect_font_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if depth > 0 {
                collect_font_files(&path, depth - 1, out);
            }
        } else if is_font_file(&path) {
            out.push(path);
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
}

/// Orders font files so preferred families come first, in preference order.
fn rank_candidates(mut candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    let rank = |path: &PathBuf| {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        PREFERRED.iter().position(|p| *p == stem).unwrap_or(PREFERRED.len())
    };
    candidates.sort_by_key(rank);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_fonts_sort_first() {
        let ranked = rank_candidates(vec![
            PathBuf::from("/f/Zzz.ttf"),
            PathBuf::from("/f/DejaVuSans.ttf"),
            PathBuf::from("/f/Cantarell-Regular.otf"),
        ]);
        assert_eq!(ranked[0], PathBuf::from("/f/Cantarell-Regular.otf"));
        assert_eq!(ranked[1], PathBuf::from("/f/DejaVuSans.ttf"));
        assert_eq!(ranked[2], PathBuf::from("/f/Zzz.ttf"));
    }

    #[test]
    fn font_extensions() {
        assert!(is_font_file(Path::new("a/B.TTF")));
        assert!(is_font_file(Path::new("a/b.otf")));
        assert!(!is_font_file(Path::new("a/b.pcf.gz")));
        assert!(!is_font_file(Path::new("a/ttf")));
    }

    #[test]
    fn unreadable_font_file_is_skipped() {
        assert!(load_font_file(Path::new("/nonexistent/font.ttf")).is_none());
    }
}

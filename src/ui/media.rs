//! Still and animated image loading.

use std::{fs::File, io::BufReader, path::Path, time::Duration};

use image::{
    AnimationDecoder, ImageFormat, ImageReader, RgbaImage,
    codecs::gif::GifDecoder,
    imageops::{self, FilterType},
};

use crate::{
    cli::MAX_DIMENSION,
    error::Error,
    render::{Canvas, MAX_SIDE},
};

/// Largest logical size an image is shown at when no explicit size is given.
pub(crate) const MAX_NATURAL_SIZE: (u32, u32) = (800, 600);

/// GIF delays below this are treated as "unspecified", as browsers do.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// One decoded animation frame.
pub(crate) struct Frame {
    pub image: RgbaImage,
    pub delay: Duration,
}

/// Decodes a still image, detecting the format from the file contents.
pub(crate) fn load_image(path: &Path) -> Result<RgbaImage, Error> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image.to_rgba8())
}

/// Decodes every frame of an animated GIF. Other formats yield a single frame.
pub(crate) fn load_frames(path: &Path) -> Result<Vec<Frame>, Error> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;

    if reader.format() == Some(ImageFormat::Gif) {
        let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
        let frames = decoder.into_frames().collect_frames()?;
        if !frames.is_empty() {
            tracing::debug!(path = %path.display(), frames = frames.len(), "decoded animation");
            return Ok(frames
                .into_iter()
                .map(|f| Frame {
                    delay: frame_delay(Duration::from(f.delay())),
                    image: f.into_buffer(),
                })
                .collect());
        }
    }

    let image = reader.decode()?.to_rgba8();
    Ok(vec![Frame {
        image,
        delay: Duration::ZERO,
    }])
}

fn frame_delay(delay: Duration) -> Duration {
    if delay < MIN_FRAME_DELAY {
        DEFAULT_FRAME_DELAY
    } else {
        delay
    }
}

/// Logical display size for a picture of `natural` size.
///
/// An explicit `requested` size wins; a zero in one dimension is derived from
/// the aspect ratio. Without a request, the natural size is shrunk to fit
/// `cap`, never enlarged.
pub(crate) fn display_size(
    natural: (u32, u32),
    requested: Option<(u32, u32)>,
    cap: (u32, u32),
) -> (u32, u32) {
    let (nw, nh) = (natural.0.max(1), natural.1.max(1));
    let (w, h) = match requested {
        Some((0, 0)) | None => {
            let k = (cap.0 as f32 / nw as f32).min(cap.1 as f32 / nh as f32).min(1.0);
            (
                ((nw as f32 * k).round() as u32).max(1),
                ((nh as f32 * k).round() as u32).max(1),
            )
        }
        Some((w, 0)) => (w, ((nh as f32 * w as f32 / nw as f32).round() as u32).max(1)),
        Some((0, h)) => (((nw as f32 * h as f32 / nh as f32).round() as u32).max(1), h),
        Some(size) => size,
    };
    (w.min(MAX_DIMENSION), h.min(MAX_DIMENSION))
}

/// Resizes `image` to exactly `size` and converts it to a canvas.
pub(crate) fn to_canvas(image: &RgbaImage, size: (u32, u32)) -> Option<Canvas> {
    let (w, h) = (size.0.clamp(1, MAX_SIDE), size.1.clamp(1, MAX_SIDE));
    if image.dimensions() == (w, h) {
        return Canvas::from_rgba8(w, h, image.as_raw());
    }
    let resized = imageops::resize(image, w, h, FilterType::Triangle);
    Canvas::from_rgba8(w, h, resized.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_requests_are_capped() {
        assert_eq!(
            display_size((10, 10), Some((600_000_000, 5)), MAX_NATURAL_SIZE),
            (MAX_DIMENSION, 5)
        );
        assert_eq!(
            display_size((1, 1000), Some((MAX_DIMENSION, 0)), MAX_NATURAL_SIZE),
            (MAX_DIMENSION, MAX_DIMENSION)
        );
    }

    #[test]
    fn explicit_size_wins() {
        assert_eq!(display_size((100, 50), Some((30, 40)), (10, 10)), (30, 40));
    }

    #[test]
    fn zero_dimension_keeps_aspect() {
        assert_eq!(display_size((200, 100), Some((50, 0)), MAX_NATURAL_SIZE), (50, 25));
        assert_eq!(display_size((200, 100), Some((0, 50)), MAX_NATURAL_SIZE), (100, 50));
    }

    #[test]
    fn natural_size_is_capped_not_enlarged() {
        assert_eq!(display_size((100, 80), None, MAX_NATURAL_SIZE), (100, 80));
        assert_eq!(display_size((1600, 600), None, MAX_NATURAL_SIZE), (800, 300));
    }

    #[test]
    fn tiny_gif_delays_use_default() {
        assert_eq!(frame_delay(Duration::ZERO), DEFAULT_FRAME_DELAY);
        assert_eq!(frame_delay(Duration::from_millis(70)), Duration::from_millis(70));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_image(Path::new("/nonexistent/picture.png")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn canvas_conversion_resizes() {
        let image = RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        let canvas = to_canvas(&image, (8, 4)).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (8, 4));
    }

    #[test]
    fn still_png_decodes_as_one_frame() {
        let dir = tempfile_dir();
        let path = dir.join("one.png");
        RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 255, 255]))
            .save(&path)
            .unwrap();
        let frames = load_frames(&path).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].image.dimensions(), (3, 3));
        std::fs::remove_file(&path).ok();
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("zenity-forms-media-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

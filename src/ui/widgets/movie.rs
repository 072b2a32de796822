//! Looping animated picture.

use std::{
    path::Path,
    time::{Duration, Instant},
};

use super::{
    Widget,
    image_view::{Picture, draw_picture},
    px,
};
use crate::{
    backend::WindowEvent,
    render::{Canvas, Font},
    ui::{
        Colors,
        media::{self, Frame, MAX_NATURAL_SIZE},
    },
};

const BASE_PLACEHOLDER_PADDING: u32 = 12;

/// Tracks which frame is showing and when the next one is due.
#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    delays: Vec<Duration>,
    current: usize,
    due: Instant,
}

impl FrameClock {
    pub fn new(delays: Vec<Duration>, start: Instant) -> Self {
        let first = delays.first().copied().unwrap_or_default();
        Self {
            delays,
            current: 0,
            due: start + first,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Deadline for the next frame, or `None` for a still picture.
    pub fn next_due(&self) -> Option<Instant> {
        (self.delays.len() > 1).then_some(self.due)
    }

    /// Moves to the frame that should be showing at `now`. Returns true if it changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.delays.len() <= 1 || now < self.due {
            return false;
        }

        let cycle: Duration = self.delays.iter().sum();
        if now.duration_since(self.due) > cycle {
            // Fell far behind (e.g. the process was stopped): resync instead of replaying.
            self.current = (self.current + 1) % self.delays.len();
            self.due = now + self.delays[self.current];
            return true;
        }

        while now >= self.due {
            self.current = (self.current + 1) % self.delays.len();
            self.due += self.delays[self.current];
        }
        true
    }
}

pub(crate) struct Movie {
    frames: Vec<Canvas>,
    clock: FrameClock,
    placeholder: Option<Picture>,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    padding: u32,
}

impl Movie {
    /// An empty `decoded` shows a placeholder naming `path`.
    pub fn open(
        path: &Path,
        decoded: &[Frame],
        size: Option<(u32, u32)>,
        font: &Font,
        scale: f32,
    ) -> Self {
        let padding = px(BASE_PLACEHOLDER_PADDING, scale);
        let mut frames = Vec::with_capacity(decoded.len());
        let mut delays = Vec::with_capacity(decoded.len());
        if let Some(first) = decoded.first() {
            let (w, h) = media::display_size(first.image.dimensions(), size, MAX_NATURAL_SIZE);
            let target = (px(w, scale), px(h, scale));
            for frame in decoded {
                if let Some(canvas) = media::to_canvas(&frame.image, target) {
                    frames.push(canvas);
                    delays.push(frame.delay);
                }
            }
        }

        if frames.is_empty() {
            let text = format!("Cannot load movie: {}", path.display());
            let (w, h) = font.render(&text).measure();
            return Self {
                frames,
                clock: FrameClock::new(Vec::new(), Instant::now()),
                placeholder: Some(Picture::Missing(text)),
                x: 0,
                y: 0,
                width: w.ceil() as u32 + padding * 2,
                height: h.ceil() as u32 + padding * 2,
                padding,
            };
        }

        let (width, height) = (frames[0].width(), frames[0].height());
        Self {
            frames,
            clock: FrameClock::new(delays, Instant::now()),
            placeholder: None,
            x: 0,
            y: 0,
            width,
            height,
            padding,
        }
    }
}

impl Widget for Movie {
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
        if let Some(placeholder) = &self.placeholder {
            draw_picture(canvas, placeholder, self.x, self.y, self.width, self.height, self.padding, colors, font);
        } else if let Some(frame) = self.frames.get(self.clock.current()) {
            canvas.draw_canvas(frame, self.x, self.y);
        }
    }

    fn next_tick(&self) -> Option<Instant> {
        self.clock.next_due()
    }

    fn tick(&mut self, now: Instant) -> bool {
        self.clock.advance(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn still_picture_never_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::new(vec![Duration::ZERO], start);
        assert_eq!(clock.next_due(), None);
        assert!(!clock.advance(start + ms(1000)));
    }

    #[test]
    fn frames_follow_their_delays() {
        let start = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100), ms(50), ms(200)], start);
        assert_eq!(clock.next_due(), Some(start + ms(100)));

        assert!(!clock.advance(start + ms(99)));
        assert!(clock.advance(start + ms(100)));
        assert_eq!(clock.current(), 1);

        // Skips frame 1 entirely when late.
        assert!(clock.advance(start + ms(160)));
        assert_eq!(clock.current(), 2);
        assert_eq!(clock.next_due(), Some(start + ms(350)));
    }

    #[test]
    fn animation_loops() {
        let start = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100), ms(100)], start);
        clock.advance(start + ms(100));
        clock.advance(start + ms(200));
        assert_eq!(clock.current(), 0);
    }

    #[test]
    fn long_stall_resyncs() {
        let start = Instant::now();
        let mut clock = FrameClock::new(vec![ms(100), ms(100)], start);
        let late = start + ms(10_000);
        assert!(clock.advance(late));
        assert_eq!(clock.next_due(), Some(late + ms(100)));
    }
}

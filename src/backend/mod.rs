mod keyboard;
#[cfg(feature = "wayland")]
pub(crate) mod wayland;
#[cfg(feature = "x11")]
pub(crate) mod x11;

use std::{os::fd::RawFd, time::Duration};

use bitflags::bitflags;

use crate::{error::Error, render::Canvas};

/// Default scale factor for rendering
pub(crate) const DEFAULT_SCALE: f32 = 1.0;

/// Trait for connecting to a display server.
pub(crate) trait DisplayConnection: Sized {
    type Window: Window;

    fn connect() -> Result<Self, Error>;
    fn create_window(&self, width: u16, height: u16) -> Result<Self::Window, Error>;
}

/// Cursor shape types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CursorShape {
    /// Default arrow cursor.
    #[default]
    Default,
    /// Text input (I-beam) cursor.
    Text,
}

/// Trait for interacting with a window.
pub(crate) trait Window {
    fn set_title(&mut self, title: &str) -> Result<(), Error>;
    fn set_contents(&mut self, canvas: &Canvas) -> Result<(), Error>;
    fn show(&mut self) -> Result<(), Error>;
    fn wait_for_event(&mut self) -> Result<WindowEvent, Error>;
    fn poll_for_event(&mut self) -> Result<Option<WindowEvent>, Error>;
    /// Waits at most `timeout` for the next event. `Ok(None)` means the timeout elapsed.
    fn wait_for_event_timeout(&mut self, timeout: Duration)
    -> Result<Option<WindowEvent>, Error>;
    fn start_drag(&mut self) -> Result<(), Error>;
    fn scale_factor(&self) -> f32;
    fn set_cursor(&mut self, shape: CursorShape) -> Result<(), Error>;
}

/// Events that can be emitted by a window.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub(crate) enum WindowEvent {
    CloseRequested,
    RedrawRequested,
    CursorEnter(CursorPos),
    CursorMove(CursorPos),
    CursorLeave,
    ButtonPress(MouseButton),
    ButtonRelease(MouseButton),
    Scroll(ScrollDirection),
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    TextInput(char),
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CursorPos {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub(crate) enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub(crate) struct KeyEvent {
    pub keysym: u32,
    pub modifiers: Modifiers,
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(crate) struct Modifiers: u8 {
        const SHIFT = 0x01;
        const CTRL  = 0x02;
        const ALT   = 0x04;
        const SUPER = 0x08;
    }
}

/// XKB keysyms the dialogs react to.
pub(crate) mod keys {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const HOME: u32 = 0xff50;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END: u32 = 0xff57;
    pub const KP_ENTER: u32 = 0xff8d;
    pub const DELETE: u32 = 0xffff;
    pub const ISO_LEFT_TAB: u32 = 0xfe20;
}

/// Blocks until `fd` is readable or `timeout` elapses. Returns true if readable.
pub(crate) fn poll_readable(fd: RawFd, timeout: Duration) -> Result<bool, Error> {
    let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
    let mut fds = [libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    }];

    loop {
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, millis) };
        if rc >= 0 {
            return Ok(rc > 0);
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err.into());
        }
    }
}

/// Type-erased window that can be either X11 or Wayland.
pub(crate) enum AnyWindow {
    #[cfg(feature = "x11")]
    X11(x11::X11Window),
    #[cfg(feature = "wayland")]
    Wayland(wayland::WaylandWindow),
}

/// Forwards a call to whichever backend the window was created on.
macro_rules! forward {
    ($self:expr, $w:ident => $call:expr) => {
        match $self {
            #[cfg(feature = "x11")]
            AnyWindow::X11($w) => $call,
            #[cfg(feature = "wayland")]
            AnyWindow::Wayland($w) => $call,
        }
    };
}

impl Window for AnyWindow {
    fn set_title(&mut self, title: &str) -> Result<(), Error> {
        forward!(self, w => w.set_title(title))
    }

    fn set_contents(&mut self, canvas: &Canvas) -> Result<(), Error> {
        forward!(self, w => w.set_contents(canvas))
    }

    fn show(&mut self) -> Result<(), Error> {
        forward!(self, w => w.show())
    }

    fn wait_for_event(&mut self) -> Result<WindowEvent, Error> {
        forward!(self, w => w.wait_for_event())
    }

    fn poll_for_event(&mut self) -> Result<Option<WindowEvent>, Error> {
        forward!(self, w => w.poll_for_event())
    }

    fn wait_for_event_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<WindowEvent>, Error> {
        forward!(self, w => w.wait_for_event_timeout(timeout))
    }

    fn start_drag(&mut self) -> Result<(), Error> {
        forward!(self, w => w.start_drag())
    }

    fn scale_factor(&self) -> f32 {
        forward!(self, w => w.scale_factor())
    }

    fn set_cursor(&mut self, shape: CursorShape) -> Result<(), Error> {
        forward!(self, w => w.set_cursor(shape))
    }
}

/// Creates a window using the best available backend.
/// Prefers Wayland, falls back to X11.
pub(crate) fn create_window(width: u16, height: u16) -> Result<AnyWindow, Error> {
    #[cfg(feature = "wayland")]
    if let Some(window) = try_wayland(width, height) {
        return Ok(window);
    }

    #[cfg(feature = "x11")]
    return try_x11(width, height);

    #[cfg(not(feature = "x11"))]
    Err(Error::NoDisplay)
}

#[cfg(not(any(feature = "x11", feature = "wayland")))]
compile_error!("At least one of 'x11' or 'wayland' features must be enabled");

#[cfg(feature = "wayland")]
fn try_wayland(width: u16, height: u16) -> Option<AnyWindow> {
    let socket_name = find_wayland_socket()?;

    let _guard = SocketGuard::new(&socket_name);

    match wayland::Connection::connect() {
        Ok(conn) => match conn.create_window(width, height) {
            Ok(w) => return Some(AnyWindow::Wayland(w)),
            Err(e) => tracing::warn!("Wayland window creation failed: {e}"),
        },
        Err(e) => tracing::debug!("Wayland connection failed: {e}"),
    }

    None
}

#[cfg(feature = "wayland")]
fn find_wayland_socket() -> Option<String> {
    if let Ok(display) = std::env::var("WAYLAND_DISPLAY") {
        return Some(display);
    }

    let xdg_runtime = std::env::var_os("XDG_RUNTIME_DIR")?;
    let rd = std::fs::read_dir(std::path::PathBuf::from(&xdg_runtime)).ok()?;

    let mut candidates: Vec<String> = rd
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| {
            name.strip_prefix("wayland-")
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        })
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        tracing::debug!(?candidates, "multiple wayland sockets found, using first");
    }

    candidates.into_iter().next()
}

#[cfg(feature = "x11")]
fn try_x11(width: u16, height: u16) -> Result<AnyWindow, Error> {
    let conn = x11::Connection::connect().map_err(|e| {
        tracing::debug!("X11 connection failed: {e}");
        Error::NoDisplay
    })?;
    let w = conn.create_window(width, height)?;
    Ok(AnyWindow::X11(w))
}

/// Points WAYLAND_DISPLAY at the chosen socket for the duration of the connect call.
#[cfg(feature = "wayland")]
struct SocketGuard {
    old_value: Option<std::ffi::OsString>,
}

#[cfg(feature = "wayland")]
impl SocketGuard {
    fn new(path: &str) -> Self {
        let old_value = std::env::var_os("WAYLAND_DISPLAY");
        // Single-threaded at this point: no other thread reads the environment.
        unsafe { std::env::set_var("WAYLAND_DISPLAY", path) };
        Self {
            old_value,
        }
    }
}

#[cfg(feature = "wayland")]
impl Drop for SocketGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.old_value {
                Some(old) => std::env::set_var("WAYLAND_DISPLAY", old),
                None => std::env::remove_var("WAYLAND_DISPLAY"),
            }
        }
    }
}

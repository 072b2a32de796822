//! Wayland backend implementation.

mod shm;

use std::{
    collections::VecDeque,
    os::fd::{AsRawFd, OwnedFd},
    time::{Duration, Instant},
};

use kbvm::lookup::LookupTable;
use wayland_client::{
    Connection as WaylandConnection, Dispatch, EventQueue, QueueHandle, WEnum,
    protocol::{
        wl_buffer::WlBuffer,
        wl_callback::{self, WlCallback},
        wl_compositor::WlCompositor,
        wl_keyboard::{self, WlKeyboard},
        wl_output::{self, WlOutput},
        wl_pointer::{self, WlPointer},
        wl_registry::{self, WlRegistry},
        wl_seat::WlSeat,
        wl_shm::WlShm,
        wl_shm_pool::WlShmPool,
        wl_surface::WlSurface,
    },
};
use wayland_protocols::xdg::shell::client::{
    xdg_surface::{self, XdgSurface},
    xdg_toplevel::{self, XdgToplevel},
    xdg_wm_base::{self, XdgWmBase},
};

use crate::error::{Error, WaylandError};
use crate::render::Canvas;

use super::{
    CursorPos, CursorShape, DisplayConnection, MouseButton, ScrollDirection, Window, WindowEvent,
    keyboard,
};

use self::shm::ShmBuffer;

use super::DEFAULT_SCALE;

/// Wayland connection wrapper.
pub(crate) struct Connection {
    conn: WaylandConnection,
}

impl DisplayConnection for Connection {
    type Window = WaylandWindow;

    fn connect() -> Result<Self, Error> {
        let conn = WaylandConnection::connect_to_env()?;
        Ok(Self { conn })
    }

    fn create_window(&self, width: u16, height: u16) -> Result<Self::Window, Error> {
        WaylandWindow::create(&self.conn, width, height)
    }
}

/// State for Wayland protocol handling.
pub(super) struct WaylandState {
    // Globals
    compositor: Option<WlCompositor>,
    shm: Option<WlShm>,
    xdg_wm_base: Option<XdgWmBase>,
    seat: Option<WlSeat>,
    output: Option<WlOutput>,

    // Input devices
    pointer: Option<WlPointer>,
    keyboard: Option<WlKeyboard>,

    // Window state
    surface: Option<WlSurface>,
    xdg_surface: Option<XdgSurface>,
    xdg_toplevel: Option<XdgToplevel>,

    // Configuration state
    configured: bool,
    closed: bool,

    // Scale factor from output (integer scale from wl_output)
    output_scale: i32,
    // Effective scale factor used for rendering (set when window is created)
    effective_scale: i32,

    // Input state
    last_serial: u32,
    modifier_mask: kbvm::ModifierMask,
    keyboard_group: u32,

    // Keyboard handling
    lookup_table: Option<LookupTable>,

    // Events
    pending_events: VecDeque<WindowEvent>,
}

impl WaylandState {
    fn new() -> Self {
        Self {
            compositor: None,
            shm: None,
            xdg_wm_base: None,
            seat: None,
            output: None,
            pointer: None,
            keyboard: None,
            surface: None,
            xdg_surface: None,
            xdg_toplevel: None,
            configured: false,
            closed: false,
            output_scale: 1,
            effective_scale: 1,
            last_serial: 0,
            modifier_mask: kbvm::ModifierMask::NONE,
            keyboard_group: 0,
            lookup_table: None,
            pending_events: VecDeque::new(),
        }
    }

    /// Returns the effective scale factor to use for rendering.
    /// Uses compositor scale if > 1, otherwise defaults to DEFAULT_SCALE.
    fn scale_factor(&self) -> f32 {
        if self.output_scale > 1 {
            self.output_scale as f32
        } else {
            DEFAULT_SCALE
        }
    }
}

/// Wayland window implementation.
pub(crate) struct WaylandWindow {
    conn: WaylandConnection,
    event_queue: EventQueue<WaylandState>,
    state: WaylandState,
    buffer: ShmBuffer,
    /// Buffer size in device pixels.
    physical_width: i32,
    physical_height: i32,
    scale: i32,
    cursor_theme: wayland_cursor::CursorTheme,
    cursor_surface: WlSurface,
    current_cursor: CursorShape,
}

impl WaylandWindow {
    fn create(conn: &WaylandConnection, width: u16, height: u16) -> Result<Self, Error> {
        let mut event_queue = conn.new_event_queue();
        let qh = event_queue.handle();

        let mut state = WaylandState::new();
        let _registry = conn.display().get_registry(&qh, ());
        event_queue.roundtrip(&mut state)?;

        let compositor = required(&state.compositor, "wl_compositor")?;
        let shm = required(&state.shm, "wl_shm")?;
        let xdg_wm_base = required(&state.xdg_wm_base, "xdg_wm_base")?;

        let surface = compositor.create_surface(&qh, ());
        let xdg_surface = xdg_wm_base.get_xdg_surface(&surface, &qh, ());
        let xdg_toplevel = xdg_surface.get_toplevel(&qh, ());
        state.surface = Some(surface.clone());
        state.xdg_surface = Some(xdg_surface);
        state.xdg_toplevel = Some(xdg_toplevel.clone());

        // Fixed-size dialog.
        xdg_toplevel.set_app_id("zenity-forms".to_string());
        xdg_toplevel.set_min_size(width as i32, height as i32);
        xdg_toplevel.set_max_size(width as i32, height as i32);
        surface.commit();

        while !state.configured {
            event_queue.blocking_dispatch(&mut state)?;
        }
        // Second roundtrip picks up wl_output.scale.
        event_queue.roundtrip(&mut state)?;

        let scale = state.scale_factor().ceil() as i32;
        state.effective_scale = scale;
        let physical_width = width as i32 * scale;
        let physical_height = height as i32 * scale;

        let buffer = ShmBuffer::new(&shm, physical_width, physical_height, &qh)?;

        surface.set_buffer_scale(scale);

        if let Some(seat) = &state.seat.clone() {
            state.pointer = Some(seat.get_pointer(&qh, ()));
            state.keyboard = Some(seat.get_keyboard(&qh, ()));
        }

        let cursor_theme = wayland_cursor::CursorTheme::load(conn, shm.clone(), 24)
            .map_err(|_| Error::Wayland(WaylandError::MissingGlobal("cursor theme")))?;
        tracing::debug!(width, height, scale, "wayland surface configured");
        let cursor_surface = compositor.create_surface(&qh, ());

        Ok(Self {
            conn: conn.clone(),
            event_queue,
            state,
            buffer,
            physical_width,
            physical_height,
            scale,
            cursor_theme,
            cursor_surface,
            current_cursor: CursorShape::Default,
        })
    }

    /// Updates the cursor on the pointer
    fn update_cursor(&mut self) {
        let cursor_name = match self.current_cursor {
            CursorShape::Default => "default",
            CursorShape::Text => "text",
        };

        if let Some(cursor) = self.cursor_theme.get_cursor(cursor_name) {
            let image = &cursor[0];
            let (width, height) = image.dimensions();
            let (xhot, yhot) = image.hotspot();

            self.cursor_surface.attach(Some(&image), 0, 0);
            self.cursor_surface.damage_buffer(0, 0, width as i32, height as i32);
            self.cursor_surface.commit();

            if let Some(pointer) = &self.state.pointer {
                pointer.set_cursor(
                    self.state.last_serial,
                    Some(&self.cursor_surface),
                    xhot as i32,
                    yhot as i32,
                );
            }
        }
    }
}

impl Window for WaylandWindow {
    fn set_title(&mut self, title: &str) -> Result<(), Error> {
        if let Some(toplevel) = &self.state.xdg_toplevel {
            toplevel.set_title(title.trim_end_matches('\0').to_string());
        }
        Ok(())
    }

    fn set_contents(&mut self, canvas: &Canvas) -> Result<(), Error> {
        self.buffer.write_argb(&canvas.as_argb());

        if let Some(surface) = &self.state.surface {
            surface.attach(Some(self.buffer.wl_buffer()), 0, 0);
            surface.damage_buffer(0, 0, self.physical_width, self.physical_height);
            surface.commit();
        }

        self.conn.flush()?;
        Ok(())
    }

    fn show(&mut self) -> Result<(), Error> {
        self.conn.flush()?;
        Ok(())
    }

    fn wait_for_event(&mut self) -> Result<WindowEvent, Error> {
        loop {
            if let Some(event) = self.state.pending_events.pop_front() {
                return Ok(event);
            }

            if self.state.closed {
                return Ok(WindowEvent::CloseRequested);
            }

            self.conn.flush()?;
            self.event_queue.blocking_dispatch(&mut self.state)?;
        }
    }

    fn poll_for_event(&mut self) -> Result<Option<WindowEvent>, Error> {
        if let Some(event) = self.state.pending_events.pop_front() {
            return Ok(Some(event));
        }

        if self.state.closed {
            return Ok(Some(WindowEvent::CloseRequested));
        }

        self.conn.flush()?;

        if let Some(guard) = self.event_queue.prepare_read() {
            // Non-blocking: WouldBlock just means nothing arrived yet.
            let _ = guard.read();
        }

        self.event_queue.dispatch_pending(&mut self.state)?;

        Ok(self.state.pending_events.pop_front())
    }

    fn wait_for_event_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<WindowEvent>, Error> {
        let deadline = Instant::now() + timeout;
        loop {
            self.event_queue.dispatch_pending(&mut self.state)?;
            if let Some(event) = self.state.pending_events.pop_front() {
                return Ok(Some(event));
            }
            if self.state.closed {
                return Ok(Some(WindowEvent::CloseRequested));
            }

            self.conn.flush()?;

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            if let Some(guard) = self.event_queue.prepare_read() {
                let fd = guard.connection_fd().as_raw_fd();
                if super::poll_readable(fd, deadline - now)? {
                    match guard.read() {
                        Ok(_) => {}
                        Err(wayland_client::backend::WaylandError::Io(e))
                            if e.kind() == std::io::ErrorKind::WouldBlock => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
    }

    fn start_drag(&mut self) -> Result<(), Error> {
        if let (Some(toplevel), Some(seat)) = (&self.state.xdg_toplevel, &self.state.seat) {
            toplevel._move(seat, self.state.last_serial);
        }
        Ok(())
    }

    fn scale_factor(&self) -> f32 {
        self.scale as f32
    }

    fn set_cursor(&mut self, shape: CursorShape) -> Result<(), Error> {
        if self.current_cursor == shape {
            return Ok(());
        }
        self.current_cursor = shape;
        self.update_cursor();
        self.conn.flush()?;
        Ok(())
    }
}

impl Dispatch<WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _conn: &WaylandConnection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match interface.as_str() {
                "wl_compositor" => {
                    state.compositor = Some(registry.bind(name, version.min(6), qh, ()));
                }
                "wl_shm" => {
                    state.shm = Some(registry.bind(name, version.min(1), qh, ()));
                }
                "xdg_wm_base" => {
                    state.xdg_wm_base = Some(registry.bind(name, version.min(6), qh, ()));
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind(name, version.min(9), qh, ()));
                }
                "wl_output" => {
                    // Bind wl_output version 2+ to get scale events
                    if version >= 2 {
                        state.output = Some(registry.bind(name, version.min(4), qh, ()));
                    }
                }
                _ => {}
            }
        }
    }
}

wayland_client::delegate_noop!(WaylandState: WlCompositor);
wayland_client::delegate_noop!(WaylandState: WlShmPool);
wayland_client::delegate_noop!(WaylandState: ignore WlShm);
wayland_client::delegate_noop!(WaylandState: ignore WlBuffer);
wayland_client::delegate_noop!(WaylandState: ignore WlSurface);
wayland_client::delegate_noop!(WaylandState: ignore WlSeat);

impl Dispatch<WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Scale { factor } = event {
            state.output_scale = factor;
        }
    }
}

impl Dispatch<WlCallback, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &WlCallback,
        event: wl_callback::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_callback::Event::Done { .. } = event {
            state.pending_events.push_back(WindowEvent::RedrawRequested);
        }
    }
}

impl Dispatch<XdgWmBase, ()> for WaylandState {
    fn event(
        _: &mut Self,
        wm_base: &XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        xdg_surface: &XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            state.configured = true;
            state.pending_events.push_back(WindowEvent::RedrawRequested);
        }
    }
}

impl Dispatch<XdgToplevel, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_toplevel::Event::Close = event {
            state.closed = true;
            state.pending_events.push_back(WindowEvent::CloseRequested);
        }
    }
}

impl Dispatch<WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        let scale = f64::from(state.effective_scale);
        let to_physical = |x: f64, y: f64| CursorPos {
            x: (x * scale) as i16,
            y: (y * scale) as i16,
        };

        match event {
            wl_pointer::Event::Enter {
                serial,
                surface_x,
                surface_y,
                ..
            } => {
                state.last_serial = serial;
                let pos = to_physical(surface_x, surface_y);
                state.pending_events.push_back(WindowEvent::CursorEnter(pos));
            }
            wl_pointer::Event::Leave { serial, .. } => {
                state.last_serial = serial;
                state.pending_events.push_back(WindowEvent::CursorLeave);
            }
            wl_pointer::Event::Motion {
                surface_x,
                surface_y,
                ..
            } => {
                let pos = to_physical(surface_x, surface_y);
                state.pending_events.push_back(WindowEvent::CursorMove(pos));
            }
            wl_pointer::Event::Button {
                serial,
                button,
                state: WEnum::Value(pressed),
                ..
            } => {
                state.last_serial = serial;
                let Some(mb) = pointer_button(button) else {
                    return;
                };
                let event = match pressed {
                    wl_pointer::ButtonState::Pressed => WindowEvent::ButtonPress(mb),
                    wl_pointer::ButtonState::Released => WindowEvent::ButtonRelease(mb),
                    _ => return,
                };
                state.pending_events.push_back(event);
            }
            wl_pointer::Event::Axis {
                axis: WEnum::Value(wl_pointer::Axis::VerticalScroll),
                value,
                ..
            } => {
                let direction = if value > 0.0 {
                    ScrollDirection::Down
                } else {
                    ScrollDirection::Up
                };
                state.pending_events.push_back(WindowEvent::Scroll(direction));
            }
            _ => {}
        }
    }
}

impl Dispatch<WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &WaylandConnection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_keyboard::Event::Keymap { format, fd, size } => {
                if format != WEnum::Value(wl_keyboard::KeymapFormat::XkbV1) {
                    tracing::debug!("ignoring non-xkb keymap");
                    return;
                }
                match load_keymap(fd, size as usize) {
                    Ok(table) => state.lookup_table = Some(table),
                    Err(e) => tracing::warn!("failed to load keymap: {e}"),
                }
            }
            wl_keyboard::Event::Key {
                serial,
                key,
                state: key_state,
                ..
            } => {
                state.last_serial = serial;
                let Some(table) = &state.lookup_table else {
                    return;
                };
                let translated = keyboard::translate(
                    table,
                    state.keyboard_group,
                    state.modifier_mask,
                    kbvm::Keycode::from_evdev(key),
                );
                let mods = keyboard::modifiers(state.modifier_mask);
                let event = match key_state {
                    WEnum::Value(wl_keyboard::KeyState::Pressed) => {
                        keyboard::press_event(translated, mods)
                    }
                    WEnum::Value(wl_keyboard::KeyState::Released) => {
                        keyboard::release_event(translated, mods)
                    }
                    _ => return,
                };
                state.pending_events.push_back(event);
            }
            wl_keyboard::Event::Modifiers {
                mods_depressed,
                mods_latched,
                mods_locked,
                group,
                ..
            } => {
                let combined = mods_depressed | mods_latched | mods_locked;
                state.modifier_mask = kbvm::ModifierMask(combined);
                state.keyboard_group = group;
            }
            wl_keyboard::Event::Enter { serial, .. } => {
                state.last_serial = serial;
            }
            wl_keyboard::Event::Leave { serial, .. } => {
                state.last_serial = serial;
            }
            _ => {}
        }
    }
}

fn load_keymap(fd: OwnedFd, size: usize) -> Result<LookupTable, String> {
    let file = std::fs::File::from(fd);
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| e.to_string())?;
    let bytes = mmap.get(..size).unwrap_or(&mmap[..]);
    // Compositors usually send a trailing NUL.
    let bytes = bytes.strip_suffix(b"\0").unwrap_or(bytes);
    let mut diagnostics: Vec<kbvm::xkb::diagnostic::Diagnostic> = Vec::new();
    let keymap = kbvm::xkb::Context::default()
        .keymap_from_bytes(&mut diagnostics, None, bytes)
        .map_err(|_| "invalid xkb keymap".to_string())?;
    Ok(keymap.to_builder().build_lookup_table())
}

fn required<T: Clone>(global: &Option<T>, name: &'static str) -> Result<T, Error> {
    global
        .clone()
        .ok_or(Error::Wayland(WaylandError::MissingGlobal(name)))
}

/// Maps evdev button codes.
fn pointer_button(code: u32) -> Option<MouseButton> {
    const BTN_LEFT: u32 = 0x110;
    const BTN_RIGHT: u32 = 0x111;
    const BTN_MIDDLE: u32 = 0x112;
    match code {
        BTN_LEFT => Some(MouseButton::Left),
        BTN_RIGHT => Some(MouseButton::Right),
        BTN_MIDDLE => Some(MouseButton::Middle),
        _ => None,
    }
}

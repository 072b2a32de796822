//! X11 backend implementation.

use std::{
    ops::Deref,
    os::fd::AsRawFd,
    rc::Rc,
    time::{Duration, Instant},
};

use kbvm::{lookup::LookupTable, xkb::x11::KbvmX11Ext};
use x11rb::{
    connection::Connection as X11rbConnection,
    properties::WmSizeHints,
    protocol::{
        xproto::{
            self, AtomEnum, ClientMessageEvent, ConfigureWindowAux, ConnectionExt as _,
            CreateWindowAux, EventMask, ImageFormat, KeyButMask, PropMode, StackMode, VisualClass,
            WindowClass,
        },
        Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
};

use super::{
    CursorPos, CursorShape, DisplayConnection, Modifiers, MouseButton, ScrollDirection, Window,
    WindowEvent, keyboard,
};
use crate::{
    error::{Error, X11Error},
    render::Canvas,
};

x11rb::atom_manager! {
    pub Atoms: AtomCookie {
        UTF8_STRING,

        WM_PROTOCOLS,
        WM_DELETE_WINDOW,

        _NET_WM_NAME,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DIALOG,

        _NET_WM_MOVERESIZE,
    }
}

#[derive(Clone)]
pub(crate) struct Connection {
    inner: Rc<RustConnection>,
    screen: usize,
}

impl Deref for Connection {
    type Target = RustConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DisplayConnection for Connection {
    type Window = X11Window;

    fn connect() -> Result<Self, Error> {
        let (conn, screen) = x11rb::connect(None)?;
        Ok(Self {
            inner: Rc::new(conn),
            screen,
        })
    }

    fn create_window(&self, width: u16, height: u16) -> Result<Self::Window, Error> {
        X11Window::create(self.clone(), width, height)
    }
}

const MOVERESIZE_MOVE: u32 = 8;
const WM_CLASS: &[u8] = b"zenity-forms\0zenity-forms\0";

// X11 cursor font character constants
const XC_XTERM: u16 = 152; // Text I-beam

pub(crate) struct X11Window {
    atoms: Atoms,
    conn: Connection,
    window: xproto::Window,
    gc: xproto::Gcontext,
    lookup_table: LookupTable,
    xkb_group: u8,
    cursor_text: xproto::Cursor,
    current_cursor: CursorShape,
}

impl X11Window {
    fn create(conn: Connection, width: u16, height: u16) -> Result<Self, Error> {
        let atoms = Atoms::new(&conn.inner)?.reply()?;

        let screen = conn
            .inner
            .setup()
            .roots
            .get(conn.screen)
            .ok_or(Error::X11(X11Error::NoVisual))?;

        let vid = truecolor_visual(screen).ok_or(Error::X11(X11Error::NoVisual))?;

        let attrs = CreateWindowAux::new()
            .event_mask(
                EventMask::EXPOSURE
                    | EventMask::STRUCTURE_NOTIFY
                    | EventMask::KEY_PRESS
                    | EventMask::KEY_RELEASE
                    | EventMask::POINTER_MOTION
                    | EventMask::ENTER_WINDOW
                    | EventMask::LEAVE_WINDOW
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE,
            )
            .border_pixel(0)
            .colormap(0);

        let window = conn.generate_id()?;
        conn.inner
            .create_window(
                24,
                window,
                screen.root,
                0,
                0,
                width,
                height,
                0,
                WindowClass::INPUT_OUTPUT,
                vid,
                &attrs,
            )?
            .check()?;

        let gc = conn.generate_id()?;
        conn.create_gc(
            gc,
            window,
            &xproto::CreateGCAux::new().graphics_exposures(0),
        )?;

        // Window-manager close arrives as a ClientMessage.
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.WM_PROTOCOLS,
            AtomEnum::ATOM,
            &[atoms.WM_DELETE_WINDOW],
        )?;

        // Fixed-size dialog.
        WmSizeHints {
            max_size: Some((width.into(), height.into())),
            min_size: Some((width.into(), height.into())),
            ..Default::default()
        }
        .set_normal_hints(&conn.inner, window)?
        .check()?;

        let lookup_table = load_lookup_table(&conn)?;
        // The window keeps the WM's themed pointer; the I-beam is only
        // applied while hovering a text input.
        let cursor_text = text_cursor(&conn)?;

        let win = X11Window {
            atoms,
            conn,
            window,
            gc,
            lookup_table,
            xkb_group: 0,
            cursor_text,
            current_cursor: CursorShape::Default,
        };
        win.set_class(WM_CLASS)?;
        win.mark_as_dialog()?;
        tracing::debug!(width, height, "x11 window created");

        Ok(win)
    }

    fn set_class(&self, cls: &[u8]) -> Result<(), Error> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                cls,
            )?
            .check()?;
        Ok(())
    }

    fn mark_as_dialog(&self) -> Result<(), Error> {
        let atom = self.atoms._NET_WM_WINDOW_TYPE_DIALOG;
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_WINDOW_TYPE,
                AtomEnum::ATOM,
                &[atom],
            )?
            .check()?;
        Ok(())
    }

    fn translate(&self, detail: u8, state: KeyButMask) -> (keyboard::Translated, Modifiers) {
        let mask = kbvm_mods(state);
        let key = keyboard::translate(
            &self.lookup_table,
            self.xkb_group.into(),
            mask,
            kbvm::Keycode::from_x11(detail.into()),
        );
        (key, keyboard::modifiers(mask))
    }

    fn cvt_event(&mut self, ev: Event) -> Option<WindowEvent> {
        Some(match ev {
            Event::ClientMessage(msg) if msg.data.as_data32()[0] == self.atoms.WM_DELETE_WINDOW => {
                WindowEvent::CloseRequested
            }
            Event::KeyPress(press) if press.event == self.window => {
                let (key, mods) = self.translate(press.detail, press.state);
                keyboard::press_event(key, mods)
            }
            Event::KeyRelease(release) if release.event == self.window => {
                let (key, mods) = self.translate(release.detail, release.state);
                keyboard::release_event(key, mods)
            }
            Event::Expose(ex) if ex.count == 0 => WindowEvent::RedrawRequested,
            Event::EnterNotify(e) => {
                WindowEvent::CursorEnter(CursorPos {
                    x: e.event_x,
                    y: e.event_y,
                })
            }
            Event::LeaveNotify(_) => WindowEvent::CursorLeave,
            Event::MotionNotify(e) => {
                WindowEvent::CursorMove(CursorPos {
                    x: e.event_x,
                    y: e.event_y,
                })
            }
            Event::ButtonPress(e) => {
                match e.detail {
                    4 => return Some(WindowEvent::Scroll(ScrollDirection::Up)),
                    5 => return Some(WindowEvent::Scroll(ScrollDirection::Down)),
                    _ => mouse_button(e.detail).map(WindowEvent::ButtonPress)?,
                }
            }
            Event::ButtonRelease(e) => {
                match e.detail {
                    4 | 5 => return None,
                    _ => mouse_button(e.detail).map(WindowEvent::ButtonRelease)?,
                }
            }
            _ => return None,
        })
    }
}

fn truecolor_visual(screen: &xproto::Screen) -> Option<xproto::Visualid> {
    screen
        .allowed_depths
        .iter()
        .filter(|d| d.depth == 24)
        .flat_map(|d| &d.visuals)
        .find(|v| {
            v.class == VisualClass::TRUE_COLOR
                && (v.red_mask, v.green_mask, v.blue_mask) == (0xff0000, 0xff00, 0xff)
        })
        .map(|v| v.visual_id)
}

fn load_lookup_table(conn: &Connection) -> Result<LookupTable, Error> {
    fn keyboard<E>(_: E) -> Error {
        Error::X11(X11Error::Keyboard)
    }
    conn.setup_xkb_extension().map_err(keyboard)?;
    let device_id = conn.get_xkb_core_device_id().map_err(keyboard)?;
    let keymap = conn.get_xkb_keymap(device_id).map_err(keyboard)?;
    Ok(keymap.to_builder().build_lookup_table())
}

fn text_cursor(conn: &Connection) -> Result<xproto::Cursor, Error> {
    let font = conn.generate_id()?;
    conn.open_font(font, b"cursor")?;
    let cursor = conn.generate_id()?;
    conn.create_glyph_cursor(
        cursor, font, font, XC_XTERM, XC_XTERM + 1, 0, 0, 0, 0xffff, 0xffff, 0xffff,
    )?;
    conn.close_font(font)?;
    Ok(cursor)
}

fn kbvm_mods(state: KeyButMask) -> kbvm::ModifierMask {
    use kbvm::ModifierMask as M;
    [
        (KeyButMask::SHIFT, M::SHIFT),
        (KeyButMask::CONTROL, M::CONTROL),
        (KeyButMask::MOD1, M::MOD1),
        (KeyButMask::MOD4, M::MOD4),
    ]
    .into_iter()
    .filter(|(bit, _)| state.contains(*bit))
    .fold(M::NONE, |acc, (_, m)| acc | m)
}

impl Window for X11Window {
    fn set_title(&mut self, title: &str) -> Result<(), Error> {
        let title = if title.ends_with('\0') {
            title.to_string()
        } else {
            format!("{title}\0")
        };

        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                title.as_bytes(),
            )?
            .check()?;
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_NAME,
                self.atoms.UTF8_STRING,
                title.as_bytes(),
            )?
            .check()?;

        Ok(())
    }

    fn set_contents(&mut self, canvas: &Canvas) -> Result<(), Error> {
        let data = canvas.as_argb();
        let width = u16::try_from(canvas.width()).unwrap_or(u16::MAX);
        let height = u16::try_from(canvas.height()).unwrap_or(u16::MAX);
        self.conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                self.window,
                self.gc,
                width,
                height,
                0,
                0,
                0,
                24,
                &data,
            )?
            .check()?;
        Ok(())
    }

    fn show(&mut self) -> Result<(), Error> {
        self.conn.map_window(self.window)?;
        self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        self.conn.flush()?;
        Ok(())
    }

    fn wait_for_event(&mut self) -> Result<WindowEvent, Error> {
        loop {
            let ev = self.conn.wait_for_event()?;
            if let Some(ev) = self.cvt_event(ev) {
                return Ok(ev);
            }
        }
    }

    fn poll_for_event(&mut self) -> Result<Option<WindowEvent>, Error> {
        while let Some(ev) = self.conn.poll_for_event()? {
            if let Some(ev) = self.cvt_event(ev) {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    fn wait_for_event_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<WindowEvent>, Error> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(ev) = self.poll_for_event()? {
                return Ok(Some(ev));
            }
            self.conn.flush()?;

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            let fd = self.conn.inner.stream().as_raw_fd();
            super::poll_readable(fd, deadline - now)?;
        }
    }

    fn start_drag(&mut self) -> Result<(), Error> {
        let pointer = self.conn.query_pointer(self.window)?.reply()?;

        let window_pos = self
            .conn
            .translate_coordinates(self.window, pointer.root, 0, 0)?
            .reply()?;

        let x = (window_pos.dst_x + pointer.win_x) as u32;
        let y = (window_pos.dst_y + pointer.win_y) as u32;

        self.conn
            .send_event(
                false,
                pointer.root,
                EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
                ClientMessageEvent::new(
                    32,
                    self.window,
                    self.atoms._NET_WM_MOVERESIZE,
                    [x, y, MOVERESIZE_MOVE, 1, 1],
                ),
            )?
            .check()?;

        Ok(())
    }

    fn scale_factor(&self) -> f32 {
        super::DEFAULT_SCALE
    }

    fn set_cursor(&mut self, shape: CursorShape) -> Result<(), Error> {
        if self.current_cursor == shape {
            return Ok(());
        }

        // When entering a text field set an I-beam glyph cursor.
        // When leaving (switching back to Default) clear the window cursor
        // (cursor = 0) so the compositor/WM can restore the themed default.
        let cursor_id: u32 = match shape {
            CursorShape::Text => self.cursor_text,
            CursorShape::Default => 0, // clear the cursor attribute
        };

        self.conn.change_window_attributes(
            self.window,
            &xproto::ChangeWindowAttributesAux::new().cursor(cursor_id),
        )?;
        self.conn.flush()?;

        self.current_cursor = shape;
        Ok(())
    }
}

fn mouse_button(detail: u8) -> Option<MouseButton> {
    Some(match detail {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        _ => return None,
    })
}

use thiserror::Error;

/// Runtime failures while showing a dialog.
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(feature = "x11")]
    #[error("X11 error: {0}")]
    X11(#[from] X11Error),
    #[cfg(feature = "wayland")]
    #[error("Wayland error: {0}")]
    Wayland(#[from] WaylandError),
    #[error("no display server available")]
    NoDisplay,
    #[error("no usable font found (set ZENITY_FORMS_FONT to a .ttf/.otf file)")]
    NoFont,
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "x11")]
#[derive(Debug, Error)]
pub enum X11Error {
    #[error("connect: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),
    #[error("connection: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),
    #[error("reply: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
    #[error("no suitable visual found")]
    NoVisual,
    #[error("keyboard setup failed")]
    Keyboard,
    #[error("resource ids exhausted")]
    IdsExhausted,
}

#[cfg(feature = "wayland")]
#[derive(Debug, Error)]
pub enum WaylandError {
    #[error("connect: {0}")]
    Connect(#[from] wayland_client::ConnectError),
    #[error("dispatch: {0}")]
    Dispatch(#[from] wayland_client::DispatchError),
    #[error("missing global: {0}")]
    MissingGlobal(&'static str),
}

#[cfg(feature = "x11")]
impl From<x11rb::errors::ConnectError> for Error {
    fn from(e: x11rb::errors::ConnectError) -> Self {
        Error::X11(X11Error::Connect(e))
    }
}

#[cfg(feature = "x11")]
impl From<x11rb::errors::ConnectionError> for Error {
    fn from(e: x11rb::errors::ConnectionError) -> Self {
        Error::X11(X11Error::Connection(e))
    }
}

#[cfg(feature = "x11")]
impl From<x11rb::errors::ReplyError> for Error {
    fn from(e: x11rb::errors::ReplyError) -> Self {
        Error::X11(X11Error::Reply(e))
    }
}

#[cfg(feature = "x11")]
impl From<x11rb::errors::ReplyOrIdError> for Error {
    fn from(e: x11rb::errors::ReplyOrIdError) -> Self {
        match e {
            x11rb::errors::ReplyOrIdError::ConnectionError(e) => {
                Error::X11(X11Error::Connection(e))
            }
            x11rb::errors::ReplyOrIdError::X11Error(e) => Error::X11(X11Error::Reply(e.into())),
            x11rb::errors::ReplyOrIdError::IdsExhausted => Error::X11(X11Error::IdsExhausted),
        }
    }
}

#[cfg(feature = "wayland")]
impl From<wayland_client::ConnectError> for Error {
    fn from(e: wayland_client::ConnectError) -> Self {
        Error::Wayland(WaylandError::Connect(e))
    }
}

#[cfg(feature = "wayland")]
impl From<wayland_client::DispatchError> for Error {
    fn from(e: wayland_client::DispatchError) -> Self {
        Error::Wayland(WaylandError::Dispatch(e))
    }
}

#[cfg(feature = "wayland")]
impl From<wayland_client::backend::WaylandError> for Error {
    fn from(e: wayland_client::backend::WaylandError) -> Self {
        match e {
            wayland_client::backend::WaylandError::Io(e) => Error::Io(e),
            other => Error::Io(std::io::Error::other(other.to_string())),
        }
    }
}

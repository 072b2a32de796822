//! Shared-memory ARGB buffer backing the dialog surface.

use std::os::fd::{AsFd, OwnedFd};

use wayland_client::{
    QueueHandle,
    protocol::{
        wl_buffer::WlBuffer,
        wl_shm::{Format, WlShm},
        wl_shm_pool::WlShmPool,
    },
};

use super::WaylandState;
use crate::error::Error;

const BYTES_PER_PIXEL: i32 = 4;

/// One ARGB8888 buffer of a fixed physical size, with its pool and mapping.
pub(super) struct ShmBuffer {
    buffer: WlBuffer,
    _pool: WlShmPool,
    _fd: OwnedFd,
    data: memmap2::MmapMut,
}

impl ShmBuffer {
    pub(super) fn new(
        shm: &WlShm,
        width: i32,
        height: i32,
        qh: &QueueHandle<WaylandState>,
    ) -> Result<Self, Error> {
        let (width, height) = (width.max(1), height.max(1));
        let stride = width * BYTES_PER_PIXEL;
        let size = stride * height;

        let file = tempfile::tempfile()?;
        file.set_len(size as u64)?;
        // The file stays alive through `_fd` for as long as the mapping does.
        let data = unsafe { memmap2::MmapMut::map_mut(&file)? };
        let fd: OwnedFd = file.into();

        let pool = shm.create_pool(fd.as_fd(), size, qh, ());
        let buffer = pool.create_buffer(0, width, height, stride, Format::Argb8888, qh, ());
        tracing::debug!(width, height, "allocated shm buffer");

        Ok(Self {
            buffer,
            _pool: pool,
            _fd: fd,
            data,
        })
    }

    pub(super) fn wl_buffer(&self) -> &WlBuffer {
        &self.buffer
    }

    /// Copies ARGB pixels into the buffer. Excess input is dropped.
    pub(super) fn write_argb(&mut self, pixels: &[u8]) {
        let len = pixels.len().min(self.data.len());
        self.data[..len].copy_from_slice(&pixels[..len]);
    }
}

use std::{mem::size_of, ptr::null};

use super::gfx::GfxError;

/// GL array buffer of floats. The GL name is released on drop.
pub struct Buffer {
    handle: u32,
    len: usize,
}

impl Buffer {
    pub fn new() -> Result<Buffer, GfxError> {
        let mut handle = 0;
        unsafe {
            gl::GenBuffers(1, &mut handle);
        }

        if handle == 0 {
            return Err(GfxError::CreateFailed("buffer"));
        }

        Ok(Buffer { handle, len: 0 })
    }

    /// Replace the buffer contents. Storage is respecified only when the length changes.
    pub fn set_data(self: &mut Self, data: &[f32], usage: gl::types::GLenum) {
        let byte_len = (data.len() * size_of::<f32>()) as isize;
        let ptr = if data.is_empty() { null() } else { data.as_ptr() as *const _ };

        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, self.handle);

            if data.len() == self.len && !data.is_empty() {
                gl::BufferSubData(gl::ARRAY_BUFFER, 0, byte_len, ptr);
            }
            else {
                gl::BufferData(gl::ARRAY_BUFFER, byte_len, ptr, usage);
            }

            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        }

        self.len = data.len();
    }

    /// Number of floats stored
    pub fn len(self: &Self) -> usize {
        self.len
    }

    pub fn handle(self: &Self) -> u32 {
        self.handle
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.handle);
        }
    }
}

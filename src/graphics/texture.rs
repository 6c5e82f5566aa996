use std::{fs, io, path::Path};

use log::info;
use thiserror::Error;

use super::gfx::{check_gl_error, GfxError};

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
    #[error("decode error: {0}")]
    DecodeError(String),
    #[error(transparent)]
    GfxError(#[from] GfxError),
}

/// Decoded RGBA8 pixels, bottom row first (GL convention)
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Reverse row order in place
pub fn flip_rows(pixels: &mut [u8], width: u32, height: u32) {
    let stride = width as usize * 4;
    let height = height as usize;

    for row in 0..height / 2 {
        let (top, bottom) = pixels.split_at_mut((height - row - 1) * stride);
        top[row * stride..(row + 1) * stride].swap_with_slice(&mut bottom[..stride]);
    }
}

fn decode_qoi(bytes: &[u8]) -> Result<ImageData, TextureError> {
    let (header, pixels) = match qoi::decode_to_vec(bytes) {
        Ok(v) => v,
        Err(e) => return Err(TextureError::DecodeError(e.to_string()))
    };

    let pixels = match header.channels {
        qoi::Channels::Rgba => pixels,
        qoi::Channels::Rgb => pixels.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
    };

    Ok(ImageData { width: header.width, height: header.height, pixels })
}

fn decode_image(bytes: &[u8]) -> Result<ImageData, TextureError> {
    let img = match image::load_from_memory(bytes) {
        Ok(v) => v.to_rgba8(),
        Err(e) => return Err(TextureError::DecodeError(e.to_string()))
    };

    Ok(ImageData { width: img.width(), height: img.height(), pixels: img.into_raw() })
}

/// Read & decode an image file into RGBA8, flipped so texcoord v=0 is the bottom row
pub fn load_image(path: &Path) -> Result<ImageData, TextureError> {
    let bytes = fs::read(path)?;

    let is_qoi = match path.extension().and_then(|x| x.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("qoi"),
        None => false
    };

    let mut data = if is_qoi { decode_qoi(&bytes)? } else { decode_image(&bytes)? };
    flip_rows(&mut data.pixels, data.width, data.height);

    Ok(data)
}

/// RGBA8 2D texture. The GL name is released on drop.
pub struct Texture {
    handle: u32,
    unit: u32,
}

impl Texture {
    pub fn new(data: &ImageData, unit: u32) -> Result<Texture, GfxError> {
        let mut handle = 0;
        unsafe {
            gl::GenTextures(1, &mut handle);
        }

        if handle == 0 {
            return Err(GfxError::CreateFailed("texture"));
        }

        let tex = Texture { handle, unit };

        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, handle);
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(gl::TEXTURE_2D, 0, gl::RGBA as i32, data.width as i32, data.height as i32, 0, gl::RGBA, gl::UNSIGNED_BYTE, data.pixels.as_ptr() as *const _);
            gl::GenerateMipmap(gl::TEXTURE_2D);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        check_gl_error("Texture::new")?;

        Ok(tex)
    }

    pub fn from_file(path: &Path, unit: u32) -> Result<Texture, TextureError> {
        info!("Loading texture: {}", path.display());

        let data = load_image(path)?;
        Ok(Texture::new(&data, unit)?)
    }

    pub fn set_wrap_modes(self: &Self, wrap_s: gl::types::GLenum, wrap_t: gl::types::GLenum) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.handle);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap_s as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap_t as i32);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
    }

    /// Bind to this texture's unit and point the sampler uniform at it
    pub fn bind(self: &Self, sampler_location: i32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + self.unit);
            gl::BindTexture(gl::TEXTURE_2D, self.handle);
            gl::Uniform1i(sampler_location, self.unit as i32);
        }
    }

    pub fn unbind(self: &Self) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + self.unit);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_rows() {
        // 1x3 image, one pixel per row
        let mut pixels = vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];
        flip_rows(&mut pixels, 1, 3);
        assert_eq!(pixels, vec![3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1]);

        let mut pixels = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        flip_rows(&mut pixels, 2, 2);
        assert_eq!(pixels, vec![9, 10, 11, 12, 13, 14, 15, 16, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn decodes_qoi_rgb_to_rgba() {
        let rgb = [255u8, 0, 0, 0, 255, 0];
        let encoded = qoi::encode_to_vec(&rgb, 2, 1).unwrap();

        let data = decode_qoi(&encoded).unwrap();
        assert_eq!((data.width, data.height), (2, 1));
        assert_eq!(data.pixels, vec![255, 0, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_qoi(&[1, 2, 3]), Err(TextureError::DecodeError(_))));
        assert!(matches!(decode_image(&[1, 2, 3]), Err(TextureError::DecodeError(_))));
    }
}

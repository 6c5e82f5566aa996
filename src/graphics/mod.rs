pub mod buffer;
pub mod gfx;
pub mod shader;
pub mod sink;
pub mod texture;

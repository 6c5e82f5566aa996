use super::{buffer::Buffer, gfx::{check_gl_error, GfxError}, shader::Shader};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeSlot {
    Position,
    Normal,
    Texcoord,
}

impl AttributeSlot {
    /// Floats per vertex
    pub fn components(self: Self) -> i32 {
        match self {
            AttributeSlot::Position => 3,
            AttributeSlot::Normal => 3,
            AttributeSlot::Texcoord => 2,
        }
    }
}

/// Where composed vertex data goes: GPU-visible per-attribute storage plus a
/// non-indexed triangle-list draw
pub trait AttributeSink {
    fn upload_attribute(&mut self, slot: AttributeSlot, data: &[f32]) -> Result<(), GfxError>;
    fn draw_triangles(&mut self, vertex_count: usize) -> Result<(), GfxError>;
}

/// Shader attribute locations for each slot
#[derive(Clone, Copy, Debug)]
pub struct AttributeLocations {
    pub position: u32,
    pub normal: u32,
    pub texcoord: u32,
}

impl AttributeLocations {
    pub fn from_shader(shader: &Shader, position: &str, normal: &str, texcoord: &str) -> Result<AttributeLocations, GfxError> {
        Ok(AttributeLocations {
            position: shader.attribute(position)?,
            normal: shader.attribute(normal)?,
            texcoord: shader.attribute(texcoord)?,
        })
    }
}

/// One GL buffer per attribute slot. All three are deleted when this is dropped.
pub struct GlShapeBuffers {
    position: Buffer,
    normal: Buffer,
    texcoord: Buffer,
    locations: AttributeLocations,
}

impl GlShapeBuffers {
    pub fn new(locations: AttributeLocations) -> Result<GlShapeBuffers, GfxError> {
        Ok(GlShapeBuffers {
            position: Buffer::new()?,
            normal: Buffer::new()?,
            texcoord: Buffer::new()?,
            locations,
        })
    }

    fn slot_buffer(self: &Self, slot: AttributeSlot) -> (&Buffer, u32) {
        match slot {
            AttributeSlot::Position => (&self.position, self.locations.position),
            AttributeSlot::Normal => (&self.normal, self.locations.normal),
            AttributeSlot::Texcoord => (&self.texcoord, self.locations.texcoord),
        }
    }
}

impl AttributeSink for GlShapeBuffers {
    fn upload_attribute(&mut self, slot: AttributeSlot, data: &[f32]) -> Result<(), GfxError> {
        let buffer = match slot {
            AttributeSlot::Position => &mut self.position,
            AttributeSlot::Normal => &mut self.normal,
            AttributeSlot::Texcoord => &mut self.texcoord,
        };

        buffer.set_data(data, gl::DYNAMIC_DRAW);
        check_gl_error("upload_attribute")
    }

    fn draw_triangles(&mut self, vertex_count: usize) -> Result<(), GfxError> {
        let slots = [AttributeSlot::Position, AttributeSlot::Normal, AttributeSlot::Texcoord];

        // attributes with no data (e.g. a mesh without texcoords) stay disabled
        let mut enabled = Vec::with_capacity(slots.len());

        unsafe {
            for slot in slots {
                let (buffer, location) = self.slot_buffer(slot);
                if buffer.len() == 0 {
                    continue;
                }

                gl::EnableVertexAttribArray(location);
                gl::BindBuffer(gl::ARRAY_BUFFER, buffer.handle());
                gl::VertexAttribPointer(location, slot.components(), gl::FLOAT, gl::FALSE, 0, std::ptr::null());
                enabled.push(location);
            }

            if vertex_count > 0 {
                gl::DrawArrays(gl::TRIANGLES, 0, vertex_count as i32);
            }

            for location in enabled.iter().rev() {
                gl::DisableVertexAttribArray(*location);
            }

            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        }

        check_gl_error("draw_triangles")
    }
}

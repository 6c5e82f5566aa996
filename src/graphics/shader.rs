use std::{collections::HashMap, fs, path::Path};

use glam::{Mat4, Vec3};
use log::{info, warn};

use super::gfx::{create_program, get_attrib_location, get_uniform_location, GfxError};

/// Linked GL program with cached attribute & uniform locations
pub struct Shader {
    handle: u32,
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, i32>,
}

impl Shader {
    pub fn new(vtx_source: &str, frag_source: &str) -> Result<Shader, GfxError> {
        Ok(Shader {
            handle: create_program(vtx_source, frag_source)?,
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        })
    }

    pub fn from_files(vtx_path: &Path, frag_path: &Path) -> Result<Shader, GfxError> {
        info!("Loading shader: {} + {}", vtx_path.display(), frag_path.display());

        let vtx_source = fs::read_to_string(vtx_path).map_err(|e| GfxError::CompileError(format!("{}: {}", vtx_path.display(), e)))?;
        let frag_source = fs::read_to_string(frag_path).map_err(|e| GfxError::CompileError(format!("{}: {}", frag_path.display(), e)))?;

        Shader::new(&vtx_source, &frag_source)
    }

    pub fn bind(self: &Self) {
        unsafe {
            gl::UseProgram(self.handle);
        }
    }

    pub fn unbind(self: &Self) {
        unsafe {
            gl::UseProgram(0);
        }
    }

    /// Look up and cache an attribute location. Attributes the compiler optimized
    /// away are an error since geometry can't be fed to them.
    pub fn add_attribute(self: &mut Self, name: &str) -> Result<u32, GfxError> {
        let location = get_attrib_location(self.handle, name);
        if location < 0 {
            return Err(GfxError::MissingLocation(name.to_string()));
        }

        self.attributes.insert(name.to_string(), location as u32);
        Ok(location as u32)
    }

    /// Look up and cache a uniform location. Missing uniforms only warn; setting one is a no-op.
    pub fn add_uniform(self: &mut Self, name: &str) {
        let location = get_uniform_location(self.handle, name);
        if location < 0 {
            warn!("Uniform {} not found in program {}", name, self.handle);
        }

        self.uniforms.insert(name.to_string(), location);
    }

    pub fn attribute(self: &Self, name: &str) -> Result<u32, GfxError> {
        match self.attributes.get(name) {
            Some(v) => Ok(*v),
            None => Err(GfxError::MissingLocation(name.to_string()))
        }
    }

    pub fn uniform(self: &Self, name: &str) -> i32 {
        match self.uniforms.get(name) {
            Some(v) => *v,
            None => -1
        }
    }

    pub fn set_uniform_float(self: &Self, name: &str, value: f32) {
        unsafe {
            gl::Uniform1f(self.uniform(name), value);
        }
    }

    pub fn set_uniform_vec3(self: &Self, name: &str, value: Vec3) {
        unsafe {
            gl::Uniform3f(self.uniform(name), value.x, value.y, value.z);
        }
    }

    pub fn set_uniform_mat4(self: &Self, name: &str, value: &Mat4) {
        unsafe {
            gl::UniformMatrix4fv(self.uniform(name), 1, gl::FALSE, value.to_cols_array().as_ptr());
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.handle);
        }
    }
}

use std::{ffi::CString, ptr::null_mut};

use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GfxError {
    #[error("{context}: GL error {name} (0x{code:04X})")]
    GLError { context: String, code: u32, name: &'static str },
    #[error("shader compile failed:\n{0}")]
    CompileError(String),
    #[error("program link failed:\n{0}")]
    LinkError(String),
    #[error("failed to create GL {0}")]
    CreateFailed(&'static str),
    #[error("attribute or uniform not found: {0}")]
    MissingLocation(String),
    #[error("shape has no GPU buffers (init was not called)")]
    NotInitialized,
    #[error("no shader program (scene init was not called)")]
    NoProgram,
}

pub fn gl_error_name(err: u32) -> &'static str {
    match err {
        gl::INVALID_ENUM => "INVALID_ENUM",
        gl::INVALID_VALUE => "INVALID_VALUE",
        gl::INVALID_OPERATION => "INVALID_OPERATION",
        gl::STACK_OVERFLOW => "STACK_OVERFLOW",
        gl::STACK_UNDERFLOW => "STACK_UNDERFLOW",
        gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        gl::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        gl::CONTEXT_LOST => "CONTEXT_LOST",
        _ => "UNKNOWN"
    }
}

/// Drain the GL error queue. The first error is returned, any others are logged.
pub fn check_gl_error(context: &str) -> Result<(), GfxError> {
    let mut first = None;

    loop {
        let err = unsafe { gl::GetError() };
        if err == gl::NO_ERROR {
            break;
        }

        if first.is_none() {
            first = Some(err);
        }
        else {
            error!("{}: additional GL error {}", context, gl_error_name(err));
        }
    }

    match first {
        Some(code) => Err(GfxError::GLError { context: context.to_string(), code, name: gl_error_name(code) }),
        None => Ok(())
    }
}

fn shader_info_log(shader: u32) -> String {
    unsafe {
        let mut log_length = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut log_length);

        let mut log_str = vec![0u8; log_length.max(1) as usize];
        gl::GetShaderInfoLog(shader, log_length, null_mut(), log_str.as_mut_ptr() as *mut _);

        String::from_utf8_lossy(&log_str).trim_end_matches('\0').to_string()
    }
}

fn program_info_log(program: u32) -> String {
    unsafe {
        let mut log_length = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut log_length);

        let mut log_str = vec![0u8; log_length.max(1) as usize];
        gl::GetProgramInfoLog(program, log_length, null_mut(), log_str.as_mut_ptr() as *mut _);

        String::from_utf8_lossy(&log_str).trim_end_matches('\0').to_string()
    }
}

pub fn create_shader(shader_type: u32, shader_src: &str) -> Result<u32, GfxError> {
    unsafe {
        let shader = gl::CreateShader(shader_type);
        if shader == 0 {
            return Err(GfxError::CreateFailed("shader"));
        }

        let str_len = shader_src.len() as i32;
        let str_ptr = shader_src.as_ptr() as *const gl::types::GLchar;
        gl::ShaderSource(shader, 1, &str_ptr, &str_len);
        gl::CompileShader(shader);

        let mut compile_status = 0;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut compile_status);

        if compile_status == 0 {
            let log = shader_info_log(shader);
            gl::DeleteShader(shader);
            return Err(GfxError::CompileError(log));
        }

        Ok(shader)
    }
}

pub fn create_program(vtx_shader_src: &str, frag_shader_src: &str) -> Result<u32, GfxError> {
    let vtx_shader = create_shader(gl::VERTEX_SHADER, vtx_shader_src)?;
    let frag_shader = match create_shader(gl::FRAGMENT_SHADER, frag_shader_src) {
        Ok(v) => v,
        Err(e) => {
            unsafe { gl::DeleteShader(vtx_shader); }
            return Err(e);
        }
    };

    unsafe {
        let program = gl::CreateProgram();
        if program == 0 {
            gl::DeleteShader(vtx_shader);
            gl::DeleteShader(frag_shader);
            return Err(GfxError::CreateFailed("program"));
        }

        gl::AttachShader(program, vtx_shader);
        gl::AttachShader(program, frag_shader);

        gl::LinkProgram(program);

        gl::DetachShader(program, vtx_shader);
        gl::DetachShader(program, frag_shader);
        gl::DeleteShader(vtx_shader);
        gl::DeleteShader(frag_shader);

        let mut link_status = 0;
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut link_status);

        if link_status == 0 {
            let log = program_info_log(program);
            gl::DeleteProgram(program);
            return Err(GfxError::LinkError(log));
        }

        Ok(program)
    }
}

pub fn get_attrib_location(program: u32, name: &str) -> i32 {
    match CString::new(name) {
        Ok(name_cstr) => unsafe { gl::GetAttribLocation(program, name_cstr.as_ptr()) },
        Err(_) => -1
    }
}

pub fn get_uniform_location(program: u32, name: &str) -> i32 {
    match CString::new(name) {
        Ok(name_cstr) => unsafe { gl::GetUniformLocation(program, name_cstr.as_ptr()) },
        Err(_) => -1
    }
}

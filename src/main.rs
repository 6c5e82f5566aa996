use std::{ffi::CStr, path::PathBuf, process::ExitCode};

use clap::Parser;
use config::{ConfigError, ViewerConfig};
use log::{error, info, LevelFilter};
use scene::{Scene, SceneError};
use sdl2::{event::{Event, WindowEvent}, keyboard::{Keycode, Mod}, mouse::MouseButton};
use thiserror::Error;

extern crate sdl2;
extern crate gl;

pub mod blend;
pub mod camera;
pub mod clock;
pub mod config;
pub mod graphics;
pub mod logger;
pub mod manifest;
pub mod mesh;
pub mod parse_utils;
pub mod scene;
pub mod shape;

/// Blend-shape mesh viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory containing the GLSL shaders
    shader_dir: PathBuf,
    /// Directory containing the scene manifest, meshes & textures
    data_dir: PathBuf,
    /// Viewer config (defaults to <DATA_DIR>/viewer.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
    /// Override the configured window width
    #[arg(long)]
    width: Option<u32>,
    /// Override the configured window height
    #[arg(long)]
    height: Option<u32>,
}

/// GPU-owning state paired with the GL context it was created in. Fields drop
/// in declaration order, so `scene` is released while the context still exists
/// on every exit path.
struct ContextBound<S, C> {
    scene: S,
    _context: C,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("SDL: {0}")]
    SdlError(String),
    #[error("config: {0}")]
    ConfigError(#[from] ConfigError),
    #[error(transparent)]
    SceneError(#[from] SceneError),
}

fn run(args: Args) -> Result<(), AppError> {
    let config_path = args.config.clone().unwrap_or_else(|| args.data_dir.join("viewer.toml"));
    let mut config = ViewerConfig::load(&config_path)?;

    if let Some(w) = args.width {
        config.window.width = w;
    }

    if let Some(h) = args.height {
        config.window.height = h;
    }

    let window_cfg = config.window.clone();

    // geometry & blend deltas are CPU-only, load them before opening a window
    let (scene, manifest) = Scene::load(config, &args.data_dir)?;

    let sdl = sdl2::init().map_err(AppError::SdlError)?;
    let sdl_video = sdl.video().map_err(AppError::SdlError)?;
    let sdl_timer = sdl.timer().map_err(AppError::SdlError)?;

    {
        let gl_attr = sdl_video.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Compatibility);
        gl_attr.set_context_version(3, 2);
    }

    let window = sdl_video
        .window(&window_cfg.title, window_cfg.width, window_cfg.height)
        .opengl()
        .resizable()
        .build()
        .map_err(|e| AppError::SdlError(e.to_string()))?;

    let gl_context = window.gl_create_context().map_err(AppError::SdlError)?;
    gl::load_with(|s| sdl_video.gl_get_proc_address(s) as *const _);

    let mut bound = ContextBound { scene, _context: gl_context };
    let scene = &mut bound.scene;

    let gl_ver = unsafe { CStr::from_ptr(gl::GetString(gl::VERSION) as *const _) }.to_string_lossy();
    let glsl_ver = unsafe { CStr::from_ptr(gl::GetString(gl::SHADING_LANGUAGE_VERSION) as *const _) }.to_string_lossy();
    info!("OpenGL version: {}", gl_ver);
    info!("GLSL version: {}", glsl_ver);

    if window_cfg.vsync {
        if let Err(e) = sdl_video.gl_set_swap_interval(1) {
            error!("Failed enabling vsync: {}", e);
        }
    }

    scene.init(&manifest, &args.shader_dir, &args.data_dir)?;

    let mut prev_tick = sdl_timer.performance_counter();
    let timer_freq = 1.0 / (sdl_timer.performance_frequency() as f64);
    let mut minimized = false;

    let mut event_pump = sdl.event_pump().map_err(AppError::SdlError)?;
    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit {..} => break 'main,
                Event::KeyDown { keycode: Some(Keycode::Escape), .. } => break 'main,
                Event::TextInput { text, .. } => {
                    for c in text.chars() {
                        scene.toggles.toggle(c);
                    }
                }
                Event::MouseButtonDown { mouse_btn: MouseButton::Left, x, y, .. } => {
                    let mods = sdl.keyboard().mod_state();
                    let shift = mods.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD);
                    let ctrl = mods.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD);
                    let alt = mods.intersects(Mod::LALTMOD | Mod::RALTMOD);
                    scene.camera.mouse_clicked(x as f32, y as f32, shift, ctrl, alt);
                }
                Event::MouseMotion { mousestate, x, y, .. } => {
                    if mousestate.left() {
                        scene.camera.mouse_moved(x as f32, y as f32);
                    }
                }
                Event::Window { win_event: WindowEvent::Minimized, .. } => minimized = true,
                Event::Window { win_event: WindowEvent::Restored, .. } => minimized = false,
                _ => {},
            }
        }

        let cur_tick = sdl_timer.performance_counter();
        let dt = ((cur_tick - prev_tick) as f64) * timer_freq;
        prev_tick = cur_tick;

        scene.advance(dt);

        if !minimized {
            let (fb_w, fb_h) = window.drawable_size();
            let (win_w, win_h) = window.size();

            if let Err(e) = scene.render(fb_w as i32, fb_h as i32, win_w as i32, win_h as i32) {
                error!("{}", e);
            }

            window.gl_swap_window();
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logger::init(args.log_level) {
        eprintln!("Failed installing logger: {}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

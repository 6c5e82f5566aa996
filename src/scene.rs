use std::{collections::HashMap, path::Path};

use glam::{Mat4, Vec3};
use log::{error, info, warn};
use thiserror::Error;

use crate::{blend::BlendError, camera::Camera, clock::{AnimationClock, KeyToggles}, config::ViewerConfig, graphics::{gfx::{check_gl_error, GfxError}, shader::Shader, sink::{AttributeLocations, AttributeSink, GlShapeBuffers}, texture::Texture}, manifest::Manifest, shape::Shape};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    BlendError(#[from] BlendError),
    #[error(transparent)]
    GfxError(#[from] GfxError),
}

fn data_path(data_dir: &Path, name: &str) -> String {
    data_dir.join(name).to_string_lossy().into_owned()
}

/// Create one shape per manifest mesh. Meshes whose path contains `blend_marker`
/// get every blend target in the manifest, in order.
pub fn build_shapes<S: AttributeSink>(manifest: &Manifest, data_dir: &Path, blend_marker: &str) -> Result<Vec<Shape<S>>, BlendError> {
    let blend_paths: Vec<String> = manifest.blend_meshes().iter().map(|x| data_path(data_dir, x)).collect();

    let mut shapes = Vec::with_capacity(manifest.meshes.len());

    for entry in &manifest.meshes {
        let mut shape = Shape::new();
        shape.load_mesh(&data_path(data_dir, &entry.mesh));

        if !blend_marker.is_empty() && entry.mesh.contains(blend_marker) {
            shape.load_blend(&blend_paths)?;
        }

        shape.set_texture_name(&entry.texture);
        shapes.push(shape);
    }

    Ok(shapes)
}

/// Everything the render loop touches. Owns all GPU resources; dropping the
/// scene releases them, so it must be dropped before the GL context.
pub struct Scene {
    config: ViewerConfig,
    shapes: Vec<Shape<GlShapeBuffers>>,
    textures: HashMap<String, Texture>,
    shader: Option<Shader>,
    pub camera: Camera,
    pub clock: AnimationClock,
    pub toggles: KeyToggles,
}

impl Scene {
    /// Load manifest geometry and precompute blend deltas. Does not touch GL.
    pub fn load(config: ViewerConfig, data_dir: &Path) -> Result<(Scene, Manifest), SceneError> {
        let manifest = Manifest::load(&data_dir.join(&config.scene.manifest));
        let shapes = build_shapes(&manifest, data_dir, &config.scene.blend_mesh_marker)?;

        let camera = Camera::new(Vec3::from_array(config.scene.camera_translation));
        let toggles = KeyToggles {
            animate: config.scene.start_animating,
            cull: config.scene.cull,
            wireframe: config.scene.wireframe,
        };

        let scene = Scene {
            config,
            shapes,
            textures: HashMap::new(),
            shader: None,
            camera,
            clock: AnimationClock::new(),
            toggles,
        };

        Ok((scene, manifest))
    }

    /// Compile shaders, create GPU buffers for every shape, load textures
    pub fn init(self: &mut Self, manifest: &Manifest, shader_dir: &Path, data_dir: &Path) -> Result<(), SceneError> {
        let shader_cfg = &self.config.shader;

        let mut shader = Shader::from_files(&shader_dir.join(&shader_cfg.vertex), &shader_dir.join(&shader_cfg.fragment))?;
        shader.add_attribute(&shader_cfg.position_attribute)?;
        shader.add_attribute(&shader_cfg.normal_attribute)?;
        shader.add_attribute(&shader_cfg.texcoord_attribute)?;

        for name in ["P", "MV", "ka", "ks", "s", "kdTex"] {
            shader.add_uniform(name);
        }

        let locations = AttributeLocations::from_shader(&shader, &shader_cfg.position_attribute, &shader_cfg.normal_attribute, &shader_cfg.texcoord_attribute)?;

        let [r, g, b, a] = self.config.scene.clear_color;
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl::Enable(gl::DEPTH_TEST);
            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
        }

        for shape in &mut self.shapes {
            shape.init(GlShapeBuffers::new(locations)?)?;
        }

        for name in &manifest.textures {
            match Texture::from_file(&data_dir.join(name), self.config.material.texture_unit) {
                Ok(tex) => {
                    tex.set_wrap_modes(gl::REPEAT, gl::REPEAT);
                    self.textures.insert(name.clone(), tex);
                }
                Err(e) => {
                    error!("Failed loading texture {}: {}", name, e);
                }
            }
        }

        for shape in &self.shapes {
            if !self.textures.contains_key(shape.texture_name()) {
                warn!("{} uses texture {} which isn't loaded; drawing untextured", shape.mesh_path(), shape.texture_name());
            }
        }

        self.shader = Some(shader);
        check_gl_error("Scene::init")?;

        info!("Scene ready: {} shapes, {} textures", self.shapes.len(), self.textures.len());
        Ok(())
    }

    pub fn advance(self: &mut Self, delta: f64) {
        self.clock.advance(delta, self.toggles.animate);
    }

    /// Draw every shape. Per-shape draw errors are logged and don't stop the
    /// remaining shapes; the frame's GL error state is returned.
    pub fn render(self: &mut Self, fb_width: i32, fb_height: i32, win_width: i32, win_height: i32) -> Result<(), GfxError> {
        let shader = match &self.shader {
            Some(v) => v,
            None => return Err(GfxError::NoProgram)
        };

        unsafe {
            gl::Viewport(0, 0, fb_width, fb_height);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);

            if self.toggles.cull { gl::Enable(gl::CULL_FACE) } else { gl::Disable(gl::CULL_FACE) };
            gl::PolygonMode(gl::FRONT_AND_BACK, if self.toggles.wireframe { gl::LINE } else { gl::FILL });
        }

        if win_height > 0 {
            self.camera.set_aspect(win_width as f32 / win_height as f32);
        }

        let projection = self.camera.projection_matrix();
        let model_view = self.camera.view_matrix() * Mat4::from_translation(Vec3::from_array(self.config.scene.global_translation));

        let material = &self.config.material;
        let t = self.clock.time();

        shader.bind();

        for shape in &mut self.shapes {
            let texture = self.textures.get(shape.texture_name());
            if let Some(tex) = texture {
                tex.bind(shader.uniform("kdTex"));
            }

            shader.set_uniform_mat4("P", &projection);
            shader.set_uniform_mat4("MV", &model_view);
            shader.set_uniform_vec3("ka", Vec3::from_array(material.ka));
            shader.set_uniform_vec3("ks", Vec3::from_array(material.ks));
            shader.set_uniform_float("s", material.shininess);

            if let Err(e) = shape.draw(t) {
                error!("Failed drawing {}: {}", shape.mesh_path(), e);
            }

            if let Some(tex) = texture {
                tex.unbind();
            }
        }

        shader.unbind();

        check_gl_error("Scene::render")
    }
}

use std::{fs, io, path::Path};

use log::info;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
    #[error("parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { title: "facemorph".to_string(), width: 640, height: 480, vsync: true }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: String,
    pub fragment: String,
    pub position_attribute: String,
    pub normal_attribute: String,
    pub texcoord_attribute: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        ShaderConfig {
            vertex: "phong_vert.glsl".to_string(),
            fragment: "phong_frag.glsl".to_string(),
            position_attribute: "aPos".to_string(),
            normal_attribute: "aNor".to_string(),
            texcoord_attribute: "aTex".to_string(),
        }
    }
}

/// Phong material constants shared by every shape
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MaterialConfig {
    pub ka: [f32;3],
    pub ks: [f32;3],
    pub shininess: f32,
    pub texture_unit: u32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        MaterialConfig { ka: [0.1, 0.1, 0.1], ks: [0.1, 0.1, 0.1], shininess: 200.0, texture_unit: 1 }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub manifest: String,
    /// Meshes whose path contains this receive the manifest's blend targets
    pub blend_mesh_marker: String,
    pub clear_color: [f32;4],
    pub global_translation: [f32;3],
    pub camera_translation: [f32;3],
    pub start_animating: bool,
    pub cull: bool,
    pub wireframe: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            manifest: "input.txt".to_string(),
            blend_mesh_marker: "head".to_string(),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            global_translation: [0.0, -18.5, 0.0],
            camera_translation: [0.0, 0.0, -5.0],
            start_animating: false,
            cull: true,
            wireframe: false,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub shader: ShaderConfig,
    pub material: MaterialConfig,
    pub scene: SceneConfig,
}

impl ViewerConfig {
    pub fn parse(src: &str) -> Result<ViewerConfig, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    /// Load from `path`; a missing file means all defaults
    pub fn load(path: &Path) -> Result<ViewerConfig, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(ViewerConfig::default());
        }

        info!("Loading config: {}", path.display());
        ViewerConfig::parse(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(ViewerConfig::parse("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = ViewerConfig::parse("\
[window]
width = 1280

[scene]
blend_mesh_marker = \"face\"
start_animating = true
").unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.scene.blend_mesh_marker, "face");
        assert!(config.scene.start_animating);
        assert_eq!(config.scene.manifest, "input.txt");
        assert_eq!(config.shader, ShaderConfig::default());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(matches!(ViewerConfig::parse("[window]\nwidth = \"wide\"\n"), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn missing_file_is_default() {
        let config = ViewerConfig::load(Path::new("/nonexistent/facemorph/viewer.toml")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}

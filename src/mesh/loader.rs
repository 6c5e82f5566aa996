use std::path::Path;

use log::{debug, error, info, warn};

use super::{glb, obj, FlatMesh, MeshError};

fn is_gltf(path: &str) -> bool {
    match Path::new(path).extension().and_then(|x| x.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("gltf") || ext.eq_ignore_ascii_case("glb"),
        None => false
    }
}

fn load_obj(path: &str, want_normals: bool, want_texcoords: bool, out: &mut FlatMesh) -> Result<(), MeshError> {
    let models = obj::load_models(Path::new(path))?;
    obj::flatten(&models, want_normals, want_texcoords, out)
}

/// Load a triangulated model into flat per-corner buffers.
///
/// Failures are never fatal: the error is logged and the mesh holds whatever was
/// complete before it (usually nothing), which simply draws zero vertices.
pub fn load_mesh(path: &str, want_normals: bool, want_texcoords: bool) -> FlatMesh {
    info!("Loading mesh: {}", path);

    let mut mesh = FlatMesh::new();

    let result = if is_gltf(path) {
        glb::flatten_file(path, want_normals, want_texcoords, &mut mesh)
    }
    else {
        load_obj(path, want_normals, want_texcoords, &mut mesh)
    };

    if let Err(e) = result {
        error!("Failed loading mesh {}: {}", path, e);
    }

    if mesh.has_normals() && mesh.normal.len() != mesh.position.len() {
        warn!("{}: {} normal values for {} position values", path, mesh.normal.len(), mesh.position.len());
    }

    debug!("{}: {} corners, normals: {}, texcoords: {}", path, mesh.vertex_count(), mesh.has_normals(), mesh.has_texcoords());

    mesh
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("facemorph-loader-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_obj_from_disk() {
        let path = write_fixture("tri.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nf 1/1/1 2/1/1 3/1/1\n");
        let mesh = load_mesh(path.to_str().unwrap(), true, true);
        fs::remove_file(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.normal.len(), mesh.position.len());
        assert_eq!(mesh.texcoord.len(), 6);
    }

    #[test]
    fn missing_file_yields_empty_mesh() {
        let mesh = load_mesh("/nonexistent/facemorph/head.obj", true, true);

        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn parse_error_yields_empty_mesh() {
        let path = write_fixture("broken.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nv 1 1 nope\nf 1 2 3\n");
        let mesh = load_mesh(path.to_str().unwrap(), true, true);
        fs::remove_file(&path).unwrap();

        assert!(mesh.is_empty());
    }

    #[test]
    fn missing_material_library_is_not_fatal() {
        let path = write_fixture("mtl.obj", "mtllib nowhere.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mesh = load_mesh(path.to_str().unwrap(), true, true);
        fs::remove_file(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn detects_gltf_extensions() {
        assert!(is_gltf("data/head.glb"));
        assert!(is_gltf("data/head.GLTF"));
        assert!(!is_gltf("data/head.obj"));
        assert!(!is_gltf("data/head"));
    }
}

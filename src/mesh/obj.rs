use std::path::Path;

use log::debug;
use tobj::{LoadOptions, Model};

use super::{FlatMesh, MeshError};

/// Polygons are fan-triangulated, but position, normal & texcoord keep separate
/// index spaces so a shared position can carry a different normal per corner.
fn load_options() -> LoadOptions {
    LoadOptions {
        single_index: false,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Read every model in a Wavefront OBJ file. Materials are not used, so a
/// missing or broken `.mtl` only gets a debug message.
pub fn load_models(path: &Path) -> Result<Vec<Model>, MeshError> {
    let (models, materials) = tobj::load_obj(path, &load_options())?;

    if let Err(e) = materials {
        debug!("{}: materials not loaded: {}", path.display(), e);
    }

    Ok(models)
}

fn check_indices(model: &Model, attribute: &str, indices: &[u32]) -> Result<(), MeshError> {
    if indices.len() != model.mesh.indices.len() {
        return Err(MeshError::IndexError {
            model: model.name.clone(),
            msg: format!("{} {} indices for {} corners", indices.len(), attribute, model.mesh.indices.len()),
        });
    }

    Ok(())
}

fn corner_values<'a>(model: &Model, values: &'a [f32], index: u32, width: usize) -> Result<&'a [f32], MeshError> {
    let start = index as usize * width;

    match values.get(start..start + width) {
        Some(v) => Ok(v),
        None => Err(MeshError::IndexError { model: model.name.clone(), msg: format!("index {} out of range", index) })
    }
}

/// Expand every model's triangles into per-corner attribute arrays, appending to `out`
/// in file order.
///
/// Normals & texcoords are emitted only if requested and some model has them;
/// then every corner of every model must reference one. All checks run before
/// anything is appended, so on error `out` is left as it was.
pub fn flatten(models: &[Model], want_normals: bool, want_texcoords: bool, out: &mut FlatMesh) -> Result<(), MeshError> {
    let emit_normals = want_normals && models.iter().any(|m| !m.mesh.normals.is_empty());
    let emit_texcoords = want_texcoords && models.iter().any(|m| !m.mesh.texcoords.is_empty());

    for model in models {
        if emit_normals {
            check_indices(model, "normal", &model.mesh.normal_indices)?;
        }

        if emit_texcoords {
            check_indices(model, "texcoord", &model.mesh.texcoord_indices)?;
        }
    }

    let mut flat = FlatMesh::new();

    for model in models {
        let mesh = &model.mesh;

        for (corner, &p) in mesh.indices.iter().enumerate() {
            flat.position.extend_from_slice(corner_values(model, &mesh.positions, p, 3)?);

            if emit_normals {
                flat.normal.extend_from_slice(corner_values(model, &mesh.normals, mesh.normal_indices[corner], 3)?);
            }

            if emit_texcoords {
                flat.texcoord.extend_from_slice(corner_values(model, &mesh.texcoords, mesh.texcoord_indices[corner], 2)?);
            }
        }
    }

    out.position.append(&mut flat.position);
    out.normal.append(&mut flat.normal);
    out.texcoord.append(&mut flat.texcoord);

    Ok(())
}

use gltf::{buffer::Data, mesh::{Mode, Semantic}, Document, Primitive};

use super::{FlatMesh, MeshError};

fn primitive_name(primitive: &Primitive, mesh_index: usize) -> String {
    format!("mesh {} primitive {}", mesh_index, primitive.index())
}

fn flatten_primitive(primitive: &Primitive, name: &str, buffers: &[Data], emit_normals: bool, emit_texcoords: bool, out: &mut FlatMesh) -> Result<(), MeshError> {
    if primitive.mode() != Mode::Triangles {
        return Err(MeshError::GltfError(format!("{}: unsupported primitive mode: {:?}", name, primitive.mode())));
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32;3]> = match reader.read_positions() {
        Some(v) => v.collect(),
        None => return Err(MeshError::GltfError(format!("{}: no positions", name)))
    };

    let normals: Vec<[f32;3]> = match reader.read_normals() {
        Some(v) if emit_normals => v.collect(),
        _ => Vec::new()
    };

    let texcoords: Vec<[f32;2]> = match reader.read_tex_coords(0) {
        Some(v) if emit_texcoords => v.into_f32().collect(),
        _ => Vec::new()
    };

    if emit_normals && normals.len() != positions.len() {
        return Err(MeshError::GltfError(format!("{}: {} normals for {} vertices", name, normals.len(), positions.len())));
    }

    if emit_texcoords && texcoords.len() != positions.len() {
        return Err(MeshError::GltfError(format!("{}: {} texcoords for {} vertices", name, texcoords.len(), positions.len())));
    }

    // non-indexed primitives already are a flat triangle list
    let indices: Vec<u32> = match reader.read_indices() {
        Some(v) => v.into_u32().collect(),
        None => (0..positions.len() as u32).collect()
    };

    if indices.len() % 3 != 0 {
        return Err(MeshError::GltfError(format!("{}: index count {} is not a multiple of 3", name, indices.len())));
    }

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(MeshError::GltfError(format!("{}: index {} out of range ({} vertices)", name, bad, positions.len())));
    }

    for idx in indices {
        let idx = idx as usize;

        out.position.extend_from_slice(&positions[idx]);

        if emit_normals {
            out.normal.extend_from_slice(&normals[idx]);
        }

        if emit_texcoords {
            out.texcoord.extend_from_slice(&texcoords[idx]);
        }
    }

    Ok(())
}

/// Flatten every triangle primitive of every mesh in the document, in document order.
/// glTF shares one index space across attributes, so each index expands to one corner.
///
/// Normals (texcoords) are emitted when requested and any primitive has them;
/// then every primitive must have them, otherwise the document is rejected. A
/// primitive is checked completely before it's appended, so `out` only ever
/// holds whole primitives with parallel attributes.
pub fn flatten_document(document: &Document, buffers: &[Data], want_normals: bool, want_texcoords: bool, out: &mut FlatMesh) -> Result<(), MeshError> {
    let primitives: Vec<(usize, Primitive)> = document.meshes().flat_map(|m| {
        let mesh_index = m.index();
        m.primitives().map(move |p| (mesh_index, p))
    }).collect();

    let has_normals = |p: &Primitive| p.get(&Semantic::Normals).is_some();
    let has_texcoords = |p: &Primitive| p.get(&Semantic::TexCoords(0)).is_some();

    let emit_normals = want_normals && primitives.iter().any(|(_, p)| has_normals(p));
    let emit_texcoords = want_texcoords && primitives.iter().any(|(_, p)| has_texcoords(p));

    for (mesh_index, primitive) in &primitives {
        if emit_normals && !has_normals(primitive) {
            return Err(MeshError::GltfError(format!("{} has no NORMAL while other primitives do", primitive_name(primitive, *mesh_index))));
        }

        if emit_texcoords && !has_texcoords(primitive) {
            return Err(MeshError::GltfError(format!("{} has no TEXCOORD_0 while other primitives do", primitive_name(primitive, *mesh_index))));
        }
    }

    for (mesh_index, primitive) in &primitives {
        let mut flat = FlatMesh::new();
        flatten_primitive(primitive, &primitive_name(primitive, *mesh_index), buffers, emit_normals, emit_texcoords, &mut flat)?;

        out.position.append(&mut flat.position);
        out.normal.append(&mut flat.normal);
        out.texcoord.append(&mut flat.texcoord);
    }

    Ok(())
}

pub fn flatten_file(path: &str, want_normals: bool, want_texcoords: bool, out: &mut FlatMesh) -> Result<(), MeshError> {
    let (document, buffers, _) = match gltf::import(path) {
        Ok(v) => v,
        Err(e) => return Err(MeshError::GltfError(e.to_string()))
    };

    flatten_document(&document, &buffers, want_normals, want_texcoords, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // binary chunk layout:
    //   0: 4 positions (unit quad)     48: 4 normals
    //  96: 4 texcoords                128: u16 indices [0 1 2 0 2 3]
    // 140: u16 indices [0 1 7] + pad
    fn bin_chunk() -> Vec<u8> {
        let mut bin = Vec::new();

        let floats: [f32; 32] = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0,
        ];
        for f in floats {
            bin.extend_from_slice(&f.to_le_bytes());
        }

        for i in [0u16, 1, 2, 0, 2, 3, 0, 1, 7, 0] {
            bin.extend_from_slice(&i.to_le_bytes());
        }

        bin
    }

    const BUFFER_LAYOUT: &str = r#"
        "buffers": [{ "byteLength": 148 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 48, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 96, "byteLength": 32 },
            { "buffer": 0, "byteOffset": 128, "byteLength": 12 },
            { "buffer": 0, "byteOffset": 140, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
            { "bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 4, "type": "VEC2" },
            { "bufferView": 3, "componentType": 5123, "count": 6, "type": "SCALAR" },
            { "bufferView": 4, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] }
        ],"#;

    const FULL: &str = r#"{ "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 }, "indices": 3 }"#;
    const POSITION_ONLY: &str = r#"{ "attributes": { "POSITION": 0 }, "indices": 3 }"#;

    fn pad4(bytes: &mut Vec<u8>, fill: u8) {
        while bytes.len() % 4 != 0 {
            bytes.push(fill);
        }
    }

    /// Binary glTF with one mesh made of `primitives`
    fn glb(primitives: &[&str]) -> Vec<u8> {
        let json = format!(r#"{{ "asset": {{ "version": "2.0" }}, {} "meshes": [{{ "primitives": [{}] }}] }}"#, BUFFER_LAYOUT, primitives.join(","));

        let mut json = json.into_bytes();
        pad4(&mut json, b' ');
        let mut bin = bin_chunk();
        pad4(&mut bin, 0);

        let total = 12 + 8 + json.len() + 8 + bin.len();

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    fn flatten_glb(primitives: &[&str], want_normals: bool, want_texcoords: bool) -> (Result<(), MeshError>, FlatMesh) {
        let (document, buffers, _) = gltf::import_slice(glb(primitives)).unwrap();

        let mut mesh = FlatMesh::new();
        let result = flatten_document(&document, &buffers, want_normals, want_texcoords, &mut mesh);
        (result, mesh)
    }

    #[test]
    fn expands_indices_per_corner() {
        let (result, mesh) = flatten_glb(&[FULL], true, true);
        result.unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normal.len(), mesh.position.len());
        assert_eq!(mesh.texcoord.len(), 12);

        // second triangle is [0 2 3]
        assert_eq!(&mesh.position[9..18], &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(&mesh.normal[12..15], &[0.0, 1.0, 0.0]);
        assert_eq!(&mesh.texcoord[10..12], &[0.0, 1.0]);
    }

    #[test]
    fn unrequested_attributes_stay_empty() {
        let (result, mesh) = flatten_glb(&[FULL], false, false);
        result.unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert!(!mesh.has_normals());
        assert!(!mesh.has_texcoords());
    }

    #[test]
    fn non_indexed_primitive_is_a_triangle_list() {
        let (result, mesh) = flatten_glb(&[r#"{ "attributes": { "POSITION": 5 } }"#], true, true);
        result.unwrap();

        assert_eq!(mesh.position, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_non_triangle_modes() {
        let (result, mesh) = flatten_glb(&[r#"{ "attributes": { "POSITION": 0 }, "indices": 3, "mode": 1 }"#], true, true);

        assert!(matches!(result, Err(MeshError::GltfError(_))));
        assert!(mesh.is_empty());
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let (result, mesh) = flatten_glb(&[r#"{ "attributes": { "POSITION": 0 }, "indices": 4 }"#], true, true);

        assert!(matches!(result, Err(MeshError::GltfError(_))));
        assert!(mesh.is_empty());
    }

    #[test]
    fn primitive_missing_normals_rejects_document() {
        let (result, mesh) = flatten_glb(&[POSITION_ONLY, FULL], true, false);

        assert!(matches!(result, Err(MeshError::GltfError(_))));
        assert!(mesh.is_empty());

        // without normals requested both primitives flatten
        let (result, mesh) = flatten_glb(&[POSITION_ONLY, FULL], false, false);
        result.unwrap();
        assert_eq!(mesh.vertex_count(), 12);
    }

    #[test]
    fn keeps_attributes_parallel_across_primitives() {
        let (result, mesh) = flatten_glb(&[FULL, FULL], true, true);
        result.unwrap();

        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.normal.len(), mesh.position.len());
        assert_eq!(mesh.texcoord.len() / 2, mesh.vertex_count());
    }
}

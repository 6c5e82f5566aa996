use log::{debug, info};

use crate::mesh::{load_mesh, FlatMesh};

use super::BlendError;

/// Per-corner offsets from the base mesh to one blend target
#[derive(Clone, Debug, PartialEq)]
pub struct DeltaSet {
    pub source: String,
    pub position: Vec<f32>,
    pub normal: Vec<f32>,
}

impl DeltaSet {
    /// `target - base`, pointwise over the full buffers.
    /// The target must have been flattened with the same face traversal as the base.
    pub fn compute(source: &str, base: &FlatMesh, target: &FlatMesh) -> Result<DeltaSet, BlendError> {
        if target.position.len() != base.position.len() {
            return Err(BlendError::TopologyMismatch {
                target: source.to_string(),
                attribute: "position",
                expected: base.position.len(),
                found: target.position.len(),
            });
        }

        // a base without normals has nothing to offset
        if base.has_normals() && target.normal.len() != base.normal.len() {
            return Err(BlendError::TopologyMismatch {
                target: source.to_string(),
                attribute: "normal",
                expected: base.normal.len(),
                found: target.normal.len(),
            });
        }

        let position = target.position.iter().zip(&base.position).map(|(t, b)| t - b).collect();

        let normal = if base.has_normals() {
            target.normal.iter().zip(&base.normal).map(|(t, b)| t - b).collect()
        }
        else {
            Vec::new()
        };

        Ok(DeltaSet { source: source.to_string(), position, normal })
    }
}

/// Base mesh plus the precomputed deltas of every blend target, in load order.
/// Targets are fixed once loaded.
pub struct BlendShapeStore {
    base: FlatMesh,
    deltas: Vec<DeltaSet>,
}

impl BlendShapeStore {
    pub fn new(base: FlatMesh) -> BlendShapeStore {
        BlendShapeStore { base, deltas: Vec::new() }
    }

    pub fn load_base(path: &str) -> BlendShapeStore {
        BlendShapeStore::new(load_mesh(path, true, true))
    }

    pub fn add_target(self: &mut Self, source: &str, target: &FlatMesh) -> Result<&DeltaSet, BlendError> {
        let delta = DeltaSet::compute(source, &self.base, target)?;
        debug!("Computed blend deltas for {} ({} values)", source, delta.position.len());

        self.deltas.push(delta);
        Ok(&self.deltas[self.deltas.len() - 1])
    }

    /// Load each target (normals on, texcoords off; texcoords always come from the base)
    /// and compute its deltas. Stops at the first target whose topology doesn't match.
    pub fn load_targets<S: AsRef<str>>(self: &mut Self, paths: &[S]) -> Result<&[DeltaSet], BlendError> {
        for path in paths {
            let path = path.as_ref();
            let target = load_mesh(path, true, false);
            self.add_target(path, &target)?;
        }

        info!("Loaded {} blend targets", self.deltas.len());

        Ok(&self.deltas)
    }

    pub fn base(self: &Self) -> &FlatMesh {
        &self.base
    }

    pub fn deltas(self: &Self) -> &[DeltaSet] {
        &self.deltas
    }

    pub fn target_count(self: &Self) -> usize {
        self.deltas.len()
    }
}

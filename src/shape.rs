use log::debug;

use crate::{blend::{compose_frame, weights::write_weights, BlendError, BlendShapeStore, FrameBuffers}, graphics::{gfx::GfxError, sink::{AttributeSink, AttributeSlot}}, mesh::FlatMesh};

/// A drawable mesh, optionally carrying blend targets.
///
/// Lifecycle: `load_mesh` (and `load_blend` for blend-shape meshes) once at scene
/// load, `init` once to hand over GPU storage, then `draw` every frame.
/// Dropping the shape (or calling `release`) frees its GPU storage.
pub struct Shape<S: AttributeSink> {
    mesh_path: String,
    texture_name: String,
    store: BlendShapeStore,
    weights: Vec<f32>,
    frame: FrameBuffers,
    sink: Option<S>,
}

impl<S: AttributeSink> Shape<S> {
    pub fn new() -> Shape<S> {
        Shape {
            mesh_path: String::new(),
            texture_name: String::new(),
            store: BlendShapeStore::new(FlatMesh::new()),
            weights: Vec::new(),
            frame: FrameBuffers::new(),
            sink: None,
        }
    }

    /// Load the base mesh (normals & texcoords). A failed load leaves an empty mesh.
    pub fn load_mesh(self: &mut Self, path: &str) {
        self.mesh_path = path.to_string();
        self.store = BlendShapeStore::load_base(path);
        self.reset_frame();
    }

    /// Build a shape around an already-loaded base mesh
    pub fn from_mesh(name: &str, base: FlatMesh) -> Shape<S> {
        let mut shape = Shape::new();
        shape.mesh_path = name.to_string();
        shape.store = BlendShapeStore::new(base);
        shape.reset_frame();
        shape
    }

    /// Load blend targets in order and precompute their deltas against the base
    pub fn load_blend<P: AsRef<str>>(self: &mut Self, paths: &[P]) -> Result<(), BlendError> {
        self.store.load_targets(paths)?;
        Ok(())
    }

    pub fn add_blend_target(self: &mut Self, source: &str, target: &FlatMesh) -> Result<(), BlendError> {
        self.store.add_target(source, target)?;
        Ok(())
    }

    fn reset_frame(self: &mut Self) {
        let base = self.store.base();
        self.frame.position.clone_from(&base.position);
        self.frame.normal.clone_from(&base.normal);
    }

    pub fn set_texture_name(self: &mut Self, name: &str) {
        self.texture_name = name.to_string();
    }

    pub fn texture_name(self: &Self) -> &str {
        &self.texture_name
    }

    pub fn mesh_path(self: &Self) -> &str {
        &self.mesh_path
    }

    pub fn base(self: &Self) -> &FlatMesh {
        self.store.base()
    }

    pub fn target_count(self: &Self) -> usize {
        self.store.target_count()
    }

    pub fn is_initialized(self: &Self) -> bool {
        self.sink.is_some()
    }

    /// Take ownership of GPU storage and upload the initial buffers.
    /// Texcoords are uploaded here only; they never change.
    pub fn init(self: &mut Self, mut sink: S) -> Result<(), GfxError> {
        sink.upload_attribute(AttributeSlot::Position, &self.frame.position)?;
        sink.upload_attribute(AttributeSlot::Normal, &self.frame.normal)?;
        sink.upload_attribute(AttributeSlot::Texcoord, &self.store.base().texcoord)?;

        debug!("Initialized shape {} ({} vertices, {} blend targets)", self.mesh_path, self.frame.vertex_count(), self.store.target_count());

        self.sink = Some(sink);
        Ok(())
    }

    /// Recompute the blended buffers for time `t` without touching the GPU
    pub fn compose(self: &mut Self, t: f32) -> &FrameBuffers {
        write_weights(t, self.store.target_count(), &mut self.weights);
        compose_frame(self.store.base(), self.store.deltas(), &self.weights, &mut self.frame);
        &self.frame
    }

    /// Compose for time `t`, upload positions & normals, and draw
    pub fn draw(self: &mut Self, t: f32) -> Result<&FrameBuffers, GfxError> {
        if self.sink.is_none() {
            return Err(GfxError::NotInitialized);
        }

        self.compose(t);

        if let Some(sink) = &mut self.sink {
            sink.upload_attribute(AttributeSlot::Position, &self.frame.position)?;
            sink.upload_attribute(AttributeSlot::Normal, &self.frame.normal)?;
            sink.draw_triangles(self.frame.vertex_count())?;
        }

        Ok(&self.frame)
    }

    /// Give up GPU storage. Returns it so the caller controls when it's dropped.
    pub fn release(self: &mut Self) -> Option<S> {
        self.sink.take()
    }

    pub fn frame(self: &Self) -> &FrameBuffers {
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::graphics::sink::testing::{RecordingSink, SinkCall};

    const EPSILON: f32 = 1e-6;

    fn triangle(z: f32) -> FlatMesh {
        FlatMesh {
            position: vec![0.0, 0.0, z, 1.0, 0.0, z, 0.0, 1.0, z],
            normal: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            texcoord: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        }
    }

    fn assert_close(lhs: &[f32], rhs: &[f32]) {
        assert_eq!(lhs.len(), rhs.len());
        for (a, b) in lhs.iter().zip(rhs) {
            assert!((a - b).abs() < EPSILON, "{:?} != {:?}", lhs, rhs);
        }
    }

    #[test]
    fn single_target_follows_weight_function() {
        let mut shape: Shape<RecordingSink> = Shape::from_mesh("head.obj", triangle(0.0));
        shape.add_blend_target("up.obj", &triangle(1.0)).unwrap();
        shape.init(RecordingSink::default()).unwrap();

        let frame = shape.draw(0.0).unwrap();
        assert_close(&frame.position, &triangle(1.0).position);

        let frame = shape.draw(PI).unwrap();
        assert_close(&frame.position, &triangle(0.0).position);
    }

    #[test]
    fn no_targets_draw_base_every_frame() {
        let mut shape: Shape<RecordingSink> = Shape::from_mesh("body.obj", triangle(0.5));
        shape.init(RecordingSink::default()).unwrap();

        for t in [0.0, 1.0, PI, 100.0, 12345.6] {
            let frame = shape.draw(t).unwrap();
            assert_eq!(frame.position, triangle(0.5).position);
            assert_eq!(frame.normal, triangle(0.5).normal);
        }
    }

    #[test]
    fn init_uploads_all_slots_once_and_draw_reuploads_geometry() {
        let mut shape: Shape<RecordingSink> = Shape::from_mesh("head.obj", triangle(0.0));
        shape.add_blend_target("up.obj", &triangle(1.0)).unwrap();
        shape.init(RecordingSink::default()).unwrap();
        shape.draw(PI).unwrap();
        shape.draw(PI).unwrap();

        let sink = shape.release().unwrap();
        let slots: Vec<_> = sink.calls.iter().map(|c| match c {
            SinkCall::Upload(slot, _) => format!("{:?}", slot),
            SinkCall::Draw(n) => format!("Draw({})", n),
        }).collect();

        assert_eq!(slots, vec![
            "Position", "Normal", "Texcoord",
            "Position", "Normal", "Draw(3)",
            "Position", "Normal", "Draw(3)",
        ]);

        assert_eq!(sink.calls[2], SinkCall::Upload(AttributeSlot::Texcoord, triangle(0.0).texcoord));
        assert!(!shape.is_initialized());
    }

    #[test]
    fn draw_before_init_fails() {
        let mut shape: Shape<RecordingSink> = Shape::from_mesh("head.obj", triangle(0.0));
        assert!(matches!(shape.draw(0.0), Err(GfxError::NotInitialized)));
    }

    #[test]
    fn failed_upload_keeps_cpu_buffers() {
        let mut shape: Shape<RecordingSink> = Shape::from_mesh("head.obj", triangle(0.0));
        shape.add_blend_target("up.obj", &triangle(1.0)).unwrap();
        shape.init(RecordingSink::default()).unwrap();

        let mut sink = shape.release().unwrap();
        sink.fail_uploads = true;
        shape.sink = Some(sink);

        assert!(shape.draw(0.0).is_err());
        assert_close(&shape.frame().position, &triangle(1.0).position);
        assert_eq!(shape.base().position, triangle(0.0).position);
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let mut shape: Shape<RecordingSink> = Shape::from_mesh("head.obj", triangle(0.0));
        let mut short = triangle(1.0);
        short.position.truncate(6);

        assert!(shape.add_blend_target("short.obj", &short).is_err());
        assert_eq!(shape.target_count(), 0);
    }

    #[test]
    fn missing_mesh_draws_nothing() {
        let mut shape: Shape<RecordingSink> = Shape::new();
        shape.load_mesh("/nonexistent/facemorph/body.obj");
        shape.init(RecordingSink::default()).unwrap();

        let frame = shape.draw(1.0).unwrap();
        assert_eq!(frame.vertex_count(), 0);

        let sink = shape.release().unwrap();
        assert_eq!(sink.calls.last(), Some(&SinkCall::Draw(0)));
    }
}

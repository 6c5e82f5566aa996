use thiserror::Error;

pub mod compositor;
pub mod store;
pub mod weights;

pub use compositor::{compose_frame, FrameBuffers};
pub use store::{BlendShapeStore, DeltaSet};
pub use weights::weights_for_time;

#[derive(Debug, Error, PartialEq)]
pub enum BlendError {
    #[error("blend target {target} does not match the base mesh topology: {attribute} has {found} values, base has {expected}")]
    TopologyMismatch {
        target: String,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
}

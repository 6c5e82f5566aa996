#[cfg(feature = "parallel_compose")]
use rayon::prelude::*;

use crate::mesh::FlatMesh;

use super::DeltaSet;

#[cfg(feature = "parallel_compose")]
const CHUNK_SIZE: usize = 4096;

/// Instantaneous blended buffers, same layout as the base mesh. Rewritten every frame.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct FrameBuffers {
    pub position: Vec<f32>,
    pub normal: Vec<f32>,
}

impl FrameBuffers {
    pub fn new() -> FrameBuffers {
        FrameBuffers::default()
    }

    pub fn vertex_count(self: &Self) -> usize {
        self.position.len() / 3
    }
}

#[cfg(feature = "parallel_compose")]
fn accumulate(out: &mut [f32], offsets: &[(&[f32], f32)]) {
    out.par_chunks_mut(CHUNK_SIZE).enumerate().for_each(|(chunk_idx, chunk)| {
        let start = chunk_idx * CHUNK_SIZE;

        for (delta, weight) in offsets {
            let delta = &delta[start..start + chunk.len()];

            for (v, d) in chunk.iter_mut().zip(delta) {
                *v += d * weight;
            }
        }
    });
}

#[cfg(not(feature = "parallel_compose"))]
fn accumulate(out: &mut [f32], offsets: &[(&[f32], f32)]) {
    for (delta, weight) in offsets {
        for (v, d) in out.iter_mut().zip(delta.iter()) {
            *v += d * weight;
        }
    }
}

fn blend_attribute(base: &[f32], offsets: &[(&[f32], f32)], out: &mut Vec<f32>) {
    out.clear();
    out.extend_from_slice(base);
    accumulate(out, offsets);
}

/// `base + Σ weights[i] * deltas[i]`, written into `out`.
///
/// This is an additive blend: weights aren't normalized and needn't sum to 1.
/// Every element receives its target offsets in target order, so the parallel
/// and sequential paths produce identical results. With no deltas `out` is a copy of the base.
pub fn compose_frame(base: &FlatMesh, deltas: &[DeltaSet], weights: &[f32], out: &mut FrameBuffers) {
    debug_assert!(weights.len() >= deltas.len(), "{} weights for {} blend targets", weights.len(), deltas.len());

    let position_offsets: Vec<(&[f32], f32)> = deltas.iter().zip(weights).map(|(d, w)| (d.position.as_slice(), *w)).collect();
    blend_attribute(&base.position, &position_offsets, &mut out.position);

    let normal_offsets: Vec<(&[f32], f32)> = deltas.iter().zip(weights).map(|(d, w)| (d.normal.as_slice(), *w)).collect();
    blend_attribute(&base.normal, &normal_offsets, &mut out.normal);
}

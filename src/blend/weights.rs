use std::f32::consts::{FRAC_PI_2, PI};

/// Crossfade factor: 1 at t = 0, 0 at t = π, period 2π
pub fn crossfade(t: f32) -> f32 {
    // reduce first so very large clock values don't lose all precision inside sin()
    let t = t.rem_euclid(2.0 * PI);
    ((t + FRAC_PI_2).sin() + 1.0) / 2.0
}

/// Weight of every blend target at time `t`.
///
/// Targets alternate between `f` and `1 - f` by index parity, so a single target
/// only ever sees `f` and with more than two targets every even target moves
/// together, as does every odd one.
pub fn weights_for_time(t: f32, target_count: usize) -> Vec<f32> {
    let mut weights = Vec::with_capacity(target_count);
    write_weights(t, target_count, &mut weights);
    weights
}

/// Same as `weights_for_time`, reusing `out`'s allocation
pub fn write_weights(t: f32, target_count: usize, out: &mut Vec<f32>) {
    let f = crossfade(t);
    let pair = [f, 1.0 - f];

    out.clear();
    out.extend((0..target_count).map(|i| pair[i % pair.len()]));
}

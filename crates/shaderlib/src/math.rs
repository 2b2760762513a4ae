//! Scalar helpers used when driving sketches from the CPU side.

use rand::seq::SliceRandom;
use rand::Rng;

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(value.min(max))
}

/// Linearly maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
/// Values outside the input range extrapolate.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

pub fn lerp(start: f32, end: f32, amount: f32) -> f32 {
    (1.0 - amount) * start + amount * end
}

/// Rounds to `decimals` places.
pub fn truncate(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Position of `value` within `[min, max]`, clamped to `[0, 1]`.
pub fn normalize(value: f32, min: f32, max: f32) -> f32 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Per-axis scale that makes the shorter side 1, e.g. `(16/9, 1)` for a
/// landscape surface.
pub fn ratio(width: f32, height: f32) -> (f32, f32) {
    if width > height {
        (width / height, 1.0)
    } else {
        (1.0, height / width)
    }
}

pub fn random_from_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    rng.gen::<f32>() * (max - min) + min
}

/// `None` for an empty slice.
pub fn random_from_slice<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

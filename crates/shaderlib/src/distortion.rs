//! UV distortions. Inputs are expected to be aspect corrected and centered
//! around `center`.

use glam::Vec2;

use crate::smoothstep;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulgeOptions {
    pub strength: f32,
    pub radius: f32,
    /// Falloff curve exponent; larger values concentrate the bulge.
    pub power: f32,
    pub center: Vec2,
}

impl Default for BulgeOptions {
    fn default() -> Self {
        Self {
            strength: 0.5,
            radius: 0.5,
            power: 1.0,
            center: Vec2::ZERO,
        }
    }
}

/// Pushes UVs radially away from `center`, strongest at the middle.
pub fn bulge_distortion(uv: Vec2, options: &BulgeOptions) -> Vec2 {
    let offset = uv - options.center;
    let dist = offset.length();
    let normalized = smoothstep(0.0, 1.0, (dist / options.radius).min(1.0));
    let falloff = (1.0 - normalized).powf(options.power) * options.strength;
    let direction = offset.normalize_or_zero();
    options.center + direction * (dist * (falloff + 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwirlOptions {
    pub strength: f32,
    pub radius: f32,
    pub center: Vec2,
}

impl Default for SwirlOptions {
    fn default() -> Self {
        Self {
            strength: 1.0,
            radius: 0.5,
            center: Vec2::ZERO,
        }
    }
}

/// Rotates UVs around `center` by an angle that shrinks with distance.
pub fn swirl_distortion(uv: Vec2, options: &SwirlOptions) -> Vec2 {
    let offset = uv - options.center;
    let dist = offset.length();
    let angle = offset.y.atan2(offset.x);
    let rotation = angle + options.strength * (1.0 - dist / options.radius);
    options.center + Vec2::new(dist * rotation.cos(), dist * rotation.sin())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveOptions {
    pub frequency: f32,
    pub amplitude: f32,
    /// Direction of travel in radians.
    pub angle: f32,
    pub time_offset: f32,
}

impl Default for WaveOptions {
    fn default() -> Self {
        Self {
            frequency: 10.0,
            amplitude: 0.1,
            angle: 0.0,
            time_offset: 0.0,
        }
    }
}

/// Displaces UVs perpendicular to a sine wave travelling along `angle`.
pub fn wave_distortion(uv: Vec2, options: &WaveOptions) -> Vec2 {
    let direction = Vec2::new(options.angle.cos(), options.angle.sin());
    let phase = uv.dot(direction) * options.frequency + options.time_offset;
    let perpendicular = Vec2::new(-direction.y, direction.x);
    uv + perpendicular * (phase.sin() * options.amplitude)
}

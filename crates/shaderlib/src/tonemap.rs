//! Tonemapping operators over linear RGB.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::smoothstep;

pub fn reinhard_tonemap(color: Vec3) -> Vec3 {
    color / (color + 1.0)
}

pub fn uncharted2_tonemap(color: Vec3) -> Vec3 {
    let col = color * 16.0;
    let (a, b, c, d, e, f): (f32, f32, f32, f32, f32, f32) = (0.15, 0.5, 0.1, 0.2, 0.02, 0.3);
    (col * (a * col + c * b) + d * e) / (col * (a * col + b) + d * f) - e / f
}

pub fn aces_tonemap(color: Vec3) -> Vec3 {
    let (a, b, c, d, e): (f32, f32, f32, f32, f32) = (2.51, 0.03, 2.43, 0.59, 0.14);
    (color * (a * color + b)) / (color * (c * color + d) + e)
}

pub fn cross_process_tonemap(color: Vec3) -> Vec3 {
    Vec3::new(color.x.powf(0.8), color.y.powf(1.2), color.z.powf(1.5))
        .clamp(Vec3::ZERO, Vec3::ONE)
}

pub fn bleach_bypass_tonemap(color: Vec3) -> Vec3 {
    let lum = color.dot(Vec3::new(0.2126, 0.7152, 0.0722));
    (Vec3::splat(lum).lerp(color, 0.7) * 1.2).clamp(Vec3::ZERO, Vec3::ONE)
}

pub fn technicolor_tonemap(color: Vec3) -> Vec3 {
    Vec3::new(color.x * 1.5, color.y * 1.2, color.z * 0.8 + color.x * 0.2)
        .clamp(Vec3::ZERO, Vec3::ONE)
}

pub fn cinematic_tonemap(color: Vec3) -> Vec3 {
    Vec3::new(
        smoothstep(0.05, 0.95, color.x * 0.95 + 0.02),
        smoothstep(0.05, 0.95, color.y * 1.05),
        smoothstep(0.05, 0.95, color.z * 1.1),
    )
}

pub fn unreal_tonemap(color: Vec3) -> Vec3 {
    color / (color + 0.155) * 1.019
}

pub fn tanh_tonemap(color: Vec3) -> Vec3 {
    let x = color.clamp(Vec3::splat(-40.0), Vec3::splat(40.0));
    let e = (-2.0 * x).exp();
    Vec3::splat(-1.0) + 2.0 / (Vec3::ONE + e)
}

/// Hyperbolic helpers spelled out in terms of `exp`, matching the shader
/// versions.
pub fn tanh(value: f32) -> f32 {
    let t = value.exp();
    (t - 1.0 / t) / (t + 1.0 / t)
}

pub fn sinh(value: f32) -> f32 {
    let t = value.exp();
    (t - 1.0 / t) / 2.0
}

pub fn cosh(value: f32) -> f32 {
    let t = value.exp();
    (t + 1.0 / t) / 2.0
}

/// Named operator, selectable from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tonemap {
    Reinhard,
    Uncharted2,
    Aces,
    CrossProcess,
    BleachBypass,
    Technicolor,
    Cinematic,
    Unreal,
    Tanh,
}

impl Tonemap {
    pub const ALL: [Tonemap; 9] = [
        Tonemap::Reinhard,
        Tonemap::Uncharted2,
        Tonemap::Aces,
        Tonemap::CrossProcess,
        Tonemap::BleachBypass,
        Tonemap::Technicolor,
        Tonemap::Cinematic,
        Tonemap::Unreal,
        Tonemap::Tanh,
    ];

    pub fn apply(self, color: Vec3) -> Vec3 {
        match self {
            Tonemap::Reinhard => reinhard_tonemap(color),
            Tonemap::Uncharted2 => uncharted2_tonemap(color),
            Tonemap::Aces => aces_tonemap(color),
            Tonemap::CrossProcess => cross_process_tonemap(color),
            Tonemap::BleachBypass => bleach_bypass_tonemap(color),
            Tonemap::Technicolor => technicolor_tonemap(color),
            Tonemap::Cinematic => cinematic_tonemap(color),
            Tonemap::Unreal => unreal_tonemap(color),
            Tonemap::Tanh => tanh_tonemap(color),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tonemap::Reinhard => "reinhard",
            Tonemap::Uncharted2 => "uncharted2",
            Tonemap::Aces => "aces",
            Tonemap::CrossProcess => "cross-process",
            Tonemap::BleachBypass => "bleach-bypass",
            Tonemap::Technicolor => "technicolor",
            Tonemap::Cinematic => "cinematic",
            Tonemap::Unreal => "unreal",
            Tonemap::Tanh => "tanh",
        }
    }

    /// Name of the WGSL function in [`crate::wgsl::LIBRARY`].
    pub fn wgsl_function(self) -> &'static str {
        match self {
            Tonemap::Reinhard => "reinhard_tonemap",
            Tonemap::Uncharted2 => "uncharted2_tonemap",
            Tonemap::Aces => "aces_tonemap",
            Tonemap::CrossProcess => "cross_process_tonemap",
            Tonemap::BleachBypass => "bleach_bypass_tonemap",
            Tonemap::Technicolor => "technicolor_tonemap",
            Tonemap::Cinematic => "cinematic_tonemap",
            Tonemap::Unreal => "unreal_tonemap",
            Tonemap::Tanh => "tanh_tonemap",
        }
    }
}

impl fmt::Display for Tonemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tonemap {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Tonemap::ALL
            .into_iter()
            .find(|tonemap| tonemap.name() == normalized)
            .ok_or_else(|| format!("unknown tonemap '{value}'"))
    }
}

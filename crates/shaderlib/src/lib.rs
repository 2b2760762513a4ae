//! Small shader-math library shared by sketches.
//!
//! Every function exists twice: as a CPU reference implementation over
//! `glam` vectors (the modules below) and as WGSL in [`wgsl::LIBRARY`], which
//! the renderer prepends to every sketch. The CPU versions exist for tests,
//! tooling and for checking what a shader will do with a given input; they
//! follow the WGSL line by line.

pub mod distortion;
pub mod math;
pub mod noise;
pub mod patterns;
pub mod tonemap;
pub mod wgsl;

pub use distortion::{bulge_distortion, swirl_distortion, wave_distortion};
pub use distortion::{BulgeOptions, SwirlOptions, WaveOptions};
pub use noise::{
    domain_warped_fbm, fbm, ridged_fbm, simplex_noise_3d, turbulence, warped_fbm_coords,
    FbmOptions, TurbulenceOptions, WarpedFbmOptions,
};
pub use patterns::{pixellation_pattern, sd_sphere, speckled_noise_pattern, vignette_pattern};
pub use tonemap::Tonemap;

/// GLSL-style `smoothstep`.
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL-style `step`: 0 below `edge`, 1 otherwise.
pub(crate) fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

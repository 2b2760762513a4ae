//! WGSL sources for the library functions.
//!
//! Shader-side signatures take plain parameters where the CPU versions take
//! option structs; the `*_with` variants expose every knob, the short forms
//! use the same defaults as the `Default` impls.

pub const NOISE: &str = include_str!("wgsl/noise.wgsl");
pub const DISTORTION: &str = include_str!("wgsl/distortion.wgsl");
pub const TONEMAP: &str = include_str!("wgsl/tonemap.wgsl");
pub const PATTERNS: &str = include_str!("wgsl/patterns.wgsl");

/// All of the above, in dependency order.
pub const LIBRARY: &str = concat!(
    include_str!("wgsl/noise.wgsl"),
    include_str!("wgsl/distortion.wgsl"),
    include_str!("wgsl/tonemap.wgsl"),
    include_str!("wgsl/patterns.wgsl"),
);

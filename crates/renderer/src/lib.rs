//! Renderer crate for the sketchbook.
//!
//! Glues the viewport, camera and full-screen quad to a swappable color
//! program, and ships the `wgpu` backend that draws it. The flow per frame is:
//!
//! ```text
//!   event loop
//!       │ FrameInput (time, mouse)
//!       ▼
//!   RenderSurface::render_frame ──▶ SurfaceBackend::draw ──▶ SketchUniforms ─▶ GPU UBO
//!       ▲                                   │
//!       │ set/take_active_program           └─▶ GpuProgram pipeline over the quad
//!   SketchLifecycleManager
//! ```
//!
//! `RenderSurface` owns the state machine (Uninitialized, Ready, Disposed)
//! and never talks to the GPU directly, which keeps the lifecycle contract
//! testable with a recording backend. Sketches are plain WGSL defining
//! `fn sketch(uv: vec2<f32>) -> vec4<f32>`; they are wrapped at runtime with
//! the frame uniform block and the `shaderlib` functions.

pub mod camera;
pub mod compile;
mod gpu;
pub mod quad;
pub mod runtime;
pub mod surface;
pub mod viewport;

pub use camera::OrthoCamera;
pub use gpu::{
    BackendOptions, GpuPowerPreference, GpuProgram, ProgramCompiler, SketchUniforms, WgpuBackend,
};
pub use quad::{QuadGeometry, QuadVertex};
pub use runtime::{FrameScheduler, SteppedTimeSource, SystemTimeSource, TimeSample, TimeSource};
pub use surface::{
    FrameContext, FrameInput, FrameOutcome, InitError, RenderSurface, ResizeSubscription,
    SurfaceBackend, SurfaceState,
};
pub use viewport::{Viewport, DEFAULT_MAX_PIXEL_RATIO};

/// Render surface driven by the wgpu backend.
pub type GpuSurface = RenderSurface<WgpuBackend>;

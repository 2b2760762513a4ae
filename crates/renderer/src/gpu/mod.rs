//! wgpu side of the renderer.
//!
//! - `context` owns instance/adapter/device/surface wiring and reconfigures
//!   the swapchain on resize.
//! - `pipeline` holds the layouts every sketch pipeline shares and builds the
//!   per-sketch render pipeline.
//! - `program` compiles wrapped WGSL into [`GpuProgram`]s.
//! - `uniforms` mirrors the WGSL `Frame` block and refreshes it per frame.
//! - `backend` glues everything into a [`crate::SurfaceBackend`].

mod backend;
mod context;
mod pipeline;
mod program;
mod uniforms;

pub use backend::{BackendOptions, WgpuBackend};
pub use context::GpuPowerPreference;
pub use program::{GpuProgram, ProgramCompiler};
pub use uniforms::SketchUniforms;

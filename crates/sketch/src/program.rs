use std::future::Future;
use std::pin::Pin;

/// A per-pixel color computation that can be bound to a render surface.
///
/// Programs are immutable once built and are replaced wholesale. Whatever GPU
/// resources a program captured at construction are released by
/// [`ColorProgram::dispose`], which consumes the handle so it cannot be bound
/// again afterwards.
pub trait ColorProgram {
    /// Human readable name used in logs.
    fn label(&self) -> &str;

    /// Releases the resources held by the program.
    fn dispose(self);
}

/// Why a sketch loader could not produce a program.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read sketch source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to compile sketch: {0}")]
    Compile(String),
    #[error("{0}")]
    Other(String),
}

/// Future returned by a sketch loader.
///
/// Loading runs on the render thread; the future is not `Send`.
pub type LoadFuture<P> = Pin<Box<dyn Future<Output = Result<P, LoadError>>>>;

/// Failures reported by a surface that hosts color programs.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The surface was used after `dispose`; this is a lifecycle ordering bug.
    #[error("render surface used after it was disposed")]
    UseAfterDispose,
    #[error("render backend error: {0}")]
    Backend(String),
}

/// The slot a [`crate::SketchLifecycleManager`] installs programs into.
///
/// Implementations hold at most one active program. Installing does not
/// dispose whatever was installed before; callers take the previous program
/// out first and dispose it themselves.
pub trait ProgramHost<P> {
    /// Binds `program` as the active color computation.
    fn set_active_program(&mut self, program: P) -> Result<(), SurfaceError>;

    /// Detaches and returns the active program, if any.
    fn take_active_program(&mut self) -> Result<Option<P>, SurfaceError>;

    /// Label of the program currently bound, if any.
    fn active_label(&self) -> Option<&str>;
}

use std::fmt;

use sketch::{ColorProgram, ProgramHost, SurfaceError};
use tracing::{debug, error, trace, warn};

use crate::camera::OrthoCamera;
use crate::quad::QuadGeometry;
use crate::runtime::TimeSample;
use crate::viewport::Viewport;

/// Why a surface could not be brought up. Fatal to startup.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to create rendering surface: {0}")]
    Surface(String),
    #[error("failed to find a suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("render surface was already disposed")]
    Disposed,
    #[error("render surface is already initialized")]
    AlreadyInitialized,
}

/// Per-frame inputs that do not live on the surface itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub time: TimeSample,
    /// Cursor position and press anchor in physical pixels, origin at the
    /// bottom-left corner.
    pub mouse: [f32; 4],
}

impl FrameInput {
    pub fn new(time: TimeSample) -> Self {
        Self {
            time,
            mouse: [0.0; 4],
        }
    }

    pub fn with_mouse(mut self, mouse: [f32; 4]) -> Self {
        self.mouse = mouse;
        self
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub viewport: &'a Viewport,
    pub camera: &'a OrthoCamera,
    pub quad: &'a QuadGeometry,
    pub input: &'a FrameInput,
}

/// GPU device, swapchain and draw submission behind a [`RenderSurface`].
pub trait SurfaceBackend {
    type Program: ColorProgram;

    /// Submits one frame. `program` is `None` until a sketch is installed, in
    /// which case the backend only clears.
    fn draw(
        &mut self,
        frame: &FrameContext<'_>,
        program: Option<&Self::Program>,
    ) -> Result<(), SurfaceError>;

    /// Called once per effective viewport change.
    fn resize(&mut self, viewport: &Viewport);

    /// Releases device resources. Called exactly once, from
    /// [`RenderSurface::dispose`].
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Ready,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A program was drawn and presented.
    Presented,
    /// No program is bound; the surface was cleared.
    Cleared,
    /// The surface has no backend yet.
    Skipped,
}

/// Handle returned by [`RenderSurface::on_resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeSubscription(u64);

type ResizeObserver = Box<dyn FnMut(&Viewport)>;

enum BackendSlot<B> {
    Uninitialized,
    Ready(B),
    Disposed,
}

/// Owns the viewport, camera, quad and the active program, and forwards draws
/// to a [`SurfaceBackend`].
///
/// The surface never schedules frames; callers drive [`RenderSurface::render_frame`].
pub struct RenderSurface<B: SurfaceBackend> {
    viewport: Viewport,
    camera: OrthoCamera,
    quad: QuadGeometry,
    backend: BackendSlot<B>,
    program: Option<B::Program>,
    observers: Vec<(ResizeSubscription, ResizeObserver)>,
    next_observer: u64,
}

impl<B: SurfaceBackend> RenderSurface<B> {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            camera: OrthoCamera::new(viewport.aspect()),
            viewport,
            quad: QuadGeometry::full_screen(),
            backend: BackendSlot::Uninitialized,
            program: None,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn state(&self) -> SurfaceState {
        match self.backend {
            BackendSlot::Uninitialized => SurfaceState::Uninitialized,
            BackendSlot::Ready(_) => SurfaceState::Ready,
            BackendSlot::Disposed => SurfaceState::Disposed,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn quad(&self) -> &QuadGeometry {
        &self.quad
    }

    pub fn backend(&self) -> Option<&B> {
        match &self.backend {
            BackendSlot::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        match &mut self.backend {
            BackendSlot::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Builds the backend. On failure the surface stays uninitialized and
    /// the error is returned untouched.
    pub fn initialize<F>(&mut self, factory: F) -> Result<(), InitError>
    where
        F: FnOnce(&Viewport, &QuadGeometry) -> Result<B, InitError>,
    {
        match self.backend {
            BackendSlot::Disposed => return Err(InitError::Disposed),
            BackendSlot::Ready(_) => return Err(InitError::AlreadyInitialized),
            BackendSlot::Uninitialized => {}
        }
        let backend = factory(&self.viewport, &self.quad)?;
        let (width, height) = self.viewport.physical_size();
        debug!(width, height, "render surface ready");
        self.backend = BackendSlot::Ready(backend);
        Ok(())
    }

    /// Draws one frame with the current viewport, camera and program.
    pub fn render_frame(&mut self, input: &FrameInput) -> Result<FrameOutcome, SurfaceError> {
        let backend = match &mut self.backend {
            BackendSlot::Ready(backend) => backend,
            BackendSlot::Uninitialized => {
                trace!("render requested before initialization; skipping");
                return Ok(FrameOutcome::Skipped);
            }
            BackendSlot::Disposed => {
                error!("render_frame called on a disposed surface");
                return Err(SurfaceError::UseAfterDispose);
            }
        };

        let frame = FrameContext {
            viewport: &self.viewport,
            camera: &self.camera,
            quad: &self.quad,
            input,
        };
        backend.draw(&frame, self.program.as_ref())?;
        Ok(if self.program.is_some() {
            FrameOutcome::Presented
        } else {
            FrameOutcome::Cleared
        })
    }

    /// Applies new window metrics. Camera, backend and observers are updated
    /// once per effective change; repeated calls with the same values do
    /// nothing. Returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> bool {
        if matches!(self.backend, BackendSlot::Disposed) {
            debug!("ignoring resize of disposed surface");
            return false;
        }
        if !self.viewport.resize(width, height, device_pixel_ratio) {
            return false;
        }

        self.camera.set_aspect(self.viewport.aspect());
        if let BackendSlot::Ready(backend) = &mut self.backend {
            backend.resize(&self.viewport);
        }
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.viewport);
        }
        debug!(
            width,
            height,
            pixel_ratio = self.viewport.pixel_ratio(),
            "surface resized"
        );
        true
    }

    pub fn on_resize<F>(&mut self, observer: F) -> ResizeSubscription
    where
        F: FnMut(&Viewport) + 'static,
    {
        self.next_observer += 1;
        let subscription = ResizeSubscription(self.next_observer);
        self.observers.push((subscription, Box::new(observer)));
        subscription
    }

    pub fn remove_resize_observer(&mut self, subscription: ResizeSubscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(handle, _)| *handle != subscription);
        self.observers.len() != before
    }

    /// Disposes the active program, releases the backend and drops every
    /// resize observer. Safe to call more than once.
    pub fn dispose(&mut self) {
        if matches!(self.backend, BackendSlot::Disposed) {
            trace!("surface already disposed");
            return;
        }
        if let Some(program) = self.program.take() {
            debug!(program = program.label(), "disposing bound program");
            program.dispose();
        }
        if let BackendSlot::Ready(mut backend) =
            std::mem::replace(&mut self.backend, BackendSlot::Disposed)
        {
            backend.release();
        }
        self.observers.clear();
        debug!("render surface disposed");
    }
}

impl<B: SurfaceBackend> ProgramHost<B::Program> for RenderSurface<B> {
    fn set_active_program(&mut self, program: B::Program) -> Result<(), SurfaceError> {
        if matches!(self.backend, BackendSlot::Disposed) {
            error!(
                program = program.label(),
                "program installed into a disposed surface; disposing it"
            );
            program.dispose();
            return Err(SurfaceError::UseAfterDispose);
        }
        if let Some(previous) = self.program.replace(program) {
            warn!(
                program = previous.label(),
                "replaced a bound program that was not taken first"
            );
        }
        Ok(())
    }

    fn take_active_program(&mut self) -> Result<Option<B::Program>, SurfaceError> {
        if matches!(self.backend, BackendSlot::Disposed) {
            error!("take_active_program called on a disposed surface");
            return Err(SurfaceError::UseAfterDispose);
        }
        Ok(self.program.take())
    }

    fn active_label(&self) -> Option<&str> {
        self.program.as_ref().map(|program| program.label())
    }
}

impl<B: SurfaceBackend> fmt::Debug for RenderSurface<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSurface")
            .field("state", &self.state())
            .field("viewport", &self.viewport)
            .field("program", &self.active_label())
            .field("observers", &self.observers.len())
            .finish()
    }
}

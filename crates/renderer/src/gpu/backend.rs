use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use sketch::SurfaceError;
use wgpu::util::DeviceExt;

use crate::quad::QuadGeometry;
use crate::surface::{FrameContext, InitError, SurfaceBackend};
use crate::viewport::Viewport;

use super::context::{GpuContext, GpuPowerPreference};
use super::pipeline::PipelineLayouts;
use super::program::{GpuProgram, ProgramCompiler};
use super::uniforms::SketchUniforms;

/// Knobs for [`WgpuBackend`] construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendOptions {
    /// Linear RGB used when no sketch is bound and behind every frame.
    pub clear_color: [f32; 3],
    pub power: GpuPowerPreference,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            power: GpuPowerPreference::default(),
        }
    }
}

/// wgpu implementation of [`SurfaceBackend`].
pub struct WgpuBackend {
    context: GpuContext,
    quad_buffer: wgpu::Buffer,
    quad_vertices: u32,
    uniforms: SketchUniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    compiler: ProgramCompiler,
    clear_color: wgpu::Color,
    released: bool,
}

impl WgpuBackend {
    /// Returns a factory for [`crate::RenderSurface::initialize`] that binds
    /// the backend to `target`.
    pub fn factory<T>(
        target: T,
        options: BackendOptions,
    ) -> impl FnOnce(&Viewport, &QuadGeometry) -> Result<WgpuBackend, InitError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        move |viewport, quad| Self::new(target, viewport, quad, options)
    }

    pub fn new<T>(
        target: T,
        viewport: &Viewport,
        quad: &QuadGeometry,
        options: BackendOptions,
    ) -> Result<Self, InitError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let (width, height) = viewport.physical_size();
        let context = GpuContext::new(target, (width, height), options.power)?;
        let device = &context.device;

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("full-screen quad"),
            contents: quad.as_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = SketchUniforms::new(width, height);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layouts = PipelineLayouts::new(device);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let compiler = ProgramCompiler::new(device.clone(), layouts, context.surface_format);
        let [r, g, b] = options.clear_color;
        tracing::info!(
            adapter = %context.adapter_name,
            width,
            height,
            "GPU backend initialized"
        );

        Ok(Self {
            context,
            quad_buffer,
            quad_vertices: quad.vertex_count(),
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            compiler,
            clear_color: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: 1.0,
            },
            released: false,
        })
    }

    /// Compiler bound to this backend's device and surface format.
    pub fn compiler(&self) -> ProgramCompiler {
        self.compiler.clone()
    }
}

impl SurfaceBackend for WgpuBackend {
    type Program = GpuProgram;

    fn draw(
        &mut self,
        frame: &FrameContext<'_>,
        program: Option<&GpuProgram>,
    ) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::UseAfterDispose);
        }

        let surface_texture = match self.context.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout; retrying next frame");
                return Ok(());
            }
            Err(err) => return Err(SurfaceError::Backend(err.to_string())),
        };

        self.uniforms.update(frame);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sketch frame encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sketch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(program) = program {
                pass.set_pipeline(program.pipeline());
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                pass.draw(0..self.quad_vertices, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) {
        if self.released {
            return;
        }
        self.context.resize(viewport.physical_size());
    }

    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        self.quad_buffer.destroy();
        self.uniform_buffer.destroy();
        tracing::debug!("GPU backend released");
    }
}

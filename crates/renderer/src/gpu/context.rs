use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::surface::InitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Instance, surface, device and swapchain configuration for one window.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    pub adapter_name: String,
}

impl GpuContext {
    pub(crate) fn new<T>(
        target: T,
        (width, height): (u32, u32),
        power: GpuPowerPreference,
    ) -> Result<Self, InitError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let surface = instance
            .create_surface(target)
            .map_err(|err| InitError::Surface(err.to_string()))?;

        let power_preference = match power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| InitError::Adapter(err.to_string()))?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let max_dimension = limits.max_texture_dimension_2d;
        let requested_width = width.max(1);
        let requested_height = height.max(1);
        if requested_width > max_dimension || requested_height > max_dimension {
            return Err(InitError::Surface(format!(
                "GPU max texture dimension is {max_dimension}, requested surface is {requested_width}x{requested_height}"
            )));
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = surface_caps.formats.first() else {
            return Err(InitError::Surface(
                "surface is incompatible with the selected adapter".into(),
            ));
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or_else(|| {
                tracing::warn!(
                    fallback = ?first_format,
                    "no linear (non-sRGB) surface format available; colors will be gamma encoded twice"
                );
                first_format
            });

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("sketchbook device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(limits.clone()),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| InitError::Device(err.to_string()))?;

        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .or_else(|| surface_caps.present_modes.first().copied())
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::debug!(?present_mode, ?surface_format, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: requested_width,
            height: requested_height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            surface_format,
            adapter_name: adapter_info.name,
        })
    }

    pub(crate) fn resize(&mut self, (width, height): (u32, u32)) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-applies the current configuration after the swapchain was lost.
    pub(crate) fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

use std::borrow::Cow;
use std::fmt;

use sketch::{ColorProgram, LoadError, LoadFuture};

use crate::compile::{check_sketch_source, sketch_line_offset, wrap_sketch_source};

use super::pipeline::{create_sketch_pipeline, PipelineLayouts};

/// A compiled sketch: one render pipeline over the shared quad.
pub struct GpuProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
}

impl GpuProgram {
    pub(crate) fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

impl ColorProgram for GpuProgram {
    fn label(&self) -> &str {
        &self.label
    }

    fn dispose(self) {
        tracing::debug!(program = %self.label, "releasing sketch pipeline");
        drop(self.pipeline);
    }
}

impl fmt::Debug for GpuProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuProgram")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Turns WGSL sketch source into [`GpuProgram`]s on the surface's device.
///
/// Cheap to clone; loaders capture their own copy.
#[derive(Clone)]
pub struct ProgramCompiler {
    device: wgpu::Device,
    layouts: PipelineLayouts,
    surface_format: wgpu::TextureFormat,
}

impl ProgramCompiler {
    pub(crate) fn new(
        device: wgpu::Device,
        layouts: PipelineLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            layouts,
            surface_format,
        }
    }

    /// Starts compiling `source`. Validation errors surface as
    /// [`LoadError::Compile`] with line numbers relative to the sketch source.
    pub fn compile(&self, label: impl Into<String>, source: impl Into<String>) -> LoadFuture<GpuProgram> {
        let compiler = self.clone();
        let label = label.into();
        let source = source.into();
        Box::pin(async move { compiler.build(label, &source).await })
    }

    async fn build(&self, label: String, source: &str) -> Result<GpuProgram, LoadError> {
        check_sketch_source(source).map_err(LoadError::Compile)?;
        let wrapped = wrap_sketch_source(source);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(wrapped)),
        });

        let info = module.get_compilation_info().await;
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|message| message.message_type == wgpu::CompilationMessageType::Error)
            .map(format_compilation_message)
            .collect();
        if !errors.is_empty() {
            let _ = self.device.pop_error_scope().await;
            return Err(LoadError::Compile(errors.join("\n")));
        }

        let pipeline = create_sketch_pipeline(
            &self.device,
            &self.layouts,
            self.surface_format,
            &module,
            &label,
        );
        if let Some(err) = self.device.pop_error_scope().await {
            return Err(LoadError::Compile(err.to_string()));
        }

        tracing::debug!(program = %label, "compiled sketch pipeline");
        Ok(GpuProgram { label, pipeline })
    }
}

impl fmt::Debug for ProgramCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramCompiler")
            .field("surface_format", &self.surface_format)
            .finish_non_exhaustive()
    }
}

fn format_compilation_message(message: &wgpu::CompilationMessage) -> String {
    match &message.location {
        Some(location) => {
            let offset = sketch_line_offset();
            if location.line_number > offset {
                format!(
                    "line {}:{}: {}",
                    location.line_number - offset,
                    location.line_position,
                    message.message
                )
            } else {
                format!("prelude line {}: {}", location.line_number, message.message)
            }
        }
        None => message.message.clone(),
    }
}

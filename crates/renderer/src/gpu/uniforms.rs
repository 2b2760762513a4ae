use bytemuck::{Pod, Zeroable};
use chrono::{Datelike, Local, Timelike};

use crate::surface::FrameContext;

/// CPU mirror of the WGSL `Frame` block in [`crate::compile::FRAME_BLOCK`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SketchUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub delta: f32,
    pub mouse: [f32; 4],
    pub date: [f32; 4],
    pub frame_index: u32,
    pub aspect: f32,
    pub pixel_ratio: f32,
    pub _padding: f32,
}

impl SketchUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            resolution: [width as f32, height as f32],
            time: 0.0,
            delta: 0.0,
            mouse: [0.0; 4],
            date: [0.0; 4],
            frame_index: 0,
            aspect: if height == 0 {
                1.0
            } else {
                width as f32 / height as f32
            },
            pixel_ratio: 1.0,
            _padding: 0.0,
        };
        uniforms.refresh_date();
        uniforms
    }

    /// Copies viewport, camera, time and mouse state for the next frame.
    pub fn update(&mut self, frame: &FrameContext<'_>) {
        let (width, height) = frame.viewport.physical_size();
        self.view_proj = frame.camera.view_projection().to_cols_array_2d();
        self.resolution = [width as f32, height as f32];
        self.time = frame.input.time.seconds;
        self.delta = frame.input.time.delta;
        self.frame_index = frame.input.time.frame_index.min(u64::from(u32::MAX)) as u32;
        self.mouse = frame.input.mouse;
        self.aspect = frame.camera.aspect();
        self.pixel_ratio = frame.viewport.pixel_ratio();
        self.refresh_date();
    }

    fn refresh_date(&mut self) {
        let local_now = Local::now();
        let seconds_since_midnight = local_now.num_seconds_from_midnight() as f32
            + local_now.nanosecond() as f32 / 1_000_000_000.0;
        self.date = [
            local_now.year() as f32,
            local_now.month() as f32,
            local_now.day() as f32,
            seconds_since_midnight,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrthoCamera;
    use crate::quad::QuadGeometry;
    use crate::runtime::TimeSample;
    use crate::surface::FrameInput;
    use crate::viewport::Viewport;

    #[test]
    fn layout_matches_wgsl_block() {
        assert_eq!(std::mem::size_of::<SketchUniforms>(), 128);
        assert_eq!(std::mem::size_of::<SketchUniforms>() % 16, 0);
    }

    #[test]
    fn update_uses_physical_resolution() {
        let mut viewport = Viewport::new(100, 50);
        viewport.resize(400, 200, 2.0);
        let camera = OrthoCamera::new(viewport.aspect());
        let quad = QuadGeometry::full_screen();
        let input = FrameInput::new(TimeSample::new(1.5, 0.25, 7)).with_mouse([1.0, 2.0, 3.0, 4.0]);
        let frame = FrameContext {
            viewport: &viewport,
            camera: &camera,
            quad: &quad,
            input: &input,
        };

        let mut uniforms = SketchUniforms::new(1, 1);
        uniforms.update(&frame);

        assert_eq!(uniforms.resolution, [800.0, 400.0]);
        assert_eq!(uniforms.time, 1.5);
        assert_eq!(uniforms.delta, 0.25);
        assert_eq!(uniforms.frame_index, 7);
        assert_eq!(uniforms.aspect, 2.0);
        assert_eq!(uniforms.pixel_ratio, 2.0);
        assert_eq!(uniforms.mouse, [1.0, 2.0, 3.0, 4.0]);
        assert!(uniforms.date[0] >= 2024.0);
    }
}

/// Upper bound applied to the device pixel ratio unless configured otherwise.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Logical drawing area plus the pixel ratio used to size the backing
/// surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    max_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_max_pixel_ratio(width, height, DEFAULT_MAX_PIXEL_RATIO)
    }

    /// A `max_pixel_ratio` that is not a finite positive number falls back to
    /// [`DEFAULT_MAX_PIXEL_RATIO`].
    pub fn with_max_pixel_ratio(width: u32, height: u32, max_pixel_ratio: f32) -> Self {
        let max_pixel_ratio = if max_pixel_ratio.is_finite() && max_pixel_ratio > 0.0 {
            max_pixel_ratio
        } else {
            DEFAULT_MAX_PIXEL_RATIO
        };
        Self {
            width,
            height,
            pixel_ratio: 1.0f32.min(max_pixel_ratio),
            max_pixel_ratio,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn max_pixel_ratio(&self) -> f32 {
        self.max_pixel_ratio
    }

    /// Width over height; 1 while the height is zero.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Backing surface size in physical pixels, never below 1x1.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |logical: u32| ((logical as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    /// Stores new logical dimensions and the capped device pixel ratio.
    /// Returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> bool {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let pixel_ratio = device_pixel_ratio.min(self.max_pixel_ratio);
        let changed =
            width != self.width || height != self.height || pixel_ratio != self.pixel_ratio;
        self.width = width;
        self.height = height;
        self.pixel_ratio = pixel_ratio;
        changed
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_device_pixel_ratio() {
        let mut viewport = Viewport::new(640, 480);
        assert!(viewport.resize(800, 600, 3.0));
        assert_eq!(viewport.width(), 800);
        assert_eq!(viewport.height(), 600);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.physical_size(), (1600, 1200));
        assert!((viewport.aspect() - 800.0 / 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn repeated_resize_reports_no_change() {
        let mut viewport = Viewport::new(640, 480);
        assert!(viewport.resize(800, 600, 1.5));
        assert!(!viewport.resize(800, 600, 1.5));
        // Both ratios clamp to the same cap.
        assert!(viewport.resize(800, 600, 4.0));
        assert!(!viewport.resize(800, 600, 3.0));
    }

    #[test]
    fn invalid_device_ratio_falls_back_to_one() {
        let mut viewport = Viewport::with_max_pixel_ratio(100, 100, 3.0);
        viewport.resize(100, 100, f32::NAN);
        assert_eq!(viewport.pixel_ratio(), 1.0);
        viewport.resize(100, 100, -2.0);
        assert_eq!(viewport.pixel_ratio(), 1.0);
    }

    #[test]
    fn degenerate_sizes_stay_drawable() {
        let mut viewport = Viewport::new(10, 10);
        viewport.resize(0, 0, 1.0);
        assert_eq!(viewport.aspect(), 1.0);
        assert_eq!(viewport.physical_size(), (1, 1));
    }

    #[test]
    fn invalid_cap_uses_default() {
        let viewport = Viewport::with_max_pixel_ratio(10, 10, 0.0);
        assert_eq!(viewport.max_pixel_ratio(), DEFAULT_MAX_PIXEL_RATIO);
    }
}

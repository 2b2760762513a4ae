use glam::{Mat4, Vec3};

/// Fixed orthographic camera looking down -Z at the full-screen quad.
///
/// The frustum always spans [-1, 1] on both axes, so the quad fills the
/// surface at any size. The aspect ratio is tracked for sketches (it reaches
/// them through the frame uniforms) but does not stretch the frustum.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoCamera {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    near: f32,
    far: f32,
    position: Vec3,
    aspect: f32,
    projection: Mat4,
    projection_updates: u64,
}

impl OrthoCamera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: Self::NEAR,
            far: Self::FAR,
            position: Vec3::new(0.0, 0.0, 1.0),
            aspect,
            projection: Mat4::IDENTITY,
            projection_updates: 0,
        };
        camera.projection = camera.compute_projection();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    /// Projection times view, as uploaded to the vertex stage.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }

    /// Number of projection recomputations since construction.
    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }

    /// Records a new aspect ratio and recomputes the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection = self.compute_projection();
        self.projection_updates += 1;
    }

    fn compute_projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

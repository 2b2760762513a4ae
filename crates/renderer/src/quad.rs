use bytemuck::{Pod, Zeroable};

/// Position on the z = 0 plane plus the matching texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unit plane scaled to cover normalized device coordinates.
///
/// UVs run from (0, 0) at the bottom-left corner to (1, 1) at the top-right.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadGeometry {
    vertices: [QuadVertex; 6],
    scale: f32,
}

impl QuadGeometry {
    pub fn full_screen() -> Self {
        Self::scaled(2.0)
    }

    pub fn scaled(scale: f32) -> Self {
        let half = 0.5 * scale;
        let corner = |x: f32, y: f32| QuadVertex {
            position: [x * half, y * half],
            uv: [(x + 1.0) * 0.5, (y + 1.0) * 0.5],
        };
        let bottom_left = corner(-1.0, -1.0);
        let bottom_right = corner(1.0, -1.0);
        let top_right = corner(1.0, 1.0);
        let top_left = corner(-1.0, 1.0);
        Self {
            vertices: [
                bottom_left,
                bottom_right,
                top_right,
                bottom_left,
                top_right,
                top_left,
            ],
            scale,
        }
    }

    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for QuadGeometry {
    fn default() -> Self {
        Self::full_screen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_quad_spans_ndc() {
        let quad = QuadGeometry::full_screen();
        let (mut min, mut max) = ([f32::MAX; 2], [f32::MIN; 2]);
        for vertex in quad.vertices() {
            for axis in 0..2 {
                min[axis] = min[axis].min(vertex.position[axis]);
                max[axis] = max[axis].max(vertex.position[axis]);
            }
        }
        assert_eq!(min, [-1.0, -1.0]);
        assert_eq!(max, [1.0, 1.0]);
        assert_eq!(quad.vertex_count(), 6);
        assert_eq!(quad.as_bytes().len(), 6 * 16);
    }

    #[test]
    fn uvs_follow_positions() {
        let quad = QuadGeometry::full_screen();
        for vertex in quad.vertices() {
            assert_eq!(vertex.uv[0], (vertex.position[0] + 1.0) * 0.5);
            assert_eq!(vertex.uv[1], (vertex.position[1] + 1.0) * 0.5);
        }
    }
}

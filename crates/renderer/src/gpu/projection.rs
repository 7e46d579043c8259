use bytemuck::{Pod, Zeroable};

/// Column-major 4x4 orthographic projection mapping `[0, width] x [0, height]`
/// onto clip space with the origin at the bottom-left corner.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Projection {
    pub columns: [[f32; 4]; 4],
}

impl Projection {
    pub fn ortho(width: u32, height: u32) -> Self {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        Self {
            columns: [
                [2.0 / width, 0.0, 0.0, 0.0],
                [0.0, 2.0 / height, 0.0, 0.0],
                [0.0, 0.0, -1.0, 0.0],
                [-1.0, -1.0, 0.0, 1.0],
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
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

/// Two triangles sharing the bottom-left and top-right corners.
pub(crate) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Full-window quad in pixel coordinates. Texture row 0 is the top of the
/// image, so the top edge samples `v = 0`.
pub(crate) fn quad_vertices(width: u32, height: u32) -> [QuadVertex; 4] {
    let w = width as f32;
    let h = height as f32;
    [
        QuadVertex {
            position: [0.0, 0.0],
            tex_coord: [0.0, 1.0],
        },
        QuadVertex {
            position: [0.0, h],
            tex_coord: [0.0, 0.0],
        },
        QuadVertex {
            position: [w, h],
            tex_coord: [1.0, 0.0],
        },
        QuadVertex {
            position: [w, 0.0],
            tex_coord: [1.0, 1.0],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Projects a point on the `z = 0` plane.
    fn apply(projection: &Projection, x: f32, y: f32) -> [f32; 2] {
        let c = &projection.columns;
        [
            c[0][0] * x + c[1][0] * y + c[3][0],
            c[0][1] * x + c[1][1] * y + c[3][1],
        ]
    }

    fn assert_close(actual: [f32; 2], expected: [f32; 2]) {
        assert!(
            (actual[0] - expected[0]).abs() < 1e-5 && (actual[1] - expected[1]).abs() < 1e-5,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn ortho_maps_window_corners_to_clip_corners() {
        let projection = Projection::ortho(640, 480);
        assert_close(apply(&projection, 0.0, 0.0), [-1.0, -1.0]);
        assert_close(apply(&projection, 640.0, 480.0), [1.0, 1.0]);
        assert_close(apply(&projection, 320.0, 240.0), [0.0, 0.0]);
    }

    #[test]
    fn ortho_survives_zero_sized_window() {
        let projection = Projection::ortho(0, 0);
        assert!(projection.columns.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn quad_covers_window_with_flipped_v() {
        let quad = quad_vertices(512, 256);
        let projection = Projection::ortho(512, 256);
        let expected = [[-1.0, -1.0], [-1.0, 1.0], [1.0, 1.0], [1.0, -1.0]];
        for (vertex, corner) in quad.iter().zip(expected) {
            assert_close(apply(&projection, vertex.position[0], vertex.position[1]), corner);
        }
        assert_eq!(quad[0].tex_coord, [0.0, 1.0]);
        assert_eq!(quad[2].tex_coord, [1.0, 0.0]);
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 16);
        assert_eq!(std::mem::size_of::<Projection>(), 64);
        assert_eq!(QuadVertex::layout().array_stride, 16);
        assert_eq!(QUAD_INDICES.len(), 6);
    }
}

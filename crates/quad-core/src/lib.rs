pub mod fit;
pub mod quad;
pub mod raster;

use glam::{Vec2, Vec4};

pub use fit::{fit_uv, Fit};
pub use quad::{triangles, validate, GeometryError, SCREEN_INDICES, SCREEN_VERTICES};

// ---------------------------------------------------------------------------
// Attribute ABI — the slots the host binds vertex data to
// ---------------------------------------------------------------------------

/// Shader location of the 2D position attribute.
pub const POSITION_LOCATION: u32 = 0;
/// Shader location of the texture coordinate attribute.
pub const TEX_COORD_LOCATION: u32 = 1;
/// Interpolant location the fragment stage reads `uv` from.
pub const UV_LOCATION: u32 = 0;

/// Clip-space depth written by the vertex stage (the far plane).
pub const CLIP_Z: f32 = 1.0;
/// Clip-space `w` written by the vertex stage; no perspective divide effect.
pub const CLIP_W: f32 = 1.0;

// ---------------------------------------------------------------------------
// Vertex — one element of the vertex buffer
// ---------------------------------------------------------------------------

/// Per-vertex input. Must match `VertexIn` in the WGSL source.
/// `repr(C)` + `bytemuck` ensures safe casting to `&[u8]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Byte offset of `position` inside the vertex.
    pub const POSITION_OFFSET: u64 = std::mem::offset_of!(Vertex, position) as u64;
    /// Byte offset of `tex_coord` inside the vertex.
    pub const TEX_COORD_OFFSET: u64 = std::mem::offset_of!(Vertex, tex_coord) as u64;
    /// Distance between consecutive vertices in the buffer.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    pub const fn new(position: [f32; 2], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }
}

// ---------------------------------------------------------------------------
// Vertex stage — CPU rendition of `vs_main`
// ---------------------------------------------------------------------------

/// What the vertex stage hands to the rasterizer for one vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexOut {
    pub clip_position: Vec4,
    pub uv: Vec2,
}

/// Pass the position through to clip space at the far plane and forward the
/// texture coordinate unchanged.
pub fn vertex_stage(vertex: &Vertex) -> VertexOut {
    let [x, y] = vertex.position;
    VertexOut {
        clip_position: Vec4::new(x, y, CLIP_Z, CLIP_W),
        uv: Vec2::from_array(vertex.tex_coord),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn vertex_is_sixteen_tightly_packed_bytes() {
        assert_eq!(Vertex::STRIDE, 16);
        assert_eq!(Vertex::POSITION_OFFSET, 0);
        assert_eq!(Vertex::TEX_COORD_OFFSET, 8);
    }

    #[test]
    fn vertex_bytes_follow_field_order() {
        let v = Vertex::new([1.0, 2.0], [3.0, 4.0]);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn attribute_locations_are_distinct() {
        assert_ne!(POSITION_LOCATION, TEX_COORD_LOCATION);
    }

    #[test]
    fn corner_vertex_lands_on_far_plane() {
        let out = vertex_stage(&Vertex::new([-1.0, 1.0], [0.0, 0.0]));
        assert_eq!(out.clip_position, Vec4::new(-1.0, 1.0, 1.0, 1.0));
        assert_eq!(out.uv, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn position_passes_through_with_fixed_z_and_w(
            x in -1.0e6f32..1.0e6,
            y in -1.0e6f32..1.0e6,
        ) {
            let out = vertex_stage(&Vertex::new([x, y], [0.0, 0.0]));
            prop_assert_eq!(out.clip_position, Vec4::new(x, y, 1.0, 1.0));
        }

        #[test]
        fn tex_coord_is_forwarded_unchanged(
            u in proptest::num::f32::ANY,
            v in proptest::num::f32::ANY,
        ) {
            let out = vertex_stage(&Vertex::new([0.0, 0.0], [u, v]));
            // Bitwise so NaN payloads and signed zeros count too.
            prop_assert_eq!(out.uv.x.to_bits(), u.to_bits());
            prop_assert_eq!(out.uv.y.to_bits(), v.to_bits());
        }
    }
}

//! Reference rasterizer.
//!
//! A small CPU model of the fixed-function work between the vertex and
//! fragment stages: perspective divide, pixel-center coverage and
//! perspective-correct interpolation of `uv`. It exists so the interpolant
//! contract can be checked without a GPU, and so GPU readbacks have
//! something to be compared against.

use glam::{Vec2, Vec3};

use crate::VertexOut;

/// One covered pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    pub uv: Vec2,
    /// Normalized device depth.
    pub depth: f32,
}

/// Perspective divide.
pub fn to_ndc(v: &VertexOut) -> Vec3 {
    v.clip_position.truncate() / v.clip_position.w
}

/// NDC of the center of pixel `(x, y)`. Row 0 is the top of the target.
pub fn pixel_center_ndc(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
        1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
    )
}

fn ndc_to_pixel(p: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (p.x + 1.0) * 0.5 * width as f32,
        (1.0 - p.y) * 0.5 * height as f32,
    )
}

/// Twice the signed area over the squared longest edge below which a
/// triangle counts as a line. Independent of the triangle's scale.
const DEGENERATE_RATIO: f32 = 1e-6;

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// `true` when the triangle is too flat to carry meaningful weights.
pub fn is_degenerate(tri: [Vec2; 3]) -> bool {
    let [a, b, c] = tri;
    let longest = (b - a)
        .length_squared()
        .max((c - b).length_squared())
        .max((a - c).length_squared());
    edge(a, b, c).abs() <= longest * DEGENERATE_RATIO
}

// Normalizing by the sum rather than the area keeps the weight at a vertex
// exactly one.
fn barycentric_unchecked(tri: [Vec2; 3], p: Vec2) -> Vec3 {
    let [a, b, c] = tri;
    let raw = Vec3::new(edge(b, c, p), edge(c, a, p), edge(a, b, p));
    raw / (raw.x + raw.y + raw.z)
}

/// Barycentric weights of `p` in triangle `tri`, for either winding.
///
/// Weights sum to one. Any negative weight means `p` is outside. Returns
/// `None` for degenerate triangles (see [`is_degenerate`]).
pub fn barycentric(tri: [Vec2; 3], p: Vec2) -> Option<Vec3> {
    (!is_degenerate(tri)).then(|| barycentric_unchecked(tri, p))
}

/// Perspective-correct interpolation of `uv` with screen-space weights.
pub fn interpolate_uv(tri: &[VertexOut; 3], weights: Vec3) -> Vec2 {
    let persp = Vec3::new(
        weights.x / tri[0].clip_position.w,
        weights.y / tri[1].clip_position.w,
        weights.z / tri[2].clip_position.w,
    );
    let total = persp.x + persp.y + persp.z;
    (tri[0].uv * persp.x + tri[1].uv * persp.y + tri[2].uv * persp.z) / total
}

/// Every pixel center of a `width`×`height` target covered by `tri`,
/// edges inclusive, in row-major order.
pub fn rasterize(tri: &[VertexOut; 3], width: u32, height: u32) -> Vec<Fragment> {
    let ndc = tri.map(|v| to_ndc(&v));
    let corners = ndc.map(|p| p.truncate());
    if width == 0 || height == 0 || is_degenerate(corners) {
        return Vec::new();
    }
    let depths = Vec3::new(ndc[0].z, ndc[1].z, ndc[2].z);

    let screen = corners.map(|p| ndc_to_pixel(p, width, height));
    let extent = Vec2::new(width as f32, height as f32);
    let min = screen
        .iter()
        .fold(Vec2::INFINITY, |m, p| m.min(*p))
        .floor()
        .clamp(Vec2::ZERO, extent);
    let max = screen
        .iter()
        .fold(Vec2::NEG_INFINITY, |m, p| m.max(*p))
        .ceil()
        .clamp(Vec2::ZERO, extent);

    let mut fragments = Vec::new();
    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let p = pixel_center_ndc(x, y, width, height);
            let weights = barycentric_unchecked(corners, p);
            if weights.min_element() < 0.0 {
                continue;
            }
            fragments.push(Fragment {
                x,
                y,
                uv: interpolate_uv(tri, weights),
                depth: weights.dot(depths),
            });
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{triangles, vertex_stage, Vertex, SCREEN_INDICES, SCREEN_VERTICES};
    use glam::Vec4;
    use proptest::prelude::*;

    fn stage(tri: [Vertex; 3]) -> [VertexOut; 3] {
        tri.map(|v| vertex_stage(&v))
    }

    #[test]
    fn pixel_centers_stay_inside_clip_space() {
        assert_eq!(pixel_center_ndc(0, 0, 2, 2), Vec2::new(-0.5, 0.5));
        assert_eq!(pixel_center_ndc(1, 1, 2, 2), Vec2::new(0.5, -0.5));
    }

    #[test]
    fn degenerate_triangle_has_no_weights() {
        let line = [Vec2::ZERO, Vec2::ONE, Vec2::splat(2.0)];
        assert_eq!(barycentric(line, Vec2::new(0.5, 0.0)), None);
    }

    #[test]
    fn tiny_triangle_still_has_weights() {
        // Twice the area is 1e-10, far below f32::EPSILON, but the shape is
        // a perfectly good right triangle.
        let tri = [Vec2::ZERO, Vec2::new(1e-5, 0.0), Vec2::new(0.0, 1e-5)];
        assert!(!is_degenerate(tri));
        let w = barycentric(tri, Vec2::splat(2.5e-6)).unwrap();
        assert!(w.abs_diff_eq(Vec3::new(0.5, 0.25, 0.25), 1e-4), "weights {w}");
    }

    #[test]
    fn sliver_is_degenerate_at_any_scale() {
        for scale in [1e-3f32, 1.0, 1e4] {
            let tri = [
                Vec2::ZERO,
                Vec2::new(scale, 0.0),
                Vec2::new(0.5 * scale, 1e-8 * scale),
            ];
            assert!(is_degenerate(tri), "scale {scale}");
        }
    }

    #[test]
    fn degenerate_triangle_covers_nothing() {
        let tri = stage([
            Vertex::new([0.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, 0.5], [1.0, 0.0]),
            Vertex::new([1.0, 1.0], [1.0, 1.0]),
        ]);
        assert!(rasterize(&tri, 8, 8).is_empty());
    }

    #[test]
    fn winding_does_not_change_coverage() {
        let a = Vertex::new([-1.0, -1.0], [0.0, 0.0]);
        let b = Vertex::new([1.0, -1.0], [1.0, 0.0]);
        let c = Vertex::new([-1.0, 1.0], [0.0, 1.0]);
        let ccw = rasterize(&stage([a, b, c]), 8, 8);
        let cw = rasterize(&stage([a, c, b]), 8, 8);
        assert!(!ccw.is_empty());
        assert_eq!(ccw.len(), cw.len());
    }

    #[test]
    fn zero_sized_target_yields_nothing() {
        let tri = stage(triangles(&SCREEN_VERTICES, &SCREEN_INDICES).unwrap()[0]);
        assert!(rasterize(&tri, 0, 4).is_empty());
    }

    #[test]
    fn screen_quad_covers_every_pixel_with_pixel_center_uv() {
        let (w, h) = (8u32, 6u32);
        let mut seen = vec![false; (w * h) as usize];

        for tri in triangles(&SCREEN_VERTICES, &SCREEN_INDICES).unwrap() {
            for frag in rasterize(&stage(tri), w, h) {
                let expected = Vec2::new(
                    (frag.x as f32 + 0.5) / w as f32,
                    (frag.y as f32 + 0.5) / h as f32,
                );
                assert!(
                    frag.uv.abs_diff_eq(expected, 1e-5),
                    "pixel ({}, {}): uv {} expected {}",
                    frag.x,
                    frag.y,
                    frag.uv,
                    expected
                );
                assert!((frag.depth - 1.0).abs() < 1e-5, "depth {}", frag.depth);
                seen[(frag.y * w + frag.x) as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "uncovered pixels in {seen:?}");
    }

    #[test]
    fn perspective_weights_favor_nearer_vertex() {
        let tri = [
            VertexOut { clip_position: Vec4::new(0.0, 0.0, 0.5, 1.0), uv: Vec2::ZERO },
            VertexOut { clip_position: Vec4::new(2.0, 0.0, 1.0, 2.0), uv: Vec2::X },
            VertexOut { clip_position: Vec4::new(0.0, 1.0, 0.5, 1.0), uv: Vec2::Y },
        ];
        // Halfway in screen space between a w=1 and a w=2 vertex sits closer
        // to the w=1 vertex in attribute space.
        let uv = interpolate_uv(&tri, Vec3::new(0.5, 0.5, 0.0));
        assert!((uv.x - 1.0 / 3.0).abs() < 1e-6, "uv {uv}");
    }

    proptest! {
        #[test]
        fn interpolant_matches_tex_coord_at_each_vertex(
            p in proptest::array::uniform3(proptest::array::uniform2(-1.0f32..1.0)),
            t in proptest::array::uniform3(proptest::array::uniform2(-4.0f32..4.0)),
        ) {
            let verts = [
                Vertex::new(p[0], t[0]),
                Vertex::new(p[1], t[1]),
                Vertex::new(p[2], t[2]),
            ];
            let tri = stage(verts);
            let corners = tri.map(|v| to_ndc(&v).truncate());
            prop_assume!(edge(corners[0], corners[1], corners[2]).abs() > 1e-3);

            for (i, corner) in corners.iter().enumerate() {
                let weights = barycentric(corners, *corner).unwrap();
                let uv = interpolate_uv(&tri, weights);
                prop_assert_eq!(uv, Vec2::from_array(t[i]));
            }
        }
    }
}

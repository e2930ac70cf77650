//! Conformance check for the vertex stage.
//!
//! Renders geometry through `vs_main` + `fs_uv` into a float target, reads
//! the interpolated `uv` back and compares it with the CPU reference
//! rasterizer in `quad_core::raster`.

use glam::Vec2;
use quad_core::raster::rasterize;
use quad_core::{triangles, vertex_stage, GeometryError, Vertex};
use wgpu::{TextureFormat, TextureUsages};

use crate::context::GpuContext;
use crate::pipeline::{ScreenPass, Shading};
use crate::readback::read_texels;
use crate::GpuError;

/// A float target format and how closely its readback can match the
/// reference.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatTarget {
    pub format: TextureFormat,
    pub tolerance: f32,
}

/// Candidates, most precise first. `Rgba32Float` is not renderable on many
/// downlevel adapters (GL, llvmpipe).
pub const FLOAT_TARGETS: [FloatTarget; 2] = [
    FloatTarget {
        format: TextureFormat::Rgba32Float,
        tolerance: 1e-4,
    },
    FloatTarget {
        format: TextureFormat::Rgba16Float,
        tolerance: 1e-3,
    },
];

const TARGET_USAGES: TextureUsages = TextureUsages::RENDER_ATTACHMENT.union(TextureUsages::COPY_SRC);

/// First candidate whose allowed usages permit drawing and copying back.
pub fn pick_float_target(allowed_usages: impl Fn(TextureFormat) -> TextureUsages) -> Option<FloatTarget> {
    FLOAT_TARGETS
        .into_iter()
        .find(|p| allowed_usages(p.format).contains(TARGET_USAGES))
}

/// The float target for `adapter`, or `None` if it cannot render to any.
pub fn float_target(adapter: &wgpu::Adapter) -> Option<FloatTarget> {
    pick_float_target(|format| adapter.get_texture_format_features(format).allowed_usages)
}

/// Alpha 0 marks pixels no triangle covered; `fs_uv` always writes 1.
const UNCOVERED: wgpu::Color = wgpu::Color {
    r: -1.0,
    g: -1.0,
    b: -1.0,
    a: 0.0,
};

/// Interpolated `uv` per pixel as produced by the GPU.
pub struct UvImage {
    pub width: u32,
    pub height: u32,
    texels: Vec<[f32; 4]>,
}

impl UvImage {
    /// `None` for uncovered pixels and for coordinates outside the target.
    pub fn uv_at(&self, x: u32, y: u32) -> Option<Vec2> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, _, a] = *self.texels.get(y as usize * self.width as usize + x as usize)?;
        (a > 0.0).then(|| Vec2::new(r, g))
    }

    pub fn covered_count(&self) -> usize {
        self.texels.iter().filter(|t| t[3] > 0.0).count()
    }
}

/// A `width`×`height` texture that can be drawn into and read back.
pub fn readable_target(device: &wgpu::Device, format: TextureFormat, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("uv_target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: TARGET_USAGES,
        view_formats: &[],
    })
}

/// Draw `vertices`/`indices` into a `width`×`height` target of `format` and
/// read the interpolant back. wgpu validation failures come back as
/// [`GpuError::Validation`].
pub async fn render_uv(
    ctx: &GpuContext,
    format: TextureFormat,
    vertices: &[Vertex],
    indices: &[u32],
    width: u32,
    height: u32,
) -> Result<UvImage, GpuError> {
    let target = ctx
        .validated(|| {
            let pass = ScreenPass::with_geometry(&ctx.device, format, Shading::Uv, vertices, indices)?;
            let target = readable_target(&ctx.device, format, width, height);
            let view = target.create_view(&Default::default());

            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("uv-encoder"),
                });
            pass.draw(&mut encoder, &view, UNCOVERED)?;
            ctx.queue.submit(std::iter::once(encoder.finish()));
            Ok(target)
        })
        .await?;

    let texels = read_texels(&ctx.device, &ctx.queue, &target)?;
    Ok(UvImage {
        width,
        height,
        texels,
    })
}

/// The same image computed on the CPU. Later triangles overwrite earlier
/// ones, as with the GPU's in-order blending-free writes.
pub fn reference_uv(
    vertices: &[Vertex],
    indices: &[u32],
    width: u32,
    height: u32,
) -> Result<Vec<Option<Vec2>>, GeometryError> {
    let row = width as usize;
    let mut out = vec![None; row * height as usize];
    for tri in triangles(vertices, indices)? {
        let staged = tri.map(|v| vertex_stage(&v));
        for frag in rasterize(&staged, width, height) {
            out[frag.y as usize * row + frag.x as usize] = Some(frag.uv);
        }
    }
    Ok(out)
}

/// Pixels the GPU covered where the reference disagrees by more than
/// `tolerance`, or does not cover at all. The reference treats edges as
/// inclusive, so it may cover extra edge pixels the GPU's fill rule skips.
pub fn mismatches(gpu_uv: &UvImage, reference: &[Option<Vec2>], tolerance: f32) -> Vec<(u32, u32)> {
    let mut bad = Vec::new();
    for y in 0..gpu_uv.height {
        for x in 0..gpu_uv.width {
            let Some(gpu) = gpu_uv.uv_at(x, y) else {
                continue;
            };
            let index = y as usize * gpu_uv.width as usize + x as usize;
            match reference.get(index).copied().flatten() {
                Some(cpu) if cpu.abs_diff_eq(gpu, tolerance) => {}
                _ => bad.push((x, y)),
            }
        }
    }
    bad
}

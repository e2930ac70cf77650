use wgpu::{Device, Queue};

use crate::GpuError;

/// Texture format of uploaded source images. Stored as sRGB so sampling
/// yields linear values.
pub const SOURCE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// An RGBA8 image on the GPU, ready to be bound to a `Source` screen pass.
pub struct SourceTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl SourceTexture {
    /// Upload tightly packed, top-row-first RGBA8 `pixels`.
    pub fn from_rgba8(
        device: &Device,
        queue: &Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, GpuError> {
        check_dimensions(width, height, pixels.len(), device.limits().max_texture_dimension_2d)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("source"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SOURCE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            texture.as_image_copy(),
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&Default::default());
        log::debug!("source texture uploaded: {}×{}", width, height);

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }
}

fn check_dimensions(width: u32, height: u32, len: usize, max_dimension: u32) -> Result<(), GpuError> {
    if width == 0 || height == 0 {
        return Err(GpuError::InvalidImage(format!("{width}×{height} image has no pixels")));
    }
    if width > max_dimension || height > max_dimension {
        return Err(GpuError::InvalidImage(format!(
            "{width}×{height} exceeds the device limit of {max_dimension}"
        )));
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(GpuError::InvalidImage(format!(
            "{width}×{height} RGBA8 needs {expected} bytes, got {len}"
        )));
    }
    Ok(())
}

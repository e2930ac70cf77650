use wgpu::{Device, Queue, Texture};

use crate::GpuError;

/// Decode IEEE half-precision bits.
fn f16_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 == 0 { 1.0 } else { -1.0 };
    let exponent = i32::from((bits >> 10) & 0x1f);
    let mantissa = f32::from(bits & 0x3ff);
    sign * match exponent {
        0 => mantissa * 2f32.powi(-24),
        0x1f if mantissa == 0.0 => f32::INFINITY,
        0x1f => f32::NAN,
        e => (1.0 + mantissa / 1024.0) * 2f32.powi(e - 15),
    }
}

type Decode = fn(&[u8]) -> [f32; 4];

fn decode_rgba32f(texel: &[u8]) -> [f32; 4] {
    bytemuck::pod_read_unaligned(texel)
}

fn decode_rgba16f(texel: &[u8]) -> [f32; 4] {
    bytemuck::pod_read_unaligned::<[u16; 4]>(texel).map(f16_to_f32)
}

/// Bytes per texel and a decoder to `[f32; 4]` for the float formats the
/// conformance targets use.
fn texel_decoder(format: wgpu::TextureFormat) -> Option<(u32, Decode)> {
    match format {
        wgpu::TextureFormat::Rgba32Float => Some((16, decode_rgba32f as Decode)),
        wgpu::TextureFormat::Rgba16Float => Some((8, decode_rgba16f as Decode)),
        _ => None,
    }
}

/// Row pitch for a texture-to-buffer copy, rounded up to wgpu's alignment.
pub fn padded_bytes_per_row(width: u32, bytes_per_pixel: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * bytes_per_pixel).div_ceil(align) * align
}

/// Copy an `Rgba32Float` or `Rgba16Float` texture back to the CPU as
/// `f32` texels, row-major from the top. Blocks until the GPU has finished.
pub fn read_texels(device: &Device, queue: &Queue, texture: &Texture) -> Result<Vec<[f32; 4]>, GpuError> {
    let format = texture.format();
    let (texel_bytes, decode) = texel_decoder(format).ok_or(GpuError::UnreadableFormat(format))?;
    let (width, height) = (texture.width(), texture.height());
    let bytes_per_row = padded_bytes_per_row(width, texel_bytes);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback-encoder"),
    });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        texture.size(),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv().unwrap_or(Err(wgpu::BufferAsyncError))?;

    let data = slice.get_mapped_range();
    let texels: Vec<[f32; 4]> = data
        .chunks_exact(bytes_per_row as usize)
        .flat_map(|row| {
            row[..(width * texel_bytes) as usize]
                .chunks_exact(texel_bytes as usize)
                .map(decode)
        })
        .collect();
    drop(data);
    buffer.unmap();
    Ok(texels)
}

use quad_core::{Fit, Vertex, POSITION_LOCATION, SCREEN_INDICES, SCREEN_VERTICES, TEX_COORD_LOCATION};
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Sampler, TextureFormat};

use crate::shader::{ScreenUniforms, FS_SOURCE_ENTRY, FS_UV_ENTRY, SCREEN_WGSL, VS_ENTRY};
use crate::source::SourceTexture;
use crate::GpuError;

const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: Vertex::POSITION_OFFSET,
        shader_location: POSITION_LOCATION,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: Vertex::TEX_COORD_OFFSET,
        shader_location: TEX_COORD_LOCATION,
    },
];

/// Buffer layout the host must bind for `vs_main`: one interleaved
/// per-vertex buffer, position at location 0 and texture coordinate at 1.
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: Vertex::STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Which fragment stage is paired with the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Present a sampled source texture (`fs_main`).
    Source,
    /// Write the interpolated `uv` as red/green (`fs_uv`).
    Uv,
}

/// Resources only the `Source` shading needs.
struct SourceBinding {
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
    uniform_buf: Buffer,
    /// Rebuilt whenever a new source texture is bound.
    bind_group: Option<BindGroup>,
}

/// The vertex stage plus one fragment stage, with the vertex and index
/// buffers it draws. Resolution-agnostic: resizing only needs `update`.
pub struct ScreenPass {
    shading: Shading,
    pipeline: RenderPipeline,
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
    source: Option<SourceBinding>,
}

impl ScreenPass {
    /// A pass over the canonical full-screen quad.
    pub fn new(device: &Device, target_format: TextureFormat, shading: Shading) -> Self {
        Self::build(device, target_format, shading, &SCREEN_VERTICES, &SCREEN_INDICES)
    }

    /// A pass over arbitrary geometry, e.g. a single test triangle.
    pub fn with_geometry(
        device: &Device,
        target_format: TextureFormat,
        shading: Shading,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self, GpuError> {
        quad_core::validate(vertices, indices)?;
        Ok(Self::build(device, target_format, shading, vertices, indices))
    }

    fn build(
        device: &Device,
        target_format: TextureFormat,
        shading: Shading,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Self {
        // --- geometry ---------------------------------------------------------
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("screen_vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("screen_indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // --- bindings -----------------------------------------------------------
        let source = match shading {
            Shading::Source => Some(Self::build_source_binding(device)),
            Shading::Uv => None,
        };
        let bind_group_layouts: Vec<&BindGroupLayout> =
            source.iter().map(|s| &s.bind_group_layout).collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("screen_pl"),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        // --- pipeline -----------------------------------------------------------
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("screen"),
            source: wgpu::ShaderSource::Wgsl(SCREEN_WGSL.into()),
        });

        let fragment_entry = match shading {
            Shading::Source => FS_SOURCE_ENTRY,
            Shading::Uv => FS_UV_ENTRY,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("screen_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: VS_ENTRY,
                buffers: &[vertex_buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: fragment_entry,
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // z = 1 everywhere; nothing to depth-test against
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!(
            "screen pass built: {:?} shading, {} vertices, {} indices, {:?}",
            shading,
            vertices.len(),
            indices.len(),
            target_format
        );

        Self {
            shading,
            pipeline,
            vertex_buf,
            index_buf,
            index_count: indices.len() as u32,
            source,
        }
    }

    fn build_source_binding(device: &Device) -> SourceBinding {
        // binding 0 : Screen uniform buffer
        // binding 1 : source texture
        // binding 2 : filtering sampler
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("screen_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("screen_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let uniforms = ScreenUniforms::new(1, 1, Fit::Stretch, [0.0, 0.0, 0.0, 1.0]);
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("screen_uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        SourceBinding {
            bind_group_layout,
            sampler,
            uniform_buf,
            bind_group: None,
        }
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    pub fn has_source(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.bind_group.is_some())
    }

    /// Bind `texture` as the image `fs_main` presents. No-op for `Uv` shading.
    pub fn set_source(&mut self, device: &Device, texture: &SourceTexture) {
        let Some(source) = &mut self.source else {
            log::debug!("set_source ignored: pass uses {:?} shading", self.shading);
            return;
        };
        source.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("screen_bg"),
            layout: &source.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: source.uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&source.sampler),
                },
            ],
        }));
    }

    /// Upload window size, fit mode and background color.
    pub fn update(&self, queue: &Queue, uniforms: &ScreenUniforms) {
        if let Some(source) = &self.source {
            queue.write_buffer(&source.uniform_buf, 0, bytemuck::bytes_of(uniforms));
        }
    }

    /// Record one render pass that clears `target` and draws the geometry.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear: wgpu::Color,
    ) -> Result<(), GpuError> {
        let bind_group = match &self.source {
            Some(source) => Some(source.bind_group.as_ref().ok_or(GpuError::MissingSource)?),
            None => None,
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("screen_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.pipeline);
        if let Some(bind_group) = bind_group {
            rpass.set_bind_group(0, bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_vertex_struct() {
        let layout = vertex_buffer_layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);

        let locations: Vec<_> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![POSITION_LOCATION, TEX_COORD_LOCATION]);

        for attr in layout.attributes {
            assert_eq!(attr.format, wgpu::VertexFormat::Float32x2);
            assert!(attr.offset + attr.format.size() <= layout.array_stride);
        }
    }

    #[test]
    fn attributes_do_not_overlap() {
        let [a, b] = ATTRIBUTES;
        assert_eq!(a.offset + a.format.size(), b.offset);
    }
}

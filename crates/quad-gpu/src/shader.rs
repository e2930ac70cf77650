use quad_core::Fit;

pub const VS_ENTRY: &str = "vs_main";
pub const FS_SOURCE_ENTRY: &str = "fs_main";
pub const FS_UV_ENTRY: &str = "fs_uv";

/// Screen quad shaders.
///
/// `vs_main` passes the 2D position through to clip space on the far plane
/// (z = 1, w = 1) and forwards the texture coordinate as `uv`. Two fragment
/// stages share its output: `fs_main` presents the source texture, optionally
/// aspect-fitted, and `fs_uv` writes the interpolated `uv` as a color.
pub const SCREEN_WGSL: &str = r#"
struct Screen {
    window_size: vec2<f32>,
    fit:         u32,
    _pad:        u32,
    background:  vec4<f32>,
};

struct VertexIn {
    @location(0) position:  vec2<f32>,
    @location(1) tex_coord: vec2<f32>,
};

struct VertexOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0)       uv:            vec2<f32>,
};

@vertex
fn vs_main(in: VertexIn) -> VertexOut {
    var out: VertexOut;
    out.clip_position = vec4<f32>(in.position, 1.0, 1.0);
    out.uv = in.tex_coord;
    return out;
}

@group(0) @binding(0) var<uniform> screen: Screen;
@group(0) @binding(1) var t_source: texture_2d<f32>;
@group(0) @binding(2) var s_source: sampler;

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let image_size = vec2<f32>(textureDimensions(t_source));
    let scale = min(screen.window_size.x / image_size.x, screen.window_size.y / image_size.y);
    let contain = image_size * scale / screen.window_size;
    let extent = select(vec2<f32>(1.0), contain, screen.fit == 1u);
    let uv = (in.uv - 0.5) / extent + 0.5;

    // textureSample must stay in uniform control flow
    let color = textureSample(t_source, s_source, uv);
    let inside = all(uv >= vec2<f32>(0.0)) && all(uv <= vec2<f32>(1.0));
    return select(screen.background, color, inside);
}

@fragment
fn fs_uv(in: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.uv, 0.0, 1.0);
}
"#;

/// Uniform block read by `fs_main`.
/// Must match the `Screen` struct in [`SCREEN_WGSL`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniforms {
    pub window_size: [f32; 2],
    pub fit: u32,
    pub _pad: u32, // keep 16-byte alignment for `background`
    pub background: [f32; 4],
}

impl ScreenUniforms {
    pub fn new(width: u32, height: u32, fit: Fit, background: [f32; 4]) -> Self {
        Self {
            window_size: [width as f32, height as f32],
            fit: fit.as_uniform(),
            _pad: 0,
            background,
        }
    }
}

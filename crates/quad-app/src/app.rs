use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use quad_core::Fit;
use quad_gpu::{ScreenPass, ScreenUniforms, Shading, SourceTexture};
use winit::window::Window;

use crate::config::AppConfig;
use crate::input::{InputAction, InputState, Key};
use crate::timing::{FpsCounter, FrameLimiter};

/// Decode an image file to RGBA8.
pub fn load_image(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to load image {}", path.display()))?
        .to_rgba8();
    log::info!(
        "Loaded {} ({}×{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Image,
    Uv,
}

// ---------------------------------------------------------------------------
// App — surface, screen passes and per-frame state
// ---------------------------------------------------------------------------

pub struct App {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    // Screen passes share the vertex stage; only the fragment stage differs.
    image_pass: Option<ScreenPass>,
    uv_pass: ScreenPass,
    view: View,

    fit: Fit,
    background: [f32; 4],

    input: InputState,

    // Frame timing
    limiter: FrameLimiter,
    fps: FpsCounter,
}

impl App {
    /// Initialise wgpu for a given window.  The window is wrapped in `Arc` so
    /// that the surface can safely hold a `'static` reference to it.
    pub fn new(
        window: Arc<Window>,
        config: &AppConfig,
        image: Option<&image::RgbaImage>,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        // ---- Instance -------------------------------------------------------
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // ---- Surface --------------------------------------------------------
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        // ---- Adapter --------------------------------------------------------
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter found")?;

        log::info!("GPU adapter: {}", adapter.get_info().name);

        // ---- Device & Queue -------------------------------------------------
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("quad-app device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create GPU device")?;

        // ---- Surface configuration ------------------------------------------
        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {}×{} {:?} Fifo",
            surface_config.width,
            surface_config.height,
            format
        );

        // ---- Screen passes --------------------------------------------------
        let uv_pass = ScreenPass::new(&device, format, Shading::Uv);
        let image_pass = match image {
            Some(image) => {
                let source = SourceTexture::from_rgba8(
                    &device,
                    &queue,
                    image.width(),
                    image.height(),
                    image.as_raw(),
                )?;
                let mut pass = ScreenPass::new(&device, format, Shading::Source);
                pass.set_source(&device, &source);
                Some(pass)
            }
            None => None,
        };
        let view = if image_pass.is_some() { View::Image } else { View::Uv };

        let now = Instant::now();
        let app = Self {
            surface,
            device,
            queue,
            surface_config,
            image_pass,
            uv_pass,
            view,
            fit: config.fit,
            background: config.background,
            input: InputState::new(image.is_some()),
            limiter: FrameLimiter::new(config.target_fps, now),
            fps: FpsCounter::new(now),
        };
        app.upload_uniforms();
        log::debug!(
            "Frame time {:?}, view {:?}, fit {}",
            app.limiter.frame_time(),
            app.view,
            app.fit.name()
        );
        Ok(app)
    }

    fn upload_uniforms(&self) {
        if let Some(pass) = &self.image_pass {
            let uniforms = ScreenUniforms::new(
                self.surface_config.width,
                self.surface_config.height,
                self.fit,
                self.background,
            );
            pass.update(&self.queue, &uniforms);
        }
    }

    // -------------------------------------------------------------------------
    // Resize
    // -------------------------------------------------------------------------

    /// Reconfigure the surface and push the new window size to the shader.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            return;
        }
        self.surface_config.width = new_width;
        self.surface_config.height = new_height;
        self.surface.configure(&self.device, &self.surface_config);
        self.upload_uniforms();

        log::debug!("Surface resized to {}×{}", new_width, new_height);
    }

    // -------------------------------------------------------------------------
    // Input — called by main.rs window_event handler
    // -------------------------------------------------------------------------

    pub fn on_key_pressed(&self, key: Key) -> Option<InputAction> {
        self.input.on_key(key)
    }

    /// Apply an action to the app state.
    ///
    /// Returns `true` if the app should exit (i.e. action was `Quit`).
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::ToggleFit => {
                self.fit = self.fit.toggled();
                self.upload_uniforms();
                log::info!("Fit: {}", self.fit.name());
            }

            InputAction::ToggleView => {
                if self.image_pass.is_some() {
                    self.view = match self.view {
                        View::Image => View::Uv,
                        View::Uv => View::Image,
                    };
                    log::info!("View: {:?}", self.view);
                }
            }

            InputAction::Quit => return true,
        }
        false
    }

    // -------------------------------------------------------------------------
    // Frame pacing
    // -------------------------------------------------------------------------

    pub fn frame_due(&self, now: Instant) -> bool {
        self.limiter.is_due(now)
    }

    pub fn next_frame_at(&self) -> Instant {
        self.limiter.next_frame_at()
    }

    // -------------------------------------------------------------------------
    // Render
    // -------------------------------------------------------------------------

    /// Draw the active screen pass to the surface and present it.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        self.limiter.begin_frame(now);
        if let Some(fps) = self.fps.tick(now) {
            log::debug!("FPS: {:.1}  view: {:?}  fit: {}", fps, self.view, self.fit.name());
        }

        let pass = match (&self.view, &self.image_pass) {
            (View::Image, Some(pass)) => pass,
            _ => &self.uv_pass,
        };

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let [r, g, b, a] = self.background.map(f64::from);
        if let Err(e) = pass.draw(&mut encoder, &surface_view, wgpu::Color { r, g, b, a }) {
            log::error!("screen pass skipped: {e}");
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

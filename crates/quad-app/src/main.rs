use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

mod app;
mod config;
mod input;
mod logging;
mod timing;

use app::App;
use clap::Parser;
use config::{AppConfig, Cli};
use input::Key;
use logging::LoggingConfig;

// ---------------------------------------------------------------------------
// Handler — winit ApplicationHandler
// ---------------------------------------------------------------------------

struct Handler {
    config: AppConfig,
    image: Option<image::RgbaImage>,
    window: Option<Arc<Window>>,
    app: Option<App>,
    /// Set when startup fails inside the event loop; returned from `main`.
    error: Option<anyhow::Error>,
}

impl Handler {
    fn create_app(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let mut window_attrs = Window::default_attributes().with_title(self.config.title.clone());
        window_attrs = if self.config.fullscreen {
            window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            let (w, h) = self.config.size;
            window_attrs.with_inner_size(winit::dpi::LogicalSize::new(w, h))
        };

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        log::info!("Window created ({}×{})", size.width, size.height);

        let app = App::new(Arc::clone(&window), &self.config, self.image.as_ref())?;
        self.window = Some(window);
        self.app = Some(app);
        Ok(())
    }
}

impl ApplicationHandler for Handler {
    /// Called once on desktop when the event loop starts.
    /// Creates the window then initialises the wgpu surface.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        if let Err(e) = self.create_app(event_loop) {
            log::error!("startup failed: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            // ----------------------------------------------------------------
            // Exit
            // ----------------------------------------------------------------
            WindowEvent::CloseRequested => {
                log::info!("Close requested — exiting");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let key = match code {
                    KeyCode::KeyF => Key::F,
                    KeyCode::Space => Key::Space,
                    KeyCode::KeyQ => Key::Q,
                    KeyCode::Escape => Key::Escape,
                    _ => return,
                };
                if let Some(app) = &mut self.app {
                    if let Some(action) = app.on_key_pressed(key) {
                        if app.handle_action(action) {
                            log::info!("Quit requested — exiting");
                            event_loop.exit();
                        } else if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                }
            }

            // ----------------------------------------------------------------
            // Resize — reconfigure the wgpu surface
            // ----------------------------------------------------------------
            WindowEvent::Resized(new_size) => {
                if let Some(app) = &mut self.app {
                    app.resize(new_size.width, new_size.height);
                }
            }

            // ----------------------------------------------------------------
            // Redraw — draw the screen quad and present
            // ----------------------------------------------------------------
            WindowEvent::RedrawRequested => {
                if let Some(app) = &mut self.app {
                    match app.render() {
                        Ok(()) => {}
                        // Surface lost / outdated: reconfigure and try again next frame.
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            if let Some(window) = &self.window {
                                let size = window.inner_size();
                                app.resize(size.width, size.height);
                            }
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory — exiting");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("render error: {e:?}"),
                    }
                }
            }

            _ => {}
        }
    }

    /// Redraw at the configured frame rate, sleeping in between.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(app)) = (&self.window, &self.app) else {
            return;
        };
        if app.frame_due(Instant::now()) {
            window.request_redraw();
            event_loop.set_control_flow(ControlFlow::Poll);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(app.next_frame_at()));
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from(Cli::parse());

    logging::init_logging(LoggingConfig::default());

    let image = config
        .image
        .as_deref()
        .map(app::load_image)
        .transpose()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = Handler {
        config,
        image,
        window: None,
        app: None,
        error: None,
    };
    event_loop.run_app(&mut handler)?;

    match handler.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

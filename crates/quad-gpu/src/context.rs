use wgpu::{Adapter, Device, Instance, Queue};

use crate::GpuError;

pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
}

impl GpuContext {
    /// Create a headless GPU context (no surface). Used for offscreen
    /// rendering and testing. A surface-aware variant is created by `quad-app`.
    pub async fn new_headless() -> Result<Self, GpuError> {
        let instance = Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("quad-gpu device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Run `f` with wgpu validation errors captured. They come back as
    /// [`GpuError::Validation`] instead of reaching the device's uncaptured
    /// error handler, which panics.
    pub async fn validated<T>(&self, f: impl FnOnce() -> Result<T, GpuError>) -> Result<T, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let result = f();
        match self.device.pop_error_scope().await {
            Some(e) => Err(GpuError::Validation(e.to_string())),
            None => result,
        }
    }
}

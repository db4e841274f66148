use std::sync::Arc;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Window surface plus the device that draws into it
pub struct GpuContext {
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
}

impl GpuContext {
    /// A 25x25 matrix needs almost nothing from the GPU: low-power adapter,
    /// downlevel limits, vsync.
    pub async fn new(window: Arc<Window>) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("No GPU adapter can present to this window");
        let info = adapter.get_info();
        log::info!("Presenting on {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("ripple-matrix-device"),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    ..Default::default()
                },
                None,
            )
            .await
            .expect("Failed to open GPU device");

        let PhysicalSize { width, height } = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .expect("Surface not supported by adapter");
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return; // minimized
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Next texture to draw into. A lost or outdated surface is reconfigured
    /// and this frame skipped.
    pub fn acquire(&self) -> Option<SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                None
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                None
            }
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::centered_square(self.config.width, self.config.height)
    }
}

/// Square drawing area so matrix cells stay round on any window shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub side: f32,
}

impl Viewport {
    pub fn centered_square(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let side = w.min(h);
        Self {
            x: (w - side) * 0.5,
            y: (h - side) * 0.5,
            side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_letterboxes_wide_window() {
        let vp = Viewport::centered_square(800, 600);
        assert_eq!(vp, Viewport { x: 100.0, y: 0.0, side: 600.0 });
    }

    #[test]
    fn test_viewport_fills_square_window() {
        let vp = Viewport::centered_square(500, 500);
        assert_eq!(vp, Viewport { x: 0.0, y: 0.0, side: 500.0 });
    }
}

use std::sync::Arc;

use anyhow::{anyhow, Context};
use log::{debug, trace, warn};
use wgpu::{Adapter, Device, DeviceDescriptor, Instance, Queue, Surface, SurfaceConfiguration};
use winit::dpi::LogicalSize;
use winit::window::Window;

use super::renderer::DrawingSurface;
use super::size::Size;

/// Drawing context handed to renderers of a [`GpuSurface`]
pub struct GpuContext {
    device: Device,
    queue: Queue,
    format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get reference to the queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Texture format of the surface frames
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Window surface whose swapchain is the backing buffer
///
/// Display size maps to the window's logical inner size, backing size to the swapchain
/// resolution in physical pixels.
pub struct GpuSurface {
    window: Arc<Window>,
    surface: Surface<'static>,
    context: GpuContext,
    config: SurfaceConfiguration,
    display: Size,
}

impl GpuSurface {
    /// Create a surface for a window along with a compatible device
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| anyhow!("failed to create window surface: {e}"))?;

        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Canvas Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| anyhow!("failed to create device: {e:?}"))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let logical = size.to_logical::<f64>(window.scale_factor());

        Ok(Self {
            window,
            surface,
            context: GpuContext {
                device,
                queue,
                format,
            },
            config,
            display: Size::new(logical.width, logical.height),
        })
    }

    /// Acquire the next swapchain texture, reconfiguring on a lost or outdated surface
    ///
    /// Returns `None` when no texture is available this frame.
    pub fn acquire_frame(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.context.device, &self.config);
                None
            }
            Err(e) => {
                warn!("failed to acquire surface texture: {e}");
                None
            }
        }
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> anyhow::Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("failed to find appropriate adapter: {e:?}"))
    }
}

impl DrawingSurface for GpuSurface {
    type Context = GpuContext;

    fn context(&self) -> Option<&GpuContext> {
        // A minimized window has no drawable area
        let size = self.window.inner_size();
        (size.width > 0 && size.height > 0).then_some(&self.context)
    }

    fn buffer_size(&self) -> Size {
        Size::from((self.config.width, self.config.height))
    }

    fn apply_size(&mut self, display: Size, backing: Size) {
        if display != self.display {
            // The window plays the role of the layout slot; the reply comes back as a resize event
            // unless the platform applies it right away
            match self
                .window
                .request_inner_size(LogicalSize::new(display.width, display.height))
            {
                Some(applied) => trace!("window resized immediately to {:?}", applied),
                None => trace!("window resize to {:?} requested", display),
            }
            self.display = display;
        }

        let (width, height) = backing.to_physical();
        if (width, height) != (self.config.width, self.config.height) {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.context.device, &self.config);
        }
    }
}

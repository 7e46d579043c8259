use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::types::{TargetSize, VsyncMode};
use crate::RendererError;

use super::device::SharedDevice;

/// The shared device together with the window swapchain it presents to.
pub(crate) struct GpuContext {
    _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub shared: SharedDevice,
    pub config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    adapter_name: String,
}

/// Result of trying to acquire the next swapchain image.
pub(crate) enum Acquire {
    Ready(wgpu::SurfaceTexture),
    /// Swapchain was reconfigured or timed out; try again next tick.
    Unavailable,
}

impl GpuContext {
    pub(crate) fn new(
        window: Arc<Window>,
        size: TargetSize,
        vsync: VsyncMode,
    ) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|err| RendererError::Device(format!("failed to create surface: {err}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| RendererError::Device(format!("no suitable GPU adapter: {err}")))?;

        let info = adapter.get_info();
        tracing::debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let shared = SharedDevice::request(&adapter)
            .map_err(|err| RendererError::Device(format!("failed to create GPU device: {err}")))?;

        let caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = caps.formats.first() else {
            return Err(RendererError::Device(
                "surface is not supported by the selected adapter".into(),
            ));
        };
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or(first_format);
        let present_mode = pick_present_mode(&caps.present_modes, vsync);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::debug!(?surface_format, ?present_mode, ?vsync, "configuring swapchain");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&shared.device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            shared,
            config,
            surface_format,
            adapter_name: info.name,
        })
    }

    pub(crate) fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Reconfigures the swapchain when the window size changed. Zero sizes
    /// are ignored; the caller skips presentation for them.
    pub(crate) fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.shared.device, &self.config);
        tracing::debug!(width = size.width, height = size.height, "swapchain resized");
    }

    pub(crate) fn acquire(&mut self) -> Acquire {
        match self.surface.get_current_texture() {
            Ok(frame) => Acquire::Ready(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.shared.device, &self.config);
                tracing::debug!("swapchain outdated; reconfigured");
                Acquire::Unavailable
            }
            Err(err) => {
                tracing::debug!(%err, "swapchain image unavailable");
                Acquire::Unavailable
            }
        }
    }
}

/// FIFO when vsync is on; otherwise immediate, then mailbox, then FIFO.
pub(crate) fn pick_present_mode(
    available: &[wgpu::PresentMode],
    vsync: VsyncMode,
) -> wgpu::PresentMode {
    let preferred: &[wgpu::PresentMode] = match vsync {
        VsyncMode::On => &[wgpu::PresentMode::Fifo],
        VsyncMode::Off => &[
            wgpu::PresentMode::Immediate,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Fifo,
        ],
    };
    preferred
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .or_else(|| available.first().copied())
        .unwrap_or(wgpu::PresentMode::Fifo)
}

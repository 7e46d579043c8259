//! Off-screen drawing targets and the backend selector.

use kurbo::Affine;
use vello_cpu::kurbo::Shape as _;

use crate::gpu::SharedDevice;
use crate::scene::{Canvas, RenderError, Rgba8};
use crate::types::{SurfaceKind, TargetSize};

/// Pixel format of every GPU-backed target. Vello writes through a storage
/// binding, which rules out sRGB formats.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Tolerance used when flattening the disc for the CPU rasterizer.
const CPU_PATH_TOLERANCE: f64 = 0.1;

/// Largest CPU buffer accepted, in pixels (256 MiB of RGBA8).
const MAX_IMAGE_PIXELS: u64 = 1 << 26;

/// Failure while building the drawing target. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("target size {0} has a zero dimension")]
    EmptySize(TargetSize),
    #[error("image buffer {size} exceeds the CPU rasterizer limit of {limit}x{limit}")]
    BufferTooLarge { size: TargetSize, limit: u32 },
    #[error("image buffer {size} exceeds the CPU pixel budget of {limit} pixels")]
    TooManyPixels { size: TargetSize, limit: u64 },
    #[error("texture {size} exceeds the device limit of {limit}x{limit}")]
    TextureTooLarge { size: TargetSize, limit: u32 },
    #[error("failed to allocate {size} texture: {reason}")]
    TextureAllocation { size: TargetSize, reason: String },
    #[error("failed to create GPU drawing surface: {0}")]
    Renderer(String),
}

/// The off-screen destination, fixed for the run.
pub enum DrawingTarget {
    /// CPU pixel buffer.
    Image(ImageTarget),
    /// GPU surface whose backing texture stays private.
    Device(GpuTarget),
    /// GPU surface bound to an explicitly allocated, sampleable texture.
    Texture(GpuTarget),
}

impl DrawingTarget {
    pub fn kind(&self) -> SurfaceKind {
        match self {
            DrawingTarget::Image(_) => SurfaceKind::Image,
            DrawingTarget::Device(_) => SurfaceKind::Gl,
            DrawingTarget::Texture(_) => SurfaceKind::GlTexture,
        }
    }

    pub fn canvas(&mut self) -> &mut dyn Canvas {
        match self {
            DrawingTarget::Image(target) => target,
            DrawingTarget::Device(target) | DrawingTarget::Texture(target) => target,
        }
    }

    /// Hands the finished frame to the device. The CPU buffer needs nothing.
    pub fn publish(&self) {
        match self {
            DrawingTarget::Image(_) => {}
            DrawingTarget::Device(target) | DrawingTarget::Texture(target) => target.publish(),
        }
    }

    /// Texture the compositor samples directly, texture-backed variant only.
    pub fn texture_handle(&self) -> Option<&TextureHandle> {
        match self {
            DrawingTarget::Texture(target) => Some(target.backing()),
            _ => None,
        }
    }
}

/// Builds the drawing target for `kind`. GPU variants render on `shared`.
pub(crate) fn select_surface(
    kind: SurfaceKind,
    shared: &SharedDevice,
    size: TargetSize,
) -> Result<DrawingTarget, TargetError> {
    let target = match kind {
        SurfaceKind::Image => DrawingTarget::Image(ImageTarget::new(size)?),
        SurfaceKind::Gl => {
            let backing = TextureHandle::allocate(shared, size, "surfbench device target")?;
            DrawingTarget::Device(GpuTarget::bind(shared, backing)?)
        }
        SurfaceKind::GlTexture => {
            let backing = TextureHandle::allocate(shared, size, "surfbench texture target")?;
            DrawingTarget::Texture(GpuTarget::bind(shared, backing)?)
        }
    };
    tracing::info!(surface = %kind, %size, "created drawing target");
    Ok(target)
}

/// CPU-side RGBA8 buffer rasterized by `vello_cpu`.
pub struct ImageTarget {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    width: u16,
    height: u16,
}

impl ImageTarget {
    pub fn new(size: TargetSize) -> Result<Self, TargetError> {
        if size.is_empty() {
            return Err(TargetError::EmptySize(size));
        }
        let limit = u32::from(u16::MAX);
        let too_large = || TargetError::BufferTooLarge { size, limit };
        let width = u16::try_from(size.width).map_err(|_| too_large())?;
        let height = u16::try_from(size.height).map_err(|_| too_large())?;
        if u64::from(size.width) * u64::from(size.height) > MAX_IMAGE_PIXELS {
            return Err(TargetError::TooManyPixels {
                size,
                limit: MAX_IMAGE_PIXELS,
            });
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            width,
            height,
        })
    }

    /// Premultiplied RGBA8 rows, top row first.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

impl Canvas for ImageTarget {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(cpu_color(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn fill_circle(&mut self, transform: Affine, radius: f64, color: Rgba8) {
        let disc = vello_cpu::kurbo::Circle::new((0.0, 0.0), radius).to_path(CPU_PATH_TOLERANCE);
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::new(transform.as_coeffs()));
        self.ctx.set_paint(cpu_color(color));
        self.ctx.fill_path(&disc);
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }
}

fn cpu_color([r, g, b, a]: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

/// An explicitly allocated RGBA8 texture, usable as a render target and as a
/// sampled texture.
pub struct TextureHandle {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: TargetSize,
}

impl TextureHandle {
    pub(crate) fn allocate(
        shared: &SharedDevice,
        size: TargetSize,
        label: &'static str,
    ) -> Result<Self, TargetError> {
        if size.is_empty() {
            return Err(TargetError::EmptySize(size));
        }
        let limit = shared.max_texture_dimension;
        if size.width > limit || size.height > limit {
            return Err(TargetError::TextureTooLarge { size, limit });
        }

        let texture = shared
            .scoped(|device| {
                device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: size.width,
                        height: size.height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: TARGET_FORMAT,
                    usage: wgpu::TextureUsages::STORAGE_BINDING
                        | wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                })
            })
            .map_err(|reason| TargetError::TextureAllocation { size, reason })?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        tracing::debug!(label, %size, "allocated target texture");
        Ok(Self {
            texture,
            view,
            size,
        })
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> TargetSize {
        self.size
    }
}

/// Vello drawing surface bound to a [`TextureHandle`].
pub struct GpuTarget {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: vello::Renderer,
    scene: vello::Scene,
    base_color: vello::peniko::Color,
    backing: TextureHandle,
}

impl GpuTarget {
    pub(crate) fn bind(shared: &SharedDevice, backing: TextureHandle) -> Result<Self, TargetError> {
        let renderer = vello::Renderer::new(&shared.device, vello::RendererOptions::default())
            .map_err(|err| TargetError::Renderer(format!("{err:?}")))?;
        Ok(Self {
            device: shared.device.clone(),
            queue: shared.queue.clone(),
            renderer,
            scene: vello::Scene::new(),
            base_color: vello::peniko::Color::from_rgba8(0, 0, 0, 0),
            backing,
        })
    }

    pub fn backing(&self) -> &TextureHandle {
        &self.backing
    }

    fn publish(&self) {
        self.queue.submit(std::iter::empty());
    }
}

impl Canvas for GpuTarget {
    fn size(&self) -> (u32, u32) {
        (self.backing.size.width, self.backing.size.height)
    }

    fn clear(&mut self, [r, g, b, a]: Rgba8) {
        self.scene.reset();
        self.base_color = vello::peniko::Color::from_rgba8(r, g, b, a);
    }

    fn fill_circle(&mut self, transform: Affine, radius: f64, [r, g, b, a]: Rgba8) {
        self.scene.fill(
            vello::peniko::Fill::NonZero,
            vello::kurbo::Affine::new(transform.as_coeffs()),
            vello::peniko::Color::from_rgba8(r, g, b, a),
            None,
            &vello::kurbo::Circle::new((0.0, 0.0), radius),
        );
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        let TargetSize { width, height } = self.backing.size;
        self.renderer
            .render_to_texture(
                &self.device,
                &self.queue,
                &self.scene,
                &self.backing.view,
                &vello::RenderParams {
                    base_color: self.base_color,
                    width,
                    height,
                    antialiasing_method: vello::AaConfig::Area,
                },
            )
            .map_err(|err| RenderError::Gpu(format!("{err:?}")))?;
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|err| RenderError::Poll(format!("{err:?}")))?;
        Ok(())
    }
}

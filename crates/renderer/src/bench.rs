use std::sync::Arc;

use harness::{FrameStages, PhaseOutcome};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::gpu::{Acquire, Compositor, GpuContext};
use crate::scene::SceneRenderer;
use crate::surface::{select_surface, DrawingTarget};
use crate::types::{BenchConfig, SurfaceKind};
use crate::window::WindowHost;
use crate::RendererError;

/// The scene, the drawing target, and everything needed to show it.
///
/// Fields drop in declaration order: the drawing target goes before the
/// compositor, the compositor before the device, the device before the window.
pub struct Bench {
    scene: SceneRenderer,
    target: DrawingTarget,
    compositor: Compositor,
    gpu: GpuContext,
    window: Arc<Window>,
    render_failures: u64,
}

impl Bench {
    /// Creates the device against `host`'s window, then the drawing target.
    pub fn new(config: &BenchConfig, host: &WindowHost) -> Result<Self, RendererError> {
        let window = Arc::clone(host.window());
        let gpu = GpuContext::new(Arc::clone(&window), config.size, config.vsync)?;
        tracing::info!(adapter = gpu.adapter_name(), "rendering device ready");

        let target = select_surface(config.surface, &gpu.shared, config.size)?;
        let compositor = Compositor::new(&gpu, &target, config.size, config.blit);

        Ok(Self {
            scene: SceneRenderer::new(),
            target,
            compositor,
            gpu,
            window,
            render_failures: 0,
        })
    }

    pub fn surface(&self) -> SurfaceKind {
        self.target.kind()
    }

    pub fn scene(&self) -> &SceneRenderer {
        &self.scene
    }

    /// One warm-up frame: render only, nothing published or presented.
    pub fn render_warmup(&mut self) {
        if let Err(err) = self.scene.render(self.target.canvas()) {
            tracing::warn!(%err, "warm-up render failed");
        }
    }

}

/// The CPU buffer keeps rendering after device loss; GPU targets stop.
pub(crate) fn offscreen_active(kind: SurfaceKind, device_lost: bool) -> bool {
    !(kind.uses_gpu() && device_lost)
}

/// Presenting needs a live device and a window with a non-zero area.
pub(crate) fn onscreen_ready(device_lost: bool, size: PhysicalSize<u32>) -> bool {
    !device_lost && size.width != 0 && size.height != 0
}

impl FrameStages for Bench {
    fn offscreen(&mut self) -> PhaseOutcome {
        if !offscreen_active(self.target.kind(), self.gpu.shared.is_lost()) {
            return PhaseOutcome::Skipped;
        }
        if let Err(err) = self.scene.render(self.target.canvas()) {
            self.render_failures += 1;
            if self.render_failures == 1 {
                tracing::warn!(%err, "render failed; skipping frame");
            } else {
                tracing::debug!(%err, failures = self.render_failures, "render failed");
            }
            return PhaseOutcome::Skipped;
        }
        self.target.publish();
        PhaseOutcome::Executed
    }

    fn onscreen(&mut self) -> PhaseOutcome {
        let size = self.window.inner_size();
        if !onscreen_ready(self.gpu.shared.is_lost(), size) {
            return PhaseOutcome::Skipped;
        }
        self.gpu.resize(size);

        let frame = match self.gpu.acquire() {
            Acquire::Ready(frame) => frame,
            Acquire::Unavailable => return PhaseOutcome::Skipped,
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.compositor.composite(&self.gpu, &self.target, &view);
        self.gpu.shared.queue.submit(Some(commands));
        self.window.pre_present_notify();
        frame.present();
        PhaseOutcome::Executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_runs_while_device_is_alive() {
        for kind in [SurfaceKind::Image, SurfaceKind::Gl, SurfaceKind::GlTexture] {
            assert!(offscreen_active(kind, false), "{kind}");
        }
    }

    #[test]
    fn device_loss_stops_gpu_targets_but_not_the_image_buffer() {
        assert!(offscreen_active(SurfaceKind::Image, true));
        assert!(!offscreen_active(SurfaceKind::Gl, true));
        assert!(!offscreen_active(SurfaceKind::GlTexture, true));
    }

    #[test]
    fn onscreen_needs_live_device_and_visible_window() {
        assert!(onscreen_ready(false, PhysicalSize::new(512, 512)));
        assert!(!onscreen_ready(true, PhysicalSize::new(512, 512)));
        assert!(!onscreen_ready(false, PhysicalSize::new(0, 512)));
        assert!(!onscreen_ready(false, PhysicalSize::new(512, 0)));
        assert!(!onscreen_ready(false, PhysicalSize::new(0, 0)));
        assert!(!onscreen_ready(true, PhysicalSize::new(0, 0)));
    }
}

//! GPU, window, and scene side of the surface benchmark.
//!
//! The crate builds the pieces the measurement harness drives:
//!
//! ```text
//!   BenchConfig
//!        │
//!        ▼
//!   WindowHost::new ──▶ Bench::new ──▶ GpuContext (device + swapchain)
//!        │                   ├─▶ select_surface ──▶ DrawingTarget
//!        │                   └─▶ Compositor (blit pipeline)
//!        ▼
//!   harness::run_presentation(WindowHost, Bench)
//!        ├─▶ Bench::offscreen: SceneRenderer::render ──▶ publish
//!        └─▶ Bench::onscreen:  acquire ──▶ Compositor::composite ──▶ present
//! ```
//!
//! `SceneRenderer` only talks to the [`Canvas`] trait, so the CPU image buffer
//! (`vello_cpu`) and both GPU targets (`vello` on `wgpu`) share one drawing
//! routine. Everything that can fail at startup surfaces as a
//! [`RendererError`]; per-tick failures turn into skipped phases.

mod bench;
mod gpu;
mod scene;
mod surface;
mod types;
mod window;

pub use bench::Bench;
pub use scene::{
    Animation, Canvas, RenderError, Rgba8, SceneRenderer, ANIMATION_BASE, ANIMATION_STEP,
    ANIMATION_STEPS, BACKGROUND, DISC,
};
pub use surface::{DrawingTarget, GpuTarget, ImageTarget, TargetError, TextureHandle, TARGET_FORMAT};
pub use types::{
    BenchConfig, BlitPolicy, SurfaceKind, TargetSize, UnknownSurfaceKind, VsyncMode,
    DEFAULT_TARGET_SIZE,
};
pub use window::WindowHost;

/// Startup failure in the renderer. Each variant maps to one process exit
/// status in the binary.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("failed to create event loop: {0}")]
    EventLoop(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("window event loop error: {0}")]
    Run(String),
    #[error("failed to create rendering device: {0}")]
    Device(String),
    #[error("failed to create drawing target: {0}")]
    Target(#[from] TargetError),
}

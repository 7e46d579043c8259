//! GPU plumbing shared by the drawing targets and the on-screen blit.
//!
//! - `device` owns the wgpu device and queue, tracks device loss, and wraps
//!   allocations in error scopes. It needs no window, so the drawing targets
//!   can be built against it headless.
//! - `context` pairs that device with the window swapchain and reconfigures
//!   the swapchain when the window resizes.
//! - `projection` holds the orthographic matrix and the quad geometry.
//! - `compositor` builds the blit pipeline and records one textured quad per
//!   tick, optionally mirroring the drawing target into its default texture.

mod compositor;
mod context;
mod device;
mod projection;

pub(crate) use compositor::Compositor;
pub(crate) use context::{Acquire, GpuContext};
pub(crate) use device::SharedDevice;

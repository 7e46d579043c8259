//! The animated benchmark scene: a red disc pulsing on a green background.
//!
//! Drawing goes through the [`Canvas`] trait so the same sequence of commands
//! hits the CPU buffer and both GPU targets. The pulse is tracked by an
//! [`Animation`] owned by each [`SceneRenderer`], so two renderers never share
//! state.

use kurbo::Affine;

/// Opaque straight-alpha RGBA8 colour.
pub type Rgba8 = [u8; 4];

pub const BACKGROUND: Rgba8 = [0, 255, 0, 255];
pub const DISC: Rgba8 = [255, 0, 0, 255];

/// Number of frames in one full pulse.
pub const ANIMATION_STEPS: u32 = 180;
/// Scale at the start of every pulse.
pub const ANIMATION_BASE: f64 = 1.0;
/// Scale increment applied after every frame.
pub const ANIMATION_STEP: f64 = ANIMATION_BASE / ANIMATION_STEPS as f64;

/// Continuously advancing scale factor in `[1.0, 2.0)`.
///
/// Stored as a step index so the scale after `n` frames is exactly
/// `base + (n mod 180) * step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Animation {
    step: u32,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        ANIMATION_BASE + f64::from(self.step) * ANIMATION_STEP
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Moves to the next frame, wrapping back to the base scale once the
    /// scale would reach twice the base.
    pub fn advance(&mut self) {
        self.step = (self.step + 1) % ANIMATION_STEPS;
    }
}

/// Failure while flushing a canvas into its backing store.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("gpu render failed: {0}")]
    Gpu(String),
    #[error("waiting for the gpu queue failed: {0}")]
    Poll(String),
}

/// Minimal drawing surface the scene needs.
pub trait Canvas {
    /// Pixel dimensions of the backing store.
    fn size(&self) -> (u32, u32);
    /// Starts a new frame filled with `color`.
    fn clear(&mut self, color: Rgba8);
    /// Fills a circle of `radius` centred on the origin of `transform`.
    fn fill_circle(&mut self, transform: Affine, radius: f64, color: Rgba8);
    /// Rasterizes every pending command; the backing store is complete on return.
    fn flush(&mut self) -> Result<(), RenderError>;
}

/// Draws the scene and owns its animation.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    animation: Animation,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_animation(animation: Animation) -> Self {
        Self { animation }
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    /// Renders one frame into `canvas` and advances the animation.
    ///
    /// The animation advances even when the flush fails, matching a frame
    /// that was issued but not completed.
    pub fn render<C>(&mut self, canvas: &mut C) -> Result<(), RenderError>
    where
        C: Canvas + ?Sized,
    {
        let (width, height) = canvas.size();
        let width = f64::from(width);
        let height = f64::from(height);

        canvas.clear(BACKGROUND);
        let transform = Affine::translate((width / 2.0, height / 2.0))
            * Affine::scale(self.animation.scale());
        canvas.fill_circle(transform, width / 4.0, DISC);
        let flushed = canvas.flush();

        self.animation.advance();
        flushed
    }
}

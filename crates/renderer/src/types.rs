use std::fmt;
use std::str::FromStr;

/// Width and height used when the caller does not ask for a size.
pub const DEFAULT_TARGET_SIZE: TargetSize = TargetSize {
    width: 512,
    height: 512,
};

/// Which off-screen drawing target the benchmark rasterizes into.
///
/// The variant is decided once at startup and never changes for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// CPU-addressable pixel buffer (`image`).
    Image,
    /// GPU drawing surface bound to the shared device (`gl`).
    Gl,
    /// GPU drawing surface backed by an explicitly allocated texture (`gl_texture`).
    GlTexture,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 3] = [SurfaceKind::Image, SurfaceKind::Gl, SurfaceKind::GlTexture];

    /// Token accepted on the command line.
    pub fn token(self) -> &'static str {
        match self {
            SurfaceKind::Image => "image",
            SurfaceKind::Gl => "gl",
            SurfaceKind::GlTexture => "gl_texture",
        }
    }

    /// Whether the variant needs the GPU to rasterize.
    pub fn uses_gpu(self) -> bool {
        !matches!(self, SurfaceKind::Image)
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Raised for any mode token other than `image`, `gl`, or `gl_texture`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown surface type '{0}'")]
pub struct UnknownSurfaceKind(pub String);

impl FromStr for SurfaceKind {
    type Err = UnknownSurfaceKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SurfaceKind::ALL
            .into_iter()
            .find(|kind| kind.token() == value)
            .ok_or_else(|| UnknownSurfaceKind(value.to_string()))
    }
}

/// Which texture the compositor samples for variants that do not own one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlitPolicy {
    /// Only the texture-backed target is sampled directly; other variants
    /// sample the compositor's default texture, which is never written.
    #[default]
    Default,
    /// Upload (buffer) or copy (device) the target into the default texture
    /// every tick so all variants show the rendered scene.
    Mirror,
}

impl FromStr for BlitPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(BlitPolicy::Default),
            "mirror" => Ok(BlitPolicy::Mirror),
            other => Err(format!(
                "unknown blit policy '{other}'; expected default or mirror"
            )),
        }
    }
}

/// Present-mode preference for the window swapchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VsyncMode {
    /// FIFO presentation, tear-free and capped at the display refresh rate.
    #[default]
    On,
    /// Prefer immediate, then mailbox, falling back to FIFO.
    Off,
}

/// Pixel dimensions shared by the drawing target and the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        DEFAULT_TARGET_SIZE
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Everything the renderer needs to know before the window opens.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Off-screen target variant.
    pub surface: SurfaceKind,
    /// Target and window size in physical pixels.
    pub size: TargetSize,
    /// Create the window invisible.
    pub hidden: bool,
    /// Stop delivering ticks after this many; `None` runs until the window closes.
    pub max_frames: Option<u64>,
    pub vsync: VsyncMode,
    pub blit: BlitPolicy,
}

impl BenchConfig {
    pub fn new(surface: SurfaceKind) -> Self {
        Self {
            surface,
            size: TargetSize::default(),
            hidden: false,
            max_frames: None,
            vsync: VsyncMode::default(),
            blit: BlitPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_surface_token() {
        for kind in SurfaceKind::ALL {
            assert_eq!(kind.token().parse::<SurfaceKind>().unwrap(), kind);
        }
        assert_eq!("gl_texture".parse::<SurfaceKind>().unwrap(), SurfaceKind::GlTexture);
    }

    #[test]
    fn rejects_unknown_surface_tokens() {
        for token in ["bogus", "", "IMAGE", "gl-texture", " gl"] {
            let err = token.parse::<SurfaceKind>().unwrap_err();
            assert_eq!(err, UnknownSurfaceKind(token.to_string()));
        }
        assert_eq!(
            UnknownSurfaceKind("bogus".into()).to_string(),
            "Unknown surface type 'bogus'"
        );
    }

    #[test]
    fn parses_blit_policy() {
        assert_eq!("default".parse::<BlitPolicy>().unwrap(), BlitPolicy::Default);
        assert_eq!(" Mirror ".parse::<BlitPolicy>().unwrap(), BlitPolicy::Mirror);
        assert!("copy".parse::<BlitPolicy>().is_err());
    }

    #[test]
    fn default_config_uses_fixed_size() {
        let config = BenchConfig::new(SurfaceKind::Gl);
        assert_eq!(config.size, TargetSize::new(512, 512));
        assert_eq!(config.size.to_string(), "512x512");
        assert!(!config.size.is_empty());
        assert!(config.surface.uses_gpu());
        assert!(!SurfaceKind::Image.uses_gpu());
    }
}

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::Parser;
use renderer::{BenchConfig, BlitPolicy, TargetSize, UnknownSurfaceKind, VsyncMode};

/// Printed ahead of every argument error.
pub const USAGE: &str = "Usage: surfbench num_draws [image | gl | gl_texture]";

#[derive(Parser, Debug)]
#[command(
    name = "surfbench",
    version,
    about = "Benchmark off-screen rendering and on-screen compositing for three surface backends"
)]
pub struct Cli {
    /// Warm-up iterations rendered before the window loop starts (C `atoi` rules; negative means none).
    #[arg(
        value_name = "ITERATIONS",
        value_parser = parse_iterations,
        allow_negative_numbers = true
    )]
    pub iterations: u64,

    /// Drawing target: `image`, `gl`, or `gl_texture`.
    #[arg(value_name = "MODE")]
    pub mode: String,

    /// Target and window size.
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        env = "SURFBENCH_SIZE",
        value_parser = parse_size,
        default_value = "512x512"
    )]
    pub size: TargetSize,

    /// Create the window invisible; presentation still runs.
    #[arg(long)]
    pub hidden: bool,

    /// Stop the window loop after this many ticks.
    #[arg(long, value_name = "N")]
    pub max_frames: Option<u64>,

    /// Prefer an immediate or mailbox present mode over FIFO.
    #[arg(long)]
    pub no_vsync: bool,

    /// Which texture the compositor samples: `default` or `mirror`.
    #[arg(
        long,
        value_name = "POLICY",
        value_parser = parse_blit_policy,
        default_value = "default"
    )]
    pub blit: BlitPolicy,
}

impl Cli {
    /// Validates the mode token and assembles the renderer configuration.
    pub fn bench_config(&self) -> Result<BenchConfig, UnknownSurfaceKind> {
        let mut config = BenchConfig::new(self.mode.parse()?);
        config.size = self.size;
        config.hidden = self.hidden;
        config.max_frames = self.max_frames;
        config.vsync = if self.no_vsync {
            VsyncMode::Off
        } else {
            VsyncMode::On
        };
        config.blit = self.blit;
        Ok(config)
    }
}

/// Argument parsing ended without a runnable command line.
#[derive(Debug)]
pub struct Early {
    pub error: clap::Error,
    pub code: u8,
}

impl Early {
    pub fn report(&self) {
        if self.code != 0 {
            eprintln!("{USAGE}");
        }
        // Best effort: a closed stdout or stderr leaves nowhere to report to.
        let _ = self.error.print();
    }
}

pub fn parse() -> Result<Cli, Early> {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> Result<Cli, Early>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|error| Early {
        code: early_exit_code(error.kind()),
        error,
    })
}

/// Help and version requests succeed; every other parse failure is a usage error.
pub fn early_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parses like C `atoi`: leading whitespace, optional sign, then as many
/// digits as follow. Anything unparsable is zero and negative counts are zero.
pub fn parse_iterations(value: &str) -> Result<u64, String> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let count = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        });
    Ok(if negative { 0 } else { count })
}

pub fn parse_size(value: &str) -> Result<TargetSize, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{trimmed}' must be non-zero in both dimensions"));
    }
    Ok(TargetSize::new(width, height))
}

pub fn parse_blit_policy(value: &str) -> Result<BlitPolicy, String> {
    value.parse()
}

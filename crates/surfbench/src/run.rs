use std::io::{self, Write};

use anyhow::{Context, Result};
use harness::{run_presentation, run_warmup};
use renderer::{Bench, RendererError, UnknownSurfaceKind, WindowHost};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Fatal benchmark failures, one per process exit status.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error(transparent)]
    UnknownSurface(#[from] UnknownSurfaceKind),
    #[error(transparent)]
    Renderer(#[from] RendererError),
}

impl BenchError {
    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::UnknownSurface(_) => 4,
            BenchError::Renderer(err) => match err {
                RendererError::EventLoop(_) | RendererError::Window(_) | RendererError::Run(_) => 2,
                RendererError::Device(_) => 3,
                RendererError::Target(_) => 5,
            },
        }
    }
}

/// Exit status for an error returned by [`run`]. Errors that are not a
/// [`BenchError`] (console output failures) report as generic failures.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BenchError>()
        .map_or(1, BenchError::exit_code)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.bench_config().map_err(BenchError::from)?;
    tracing::debug!(
        surface = %config.surface,
        size = %config.size,
        iterations = cli.iterations,
        "starting benchmark"
    );

    let mut host = WindowHost::new(&config).map_err(BenchError::from)?;
    let mut bench = Bench::new(&config, &host).map_err(BenchError::from)?;

    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run_warmup(cli.iterations, &mut out, || bench.render_warmup())
            .context("failed to write warm-up progress")?;
    }

    let summary = run_presentation(&mut host, &mut bench).map_err(BenchError::from)?;
    tracing::debug!(
        surface = %bench.surface(),
        animation_step = bench.scene().animation().step(),
        "tearing down"
    );
    drop(bench);
    drop(host);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", summary.report()).context("failed to write report")?;
    out.flush().context("failed to flush report")?;
    Ok(())
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{TargetError, TargetSize};

    #[test]
    fn exit_codes_cover_every_failure() {
        let cases = [
            (BenchError::from(UnknownSurfaceKind("bogus".into())), 4),
            (RendererError::EventLoop("no display".into()).into(), 2),
            (RendererError::Window("no display".into()).into(), 2),
            (RendererError::Run("loop died".into()).into(), 2),
            (RendererError::Device("no adapter".into()).into(), 3),
            (
                RendererError::from(TargetError::EmptySize(TargetSize::new(0, 1))).into(),
                5,
            ),
            (
                RendererError::from(TargetError::TooManyPixels {
                    size: TargetSize::new(65_535, 65_535),
                    limit: 1 << 26,
                })
                .into(),
                5,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.exit_code(), expected, "{err}");
        }
    }

    #[test]
    fn exit_code_survives_context() {
        let err = anyhow::Error::from(BenchError::from(RendererError::Device("lost".into())))
            .context("while starting");
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("stdout closed")), 1);
    }

    #[test]
    fn unknown_surface_message_is_preserved() {
        let err = BenchError::from(UnknownSurfaceKind("bogus".into()));
        assert_eq!(err.to_string(), "Unknown surface type 'bogus'");
    }
}

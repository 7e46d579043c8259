use std::io::{self, Write};
use std::time::Duration;

use crate::progress::DecileProgress;
use crate::timer::Stopwatch;

/// Outcome of the warm-up phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupReport {
    pub iterations: u64,
    pub markers: u32,
    pub elapsed: Duration,
}

/// Runs `render` `iterations` times with no presentation in between.
///
/// Writes `Performing N iterations: `, one `+` per newly completed decile and
/// ` done! (Xms)` to `out`, flushing after every marker so progress shows up
/// while the phase runs. The phase has no cancellation point.
pub fn run_warmup<W, F>(iterations: u64, out: &mut W, mut render: F) -> io::Result<WarmupReport>
where
    W: Write + ?Sized,
    F: FnMut(),
{
    write!(out, "Performing {iterations} iterations: ")?;
    out.flush()?;

    let watch = Stopwatch::start();
    let mut progress = DecileProgress::new(iterations);
    let mut markers = 0u32;

    for completed in 1..=iterations {
        render();

        if progress.advance(completed) {
            out.write_all(b"+")?;
            out.flush()?;
            markers += 1;
        }
    }

    let elapsed = watch.elapsed();
    writeln!(out, " done! ({}ms)", watch.elapsed_millis())?;
    tracing::debug!(
        iterations,
        markers,
        elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
        "warm-up finished"
    );

    Ok(WarmupReport {
        iterations,
        markers,
        elapsed,
    })
}

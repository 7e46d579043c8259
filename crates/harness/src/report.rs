use std::fmt;
use std::time::Duration;

use crate::presentation::Accumulators;

/// Final counters of the presentation loop together with its wall-clock span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub totals: Accumulators,
    pub wall: Duration,
}

/// Statistics derived from a [`Summary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report {
    /// The loop ended before the first tick; averages are undefined.
    NoFrames { wall: Duration },
    Measured {
        frames: u64,
        /// `None` when the loop took no measurable time.
        fps: Option<f64>,
        offscreen_avg: Duration,
        onscreen_avg: Duration,
        offscreen_skipped: u64,
        onscreen_skipped: u64,
    },
}

impl Summary {
    pub fn new(totals: Accumulators, wall: Duration) -> Self {
        Self { totals, wall }
    }

    pub fn report(&self) -> Report {
        let frames = self.totals.frames;
        if frames == 0 {
            return Report::NoFrames { wall: self.wall };
        }

        let seconds = self.wall.as_secs_f64();
        let fps = (seconds > 0.0).then(|| frames as f64 / seconds);

        Report::Measured {
            frames,
            fps,
            offscreen_avg: average(self.totals.offscreen, frames),
            onscreen_avg: average(self.totals.onscreen, frames),
            offscreen_skipped: self.totals.offscreen_skipped,
            onscreen_skipped: self.totals.onscreen_skipped,
        }
    }
}

fn average(total: Duration, frames: u64) -> Duration {
    let nanos = total.as_nanos() / u128::from(frames.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::NoFrames { wall } => {
                writeln!(f, "No frames rendered ({:.3}ms elapsed)", millis(*wall))
            }
            Report::Measured {
                frames,
                fps,
                offscreen_avg,
                onscreen_avg,
                offscreen_skipped,
                onscreen_skipped,
            } => {
                writeln!(f, "Frames: {frames}")?;
                match fps {
                    Some(fps) => writeln!(f, "FPS: {fps:.2}")?,
                    None => writeln!(f, "FPS: n/a (no measurable elapsed time)")?,
                }
                writeln!(f, "Render average time: {:.3}ms", millis(*offscreen_avg))?;
                writeln!(f, "Present average time: {:.3}ms", millis(*onscreen_avg))?;
                if *offscreen_skipped > 0 || *onscreen_skipped > 0 {
                    writeln!(
                        f,
                        "Skipped: {offscreen_skipped} render, {onscreen_skipped} present"
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(frames: u64, offscreen_ms: u64, onscreen_ms: u64) -> Accumulators {
        Accumulators {
            offscreen: Duration::from_millis(offscreen_ms),
            onscreen: Duration::from_millis(onscreen_ms),
            frames,
            ..Default::default()
        }
    }

    #[test]
    fn zero_frames_reports_no_frames() {
        let summary = Summary::new(Accumulators::default(), Duration::from_millis(3));
        let report = summary.report();
        assert!(matches!(report, Report::NoFrames { .. }));
        assert!(report.to_string().starts_with("No frames rendered"));
    }

    #[test]
    fn computes_fps_with_subsecond_precision() {
        let summary = Summary::new(totals(30, 60, 15), Duration::from_millis(500));
        match summary.report() {
            Report::Measured {
                frames,
                fps,
                offscreen_avg,
                onscreen_avg,
                ..
            } => {
                assert_eq!(frames, 30);
                assert!((fps.unwrap() - 60.0).abs() < 1e-9);
                assert_eq!(offscreen_avg, Duration::from_millis(2));
                assert_eq!(onscreen_avg, Duration::from_micros(500));
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn zero_wall_time_leaves_fps_undefined() {
        let summary = Summary::new(totals(5, 0, 0), Duration::ZERO);
        let report = summary.report();
        match report {
            Report::Measured { fps, .. } => assert!(fps.is_none()),
            other => panic!("unexpected report {other:?}"),
        }
        assert!(report.to_string().contains("FPS: n/a"));
    }

    #[test]
    fn display_lists_skips_only_when_present() {
        let clean = Summary::new(totals(5, 5, 5), Duration::from_secs(1)).report();
        assert!(!clean.to_string().contains("Skipped"));

        let mut skipped = totals(5, 5, 5);
        skipped.onscreen_skipped = 2;
        let text = Summary::new(skipped, Duration::from_secs(1))
            .report()
            .to_string();
        assert!(text.contains("Frames: 5"));
        assert!(text.contains("FPS: 5.00"));
        assert!(text.contains("Render average time: 1.000ms"));
        assert!(text.contains("Skipped: 0 render, 2 present"));
    }
}

use std::time::Duration;

use crate::report::Summary;
use crate::timer::Stopwatch;

/// The two halves of a presentation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Rasterize the scene into the drawing target and publish it.
    Offscreen,
    /// Composite the drawing target into the visible window.
    Onscreen,
}

/// Whether a phase ran or was skipped because its context was unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Executed,
    Skipped,
}

impl PhaseOutcome {
    pub fn executed(self) -> bool {
        matches!(self, PhaseOutcome::Executed)
    }
}

/// Work performed on every tick. Implementations answer `Skipped` when the
/// phase's context cannot be made active; that is never an error.
pub trait FrameStages {
    fn offscreen(&mut self) -> PhaseOutcome;
    fn onscreen(&mut self) -> PhaseOutcome;
}

/// Drives ticks until the user asks to stop (window close, tick limit).
///
/// `run` blocks and calls `on_tick` once per tick; it returns once no more
/// ticks will be delivered.
pub trait TickSource {
    type Error;

    fn run(&mut self, on_tick: &mut dyn FnMut()) -> Result<(), Self::Error>;
}

/// Timing of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRecord {
    pub offscreen: PhaseOutcome,
    pub onscreen: PhaseOutcome,
    pub offscreen_time: Duration,
    pub onscreen_time: Duration,
}

/// Running totals for the presentation loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulators {
    pub offscreen: Duration,
    pub onscreen: Duration,
    pub frames: u64,
    pub offscreen_skipped: u64,
    pub onscreen_skipped: u64,
}

impl Accumulators {
    fn record(&mut self, tick: &TickRecord) {
        self.offscreen = self.offscreen.saturating_add(tick.offscreen_time);
        self.onscreen = self.onscreen.saturating_add(tick.onscreen_time);
        if !tick.offscreen.executed() {
            self.offscreen_skipped += 1;
        }
        if !tick.onscreen.executed() {
            self.onscreen_skipped += 1;
        }
        self.frames += 1;
    }
}

/// Per-tick state machine: off-screen phase, then on-screen phase, each timed
/// whether it executed or was skipped, then the frame counter.
#[derive(Debug)]
pub struct PresentationLoop {
    started: Stopwatch,
    totals: Accumulators,
}

impl PresentationLoop {
    pub fn start() -> Self {
        Self {
            started: Stopwatch::start(),
            totals: Accumulators::default(),
        }
    }

    pub fn tick<S>(&mut self, stages: &mut S) -> TickRecord
    where
        S: FrameStages + ?Sized,
    {
        let (offscreen, offscreen_time) = run_phase(Phase::Offscreen, stages);
        let (onscreen, onscreen_time) = run_phase(Phase::Onscreen, stages);
        let record = TickRecord {
            offscreen,
            onscreen,
            offscreen_time,
            onscreen_time,
        };
        self.totals.record(&record);
        if !offscreen.executed() || !onscreen.executed() {
            tracing::trace!(
                frame = self.totals.frames,
                ?offscreen,
                ?onscreen,
                "tick skipped a phase"
            );
        }
        record
    }

    pub fn totals(&self) -> &Accumulators {
        &self.totals
    }

    pub fn finish(self) -> Summary {
        Summary::new(self.totals, self.started.elapsed())
    }
}

impl Default for PresentationLoop {
    fn default() -> Self {
        Self::start()
    }
}

fn run_phase<S>(phase: Phase, stages: &mut S) -> (PhaseOutcome, Duration)
where
    S: FrameStages + ?Sized,
{
    let watch = Stopwatch::start();
    let outcome = match phase {
        Phase::Offscreen => stages.offscreen(),
        Phase::Onscreen => stages.onscreen(),
    };
    (outcome, watch.elapsed())
}

/// Runs the presentation loop for as long as `source` delivers ticks.
pub fn run_presentation<T, S>(source: &mut T, stages: &mut S) -> Result<Summary, T::Error>
where
    T: TickSource + ?Sized,
    S: FrameStages + ?Sized,
{
    let mut presentation = PresentationLoop::start();
    source.run(&mut || {
        presentation.tick(&mut *stages);
    })?;
    let summary = presentation.finish();
    tracing::info!(
        frames = summary.totals.frames,
        wall_ms = summary.wall.as_secs_f64() * 1_000.0,
        "presentation loop finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTicks(u64);

    impl TickSource for FixedTicks {
        type Error = std::convert::Infallible;

        fn run(&mut self, on_tick: &mut dyn FnMut()) -> Result<(), Self::Error> {
            for _ in 0..self.0 {
                on_tick();
            }
            Ok(())
        }
    }

    struct FailingSource;

    impl TickSource for FailingSource {
        type Error = &'static str;

        fn run(&mut self, on_tick: &mut dyn FnMut()) -> Result<(), Self::Error> {
            on_tick();
            Err("event loop died")
        }
    }

    /// Skips phases according to a pattern and records the call order.
    #[derive(Default)]
    struct ScriptedStages {
        skip_offscreen_every: Option<u64>,
        skip_onscreen_every: Option<u64>,
        calls: Vec<Phase>,
        ticks: u64,
    }

    impl FrameStages for ScriptedStages {
        fn offscreen(&mut self) -> PhaseOutcome {
            self.ticks += 1;
            self.calls.push(Phase::Offscreen);
            match self.skip_offscreen_every {
                Some(n) if self.ticks % n == 0 => PhaseOutcome::Skipped,
                _ => PhaseOutcome::Executed,
            }
        }

        fn onscreen(&mut self) -> PhaseOutcome {
            self.calls.push(Phase::Onscreen);
            match self.skip_onscreen_every {
                Some(n) if self.ticks % n == 0 => PhaseOutcome::Skipped,
                _ => PhaseOutcome::Executed,
            }
        }
    }

    #[test]
    fn frame_count_matches_delivered_ticks() {
        let mut stages = ScriptedStages::default();
        let summary = run_presentation(&mut FixedTicks(5), &mut stages).unwrap();
        assert_eq!(summary.totals.frames, 5);
        assert_eq!(summary.totals.offscreen_skipped, 0);
        assert_eq!(summary.totals.onscreen_skipped, 0);
    }

    #[test]
    fn phases_run_offscreen_then_onscreen() {
        let mut stages = ScriptedStages::default();
        run_presentation(&mut FixedTicks(2), &mut stages).unwrap();
        assert_eq!(
            stages.calls,
            vec![
                Phase::Offscreen,
                Phase::Onscreen,
                Phase::Offscreen,
                Phase::Onscreen
            ]
        );
    }

    #[test]
    fn skipped_phases_still_count_frames() {
        let mut stages = ScriptedStages {
            skip_offscreen_every: Some(2),
            skip_onscreen_every: Some(1),
            ..Default::default()
        };
        let summary = run_presentation(&mut FixedTicks(6), &mut stages).unwrap();
        assert_eq!(summary.totals.frames, 6);
        assert_eq!(summary.totals.offscreen_skipped, 3);
        assert_eq!(summary.totals.onscreen_skipped, 6);
    }

    #[test]
    fn no_ticks_leaves_counters_at_zero() {
        let mut stages = ScriptedStages::default();
        let summary = run_presentation(&mut FixedTicks(0), &mut stages).unwrap();
        assert_eq!(summary.totals, Accumulators::default());
        assert!(stages.calls.is_empty());
    }

    #[test]
    fn tick_source_errors_propagate() {
        let mut stages = ScriptedStages::default();
        let err = run_presentation(&mut FailingSource, &mut stages).unwrap_err();
        assert_eq!(err, "event loop died");
        assert_eq!(stages.ticks, 1);
    }

    #[test]
    fn accumulated_time_covers_every_tick() {
        let mut presentation = PresentationLoop::start();
        let mut stages = ScriptedStages::default();
        let mut offscreen = Duration::ZERO;
        let mut onscreen = Duration::ZERO;
        for _ in 0..4 {
            let record = presentation.tick(&mut stages);
            offscreen += record.offscreen_time;
            onscreen += record.onscreen_time;
        }
        assert_eq!(presentation.totals().offscreen, offscreen);
        assert_eq!(presentation.totals().onscreen, onscreen);
        assert_eq!(presentation.totals().frames, 4);
    }
}

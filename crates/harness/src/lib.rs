//! Measurement harness for the surface benchmark.
//!
//! Everything in this crate is independent of GPUs and windows. The renderer
//! crate plugs in at two seams:
//!
//! ```text
//!   run_warmup(iterations, out, render)       -- renderer only, no ticks
//!        │
//!        ▼
//!   run_presentation(tick_source, stages)
//!        │  TickSource::run ──▶ on_tick ──▶ PresentationLoop::tick
//!        │                                     ├─▶ FrameStages::offscreen
//!        │                                     └─▶ FrameStages::onscreen
//!        ▼
//!   Summary::report() ──▶ Report (Display)
//! ```
//!
//! `TickSource` stands in for the windowing collaborator: it decides when a
//! tick happens and when ticks stop. `FrameStages` answers whether each phase
//! could run. The harness owns the clocks and the counters.

mod presentation;
mod progress;
mod report;
mod timer;
mod warmup;

pub use presentation::{
    run_presentation, Accumulators, FrameStages, Phase, PhaseOutcome, PresentationLoop,
    TickRecord, TickSource,
};
pub use progress::DecileProgress;
pub use report::{Report, Summary};
pub use timer::{elapsed_millis, Stopwatch};
pub use warmup::{run_warmup, WarmupReport};

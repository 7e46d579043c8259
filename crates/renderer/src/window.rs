use std::sync::Arc;

use harness::TickSource;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::types::BenchConfig;
use crate::RendererError;

const WINDOW_TITLE: &str = "surfbench";

/// The benchmark window and the event loop that delivers ticks.
///
/// One tick is one `RedrawRequested` event; a redraw is requested every time
/// the loop runs out of events, so ticks arrive back to back. Ticks stop when
/// the window is closed or after `max_frames`.
pub struct WindowHost {
    event_loop: Option<EventLoop<()>>,
    window: Arc<Window>,
    max_frames: Option<u64>,
}

impl WindowHost {
    pub fn new(config: &BenchConfig) -> Result<Self, RendererError> {
        let event_loop =
            EventLoop::new().map_err(|err| RendererError::EventLoop(err.to_string()))?;
        let window = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(config.size.width, config.size.height))
            .with_resizable(true)
            .with_visible(!config.hidden)
            .build(&event_loop)
            .map_err(|err| RendererError::Window(err.to_string()))?;
        tracing::debug!(size = %config.size, hidden = config.hidden, "window created");

        Ok(Self {
            event_loop: Some(event_loop),
            window: Arc::new(window),
            max_frames: config.max_frames,
        })
    }

    /// The window whose display and window handles back the GPU surface.
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl TickSource for WindowHost {
    type Error = RendererError;

    fn run(&mut self, on_tick: &mut dyn FnMut()) -> Result<(), Self::Error> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| RendererError::Run("event loop already consumed".into()))?;
        let window = Arc::clone(&self.window);
        let limit = self.max_frames;
        let mut ticks: u64 = 0;

        if limit == Some(0) {
            return Ok(());
        }

        window.request_redraw();
        event_loop
            .run(|event, elwt| {
                elwt.set_control_flow(ControlFlow::Poll);
                match event {
                    Event::WindowEvent { window_id, event } if window_id == window.id() => {
                        match event {
                            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                                tracing::debug!(ticks, "window closed");
                                elwt.exit();
                            }
                            WindowEvent::RedrawRequested => {
                                if elwt.exiting() {
                                    return;
                                }
                                on_tick();
                                ticks += 1;
                                if limit.is_some_and(|limit| ticks >= limit) {
                                    tracing::debug!(ticks, "tick limit reached");
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        if !elwt.exiting() {
                            window.request_redraw();
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|err| RendererError::Run(err.to_string()))
    }
}

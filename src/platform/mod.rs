//=========================================================================
// Platform Subsystem
//
// Runs the winit window on the main thread and forwards its input to the
// logic thread that owns the stage.
//
// Architecture:
// ```text
//  Main Thread:                     Logic Thread:
//  ┌──────────────────────────┐    ┌──────────────────────┐
//  │  winit event loop        │    │  FrameLoop           │
//  │   ↓                      │    │   ├─ EventCollector  │
//  │  InputProcessor          │    │   ├─ StateTracker    │
//  │   └─ winit → InputEvent  │    │   └─ Stage::tick     │
//  │   ↓                      │    │                      │
//  │  InputBuffer             │    └──────────────────────┘
//  │   ├─ discrete            │             ↑
//  │   └─ latest pointer      │             │
//  │   ↓                      │             │
//  │  RedrawRequested (flush) ┼─────────────┘
//  └──────────────────────────┘    PlatformEvent
// ```
//
// Frame boundary is `RedrawRequested`: everything buffered since the last
// redraw is sent as one `PlatformEvent::Inputs`. The stage ticks at its own
// fixed rate, independent of the display refresh rate.
//
// If the logic thread is gone the platform logs and keeps running so the
// window can still be closed normally.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{PlatformError, PlatformEvent};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== WindowConfig ========================================================

/// Title and logical size of the stage window.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Stagehand".to_string(),
            width: 640,
            height: 480,
        }
    }
}

//=== Platform ============================================================

/// Window owner and input forwarder.
///
/// Must stay on the main thread (winit requirement on macOS/iOS); the
/// only thing it shares with the logic thread is the channel sender.
pub(crate) struct Platform {
    config: WindowConfig,

    /// Created lazily in `resumed()`.
    window: Option<Window>,

    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    input_processor: InputProcessor,
}

impl Platform {
    pub fn new(config: WindowConfig, event_sender: Sender<PlatformEvent>) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            config,
            window: None,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
        }
    }

    /// Runs the event loop until the window closes.
    ///
    /// # Errors
    ///
    /// [`PlatformError::EventLoopCreation`] when no event loop can be
    /// created, [`PlatformError::EventLoopExecution`] when it fails while
    /// running.
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends everything buffered since the last redraw. Nothing is sent for
    /// an empty buffer; a disconnected channel drops the batch.
    fn flush_input_buffer(&mut self) {
        let Some((discrete, continuous)) = self.buffer.drain() else {
            return;
        };
        let counts = (discrete.len(), continuous.len());
        trace!(
            target: "platform::input",
            "Flushing {} discrete + {} continuous events", counts.0, counts.1
        );

        if self
            .event_sender
            .send(PlatformEvent::Inputs { discrete, continuous })
            .is_err()
        {
            warn!(
                target: "platform::input",
                "Logic thread gone, dropping {} discrete + {} continuous events",
                counts.0, counts.1
            );
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        let _ = self.event_sender.send(PlatformEvent::WindowClosed);
        event_loop.exit();
    }

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists, resume ignored");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    self.config.width,
                    self.config.height,
                    window.scale_factor()
                );
                self.input_processor.set_scale_factor(window.scale_factor());
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.close(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.close(event_loop);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.input_processor.set_scale_factor(scale_factor);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.input_processor.process_mouse_move(position);
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match self.input_processor.process_key_event(&key_event) {
                    Some(event) => self.buffer.push_discrete(event),
                    None => trace!(target: "platform::input", "Unmapped key ignored"),
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(button, state);
                self.buffer.push_discrete(event);
            }

            WindowEvent::RedrawRequested => {
                self.flush_input_buffer();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Stagehand Engine
//
// Entry point that puts a stage on screen.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──init()──>  Engine  ──run()──>  [Runtime]
//         │                          │                                        │
//         ├─ with_tps()              └─ owns the Stage                        ├─ logic thread: FrameLoop
//         ├─ with_channel_capacity()                                          └─ main thread: Platform
//         ├─ with_title() / with_window_size()
//         └─ with_stage(StageBuilder)
// ```
//
// The window is always sized to the stage's viewport, so wall checks,
// clamping and pointer coordinates share one coordinate space.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::backend::Viewport;
use crate::core::platform_bridge::PlatformEvent;
use crate::core::stage::{Stage, StageBuilder};
use crate::core::FrameLoop;
use crate::platform::{Platform, WindowConfig};

//=== EngineBuilder =======================================================

/// Builder for an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (stage ticks per second)
/// - **Channel capacity**: 128 input batches
/// - **Window**: "Stagehand", 640 × 480
/// - **Stage**: `StageBuilder::new()`
///
/// # Examples
///
/// ```no_run
/// use stagehand::prelude::*;
///
/// EngineBuilder::new()
///     .with_tps(30.0)
///     .with_title("Cars")
///     .with_stage(StageBuilder::new().with_asset_root("demos/assets"))
///     .build()
///     .init(|stage| {
///         let car = stage.create_character(CharacterOptions::new().costume("car1.png"))?;
///         car.on(Trigger::Start, |ctx, _| {
///             ctx.forever(|car| {
///                 car.move_by(5.0);
///                 car.turn_if_reach_wall();
///                 Ok(())
///             })
///         });
///         Ok(())
///     })
///     .unwrap()
///     .run();
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    window: WindowConfig,
    window_size: Option<Viewport>,
    stage: StageBuilder,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            window: WindowConfig::default(),
            window_size: None,
            stage: StageBuilder::new(),
        }
    }

    /// Sets how many times per second the stage ticks.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets how many input batches may queue between the platform and the
    /// logic thread.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Sets the window's logical size, which is also the viewport of the
    /// stage's default renderer. Ignored when the stage was given its own
    /// renderer; the window then follows that renderer's viewport.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive");
        self.window_size = Some(Viewport::new(width, height));
        self
    }

    /// Configures the stage the engine builds and runs.
    pub fn with_stage(mut self, stage: StageBuilder) -> Self {
        self.stage = stage;
        self
    }

    pub fn build(self) -> Engine {
        info!(
            target: "engine",
            "Building engine (TPS: {}, channel: {})", self.tps, self.channel_capacity
        );

        let stage = match self.window_size {
            Some(size) => self.stage.with_viewport(size.width, size.height),
            None => self.stage,
        }
        .build();

        let viewport = stage.viewport();
        let window = WindowConfig {
            width: viewport.width,
            height: viewport.height,
            ..self.window
        };

        Engine {
            stage,
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            window,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// A configured stage plus the window it runs in.
///
/// # Architecture
///
/// ```text
/// Engine::run (main thread)
///   ├─► FrameLoop (logic thread @ TPS)
///   │     └─► Stage::start, then Stage::tick per frame
///   │
///   └─► Platform (winit event loop)
///         └─► window, input batching
///
/// Communication: crossbeam channel (PlatformEvent)
/// ```
pub struct Engine {
    stage: Stage,
    tps: f64,
    channel_capacity: usize,
    window: WindowConfig,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Populates the stage before it starts: create characters, register
    /// handlers.
    ///
    /// # Errors
    ///
    /// Whatever `init_fn` returns, typically a costume that failed to load.
    pub fn init<F>(self, init_fn: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&Stage) -> anyhow::Result<()>,
    {
        info!(target: "engine", "Initializing stage");
        init_fn(&self.stage)?;
        info!(
            target: "engine",
            "Stage initialized with {} character(s)", self.stage.world().len()
        );
        Ok(self)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    //--- Execution --------------------------------------------------------

    /// Starts the stage and blocks until the window closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the platform → logic channel
    /// 2. Moves the stage onto the logic thread, which starts it and ticks
    ///    it at the configured TPS
    /// 3. Runs the platform event loop (blocks here)
    /// 4. On window close the logic thread exits and drops the stage,
    ///    which stops every suspended task
    pub fn run(self) {
        info!(target: "engine", "Starting engine runtime (TPS: {})", self.tps);

        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        let core_handle = match FrameLoop::new(self.stage).spawn(rx, self.tps) {
            Ok(handle) => handle,
            Err(e) => {
                error!(target: "engine", "Could not start logic thread: {}", e);
                return;
            }
        };
        info!(target: "engine", "Logic thread spawned");

        let platform = Platform::new(self.window, tx);
        if let Err(e) = platform.run() {
            error!(target: "engine", "Platform error: {}", e);
        }
        info!(target: "engine", "Platform event loop exited");

        match core_handle.join() {
            Ok(()) => info!(target: "engine", "Logic thread terminated cleanly"),
            Err(e) => error!(target: "engine", "Logic thread panicked: {:?}", e),
        }

        info!(target: "engine", "Engine shutdown complete");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

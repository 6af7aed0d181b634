//=========================================================================
// Core
//
// Simulation side of the crate: characters, their handlers and tasks, the
// stage that owns them, and the frame loop that drives the stage on the
// logic (non-platform) thread.
//
// Responsibilities:
// - Own the `Stage` and the input `StateTracker` on one thread
// - Receive platform input batches through the crossbeam channel
// - Tick the stage at a fixed rate (TPS)
// - Tear the stage down (and every suspended task) on window close
//
// Notes:
// The frame loop never touches the window. Communication with the platform
// happens only through `PlatformEvent` messages, so the whole core runs and
// tests without a display.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::info;

//=== Module Declarations =================================================

pub mod backend;
pub mod cache;
pub mod character;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub(crate) mod platform_bridge;
pub mod scheduler;
pub mod stage;
pub mod world;

//=== Internal Dependencies ===============================================

use input::{InputEvent, StateTracker};
use platform_bridge::{EventCollector, PlatformEvent, TickControl};
use stage::Stage;

//=== Locking =============================================================

/// Locks `mutex`, recovering the data of a poisoned lock.
///
/// A handler body that panics is reported as a task failure; the state it
/// was mutating stays usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//=== FrameLoop ===========================================================

/// Fixed-rate driver of a [`Stage`].
pub(crate) struct FrameLoop {
    stage: Stage,
    input: StateTracker,
}

impl FrameLoop {
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            stage,
            input: StateTracker::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn stage(&self) -> &Stage {
        &self.stage
    }

    //--- spawn() ----------------------------------------------------------
    //
    // Starts the logic thread. Each tick:
    //  1. Collects the input batches flushed by the platform
    //  2. Folds them into the state tracker and ticks the stage
    //  3. Sleeps to maintain fixed pacing
    //  4. Exits when the window closes or the channel disconnects
    //
    pub(crate) fn spawn(
        self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
    ) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("stage-logic".to_string())
            .spawn(move || self.run(receiver, tps))
    }

    fn run(mut self, receiver: Receiver<PlatformEvent>, tps: f64) {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);
        let mut collector = EventCollector::new(receiver);

        self.stage.start();

        loop {
            let frame_start = Instant::now();

            if collector.collect_frame() == TickControl::Exit {
                info!(target: "engine", "Logic thread exiting after {} frame(s)", self.stage.frame());
                break;
            }

            let batches = collector.take_batches();
            self.step(&batches);

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }
    }

    /// One frame: fold `batches` into the input state, then tick the stage.
    pub(crate) fn step(&mut self, batches: &[Vec<InputEvent>]) {
        self.input.clear();
        for batch in batches {
            self.input.process_events(batch);
        }
        self.stage.tick(&self.input);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Event Collector
//=========================================================================
//
// Logic-thread side of the platform channel.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → input batches → FrameLoop
//
// At most MAX_EVENTS_PER_FRAME messages are drained per frame so a flood
// of input cannot stall the stage; an idle frame sleeps briefly.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::input::InputEvent;

//=== Constants ===========================================================

/// Upper bound on messages drained in one frame.
const MAX_EVENTS_PER_FRAME: usize = 100;

/// Pause taken by a frame that received nothing.
const IDLE_SLEEP: Duration = Duration::from_millis(10);

//=== TickControl =========================================================

/// Whether the frame loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Drains the platform channel into per-frame input batches.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    input_batches: Vec<Vec<InputEvent>>,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            input_batches: Vec::with_capacity(4),
        }
    }

    /// Drains pending platform messages for this frame.
    ///
    /// Returns `Exit` on window close or when the platform side is gone.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.input_batches.clear();

        let mut received = 0;
        while received < MAX_EVENTS_PER_FRAME {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
            };
            received += 1;
            if let TickControl::Exit = self.accept(event) {
                return TickControl::Exit;
            }
        }

        match received {
            0 => thread::sleep(IDLE_SLEEP),
            MAX_EVENTS_PER_FRAME => {
                warn!(target: "engine", "Input backlog: {} messages drained this frame", received);
            }
            _ => {}
        }

        TickControl::Continue
    }

    /// Batches collected by the last `collect_frame`.
    #[cfg(test)]
    pub(crate) fn batches(&self) -> &[Vec<InputEvent>] {
        &self.input_batches
    }

    /// Moves the collected batches out, leaving the buffer empty.
    pub(crate) fn take_batches(&mut self) -> Vec<Vec<InputEvent>> {
        std::mem::take(&mut self.input_batches)
    }

    fn accept(&mut self, event: PlatformEvent) -> TickControl {
        let PlatformEvent::Inputs { discrete, continuous } = event else {
            return TickControl::Exit;
        };
        self.input_batches
            .extend([discrete, continuous].into_iter().filter(|batch| !batch.is_empty()));
        TickControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

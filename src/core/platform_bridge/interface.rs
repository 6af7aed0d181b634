//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Messages and errors crossing the platform → logic thread boundary.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;
use winit::error::EventLoopError;

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;

//=== PlatformEvent =======================================================

/// Events sent from the platform to the logic thread.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlatformEvent {
    /// Input flushed at one redraw.
    ///
    /// - `discrete`: key and button transitions, order significant
    /// - `continuous`: pointer motion, already coalesced
    Inputs {
        discrete: Vec<InputEvent>,
        continuous: Vec<InputEvent>,
    },

    /// The window was closed; the logic thread tears the stage down.
    WindowClosed,
}

//=== PlatformError =======================================================

/// Fatal platform failures.
#[derive(Debug, Error)]
pub(crate) enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] EventLoopError),
}

//=========================================================================
// Unit Tests
//=========================================================================

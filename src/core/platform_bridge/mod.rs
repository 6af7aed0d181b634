//=========================================================================
// Platform Bridge
//=========================================================================
//
// Contract between the windowing layer and the frame loop.
//
// The platform only produces `PlatformEvent`s; the core only consumes
// them. Neither side depends on the other's types beyond this module.
//
// Components:
// - `interface`: messages and errors
// - `event_collector`: logic-thread draining and batching
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use interface::{PlatformError, PlatformEvent};
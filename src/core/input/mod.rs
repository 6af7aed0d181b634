//=========================================================================
// Input
//=========================================================================
//
// Portable input types and the per-frame state tracker.
//
// The logic thread owns one `StateTracker`, feeds it every batch received
// from the platform, and hands it to `Stage::tick`.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
pub mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, MouseButton};
pub use state_tracker::StateTracker;

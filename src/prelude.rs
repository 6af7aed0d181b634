//=========================================================================
// Prelude
//=========================================================================
//
// Re-exports of the types a stage script touches.
//
// Usage:
//   use stagehand::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder};

// Stage and characters
pub use crate::core::character::{Aim, BalloonStyle, Character, CharacterId, CharacterOptions, OptionValue};
pub use crate::core::stage::{Stage, StageBuilder};

// Events and tasks
pub use crate::core::events::{EventArgs, EventKind, HitTarget, Trigger};
pub use crate::core::scheduler::{TaskContext, TaskFailure};

// Geometry
pub use crate::core::geometry::{DVec2, Rect};

// Input and hardware
pub use crate::core::backend::Pin;
pub use crate::core::input::{KeyCode, MouseButton};

// Errors
pub use crate::core::error::{ConfigError, StageError};

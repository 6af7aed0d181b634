//=========================================================================
// Input Event Types
//=========================================================================
//
// Portable representation of keyboard and pointer input.
//
// The platform layer translates winit events into these types; the
// `StateTracker` folds them into held/pushed sets that the stage hands to
// the key_down, key_push and click dispatchers.
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    StateTracker (held / pushed this frame)
//         ↓
//    Stage::tick → Character::key_down / key_push / click
// ```
//
//=========================================================================

//=== MouseButton =========================================================

/// Physical mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouseButton {
    Left,
    Right,
    Middle,

    /// Side, thumb and macro buttons.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Names the key location, not the produced character: `KeyA` is the
/// same key on QWERTY and AZERTY layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ShiftLeft,
    ShiftRight,

    /// Any key the platform reports that has no variant above.
    Unidentified,
}

//=== InputEvent ==========================================================

/// One low-level input occurrence reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),

    /// Pointer moved to `(x, y)` in window pixels, top-left origin.
    MouseMoved { x: f64, y: f64 },

    Unidentified,
}

impl InputEvent {
    /// True for events whose newest occurrence supersedes older ones
    /// within a batch.
    pub fn is_coalescable(&self) -> bool {
        matches!(self, Self::MouseMoved { .. })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn only_mouse_motion_is_coalescable() {
        assert!(InputEvent::MouseMoved { x: 1.0, y: 2.0 }.is_coalescable());
        assert!(!InputEvent::KeyDown(KeyCode::Space).is_coalescable());
        assert!(!InputEvent::MouseButtonUp(MouseButton::Left).is_coalescable());
        assert!(!InputEvent::Unidentified.is_coalescable());
    }

    #[test]
    fn key_codes_deduplicate_in_sets() {
        let keys: HashSet<KeyCode> =
            [KeyCode::ArrowLeft, KeyCode::ArrowLeft, KeyCode::Space].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn key_codes_order_is_declaration_order() {
        let mut keys = vec![KeyCode::Space, KeyCode::KeyA, KeyCode::Digit1];
        keys.sort();
        assert_eq!(keys, vec![KeyCode::Digit1, KeyCode::KeyA, KeyCode::Space]);
    }
}

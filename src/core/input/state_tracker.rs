//=========================================================================
// State Tracker
//=========================================================================
//
// Folds input events into the per-frame sets the stage dispatches from.
//
// Architecture:
//   InputEvent → process_events() → held sets + this-frame deltas → query
//
// Frame lifecycle: clear() → process_events() → query (Stage::tick)
//
// Mapping to character events:
// - keys held            → key_down
// - keys pushed (UP→DOWN) this frame    → key_push
// - buttons pushed this frame           → click (at the pointer position)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, MouseButton};
use crate::core::geometry::DVec2;

//=== StateTracker ========================================================

/// Persistent held state plus the transitions of the current frame.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    keys_down: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    pointer: DVec2,

    //--- Frame Deltas (reset each frame via clear()) --------------------
    keys_pushed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_pushed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Frame Processing -------------------------------------------------

    /// Drops the previous frame's transitions. Held state is kept.
    pub fn clear(&mut self) {
        self.keys_pushed.clear();
        self.keys_released.clear();
        self.buttons_pushed.clear();
        self.buttons_released.clear();
    }

    pub fn process_events(&mut self, events: &[InputEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    fn process_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                // OS key repeat re-sends KeyDown while held
                if self.keys_down.insert(key) {
                    self.keys_pushed.insert(key);
                }
            }
            InputEvent::KeyUp(key) => {
                if self.keys_down.remove(&key) {
                    self.keys_released.insert(key);
                }
            }
            InputEvent::MouseButtonDown(button) => {
                if self.buttons_down.insert(button) {
                    self.buttons_pushed.insert(button);
                }
            }
            InputEvent::MouseButtonUp(button) => {
                if self.buttons_down.remove(&button) {
                    self.buttons_released.insert(button);
                }
            }
            InputEvent::MouseMoved { x, y } => self.pointer = DVec2::new(x, y),
            InputEvent::Unidentified => {}
        }
    }

    //=====================================================================
    // Query API - Keyboard
    //=====================================================================

    /// True while `key` is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// True on the frame `key` went from up to down.
    pub fn is_key_pushed(&self, key: KeyCode) -> bool {
        self.keys_pushed.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Held keys, sorted.
    pub fn keys_down(&self) -> Vec<KeyCode> {
        sorted(&self.keys_down)
    }

    /// Keys pushed this frame, sorted.
    pub fn keys_pushed(&self) -> Vec<KeyCode> {
        sorted(&self.keys_pushed)
    }

    //=====================================================================
    // Query API - Mouse
    //=====================================================================

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_button_pushed(&self, button: MouseButton) -> bool {
        self.buttons_pushed.contains(&button)
    }

    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Buttons pushed this frame, sorted.
    pub fn buttons_pushed(&self) -> Vec<MouseButton> {
        sorted(&self.buttons_pushed)
    }

    /// Pointer position in window pixels, top-left origin.
    pub fn pointer(&self) -> DVec2 {
        self.pointer
    }
}

fn sorted<T: Copy + Ord>(set: &HashSet<T>) -> Vec<T> {
    let mut items: Vec<T> = set.iter().copied().collect();
    items.sort();
    items
}

//=========================================================================
// Unit Tests
//=========================================================================

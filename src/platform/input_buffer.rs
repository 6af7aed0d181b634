//=========================================================================
// Input Buffer
//
// Per-redraw store for the input the platform received since the last
// flush.
//
// Responsibilities:
// - Keep discrete events (keys, buttons) in arrival order
// - Drop consecutive duplicates (OS key repeat)
// - Keep only the newest pointer position
// - Hand both out together through `drain()`
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    pointer: Option<InputEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self {
            discrete: Vec::with_capacity(32),
            pointer: None,
        }
    }

    /// Stores a coalescable event, replacing the previous one.
    ///
    /// Discrete events passed here are appended instead.
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        if event.is_coalescable() {
            self.pointer = Some(event);
        } else {
            self.push_discrete(event);
        }
    }

    /// Appends a discrete event unless it repeats the previous one.
    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    /// Takes `(discrete, continuous)` out of the buffer; `None` when
    /// nothing was buffered.
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }
        let discrete = std::mem::take(&mut self.discrete);
        let continuous = self.pointer.take().into_iter().collect();
        Some((discrete, continuous))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.pointer.is_none()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{KeyCode, MouseButton};

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }

    #[test]
    fn repeated_key_down_is_stored_once() {
        let mut buffer = InputBuffer::new();
        buffer.push_discrete(InputEvent::KeyDown(KeyCode::KeyA));
        buffer.push_discrete(InputEvent::KeyDown(KeyCode::KeyA));
        buffer.push_discrete(InputEvent::KeyUp(KeyCode::KeyA));
        buffer.push_discrete(InputEvent::KeyDown(KeyCode::KeyA));

        let (discrete, _) = buffer.drain().unwrap();
        assert_eq!(
            discrete,
            vec![
                InputEvent::KeyDown(KeyCode::KeyA),
                InputEvent::KeyUp(KeyCode::KeyA),
                InputEvent::KeyDown(KeyCode::KeyA),
            ]
        );
    }

    #[test]
    fn pointer_keeps_only_the_latest_position() {
        let mut buffer = InputBuffer::new();
        buffer.push_continuous(moved(10.0, 10.0));
        buffer.push_continuous(moved(20.0, 30.0));

        let (discrete, continuous) = buffer.drain().unwrap();
        assert!(discrete.is_empty());
        assert_eq!(continuous, vec![moved(20.0, 30.0)]);
    }

    #[test]
    fn discrete_event_pushed_as_continuous_is_kept_in_order() {
        let mut buffer = InputBuffer::new();
        buffer.push_continuous(InputEvent::MouseButtonDown(MouseButton::Left));

        let (discrete, continuous) = buffer.drain().unwrap();
        assert_eq!(discrete, vec![InputEvent::MouseButtonDown(MouseButton::Left)]);
        assert!(continuous.is_empty());
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut buffer = InputBuffer::new();
        assert!(buffer.drain().is_none());

        buffer.push_discrete(InputEvent::KeyDown(KeyCode::Space));
        buffer.push_continuous(moved(5.0, 5.0));
        assert!(buffer.drain().is_some());
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_none());
    }
}

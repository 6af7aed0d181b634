//=========================================================================
// Events
//=========================================================================
//
// Handler registration records and filter matching.
//
// Architecture:
// ```text
//   Character::on(Trigger, body)
//        │
//        ▼
//   EventRegistry ── kind → [EventHandler, ...]   (registration order)
//        │
//        ▼ dispatch (Character::key_down / click / hit / ...)
//   filter match ──► scheduler::spawn(handler body, EventArgs)
// ```
//
// Filter semantics: an empty filter list matches every payload; a
// non-empty one matches when it intersects the payload.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::backend::Pin;
use super::character::{Character, CharacterId};
use super::input::{KeyCode, MouseButton};
use super::scheduler::TaskContext;

//=== EventKind ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    KeyDown,
    KeyPush,
    Click,
    Hit,
    SensorChange,
    ButtonUp,
    ButtonDown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::KeyDown => "key_down",
            Self::KeyPush => "key_push",
            Self::Click => "click",
            Self::Hit => "hit",
            Self::SensorChange => "sensor_change",
            Self::ButtonUp => "button_up",
            Self::ButtonDown => "button_down",
        };
        f.write_str(name)
    }
}

//=== HitTarget ===========================================================

/// Collision target reference: one character, or every other character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    Any,
    Character(CharacterId),
}

impl HitTarget {
    pub fn includes(&self, id: CharacterId) -> bool {
        match self {
            Self::Any => true,
            Self::Character(target) => *target == id,
        }
    }
}

impl From<&Character> for HitTarget {
    fn from(character: &Character) -> Self {
        Self::Character(character.id())
    }
}

impl From<CharacterId> for HitTarget {
    fn from(id: CharacterId) -> Self {
        Self::Character(id)
    }
}

//=== Trigger =============================================================

/// Event kind together with its filter list.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Start,
    KeyDown(Vec<KeyCode>),
    KeyPush(Vec<KeyCode>),
    Click(Vec<MouseButton>),
    Hit(Vec<HitTarget>),
    SensorChange(Vec<Pin>),
    ButtonUp(Vec<Pin>),
    ButtonDown(Vec<Pin>),
}

impl Trigger {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Start => EventKind::Start,
            Self::KeyDown(_) => EventKind::KeyDown,
            Self::KeyPush(_) => EventKind::KeyPush,
            Self::Click(_) => EventKind::Click,
            Self::Hit(_) => EventKind::Hit,
            Self::SensorChange(_) => EventKind::SensorChange,
            Self::ButtonUp(_) => EventKind::ButtonUp,
            Self::ButtonDown(_) => EventKind::ButtonDown,
        }
    }

    /// Hit handler with the given targets.
    pub fn hit<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<HitTarget>,
    {
        Self::Hit(targets.into_iter().map(Into::into).collect())
    }

    /// Pins named by a hardware trigger; empty for every other kind.
    pub fn pins(&self) -> &[Pin] {
        match self {
            Self::SensorChange(pins) | Self::ButtonUp(pins) | Self::ButtonDown(pins) => pins,
            _ => &[],
        }
    }
}

//=== EventArgs ===========================================================

/// Payload handed to a handler body.
#[derive(Debug, Clone, Default)]
pub enum EventArgs {
    #[default]
    None,

    /// Pointer position at click time.
    Click { x: f64, y: f64 },

    /// Overlapping characters that matched the handler's filter.
    Hit(Vec<Character>),

    Sensor { pin: Pin, value: i32 },

    /// Pin of a button transition.
    Button(Pin),
}

//=== EventHandler ========================================================

/// Handler body signature. Returning `Err`, or panicking, fails the task.
pub type HandlerFn = dyn Fn(&TaskContext, &EventArgs) -> anyhow::Result<()> + Send + Sync;

/// One registration: immutable once created.
pub struct EventHandler {
    owner: CharacterId,
    trigger: Trigger,
    body: Arc<HandlerFn>,
}

impl EventHandler {
    pub fn new(owner: CharacterId, trigger: Trigger, body: Arc<HandlerFn>) -> Self {
        Self { owner, trigger, body }
    }

    pub fn owner(&self) -> CharacterId {
        self.owner
    }

    pub fn kind(&self) -> EventKind {
        self.trigger.kind()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn body(&self) -> Arc<HandlerFn> {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("owner", &self.owner)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

//=== EventRegistry =======================================================

/// Per-character mapping from event kind to handlers in registration order.
#[derive(Debug, Default)]
pub struct EventRegistry {
    handlers: HashMap<EventKind, Vec<Arc<EventHandler>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: EventHandler) -> Arc<EventHandler> {
        let handler = Arc::new(handler);
        self.handlers
            .entry(handler.kind())
            .or_default()
            .push(Arc::clone(&handler));
        handler
    }

    /// Snapshot of the handlers for `kind`, so dispatch can run them
    /// without holding the registry.
    pub fn handlers(&self, kind: EventKind) -> Vec<Arc<EventHandler>> {
        self.handlers.get(&kind).cloned().unwrap_or_default()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

//=== Filter Matching =====================================================

/// True when `filter` is empty or shares an element with `payload`.
pub fn filter_matches<T: PartialEq>(filter: &[T], payload: &[T]) -> bool {
    filter.is_empty() || filter.iter().any(|wanted| payload.contains(wanted))
}

/// Characters among `candidates` selected by a hit handler's `filter`.
pub fn select_hit_targets(filter: &[HitTarget], candidates: &[Character]) -> Vec<Character> {
    candidates
        .iter()
        .filter(|c| filter.is_empty() || filter.iter().any(|t| t.includes(c.id())))
        .cloned()
        .collect()
}

//=========================================================================
// Unit Tests
//=========================================================================

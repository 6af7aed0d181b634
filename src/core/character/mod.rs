//=========================================================================
// Character
//=========================================================================
//
// The stage entity: position, orientation, costume, speech balloon,
// collision interests, event handlers and in-flight handler tasks.
//
// Architecture:
// ```text
//   Character (cheap Clone handle)
//     └─ Arc<CharacterInner>
//          ├─ state: Mutex<CharacterState>    position, vector, balloon, targets
//          ├─ handlers: Mutex<EventRegistry>  kind → handlers
//          ├─ tasks: Mutex<TaskList>          in-flight handler executions
//          ├─ sounds: Mutex<HashMap>          per-character sound cache
//          ├─ env: Arc<Environment>           collaborators + shared caches
//          └─ world: WeakWorld                live registry (collision)
// ```
//
// Locks are held only for short, non-reentrant sections. None is held
// while a handler body runs, so bodies may call back into any character.
//
// Behavior is split by concern:
// - `motion`: move, turn, rotate, point towards, wall checks, clamp
// - `collision`: hit interests, overlap evaluation
// - `balloon`: speech balloon layout and placement
// - `dispatch`: handler registration, event dispatch, task lifecycle
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};

//=== Module Declarations =================================================

mod balloon;
mod collision;
mod dispatch;
mod motion;
mod options;

//=== Internal Dependencies ===============================================

use super::backend::{SoundHandle, SpriteDraw, SurfaceHandle};
use super::error::{Result, StageError};
use super::events::EventRegistry;
use super::geometry::{direction_from_angle, normalize_angle, DVec2, Rect};
use super::lock;
use super::scheduler::TaskList;
use super::stage::Environment;
use super::world::{WeakWorld, World};

//=== Public API ==========================================================

pub use balloon::{wrap_lines, Balloon, BalloonStyle, CHARS_PER_LINE, FRAME_SIZE, MARGIN_SIZE};
pub use collision::CollisionTargetSet;
pub use motion::Aim;
pub use options::{CharacterOptions, OptionValue};

//=== CharacterId =========================================================

/// Stage-unique character identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub(crate) u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//=== CharacterState ======================================================

/// Mutable per-frame state.
///
/// `vector` always equals `direction_from_angle(angle, scale_x)`: every
/// mutation of either side goes through `set_angle` or `turn`.
#[derive(Debug)]
pub(crate) struct CharacterState {
    position: DVec2,
    vector: DVec2,
    angle: f64,
    scale_x: f64,
    scale_y: f64,
    visible: bool,
    costume: Option<SurfaceHandle>,
    balloon: Option<Balloon>,
    targets: CollisionTargetSet,
}

impl CharacterState {
    fn new(options: &CharacterOptions, costume: Option<SurfaceHandle>) -> Self {
        let mut state = Self {
            position: DVec2::new(options.x, options.y),
            vector: DVec2::X,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: options.visible,
            costume,
            balloon: None,
            targets: CollisionTargetSet::new(),
        };
        state.set_angle(options.angle);
        state
    }

    /// Costume size in pixels; zero without a costume.
    fn size(&self) -> (f64, f64) {
        self.costume
            .map_or((0.0, 0.0), |c| (f64::from(c.width), f64::from(c.height)))
    }

    fn rect(&self) -> Rect {
        let (width, height) = self.size();
        Rect::new(self.position.x, self.position.y, width, height)
    }

    fn set_angle(&mut self, degrees: f64) {
        self.angle = normalize_angle(degrees);
        self.vector = direction_from_angle(self.angle, self.scale_x);
    }

    fn sprite(&self) -> Option<SpriteDraw> {
        if !self.visible {
            return None;
        }
        self.costume.map(|surface| SpriteDraw {
            surface,
            x: self.position.x,
            y: self.position.y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            angle: self.angle,
        })
    }
}

//=== Character ===========================================================

/// Shared handle to one character. Clones refer to the same character.
#[derive(Clone)]
pub struct Character {
    inner: Arc<CharacterInner>,
}

struct CharacterInner {
    id: CharacterId,
    state: Mutex<CharacterState>,
    handlers: Mutex<EventRegistry>,
    tasks: Mutex<TaskList>,
    sounds: Mutex<HashMap<String, SoundHandle>>,
    next_task: AtomicU64,
    env: Arc<Environment>,
    world: WeakWorld,
}

impl Character {
    //--- Construction -----------------------------------------------------

    /// Loads the costume, builds the character and registers it in `world`.
    pub(crate) fn create(
        id: CharacterId,
        options: CharacterOptions,
        env: Arc<Environment>,
        world: &World,
    ) -> Result<Self> {
        let costume = match options.costume.as_deref() {
            Some(name) => Some(load_costume(&env, name)?),
            None => None,
        };

        let character = Self {
            inner: Arc::new(CharacterInner {
                id,
                state: Mutex::new(CharacterState::new(&options, costume)),
                handlers: Mutex::new(EventRegistry::new()),
                tasks: Mutex::new(TaskList::new()),
                sounds: Mutex::new(HashMap::new()),
                next_task: AtomicU64::new(0),
                env,
                world: world.downgrade(),
            }),
        };
        world.add(character.clone());

        debug!(
            target: "stage",
            "Created character {} at ({}, {})", id, options.x, options.y
        );
        Ok(character)
    }

    //--- Accessors --------------------------------------------------------

    pub fn id(&self) -> CharacterId {
        self.inner.id
    }

    pub fn x(&self) -> f64 {
        self.state().position.x
    }

    pub fn y(&self) -> f64 {
        self.state().position.y
    }

    /// Top-left corner of the costume.
    pub fn position(&self) -> DVec2 {
        self.state().position
    }

    pub fn set_position(&self, x: f64, y: f64) {
        self.state().position = DVec2::new(x, y);
    }

    /// Orientation in degrees, within [0, 360).
    pub fn angle(&self) -> f64 {
        self.state().angle
    }

    /// Forward vector, scaled by the horizontal scale sign.
    pub fn direction(&self) -> DVec2 {
        self.state().vector
    }

    /// Horizontal scale; negative while the costume is mirrored.
    pub fn scale_x(&self) -> f64 {
        self.state().scale_x
    }

    pub fn visible(&self) -> bool {
        self.state().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.state().visible = visible;
    }

    pub fn costume(&self) -> Option<SurfaceHandle> {
        self.state().costume
    }

    /// Drawn rectangle: position plus costume size.
    pub fn rect(&self) -> Rect {
        self.state().rect()
    }

    //--- Drawing ----------------------------------------------------------

    /// Per-frame draw step.
    ///
    /// Clamps the position into the viewport, places the speech balloon
    /// over the character, then submits the costume and the balloon.
    pub fn draw(&self) {
        let renderer = &self.inner.env.renderer;
        let viewport = renderer.viewport();

        let (sprite, balloon) = {
            let mut state = self.state();
            state.clamp_to(viewport);
            let owner = state.rect();
            let balloon = state.balloon.as_mut().map(|balloon| {
                balloon.place(owner, viewport);
                balloon.sprite()
            });
            (state.sprite(), balloon)
        };

        if let Some(sprite) = sprite {
            renderer.draw_sprite(&sprite);
        }
        if let Some(balloon) = balloon {
            renderer.draw_sprite(&balloon);
        }
    }

    //--- Sound ------------------------------------------------------------

    /// Plays the sound asset `name`, loading it on first use.
    ///
    /// # Errors
    ///
    /// [`StageError::AssetNotFound`] when no such asset file exists, and
    /// [`StageError::AssetLoad`] when the audio backend rejects it.
    pub fn play(&self, name: &str) -> Result<()> {
        let env = &self.inner.env;
        let sound = {
            let mut sounds = lock(&self.inner.sounds);
            match sounds.get(name) {
                Some(sound) => *sound,
                None => {
                    let Some(path) = env.assets.resolve(name) else {
                        warn!(target: "stage", "Sound asset `{}` not found", name);
                        return Err(StageError::AssetNotFound {
                            name: name.to_string(),
                        });
                    };
                    let Some(sound) = env.audio.load_sound(&path) else {
                        return Err(StageError::AssetLoad { path });
                    };
                    sounds.insert(name.to_string(), sound);
                    sound
                }
            }
        };
        env.audio.play(sound);
        Ok(())
    }

    //--- Internal Helpers -------------------------------------------------

    fn state(&self) -> MutexGuard<'_, CharacterState> {
        lock(&self.inner.state)
    }

    fn env(&self) -> &Environment {
        &self.inner.env
    }
}

impl PartialEq for Character {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Character {}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id())
            .field("position", &self.position())
            .field("angle", &self.angle())
            .finish_non_exhaustive()
    }
}

fn load_costume(env: &Environment, name: &str) -> Result<SurfaceHandle> {
    let path = env
        .assets
        .resolve(name)
        .ok_or_else(|| StageError::AssetNotFound {
            name: name.to_string(),
        })?;
    match env.renderer.load_image(&path) {
        Some(surface) => Ok(surface),
        None => Err(StageError::AssetLoad { path }),
    }
}

//=========================================================================
// Test Support
//=========================================================================


//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::testing::fixture;
    use super::*;

    #[test]
    fn options_seed_initial_state() {
        let fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().at(10.0, 20.0).angle(-90.0).costume("car1.png"))
            .unwrap();

        assert_eq!(car.position(), DVec2::new(10.0, 20.0));
        assert_eq!(car.angle(), 270.0);
        assert!(car.visible());
        assert_eq!(car.rect(), Rect::new(10.0, 20.0, 32.0, 32.0));
    }

    #[test]
    fn missing_costume_is_a_recoverable_error() {
        let fx = fixture((640, 480), 32);
        let err = fx
            .stage
            .create_character(CharacterOptions::new().costume("nope.png"))
            .unwrap_err();

        assert!(matches!(err, StageError::AssetNotFound { ref name } if name == "nope.png"));
        assert!(fx.stage.world().is_empty());
    }

    #[test]
    fn draw_submits_visible_costume_only() {
        let fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().at(5.0, 6.0).costume("car1.png"))
            .unwrap();

        car.draw();
        let drawn = fx.renderer.take_drawn();
        assert_eq!(drawn.len(), 1);
        assert_eq!((drawn[0].x, drawn[0].y), (5.0, 6.0));

        car.set_visible(false);
        car.draw();
        assert!(fx.renderer.take_drawn().is_empty());
    }

    #[test]
    fn draw_clamps_into_viewport() {
        let fx = fixture((100, 100), 20);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().costume("car1.png"))
            .unwrap();

        car.set_position(-5.0, 95.0);
        car.draw();
        assert_eq!(car.position(), DVec2::new(0.0, 80.0));
    }

    #[test]
    fn sounds_are_loaded_once_per_character() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        car.play("beep.wav").unwrap();
        car.play("beep.wav").unwrap();

        assert_eq!(fx.audio.loaded().len(), 1);
        assert_eq!(fx.audio.played().len(), 2);
    }

    #[test]
    fn missing_sound_is_reported_not_fatal() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        let err = car.play("missing.wav").unwrap_err();
        assert!(matches!(err, StageError::AssetNotFound { .. }));
        assert!(fx.audio.played().is_empty());
    }
}

//=========================================================================
// Stage
//=========================================================================
//
// Owner of the live world, the shared caches and the collaborators.
//
// Architecture:
// ```text
//   StageBuilder ──build()──► Stage
//                               ├─ env: Arc<Environment>   shared by every character
//                               │    ├─ renderer / audio / hardware
//                               │    ├─ assets, resources (fonts, devices)
//                               │    ├─ failure hook, font size
//                               │    └─ started flag, pointer position
//                               ├─ world: World            live characters
//                               └─ retired                 removed, tasks still running
// ```
//
// Frame (`tick`):
//   1. publish the pointer position
//   2. resume tasks suspended at the previous frame boundary
//   3. draw (clamp, balloon placement, sprites)
//   4. dispatch key_down / key_push / click / hit / hardware events
//   5. liveness sweep (reaps tasks, escalates failures)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use super::backend::headless::{HeadlessAudio, HeadlessHardware, HeadlessRenderer};
use super::backend::{
    AssetLocator, AudioBackend, HardwareBackend, HardwareEvent, Renderer, Viewport,
};
use super::cache::Resources;
use super::character::{Character, CharacterId, CharacterOptions, OptionValue};
use super::error::Result;
use super::geometry::DVec2;
use super::lock;
use super::input::StateTracker;
use super::scheduler::{exit_on_failure, FailureHook, TaskFailure};
use super::world::World;

//=== Environment =========================================================

/// Collaborators and process-wide state shared by every character of a
/// stage.
pub(crate) struct Environment {
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) audio: Arc<dyn AudioBackend>,
    pub(crate) hardware: Arc<dyn HardwareBackend>,
    pub(crate) assets: AssetLocator,
    pub(crate) resources: Resources,
    pub(crate) failure_hook: FailureHook,
    pub(crate) font_size: u32,
    started: AtomicBool,
    pointer: RwLock<DVec2>,
    next_character: AtomicU64,
}

impl Environment {
    pub(crate) fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Sets the started flag, returning its previous value.
    fn mark_started(&self) -> bool {
        self.started.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn pointer(&self) -> DVec2 {
        *self.pointer.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_pointer(&self, position: DVec2) {
        *self.pointer.write().unwrap_or_else(PoisonError::into_inner) = position;
    }

    fn next_character_id(&self) -> CharacterId {
        CharacterId(self.next_character.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

//=== StageBuilder ========================================================

/// Builder for a [`Stage`].
///
/// # Default Values
///
/// - **Renderer / audio / hardware**: headless implementations
/// - **Asset root**: `assets`
/// - **Font size**: 16
/// - **Failure hook**: [`exit_on_failure`]
/// - **Viewport**: 640 × 480 (default renderer only)
///
/// # Examples
///
/// ```no_run
/// use stagehand::prelude::*;
///
/// let stage = StageBuilder::new()
///     .with_asset_root("demos/assets")
///     .with_font_size(20)
///     .build();
/// let car = stage
///     .create_character(CharacterOptions::new().costume("car1.png"))
///     .unwrap();
/// car.say("vroom");
/// ```
pub struct StageBuilder {
    renderer: Option<Arc<dyn Renderer>>,
    audio: Option<Arc<dyn AudioBackend>>,
    hardware: Option<Arc<dyn HardwareBackend>>,
    viewport: Viewport,
    asset_root: PathBuf,
    font_size: u32,
    failure_hook: Option<FailureHook>,
}

impl StageBuilder {
    pub fn new() -> Self {
        Self {
            renderer: None,
            audio: None,
            hardware: None,
            viewport: Viewport::default(),
            asset_root: AssetLocator::default().root().to_path_buf(),
            font_size: 16,
            failure_hook: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_audio(mut self, audio: Arc<dyn AudioBackend>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_hardware(mut self, hardware: Arc<dyn HardwareBackend>) -> Self {
        self.hardware = Some(hardware);
        self
    }

    /// Size of the default headless renderer. A renderer passed to
    /// [`with_renderer`](Self::with_renderer) reports its own viewport.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Viewport size must be positive");
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Directory that costume and sound names are resolved against.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Font size used by [`Character::say`].
    ///
    /// # Panics
    ///
    /// Panics if `size == 0`.
    pub fn with_font_size(mut self, size: u32) -> Self {
        assert!(size > 0, "Font size must be positive");
        self.font_size = size;
        self
    }

    /// Replaces the default fail-fast reaction to task failures.
    pub fn with_failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        self.failure_hook = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Stage {
        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(HeadlessRenderer::new(self.viewport)));
        let viewport = renderer.viewport();
        info!(
            target: "stage",
            "Building stage ({}x{}, assets: {})",
            viewport.width, viewport.height, self.asset_root.display()
        );

        let env = Environment {
            renderer,
            audio: self.audio.unwrap_or_else(|| Arc::new(HeadlessAudio::new())),
            hardware: self
                .hardware
                .unwrap_or_else(|| Arc::new(HeadlessHardware::new())),
            assets: AssetLocator::new(self.asset_root),
            resources: Resources::new(),
            failure_hook: self.failure_hook.unwrap_or_else(exit_on_failure),
            font_size: self.font_size,
            started: AtomicBool::new(false),
            pointer: RwLock::new(DVec2::ZERO),
            next_character: AtomicU64::new(0),
        };

        Stage {
            env: Arc::new(env),
            world: World::new(),
            retired: Mutex::new(Vec::new()),
            frame: 0,
        }
    }
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Stage ===============================================================

/// The simulation: every live character plus what they share.
pub struct Stage {
    env: Arc<Environment>,
    world: World,
    retired: Mutex<Vec<Character>>,
    frame: u64,
}

impl Stage {
    //--- Characters -------------------------------------------------------

    /// Creates a character and adds it to the world.
    ///
    /// # Errors
    ///
    /// [`StageError::AssetNotFound`](super::error::StageError::AssetNotFound)
    /// or [`StageError::AssetLoad`](super::error::StageError::AssetLoad) when
    /// the costume cannot be loaded.
    pub fn create_character(&self, options: CharacterOptions) -> Result<Character> {
        let id = self.env.next_character_id();
        Character::create(id, options, Arc::clone(&self.env), &self.world)
    }

    /// Creates a character from dynamic key/value options, as read from a
    /// level file or script.
    ///
    /// # Errors
    ///
    /// [`StageError::Config`](super::error::StageError::Config) when a key
    /// is unknown or a value has the wrong type (no character is created),
    /// otherwise the same errors as [`create_character`](Self::create_character).
    pub fn create_character_from_entries<I, K>(&self, entries: I) -> Result<Character>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: Into<String>,
    {
        let options = CharacterOptions::from_entries(entries)?;
        self.create_character(options)
    }

    /// Removes a character from the world.
    ///
    /// Other characters stop colliding with it from the next evaluation on,
    /// and it is no longer drawn or sent input. Tasks it already runs keep
    /// being resumed by `tick` until they finish or fail.
    pub fn remove_character(&self, character: &Character) -> bool {
        let removed = self.world.remove(character.id());
        if removed {
            lock(&self.retired).push(character.clone());
            debug!(
                target: "stage",
                "Removed character {} ({} task(s) left to finish)",
                character.id(), character.task_count()
            );
        }
        removed
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    //--- Accessors --------------------------------------------------------

    pub fn viewport(&self) -> Viewport {
        self.env.renderer.viewport()
    }

    pub fn resources(&self) -> &Resources {
        &self.env.resources
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_started(&self) -> bool {
        self.env.is_started()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Marks the simulation started and runs every `start` handler.
    ///
    /// Only the first call dispatches; `start` handlers registered later
    /// run as soon as they are registered.
    pub fn start(&self) {
        if self.env.mark_started() {
            return;
        }
        let characters = self.world.characters();
        info!(target: "stage", "Starting stage with {} character(s)", characters.len());
        for character in &characters {
            character.start();
        }
    }

    /// Runs one simulation frame against the current input snapshot.
    pub fn tick(&mut self, input: &StateTracker) {
        self.env.set_pointer(input.pointer());
        let characters = self.world.characters();

        let retired = self.retired();

        for character in characters.iter().chain(&retired) {
            character.resume_tasks();
        }

        for character in &characters {
            character.draw();
        }

        self.dispatch_input(&characters, input);
        self.dispatch_hardware(&characters);

        for character in &characters {
            character.is_alive();
        }
        self.sweep_retired();

        self.frame += 1;
        trace!(target: "stage", "Frame {} done ({} character(s))", self.frame, characters.len());
    }

    /// Liveness sweep over every character. True while any task runs.
    pub fn is_alive(&self) -> bool {
        let live = self
            .world
            .characters()
            .iter()
            .fold(false, |alive, character| character.is_alive() || alive);
        self.sweep_retired() || live
    }

    /// Drives every character's tasks to completion, removed characters
    /// included.
    pub fn join_all(&self) {
        for character in self.world.characters().iter().chain(&self.retired()) {
            character.join_all();
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn retired(&self) -> Vec<Character> {
        lock(&self.retired).clone()
    }

    /// Liveness sweep over removed characters; forgets the ones whose
    /// tasks have all terminated.
    fn sweep_retired(&self) -> bool {
        let retired = self.retired();
        let alive: Vec<bool> = retired.iter().map(Character::is_alive).collect();
        lock(&self.retired).retain(|character| character.task_count() > 0);
        alive.contains(&true)
    }

    fn dispatch_input(&self, characters: &[Character], input: &StateTracker) {
        let held = input.keys_down();
        let pushed = input.keys_pushed();
        let buttons = input.buttons_pushed();
        let pointer = input.pointer();

        for character in characters {
            if !held.is_empty() {
                character.key_down(&held);
            }
            if !pushed.is_empty() {
                character.key_push(&pushed);
            }
            if !buttons.is_empty() && character.rect().contains(pointer) {
                character.click(&buttons);
            }
            character.hit();
        }
    }

    fn dispatch_hardware(&self, characters: &[Character]) {
        for event in self.env.hardware.poll_events() {
            trace!(target: "stage", "Hardware event {:?}", event);
            for character in characters {
                match &event {
                    HardwareEvent::SensorChange { pin, value } => {
                        character.sensor_change(pin, *value)
                    }
                    HardwareEvent::ButtonUp { pin } => character.button_up(pin),
                    HardwareEvent::ButtonDown { pin } => character.button_down(pin),
                }
            }
        }
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        let characters = self.world.characters();
        for character in characters.iter().chain(lock(&self.retired).iter()) {
            character.shutdown();
        }
        debug!(target: "stage", "Stage dropped after {} frame(s)", self.frame);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::Pin;
    use crate::core::character::testing::{fixture, fixture_with};
    use crate::core::error::{ConfigError, StageError};
    use crate::core::events::{EventArgs, Trigger};
    use crate::core::input::{InputEvent, KeyCode, MouseButton};
    use crate::core::scheduler::TaskContext;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(
        log: &Log,
        entry: &'static str,
    ) -> impl Fn(&TaskContext, &EventArgs) -> anyhow::Result<()> + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |_, _| {
            log.lock().unwrap().push(entry.to_string());
            Ok(())
        }
    }

    //=====================================================================
    // StageBuilder Tests
    //=====================================================================

    #[test]
    fn builder_viewport_sizes_the_default_renderer() {
        let stage = StageBuilder::new().with_viewport(800, 600).build();
        assert_eq!(stage.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn supplied_renderer_keeps_its_own_viewport() {
        let renderer = Arc::new(HeadlessRenderer::new(Viewport::new(320, 240)));
        let stage = StageBuilder::new()
            .with_viewport(800, 600)
            .with_renderer(renderer)
            .build();
        assert_eq!(stage.viewport(), Viewport::new(320, 240));
    }

    #[test]
    #[should_panic(expected = "Viewport size must be positive")]
    fn builder_with_viewport_panics_on_zero() {
        StageBuilder::new().with_viewport(640, 0);
    }

    #[test]
    fn builder_defaults_to_headless_collaborators() {
        let stage = StageBuilder::new().build();
        assert_eq!(stage.viewport(), Viewport::new(640, 480));
        assert_eq!(stage.frame(), 0);
        assert!(!stage.is_started());
        assert!(stage.world().is_empty());
    }

    #[test]
    #[should_panic(expected = "Font size must be positive")]
    fn builder_rejects_zero_font_size() {
        StageBuilder::new().with_font_size(0);
    }

    #[test]
    fn font_size_applies_to_say() {
        let fx = fixture_with((640, 480), 32, StageBuilder::new().with_font_size(20));
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        car.say("hi");
        assert_eq!(car.balloon().unwrap().height(), 21 + 12);
    }

    #[test]
    fn character_ids_are_unique() {
        let stage = StageBuilder::new().build();
        let a = stage.create_character(CharacterOptions::new()).unwrap();
        let b = stage.create_character(CharacterOptions::new()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(stage.world().len(), 2);
    }

    //=====================================================================
    // Lifecycle Tests
    //=====================================================================

    #[test]
    fn start_dispatches_once() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();
        let log: Log = Arc::default();
        car.on(Trigger::Start, recorder(&log, "start"));

        fx.stage.start();
        fx.stage.start();

        assert!(fx.stage.is_started());
        assert_eq!(*log.lock().unwrap(), vec!["start"]);
    }

    #[test]
    fn stage_liveness_tracks_every_character() {
        let fx = fixture((640, 480), 32);
        let a = fx.stage.create_character(CharacterOptions::new()).unwrap();
        let b = fx.stage.create_character(CharacterOptions::new()).unwrap();

        a.on(Trigger::Start, |ctx, _| ctx.repeat(1, |_| Ok(())));
        b.on(Trigger::Start, |ctx, _| ctx.repeat(3, |_| Ok(())));
        fx.stage.start();
        assert!(fx.stage.is_alive());

        fx.stage.join_all();
        assert!(!fx.stage.is_alive());
        assert_eq!(a.task_count() + b.task_count(), 0);
    }

    #[test]
    fn characters_can_be_created_from_entries() {
        let fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character_from_entries([
                ("x", OptionValue::Number(10.0)),
                ("y", OptionValue::Number(20.0)),
                ("costume", OptionValue::Text("car1.png".to_string())),
            ])
            .unwrap();

        assert_eq!(car.rect(), crate::core::geometry::Rect::new(10.0, 20.0, 32.0, 32.0));
        assert!(fx.stage.world().contains(car.id()));
    }

    #[test]
    fn rejected_entries_surface_as_config_errors() {
        let fx = fixture((640, 480), 32);
        let err = fx
            .stage
            .create_character_from_entries([
                ("speed", OptionValue::Number(3.0)),
                ("colour", OptionValue::Text("red".to_string())),
            ])
            .unwrap_err();

        assert!(matches!(
            err,
            StageError::Config(ConfigError::UnknownOptions { ref keys })
                if keys == &["colour".to_string(), "speed".to_string()]
        ));
        assert!(fx.stage.world().is_empty());

        let err = fx
            .stage
            .create_character_from_entries([("visible", OptionValue::Number(1.0))])
            .unwrap_err();
        assert!(matches!(err, StageError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn removed_character_finishes_its_tasks() {
        let mut fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        car.on(Trigger::Start, move |ctx, _| {
            ctx.repeat(3, |car| {
                car.move_by(1.0);
                Ok(())
            })?;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        fx.stage.start();

        assert!(fx.stage.remove_character(&car));
        assert!(!fx.stage.remove_character(&car));
        assert!(!fx.stage.world().contains(car.id()));
        assert_eq!(car.task_count(), 1);
        assert!(fx.stage.is_alive());

        let input = StateTracker::new();
        for _ in 0..5 {
            fx.stage.tick(&input);
        }

        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(car.x(), 3.0);
        assert_eq!(car.task_count(), 0);
        assert!(!fx.stage.is_alive());
    }

    #[test]
    fn removed_character_can_be_joined() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();
        car.on(Trigger::Start, |ctx, _| {
            ctx.repeat(4, |car| {
                car.move_by(1.0);
                Ok(())
            })
        });
        fx.stage.start();
        fx.stage.remove_character(&car);

        fx.stage.join_all();
        assert_eq!(car.x(), 4.0);
        assert!(!fx.stage.is_alive());
    }

    #[test]
    fn removed_character_is_not_drawn() {
        let mut fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().costume("car1.png"))
            .unwrap();
        fx.stage.remove_character(&car);

        fx.stage.tick(&StateTracker::new());
        assert!(fx.renderer.take_drawn().is_empty());
    }

    #[test]
    fn dropping_the_stage_unwinds_removed_characters() {
        let stage = StageBuilder::new().build();
        let car = stage.create_character(CharacterOptions::new()).unwrap();
        car.on(Trigger::Start, |ctx, _| ctx.forever(|_| Ok(())));
        stage.start();
        stage.remove_character(&car);
        assert_eq!(car.task_count(), 1);

        drop(stage);
        assert_eq!(car.task_count(), 0);
    }

    #[test]
    fn dropping_the_stage_unwinds_suspended_tasks() {
        let stage = StageBuilder::new().build();
        let car = stage.create_character(CharacterOptions::new()).unwrap();
        car.on(Trigger::Start, |ctx, _| ctx.forever(|_| Ok(())));
        stage.start();
        assert_eq!(car.task_count(), 1);

        drop(stage);
        assert_eq!(car.task_count(), 0);
    }

    //=====================================================================
    // Tick Tests
    //=====================================================================

    #[test]
    fn tick_resumes_draws_and_sweeps() {
        let mut fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().costume("car1.png"))
            .unwrap();
        car.on(Trigger::Start, |ctx, _| {
            ctx.repeat(2, |car| {
                car.move_by(10.0);
                Ok(())
            })
        });
        fx.stage.start();
        assert_eq!(car.x(), 10.0);

        let input = StateTracker::new();
        fx.stage.tick(&input);
        assert_eq!(car.x(), 20.0);
        assert_eq!(fx.renderer.take_drawn().len(), 1);
        assert_eq!(car.task_count(), 1);

        fx.stage.tick(&input);
        assert_eq!(car.task_count(), 0);
        assert_eq!(fx.stage.frame(), 2);
    }

    #[test]
    fn tick_dispatches_keys() {
        let mut fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();
        let log: Log = Arc::default();
        car.on(Trigger::KeyDown(vec![KeyCode::ArrowLeft]), recorder(&log, "down"));
        car.on(Trigger::KeyPush(vec![KeyCode::ArrowLeft]), recorder(&log, "push"));

        let mut input = StateTracker::new();
        input.process_events(&[InputEvent::KeyDown(KeyCode::ArrowLeft)]);
        fx.stage.tick(&input);
        assert_eq!(*log.lock().unwrap(), vec!["down", "push"]);

        input.clear();
        fx.stage.tick(&input);
        assert_eq!(*log.lock().unwrap(), vec!["down", "push", "down"]);

        input.clear();
        input.process_events(&[InputEvent::KeyUp(KeyCode::ArrowLeft)]);
        fx.stage.tick(&input);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn tick_clicks_only_the_character_under_the_pointer() {
        let mut fx = fixture((640, 480), 32);
        let under = fx
            .stage
            .create_character(CharacterOptions::new().at(100.0, 100.0).costume("car1.png"))
            .unwrap();
        let elsewhere = fx
            .stage
            .create_character(CharacterOptions::new().at(300.0, 300.0).costume("car1.png"))
            .unwrap();
        let log: Log = Arc::default();
        under.on(Trigger::Click(vec![]), recorder(&log, "under"));
        elsewhere.on(Trigger::Click(vec![]), recorder(&log, "elsewhere"));

        let mut input = StateTracker::new();
        input.process_events(&[
            InputEvent::MouseMoved { x: 110.0, y: 120.0 },
            InputEvent::MouseButtonDown(MouseButton::Left),
        ]);
        fx.stage.tick(&input);

        assert_eq!(*log.lock().unwrap(), vec!["under"]);
    }

    #[test]
    fn tick_dispatches_hits() {
        let mut fx = fixture((640, 480), 20);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().costume("car1.png"))
            .unwrap();
        let _rock = fx
            .stage
            .create_character(CharacterOptions::new().at(5.0, 5.0).costume("car1.png"))
            .unwrap();
        let log: Log = Arc::default();
        car.on(Trigger::Hit(vec![]), recorder(&log, "hit"));

        fx.stage.tick(&StateTracker::new());
        assert_eq!(*log.lock().unwrap(), vec!["hit"]);
    }

    #[test]
    fn tick_forwards_hardware_events() {
        let mut fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();
        let log: Log = Arc::default();
        car.on(Trigger::SensorChange(vec![Pin::from("A0")]), recorder(&log, "sensor"));
        car.on(Trigger::ButtonUp(vec![]), recorder(&log, "up"));
        car.on(Trigger::ButtonDown(vec![]), recorder(&log, "down"));

        fx.hardware.push_event(HardwareEvent::SensorChange { pin: Pin::from("A0"), value: 3 });
        fx.hardware.push_event(HardwareEvent::ButtonDown { pin: Pin::from("D2") });
        fx.hardware.push_event(HardwareEvent::ButtonUp { pin: Pin::from("D2") });
        fx.stage.tick(&StateTracker::new());

        assert_eq!(*log.lock().unwrap(), vec!["sensor", "down", "up"]);
    }
}

//=========================================================================
// Dispatch
//=========================================================================
//
// Handler registration, per-event dispatch and task lifecycle.
//
// Dispatch flow:
// ```text
//   key_down(keys) ─┐
//   click(buttons) ─┤   snapshot handlers     filter      spawn task
//   hit()          ─┼──► for kind ──────────► match ────► (runs to first
//   sensor_change  ─┤   (registry unlocked)               yield) → TaskList
//   ...            ─┘
// ```
//
// Lifecycle:
// - `resume_tasks`: once per frame, hands the baton to each suspended task
// - `is_alive`: reaps terminal tasks, reports failures through the hook
// - `join_all`: drives tracked tasks until none is left running
//
//=========================================================================

//=== External Dependencies ===============================================

use std::slice;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::Character;
use crate::core::backend::{DeviceKind, Pin};
use crate::core::events::{
    filter_matches, select_hit_targets, EventArgs, EventHandler, EventKind, HitTarget, Trigger,
};
use crate::core::input::{KeyCode, MouseButton};
use crate::core::lock;
use crate::core::scheduler::{self, TaskContext, TaskFailure, TaskId, TaskState};

//=== Registration ========================================================

impl Character {
    /// Registers `body` to run whenever `trigger` fires.
    ///
    /// - `Trigger::Hit` targets join the collision interests; an empty
    ///   target list means any other character.
    /// - Hardware triggers create their devices (once per pin).
    /// - A `Trigger::Start` registered after the stage started runs
    ///   immediately.
    pub fn on<F>(&self, trigger: Trigger, body: F)
    where
        F: Fn(&TaskContext, &EventArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let env = self.env();

        match &trigger {
            Trigger::Hit(targets) if targets.is_empty() => {
                self.register_hit_interest([HitTarget::Any]);
            }
            Trigger::Hit(targets) => self.register_hit_interest(targets.iter().copied()),
            Trigger::SensorChange(pins) => {
                for pin in pins {
                    env.resources.device(env.hardware.as_ref(), DeviceKind::Sensor, pin);
                }
            }
            Trigger::ButtonUp(pins) | Trigger::ButtonDown(pins) => {
                for pin in pins {
                    env.resources.device(env.hardware.as_ref(), DeviceKind::Button, pin);
                }
            }
            _ => {}
        }

        let late_start = trigger.kind() == EventKind::Start && env.is_started();
        let handler = lock(&self.inner.handlers).register(EventHandler::new(
            self.id(),
            trigger,
            Arc::new(body),
        ));
        debug!(
            target: "events",
            "Character {} registered `{}` handler", self.id(), handler.kind()
        );

        if late_start {
            self.spawn(&handler, EventArgs::None);
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        lock(&self.inner.handlers).count(kind)
    }
}

//=== Dispatch ============================================================

impl Character {
    /// Runs every `start` handler.
    pub fn start(&self) {
        self.dispatch(EventKind::Start, |_| Some(EventArgs::None));
    }

    /// Runs `key_down` handlers whose keys intersect the held `keys`.
    pub fn key_down(&self, keys: &[KeyCode]) {
        self.dispatch(EventKind::KeyDown, |trigger| match trigger {
            Trigger::KeyDown(filter) if filter_matches(filter, keys) => Some(EventArgs::None),
            _ => None,
        });
    }

    /// Runs `key_push` handlers whose keys intersect the pushed `keys`.
    pub fn key_push(&self, keys: &[KeyCode]) {
        self.dispatch(EventKind::KeyPush, |trigger| match trigger {
            Trigger::KeyPush(filter) if filter_matches(filter, keys) => Some(EventArgs::None),
            _ => None,
        });
    }

    /// Runs `click` handlers whose buttons intersect `buttons`, passing the
    /// pointer position.
    pub fn click(&self, buttons: &[MouseButton]) {
        let pointer = self.env().pointer();
        self.dispatch(EventKind::Click, |trigger| match trigger {
            Trigger::Click(filter) if filter_matches(filter, buttons) => {
                Some(EventArgs::Click { x: pointer.x, y: pointer.y })
            }
            _ => None,
        });
    }

    /// Runs `hit` handlers with the overlapping characters each one asked
    /// for.
    pub fn hit(&self) {
        if self.handler_count(EventKind::Hit) == 0 {
            return;
        }
        let colliding = self.colliding();
        if colliding.is_empty() {
            return;
        }
        self.dispatch(EventKind::Hit, |trigger| match trigger {
            Trigger::Hit(filter) => {
                let matched = select_hit_targets(filter, &colliding);
                (!matched.is_empty()).then_some(EventArgs::Hit(matched))
            }
            _ => None,
        });
    }

    pub fn sensor_change(&self, pin: &Pin, value: i32) {
        self.dispatch(EventKind::SensorChange, |trigger| match trigger {
            Trigger::SensorChange(filter) if filter_matches(filter, slice::from_ref(pin)) => {
                Some(EventArgs::Sensor {
                    pin: pin.clone(),
                    value,
                })
            }
            _ => None,
        });
    }

    pub fn button_up(&self, pin: &Pin) {
        self.dispatch(EventKind::ButtonUp, |trigger| match trigger {
            Trigger::ButtonUp(filter) if filter_matches(filter, slice::from_ref(pin)) => {
                Some(EventArgs::Button(pin.clone()))
            }
            _ => None,
        });
    }

    pub fn button_down(&self, pin: &Pin) {
        self.dispatch(EventKind::ButtonDown, |trigger| match trigger {
            Trigger::ButtonDown(filter) if filter_matches(filter, slice::from_ref(pin)) => {
                Some(EventArgs::Button(pin.clone()))
            }
            _ => None,
        });
    }

    /// Spawns a task for every handler of `kind` that `select` accepts, in
    /// registration order.
    fn dispatch<F>(&self, kind: EventKind, mut select: F)
    where
        F: FnMut(&Trigger) -> Option<EventArgs>,
    {
        let handlers = lock(&self.inner.handlers).handlers(kind);
        for handler in handlers {
            if let Some(args) = select(handler.trigger()) {
                self.spawn(&handler, args);
            }
        }
    }

    fn spawn(&self, handler: &EventHandler, args: EventArgs) {
        let id = TaskId(self.inner.next_task.fetch_add(1, Ordering::Relaxed) + 1);
        let task = scheduler::spawn(self, id, handler.kind(), handler.body(), args);
        lock(&self.inner.tasks).push(task);
    }
}

//=== Task Lifecycle ======================================================

impl Character {
    /// Resumes every task suspended at the previous frame boundary.
    ///
    /// Tasks spawned while resuming are kept after the existing ones and
    /// first resumed on the next call.
    pub fn resume_tasks(&self) {
        let mut current = std::mem::take(&mut *lock(&self.inner.tasks));
        current.resume_all();

        let mut tasks = lock(&self.inner.tasks);
        let spawned = std::mem::take(&mut *tasks);
        current.append(spawned);
        *tasks = current;
    }

    /// Liveness sweep.
    ///
    /// Removes every terminal task, reports each failed one through the
    /// stage's failure hook, and returns whether any task is still running.
    pub fn is_alive(&self) -> bool {
        let (finished, alive) = {
            let mut tasks = lock(&self.inner.tasks);
            let finished = tasks.reap();
            (finished, !tasks.is_empty())
        };

        for mut task in finished {
            task.join_thread();
            if task.state() != TaskState::Failed {
                continue;
            }
            let failure = TaskFailure {
                character: self.id(),
                task: task.id(),
                event: task.event(),
                message: task.failure().unwrap_or("unknown failure").to_string(),
            };
            debug!(target: "scheduler", "Escalating failure of task {}", task.id());
            (self.env().failure_hook)(&failure);
        }

        alive
    }

    /// Blocks until every tracked task has terminated, resuming them
    /// frame by frame. Failures stay queued for the next `is_alive`.
    pub fn join_all(&self) {
        while lock(&self.inner.tasks).has_pending() {
            self.resume_tasks();
        }
    }

    /// Number of tracked tasks, terminal ones included until reaped.
    pub fn task_count(&self) -> usize {
        lock(&self.inner.tasks).len()
    }

    /// Cancels every tracked task and waits for the threads to exit.
    pub(crate) fn shutdown(&self) {
        let mut tasks = lock(&self.inner.tasks).drain();
        for task in &mut tasks {
            task.cancel();
        }
        for task in &mut tasks {
            task.join_thread();
        }
        if !tasks.is_empty() {
            debug!(
                target: "scheduler",
                "Character {} shut down {} task(s)", self.id(), tasks.len()
            );
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Scheduler
//=========================================================================
//
// Cooperative execution of handler bodies.
//
// Architecture:
// ```text
//   scheduler side (frame loop / dispatch)        task thread
//   ──────────────────────────────────────        ───────────
//   spawn() ── thread::spawn ───────────────────► body runs
//      │ blocks on signals                        ...
//      │ ◄──────────────── Signal::Yielded ────── TaskContext::yield_frame
//   resume() ──────────── () ─────────────────►   (blocked on resume)
//      │ blocks on signals                        body continues
//      │ ◄──────── Signal::Completed / Failed ─── body returns
// ```
//
// Each task owns a thread, but exactly one thread runs at a time: the
// scheduler side waits on the task's signal channel after every spawn and
// resume, and a task waits on its resume channel after every yield. The
// only suspension point is `TaskContext::forever` / `repeat`.
//
// Failures are recorded on the `Task` and surfaced by the liveness sweep
// (`Character::is_alive`) through the stage's `FailureHook`, exactly once.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error};

//=== Module Declarations =================================================

mod task;

//=== Internal Dependencies ===============================================

use super::character::{Character, CharacterId};
use super::events::{EventArgs, EventKind, HandlerFn};

//=== Public API ==========================================================

pub use task::{Task, TaskId, TaskList, TaskState};

//=== Signal ==============================================================

/// Task → scheduler notification at a synchronization point.
#[derive(Debug)]
pub(crate) enum Signal {
    Yielded,
    Completed,
    Failed(String),
}

/// Unwind payload used to leave a handler body whose scheduler is gone.
struct Cancelled;

//=== TaskFailure =========================================================

/// Diagnostic of a task whose body returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub character: CharacterId,
    pub task: TaskId,
    pub event: EventKind,
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` handler task {} of character {} failed: {}",
            self.event, self.task, self.character, self.message
        )
    }
}

/// Called once per failed task observed by a liveness sweep.
pub type FailureHook = Arc<dyn Fn(&TaskFailure) + Send + Sync>;

/// Default hook: report the failure and terminate the process.
pub fn exit_on_failure() -> FailureHook {
    Arc::new(|failure: &TaskFailure| {
        error!(target: "scheduler", "{}", failure);
        eprintln!("{failure}");
        process::exit(1);
    })
}

//=== TaskContext =========================================================

/// Handle given to a running handler body.
///
/// Besides the owning character it carries the task's end of the baton
/// channels; `forever` and `repeat` are the only places a body gives the
/// baton back to the scheduler.
pub struct TaskContext {
    character: Character,
    task: TaskId,
    event: EventKind,
    resume: Receiver<()>,
    signals: Sender<Signal>,
}

impl TaskContext {
    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn task_id(&self) -> TaskId {
        self.task
    }

    pub fn event(&self) -> EventKind {
        self.event
    }

    /// Runs `body` once per frame until it returns an error.
    ///
    /// ```no_run
    /// # use stagehand::prelude::*;
    /// # fn demo(car: &Character) {
    /// car.on(Trigger::Start, |ctx, _| {
    ///     ctx.forever(|car| {
    ///         car.move_by(5.0);
    ///         car.turn_if_reach_wall();
    ///         Ok(())
    ///     })
    /// });
    /// # }
    /// ```
    pub fn forever<F>(&self, mut body: F) -> anyhow::Result<()>
    where
        F: FnMut(&Character) -> anyhow::Result<()>,
    {
        loop {
            body(&self.character)?;
            self.yield_frame();
        }
    }

    /// Runs `body` once per frame, `times` times.
    pub fn repeat<F>(&self, times: usize, mut body: F) -> anyhow::Result<()>
    where
        F: FnMut(&Character) -> anyhow::Result<()>,
    {
        for _ in 0..times {
            body(&self.character)?;
            self.yield_frame();
        }
        Ok(())
    }

    fn yield_frame(&self) {
        let resumed = self.signals.send(Signal::Yielded).is_ok() && self.resume.recv().is_ok();
        if !resumed {
            panic::resume_unwind(Box::new(Cancelled));
        }
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("character", &self.character.id())
            .field("task", &self.task)
            .field("event", &self.event)
            .finish()
    }
}

//=== Spawning ============================================================

/// Starts `body` on its own thread and runs it up to its first
/// synchronization point (or to completion).
///
/// The caller must not hold any of the character's locks.
pub(crate) fn spawn(
    character: &Character,
    id: TaskId,
    event: EventKind,
    body: Arc<HandlerFn>,
    args: EventArgs,
) -> Task {
    let (resume_tx, resume_rx) = bounded(1);
    let (signal_tx, signal_rx) = bounded(1);

    let context = TaskContext {
        character: character.clone(),
        task: id,
        event,
        resume: resume_rx,
        signals: signal_tx,
    };

    let name = format!("character-{}-task-{}", character.id().0, id.0);
    let spawned = thread::Builder::new()
        .name(name)
        .spawn(move || run_task(context, body, args));

    match spawned {
        Ok(handle) => {
            let mut task = Task::new(id, event, resume_tx, signal_rx, handle);
            task.await_signal();
            debug!(
                target: "scheduler",
                "Spawned `{}` task {} for character {} ({:?})",
                event, id, character.id(), task.state()
            );
            task
        }
        Err(err) => {
            error!(target: "scheduler", "Could not start task thread: {}", err);
            Task::failed_to_start(id, event, format!("failed to start task thread: {err}"))
        }
    }
}

fn run_task(context: TaskContext, body: Arc<HandlerFn>, args: EventArgs) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&context, &args)));

    let signal = match outcome {
        Ok(Ok(())) => Signal::Completed,
        Ok(Err(err)) => Signal::Failed(format!("{err:#}")),
        Err(payload) if payload.is::<Cancelled>() => return,
        Err(payload) => Signal::Failed(panic_message(payload.as_ref())),
    };

    // Nobody is listening once the stage has shut the task down.
    let _ = context.signals.send(signal);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::character::CharacterOptions;
    use crate::core::events::Trigger;
    use crate::core::stage::StageBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    //=====================================================================
    // Diagnostics
    //=====================================================================

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        assert_eq!(panic_message(&"boom"), "panicked: boom");
        assert_eq!(panic_message(&"bang".to_string()), "panicked: bang");
        assert_eq!(panic_message(&42u8), "panicked");
    }

    #[test]
    fn failure_display_names_task_and_event() {
        let failure = TaskFailure {
            character: CharacterId(3),
            task: TaskId(1),
            event: EventKind::KeyPush,
            message: "oops".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "`key_push` handler task #1 of character 3 failed: oops"
        );
    }

    //=====================================================================
    // Baton Protocol
    //=====================================================================

    #[test]
    fn body_runs_until_first_yield_then_once_per_resume() {
        let stage = StageBuilder::new().build();
        let car = stage.create_character(CharacterOptions::new()).unwrap();
        let steps = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&steps);
        car.on(Trigger::Start, move |ctx, _| {
            ctx.repeat(3, |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });
        car.start();

        assert_eq!(steps.load(Ordering::SeqCst), 1);
        assert_eq!(car.task_count(), 1);

        car.resume_tasks();
        assert_eq!(steps.load(Ordering::SeqCst), 2);

        car.resume_tasks();
        car.resume_tasks();
        assert_eq!(steps.load(Ordering::SeqCst), 3);
        assert!(!car.is_alive());
    }

    #[test]
    fn statements_between_yields_are_not_interleaved() {
        let stage = StageBuilder::new().build();
        let car = stage.create_character(CharacterOptions::new()).unwrap();
        let trace = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b"] {
            let trace = Arc::clone(&trace);
            car.on(Trigger::Start, move |ctx, _| {
                ctx.repeat(2, |_| {
                    trace.lock().unwrap().push(format!("{name}1"));
                    trace.lock().unwrap().push(format!("{name}2"));
                    Ok(())
                })
            });
        }
        car.start();
        car.resume_tasks();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["a1", "a2", "b1", "b2", "a1", "a2", "b1", "b2"]
        );
    }

    #[test]
    fn forever_stops_at_first_error() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);
        let stage = StageBuilder::new()
            .with_failure_hook(move |failure: &TaskFailure| sink.lock().unwrap().push(failure.clone()))
            .build();
        let car = stage.create_character(CharacterOptions::new()).unwrap();

        car.on(Trigger::Start, |ctx, _| {
            let mut frames = 0;
            ctx.forever(|_| {
                frames += 1;
                anyhow::ensure!(frames < 3, "gave up after {frames} frames");
                Ok(())
            })
        });
        car.start();
        car.resume_tasks();
        car.resume_tasks();

        assert!(!car.is_alive());
        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "gave up after 3 frames");
    }
}

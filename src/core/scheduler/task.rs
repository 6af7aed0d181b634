//=========================================================================
// Task
//=========================================================================
//
// Scheduler-side record of one in-flight handler execution.
//
// State machine:
// ```text
//   Spawned ──first signal──► Running ⇄ (resume / Yielded)
//      │                        │
//      └────────────┬───────────┘
//                   ▼
//          Completed | Failed        (terminal)
// ```
//
// A task only changes state while the scheduler waits on its signal
// channel, so every transition is observed by the thread that owns the
// `TaskList`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::warn;

//=== Internal Dependencies ===============================================

use super::Signal;
use crate::core::events::EventKind;

//=== TaskId ==============================================================

/// Per-character task sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== TaskState ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Thread started, first signal not yet received.
    Spawned,
    /// Suspended at a synchronization point, waiting to be resumed.
    Running,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

//=== Task ================================================================

#[derive(Debug)]
pub struct Task {
    id: TaskId,
    event: EventKind,
    state: TaskState,
    failure: Option<String>,
    resume: Option<Sender<()>>,
    signals: Option<Receiver<Signal>>,
    thread: Option<JoinHandle<()>>,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        event: EventKind,
        resume: Sender<()>,
        signals: Receiver<Signal>,
        thread: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            event,
            state: TaskState::Spawned,
            failure: None,
            resume: Some(resume),
            signals: Some(signals),
            thread: Some(thread),
        }
    }

    /// Task whose thread could not be created.
    pub(crate) fn failed_to_start(id: TaskId, event: EventKind, message: String) -> Self {
        Self {
            id,
            event,
            state: TaskState::Failed,
            failure: Some(message),
            resume: None,
            signals: None,
            thread: None,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn event(&self) -> EventKind {
        self.event
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Diagnostic of a failed task.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    //--- Baton Protocol ---------------------------------------------------

    /// Blocks until the task reaches its next synchronization point or
    /// terminates.
    pub(crate) fn await_signal(&mut self) {
        let Some(signals) = &self.signals else {
            return;
        };
        match signals.recv() {
            Ok(Signal::Yielded) => self.state = TaskState::Running,
            Ok(Signal::Completed) => self.finish(TaskState::Completed, None),
            Ok(Signal::Failed(message)) => self.finish(TaskState::Failed, Some(message)),
            Err(_) => self.finish(
                TaskState::Failed,
                Some("task thread exited without reporting".to_string()),
            ),
        }
    }

    /// Hands the baton to a suspended task and waits for it to come back.
    pub(crate) fn resume(&mut self) {
        if self.is_terminal() {
            return;
        }
        let delivered = self
            .resume
            .as_ref()
            .is_some_and(|resume| resume.send(()).is_ok());
        if !delivered {
            self.finish(TaskState::Failed, Some("task thread is gone".to_string()));
            return;
        }
        self.await_signal();
    }

    /// Closes both channels. A suspended thread unwinds out of its
    /// synchronization point and exits.
    pub(crate) fn cancel(&mut self) {
        self.resume = None;
        self.signals = None;
    }

    pub(crate) fn join_thread(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!(target: "scheduler", "Task {} thread panicked outside its handler", self.id);
        }
    }

    fn finish(&mut self, state: TaskState, failure: Option<String>) {
        self.state = state;
        self.failure = failure;
        self.resume = None;
        self.signals = None;
    }
}

//=== TaskList ============================================================

/// Tasks tracked by one character, in spawn order.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// True while any tracked task has not reached a terminal state.
    pub fn has_pending(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_terminal())
    }

    /// Appends `later` after the tasks already in this list.
    pub(crate) fn append(&mut self, mut later: TaskList) {
        self.tasks.append(&mut later.tasks);
    }

    pub(crate) fn resume_all(&mut self) {
        for task in &mut self.tasks {
            task.resume();
        }
    }

    /// Removes and returns every terminal task.
    pub(crate) fn reap(&mut self) -> Vec<Task> {
        let (finished, pending): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(Task::is_terminal);
        self.tasks = pending;
        finished
    }

    pub(crate) fn drain(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

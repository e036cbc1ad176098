//=========================================================================
// Cooperative Scheduler
//=========================================================================
//
// Runs step-function tasks to completion on a single thread.
//
// Architecture:
//   Dispatcher ──send──> crossbeam channel ──intake (bounded)──> running
//                                                                   ↓
//   tick() ────────────────────────────── Task::poll() once per task
//
// A task suspends by returning `TaskPoll::Pending` and resumes on the
// next tick. Tasks dispatched during a tick are admitted on the next
// one, so a task never observes work queued after it started polling.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, warn};

//=== Task Trait ==========================================================

/// Outcome of polling a task once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPoll {
    /// Suspended; poll again next tick.
    Pending,

    /// Finished; the scheduler drops the task.
    Complete,
}

/// A resumable unit of cooperative work.
pub trait Task {
    /// Short label used in log output.
    fn name(&self) -> &str;

    /// Runs until the next suspension point or completion.
    fn poll(&mut self) -> TaskPoll;
}

//=== SchedulerError ======================================================

/// Scheduler failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler that owns the channel has been dropped.
    #[error("scheduler is gone, task '{task}' was dropped")]
    Disconnected { task: String },

    /// `run_until_idle` hit its tick limit with work still pending.
    #[error("scheduler still busy after {ticks} ticks ({active} tasks active)")]
    Stalled { ticks: u64, active: usize },
}

//=== Dispatcher ==========================================================

/// Fire-and-forget handle for submitting tasks to a [`Scheduler`].
#[derive(Clone)]
pub struct Dispatcher {
    sender: Sender<Box<dyn Task>>,
}

impl Dispatcher {
    /// Queues a task. It starts on the scheduler's next tick.
    pub fn dispatch(&self, task: Box<dyn Task>) -> Result<(), SchedulerError> {
        let name = task.name().to_string();
        self.sender
            .send(task)
            .map_err(|_| SchedulerError::Disconnected { task: name })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("queued", &self.sender.len())
            .finish()
    }
}

//=== Scheduler ===========================================================

/// Default number of newly dispatched tasks admitted per tick.
pub const DEFAULT_INTAKE_LIMIT: usize = 64;

/// Single-threaded cooperative scheduler.
pub struct Scheduler {
    sender: Sender<Box<dyn Task>>,
    receiver: Receiver<Box<dyn Task>>,
    running: Vec<Box<dyn Task>>,
    intake_limit: usize,
    ticks: u64,
}

impl Scheduler {
    //--- Construction -----------------------------------------------------

    /// Creates a scheduler with the default intake limit.
    pub fn new() -> Self {
        Self::with_intake_limit(DEFAULT_INTAKE_LIMIT)
    }

    /// Creates a scheduler admitting at most `limit` new tasks per tick.
    ///
    /// # Panics
    ///
    /// Panics if `limit == 0`.
    pub fn with_intake_limit(limit: usize) -> Self {
        assert!(limit > 0, "Intake limit must be positive");
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            running: Vec::new(),
            intake_limit: limit,
            ticks: 0,
        }
    }

    /// Returns a handle for dispatching tasks onto this scheduler.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            sender: self.sender.clone(),
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Admits newly dispatched tasks, then polls each running task once.
    ///
    /// Returns the number of tasks still running afterwards.
    pub fn tick(&mut self) -> usize {
        self.ticks += 1;
        self.admit_dispatched();

        // Dispatch order is preserved across ticks.
        let tick = self.ticks;
        self.running.retain_mut(|task| match task.poll() {
            TaskPoll::Pending => true,
            TaskPoll::Complete => {
                debug!("Task '{}' completed on tick {}", task.name(), tick);
                false
            }
        });

        self.running.len()
    }

    /// Ticks until no task is running or queued.
    ///
    /// Returns the number of ticks taken.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> Result<u64, SchedulerError> {
        self.run_until_idle_paced(max_ticks, None)
    }

    /// Like [`run_until_idle`](Self::run_until_idle), but pads every tick
    /// to `frame_duration` when one is given.
    pub fn run_until_idle_paced(
        &mut self,
        max_ticks: u64,
        frame_duration: Option<Duration>,
    ) -> Result<u64, SchedulerError> {
        let mut taken = 0;
        while !self.is_idle() {
            if taken >= max_ticks {
                return Err(SchedulerError::Stalled {
                    ticks: taken,
                    active: self.running.len() + self.receiver.len(),
                });
            }

            let frame_start = Instant::now();
            self.tick();
            taken += 1;

            if let Some(frame_duration) = frame_duration {
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }

        debug!("Scheduler idle after {} ticks", taken);
        Ok(taken)
    }

    //--- Query API --------------------------------------------------------

    /// True when nothing is running and nothing is waiting for intake.
    pub fn is_idle(&self) -> bool {
        self.running.is_empty() && self.receiver.is_empty()
    }

    /// Tasks currently admitted and suspended.
    pub fn active_tasks(&self) -> usize {
        self.running.len()
    }

    /// Tasks dispatched but not yet admitted.
    pub fn queued_tasks(&self) -> usize {
        self.receiver.len()
    }

    /// Total ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    //--- Internal Helpers -------------------------------------------------

    fn admit_dispatched(&mut self) {
        let mut admitted = 0;

        while admitted < self.intake_limit {
            match self.receiver.try_recv() {
                Ok(task) => {
                    debug!("Task '{}' started on tick {}", task.name(), self.ticks);
                    self.running.push(task);
                    admitted += 1;
                }
                // The scheduler holds a sender, so this only means empty.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if admitted >= self.intake_limit && !self.receiver.is_empty() {
            warn!(
                "Task backlog: admitted {} tasks this tick, {} still queued",
                admitted,
                self.receiver.len()
            );
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.running.len())
            .field("queued", &self.receiver.len())
            .field("intake_limit", &self.intake_limit)
            .field("ticks", &self.ticks)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

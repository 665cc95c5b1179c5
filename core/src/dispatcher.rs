//! EventDispatcher (spec §4.2, §5, §9): the single-threaded
//! cooperative loop that owns [`AppState`] and all calls into
//! [`Store`]. Exposes `post`/`schedule_after` so a UI adapter (or, in
//! this workspace, `timeclock-kiosk`) can enqueue work without ever
//! mutating application state from another thread.

use crate::rfid::TagSource;
use crate::state::AppState;
use crate::store::Store;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// A unit of work queued onto the dispatcher. Receives `&mut AppState`
/// and `&Store`, the only two things a handler should ever need
/// (spec §5: "a single-threaded cooperative loop... owns all business
/// state and all writes to the Store").
pub type Task = Box<dyn FnOnce(&mut AppState, &Store) + Send>;

/// A cheaply-cloneable handle used to enqueue work onto the
/// dispatcher loop from any thread (the `TagSource` worker, timer
/// threads, or the UI adapter's own event loop).
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: Sender<Task>,
}

impl DispatcherHandle {
    /// Enqueues `task` for execution on the dispatcher thread. Never
    /// blocks the caller beyond an unbounded channel send.
    pub fn post(&self, task: impl FnOnce(&mut AppState, &Store) + Send + 'static) {
        if self.tx.send(Box::new(task)).is_err() {
            log::warn!("dispatcher post() after shutdown, task dropped");
        }
    }

    /// Spawns a one-shot timer thread that sleeps `delay` and then
    /// posts `task` back onto this same dispatcher, so the task still
    /// executes exclusively on the dispatcher thread (spec §5: "there
    /// are no suspension points inside critical sections").
    pub fn schedule_after(&self, delay: Duration, task: impl FnOnce(&mut AppState, &Store) + Send + 'static) {
        let handle = self.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            handle.post(task);
        });
    }
}

/// Owns the loop thread, the [`Store`], and the [`AppState`]. Created
/// via [`EventDispatcher::start`], which spawns the loop thread and
/// returns immediately with a [`DispatcherHandle`] for callers.
pub struct EventDispatcher {
    handle: DispatcherHandle,
    join: Option<thread::JoinHandle<()>>,
    shutdown_tx: Sender<Task>,
}

impl EventDispatcher {
    /// Spawns the cooperative loop thread. `state` and `store` are
    /// moved onto the loop thread and never touched from anywhere
    /// else for the life of the dispatcher.
    pub fn start(mut state: AppState, store: Store) -> (Self, DispatcherHandle) {
        let (tx, rx): (Sender<Task>, Receiver<Task>) = unbounded();
        let loop_tx = tx.clone();

        let join = thread::Builder::new()
            .name("event-dispatcher".to_string())
            .spawn(move || {
                log::info!("event dispatcher loop starting");
                for task in rx.iter() {
                    task(&mut state, &store);
                }
                state.drop_on_app_stop();
                log::info!("event dispatcher loop stopped");
            })
            .expect("failed to spawn event dispatcher thread");

        let handle = DispatcherHandle { tx: loop_tx };
        (
            Self {
                handle: handle.clone(),
                join: Some(join),
                shutdown_tx: tx,
            },
            handle,
        )
    }

    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Signals the loop to stop after draining queued tasks, joins the
    /// thread, and (per spec §4.2) closes out the Store by dropping
    /// it along with `AppState` on the loop thread.
    pub fn stop(mut self, tag_source: Option<&dyn TagSource>) {
        if let Some(source) = tag_source {
            source.stop();
        }
        drop(self.shutdown_tx);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

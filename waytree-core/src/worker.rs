//! Run a job on a background thread and deliver its result on the caller's
//! execution context.
//!
//! A [`Dispatcher`] is the caller's context. Hosts with a UI thread create a
//! queue with [`ui_channel`] and drain the [`UiLoop`] from that thread; hosts
//! without one use [`InlineDispatcher`], which delivers on the worker itself.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, error};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on a particular execution context.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// Runs tasks immediately on whatever thread dispatches them.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// Posting side of a UI-thread task queue.
#[derive(Clone)]
pub struct UiHandle {
    sender: Sender<Task>,
}

impl Dispatcher for UiHandle {
    fn dispatch(&self, task: Task) {
        if self.sender.send(task).is_err() {
            error!("UI loop is gone, dropping callback");
        }
    }
}

/// Draining side of a UI-thread task queue. Owned by the UI thread.
pub struct UiLoop {
    receiver: Receiver<Task>,
}

impl UiLoop {
    /// Run every task already queued, without waiting. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one task and run it. `false` on timeout or
    /// when every handle has been dropped.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Block until one task arrives and run it. `false` once every handle is dropped.
    pub fn run_one(&self) -> bool {
        match self.receiver.recv() {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }
}

pub fn ui_channel() -> (UiHandle, UiLoop) {
    let (sender, receiver) = mpsc::channel();
    (UiHandle { sender }, UiLoop { receiver })
}

/// Outcome of a worker job: its value, or the message of the panic that ended it.
pub type JobResult<T> = Result<T, String>;

/// Run `job` on a named background thread and hand its outcome to `deliver`
/// on `dispatcher`.
///
/// A panicking job is reported as `Err(message)`. If the thread cannot be
/// spawned at all, `deliver` still runs, through the dispatcher, with the
/// spawn error.
pub fn run_on_worker<T, F, C>(name: &str, dispatcher: Arc<dyn Dispatcher>, job: F, deliver: C)
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
    C: FnOnce(JobResult<T>) + Send + 'static,
{
    let thread_name = format!("waytree-{name}");
    // Shared so the callback survives a failed spawn, which drops the closure.
    let deliver = Arc::new(Mutex::new(Some(deliver)));

    let worker_deliver = Arc::clone(&deliver);
    let worker_dispatcher = Arc::clone(&dispatcher);
    let spawned = thread::Builder::new().name(thread_name.clone()).spawn(move || {
        debug!("{} started", thread::current().name().unwrap_or("worker"));
        let outcome = panic::catch_unwind(AssertUnwindSafe(job)).map_err(panic_message);
        if let Some(deliver) = take(&worker_deliver) {
            worker_dispatcher.dispatch(Box::new(move || deliver(outcome)));
        }
    });

    if let Err(err) = spawned {
        error!("Failed to spawn {}: {}", thread_name, err);
        if let Some(deliver) = take(&deliver) {
            let message = format!("failed to spawn {thread_name}: {err}");
            dispatcher.dispatch(Box::new(move || deliver(Err(message))));
        }
    }
}

fn take<C>(slot: &Mutex<Option<C>>) -> Option<C> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

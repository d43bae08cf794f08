//! Background work
//!
//! [`TaskManager`] runs futures on the tokio runtime with a fixed number of
//! concurrent slots. [`DataRetriever`] sits on top of it and reports each
//! unit of work as a [`WorkerEvent`] on a bounded channel, which the owner
//! drains on its own task.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Identifier of a unit of background work
pub type TaskId = u64;

/// Capacity of the worker event channel
pub const EVENT_CAPACITY: usize = 16;

/// Outcome of a unit of background work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// The work finished successfully
    Completed {
        /// Task that finished
        uid: TaskId,
        /// What kind of work it was
        request_type: String,
    },
    /// The work failed, panicked or was cancelled
    Failed {
        /// Task that failed
        uid: TaskId,
        /// Error message
        message: String,
    },
}

impl WorkerEvent {
    /// Task the event is about
    pub const fn uid(&self) -> TaskId {
        match self {
            Self::Completed { uid, .. } | Self::Failed { uid, .. } => *uid,
        }
    }
}

/// Runs background futures, at most `max_threads` at a time
pub struct TaskManager {
    permits: Arc<Semaphore>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl TaskManager {
    /// Create a manager with `max_threads` concurrent slots
    pub fn new(max_threads: usize) -> Self {
        let max_threads = max_threads.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_threads)),
            handles: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Queue a future; it starts once a slot is free
    pub fn spawn<F>(&self, task: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_shut_down() {
            return Err(Error::Worker("task manager is shut down".to_string()));
        }

        let permits = Arc::clone(&self.permits);
        let handle = tokio::spawn(async move {
            // Closed semaphore means shutdown: drop the task unrun
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            task.await;
        });

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        Ok(())
    }

    /// Number of queued or running tasks
    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Whether [`TaskManager::shut_down`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Stop accepting work and cancel everything queued or running
    ///
    /// Cancelled tasks are dropped, so their destructors still run.
    pub fn shut_down(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Task manager already shut down");
            return Ok(());
        }
        self.permits.close();
        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let cancelled = handles.iter().filter(|h| !h.is_finished()).count();
        for handle in handles {
            handle.abort();
        }
        debug!("Task manager shut down, {cancelled} task(s) cancelled");
        Ok(())
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        let _ = self.shut_down();
    }
}

/// Sends a failure for its task unless the task reported first
///
/// Covers panics and cancellation, so the owner never waits forever.
struct ReportOnDrop {
    uid: TaskId,
    events: mpsc::Sender<WorkerEvent>,
    reported: bool,
}

impl Drop for ReportOnDrop {
    fn drop(&mut self) {
        if !self.reported {
            let _ = self.events.try_send(WorkerEvent::Failed {
                uid: self.uid,
                message: "background task was cancelled".to_string(),
            });
        }
    }
}

/// Executes work on a [`TaskManager`] and reports results as events
pub struct DataRetriever {
    tasks: Arc<TaskManager>,
    events_tx: mpsc::Sender<WorkerEvent>,
    events_rx: mpsc::Receiver<WorkerEvent>,
    running: AtomicBool,
    next_uid: AtomicU64,
}

impl DataRetriever {
    /// Create a stopped retriever
    pub fn new(tasks: Arc<TaskManager>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        Self {
            tasks,
            events_tx,
            events_rx,
            running: AtomicBool::new(false),
            next_uid: AtomicU64::new(1),
        }
    }

    /// Start accepting work
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Stop accepting work; already queued work still reports
    pub fn stop(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(Error::Worker("data retriever is not running".to_string()));
        }
        debug!("Data retriever stopped");
        Ok(())
    }

    /// Whether the retriever accepts work
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The task manager work runs on
    pub fn tasks(&self) -> &Arc<TaskManager> {
        &self.tasks
    }

    /// Run `work` in the background, reporting its outcome as an event
    pub fn execute_method<F>(&self, request_type: &str, work: F) -> Result<TaskId>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        if !self.is_running() {
            return Err(Error::Worker("data retriever is not running".to_string()));
        }

        let uid = self.next_uid.fetch_add(1, Ordering::SeqCst);
        let request_type = request_type.to_string();
        let mut report = ReportOnDrop {
            uid,
            events: self.events_tx.clone(),
            reported: false,
        };

        self.tasks.spawn(async move {
            let event = match work.await {
                Ok(()) => WorkerEvent::Completed { uid, request_type },
                Err(e) => {
                    warn!("Background task {uid} failed: {e}");
                    WorkerEvent::Failed {
                        uid,
                        message: e.to_string(),
                    }
                }
            };
            report.reported = true;
            if report.events.send(event).await.is_err() {
                debug!("Nobody is listening for task {uid}");
            }
        })?;

        debug!("Queued background task {uid}");
        Ok(uid)
    }

    /// Wait for the next worker event
    pub async fn next_event(&mut self) -> Option<WorkerEvent> {
        self.events_rx.recv().await
    }

    /// Take a worker event if one is ready
    pub fn try_next_event(&mut self) -> Option<WorkerEvent> {
        self.events_rx.try_recv().ok()
    }
}

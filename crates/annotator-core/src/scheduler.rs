//! Cancellable delayed actions and the debouncer built on them.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};

fn current_runtime() -> Result<Handle> {
    Handle::try_current().context("no Tokio runtime available to schedule the task")
}

/// Handle to an action scheduled after a delay. Stopping or dropping the
/// handle cancels the action if it has not run yet.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn after<F>(delay: Duration, action: F) -> Result<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = current_runtime()?.spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        Ok(Self {
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Scheduled and neither run to completion nor stopped.
    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs only the last action submitted within the debounce window.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<ScheduledTask>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel the pending action (if any) and schedule `action`.
    pub fn call<F>(&self, action: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = ScheduledTask::after(self.delay, action)?;
        // Replacing drops, and therefore cancels, the previous task
        *self.pending.lock() = Some(task);
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(mut task) = self.pending.lock().take() {
            task.stop();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map(|t| t.is_pending())
            .unwrap_or(false)
    }
}

/// Fire-and-forget tasks owned by one mounted view model. `abort_all`
/// cancels whatever is still in flight so late responses never land.
#[derive(Debug, Clone, Default)]
pub struct TaskGroup {
    handles: Arc<Mutex<Vec<AbortHandle>>>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, future: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = current_runtime()?.spawn(future);
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle.abort_handle());
        Ok(())
    }

    pub fn in_flight(&self) -> usize {
        self.handles
            .lock()
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    pub fn abort_all(&self) {
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}

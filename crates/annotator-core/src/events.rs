//! Domain events and the in-process bus that carries them.
//!
//! Dispatch is synchronous and follows registration order. Handlers that need
//! to do async work spawn it themselves; the bus never waits for them. A
//! failing or panicking handler is logged and skipped, the remaining handlers
//! still run.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

/// Something that happened after a successful state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// A response to a record was submitted, saved as draft or discarded
    RecordResponseUpdated { dataset_id: String, record_id: String },
    /// The user's response to a record was deleted
    RecordCleared { dataset_id: String, record_id: String },
    DatasetDeleted { dataset_id: String },
    DatasetSettingUpdated { dataset_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RecordResponseUpdated,
    RecordCleared,
    DatasetDeleted,
    DatasetSettingUpdated,
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::RecordResponseUpdated { .. } => EventKind::RecordResponseUpdated,
            DomainEvent::RecordCleared { .. } => EventKind::RecordCleared,
            DomainEvent::DatasetDeleted { .. } => EventKind::DatasetDeleted,
            DomainEvent::DatasetSettingUpdated { .. } => EventKind::DatasetSettingUpdated,
        }
    }

    pub fn dataset_id(&self) -> &str {
        match self {
            DomainEvent::RecordResponseUpdated { dataset_id, .. }
            | DomainEvent::RecordCleared { dataset_id, .. }
            | DomainEvent::DatasetDeleted { dataset_id }
            | DomainEvent::DatasetSettingUpdated { dataset_id } => dataset_id,
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&DomainEvent) -> anyhow::Result<()> + Send + Sync>;

struct HandlerEntry {
    id: u64,
    kind: EventKind,
    active: Arc<AtomicBool>,
    handler: EventHandler,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    handlers: Mutex<Vec<HandlerEntry>>,
}

impl BusInner {
    fn remove(&self, id: u64) {
        let mut handlers = self.handlers.lock();
        if let Some(pos) = handlers.iter().position(|h| h.id == id) {
            let entry = handlers.remove(pos);
            entry.active.store(false, Ordering::SeqCst);
            debug!(kind = ?entry.kind, id, "event handler removed");
        }
    }
}

/// Publish/subscribe hub shared by the use cases and view models of a session.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`. The handler stays registered
    /// until the returned [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription removes the handler"]
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&DomainEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        self.inner.handlers.lock().push(HandlerEntry {
            id,
            kind,
            active: active.clone(),
            handler: Arc::new(handler),
        });
        debug!(?kind, id, "event handler registered");

        Subscription {
            id,
            kind,
            active,
            bus: Arc::downgrade(&self.inner),
        }
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Deliver `event` to every handler registered for its kind. Returns how
    /// many handlers completed without error.
    pub fn publish(&self, event: &DomainEvent) -> usize {
        let kind = event.kind();
        // Snapshot so handlers can (un)subscribe or publish re-entrantly
        let targets: Vec<(Arc<AtomicBool>, EventHandler)> = self
            .inner
            .handlers
            .lock()
            .iter()
            .filter(|h| h.kind == kind)
            .map(|h| (h.active.clone(), h.handler.clone()))
            .collect();

        if targets.is_empty() {
            debug!(?kind, "event published without subscribers");
            return 0;
        }

        let mut delivered = 0;
        for (active, handler) in targets {
            // Removed by an earlier handler of this same dispatch
            if !active.load(Ordering::SeqCst) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!(?kind, "event handler failed: {:#}", e),
                Err(_) => error!(?kind, "event handler panicked"),
            }
        }
        delivered
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner
            .handlers
            .lock()
            .iter()
            .filter(|h| h.kind == kind)
            .count()
    }
}

/// Registration handle. Dropping it removes the handler from the bus.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    active: Arc<AtomicBool>,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(self.id);
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

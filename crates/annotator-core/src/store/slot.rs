use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Issued by [`Store::ticket`] before a request; see [`Store::save_latest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Single-slot holder of the current value of one entity type.
///
/// Writes replace the whole value and are visible to `state()` before
/// `save` returns. An empty slot holds `T::default()`, never "nothing".
/// Observers receive changes through `subscribe()`.
pub struct Store<T> {
    name: &'static str,
    sender: watch::Sender<T>,
    tickets: Mutex<Tickets>,
}

#[derive(Debug, Default)]
struct Tickets {
    issued: u64,
    written: u64,
}

impl<T> Store<T>
where
    T: Clone + Default,
{
    pub fn new(name: &'static str) -> Self {
        let (sender, _) = watch::channel(T::default());
        Self {
            name,
            sender,
            tickets: Mutex::new(Tickets::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace the slot (last write wins).
    pub fn save(&self, value: T) {
        trace!(slot = self.name, "store slot saved");
        self.sender.send_replace(value);
    }

    /// A clone of the current value.
    pub fn state(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Read the current value in place. Do not call back into this store from `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Reset to the empty value.
    pub fn clear(&self) {
        debug!(slot = self.name, "store slot cleared");
        self.sender.send_replace(T::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Start a request whose result should only land if no newer request
    /// has written to this slot in the meantime.
    pub fn ticket(&self) -> Ticket {
        let mut tickets = self.tickets.lock();
        tickets.issued += 1;
        Ticket(tickets.issued)
    }

    /// Save unless a response of a newer ticket was already written. Returns
    /// whether the value was written; stale responses are dropped. A newer
    /// request that fails never writes, so it does not block older ones.
    pub fn save_latest(&self, ticket: Ticket, value: T) -> bool {
        let mut tickets = self.tickets.lock();
        if ticket.0 <= tickets.written {
            debug!(
                slot = self.name,
                ticket = ticket.0,
                written = tickets.written,
                "discarding stale response"
            );
            return false;
        }
        tickets.written = ticket.0;
        self.save(value);
        true
    }

    /// Drop every response still in flight: tickets issued so far can no
    /// longer write.
    pub fn invalidate(&self) {
        let mut tickets = self.tickets.lock();
        tickets.written = tickets.issued;
        debug!(slot = self.name, ticket = tickets.issued, "pending responses invalidated");
    }
}

// Toast notifications raised by view models.
// Queue with priorities, auto-dismiss and duplicate suppression.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::NOTIFICATION_DEDUP_WINDOW_SECS;

/// Notification priority levels (higher = more important)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration: Duration,
    pub shown_at: Option<Instant>,
}

impl Notification {
    fn with_level(message: impl Into<String>, level: NotificationLevel, secs: u64) -> Self {
        Self {
            message: message.into(),
            level,
            duration: Duration::from_secs(secs),
            shown_at: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Info, 3)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Success, 3)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Warning, 4)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Error, 5)
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at
            .map(|shown| shown.elapsed() >= self.duration)
            .unwrap_or(false)
    }

    fn mark_shown(&mut self) {
        if self.shown_at.is_none() {
            self.shown_at = Some(Instant::now());
        }
    }
}

/// Toasts for one session: one shown at a time, the rest queued by priority.
#[derive(Debug, Default)]
pub struct NotificationManager {
    queue: VecDeque<Notification>,
    current: Option<Notification>,
    recent_messages: Vec<(String, Instant)>,
}

pub type SharedNotifications = Arc<Mutex<NotificationManager>>;

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedNotifications {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Show or queue `notification`. A higher level replaces the current
    /// toast; the same message within the dedup window is dropped.
    pub fn notify(&mut self, notification: Notification) {
        let now = Instant::now();
        self.recent_messages.retain(|(_, expiry)| *expiry > now);
        if self
            .recent_messages
            .iter()
            .any(|(message, _)| *message == notification.message)
        {
            return;
        }
        self.recent_messages.push((
            notification.message.clone(),
            now + Duration::from_secs(NOTIFICATION_DEDUP_WINDOW_SECS),
        ));

        let show_now = self
            .current
            .as_ref()
            .map(|current| notification.level > current.level)
            .unwrap_or(true);

        if show_now {
            let mut n = notification;
            n.mark_shown();
            self.current = Some(n);
        } else {
            let pos = self
                .queue
                .iter()
                .position(|n| n.level < notification.level)
                .unwrap_or(self.queue.len());
            self.queue.insert(pos, notification);
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
        self.advance();
    }

    /// Advance past an expired toast (call each UI tick)
    pub fn tick(&mut self) {
        if self.current.as_ref().map(|c| c.is_expired()).unwrap_or(false) {
            self.current = None;
            self.advance();
        }
    }

    fn advance(&mut self) {
        if self.current.is_none() {
            if let Some(mut next) = self.queue.pop_front() {
                next.mark_shown();
                self.current = Some(next);
            }
        }
    }

    /// Take everything, current first. Used by non-interactive surfaces.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut all: Vec<Notification> = self.current.take().into_iter().collect();
        all.extend(self.queue.drain(..));
        all
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.queue.clear();
    }
}

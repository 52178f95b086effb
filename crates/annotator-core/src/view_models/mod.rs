//! Per-feature presentation state.
//!
//! View models are built from use cases, store handles and the bus; none of
//! them holds a repository. Each one decides how failures surface: either a
//! toast through the session's notifications or a debug log line.

pub mod datasets;
pub mod layout;
pub mod progress;
pub mod record;
pub mod settings;

pub use datasets::DatasetsViewModel;
pub use layout::LayoutViewModel;
pub use progress::AnnotationProgressViewModel;
pub use record::RecordViewModel;
pub use settings::DatasetSettingsViewModel;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

use crate::error::CoreError;
use crate::notifications::{Notification, SharedNotifications};

/// "Operation in progress" flag of a view model.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag until the guard drops. None if already raised.
    pub fn start(&self) -> Option<LoadingGuard> {
        if self.0.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(LoadingGuard(self.0.clone()))
    }
}

pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Push an error toast for `error`. Guard violations are programming errors
/// and only logged.
pub(crate) fn notify_failure(notifications: &SharedNotifications, message: &str, error: &CoreError) {
    warn!("{}: {}", message, error);
    let detail = match error {
        CoreError::Repository(e) => e.response().to_string(),
        CoreError::Guard(_) => return,
    };
    notifications
        .lock()
        .notify(Notification::error(format!("{} ({})", message, detail)));
}

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

use crate::constants::preference_keys;
use crate::preferences::KeyValueStorage;
use crate::scheduler::Debouncer;

fn persist(storage: &dyn KeyValueStorage, panel: &str, position: f64) {
    if let Err(e) = storage.write(&preference_keys::layout(panel), json!(position)) {
        warn!(panel, "failed to persist panel position: {}", e);
    }
}

/// Resizable panel positions. Moves are debounced per panel so a drag
/// produces a single preferences write with the final position.
///
/// Positions not yet written are persisted by `flush` and when the view
/// model is dropped.
pub struct LayoutViewModel {
    storage: Arc<dyn KeyValueStorage>,
    delay: Duration,
    debouncers: Mutex<HashMap<String, Debouncer>>,
    pending: Arc<Mutex<HashMap<String, f64>>>,
}

impl LayoutViewModel {
    pub fn new(storage: Arc<dyn KeyValueStorage>, delay: Duration) -> Self {
        Self {
            storage,
            delay,
            debouncers: Mutex::new(HashMap::new()),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn set_position(&self, panel: &str, position: f64) -> Result<()> {
        self.pending.lock().insert(panel.to_string(), position);

        let storage = self.storage.clone();
        let pending = self.pending.clone();
        let key = panel.to_string();
        let mut debouncers = self.debouncers.lock();
        let debouncer = debouncers
            .entry(panel.to_string())
            .or_insert_with(|| Debouncer::new(self.delay));
        debouncer.call(async move {
            // File IO runs on the blocking pool, off the runtime workers
            let panel = key.clone();
            let written =
                tokio::task::spawn_blocking(move || persist(storage.as_ref(), &panel, position))
                    .await;
            if let Err(e) = written {
                warn!(panel = %key, "panel position write did not complete: {}", e);
                return;
            }
            let mut pending = pending.lock();
            if pending.get(&key) == Some(&position) {
                pending.remove(&key);
            }
        })?;
        trace!(panel, position, "panel position scheduled");
        Ok(())
    }

    /// Latest position of `panel`, pending or persisted.
    pub fn position(&self, panel: &str) -> Option<f64> {
        if let Some(position) = self.pending.lock().get(panel) {
            return Some(*position);
        }
        self.storage
            .read(&preference_keys::layout(panel))
            .and_then(|v| v.as_f64())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Write every pending position now.
    pub fn flush(&self) {
        for debouncer in self.debouncers.lock().values() {
            debouncer.stop();
        }
        let pending: Vec<(String, f64)> = self.pending.lock().drain().collect();
        for (panel, position) in pending {
            persist(self.storage.as_ref(), &panel, position);
        }
    }
}

impl Drop for LayoutViewModel {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferencesError;
    use serde_json::Value;

    #[derive(Default)]
    struct CountingStorage {
        values: Mutex<HashMap<String, Value>>,
        writes: Mutex<Vec<(String, Value)>>,
    }

    impl KeyValueStorage for CountingStorage {
        fn read(&self, key: &str) -> Option<Value> {
            self.values.lock().get(key).cloned()
        }

        fn write(&self, key: &str, value: Value) -> Result<(), PreferencesError> {
            self.writes.lock().push((key.to_string(), value.clone()));
            self.values.lock().insert(key.to_string(), value);
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<bool, PreferencesError> {
            Ok(self.values.lock().remove(key).is_some())
        }
    }

    const WINDOW: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_moves_write_once() {
        let storage = Arc::new(CountingStorage::default());
        let vm = LayoutViewModel::new(storage.clone(), WINDOW);

        vm.set_position("sidebar", 0.2).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        vm.set_position("sidebar", 0.3).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        vm.set_position("sidebar", 0.4).unwrap();
        assert_eq!(vm.position("sidebar"), Some(0.4));
        assert!(storage.writes.lock().is_empty());

        tokio::time::sleep(WINDOW * 2).await;
        while vm.has_pending() {
            tokio::task::yield_now().await;
        }
        let writes = storage.writes.lock().clone();
        assert_eq!(writes, vec![("layout.sidebar".to_string(), json!(0.4))]);
        assert!(!vm.has_pending());
        assert_eq!(vm.position("sidebar"), Some(0.4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panels_debounced_independently() {
        let storage = Arc::new(CountingStorage::default());
        let vm = LayoutViewModel::new(storage.clone(), WINDOW);

        vm.set_position("sidebar", 0.2).unwrap();
        vm.set_position("details", 0.7).unwrap();
        tokio::time::sleep(WINDOW * 2).await;
        while vm.has_pending() {
            tokio::task::yield_now().await;
        }
        assert_eq!(storage.writes.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_and_drop_persist_pending() {
        let storage = Arc::new(CountingStorage::default());
        let vm = LayoutViewModel::new(storage.clone(), WINDOW);
        vm.set_position("sidebar", 0.5).unwrap();
        vm.flush();
        assert_eq!(storage.writes.lock().len(), 1);

        // The cancelled debounce does not write again
        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(storage.writes.lock().len(), 1);

        vm.set_position("details", 0.6).unwrap();
        drop(vm);
        assert_eq!(storage.read("layout.details"), Some(json!(0.6)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_write_reaches_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        let prefs = Arc::new(crate::preferences::Preferences::open(&path));
        let vm = LayoutViewModel::new(prefs, WINDOW);

        vm.set_position("sidebar", 0.35).unwrap();
        tokio::time::sleep(WINDOW * 2).await;
        while vm.has_pending() {
            tokio::task::yield_now().await;
        }

        let reopened = crate::preferences::Preferences::open(&path);
        assert_eq!(reopened.get::<f64>("layout.sidebar"), Some(0.35));
    }

    #[test]
    fn test_position_reads_persisted_value() {
        let storage = Arc::new(CountingStorage::default());
        storage
            .values
            .lock()
            .insert("layout.sidebar".into(), json!(0.25));
        let vm = LayoutViewModel::new(storage, WINDOW);
        assert_eq!(vm.position("sidebar"), Some(0.25));
        assert_eq!(vm.position("details"), None);
    }
}

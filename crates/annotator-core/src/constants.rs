//! Application-wide constants
//!
//! Centralized location for endpoint prefixes, defaults and preference keys
//! that are used across multiple modules.

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:6900";

/// Every REST endpoint lives under this versioned namespace
pub const API_VERSION_PREFIX: &str = "/v1";

/// Header carrying the user's API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Debounce window for persisted UI preferences (layout positions etc.)
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "annotator";

pub const PREFERENCES_FILE: &str = "preferences.json";

/// Page size used when loading records to annotate
pub const DEFAULT_RECORDS_PAGE_SIZE: u32 = 10;

/// Same-message notifications inside this window are dropped
pub const NOTIFICATION_DEDUP_WINDOW_SECS: u64 = 2;

/// Keys of the persisted client preferences.
pub mod preference_keys {
    pub const THEME: &str = "theme";
    pub const LAYOUT_PREFIX: &str = "layout.";
    pub const FEATURE_FLAG_PREFIX: &str = "feature.";

    pub fn layout(panel: &str) -> String {
        format!("{}{}", LAYOUT_PREFIX, panel)
    }

    pub fn feature_flag(flag: &str) -> String {
        format!("{}{}", FEATURE_FLAG_PREFIX, flag)
    }
}

/// Keys of the in-memory keyed cache.
pub mod cache_keys {
    pub fn metadata_metrics(property_id: &str) -> String {
        format!("metadata-metrics/{}", property_id)
    }
}

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod preferences;
pub mod repositories;
pub mod scheduler;
pub mod store;
pub mod tracing_setup;
pub mod use_cases;
pub mod view_models;

// Re-export the session-level types at crate root for convenience
pub use config::CoreConfig;
pub use context::SessionContext;
pub use error::{CoreError, RepositoryError};
pub use events::{DomainEvent, EventBus, EventKind, Subscription};
pub use store::{EntityStores, KeyedStore, Store};

pub mod api;
pub mod assist;
pub mod autosave;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod pages;
pub mod storage;
pub mod templates;
pub mod tree;

#[cfg(test)]
mod test_helpers;

// Convenience re-exports
pub use api::client::AiClient;
pub use api::Collaborator;
pub use assist::Assistant;
pub use autosave::{AutosaveEvent, AutosaveScheduler};
pub use config::AppConfig;
pub use document::{BlockDocument, Direction, Snapshot};
pub use error::{PageError, Result};
pub use storage::{FileBackend, MemoryBackend, PersistenceStore};
pub use templates::TemplateLibrary;

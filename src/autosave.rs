//! Debounced persistence of the open page.
//!
//! Every observed edit replaces the pending draft and restarts the delay, so a
//! burst of edits produces one write once the user pauses.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::document::Snapshot;
use crate::error::{ErrorInfo, PageError, Result};
use crate::model::Page;
use crate::storage::PersistenceStore;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// A job that runs once after a delay unless it is replaced or canceled first.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort whatever is pending and run `job` after `delay`. Must be called
    /// inside a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, job: impl FnOnce() + Send + 'static) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutosaveEvent {
    Saved { page_id: String },
    Failed(ErrorInfo),
}

struct Draft {
    title: String,
    blocks: Snapshot,
}

struct Shared {
    store: PersistenceStore,
    page: Mutex<Page>,
    pending: Mutex<Option<Draft>>,
    events: OnceLock<UnboundedSender<AutosaveEvent>>,
}

impl Shared {
    fn save_pending(&self) -> Result<bool> {
        let draft = self
            .pending
            .lock()
            .map_err(|_| PageError::Storage("autosave draft lock poisoned".into()))?
            .take();
        let Some(draft) = draft else {
            return Ok(false);
        };

        let mut page = self
            .page
            .lock()
            .map_err(|_| PageError::Storage("autosave page lock poisoned".into()))?;
        page.title = draft.title.clone();
        page.content = draft.blocks.to_vec();
        page.updated_at = Utc::now();

        match self.store.save_page(&page) {
            Ok(()) => {
                info!(page_id = %page.id, blocks = page.content.len(), "autosaved page");
                self.emit(AutosaveEvent::Saved {
                    page_id: page.id.clone(),
                });
                Ok(true)
            }
            Err(e) => {
                error!(page_id = %page.id, error = %e, "autosave failed");
                // Keep the draft for a retry unless a newer edit replaced it.
                if let Ok(mut pending) = self.pending.lock() {
                    pending.get_or_insert(draft);
                }
                self.emit(AutosaveEvent::Failed(ErrorInfo::from_page_error(&e)));
                Err(e)
            }
        }
    }

    fn emit(&self, event: AutosaveEvent) {
        if let Some(tx) = self.events.get() {
            let _ = tx.send(event);
        }
    }
}

pub struct AutosaveScheduler {
    shared: Arc<Shared>,
    delay: Duration,
    task: ScheduledTask,
}

impl AutosaveScheduler {
    pub fn new(store: PersistenceStore, page: Page, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                page: Mutex::new(page),
                pending: Mutex::new(None),
                events: OnceLock::new(),
            }),
            delay,
            task: ScheduledTask::new(),
        }
    }

    /// Report each write outcome on `tx`. Only the first sender is kept.
    pub fn with_events(self, tx: UnboundedSender<AutosaveEvent>) -> Self {
        let _ = self.shared.events.set(tx);
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_pending()
    }

    /// Record the latest title and blocks and restart the delay.
    pub fn observe(&mut self, title: impl Into<String>, blocks: Snapshot) {
        if let Ok(mut pending) = self.shared.pending.lock() {
            *pending = Some(Draft {
                title: title.into(),
                blocks,
            });
        }
        let shared = Arc::clone(&self.shared);
        self.task.schedule(self.delay, move || {
            let _ = shared.save_pending();
        });
        debug!(delay_ms = self.delay.as_millis() as u64, "autosave scheduled");
    }

    /// Write the pending draft now. Returns whether anything was written.
    pub fn flush(&mut self) -> Result<bool> {
        self.task.cancel();
        self.shared.save_pending()
    }

    /// Cancel the pending write and discard its draft.
    pub fn close(&mut self) {
        self.task.cancel();
        if let Ok(mut pending) = self.shared.pending.lock() {
            pending.take();
        }
        debug!("autosave closed");
    }
}

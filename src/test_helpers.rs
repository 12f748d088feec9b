use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use futures::future::BoxFuture;

use crate::api::types::{GenerateRequest, GenerateResponse};
use crate::api::Collaborator;
use crate::error::{PageError, Result};
use crate::model::{Block, Page};
use crate::storage::{default_pages, PersistenceStore};

pub fn make_block(text: &str) -> Block {
    Block::paragraph(text)
}

/// Page titled `Page <id>` with one paragraph.
pub fn make_page(id: &str, parent: Option<&str>) -> Page {
    let now = Utc::now();
    Page {
        id: id.into(),
        title: format!("Page {}", id),
        icon: None,
        cover: None,
        content: vec![make_block(&format!("Body of {}", id))],
        parent_id: parent.map(String::from),
        workspace_id: "default_workspace".into(),
        created_by: "tester".into(),
        last_edited_by: "tester".into(),
        created_at: now,
        updated_at: now,
        is_template: None,
        is_public: None,
        archived: None,
    }
}

/// The seeded welcome page: seven blocks, `block_1` through `block_7`.
pub fn welcome_page() -> Page {
    default_pages().remove(0)
}

pub fn memory_store() -> PersistenceStore {
    PersistenceStore::in_memory()
}

/// Collaborator double that answers every request with the same reply (or
/// fails), optionally after a per-call delay, and records what it was sent.
pub struct ScriptedCollaborator {
    reply: Option<String>,
    delays: Mutex<VecDeque<Duration>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedCollaborator {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Some(content.to_string()),
            delays: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    /// Delays consumed one per call, in order.
    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into_iter().collect();
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Collaborator for ScriptedCollaborator {
    fn generate(&self, req: GenerateRequest) -> BoxFuture<'_, Result<GenerateResponse>> {
        let delay = self.delays.lock().unwrap().pop_front();
        self.requests.lock().unwrap().push(req);
        let reply = self.reply.clone();
        Box::pin(async move {
            if let Some(delay) = delay.filter(|d| !d.is_zero()) {
                tokio::time::sleep(delay).await;
            }
            match reply {
                Some(content) => Ok(GenerateResponse {
                    content,
                    usage: None,
                }),
                None => Err(PageError::Api {
                    status: 500,
                    message: "scripted failure".into(),
                }),
            }
        })
    }
}

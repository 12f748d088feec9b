//! Writing assistant on top of a [`Collaborator`].
//!
//! Every call returns text the caller can drop straight into a block: failures
//! turn into fixed fallback strings rather than errors. Calls are tracked per
//! target (a block id or a page id); starting a new call for a target makes
//! the older one stale, and a stale result comes back as `None`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error};

use crate::api::prompts;
use crate::api::types::{GenerateRequest, GenerationType};
use crate::api::Collaborator;
use crate::document::BlockDocument;
use crate::error::Result;
use crate::model::{Block, BlockType};
use crate::templates::parse_generated_blocks;

pub const GENERATION_FAILED: &str = "Failed to generate content. Please try again.";
pub const SUMMARY_FAILED: &str = "Failed to generate summary";
pub const UNTITLED_SUGGESTION: &str = "Untitled";

/// Blocks before the cursor handed over as context when continuing a block.
pub const CONTINUE_CONTEXT_BLOCKS: usize = 3;

const TEMPLATE_TARGET: &str = "template";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    target: String,
    generation: u64,
}

/// Latest ticket per target.
#[derive(Debug, Default)]
pub struct GenerationSlots {
    current: Mutex<HashMap<String, u64>>,
    next: AtomicU64,
}

impl GenerationSlots {
    pub fn begin(&self, target: &str) -> Ticket {
        let generation = self.next.fetch_add(1, Ordering::Relaxed);
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_string(), generation);
        Ticket {
            target: target.to_string(),
            generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ticket.target)
            == Some(&ticket.generation)
    }

    /// Release the slot if `ticket` still owns it. Returns whether it did.
    pub fn finish(&self, ticket: &Ticket) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.get(&ticket.target) == Some(&ticket.generation) {
            current.remove(&ticket.target);
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self, target: &str) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(target)
    }
}

pub struct Assistant {
    collaborator: Arc<dyn Collaborator>,
    slots: GenerationSlots,
}

impl Assistant {
    pub fn new(collaborator: impl Collaborator + 'static) -> Self {
        Self::from_arc(Arc::new(collaborator))
    }

    pub fn from_arc(collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            collaborator,
            slots: GenerationSlots::default(),
        }
    }

    pub fn is_generating(&self, target: &str) -> bool {
        self.slots.in_flight(target)
    }

    /// Free-form generation. `None` means a newer call for `target` won.
    pub async fn generate(&self, target: &str, req: GenerateRequest) -> Option<String> {
        Some(match self.run(target, req).await? {
            Ok(content) => content,
            Err(_) => GENERATION_FAILED.to_string(),
        })
    }

    /// Text to put into `block_id`, written from the blocks right above it.
    pub async fn continue_block(&self, doc: &BlockDocument, block_id: &str) -> Option<String> {
        let context = continuation_context(doc, block_id);
        let req = GenerateRequest::new(
            GenerationType::Continue,
            prompts::continue_writing(&context),
        )
        .with_context("Content continuation for a productivity workspace");
        self.generate(block_id, req).await
    }

    pub async fn summarize(&self, target: &str, text: &str, max_length: usize) -> Option<String> {
        let req = GenerateRequest::new(
            GenerationType::Summarize,
            prompts::summarize(text, max_length),
        )
        .with_context("Text summarization task");
        Some(match self.run(target, req).await? {
            Ok(summary) => summary,
            Err(_) => SUMMARY_FAILED.to_string(),
        })
    }

    pub async fn suggest_title(&self, target: &str, content: &str) -> Option<String> {
        let req = GenerateRequest::new(GenerationType::Title, prompts::suggest_title(content))
            .with_context("Title suggestion task");
        Some(match self.run(target, req).await? {
            Ok(title) => strip_quotes(&title).to_string(),
            Err(_) => UNTITLED_SUGGESTION.to_string(),
        })
    }

    /// Rewritten `text`, or `text` itself when the collaborator fails.
    pub async fn improve(
        &self,
        target: &str,
        text: &str,
        instruction: Option<&str>,
    ) -> Option<String> {
        let req = GenerateRequest::new(GenerationType::Improve, prompts::improve(text, instruction))
            .with_context("Writing improvement task");
        Some(match self.run(target, req).await? {
            Ok(improved) => improved,
            Err(_) => text.to_string(),
        })
    }

    /// Blocks for a new template. A failed call yields a lone heading; a
    /// response without a usable block array yields heading plus description.
    pub async fn generate_template_blocks(
        &self,
        category: &str,
        description: &str,
    ) -> Option<Vec<Block>> {
        let req = GenerateRequest::new(
            GenerationType::Template,
            prompts::template(category, description),
        )
        .with_context("Template generation task");
        Some(match self.run(TEMPLATE_TARGET, req).await? {
            Ok(raw) => parse_generated_blocks(&raw, category, description),
            Err(_) => vec![Block::new(
                BlockType::Heading1,
                format!("{} Template", category),
            )],
        })
    }

    async fn run(&self, target: &str, req: GenerateRequest) -> Option<Result<String>> {
        let ticket = self.slots.begin(target);
        let kind = req.kind;
        debug!(target, kind = kind.as_str(), "generation started");

        let result = self.collaborator.generate(req).await;

        if !self.slots.finish(&ticket) {
            debug!(target, kind = kind.as_str(), "discarding superseded generation");
            return None;
        }
        Some(match result {
            Ok(resp) => Ok(resp.content),
            Err(e) => {
                error!(target, kind = kind.as_str(), error = %e, "generation failed");
                Err(e)
            }
        })
    }
}

/// Text of up to [`CONTINUE_CONTEXT_BLOCKS`] blocks preceding `block_id`, one
/// per line.
pub fn continuation_context(doc: &BlockDocument, block_id: &str) -> String {
    let end = doc.position(block_id).unwrap_or(0);
    let start = end.saturating_sub(CONTINUE_CONTEXT_BLOCKS);
    doc.blocks()[start..end]
        .iter()
        .map(Block::text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_quotes(title: &str) -> &str {
    let title = title.strip_prefix(['"', '\'']).unwrap_or(title);
    let title = title.strip_suffix(['"', '\'']).unwrap_or(title);
    title.trim()
}

pub mod client;
pub mod prompts;
pub mod types;

use futures::future::BoxFuture;

use crate::error::Result;
use types::{GenerateRequest, GenerateResponse};

/// Anything that can turn a generation request into text. Implemented by the
/// HTTP client and by test doubles.
pub trait Collaborator: Send + Sync {
    fn generate(&self, req: GenerateRequest) -> BoxFuture<'_, Result<GenerateResponse>>;
}

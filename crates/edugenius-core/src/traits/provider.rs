//! Provider traits — the external services the bank depends on.

use async_trait::async_trait;

use crate::error::Result;

/// Converts text into a fixed-length embedding vector.
///
/// One embedder (one model) per deployment: vectors from different models
/// are not comparable, and stored embeddings are never recomputed. An
/// `Ok` empty vector means "nothing to embed" (blank input); callers treat
/// it like a failure and take their fallback path.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name (e.g. "openai", "hash").
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Produces an answer for a free-text prompt. Treated as a black box by
/// the answer-with-practice flow.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    async fn answer(&self, prompt: &str) -> Result<String>;
}

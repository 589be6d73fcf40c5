//! Tool trait — bank operations exposed to the agent layer.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ToolDefinition, ToolResult};

/// A tool the agent can call with JSON-encoded arguments.
///
/// Domain failures (nothing found, provider down, bad id) are reported as
/// `ToolResult { success: false, .. }` so a failed call never aborts the
/// agent turn; `Err` is reserved for malformed calls.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// JSON-schema definition advertised to the model.
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, arguments: &str) -> Result<ToolResult>;
}

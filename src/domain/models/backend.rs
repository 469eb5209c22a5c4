use anyhow::Result;
use async_trait::async_trait;

use super::ToolRequest;
use super::ToolSpec;

/// Raw body returned by a processing endpoint, before it is shaped into an
/// artifact.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolResponse {
    Json(serde_json::Value),
    Blob {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify all configuration needed to reach the
    /// backend is present.
    async fn health_check(&self) -> Result<()>;

    /// Remaining credits for `user_id`, as reported by the plans service.
    async fn current_limit(&self, user_id: &str) -> Result<i64>;

    /// Explicitly consumes one credit. Only used by tools whose processing
    /// endpoint does not decrement on its own.
    async fn decrease_limit(&self, user_id: &str) -> Result<()>;

    /// Runs the tool remotely. The request goes out as JSON or multipart
    /// depending on the tool's transport, and binary tools get the body back
    /// untouched.
    async fn invoke(
        &self,
        spec: &ToolSpec,
        request: &ToolRequest,
        user_id: &str,
    ) -> Result<ToolResponse>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;

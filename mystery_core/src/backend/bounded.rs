//! Timeout wrapper for any generation backend.
//!
//! Requests that run past the deadline fail with [`GenerationError::Timeout`]. Nothing is
//! retried here; retrying is left to whoever issued the command.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{GenerationBackend, GenerationError, StructuredRequest, TextRequest};

/// Wrapper that bounds every request of an inner backend by a deadline.
pub struct BoundedBackend {
    inner: Arc<dyn GenerationBackend>,
    timeout: Duration,
}

impl BoundedBackend {
    pub fn new(inner: Arc<dyn GenerationBackend>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, Fut>(&self, operation: &str, request: Fut) -> Result<T, GenerationError>
    where
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Generation request timed out"
                );
                Err(GenerationError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for BoundedBackend {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        self.bounded("generate_text", self.inner.generate_text(request))
            .await
    }

    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<serde_json::Value, GenerationError> {
        self.bounded(
            "generate_structured",
            self.inner.generate_structured(request),
        )
        .await
    }
}

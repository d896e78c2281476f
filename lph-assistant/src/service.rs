//! AssistantService - dashboard insight and chat over the viewer's snapshot.
//!
//! Callers always get a string back. Missing configuration, backend failures
//! and empty replies all map to canned replies; the failure itself is only
//! logged.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use lph_core::ContextSnapshot;

use crate::backend::{CompletionRequest, LlmBackend, LlmError};
use crate::prompt;

/// Upper bound on one backend call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("No LLM backend configured")]
    NotConfigured,

    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("Backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to encode prompt data: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct AssistantService {
    backend: Option<Arc<dyn LlmBackend>>,
    timeout: Duration,
}

impl AssistantService {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend: Some(backend),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Service without a backend; every call returns the canned reply
    pub fn unconfigured() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_id(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.id())
    }

    /// Whether the backend answers within the timeout; false when unconfigured
    pub async fn is_reachable(&self) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        tokio::time::timeout(self.timeout, backend.is_available())
            .await
            .unwrap_or(false)
    }

    /// Short Indonesian summary of dashboard figures
    pub async fn summarize<T: Serialize + ?Sized>(&self, data: &T) -> String {
        match self.try_summarize(data).await {
            Ok(text) if text.trim().is_empty() => prompt::INSIGHT_EMPTY.to_string(),
            Ok(text) => text,
            Err(AssistantError::NotConfigured) => prompt::INSIGHT_UNCONFIGURED.to_string(),
            Err(e) => {
                warn!(error = %e, "Dashboard insight failed");
                prompt::INSIGHT_FAILED.to_string()
            }
        }
    }

    /// Answer a question using only the viewer's context snapshot
    pub async fn chat(&self, message: &str, snapshot: &ContextSnapshot) -> String {
        match self.try_chat(message, snapshot).await {
            Ok(text) if text.trim().is_empty() => prompt::CHAT_EMPTY.to_string(),
            Ok(text) => text,
            Err(AssistantError::NotConfigured) => prompt::CHAT_UNCONFIGURED.to_string(),
            Err(e) => {
                warn!(error = %e, role = %snapshot.viewer_role, "Assistant chat failed");
                prompt::CHAT_FAILED.to_string()
            }
        }
    }

    pub async fn try_summarize<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> Result<String, AssistantError> {
        let data_json = serde_json::to_string(data)?;
        let request = CompletionRequest::user(prompt::insight(&data_json))
            .with_system(prompt::INSIGHT_SYSTEM)
            .with_temperature(prompt::TEMPERATURE);
        self.complete(request).await
    }

    pub async fn try_chat(
        &self,
        message: &str,
        snapshot: &ContextSnapshot,
    ) -> Result<String, AssistantError> {
        let context_json = serde_json::to_string(snapshot)?;
        let request =
            CompletionRequest::user(prompt::chat(message, snapshot.viewer_role, &context_json))
                .with_system(prompt::CHAT_SYSTEM)
                .with_temperature(prompt::TEMPERATURE);
        self.complete(request).await
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, AssistantError> {
        let backend = self.backend.as_ref().ok_or(AssistantError::NotConfigured)?;
        debug!(backend = backend.id(), "Sending assistant request");

        let response = tokio::time::timeout(self.timeout, backend.complete(request))
            .await
            .map_err(|_| AssistantError::Timeout(self.timeout))??;

        debug!(
            backend = backend.id(),
            tokens = response.usage.total(),
            "Assistant request completed"
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use lph_core::{Collections, Role};

    #[tokio::test]
    async fn test_unconfigured_fallbacks() {
        let service = AssistantService::unconfigured();
        assert!(!service.is_configured());
        assert_eq!(
            service.summarize(&serde_json::json!({})).await,
            prompt::INSIGHT_UNCONFIGURED
        );

        let snapshot = ContextSnapshot::build(Role::Public, &Collections::new());
        assert_eq!(service.chat("halo", &snapshot).await, prompt::CHAT_UNCONFIGURED);
    }

    #[tokio::test]
    async fn test_backend_failure_fallbacks() {
        let backend = Arc::new(MockBackend::new("mock").with_available(false));
        let service = AssistantService::new(backend.clone());

        let snapshot = ContextSnapshot::build(Role::User, &Collections::new());
        assert_eq!(service.chat("halo", &snapshot).await, prompt::CHAT_FAILED);
        assert_eq!(
            service.summarize(&serde_json::json!({"a": 1})).await,
            prompt::INSIGHT_FAILED
        );
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_reachability() {
        assert!(!AssistantService::unconfigured().is_reachable().await);

        let backend = Arc::new(MockBackend::new("mock"));
        let service = AssistantService::new(backend.clone());
        assert!(service.is_reachable().await);

        backend.set_available(false);
        assert!(!service.is_reachable().await);
    }

    #[tokio::test]
    async fn test_empty_reply_fallbacks() {
        let service = AssistantService::new(Arc::new(MockBackend::new("mock").with_response("  ")));
        let snapshot = ContextSnapshot::build(Role::Admin, &Collections::new());
        assert_eq!(service.chat("halo", &snapshot).await, prompt::CHAT_EMPTY);
        assert_eq!(service.summarize(&[1, 2, 3]).await, prompt::INSIGHT_EMPTY);
    }

    #[tokio::test]
    async fn test_chat_sends_redacted_snapshot() {
        let backend = Arc::new(
            MockBackend::new("mock").with_response("Assalamualaikum... Ada 0 PU. Wassalamualaikum."),
        );
        let service = AssistantService::new(backend.clone());

        let snapshot = ContextSnapshot::build(Role::Public, &Collections::new());
        let reply = service.chat("Tampilkan keuangan", &snapshot).await;
        assert!(reply.starts_with("Assalamualaikum..."));

        let request = backend.last_request().unwrap();
        assert_eq!(request.system_prompt.as_deref(), Some(prompt::CHAT_SYSTEM));
        assert_eq!(request.temperature, Some(prompt::TEMPERATURE));
        let content = &request.messages[0].content;
        assert!(content.contains("(Role: PUBLIC)"));
        assert!(content.contains("\"finance\":\"ACCESS_DENIED_FOR_GUEST\""));
    }
}

//! LLM Client: the single point of entry for all upstream model calls.
//!
//! No other module talks to the chat completion endpoint directly. Callers get
//! either a validated value or an `LlmError`; every `LlmError` variant is an
//! upstream failure that the analysis flows are expected to degrade on.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod backend;
pub mod prompts;
pub mod retry;

pub use backend::{ChatBackend, ChatRequest, HttpChatBackend};
use retry::{retry_transient, RetryPolicy};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("upstream call timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response violates output contract: {0}")]
    Schema(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(e)
        }
    }
}

impl LlmError {
    /// Failures worth asking again: the network or the provider hiccupped,
    /// not the model's answer.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout => true,
            LlmError::Http(e) => e.is_connect() || e.is_request(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::Schema(_) | LlmError::EmptyContent => false,
        }
    }
}

/// Whether the upstream call asks for free text or for a strict JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Markdown,
    Json,
}

/// Model output after the mode-specific checks passed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawModelOutput {
    /// Trimmed, non-empty text.
    Markdown(String),
    /// A parsed JSON object. Other top-level JSON values are rejected.
    Json(serde_json::Value),
}

/// Wraps a `ChatBackend` with the retry policy and the output contract checks.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatBackend>,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn ChatBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Calls the upstream model and applies the checks for `mode`.
    ///
    /// Markdown: the trimmed text must be non-empty. Json: fences are stripped and
    /// the payload must parse as a JSON object. Malformed output is never retried.
    pub async fn invoke(
        &self,
        system: &str,
        user: &str,
        mode: OutputMode,
        temperature: f32,
    ) -> Result<RawModelOutput, LlmError> {
        let request = ChatRequest {
            system: system.to_string(),
            user: user.to_string(),
            mode,
            temperature,
        };

        let started = Instant::now();
        let result = retry_transient(&self.retry, "llm call", || self.backend.complete(&request))
            .await
            .and_then(|text| check_output(&text, mode));

        match &result {
            Ok(_) => debug!(
                "LLM call succeeded: model={}, mode={:?}, elapsed={}ms",
                self.backend.model(),
                mode,
                started.elapsed().as_millis()
            ),
            Err(e) => warn!(
                "LLM call failed: model={}, mode={:?}, elapsed={}ms: {e}",
                self.backend.model(),
                mode,
                started.elapsed().as_millis()
            ),
        }
        result
    }

    /// Json-mode call followed by the single schema-validation step: the object is
    /// deserialized into `T`, and any shape mismatch becomes `LlmError::Schema`.
    pub async fn invoke_json<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<T, LlmError> {
        match self.invoke(system, user, OutputMode::Json, temperature).await? {
            RawModelOutput::Json(value) => {
                serde_json::from_value(value).map_err(|e| LlmError::Schema(e.to_string()))
            }
            RawModelOutput::Markdown(_) => Err(LlmError::Schema(
                "expected JSON output, got free text".to_string(),
            )),
        }
    }

    /// Markdown-mode call returning the trimmed text.
    pub async fn invoke_markdown(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        match self
            .invoke(system, user, OutputMode::Markdown, temperature)
            .await?
        {
            RawModelOutput::Markdown(text) => Ok(text),
            RawModelOutput::Json(value) => Ok(value.to_string()),
        }
    }
}

fn check_output(text: &str, mode: OutputMode) -> Result<RawModelOutput, LlmError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    match mode {
        OutputMode::Markdown => Ok(RawModelOutput::Markdown(text.to_string())),
        OutputMode::Json => {
            let value: serde_json::Value = serde_json::from_str(strip_json_fences(text))?;
            if !value.is_object() {
                return Err(LlmError::Schema(
                    "top-level JSON value is not an object".to_string(),
                ));
            }
            Ok(RawModelOutput::Json(value))
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Scripted backends for exercising the pipeline without a network.
#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::retry::RetryPolicy;
    use super::{ChatBackend, ChatRequest, LlmClient, LlmError};

    type Handler = Box<dyn Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync>;

    pub struct ScriptedBackend {
        handler: Handler,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        pub fn new(
            handler: impl Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                handler: Box::new(handler),
                calls: AtomicUsize::new(0),
            })
        }

        /// Answers every request with the same content.
        pub fn always(content: &str) -> Arc<Self> {
            let content = content.to_string();
            Self::new(move |_| Ok(content.clone()))
        }

        /// Times out on every request.
        pub fn timing_out() -> Arc<Self> {
            Self::new(|_| Err(LlmError::Timeout))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.handler)(request)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    pub fn client(backend: &Arc<ScriptedBackend>) -> LlmClient {
        LlmClient::new(backend.clone(), RetryPolicy::none())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{client, ScriptedBackend};
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Scored {
        score: i64,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_json_array_is_not_accepted() {
        let err = check_output("[1, 2, 3]", OutputMode::Json).unwrap_err();
        assert!(matches!(err, LlmError::Schema(_)));
    }

    #[test]
    fn test_truncated_json_is_parse_error() {
        let err = check_output("{\"score\": 8", OutputMode::Json).unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_blank_markdown_is_empty_content() {
        let err = check_output("  \n ", OutputMode::Markdown).unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[test]
    fn test_markdown_is_trimmed_verbatim() {
        let out = check_output("\n## 总结\n内容\n\n", OutputMode::Markdown).unwrap();
        assert_eq!(out, RawModelOutput::Markdown("## 总结\n内容".to_string()));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Timeout.is_transient());
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(LlmError::Api {
            status: 429,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::Api {
            status: 401,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }

    #[tokio::test]
    async fn test_invoke_json_validates_shape() {
        let backend = ScriptedBackend::always("{\"level\": \"good\"}");
        let err = client(&backend)
            .invoke_json::<Scored>("s", "u", 0.1)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Schema(_)));
    }

    #[tokio::test]
    async fn test_invoke_json_accepts_fenced_object() {
        let backend = ScriptedBackend::always("```json\n{\"score\": 72}\n```");
        let scored: Scored = client(&backend).invoke_json("s", "u", 0.1).await.unwrap();
        assert_eq!(scored.score, 72);
    }

    #[tokio::test]
    async fn test_json_mode_is_forwarded_to_backend() {
        let backend = ScriptedBackend::new(|req| {
            assert_eq!(req.mode, OutputMode::Json);
            assert_eq!(req.system, "contract");
            Ok("{\"score\": 1}".to_string())
        });
        let _: Scored = client(&backend)
            .invoke_json("contract", "u", 0.1)
            .await
            .unwrap();
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_not_retried() {
        let backend = ScriptedBackend::always("not json at all");
        let llm = LlmClient::new(
            backend.clone(),
            RetryPolicy::new(3, std::time::Duration::ZERO),
        );
        let result = llm.invoke("s", "u", OutputMode::Json, 0.1).await;
        assert!(result.is_err());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_retried_per_policy() {
        let backend = ScriptedBackend::timing_out();
        let llm = LlmClient::new(
            backend.clone(),
            RetryPolicy::new(1, std::time::Duration::ZERO),
        );
        let result = llm.invoke_markdown("s", "u", 0.6).await;
        assert!(matches!(result, Err(LlmError::Timeout)));
        assert_eq!(backend.calls(), 2);
    }
}

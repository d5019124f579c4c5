//! AI gateway: prompt construction, model invocation and JSON extraction.
//!
//! Every AI feature runs through [`run_task`]; tasks differ only in their input
//! validation, prompt template and output shape (see `tasks.rs`).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::TextGenerator;

pub mod handlers;
pub mod prompts;
pub mod tasks;

/// One AI feature.
pub trait AiTask: Send + Sync {
    type Output: DeserializeOwned + Serialize + Send;

    /// Label used in logs.
    const NAME: &'static str;

    /// Rejects missing input before any external call is made.
    fn validate(&self) -> Result<(), AppError>;

    fn prompt(&self) -> String;
}

/// Validates the task, asks the model, and shapes the answer into `T::Output`.
pub async fn run_task<T: AiTask>(
    generator: &dyn TextGenerator,
    task: &T,
    timeout: Duration,
) -> Result<T::Output, AppError> {
    task.validate()?;

    let prompt = task.prompt();
    debug!(task = T::NAME, prompt_len = prompt.len(), "Invoking model");

    let text = tokio::time::timeout(timeout, generator.generate(&prompt, JSON_ONLY_SYSTEM))
        .await
        .map_err(|_| AppError::Timeout("AI request"))?
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let span = extract_json_object(&text).ok_or_else(|| {
        warn!(task = T::NAME, "Model response contains no JSON object");
        AppError::MalformedResponse
    })?;

    let value: serde_json::Value = serde_json::from_str(span)?;
    if !value.is_object() {
        return Err(AppError::MalformedResponse);
    }

    serde_json::from_value(value).map_err(|e| {
        warn!(task = T::NAME, "Model response has unexpected field types: {e}");
        AppError::MalformedResponse
    })
}

/// Returns the span from the first `{` to the last `}` of `text`, inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Replaces each `{key}` in `template` with its value in a single pass, so
/// caller text that happens to contain `{key}` is embedded untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let hit = values.iter().find(|(key, _)| {
            after.starts_with(key) && after[key.len()..].starts_with('}')
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::llm_client::{LlmError, TextGenerator};

    /// Returns a canned response and records every prompt it receives.
    pub struct StubGenerator {
        response: Option<String>,
        delay: Option<Duration>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                response: Some(text.to_string()),
                delay: None,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// A provider that answers with HTTP 503.
        pub fn failing() -> Self {
            Self {
                response: None,
                ..Self::replying("")
            }
        }

        pub fn slow(text: &str, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::replying(text)
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().await.push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response.clone().ok_or(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }
}

//! Outbound bridge to the chat-completion service.
//!
//! One pooled `reqwest::Client` per gateway. Every failure is typed as
//! [`UpstreamFailure`] internally and leaves through [`AnswerEngine::answer`] as a
//! user-safe sentence; nothing past this module sees a transport error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiSettings;
use crate::error::{HrError, HrResult, UpstreamFailure};
use crate::prompts::{helpdesk_system_prompt, onboarding_context, policy_system_prompt};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "AI is not configured yet. Please check AZURE_AI_ENDPOINT and AZURE_AI_API_KEY in .env.";
pub const TIMEOUT_MESSAGE: &str = "AI service request timed out. Please try again.";
pub const UNAVAILABLE_MESSAGE: &str = "AI service is currently unavailable. Please try again later.";
pub const TRANSPORT_MESSAGE: &str = "Error connecting to AI service. Please try again later.";

/// What the caller sees for each failure. Non-200 and malformed bodies share one message.
pub fn user_message(failure: &UpstreamFailure) -> &'static str {
    match failure {
        UpstreamFailure::NotConfigured => NOT_CONFIGURED_MESSAGE,
        UpstreamFailure::Timeout => TIMEOUT_MESSAGE,
        UpstreamFailure::Status(_) | UpstreamFailure::Malformed(_) => UNAVAILABLE_MESSAGE,
        UpstreamFailure::Transport(_) => TRANSPORT_MESSAGE,
    }
}

/// System-prompt template selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Policy assistant; `mode` is the resolved onboarding mode.
    Policy { mode: String },
    Helpdesk,
    /// Guided answer inside a tracked onboarding session.
    OnboardingSession {
        session_id: String,
        current_step: u32,
        policy_id: String,
    },
}

impl PromptTemplate {
    pub fn system_prompt(&self, context: &str) -> String {
        match self {
            PromptTemplate::Policy { mode } => policy_system_prompt(context, mode),
            PromptTemplate::Helpdesk => helpdesk_system_prompt(context),
            PromptTemplate::OnboardingSession {
                session_id,
                current_step,
                policy_id,
            } => {
                let wrapped = onboarding_context(context, session_id, *current_step, policy_id);
                policy_system_prompt(&wrapped, "guided")
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PromptTemplate::Policy { .. } => "policy",
            PromptTemplate::Helpdesk => "helpdesk",
            PromptTemplate::OnboardingSession { .. } => "onboarding",
        }
    }
}

/// Produces an answer for a question grounded in `context`. Always returns text.
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        context: &str,
        template: &PromptTemplate,
        max_tokens: u32,
    ) -> String;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<CompletionChoice>>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_answer(body: &str) -> Result<String, UpstreamFailure> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| UpstreamFailure::Malformed(e.to_string()))?;
    let from_choices = parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content);
    from_choices
        .or(parsed.answer)
        .ok_or_else(|| UpstreamFailure::Malformed("no choices[0].message.content or answer".to_string()))
}

fn classify(err: reqwest::Error) -> UpstreamFailure {
    if err.is_timeout() {
        UpstreamFailure::Timeout
    } else {
        UpstreamFailure::Transport(err.to_string())
    }
}

/// Azure-OpenAI-style chat completion client.
pub struct ChatCompletionGateway {
    client: reqwest::Client,
    settings: AiSettings,
}

impl ChatCompletionGateway {
    pub fn new(settings: AiSettings) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(settings.pool_idle_timeout_secs))
            .tcp_keepalive(Duration::from_secs(settings.tcp_keepalive_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("AI client builder failed ({}); using defaults", e);
                reqwest::Client::new()
            });
        if !settings.is_configured() {
            tracing::warn!("AI completion endpoint not configured; /api/ask will answer with a notice");
        }
        Self { client, settings }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// One completion round trip. Errors are always `HrError::UpstreamUnavailable`.
    pub async fn complete(
        &self,
        question: &str,
        context: &str,
        template: &PromptTemplate,
        max_tokens: u32,
    ) -> HrResult<String> {
        let (Some(url), Some(api_key)) = (self.settings.completion_url(), self.settings.api_key())
        else {
            return Err(HrError::UpstreamUnavailable(UpstreamFailure::NotConfigured));
        };

        let system = template.system_prompt(context);
        let body = CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            model: &self.settings.deployment,
        };

        tracing::info!(
            "Calling completion endpoint (deployment={}, template={})",
            self.settings.deployment,
            template.label()
        );

        let res = self
            .client
            .post(&url)
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HrError::UpstreamUnavailable(classify(e)))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| HrError::UpstreamUnavailable(classify(e)))?;

        if !status.is_success() {
            tracing::error!("Completion endpoint returned {}: {}", status, text);
            return Err(HrError::UpstreamUnavailable(UpstreamFailure::Status(
                status.as_u16(),
            )));
        }

        extract_answer(&text).map_err(HrError::UpstreamUnavailable)
    }
}

#[async_trait]
impl AnswerEngine for ChatCompletionGateway {
    async fn answer(
        &self,
        question: &str,
        context: &str,
        template: &PromptTemplate,
        max_tokens: u32,
    ) -> String {
        match self.complete(question, context, template, max_tokens).await {
            Ok(answer) => {
                tracing::info!("AI question answered ({} template)", template.label());
                answer
            }
            Err(HrError::UpstreamUnavailable(failure)) => {
                tracing::error!("AI completion failed: {}", failure);
                user_message(&failure).to_string()
            }
            Err(other) => {
                tracing::error!("AI completion failed: {}", other);
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }
}

//! Upstream completion client and the two-outcome recommendation boundary.

use reqwest::{header, Client};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, Message};
use crate::config::ProviderConfig;

/// Fixed system instruction prepended to every conversation.
const SYSTEM_PROMPT: &str = "You are a medicine recommender AI. Based on the symptoms \
    described, reply with a medicine recommendation and a brief reason only. \
    Do not elaborate.";

/// Fixed text returned to the client whenever the provider call fails.
pub const FALLBACK_TEXT: &str =
    "I'm having trouble processing your request. Please try again.";

/// Errors from a single provider call.
///
/// All variants collapse to [`Recommendation::Fallback`] at the
/// [`RecommenderClient::recommend`] boundary; they are distinguished
/// only in logs.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider response contained no choices")]
    EmptyChoices,
}

/// Outcome of one recommendation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    /// The provider's reply text, verbatim.
    Reply(String),
    /// The provider call failed; the caller shows [`FALLBACK_TEXT`].
    Fallback,
}

impl Recommendation {
    /// Resolve to the text sent to the client.
    pub fn into_text(self) -> String {
        match self {
            Recommendation::Reply(text) => text,
            Recommendation::Fallback => FALLBACK_TEXT.to_string(),
        }
    }
}

/// Client for the upstream chat-completion provider.
///
/// Holds only the HTTP client, credentials, and connection configuration;
/// safe to share read-only across concurrent requests.
#[derive(Debug, Clone)]
pub struct RecommenderClient {
    http: Client,
    provider: ProviderConfig,
}

impl RecommenderClient {
    pub fn new(http: Client, provider: ProviderConfig) -> Self {
        Self { http, provider }
    }

    /// One recommendation round trip.
    ///
    /// Any failure collapses to [`Recommendation::Fallback`]; the concrete
    /// error is logged and masked.
    pub async fn recommend(&self, message: &str) -> Recommendation {
        match self.complete(message).await {
            Ok(text) => Recommendation::Reply(text),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = %self.provider.name,
                    "Provider call failed, returning fallback"
                );
                Recommendation::Fallback
            }
        }
    }

    /// Build the two-message conversation for a user message.
    fn build_request(&self, message: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.provider.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(message)],
            stream: false,
        }
    }

    /// Submit one non-streaming completion and extract the reply text.
    async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.provider.url.trim_end_matches('/')
        );

        let mut request = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&self.build_request(message));

        if let Some(api_key) = &self.provider.api_key {
            request = request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", api_key.expose_secret()),
            );
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyChoices)
    }
}

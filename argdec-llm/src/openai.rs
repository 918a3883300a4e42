use crate::traits::{CompletionClient, CompletionOptions, ModelRole};
use argdec_common::{ArgdecError, ChatMessage, ChatRole, Result};
use argdec_http::{HttpClient, HttpError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Completion calls may take a while at 2048 output tokens; the transport
/// still fails the pending request after this bound.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiCompletionClient {
    client: HttpClient,
    api_key: String,
    extraction_model: String,
    general_model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiCompletionClient {
    /// Create a client for the given endpoint, key, and model pair.
    pub fn new(
        endpoint: &str,
        api_key: String,
        extraction_model: String,
        general_model: String,
    ) -> Result<Self> {
        let client = HttpClient::new(endpoint)
            .map_err(|e| ArgdecError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(COMPLETION_TIMEOUT);

        Ok(Self {
            client,
            api_key,
            extraction_model,
            general_model,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        model: ModelRole,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        let req = ChatCompletionRequest {
            model: self.model_name(model),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
        };

        tracing::debug!(
            model = %req.model,
            messages = req.messages.len(),
            "completion.request"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json("chat/completions", Some(&self.api_key), &req)
            .await
            .map_err(http_to_service)?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ArgdecError::Service("response contained no choices".to_string()))?;

        Ok(text)
    }

    fn model_name(&self, model: ModelRole) -> &str {
        match model {
            ModelRole::Extraction => &self.extraction_model,
            ModelRole::General => &self.general_model,
        }
    }
}

fn http_to_service(e: HttpError) -> ArgdecError {
    match e {
        HttpError::Timeout => ArgdecError::Timeout,
        other => ArgdecError::Service(format!("{other}")),
    }
}

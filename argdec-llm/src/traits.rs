use argdec_common::{ChatMessage, Result};
use async_trait::async_trait;

/// Which configured model a call site addresses.
///
/// The claim extractor is the only caller of the fine-tuned extraction
/// model; everything else uses the general model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Extraction,
    General,
}

/// Generation knobs shared by every call site.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            max_output_tokens: 2048,
        }
    }
}

/// External completion service: a prompt/message history in, generated
/// text out. The only call type in the system.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a role-tagged message sequence and return the generated text.
    async fn complete(
        &self,
        model: ModelRole,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String>;

    /// The configured model identifier behind a [`ModelRole`].
    fn model_name(&self, model: ModelRole) -> &str;
}

//! Provider-agnostic completion integration for Argdec.
//!
//! This crate exposes the [`traits::CompletionClient`] interface the engine
//! programs against, and the OpenAI-style chat-completions implementation
//! behind it. [`build_client`] initialises a client from an
//! [`argdec_config::CompletionSpec`].

pub mod openai;
pub mod traits;

use argdec_config::CompletionSpec;
use openai::OpenAiCompletionClient;
use std::sync::Arc;
use traits::{CompletionClient, CompletionOptions};

/// Build a completion client from configuration.
pub fn build_client(spec: &CompletionSpec) -> argdec_common::Result<Arc<dyn CompletionClient>> {
    match spec {
        CompletionSpec::Openai {
            auth_token,
            extraction_model,
            general_model,
            endpoint,
            ..
        } => {
            let client = OpenAiCompletionClient::new(
                endpoint,
                auth_token.clone(),
                extraction_model.clone(),
                general_model.clone(),
            )?;
            Ok(Arc::new(client))
        }
    }
}

/// Generation options from configuration, falling back to the defaults for
/// anything unset.
pub fn options_from_spec(spec: &CompletionSpec) -> CompletionOptions {
    let mut options = CompletionOptions::default();
    let CompletionSpec::Openai {
        temperature,
        max_tokens,
        ..
    } = spec;
    if let Some(t) = temperature {
        options.temperature = *t;
    }
    if let Some(m) = max_tokens {
        options.max_output_tokens = *m;
    }
    options
}

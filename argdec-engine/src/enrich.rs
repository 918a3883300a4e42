//! One-shot requests decoupled from the conversation threads: the context
//! enricher (summary + external background) and the highlight lookup.

use crate::prompts;
use argdec_common::Result;
use argdec_llm::traits::{CompletionClient, CompletionOptions, ModelRole};

/// Summary plus external background for a submitted article. Both
/// components are always populated on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedContext {
    pub summary: String,
    pub background: String,
}

/// Request a two-line summary and external background for the article.
pub async fn enrich(
    client: &dyn CompletionClient,
    article: &str,
    options: &CompletionOptions,
) -> Result<EnrichedContext> {
    let messages = prompts::context_enrichment(article);
    let raw = client
        .complete(ModelRole::General, &messages, options)
        .await?;
    Ok(split_enrichment(&raw))
}

/// Explain a user-selected span: definition for a single token, general
/// background otherwise. The length bound lives in the prompt; nothing is
/// truncated locally.
pub async fn explain(
    client: &dyn CompletionClient,
    selection: &str,
    options: &CompletionOptions,
) -> Result<String> {
    let messages = prompts::highlight_lookup(selection);
    let raw = client
        .complete(ModelRole::General, &messages, options)
        .await?;
    Ok(raw.trim().to_string())
}

/// Best-effort split of the service reply into its two components. The
/// reply shape is not guaranteed, so the split is total: paragraph break
/// first, single line break as fallback, and a one-line reply serves as
/// both components.
fn split_enrichment(raw: &str) -> EnrichedContext {
    let text = raw.trim();

    if let Some((summary, background)) = split_once_trimmed(text, "\n\n") {
        return EnrichedContext {
            summary,
            background,
        };
    }
    if let Some((summary, background)) = split_once_trimmed(text, "\n") {
        return EnrichedContext {
            summary,
            background,
        };
    }
    EnrichedContext {
        summary: text.to_string(),
        background: text.to_string(),
    }
}

fn split_once_trimmed(text: &str, sep: &str) -> Option<(String, String)> {
    let (head, tail) = text.split_once(sep)?;
    let head = head.trim();
    let tail = tail.trim();
    if head.is_empty() || tail.is_empty() {
        return None;
    }
    Some((head.to_string(), tail.to_string()))
}

//! Claim extraction: one completion request, then normalisation of the raw
//! reply into an ordered sequence of discrete claim strings.

use crate::prompts;
use argdec_common::Result;
use argdec_llm::traits::{CompletionClient, CompletionOptions, ModelRole};
use regex::Regex;
use std::sync::OnceLock;

/// A discrete assertion string extracted from the article, with its
/// derived punctuation-trimmed match form used for highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    text: String,
    match_form: String,
}

impl Claim {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let match_form = trim_trailing_punctuation(&text).to_string();
        Self { text, match_form }
    }

    /// The claim exactly as it appeared in the extractor's reply.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The claim with trailing non-word punctuation stripped; this is what
    /// gets located in the article.
    pub fn match_form(&self) -> &str {
        &self.match_form
    }
}

/// Ask the extraction model for the article's claims and normalise the
/// reply. Fails only on service errors; an unparseable reply simply yields
/// fewer (or zero) claims.
pub async fn extract_claims(
    client: &dyn CompletionClient,
    article: &str,
    options: &CompletionOptions,
) -> Result<Vec<Claim>> {
    let messages = prompts::claim_extraction(article);
    let raw = client
        .complete(ModelRole::Extraction, &messages, options)
        .await?;
    let claims = parse_claims(&raw);
    tracing::info!(claims = claims.len(), "claims.extracted");
    Ok(claims)
}

/// Split the extractor's raw reply into claims: strip list-numbering
/// tokens, split on sentence-ending punctuation, trim, drop empties.
/// Order of appearance is preserved and duplicates are kept.
pub fn parse_claims(raw: &str) -> Vec<Claim> {
    static NUMBERING: OnceLock<Regex> = OnceLock::new();
    let numbering = NUMBERING.get_or_init(|| Regex::new(r"\d+\.").expect("static pattern"));

    let cleaned = numbering.replace_all(raw, "");
    cleaned
        .split(['.', ',', '!', '?', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Claim::new)
        .collect()
}

/// Strip the trailing run of characters that are neither whitespace nor
/// ASCII alphanumerics, then any whitespace that run exposed. Underscores
/// strip too: only `[0-9A-Za-z]` terminates the scan.
fn trim_trailing_punctuation(s: &str) -> &str {
    s.trim_end()
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric() && !c.is_whitespace())
        .trim_end()
}

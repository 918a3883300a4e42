//! Counterargument generation: one completion request per claim, strictly
//! sequential, with per-claim failures isolated in an explicit slot so a
//! single error never discards the rest of the batch.

use crate::claims::Claim;
use crate::prompts;
use argdec_llm::traits::{CompletionClient, CompletionOptions, ModelRole};

/// A generated rebuttal, split on the first line boundary for progressive
/// disclosure: the summary line shows first, the body expands on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebuttal {
    pub summary: String,
    pub body: String,
}

impl Rebuttal {
    pub fn from_text(text: &str) -> Self {
        match text.split_once('\n') {
            Some((first, rest)) => Self {
                summary: first.to_string(),
                body: rest.to_string(),
            },
            None => Self {
                summary: text.to_string(),
                body: String::new(),
            },
        }
    }
}

/// Outcome slot for one claim: either a rebuttal or the error that
/// prevented one. Failed entries stay in place to keep the pair sequence
/// index-aligned with the claim sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuttalSlot {
    Ready(Rebuttal),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterargumentPair {
    pub claim: Claim,
    pub rebuttal: RebuttalSlot,
}

/// Generate one rebuttal per claim, in claim order, one request at a time.
/// Each request awaits its predecessor; a failure is recorded in the slot
/// and the next claim is still attempted.
pub async fn rebut_all(
    client: &dyn CompletionClient,
    claims: &[Claim],
    options: &CompletionOptions,
) -> Vec<CounterargumentPair> {
    let mut pairs = Vec::with_capacity(claims.len());
    for claim in claims {
        let messages = prompts::counterargument(claim.text());
        let rebuttal = match client.complete(ModelRole::General, &messages, options).await {
            Ok(text) => RebuttalSlot::Ready(Rebuttal::from_text(&text)),
            Err(err) => {
                tracing::warn!(claim = %claim.text(), error = %err, "rebuttal.failed");
                RebuttalSlot::Failed(err.to_string())
            }
        };
        pairs.push(CounterargumentPair {
            claim: claim.clone(),
            rebuttal,
        });
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use argdec_common::{ArgdecError, ChatMessage, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails on the claim containing a poison marker, succeeds elsewhere.
    struct FlakyClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for FlakyClient {
        async fn complete(
            &self,
            _model: ModelRole,
            messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if messages[0].content.contains("poison") {
                return Err(ArgdecError::Service("boom".to_string()));
            }
            Ok("Strong opener\nDetailed follow-up".to_string())
        }

        fn model_name(&self, _model: ModelRole) -> &str {
            "test-model"
        }
    }

    #[tokio::test]
    async fn pairs_stay_index_aligned_across_failures() {
        let client = FlakyClient {
            calls: AtomicUsize::new(0),
        };
        let claims = vec![
            Claim::new("first claim"),
            Claim::new("poison claim"),
            Claim::new("third claim"),
        ];

        let pairs = rebut_all(&client, &claims, &CompletionOptions::default()).await;

        assert_eq!(pairs.len(), 3);
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(pairs[0].claim.text(), "first claim");
        assert!(matches!(pairs[0].rebuttal, RebuttalSlot::Ready(_)));
        match &pairs[1].rebuttal {
            RebuttalSlot::Failed(msg) => assert!(msg.contains("boom")),
            other => panic!("expected failed slot, got {other:?}"),
        }
        assert!(matches!(pairs[2].rebuttal, RebuttalSlot::Ready(_)));
    }

    #[test]
    fn rebuttal_splits_on_first_line_boundary() {
        let r = Rebuttal::from_text("Summary line\nbody line one\nbody line two");
        assert_eq!(r.summary, "Summary line");
        assert_eq!(r.body, "body line one\nbody line two");

        let r = Rebuttal::from_text("only one line");
        assert_eq!(r.summary, "only one line");
        assert!(r.body.is_empty());
    }
}

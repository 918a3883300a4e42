//! End-to-end session flows against scripted completion clients: the full
//! analysis pipeline, both conversation threads, duplicate-submission
//! rejection, and discarding of late replies after a debate clear.

use argdec_common::{ArgdecError, ChatMessage, ChatRole, Result};
use argdec_engine::actor::{spawn_actor, ActorHandle};
use argdec_engine::rebuttal::RebuttalSlot;
use argdec_engine::session_actor::{SessionActor, SessionMsg, SessionOverview};
use argdec_engine::thread::{Reaction, ReactionEvent};
use argdec_llm::traits::{CompletionClient, CompletionOptions, ModelRole};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};

const ARTICLE: &str = "Inflation rose sharply this year while Taxes fell across the board.";

/// Deterministic replies: a fixed claim list from the extraction model, an
/// echoing two-line reply from the general model.
struct StubClient;

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(
        &self,
        model: ModelRole,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String> {
        match model {
            ModelRole::Extraction => Ok("1. Inflation rose. 2. Taxes fell!".to_string()),
            ModelRole::General => Ok(format!("Reply summary\nreplying to: {}", messages[0].content)),
        }
    }

    fn model_name(&self, _model: ModelRole) -> &str {
        "stub-model"
    }
}

/// Extraction succeeds; every general-model completion fails.
struct GeneralFailureClient;

#[async_trait]
impl CompletionClient for GeneralFailureClient {
    async fn complete(
        &self,
        model: ModelRole,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String> {
        match model {
            ModelRole::Extraction => Ok("1. Inflation rose. 2. Taxes fell!".to_string()),
            ModelRole::General => Err(ArgdecError::Service("service offline".to_string())),
        }
    }

    fn model_name(&self, _model: ModelRole) -> &str {
        "failing-model"
    }
}

/// Holds every request until the test hands out a permit.
struct GatedClient {
    gate: Arc<Semaphore>,
}

#[async_trait]
impl CompletionClient for GatedClient {
    async fn complete(
        &self,
        _model: ModelRole,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<String> {
        let permit = self.gate.acquire().await.unwrap();
        permit.forget();
        Ok("slow reply".to_string())
    }

    fn model_name(&self, _model: ModelRole) -> &str {
        "gated-model"
    }
}

fn spawn_session(client: Arc<dyn CompletionClient>) -> ActorHandle<SessionActor> {
    spawn_actor(
        SessionActor::new(client, CompletionOptions::default()),
        16,
    )
}

async fn submit(
    handle: &ActorHandle<SessionActor>,
    article: &str,
) -> Result<argdec_engine::session::Analysis> {
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Submit {
            article: article.to_string(),
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    rx.await.unwrap()
}

async fn snapshot(handle: &ActorHandle<SessionActor>) -> SessionOverview {
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Snapshot { reply: tx })
        .await
        .ok()
        .unwrap();
    rx.await.unwrap()
}

async fn toggle_qa(handle: &ActorHandle<SessionActor>) -> bool {
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::QaToggle { reply: tx })
        .await
        .ok()
        .unwrap();
    rx.await.unwrap()
}

async fn toggle_debate(handle: &ActorHandle<SessionActor>) -> bool {
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::DebateToggle { reply: tx })
        .await
        .ok()
        .unwrap();
    rx.await.unwrap()
}

async fn send_debate(
    handle: &ActorHandle<SessionActor>,
    text: &str,
) -> oneshot::Receiver<Result<Vec<ChatMessage>>> {
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::DebateSend {
            text: text.to_string(),
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    rx
}

#[tokio::test]
async fn submit_runs_the_full_analysis_pipeline() {
    let handle = spawn_session(Arc::new(StubClient));

    let analysis = submit(&handle, ARTICLE).await.unwrap();

    let texts: Vec<&str> = analysis.claims.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["Inflation rose", "Taxes fell"]);
    assert_eq!(
        analysis.annotated,
        "<mark>Inflation rose</mark> sharply this year while <mark>Taxes fell</mark> across the board."
    );
    assert_eq!(analysis.pairs.len(), 2);
    for pair in &analysis.pairs {
        match &pair.rebuttal {
            RebuttalSlot::Ready(r) => {
                assert_eq!(r.summary, "Reply summary");
                assert!(r.body.contains(pair.claim.text()));
            }
            other => panic!("expected ready slot, got {other:?}"),
        }
    }

    let overview = snapshot(&handle).await;
    assert!(overview.view.submitted);
    assert!(!overview.pending.submit);
    assert_eq!(overview.view.pairs.len(), 2);
}

#[tokio::test]
async fn duplicate_submit_is_rejected_while_one_is_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let handle = spawn_session(Arc::new(GatedClient { gate: gate.clone() }));

    let (tx1, rx1) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Submit {
            article: ARTICLE.to_string(),
            reply: tx1,
        })
        .await
        .ok()
        .unwrap();

    // The actor stays responsive: snapshot shows the pending flag, and a
    // second submit fails immediately rather than queueing.
    let overview = snapshot(&handle).await;
    assert!(overview.pending.submit);

    let (tx2, rx2) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Submit {
            article: ARTICLE.to_string(),
            reply: tx2,
        })
        .await
        .ok()
        .unwrap();
    assert!(matches!(rx2.await.unwrap(), Err(ArgdecError::Busy(_))));

    gate.add_permits(2);
    assert!(rx1.await.unwrap().is_ok());
}

#[tokio::test]
async fn article_cannot_be_resubmitted_after_success() {
    let handle = spawn_session(Arc::new(StubClient));

    submit(&handle, ARTICLE).await.unwrap();
    let err = submit(&handle, "A different article.").await.unwrap_err();
    assert!(matches!(err, ArgdecError::Session(_)));

    let overview = snapshot(&handle).await;
    assert_eq!(
        overview.view.annotated.as_deref().map(|a| a.contains("Inflation")),
        Some(true)
    );
}

#[tokio::test]
async fn qa_log_accumulates_and_survives_hide() {
    let handle = spawn_session(Arc::new(StubClient));
    submit(&handle, ARTICLE).await.unwrap();
    assert!(toggle_qa(&handle).await);

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::QaSend {
            text: "what happened to taxes?".to_string(),
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    let log = rx.await.unwrap().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].role, ChatRole::User);
    assert_eq!(log[0].content, "what happened to taxes?");
    assert_eq!(log[1].role, ChatRole::Assistant);

    assert!(!toggle_qa(&handle).await);
    assert!(toggle_qa(&handle).await);
    let overview = snapshot(&handle).await;
    assert_eq!(overview.view.qa_log.len(), 2);
}

#[tokio::test]
async fn qa_requires_a_submitted_article() {
    let handle = spawn_session(Arc::new(StubClient));

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::QaSend {
            text: "anyone there?".to_string(),
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    assert!(matches!(rx.await.unwrap(), Err(ArgdecError::Session(_))));
}

#[tokio::test]
async fn thumbs_down_appends_a_regenerated_reply() {
    let handle = spawn_session(Arc::new(StubClient));
    assert!(toggle_debate(&handle).await);

    let log = send_debate(&handle, "cats make the best pets")
        .await
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].role, ChatRole::Assistant);

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::DebateReact {
            event: ReactionEvent {
                kind: Reaction::Down,
                target: 1,
            },
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    let log = rx.await.unwrap().unwrap();

    // Regeneration appends an assistant-only entry; nothing is replaced.
    assert_eq!(log.len(), 3);
    assert_eq!(log[2].role, ChatRole::Assistant);
    assert!(log[2].content.contains("not persuasive"));

    let overview = snapshot(&handle).await;
    assert_eq!(overview.view.debate_reactions.len(), 1);
    assert_eq!(overview.view.debate_reactions[0].kind, Reaction::Down);
    assert_eq!(overview.view.debate_reactions[0].target, 1);
}

#[tokio::test]
async fn thumbs_up_records_without_a_request() {
    let handle = spawn_session(Arc::new(StubClient));
    toggle_debate(&handle).await;
    send_debate(&handle, "a stance").await.await.unwrap().unwrap();

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::DebateReact {
            event: ReactionEvent {
                kind: Reaction::Up,
                target: 1,
            },
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    let log = rx.await.unwrap().unwrap();
    assert_eq!(log.len(), 2);

    let overview = snapshot(&handle).await;
    assert_eq!(overview.view.debate_reactions.len(), 1);
    assert_eq!(overview.view.debate_reactions[0].kind, Reaction::Up);
}

#[tokio::test]
async fn reacting_to_a_user_entry_is_an_error() {
    let handle = spawn_session(Arc::new(StubClient));
    toggle_debate(&handle).await;
    send_debate(&handle, "a stance").await.await.unwrap().unwrap();

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::DebateReact {
            event: ReactionEvent {
                kind: Reaction::Down,
                target: 0,
            },
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    assert!(matches!(rx.await.unwrap(), Err(ArgdecError::Session(_))));
}

#[tokio::test]
async fn hiding_the_debate_discards_the_inflight_reply() {
    let gate = Arc::new(Semaphore::new(0));
    let handle = spawn_session(Arc::new(GatedClient { gate: gate.clone() }));

    assert!(toggle_debate(&handle).await);
    let pending_reply = send_debate(&handle, "dogs are overrated").await;

    // The hide is processed while the completion is still in flight.
    assert!(!toggle_debate(&handle).await);

    gate.add_permits(1);
    let log = pending_reply.await.unwrap().unwrap();
    assert!(log.is_empty());

    let overview = snapshot(&handle).await;
    assert!(overview.view.debate_log.is_empty());
    assert!(!overview.view.debate_visible);
    assert!(!overview.pending.debate);
}

#[tokio::test]
async fn failed_turns_leave_both_logs_untouched() {
    let handle = spawn_session(Arc::new(GeneralFailureClient));

    // Rebuttal failures are isolated per claim, so the submission itself
    // still succeeds.
    let analysis = submit(&handle, ARTICLE).await.unwrap();
    assert!(analysis
        .pairs
        .iter()
        .all(|p| matches!(p.rebuttal, RebuttalSlot::Failed(_))));

    toggle_qa(&handle).await;
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::QaSend {
            text: "what happened?".to_string(),
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    let err = rx.await.unwrap().unwrap_err();
    assert!(matches!(err, ArgdecError::Service(_)));

    toggle_debate(&handle).await;
    let err = send_debate(&handle, "a stance").await.await.unwrap().unwrap_err();
    assert!(matches!(err, ArgdecError::Service(_)));

    // The dropped turns left no partial user-only entries behind, and the
    // pending slots are free again.
    let overview = snapshot(&handle).await;
    assert!(overview.view.qa_log.is_empty());
    assert!(overview.view.debate_log.is_empty());
    assert!(!overview.pending.qa);
    assert!(!overview.pending.debate);
}

#[tokio::test]
async fn enrich_and_explain_round_trips() {
    let handle = spawn_session(Arc::new(StubClient));

    // Enrichment needs the article; lookup does not.
    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Enrich { reply: tx })
        .await
        .ok()
        .unwrap();
    assert!(matches!(rx.await.unwrap(), Err(ArgdecError::Session(_))));

    submit(&handle, ARTICLE).await.unwrap();

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Enrich { reply: tx })
        .await
        .ok()
        .unwrap();
    let ctx = rx.await.unwrap().unwrap();
    assert!(!ctx.summary.is_empty());
    assert!(!ctx.background.is_empty());

    let (tx, rx) = oneshot::channel();
    handle
        .addr
        .send(SessionMsg::Explain {
            selection: "inflation".to_string(),
            reply: tx,
        })
        .await
        .ok()
        .unwrap();
    let explanation = rx.await.unwrap().unwrap();
    assert!(explanation.contains("inflation"));
}

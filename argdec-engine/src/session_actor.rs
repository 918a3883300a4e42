//! The per-session actor: owns the [`SessionState`] aggregate and the
//! completion client, and serializes every operation through one mailbox.
//!
//! Completion calls never run inside `handle`. Each operation spawns its
//! requests onto the runtime and posts the outcome back to the actor's own
//! mailbox as [`SessionMsg::Completed`], so a hide (or any other message)
//! is processed immediately even while a request is in flight. A pending
//! slot per operation kind rejects duplicate submissions with
//! [`ArgdecError::Busy`]; a debate completion whose launch-time epoch no
//! longer matches the thread's is discarded instead of appended.

use crate::actor::{Actor, Context};
use crate::claims;
use crate::enrich::{self, EnrichedContext};
use crate::highlight;
use crate::prompts;
use crate::rebuttal;
use crate::session::{Analysis, PairReaction, SessionState, SessionView};
use crate::thread::{Reaction, ReactionEvent};
use argdec_common::{ArgdecError, ChatMessage, ChatRole, Result};
use argdec_llm::traits::{CompletionClient, CompletionOptions, ModelRole};
use std::sync::Arc;
use tokio::sync::oneshot;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Operations a calling surface can dispatch at a session.
pub enum SessionMsg {
    /// Submit the article and run the analysis pipeline (extract claims,
    /// annotate, generate counterarguments).
    Submit {
        article: String,
        reply: Reply<Analysis>,
    },
    /// Show/hide the Q&A thread. The log survives either way.
    QaToggle { reply: oneshot::Sender<bool> },
    /// One Q&A round-trip grounded in the article.
    QaSend {
        text: String,
        reply: Reply<Vec<ChatMessage>>,
    },
    /// Show/hide the debate thread. Hiding clears it.
    DebateToggle { reply: oneshot::Sender<bool> },
    /// One adversarial debate round-trip.
    DebateSend {
        text: String,
        reply: Reply<Vec<ChatMessage>>,
    },
    /// React to a debate reply; a thumbs-down regenerates.
    DebateReact {
        event: ReactionEvent,
        reply: Reply<Vec<ChatMessage>>,
    },
    /// Heart/dislike on a counterargument pair; recorded, nothing more.
    PairReact {
        pair_index: usize,
        reaction: PairReaction,
        reply: Reply<()>,
    },
    /// One-shot explanation of a user-selected span.
    Explain {
        selection: String,
        reply: Reply<String>,
    },
    /// One-shot summary + background note for the article.
    Enrich { reply: Reply<EnrichedContext> },
    /// Render-ready copy of the session plus in-flight indicators.
    Snapshot {
        reply: oneshot::Sender<SessionOverview>,
    },
    /// Internal: a spawned completion finished.
    Completed(Outcome),
}

/// Outcome of a spawned completion, routed back through the mailbox.
pub enum Outcome {
    Analysis {
        article: String,
        result: Result<Analysis>,
    },
    QaTurn {
        user_text: String,
        result: Result<String>,
    },
    DebateTurn {
        user_text: String,
        epoch: u64,
        result: Result<String>,
    },
    DebateRegen {
        target: usize,
        epoch: u64,
        result: Result<String>,
    },
    Explain(Result<String>),
    Enrich(Result<EnrichedContext>),
}

/// Which operations currently have a request in flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingOps {
    pub submit: bool,
    pub qa: bool,
    pub debate: bool,
    pub lookup: bool,
    pub enrich: bool,
}

/// Snapshot reply: the session view plus pending indicators, so the
/// calling surface can disable duplicate submission.
#[derive(Debug, Clone)]
pub struct SessionOverview {
    pub view: SessionView,
    pub pending: PendingOps,
}

#[derive(Default)]
struct PendingSlots {
    submit: Option<Reply<Analysis>>,
    qa: Option<Reply<Vec<ChatMessage>>>,
    debate: Option<Reply<Vec<ChatMessage>>>,
    lookup: Option<Reply<String>>,
    enrich: Option<Reply<EnrichedContext>>,
}

impl PendingSlots {
    fn flags(&self) -> PendingOps {
        PendingOps {
            submit: self.submit.is_some(),
            qa: self.qa.is_some(),
            debate: self.debate.is_some(),
            lookup: self.lookup.is_some(),
            enrich: self.enrich.is_some(),
        }
    }
}

pub struct SessionActor {
    client: Arc<dyn CompletionClient>,
    options: CompletionOptions,
    state: SessionState,
    pending: PendingSlots,
}

impl SessionActor {
    pub fn new(client: Arc<dyn CompletionClient>, options: CompletionOptions) -> Self {
        Self {
            client,
            options,
            state: SessionState::default(),
            pending: PendingSlots::default(),
        }
    }

    fn debate_log(&self) -> Vec<ChatMessage> {
        self.state.debate.log().to_vec()
    }

    /// The assistant entry a debate reaction targets, or a session error.
    fn debate_target_content(&self, target: usize) -> Result<String> {
        match self.state.debate.log().get(target) {
            Some(msg) if msg.role == ChatRole::Assistant => Ok(msg.content.clone()),
            Some(_) => Err(ArgdecError::Session(format!(
                "debate entry {target} is not an assistant reply"
            ))),
            None => Err(ArgdecError::Session(format!(
                "no debate entry at index {target}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl Actor for SessionActor {
    type Msg = SessionMsg;

    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> anyhow::Result<()> {
        match msg {
            SessionMsg::Submit { article, reply } => {
                if self.pending.submit.is_some() {
                    let _ = reply.send(Err(ArgdecError::Busy("submit")));
                    return Ok(());
                }
                if self.state.article().is_some() {
                    let _ = reply.send(Err(ArgdecError::Session(
                        "article already submitted for this session".to_string(),
                    )));
                    return Ok(());
                }
                self.pending.submit = Some(reply);

                let client = self.client.clone();
                let options = self.options;
                let addr = ctx.addr();
                tokio::spawn(async move {
                    let result = run_analysis(client.as_ref(), &article, &options).await;
                    let _ = addr
                        .send(SessionMsg::Completed(Outcome::Analysis { article, result }))
                        .await;
                });
            }

            SessionMsg::QaToggle { reply } => {
                let _ = reply.send(self.state.qa.toggle());
            }

            SessionMsg::QaSend { text, reply } => {
                if self.pending.qa.is_some() {
                    let _ = reply.send(Err(ArgdecError::Busy("qa")));
                    return Ok(());
                }
                let article = match self.state.require_article() {
                    Ok(article) => article.as_str().to_string(),
                    Err(err) => {
                        let _ = reply.send(Err(err));
                        return Ok(());
                    }
                };
                self.pending.qa = Some(reply);

                let client = self.client.clone();
                let options = self.options;
                let addr = ctx.addr();
                tokio::spawn(async move {
                    let messages = prompts::qa_turn(&article, &text);
                    let result = client
                        .complete(ModelRole::General, &messages, &options)
                        .await;
                    let _ = addr
                        .send(SessionMsg::Completed(Outcome::QaTurn {
                            user_text: text,
                            result,
                        }))
                        .await;
                });
            }

            SessionMsg::DebateToggle { reply } => {
                let _ = reply.send(self.state.debate.toggle());
            }

            SessionMsg::DebateSend { text, reply } => {
                if self.pending.debate.is_some() {
                    let _ = reply.send(Err(ArgdecError::Busy("debate")));
                    return Ok(());
                }
                self.pending.debate = Some(reply);

                let epoch = self.state.debate.epoch();
                let client = self.client.clone();
                let options = self.options;
                let addr = ctx.addr();
                tokio::spawn(async move {
                    let messages = prompts::debate_turn(&text);
                    let result = client
                        .complete(ModelRole::General, &messages, &options)
                        .await;
                    let _ = addr
                        .send(SessionMsg::Completed(Outcome::DebateTurn {
                            user_text: text,
                            epoch,
                            result,
                        }))
                        .await;
                });
            }

            SessionMsg::DebateReact { event, reply } => match event.kind {
                Reaction::Up => {
                    let outcome = self.debate_target_content(event.target).map(|_| {
                        self.state.debate.record_reaction(event);
                        self.debate_log()
                    });
                    let _ = reply.send(outcome);
                }
                Reaction::Down => {
                    if self.pending.debate.is_some() {
                        let _ = reply.send(Err(ArgdecError::Busy("debate")));
                        return Ok(());
                    }
                    let previous = match self.debate_target_content(event.target) {
                        Ok(content) => content,
                        Err(err) => {
                            let _ = reply.send(Err(err));
                            return Ok(());
                        }
                    };
                    self.pending.debate = Some(reply);

                    let epoch = self.state.debate.epoch();
                    let client = self.client.clone();
                    let options = self.options;
                    let addr = ctx.addr();
                    tokio::spawn(async move {
                        let messages = prompts::debate_regeneration(&previous);
                        let result = client
                            .complete(ModelRole::General, &messages, &options)
                            .await;
                        let _ = addr
                            .send(SessionMsg::Completed(Outcome::DebateRegen {
                                target: event.target,
                                epoch,
                                result,
                            }))
                            .await;
                    });
                }
            },

            SessionMsg::PairReact {
                pair_index,
                reaction,
                reply,
            } => {
                let _ = reply.send(self.state.record_pair_reaction(pair_index, reaction));
            }

            SessionMsg::Explain { selection, reply } => {
                if self.pending.lookup.is_some() {
                    let _ = reply.send(Err(ArgdecError::Busy("lookup")));
                    return Ok(());
                }
                self.pending.lookup = Some(reply);

                let client = self.client.clone();
                let options = self.options;
                let addr = ctx.addr();
                tokio::spawn(async move {
                    let result = enrich::explain(client.as_ref(), &selection, &options).await;
                    let _ = addr
                        .send(SessionMsg::Completed(Outcome::Explain(result)))
                        .await;
                });
            }

            SessionMsg::Enrich { reply } => {
                if self.pending.enrich.is_some() {
                    let _ = reply.send(Err(ArgdecError::Busy("enrich")));
                    return Ok(());
                }
                let article = match self.state.require_article() {
                    Ok(article) => article.as_str().to_string(),
                    Err(err) => {
                        let _ = reply.send(Err(err));
                        return Ok(());
                    }
                };
                self.pending.enrich = Some(reply);

                let client = self.client.clone();
                let options = self.options;
                let addr = ctx.addr();
                tokio::spawn(async move {
                    let result = enrich::enrich(client.as_ref(), &article, &options).await;
                    let _ = addr
                        .send(SessionMsg::Completed(Outcome::Enrich(result)))
                        .await;
                });
            }

            SessionMsg::Snapshot { reply } => {
                let _ = reply.send(SessionOverview {
                    view: self.state.snapshot(),
                    pending: self.pending.flags(),
                });
            }

            SessionMsg::Completed(outcome) => self.apply_outcome(outcome),
        }
        Ok(())
    }
}

impl SessionActor {
    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Analysis { article, result } => {
                let Some(reply) = self.pending.submit.take() else {
                    return;
                };
                match result {
                    Ok(analysis) => {
                        // The article only becomes part of the session once
                        // analysis succeeded; a failed submission can be
                        // resubmitted.
                        if let Err(err) = self.state.submit_article(article) {
                            let _ = reply.send(Err(err));
                            return;
                        }
                        self.state.apply_analysis(analysis.clone());
                        let _ = reply.send(Ok(analysis));
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err));
                    }
                }
            }

            Outcome::QaTurn { user_text, result } => {
                let Some(reply) = self.pending.qa.take() else {
                    return;
                };
                match result {
                    Ok(answer) => {
                        self.state.qa.append_turn(user_text, answer);
                        let _ = reply.send(Ok(self.state.qa.log().to_vec()));
                    }
                    Err(err) => {
                        // Dropped turn: the log stays exactly as it was.
                        let _ = reply.send(Err(err));
                    }
                }
            }

            Outcome::DebateTurn {
                user_text,
                epoch,
                result,
            } => {
                let Some(reply) = self.pending.debate.take() else {
                    return;
                };
                if epoch != self.state.debate.epoch() {
                    tracing::debug!("debate.late_reply.discarded");
                    let _ = reply.send(Ok(self.debate_log()));
                    return;
                }
                match result {
                    Ok(answer) => {
                        self.state.debate.append_turn(user_text, answer);
                        let _ = reply.send(Ok(self.debate_log()));
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err));
                    }
                }
            }

            Outcome::DebateRegen {
                target,
                epoch,
                result,
            } => {
                let Some(reply) = self.pending.debate.take() else {
                    return;
                };
                if epoch != self.state.debate.epoch() {
                    tracing::debug!("debate.late_regen.discarded");
                    let _ = reply.send(Ok(self.debate_log()));
                    return;
                }
                match result {
                    Ok(answer) => {
                        self.state.debate.append_regeneration(answer);
                        self.state.debate.record_reaction(ReactionEvent {
                            kind: Reaction::Down,
                            target,
                        });
                        let _ = reply.send(Ok(self.debate_log()));
                    }
                    Err(err) => {
                        let _ = reply.send(Err(err));
                    }
                }
            }

            Outcome::Explain(result) => {
                if let Some(reply) = self.pending.lookup.take() {
                    let _ = reply.send(result);
                }
            }

            Outcome::Enrich(result) => {
                if let Some(reply) = self.pending.enrich.take() {
                    let _ = reply.send(result);
                }
            }
        }
    }
}

/// The analysis pipeline: extract claims, annotate the article, then
/// generate counterarguments sequentially. Extraction failure fails the
/// whole submission; rebuttal failures stay per-claim.
async fn run_analysis(
    client: &dyn CompletionClient,
    article: &str,
    options: &CompletionOptions,
) -> Result<Analysis> {
    let claims = claims::extract_claims(client, article, options).await?;
    let annotated = highlight::annotate(article, &claims);
    let pairs = rebuttal::rebut_all(client, &claims, options).await;
    Ok(Analysis {
        claims,
        annotated,
        pairs,
    })
}

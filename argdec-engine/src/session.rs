//! The per-session state aggregate.
//!
//! All claim and conversation state for one reader lives here, mutated
//! only through explicit methods. The aggregate is owned by a single
//! [`crate::session_actor::SessionActor`]; nothing in it is shared or
//! ambient.

use crate::claims::Claim;
use crate::rebuttal::CounterargumentPair;
use crate::thread::{DebateThread, QaThread, ReactionEvent};
use argdec_common::{ArgdecError, ChatMessage, Result};

/// The submitted article: the immutable anchor text every highlight is
/// computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article(String);

impl Article {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of the analysis pipeline: claims, the annotated article, and
/// the index-aligned counterargument pairs.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub claims: Vec<Claim>,
    pub annotated: String,
    pub pairs: Vec<CounterargumentPair>,
}

/// Reaction on a counterargument pair. Recording the event is the whole
/// behavior; nothing downstream consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairReaction {
    Heart,
    Dislike,
}

#[derive(Debug, Default)]
pub struct SessionState {
    article: Option<Article>,
    analysis: Option<Analysis>,
    pair_reactions: Vec<(usize, PairReaction)>,
    pub qa: QaThread,
    pub debate: DebateThread,
}

impl SessionState {
    /// Accept the article. It is immutable once submitted; a second
    /// submission is rejected rather than silently replacing state.
    pub fn submit_article(&mut self, text: String) -> Result<&Article> {
        if self.article.is_some() {
            return Err(ArgdecError::Session(
                "article already submitted for this session".to_string(),
            ));
        }
        Ok(self.article.insert(Article::new(text)))
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    /// The article, or a session error for operations that need one.
    pub fn require_article(&self) -> Result<&Article> {
        self.article
            .as_ref()
            .ok_or_else(|| ArgdecError::Session("no article submitted yet".to_string()))
    }

    /// Install the completed analysis. Claims, annotated text and pairs
    /// arrive together so the index alignment between them can never be
    /// observed half-applied.
    pub fn apply_analysis(&mut self, analysis: Analysis) {
        debug_assert_eq!(analysis.claims.len(), analysis.pairs.len());
        self.analysis = Some(analysis);
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Record a heart/dislike on a counterargument pair. Append-only, no
    /// further semantics.
    pub fn record_pair_reaction(&mut self, pair_index: usize, reaction: PairReaction) -> Result<()> {
        let pairs = self
            .analysis
            .as_ref()
            .map(|a| a.pairs.len())
            .unwrap_or_default();
        if pair_index >= pairs {
            return Err(ArgdecError::Session(format!(
                "no counterargument pair at index {pair_index}"
            )));
        }
        self.pair_reactions.push((pair_index, reaction));
        Ok(())
    }

    pub fn pair_reactions(&self) -> &[(usize, PairReaction)] {
        &self.pair_reactions
    }

    /// Point-in-time copy of everything a calling surface renders.
    pub fn snapshot(&self) -> SessionView {
        SessionView {
            submitted: self.article.is_some(),
            annotated: self.analysis.as_ref().map(|a| a.annotated.clone()),
            pairs: self
                .analysis
                .as_ref()
                .map(|a| a.pairs.clone())
                .unwrap_or_default(),
            qa_visible: self.qa.is_visible(),
            qa_log: self.qa.log().to_vec(),
            debate_visible: self.debate.is_visible(),
            debate_log: self.debate.log().to_vec(),
            debate_reactions: self.debate.reactions().to_vec(),
        }
    }
}

/// Render-ready copy of the session, decoupled from the live aggregate.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub submitted: bool,
    pub annotated: Option<String>,
    pub pairs: Vec<CounterargumentPair>,
    pub qa_visible: bool,
    pub qa_log: Vec<ChatMessage>,
    pub debate_visible: bool,
    pub debate_log: Vec<ChatMessage>,
    pub debate_reactions: Vec<ReactionEvent>,
}

//! Conversation thread state machines.
//!
//! Both threads move `Hidden -> Visible(empty) -> Visible(N turns)`.
//! Hiding the debate thread clears its log and reactions and bumps its
//! epoch so any in-flight completion for the old log is discarded on
//! arrival; hiding the Q&A thread preserves its log. The asymmetry is
//! intentional and mirrors the two surfaces' distinct roles.

use argdec_common::ChatMessage;

/// User reaction to a debate response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Up,
    Down,
}

/// A reaction dispatched at the debate thread: the kind plus the index of
/// the log entry it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionEvent {
    pub kind: Reaction,
    pub target: usize,
}

/// The Q&A thread: visibility plus an ordered message log that survives
/// hide/show cycles.
#[derive(Debug, Default)]
pub struct QaThread {
    visible: bool,
    log: Vec<ChatMessage>,
}

impl QaThread {
    /// Flip visibility. The log is untouched either way.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Append one completed round-trip: the user turn and the reply.
    pub fn append_turn(&mut self, user_text: String, assistant_text: String) {
        self.log.push(ChatMessage::user(user_text));
        self.log.push(ChatMessage::assistant(assistant_text));
    }
}

/// The debate thread: log, append-only reaction history, the most recent
/// assistant reply, and an epoch that invalidates in-flight work when the
/// thread is cleared.
#[derive(Debug, Default)]
pub struct DebateThread {
    visible: bool,
    log: Vec<ChatMessage>,
    reactions: Vec<ReactionEvent>,
    previous_response: Option<String>,
    epoch: u64,
}

impl DebateThread {
    /// Flip visibility. Hiding is an explicit clear: log, reactions and
    /// the remembered previous response are discarded and the epoch moves
    /// on so late completions for the old log get dropped.
    pub fn toggle(&mut self) -> bool {
        if self.visible {
            self.log.clear();
            self.reactions.clear();
            self.previous_response = None;
            self.epoch += 1;
        }
        self.visible = !self.visible;
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    pub fn reactions(&self) -> &[ReactionEvent] {
        &self.reactions
    }

    pub fn previous_response(&self) -> Option<&str> {
        self.previous_response.as_deref()
    }

    /// Epoch current at the time a request is launched; compare on
    /// completion before applying.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Append one completed round-trip and remember the reply as the
    /// distinguished previous response.
    pub fn append_turn(&mut self, user_text: String, assistant_text: String) {
        self.log.push(ChatMessage::user(user_text));
        self.previous_response = Some(assistant_text.clone());
        self.log.push(ChatMessage::assistant(assistant_text));
    }

    /// Append a regenerated rebuttal as a fresh assistant-only entry.
    /// Prior entries are never removed or superseded.
    pub fn append_regeneration(&mut self, assistant_text: String) {
        self.previous_response = Some(assistant_text.clone());
        self.log.push(ChatMessage::assistant(assistant_text));
    }

    /// Record a reaction against a log entry. History is append-only.
    pub fn record_reaction(&mut self, event: ReactionEvent) {
        self.reactions.push(event);
    }
}

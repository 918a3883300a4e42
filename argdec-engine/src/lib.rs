//! Prompt-orchestration and conversation-state engine for Argdec.
//!
//! A submitted news article flows through claim extraction, span
//! highlighting and counterargument generation; three independently
//! stateful conversation surfaces (Q&A, debate, highlight lookup) and a
//! one-shot context enricher hang off the same session. All state lives in
//! a [`session::SessionState`] aggregate owned by one
//! [`session_actor::SessionActor`] per user session.

pub mod actor;
pub mod claims;
pub mod enrich;
pub mod highlight;
pub mod prompts;
pub mod rebuttal;
pub mod session;
pub mod session_actor;
pub mod thread;

//! Prompt construction for every completion call site.
//!
//! The six call sites share fixed generation options and differ only in the
//! messages built here (and in which configured model they address). Keeping
//! the wording in one module makes the orchestration code read as sequencing
//! rather than string assembly.

use argdec_common::ChatMessage;

/// Claim detection against the fine-tuned extraction model.
pub fn claim_extraction(article: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Argdec is a chatbot that detects claims in a news article and \
         returns them as it is. Here is the news article: {article}"
    ))]
}

/// One persuasive rebuttal for a single extracted claim.
pub fn counterargument(claim: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "For the following argument: {claim} generate a brief but \
         persuasive counterargument. Think about latest events, historical \
         events, and other things you know and answer accordingly. Don't \
         use the same example again and again, use a variety of ideas. Do \
         not exceed 200 words."
    ))]
}

/// A Q&A turn grounded in the submitted article.
///
/// The raw user text travels as the user message; the grounding frame
/// rides along as an assistant-role message, embedding the article and
/// restating the question as "According to the author, ...".
pub fn qa_turn(article: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::user(question),
        ChatMessage::assistant(format!(
            "You are an assistant for question-answering tasks. This is \
             some context: {article}. Based on the context, answer this \
             question: Question: According to the author, {question}."
        )),
    ]
}

/// A debate turn: argue against the stance implied by the user's text.
pub fn debate_turn(stance: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::user(stance),
        ChatMessage::assistant(format!(
            "The following is a debate between a human and an AI. The AI \
             is talkative and provides lots of specific details from its \
             context. The user perspective is {stance}. Argue against it \
             with evidence, facts, examples, anecdotes, and other \
             persuasive tricks to convince the user of your stance"
        )),
    ]
}

/// Regenerate a rebuttal the user marked as unpersuasive, same side.
pub fn debate_regeneration(previous_response: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "This is not persuasive to me {previous_response}. Persuade me \
         using a different method, but on the same side."
    ))]
}

/// Two-line summary plus external background for the whole article.
pub fn context_enrichment(article: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Here is an article: {article}. First provide a summary of the \
         article in 2 lines. Then based on whatever you know about the \
         topic, generate additional context that would be useful for the \
         user to get context on the article. Do not use things from the \
         article for the context. Use external knowledge you have about \
         recent events, historical events, etc to put out a context. \
         Overall, do not exceed 200 words under any condition."
    ))]
}

/// Explain a user-selected span: define a single word, otherwise give
/// general background. The selection is untrusted opaque text.
pub fn highlight_lookup(selection: &str) -> Vec<ChatMessage> {
    let instruction = if selection.split_whitespace().count() == 1 {
        "If it's one word, provide its definition."
    } else {
        "Use your knowledge to give context about that to me."
    };
    vec![ChatMessage::user(format!(
        "Here is a highlighted text by me: {selection}. {instruction} Be \
         under 200 words."
    ))]
}

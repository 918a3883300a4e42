//! Span highlighting: locate each claim's match form in the article and
//! wrap every occurrence in a highlight marker.
//!
//! The pass is sequential and order-dependent: each claim's replacement
//! runs against the working copy left by its predecessors, so the result
//! is not idempotent. Claims whose match form never appears in the
//! original article are skipped silently. Occurrences already inside a
//! marker from an earlier claim are never re-wrapped.

use crate::claims::Claim;

pub const HIGHLIGHT_OPEN: &str = "<mark>";
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// Produce the annotated article: every case-insensitive occurrence of a
/// claim's match form is wrapped in a highlight marker carrying the
/// original claim text.
///
/// Containment is checked case-sensitively against the original article;
/// replacement is case-insensitive against the accumulating working copy.
pub fn annotate(article: &str, claims: &[Claim]) -> String {
    let mut working = article.to_string();
    for claim in claims {
        let needle = claim.match_form();
        if needle.is_empty() {
            continue;
        }
        if !article.contains(needle) {
            tracing::debug!(claim = %claim.text(), "highlight.no_match");
            continue;
        }
        let replacement = format!("{HIGHLIGHT_OPEN}{}{HIGHLIGHT_CLOSE}", claim.text());
        working = replace_all_outside_markers(&working, needle, &replacement);
    }
    working
}

/// Replace every ASCII-case-insensitive occurrence of `needle`, skipping
/// any text that already sits inside a highlight marker.
fn replace_all_outside_markers(haystack: &str, needle: &str, replacement: &str) -> String {
    let hay = haystack.as_bytes();
    let nee = needle.as_bytes();
    let mut out = String::with_capacity(haystack.len());
    let mut i = 0;
    let mut depth = 0usize;

    while i < hay.len() {
        let rest = &haystack[i..];
        if rest.starts_with(HIGHLIGHT_OPEN) {
            depth += 1;
            out.push_str(HIGHLIGHT_OPEN);
            i += HIGHLIGHT_OPEN.len();
            continue;
        }
        if rest.starts_with(HIGHLIGHT_CLOSE) {
            depth = depth.saturating_sub(1);
            out.push_str(HIGHLIGHT_CLOSE);
            i += HIGHLIGHT_CLOSE.len();
            continue;
        }
        if depth == 0
            && i + nee.len() <= hay.len()
            && hay[i..i + nee.len()].eq_ignore_ascii_case(nee)
        {
            out.push_str(replacement);
            i += nee.len();
            continue;
        }
        // Advance one character, preserving it verbatim.
        let ch = rest.chars().next().unwrap_or('\u{FFFD}');
        let len = ch.len_utf8();
        out.push_str(&haystack[i..i + len]);
        i += len;
    }

    out
}

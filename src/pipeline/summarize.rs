//! Summarization with a subject-echo guard.
//!
//! The generator is asked not to restate the subject; when it does anyway,
//! the generated summary is discarded and a truncation of the body is
//! substituted. Generation failures are fatal by design — a digest with
//! silently blank summaries is worse than no digest.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::LlmError;
use crate::llm::TextGenerator;

/// Sentinel for messages with no usable body text.
pub const SUMMARY_UNAVAILABLE: &str = "Summary not available.";

const SUMMARY_PROMPT: &str =
    "Summarise the email in 1-2 sentences. **Do not** repeat the subject.";

/// Body preview length fed to the generator.
const BODY_PREVIEW_WIDTH: usize = 1200;

/// Length bound of the fallback truncation when the echo guard fires.
const FALLBACK_WIDTH: usize = 180;

/// How much of the normalized subject the echo guard compares.
const SUBJECT_PREFIX_CHARS: usize = 30;

/// Produces a short synopsis of a message body.
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarize `body_text` in 1-2 sentences.
    ///
    /// Empty body → sentinel, no external call. Generator failure
    /// propagates and aborts the run.
    pub async fn summarize(&self, subject: &str, body_text: &str) -> Result<String, LlmError> {
        if body_text.is_empty() {
            return Ok(SUMMARY_UNAVAILABLE.to_string());
        }

        let preview = shorten(body_text, BODY_PREVIEW_WIDTH);
        let summary = match self.generator.generate(SUMMARY_PROMPT, &preview).await {
            Ok(text) => text,
            Err(e) => {
                error!(subject, error = %e, "Summarization failed");
                return Err(e);
            }
        };

        // Echo guard: compare normalized summary against the first 30
        // chars of the normalized subject.
        let subject_norm = normalize_for_compare(subject);
        let summary_norm = normalize_for_compare(&summary);
        let prefix: String = subject_norm.chars().take(SUBJECT_PREFIX_CHARS).collect();
        if !prefix.is_empty() && summary_norm.starts_with(&prefix) {
            debug!(subject, "Summary echoes the subject — substituting body truncation");
            let fallback = shorten(body_text, FALLBACK_WIDTH);
            if fallback.is_empty() {
                return Ok(SUMMARY_UNAVAILABLE.to_string());
            }
            return Ok(fallback);
        }

        Ok(summary)
    }
}

/// Lowercase and drop everything but word characters.
fn normalize_for_compare(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Collapse whitespace and bound `text` to `width` chars, cutting at a
/// word boundary and appending `" …"` when truncated.
pub(crate) fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let joined = words.join(" ");
    if joined.chars().count() <= width {
        return joined;
    }

    let mut out = String::new();
    let mut out_chars = 0;
    for word in &words {
        let word_chars = word.chars().count();
        let candidate = if out.is_empty() {
            word_chars
        } else {
            out_chars + 1 + word_chars
        };
        // Leave room for the 2-char " …" placeholder.
        if candidate + 2 > width {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        out_chars = candidate;
    }

    if out.is_empty() {
        return "…".to_string();
    }
    out.push_str(" …");
    out
}

//! The digest pipeline — fetch → normalize → summarize → classify →
//! assemble → emit.
//!
//! One run processes the whole fetched window strictly in fetch order,
//! sequentially: a message is normalized, summarized and recorded before
//! the next one is touched. Auth, transport and summarization errors
//! propagate to the caller; the logging sink is best-effort.

pub mod assemble;
pub mod classify;
pub mod followup;
pub mod normalize;
pub mod render;
pub mod summarize;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::config::DigestConfig;
use crate::error::Result;
use crate::mailbox::{Mailbox, compose_digest_email};
use crate::notion::NotionLogger;
use crate::pipeline::assemble::{Assembler, group_by_category};
use crate::pipeline::classify::Classifier;
use crate::pipeline::normalize::normalize;
use crate::pipeline::render::{DIGEST_SUBJECT_PREFIX, digest_subject, render_html, strip_html};
use crate::pipeline::summarize::Summarizer;

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub total: usize,
    pub important: usize,
    pub attachments: usize,
    pub followups: usize,
}

/// Wires the components together for one run.
pub struct DigestPipeline {
    mailbox: Arc<dyn Mailbox>,
    summarizer: Summarizer,
    classifier: Classifier,
    assembler: Assembler,
    notion: Option<NotionLogger>,
    config: DigestConfig,
}

impl DigestPipeline {
    pub fn new(
        mailbox: Arc<dyn Mailbox>,
        summarizer: Summarizer,
        classifier: Classifier,
        assembler: Assembler,
        notion: Option<NotionLogger>,
        config: DigestConfig,
    ) -> Self {
        Self {
            mailbox,
            summarizer,
            classifier,
            assembler,
            notion,
            config,
        }
    }

    /// Run the full pipeline once: exactly one email on success.
    pub async fn run(&self) -> Result<RunSummary> {
        let ids = self.mailbox.list_message_ids().await?;
        info!(count = ids.len(), "Fetched message window");

        let mut messages = Vec::new();
        let mut seen_subjects: HashSet<String> = HashSet::new();
        for id in &ids {
            let raw = self.mailbox.fetch_message(id).await?;
            let mut message = normalize(&raw);

            // Skip the digests we send ourselves.
            if message.subject.starts_with(DIGEST_SUBJECT_PREFIX) {
                debug!(id = %id, "Skipping self-digest");
                continue;
            }
            // Exact-subject duplicates: first occurrence wins.
            if !seen_subjects.insert(message.subject.clone()) {
                debug!(id = %id, subject = %message.subject, "Skipping duplicate subject");
                continue;
            }

            // Summarization input falls back from body to snippet to subject.
            let body = if !message.body_text.is_empty() {
                message.body_text.clone()
            } else if !message.snippet.is_empty() {
                message.snippet.clone()
            } else {
                message.subject.clone()
            };
            let summary = self.summarizer.summarize(&message.subject, &body).await?;
            message.summary = Some(summary);
            messages.push(message);
        }

        let groups = group_by_category(&self.classifier, messages);
        let content = self.assembler.assemble(&groups);

        let today = Local::now().format("%d/%m/%Y").to_string();
        let html = render_html(&content, &today);
        let subject = digest_subject(&today);

        let mime = compose_digest_email(&self.config.send_to, &subject, strip_html(&html), html.clone())?;
        self.mailbox.send_raw(&mime).await?;
        info!(to = %self.config.send_to, total = content.overview.total, "Digest emailed");

        // Logging sink runs only after the send, and never fails the run.
        if let Some(ref logger) = self.notion {
            let title = format!("Digest {}", Local::now().date_naive());
            if let Err(e) = logger.log_digest(&title, &html).await {
                warn!(error = %e, "Notion logging failed — digest was still emailed");
            }
        }

        Ok(RunSummary {
            total: content.overview.total,
            important: content.overview.important,
            attachments: content.overview.attachments,
            followups: content.followups.len(),
        })
    }
}

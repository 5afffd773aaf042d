//! Digest assembly — grouping, reference numbers, cards, attachment and
//! follow-up lists, and suggestions.

use chrono::NaiveDateTime;
use html_escape::encode_text;

use crate::pipeline::classify::{Category, Classifier};
use crate::pipeline::followup::{FollowUpAction, FollowUpDetector};
use crate::pipeline::normalize::NormalizedMessage;
use crate::pipeline::summarize::SUMMARY_UNAVAILABLE;

/// Inline style for each message card.
const CARD_CSS: &str = "margin:8px 0;padding:12px;border:1px solid #e0e0e0;border-radius:8px;";

/// Expected date-header shape; anything else drops the date silently.
const DATE_HEADER_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// How many chars of the date header are considered when parsing.
const DATE_HEADER_PREFIX: usize = 25;

/// A detected follow-up, linked to its card by reference tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpItem {
    pub reference: String,
    pub action: FollowUpAction,
    pub subject: String,
}

/// One attachment, linked to its owning card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentEntry {
    pub filename: String,
    pub reference: String,
    pub sender: String,
}

/// Digest-level counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overview {
    pub total: usize,
    pub important: usize,
    pub attachments: usize,
}

/// Everything the renderer needs for the final document.
#[derive(Debug, Clone)]
pub struct DigestContent {
    /// Category headings and message cards, already HTML.
    pub sections_html: String,
    pub attachments: Vec<AttachmentEntry>,
    pub followups: Vec<FollowUpItem>,
    pub suggestions: Vec<String>,
    pub overview: Overview,
}

/// Group classified messages in the fixed display order, dropping empty
/// groups. Order within a group is classification (fetch) order.
pub fn group_by_category(
    classifier: &Classifier,
    messages: Vec<NormalizedMessage>,
) -> Vec<(Category, Vec<NormalizedMessage>)> {
    let mut buckets: Vec<(Category, Vec<NormalizedMessage>)> = Category::DISPLAY_ORDER
        .iter()
        .map(|c| (*c, Vec::new()))
        .collect();

    for message in messages {
        let category = classifier.classify(&message);
        if let Some((_, bucket)) = buckets.iter_mut().find(|(c, _)| *c == category) {
            bucket.push(message);
        }
    }

    buckets.retain(|(_, bucket)| !bucket.is_empty());
    buckets
}

/// Turns grouped messages into rendered sections plus the derived lists.
pub struct Assembler {
    detector: FollowUpDetector,
}

impl Assembler {
    pub fn new(detector: FollowUpDetector) -> Self {
        Self { detector }
    }

    /// Walk the groups once, assigning reference numbers and collecting
    /// cards, attachments and follow-ups as we go.
    pub fn assemble(&self, groups: &[(Category, Vec<NormalizedMessage>)]) -> DigestContent {
        let mut sections = Vec::new();
        let mut attachments = Vec::new();
        let mut followups = Vec::new();
        let mut total = 0;
        let mut important = 0;
        let mut ref_no = 1usize;

        for (category, items) in groups {
            let mut segment = vec![format!("<h3>{}</h3>", category.label())];
            for message in items {
                let reference = format!("[{ref_no:02}]");
                let summary = message.summary.as_deref().unwrap_or(SUMMARY_UNAVAILABLE);

                let date_part = format_date(&message.date)
                    .map(|d| format!("({d})"))
                    .unwrap_or_default();
                let header = format!(
                    "{reference} {} — {} {date_part}",
                    encode_text(&message.subject),
                    encode_text(&message.sender),
                );
                segment.push(format!(
                    "<div style=\"{CARD_CSS}\"><div style=\"font-weight:bold;\">{header}</div>\
                     <div style=\"color:#555;margin-top:4px;\">{}</div></div>",
                    encode_text(summary),
                ));

                for filename in &message.attachments {
                    attachments.push(AttachmentEntry {
                        filename: filename.clone(),
                        reference: reference.clone(),
                        sender: message.sender.clone(),
                    });
                }

                if let Some(action) = self.detector.detect(message, summary) {
                    followups.push(FollowUpItem {
                        reference: reference.clone(),
                        action,
                        subject: message.subject.clone(),
                    });
                }

                total += 1;
                if message.important {
                    important += 1;
                }
                ref_no += 1;
            }
            sections.push(segment.join("\n"));
        }

        let overview = Overview {
            total,
            important,
            attachments: attachments.len(),
        };
        let suggestions = build_suggestions(groups, &followups, attachments.len());

        DigestContent {
            sections_html: sections.join("\n"),
            attachments,
            followups,
            suggestions,
            overview,
        }
    }
}

/// Parse the date header against the one expected format; `None` simply
/// omits the date from the card header.
fn format_date(raw: &str) -> Option<String> {
    let head: String = raw.chars().take(DATE_HEADER_PREFIX).collect();
    NaiveDateTime::parse_from_str(&head, DATE_HEADER_FORMAT)
        .ok()
        .map(|dt| dt.format("%d/%m/%Y").to_string())
}

/// Suggestion rules accumulate independently, in declaration order.
fn build_suggestions(
    groups: &[(Category, Vec<NormalizedMessage>)],
    followups: &[FollowUpItem],
    attachment_count: usize,
) -> Vec<String> {
    let has = |category: Category| groups.iter().any(|(c, _)| *c == category);

    let mut suggestions = Vec::new();
    if has(Category::Activities) {
        suggestions.push("Mark upcoming sports / activity dates on the calendar.".to_string());
    }
    if has(Category::PurchasesOffers) {
        suggestions.push("Consider unsubscribing from promotional newsletters.".to_string());
    }
    if attachment_count > 0 {
        suggestions.push("Download and file important attachments.".to_string());
    }
    if !followups.is_empty() {
        suggestions.push("Schedule time today to clear pending follow-ups.".to_string());
    }
    if suggestions.is_empty() {
        suggestions.push("Inbox looks good today — no suggestions!".to_string());
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: &str, sender: &str) -> NormalizedMessage {
        NormalizedMessage {
            id: subject.into(),
            subject: subject.into(),
            sender: sender.into(),
            date: String::new(),
            important: false,
            snippet: String::new(),
            attachments: vec![],
            body_text: String::new(),
            summary: Some("A summary.".into()),
        }
    }

    fn assembler() -> Assembler {
        Assembler::new(FollowUpDetector::default_rules())
    }

    // ── Grouping ────────────────────────────────────────────────────

    #[test]
    fn groups_follow_display_order_and_skip_empty() {
        let classifier = Classifier::default_rules();
        let messages = vec![
            message("random note", "friend@somewhere.com"), // Personal
            message("Soccer tryouts", "coach@club.org"),    // Activities
        ];
        let groups = group_by_category(&classifier, messages);
        let order: Vec<_> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![Category::Activities, Category::Personal]);
    }

    #[test]
    fn group_members_keep_fetch_order() {
        let classifier = Classifier::default_rules();
        let messages = vec![
            message("Soccer tryouts", "coach@club.org"),
            message("Soccer schedule", "coach@club.org"),
        ];
        let groups = group_by_category(&classifier, messages);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1[0].subject, "Soccer tryouts");
        assert_eq!(groups[0].1[1].subject, "Soccer schedule");
    }

    // ── Reference numbers ───────────────────────────────────────────

    #[test]
    fn reference_numbers_increase_across_groups() {
        let classifier = Classifier::default_rules();
        let messages = vec![
            message("Soccer tryouts", "coach@club.org"),
            message("Invoice #1", "billing@vendor.com"),
            message("hello", "friend@somewhere.com"),
        ];
        let groups = group_by_category(&classifier, messages);
        let content = assembler().assemble(&groups);
        assert_eq!(content.overview.total, 3);
        assert!(content.sections_html.contains("[01]"));
        assert!(content.sections_html.contains("[02]"));
        assert!(content.sections_html.contains("[03]"));
        assert!(!content.sections_html.contains("[04]"));
    }

    #[test]
    fn reference_tags_are_zero_padded() {
        let classifier = Classifier::default_rules();
        let messages = vec![message("hello", "friend@somewhere.com")];
        let groups = group_by_category(&classifier, messages);
        let content = assembler().assemble(&groups);
        assert!(content.sections_html.contains("[01] hello"));
    }

    // ── Dates ───────────────────────────────────────────────────────

    #[test]
    fn well_formed_date_is_rendered() {
        assert_eq!(
            format_date("Mon, 04 Aug 2025 10:30:00 +0000"),
            Some("04/08/2025".to_string())
        );
    }

    #[test]
    fn malformed_date_is_omitted() {
        assert_eq!(format_date("2025-08-04T10:30:00Z"), None);
        assert_eq!(format_date(""), None);
    }

    #[test]
    fn card_omits_date_on_parse_failure() {
        let classifier = Classifier::default_rules();
        let mut msg = message("hello", "friend@somewhere.com");
        msg.date = "not a date".into();
        let groups = group_by_category(&classifier, vec![msg]);
        let content = assembler().assemble(&groups);
        assert!(!content.sections_html.contains("(not a date)"));
        assert!(content.sections_html.contains("[01] hello"));
    }

    // ── Attachments & follow-ups ────────────────────────────────────

    #[test]
    fn attachments_carry_reference_and_sender() {
        let classifier = Classifier::default_rules();
        let mut msg = message("hello", "friend@somewhere.com");
        msg.attachments = vec!["a.pdf".into(), "b.png".into()];
        let groups = group_by_category(&classifier, vec![msg]);
        let content = assembler().assemble(&groups);
        assert_eq!(content.attachments.len(), 2);
        assert_eq!(content.attachments[0].filename, "a.pdf");
        assert_eq!(content.attachments[0].reference, "[01]");
        assert_eq!(content.attachments[0].sender, "friend@somewhere.com");
        assert_eq!(content.attachments[1].filename, "b.png");
        assert_eq!(content.overview.attachments, 2);
    }

    #[test]
    fn followups_collected_per_message() {
        let classifier = Classifier::default_rules();
        let mut msg = message("Invoice #4521", "billing@vendor.com");
        msg.summary = Some("Please reply to confirm receipt.".into());
        let groups = group_by_category(&classifier, vec![msg]);
        let content = assembler().assemble(&groups);
        assert_eq!(content.followups.len(), 1);
        assert_eq!(content.followups[0].action, FollowUpAction::SendReply);
        assert_eq!(content.followups[0].reference, "[01]");
    }

    #[test]
    fn important_messages_counted() {
        let classifier = Classifier::default_rules();
        let mut msg = message("hello", "friend@somewhere.com");
        msg.important = true;
        let groups = group_by_category(&classifier, vec![msg]);
        let content = assembler().assemble(&groups);
        assert_eq!(content.overview.important, 1);
    }

    #[test]
    fn subject_is_html_escaped_in_cards() {
        let classifier = Classifier::default_rules();
        let msg = message("a <b> & c", "friend@somewhere.com");
        let groups = group_by_category(&classifier, vec![msg]);
        let content = assembler().assemble(&groups);
        assert!(content.sections_html.contains("a &lt;b&gt; &amp; c"));
    }

    // ── Suggestions ─────────────────────────────────────────────────

    #[test]
    fn suggestions_accumulate_in_rule_order() {
        let classifier = Classifier::default_rules();
        let mut activity = message("Soccer tryouts", "coach@club.org");
        activity.attachments = vec!["schedule.pdf".into()];
        let mut invoice = message("Invoice #4521", "billing@vendor.com");
        invoice.summary = Some("Please reply to confirm receipt.".into());
        let groups = group_by_category(&classifier, vec![activity, invoice]);
        let content = assembler().assemble(&groups);
        assert_eq!(
            content.suggestions,
            vec![
                "Mark upcoming sports / activity dates on the calendar.",
                "Download and file important attachments.",
                "Schedule time today to clear pending follow-ups.",
            ]
        );
    }

    #[test]
    fn purchases_trigger_unsubscribe_suggestion() {
        let classifier = Classifier::default_rules();
        let groups =
            group_by_category(&classifier, vec![message("Special offer", "shop@store.com")]);
        let content = assembler().assemble(&groups);
        assert!(content
            .suggestions
            .iter()
            .any(|s| s.contains("unsubscribing")));
    }

    #[test]
    fn no_rules_fired_yields_positive_fallback() {
        let classifier = Classifier::default_rules();
        let groups = group_by_category(&classifier, vec![message("hello", "friend@x.com")]);
        let content = assembler().assemble(&groups);
        assert_eq!(
            content.suggestions,
            vec!["Inbox looks good today — no suggestions!"]
        );
    }
}

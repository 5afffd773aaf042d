//! HTML rendering of the assembled digest.
//!
//! The document structure (title, Overview, per-category sections,
//! Action Items, Attachments, Suggestions) is load-bearing: the logging
//! sink's plain-text heading detector keys off these heading shapes.

use html_escape::encode_text;

use crate::pipeline::assemble::DigestContent;

/// Subject prefix of every digest we send — also the self-digest
/// exclusion marker on the fetch side.
pub const DIGEST_SUBJECT_PREFIX: &str = "📬 Daily Inbox Digest";

/// Subject line for a digest dated `today` (DD/MM/YYYY).
pub fn digest_subject(today: &str) -> String {
    format!("{DIGEST_SUBJECT_PREFIX} — {today}")
}

/// Render the complete HTML document.
pub fn render_html(content: &DigestContent, today: &str) -> String {
    let action_items: String = content
        .followups
        .iter()
        .map(|fu| {
            format!(
                "<li>[Action: {}] {} {}</li>",
                fu.action.label(),
                fu.reference,
                encode_text(&fu.subject),
            )
        })
        .collect();
    let action_items = if action_items.is_empty() {
        "<li>None</li>".to_string()
    } else {
        action_items
    };

    let attachments: String = content
        .attachments
        .iter()
        .map(|a| {
            format!(
                "<li>{} — {} — {}</li>",
                encode_text(&a.filename),
                a.reference,
                encode_text(&a.sender),
            )
        })
        .collect();
    let attachments = if attachments.is_empty() {
        "<li>None</li>".to_string()
    } else {
        attachments
    };

    let suggestions: String = content
        .suggestions
        .iter()
        .map(|s| format!("<li>{}</li>", encode_text(s)))
        .collect();

    let overview = &content.overview;
    format!(
        r#"
    <html><body style="font-family:Helvetica,Arial;background:#f6f8fa;padding:24px;">
      <div style="max-width:680px;margin:auto;background:#fff;padding:24px;border-radius:12px;">
        <h2 style="margin-top:0">{DIGEST_SUBJECT_PREFIX} <span style="font-size:14px;color:#888">— {today}</span></h2>
        <h3>📊 Overview</h3>
        <ul><li>Total: {total} | Important: {important} | Attachments: {attach}</li></ul>
        {sections}
        <h3>📝 Action Items</h3>
        <ul>{action_items}</ul>
        <h3>📎 Attachments</h3>
        <ul>{attachments}</ul>
        <h3>🤖 Suggestions</h3>
        <ul>{suggestions}</ul>
      </div></body></html>"#,
        total = overview.total,
        important = overview.important,
        attach = overview.attachments,
        sections = content.sections_html,
    )
}

/// Plain-text rendition of an HTML fragment: tags removed, entities
/// decoded, outer whitespace trimmed. Used for the alternative MIME part
/// and by the logging sink.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&out).trim().to_string()
}

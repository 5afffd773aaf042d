//! Message normalization — raw mailbox payloads to canonical records.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::mailbox::types::{MessagePart, RawMessage};

/// Placeholder for messages without a subject header.
pub const MISSING_SUBJECT: &str = "(no subject)";

/// Mailbox body data is base64url, with or without padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Canonical per-message record. Immutable once created, except for
/// `summary` which the summarizer fills in afterwards.
#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    /// Opaque identifier from the source mailbox.
    pub id: String,
    /// Subject line, or [`MISSING_SUBJECT`].
    pub subject: String,
    /// Bare sender address, display name stripped.
    pub sender: String,
    /// Raw date header value — format not guaranteed uniform.
    pub date: String,
    /// Importance flag from the mailbox labels.
    pub important: bool,
    /// Short plain-text preview, HTML entities decoded.
    pub snippet: String,
    /// Attachment filenames in depth-first part order.
    pub attachments: Vec<String>,
    /// All text-bearing parts, newline-joined in traversal order.
    pub body_text: String,
    /// Set by the summarizer; `None` before.
    pub summary: Option<String>,
}

/// Convert one raw fetched message into a canonical record.
pub fn normalize(raw: &RawMessage) -> NormalizedMessage {
    let subject = raw
        .header("subject")
        .unwrap_or(MISSING_SUBJECT)
        .to_string();
    let sender = extract_address(raw.header("from").unwrap_or(""));
    let date = raw.header("date").unwrap_or("").to_string();
    let snippet = html_escape::decode_html_entities(&raw.snippet).into_owned();

    let parts = raw.payload.as_ref().map(|p| &p.parts[..]).unwrap_or(&[]);
    let mut attachments = Vec::new();
    collect_attachments(parts, &mut attachments);
    let mut texts = Vec::new();
    collect_text(parts, &mut texts);

    NormalizedMessage {
        id: raw.id.clone(),
        subject,
        sender,
        date,
        important: raw.is_important(),
        snippet,
        attachments,
        body_text: texts.join("\n"),
        summary: None,
    }
}

/// Extract the bare address from a `From` header value.
///
/// Handles display names, quoting and RFC 2047 encoded-words; an
/// unparseable value yields an empty sender.
fn extract_address(from: &str) -> String {
    let raw = format!("From: {from}\r\n\r\n");
    mail_parser::MessageParser::default()
        .parse(raw.as_bytes())
        .and_then(|parsed| {
            parsed
                .from()
                .and_then(|addr| addr.first())
                .and_then(|a| a.address())
                .map(|s| s.to_string())
        })
        .unwrap_or_default()
}

/// Depth-first, left-to-right filename collection over the part tree.
/// Every declared filename counts, regardless of content type.
fn collect_attachments(parts: &[MessagePart], files: &mut Vec<String>) {
    for part in parts {
        if !part.filename.is_empty() {
            files.push(part.filename.clone());
        }
        collect_attachments(&part.parts, files);
    }
}

/// Depth-first text extraction: a part contributes its decoded payload
/// only if it declares a plain-text or HTML content type and carries
/// inline data. HTML is tag-stripped; entities stay encoded here.
fn collect_text(parts: &[MessagePart], texts: &mut Vec<String>) {
    for part in parts {
        if matches!(part.mime_type.as_str(), "text/plain" | "text/html")
            && let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref())
            && let Ok(bytes) = URL_SAFE_LENIENT.decode(data)
        {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            if part.mime_type == "text/html" {
                texts.push(strip_tags(&text));
            } else {
                texts.push(text);
            }
        }
        collect_text(&part.parts, texts);
    }
}

/// Replace each `<...>` tag with a single space. Not a full parser.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

//! Notion logging sink — a structured copy of the digest, best-effort.
//!
//! The digest HTML is flattened to plain text; lines that look like
//! headings become `heading_2` blocks, everything else becomes bulleted
//! list items chunked under Notion's rich-text size limit.

use std::sync::LazyLock;

use regex::Regex;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::info;

use crate::error::NotionError;
use crate::pipeline::render::strip_html;

const PAGES_URL: &str = "https://api.notion.com/v1/pages";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion rich-text blocks cap out around 2k chars.
const BLOCK_CHUNK_CHARS: usize = 1900;

/// Pages are created with at most this many blocks.
const MAX_BLOCKS: usize = 50;

/// A heading starts with one of the digest's section glyphs or a
/// capitalized word.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[📊📝📎🤖]|^[A-Z][a-z]+").unwrap());

/// Sink configuration; absent env vars disable logging entirely.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub secret: secrecy::SecretString,
    pub database_id: String,
}

impl NotionConfig {
    /// Build config from `NOTION_SECRET` + `NOTION_DB_ID`.
    /// Returns `None` unless both are set (sink disabled).
    pub fn from_env() -> Option<Self> {
        let secret = std::env::var("NOTION_SECRET").ok()?;
        let database_id = std::env::var("NOTION_DB_ID").ok()?;
        Some(Self {
            secret: secrecy::SecretString::from(secret),
            database_id,
        })
    }
}

/// Creates one database page per digest.
pub struct NotionLogger {
    config: NotionConfig,
    http: reqwest::Client,
}

impl NotionLogger {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Create a page titled `title` holding the digest as blocks.
    pub async fn log_digest(&self, title: &str, html_digest: &str) -> Result<(), NotionError> {
        let blocks = blocks_from_html(html_digest);
        let capped = &blocks[..blocks.len().min(MAX_BLOCKS)];

        let payload = json!({
            "parent": {"database_id": self.config.database_id},
            "properties": {
                "Name": {"title": [{"text": {"content": title}}]}
            },
            "children": capped,
        });

        let resp = self
            .http
            .post(PAGES_URL)
            .bearer_auth(self.config.secret.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(NotionError::PageCreateFailed {
                status: status.as_u16(),
                detail,
            });
        }

        info!(title, blocks = capped.len(), "Digest logged to Notion");
        Ok(())
    }
}

/// Flatten digest HTML into Notion block objects.
///
/// Lines keep their original indentation — the heading pattern only
/// fires on lines that start at column zero, which is exactly the shape
/// the renderer emits for category headings.
fn blocks_from_html(html_digest: &str) -> Vec<Value> {
    let text = strip_html(html_digest);
    let mut blocks = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if HEADING.is_match(line) {
            blocks.push(json!({
                "object": "block",
                "type": "heading_2",
                "heading_2": {"rich_text": [{"type": "text", "text": {"content": line}}]}
            }));
        } else {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(BLOCK_CHUNK_CHARS) {
                let content: String = chunk.iter().collect();
                blocks.push(json!({
                    "object": "block",
                    "type": "bulleted_list_item",
                    "bulleted_list_item": {"rich_text": [{"type": "text", "text": {"content": content}}]}
                }));
            }
        }
    }

    blocks
}

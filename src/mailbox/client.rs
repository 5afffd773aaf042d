//! Gmail REST v1 client — message listing, full fetch, and raw send.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::Utc;
use lettre::Message;
use lettre::message::{Mailbox as Address, MultiPart};
use tracing::debug;

use crate::error::MailboxError;
use crate::mailbox::Mailbox;
use crate::mailbox::types::{MessageList, RawMessage};

const GMAIL_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Categories excluded from the digest window at query level.
const LIST_QUERY_FILTERS: &str = "-category:promotions -category:social -in:spam";

/// Gmail REST client. Holds one access token for the duration of a run.
pub struct GmailClient {
    http: reqwest::Client,
    access_token: String,
    window: Duration,
}

impl GmailClient {
    pub fn new(access_token: String, window: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            window,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, MailboxError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MailboxError::Unauthorized);
        }
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(MailboxError::ApiError {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn list_message_ids(&self) -> Result<Vec<String>, MailboxError> {
        let after_ts = Utc::now().timestamp() - self.window.as_secs() as i64;
        let query = format!("after:{after_ts} {LIST_QUERY_FILTERS}");

        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self
                .http
                .get(format!("{GMAIL_BASE}/messages"))
                .bearer_auth(&self.access_token)
                .query(&[("q", query.as_str())]);
            if let Some(ref token) = page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let resp = Self::check(req.send().await?).await?;
            let page: MessageList = resp.json().await?;
            ids.extend(page.messages.into_iter().map(|m| m.id));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = ids.len(), "Listed message window");
        Ok(ids)
    }

    async fn fetch_message(&self, id: &str) -> Result<RawMessage, MailboxError> {
        let resp = self
            .http
            .get(format!("{GMAIL_BASE}/messages/{id}"))
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn send_raw(&self, mime: &[u8]) -> Result<(), MailboxError> {
        let payload = serde_json::json!({ "raw": URL_SAFE.encode(mime) });
        let resp = self
            .http
            .post(format!("{GMAIL_BASE}/messages/send"))
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }
}

/// Compose the digest as a multipart/alternative message, From = To.
pub fn compose_digest_email(
    to: &str,
    subject: &str,
    plain: String,
    html: String,
) -> Result<Vec<u8>, MailboxError> {
    let address: Address = to
        .parse()
        .map_err(|e| MailboxError::Compose(format!("invalid address {to:?}: {e}")))?;

    let message = Message::builder()
        .from(address.clone())
        .to(address)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(plain, html))
        .map_err(|e| MailboxError::Compose(e.to_string()))?;

    Ok(message.formatted())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_produces_multipart_alternative() {
        let mime = compose_digest_email(
            "user@example.com",
            "Digest — 01/01/2026",
            "plain body".into(),
            "<p>html body</p>".into(),
        )
        .unwrap();
        let text = String::from_utf8_lossy(&mime);
        assert!(text.contains("multipart/alternative"));
        assert!(text.contains("To: user@example.com"));
        assert!(text.contains("From: user@example.com"));
    }

    #[test]
    fn compose_rejects_invalid_address() {
        let err = compose_digest_email("not an address", "s", "p".into(), "h".into());
        assert!(matches!(err, Err(MailboxError::Compose(_))));
    }

    #[test]
    fn raw_payload_is_urlsafe_base64() {
        let encoded = URL_SAFE.encode(b"MIME-Version: 1.0\r\n");
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }
}

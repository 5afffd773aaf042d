//! Gmail REST v1 wire types.
//!
//! Only the fields the pipeline consumes are modeled; everything else in
//! the API responses is ignored by serde.

use serde::Deserialize;

/// Response to `GET /messages` — a page of message stubs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageStub>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Opaque message identifier from a list page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStub {
    pub id: String,
}

/// A full fetched message (`format=full`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub payload: Option<MessagePart>,
}

/// One node of the nested MIME part tree. The top-level `payload` is
/// itself a part and carries the message headers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

/// A single message header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Inline body data of a part, base64url-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
}

impl RawMessage {
    /// Case-insensitive header lookup on the payload headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.as_ref().and_then(|p| {
            p.headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .map(|h| h.value.as_str())
        })
    }

    /// Whether the message carries the IMPORTANT label.
    pub fn is_important(&self) -> bool {
        self.label_ids.iter().any(|l| l == "IMPORTANT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_list_deserializes() {
        let json = r#"{
            "messages": [
                {"id": "msg1", "threadId": "t1"},
                {"id": "msg2", "threadId": "t2"}
            ],
            "nextPageToken": "token123"
        }"#;
        let list: MessageList = serde_json::from_str(json).unwrap();
        assert_eq!(list.messages.len(), 2);
        assert_eq!(list.messages[0].id, "msg1");
        assert_eq!(list.next_page_token.as_deref(), Some("token123"));
    }

    #[test]
    fn message_list_empty() {
        let list: MessageList = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_empty());
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn raw_message_deserializes_nested_parts() {
        let json = r#"{
            "id": "m1",
            "labelIds": ["INBOX", "IMPORTANT"],
            "snippet": "preview",
            "payload": {
                "mimeType": "multipart/mixed",
                "headers": [
                    {"name": "Subject", "value": "Hello"},
                    {"name": "From", "value": "Alice <alice@example.com>"}
                ],
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGVsbG8"}},
                    {"mimeType": "application/pdf", "filename": "doc.pdf"}
                ]
            }
        }"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert!(msg.is_important());
        assert_eq!(msg.header("subject"), Some("Hello"));
        let payload = msg.payload.unwrap();
        assert_eq!(payload.parts.len(), 2);
        assert_eq!(payload.parts[1].filename, "doc.pdf");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let json = r#"{
            "id": "m1",
            "payload": {"headers": [{"name": "SUBJECT", "value": "Hi"}]}
        }"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.header("Subject"), Some("Hi"));
        assert_eq!(msg.header("subject"), Some("Hi"));
        assert_eq!(msg.header("from"), None);
    }

    #[test]
    fn missing_payload_yields_no_headers() {
        let msg: RawMessage = serde_json::from_str(r#"{"id": "m1"}"#).unwrap();
        assert_eq!(msg.header("subject"), None);
        assert!(!msg.is_important());
    }
}

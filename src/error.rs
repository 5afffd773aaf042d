//! Error types for inbox-digest.

/// Top-level error type for a digest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// OAuth token errors. These abort the run with a diagnostic naming the
/// likely cause — none of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Cannot read token file {path}: {reason}. Run the authorization flow to create it")]
    TokenFile { path: String, reason: String },

    #[error("Token file {path} is not valid JSON: {source}")]
    TokenParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Refresh grant rejected ({detail}) — the grant has expired or been revoked; re-run the authorization flow")]
    GrantRevoked { detail: String },

    #[error("Refresh grant rejected ({detail}) — client id/secret do not match the stored token")]
    ClientMismatch { detail: String },

    #[error("Token refresh failed with status {status}: {detail}")]
    RefreshFailed { status: u16, detail: String },

    #[error("HTTP error during token refresh: {0}")]
    Http(#[from] reqwest::Error),
}

/// Mailbox API errors (listing, fetching, sending).
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Mailbox API returned 401 — access token rejected")]
    Unauthorized,

    #[error("Mailbox API call failed with status {status}: {detail}")]
    ApiError { status: u16, detail: String },

    #[error("Failed to compose outbound message: {0}")]
    Compose(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Text-generation provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited or out of quota")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Notion logging-sink errors. The pipeline treats these as best-effort:
/// logged, never fatal, and never blocking the already-sent email.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("Page creation failed with status {status}: {detail}")]
    PageCreateFailed { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for a digest run.
pub type Result<T> = std::result::Result<T, Error>;

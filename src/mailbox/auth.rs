//! OAuth token handling for the mailbox API.
//!
//! Loads a previously authorized token from disk and refreshes it when
//! expired. The interactive consent flow is out of scope — a missing or
//! revoked token aborts the run with a diagnostic naming the fix.

use std::path::PathBuf;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AuthError, ConfigError};

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Expiry margin: refresh when less than this remains.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth client configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: secrecy::SecretString,
    pub token_path: PathBuf,
}

impl AuthConfig {
    /// Build config from `GMAIL_CLIENT_ID`, `GMAIL_CLIENT_SECRET` and
    /// `GMAIL_TOKEN_PATH` (default `token.json`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("GMAIL_CLIENT_ID".into()))?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("GMAIL_CLIENT_SECRET".into()))?;
        let token_path = std::env::var("GMAIL_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("token.json"));

        Ok(Self {
            client_id,
            client_secret: secrecy::SecretString::from(client_secret),
            token_path,
        })
    }
}

/// The token file contents, as written by the authorization flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Whether the access token needs refreshing at `now`.
    ///
    /// A token with no recorded expiry is always refreshed.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - now < ChronoDuration::seconds(EXPIRY_MARGIN_SECS),
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RefreshErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Map an OAuth error code to the diagnostic the run aborts with.
fn map_refresh_error(status: u16, body: RefreshErrorBody) -> AuthError {
    let detail = if body.error_description.is_empty() {
        body.error.clone()
    } else {
        format!("{}: {}", body.error, body.error_description)
    };
    match body.error.as_str() {
        "invalid_grant" => AuthError::GrantRevoked { detail },
        "invalid_client" | "unauthorized_client" => AuthError::ClientMismatch { detail },
        _ => AuthError::RefreshFailed { status, detail },
    }
}

/// Loads the stored token and refreshes it when expired.
pub struct TokenManager {
    config: AuthConfig,
    http: reqwest::Client,
}

impl TokenManager {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Return a usable access token, refreshing and persisting it if needed.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let path = self.config.token_path.display().to_string();
        let raw = std::fs::read_to_string(&self.config.token_path).map_err(|e| {
            AuthError::TokenFile {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        let token: StoredToken =
            serde_json::from_str(&raw).map_err(|e| AuthError::TokenParse {
                path: path.clone(),
                source: e,
            })?;

        if !token.needs_refresh(Utc::now()) {
            debug!("Stored access token still valid");
            return Ok(token.access_token);
        }

        info!("Access token expired — refreshing");
        let refreshed = self.refresh(&token).await?;

        let updated = StoredToken {
            access_token: refreshed.access_token.clone(),
            refresh_token: token.refresh_token,
            expiry: refreshed
                .expires_in
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
        };
        let serialized = serde_json::to_string_pretty(&updated).map_err(|e| {
            AuthError::TokenFile {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(&self.config.token_path, serialized).map_err(|e| AuthError::TokenFile {
            path,
            reason: e.to_string(),
        })?;

        Ok(refreshed.access_token)
    }

    async fn refresh(&self, token: &StoredToken) -> Result<RefreshResponse, AuthError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("refresh_token", token.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self.http.post(TOKEN_ENDPOINT).form(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: RefreshErrorBody = resp.json().await.unwrap_or_default();
            return Err(map_refresh_error(status.as_u16(), body));
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── Expiry checks ───────────────────────────────────────────────

    #[test]
    fn fresh_token_does_not_need_refresh() {
        let token = StoredToken {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expiry: Some(Utc::now() + ChronoDuration::hours(1)),
        };
        assert!(!token.needs_refresh(Utc::now()));
    }

    #[test]
    fn expired_token_needs_refresh() {
        let token = StoredToken {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expiry: Some(Utc::now() - ChronoDuration::minutes(5)),
        };
        assert!(token.needs_refresh(Utc::now()));
    }

    #[test]
    fn token_inside_margin_needs_refresh() {
        let token = StoredToken {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expiry: Some(Utc::now() + ChronoDuration::seconds(30)),
        };
        assert!(token.needs_refresh(Utc::now()));
    }

    #[test]
    fn token_without_expiry_needs_refresh() {
        let token = StoredToken {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expiry: None,
        };
        assert!(token.needs_refresh(Utc::now()));
    }

    // ── Error mapping ───────────────────────────────────────────────

    #[test]
    fn invalid_grant_maps_to_revoked() {
        let body = RefreshErrorBody {
            error: "invalid_grant".into(),
            error_description: "Token has been expired or revoked.".into(),
        };
        assert!(matches!(
            map_refresh_error(400, body),
            AuthError::GrantRevoked { .. }
        ));
    }

    #[test]
    fn invalid_client_maps_to_mismatch() {
        let body = RefreshErrorBody {
            error: "invalid_client".into(),
            error_description: String::new(),
        };
        assert!(matches!(
            map_refresh_error(401, body),
            AuthError::ClientMismatch { .. }
        ));
    }

    #[test]
    fn unknown_error_maps_to_refresh_failed() {
        let body = RefreshErrorBody {
            error: "server_error".into(),
            error_description: String::new(),
        };
        match map_refresh_error(500, body) {
            AuthError::RefreshFailed { status, .. } => assert_eq!(status, 500),
            other => panic!("Expected RefreshFailed, got {other:?}"),
        }
    }

    // ── Token file handling ─────────────────────────────────────────

    #[tokio::test]
    async fn missing_token_file_reports_path() {
        let config = AuthConfig {
            client_id: "id".into(),
            client_secret: secrecy::SecretString::from("secret"),
            token_path: PathBuf::from("/nonexistent/token.json"),
        };
        let manager = TokenManager::new(config);
        match manager.access_token().await {
            Err(AuthError::TokenFile { path, .. }) => {
                assert!(path.contains("token.json"));
            }
            other => panic!("Expected TokenFile error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_token_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let config = AuthConfig {
            client_id: "id".into(),
            client_secret: secrecy::SecretString::from("secret"),
            token_path: file.path().to_path_buf(),
        };
        let manager = TokenManager::new(config);
        assert!(matches!(
            manager.access_token().await,
            Err(AuthError::TokenParse { .. })
        ));
    }

    #[tokio::test]
    async fn valid_token_returned_without_refresh() {
        let token = StoredToken {
            access_token: "still-good".into(),
            refresh_token: "rt".into(),
            expiry: Some(Utc::now() + ChronoDuration::hours(1)),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&token).unwrap()).unwrap();

        let config = AuthConfig {
            client_id: "id".into(),
            client_secret: secrecy::SecretString::from("secret"),
            token_path: file.path().to_path_buf(),
        };
        let manager = TokenManager::new(config);
        assert_eq!(manager.access_token().await.unwrap(), "still-good");
    }
}

//! Runtime configuration, loaded once from the environment.

use std::time::Duration;

use crate::error::ConfigError;

/// Default look-back window: 24 hours.
const DEFAULT_WINDOW_SECS: u64 = 24 * 3600;

/// Digest run configuration.
///
/// Immutable once built — components receive what they need at
/// construction, so the rule engines stay unit-testable without
/// process-wide state.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Recipient (and sender) address for the digest email.
    pub send_to: String,
    /// Look-back window for the mailbox query.
    pub window: Duration,
}

impl DigestConfig {
    /// Build config from environment variables.
    ///
    /// `DIGEST_SEND_TO` is required; `DIGEST_WINDOW_SECS` defaults to 24h.
    pub fn from_env() -> Result<Self, ConfigError> {
        let send_to = std::env::var("DIGEST_SEND_TO").map_err(|_| ConfigError::MissingRequired {
            key: "DIGEST_SEND_TO".into(),
            hint: "Set it to the address that should receive the digest".into(),
        })?;

        let window_secs: u64 = match std::env::var("DIGEST_WINDOW_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DIGEST_WINDOW_SECS".into(),
                message: format!("expected a number of seconds, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_WINDOW_SECS,
        };

        Ok(Self {
            send_to,
            window: Duration::from_secs(window_secs),
        })
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            send_to: String::new(),
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_24h() {
        let config = DigestConfig::default();
        assert_eq!(config.window, Duration::from_secs(86_400));
    }

    #[test]
    fn from_env_requires_send_to() {
        // SAFETY: tests in this module are the only readers of these vars.
        unsafe { std::env::remove_var("DIGEST_SEND_TO") };
        let err = DigestConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }
}

// Authentication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expiry value as supplied by the workflow, before normalization.
/// Numbers are epoch milliseconds; strings may be numeric or ISO 8601.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawExpiry {
    Millis(i64),
    Text(String),
}

impl From<i64> for RawExpiry {
    fn from(millis: i64) -> Self {
        RawExpiry::Millis(millis)
    }
}

impl From<&str> for RawExpiry {
    fn from(text: &str) -> Self {
        RawExpiry::Text(text.to_string())
    }
}

impl From<String> for RawExpiry {
    fn from(text: String) -> Self {
        RawExpiry::Text(text)
    }
}

impl std::fmt::Display for RawExpiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawExpiry::Millis(ms) => write!(f, "{}", ms),
            RawExpiry::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Complete credential set
#[derive(Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: RawExpiry,
}

impl Credential {
    /// Expiry rendered the way it is exported and stored as a secret.
    /// Normalized values are epoch milliseconds; an unparseable input is passed through as-is.
    pub fn expires_at_string(&self) -> String {
        match super::expiry::normalize(&self.expires_at) {
            Some(dt) => dt.timestamp_millis().to_string(),
            None => self.expires_at.to_string(),
        }
    }
}

// Token values stay out of Debug output
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &token_prefix(&self.access_token))
            .field("refresh_token", &token_prefix(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Input to the OAuth manager, built from validated configuration
#[derive(Debug, Clone)]
pub struct OAuthInput {
    pub credential: Credential,
    /// Token allowed to write repository secrets
    pub secrets_admin_token: Option<String>,
}

/// Refresh token request body
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
    pub client_id: &'a str,
}

/// Refresh token response body
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[allow(dead_code)]
    pub scope: Option<String>,
}

/// Short, non-reversible prefix of a token for log lines
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Convert a normalized instant back into the raw millisecond form
pub fn millis_expiry(at: DateTime<Utc>) -> RawExpiry {
    RawExpiry::Millis(at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_expiry_deserializes_number_or_string() {
        let n: RawExpiry = serde_json::from_str("1736678400000").unwrap();
        assert_eq!(n, RawExpiry::Millis(1_736_678_400_000));

        let s: RawExpiry = serde_json::from_str("\"2025-01-12T10:30:00Z\"").unwrap();
        assert_eq!(s, RawExpiry::Text("2025-01-12T10:30:00Z".to_string()));
    }

    #[test]
    fn test_token_prefix_is_short() {
        assert_eq!(token_prefix("sk-ant-oat01-abcdefgh"), "sk-ant-o...");
        assert_eq!(token_prefix("abc"), "abc...");
    }

    #[test]
    fn test_credential_debug_hides_tokens() {
        let cred = Credential {
            access_token: "access-token-secret-value".to_string(),
            refresh_token: "refresh-token-secret-value".to_string(),
            expires_at: RawExpiry::Millis(0),
        };
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("access-t..."));
    }

    #[test]
    fn test_expires_at_string() {
        let cred = Credential {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: RawExpiry::Text("2025-01-12T10:30:00Z".to_string()),
        };
        assert_eq!(cred.expires_at_string(), "1736677800000");

        let cred = Credential {
            expires_at: RawExpiry::Text("not-a-date".to_string()),
            ..cred
        };
        assert_eq!(cred.expires_at_string(), "not-a-date");
    }
}

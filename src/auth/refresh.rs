// Token refresh logic

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use reqwest::Client;

use super::types::{millis_expiry, token_prefix, Credential, RefreshRequest, RefreshResponse};
use crate::error::RefreshError;

/// Default OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://api.anthropic.com/v1/oauth/token";

/// Public client identifier of the Claude CLI OAuth application
pub const DEFAULT_CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";

/// Exchanges a refresh token for a new credential set
pub struct TokenRefresher {
    /// HTTP client for refresh requests
    client: Client,

    /// Token endpoint URL
    token_url: String,

    /// OAuth client ID sent with every refresh
    client_id: String,
}

impl TokenRefresher {
    /// Create a new refresher with a bounded request timeout
    pub fn new(token_url: String, client_id: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token_url,
            client_id,
        })
    }

    /// Perform a single refresh exchange. No retries.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credential, RefreshError> {
        tracing::info!(
            "Refreshing OAuth token (refresh token: {})...",
            token_prefix(refresh_token)
        );

        let request = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
            client_id: &self.client_id,
        };

        let response = self
            .client
            .post(&self.token_url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                "OAuth token refresh failed: status={}, body={}",
                status,
                error_text
            );

            // OAuth error bodies carry error/error_description
            if let Ok(error_json) = serde_json::from_str::<serde_json::Value>(&error_text) {
                if let (Some(error_code), Some(error_desc)) = (
                    error_json.get("error").and_then(|v| v.as_str()),
                    error_json.get("error_description").and_then(|v| v.as_str()),
                ) {
                    tracing::warn!(
                        "OAuth error details: error={}, description={}",
                        error_code,
                        error_desc
                    );
                }
            }

            return Err(RefreshError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await?;
        let data: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| RefreshError::MalformedResponse(e.to_string()))?;

        if data.access_token.is_empty() {
            return Err(RefreshError::MalformedResponse(
                "response does not contain access_token".to_string(),
            ));
        }
        if data.refresh_token.is_empty() {
            return Err(RefreshError::MalformedResponse(
                "response does not contain refresh_token".to_string(),
            ));
        }
        if data.refresh_token == refresh_token {
            tracing::warn!("Authorization server returned the same refresh token");
        }

        let expires_in = i64::try_from(data.expires_in).map_err(|_| {
            RefreshError::MalformedResponse(format!("expires_in out of range: {}", data.expires_in))
        })?;
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| {
                RefreshError::MalformedResponse(format!("expires_in out of range: {}", expires_in))
            })?;

        tracing::info!(
            "Token refreshed (access token: {}), expires: {}",
            token_prefix(&data.access_token),
            expires_at.to_rfc3339()
        );

        Ok(Credential {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            expires_at: millis_expiry(expires_at),
        })
    }
}

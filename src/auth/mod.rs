// Authentication module
// Manages the OAuth credential lifecycle: expiry, refresh and rotation

mod expiry;
mod manager;
mod refresh;
mod types;

#[cfg(test)]
mod log_capture;

pub use expiry::{check, evaluate, is_expired, is_expired_at, normalize, ExpiryStatus, EXPIRY_BUFFER_MINUTES};
pub use manager::{OAuthManager, OAuthOutcome, PropagationOutcome, RefreshOutcome, Stage};
pub use refresh::{TokenRefresher, DEFAULT_CLIENT_ID, DEFAULT_TOKEN_URL};
pub use types::{token_prefix, Credential, OAuthInput, RawExpiry};

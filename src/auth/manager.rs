use chrono::{DateTime, Utc};

use super::expiry::{self, ExpiryStatus};
use super::refresh::TokenRefresher;
use super::types::{Credential, OAuthInput};
use crate::error::{PropagationError, RefreshError};
use crate::secrets::{self, SecretStore};

/// Steps the manager passes through on a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unchecked,
    Evaluated,
    Refreshed,
    SkippedRefresh,
    Propagated,
    SkippedPropagation,
    /// Credential handed to the downstream consumer
    Exported,
}

/// What happened to the refresh step
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Token still valid outside the buffer window
    NotNeeded,
    /// New credential obtained
    Refreshed,
    /// Exchange failed; original credential kept
    Failed(RefreshError),
}

/// What happened to the propagation step
#[derive(Debug)]
pub enum PropagationOutcome {
    /// Nothing new to persist
    NotNeeded,
    /// All three secrets written
    Propagated,
    /// Refreshed, but no admin token to write secrets with
    MissingAdminToken,
    /// A secret write failed
    Failed(PropagationError),
}

/// Result of one manager run
#[derive(Debug)]
pub struct OAuthOutcome {
    /// Latest known-good credential
    pub credential: Credential,
    /// How the original expiry evaluated
    pub expiry: ExpiryStatus,
    pub refresh: RefreshOutcome,
    pub propagation: PropagationOutcome,
    /// Stages visited, in order
    pub stages: Vec<Stage>,
}

impl OAuthOutcome {
    /// Propagation failure that should fail the step after export
    pub fn into_propagation_error(self) -> (Credential, Option<PropagationError>) {
        match self.propagation {
            PropagationOutcome::Failed(e) => (self.credential, Some(e)),
            _ => (self.credential, None),
        }
    }
}

/// OAuth credential lifecycle manager
/// Evaluates expiry, refreshes at most once and persists rotated tokens
pub struct OAuthManager<S> {
    /// Refresh client
    refresher: TokenRefresher,

    /// Secret store, present only when an admin token was supplied
    store: Option<S>,
}

impl<S: SecretStore> OAuthManager<S> {
    pub fn new(refresher: TokenRefresher, store: Option<S>) -> Self {
        Self { refresher, store }
    }

    /// Consume the manager, returning its secret store
    pub fn into_store(self) -> Option<S> {
        self.store
    }

    /// Run the credential lifecycle with the current time
    pub async fn run(&self, input: OAuthInput) -> OAuthOutcome {
        self.run_at(input, Utc::now()).await
    }

    /// Run the credential lifecycle, evaluating expiry at `now`
    pub async fn run_at(&self, input: OAuthInput, now: DateTime<Utc>) -> OAuthOutcome {
        let mut stages = vec![Stage::Unchecked];
        let original = input.credential;

        let status = expiry::check(&original.expires_at, now);
        stages.push(Stage::Evaluated);

        if !status.needs_refresh() {
            tracing::info!("✅ Existing OAuth token is still valid");
            stages.push(Stage::SkippedRefresh);
            stages.push(Stage::SkippedPropagation);
            return OAuthOutcome {
                credential: original,
                expiry: status,
                refresh: RefreshOutcome::NotNeeded,
                propagation: PropagationOutcome::NotNeeded,
                stages,
            };
        }

        let refreshed = match self.refresher.refresh(&original.refresh_token).await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(
                    "Token refresh failed, continuing with existing credentials: {}",
                    e
                );
                stages.push(Stage::SkippedRefresh);
                stages.push(Stage::SkippedPropagation);
                return OAuthOutcome {
                    credential: original,
                    expiry: status,
                    refresh: RefreshOutcome::Failed(e),
                    propagation: PropagationOutcome::NotNeeded,
                    stages,
                };
            }
        };
        stages.push(Stage::Refreshed);

        let propagation = match self.store {
            Some(ref store) => match secrets::propagate(store, &refreshed).await {
                Ok(()) => {
                    stages.push(Stage::Propagated);
                    PropagationOutcome::Propagated
                }
                Err(e) => {
                    tracing::error!("❌ {}", e);
                    stages.push(Stage::SkippedPropagation);
                    PropagationOutcome::Failed(e)
                }
            },
            None => {
                tracing::warn!(
                    "Token was refreshed but no secrets admin token was provided; \
                     the new tokens are only valid for this run"
                );
                stages.push(Stage::SkippedPropagation);
                PropagationOutcome::MissingAdminToken
            }
        };

        OAuthOutcome {
            credential: refreshed,
            expiry: status,
            refresh: RefreshOutcome::Refreshed,
            propagation,
            stages,
        }
    }
}

// Step-level OAuth handling
// Turns a manager run into runner annotations, exports and the step result

use std::path::Path;

use anyhow::Context;

use crate::auth::{
    Credential, ExpiryStatus, OAuthInput, OAuthManager, PropagationOutcome, RefreshOutcome, Stage,
};
use crate::error::{ActionError, Result};
use crate::export;
use crate::secrets::SecretStore;
use crate::workflow;

/// Run the manager, annotate the run and export the resulting credential.
///
/// The credential is exported even when propagation fails, so later steps
/// still get working tokens; the propagation error is returned afterwards.
pub async fn complete_oauth<S: SecretStore>(
    manager: &OAuthManager<S>,
    input: OAuthInput,
    env_file: Option<&Path>,
) -> Result<Credential> {
    let raw_expiry = input.credential.expires_at.clone();
    let mut outcome = manager.run(input).await;

    if outcome.expiry == ExpiryStatus::Unparseable {
        workflow::warning(&format!(
            "Could not parse claude_expires_at '{}', treating the token as expired",
            raw_expiry
        ));
    }

    if let RefreshOutcome::Failed(ref e) = outcome.refresh {
        workflow::warning(&format!(
            "OAuth token refresh failed, using the existing token: {}",
            e
        ));
    }

    if let PropagationOutcome::MissingAdminToken = outcome.propagation {
        workflow::warning(
            "OAuth token was refreshed but secrets_admin_pat is not set. \
             The rotated tokens could not be saved and the next run will use stale secrets. \
             Provide a token with permission to update repository secrets as secrets_admin_pat.",
        );
    }

    export::export_credential(&outcome.credential, env_file)
        .context("Failed to export OAuth credentials")?;
    outcome.stages.push(Stage::Exported);
    tracing::debug!("OAuth stages: {:?}", outcome.stages);

    // Reported once by the caller as the step failure
    let (credential, propagation_error) = outcome.into_propagation_error();
    if let Some(e) = propagation_error {
        return Err(ActionError::Propagation(e));
    }

    tracing::info!("✅ OAuth authentication configured");
    Ok(credential)
}

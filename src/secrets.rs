// Secret persistence
// Writes rotated credentials back to the repository's secret store

use std::future::Future;
use std::process::Stdio;
use std::sync::Mutex;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::auth::{token_prefix, Credential};
use crate::error::{PropagationError, SecretStoreError};

/// Secret holding the access token
pub const SECRET_ACCESS_TOKEN: &str = "CLAUDE_ACCESS_TOKEN";
/// Secret holding the refresh token
pub const SECRET_REFRESH_TOKEN: &str = "CLAUDE_REFRESH_TOKEN";
/// Secret holding the expiry in epoch milliseconds
pub const SECRET_EXPIRES_AT: &str = "CLAUDE_EXPIRES_AT";

/// Named-secret writer
pub trait SecretStore {
    /// Create or overwrite a single secret
    fn write(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), SecretStoreError>> + Send;
}

/// Repository secrets written through the GitHub CLI
pub struct GhCliSecretStore {
    /// Token with permission to administer repository secrets
    admin_token: String,

    /// owner/repo target; gh infers it from the checkout when absent
    repository: Option<String>,

    /// CLI executable
    program: String,
}

impl GhCliSecretStore {
    pub fn new(admin_token: String, repository: Option<String>) -> Self {
        Self {
            admin_token,
            repository,
            program: "gh".to_string(),
        }
    }

    /// Use a different executable in place of `gh`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl SecretStore for GhCliSecretStore {
    async fn write(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["secret", "set", name]);
        if let Some(ref repo) = self.repository {
            cmd.args(["--repo", repo.as_str()]);
        }

        // Value goes over stdin so it never shows up in the process list
        let mut child = cmd
            .env("GH_TOKEN", &self.admin_token)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(value.as_bytes()).await {
                // Writer exited without reading; its exit status decides
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SecretStoreError::Command {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!("Secret {} updated", name);
        Ok(())
    }
}

/// In-memory store used for dry runs
#[derive(Default)]
pub struct MemorySecretStore {
    writes: Mutex<Vec<(String, String)>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes recorded so far, in order
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }
}

impl SecretStore for MemorySecretStore {
    async fn write(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        tracing::info!(
            "[dry run] would set secret {} ({})",
            name,
            token_prefix(value)
        );
        self.writes
            .lock()
            .map_err(|_| SecretStoreError::Rejected("store lock poisoned".to_string()))?
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

/// Persist a refreshed credential as three secrets.
/// The first failed write aborts the rest; earlier writes are not rolled back.
pub async fn propagate<S: SecretStore>(
    store: &S,
    credential: &Credential,
) -> Result<(), PropagationError> {
    let expires_at = credential.expires_at_string();
    let secrets = [
        (SECRET_ACCESS_TOKEN, credential.access_token.as_str()),
        (SECRET_REFRESH_TOKEN, credential.refresh_token.as_str()),
        (SECRET_EXPIRES_AT, expires_at.as_str()),
    ];

    let mut written = Vec::with_capacity(secrets.len());
    for (name, value) in secrets {
        if let Err(source) = store.write(name, value).await {
            if !written.is_empty() {
                tracing::error!(
                    "Partial secret update: {:?} written, {} and later not written",
                    written,
                    name
                );
            }
            return Err(PropagationError {
                secret: name,
                written,
                total: secrets.len(),
                source,
            });
        }
        written.push(name);
    }

    tracing::info!("Updated {} repository secrets", written.len());
    Ok(())
}

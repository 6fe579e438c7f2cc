// Credential export for the downstream step

use anyhow::Result;
use std::path::Path;

use crate::auth::Credential;
use crate::secrets::{SECRET_ACCESS_TOKEN, SECRET_EXPIRES_AT, SECRET_REFRESH_TOKEN};
use crate::workflow;

/// Bindings handed to the consuming script, as (name, value) pairs
pub fn bindings(credential: &Credential) -> Vec<(&'static str, String)> {
    vec![
        ("USE_OAUTH", "true".to_string()),
        (SECRET_ACCESS_TOKEN, credential.access_token.clone()),
        (SECRET_REFRESH_TOKEN, credential.refresh_token.clone()),
        (SECRET_EXPIRES_AT, credential.expires_at_string()),
    ]
}

/// Mask the token values and export every binding.
/// Without an env file the bindings cannot reach later steps, so this only warns.
pub fn export_credential(credential: &Credential, env_file: Option<&Path>) -> Result<()> {
    workflow::add_mask(&credential.access_token);
    workflow::add_mask(&credential.refresh_token);

    let Some(env_file) = env_file else {
        tracing::warn!("GITHUB_ENV is not set; OAuth credentials were not exported");
        return Ok(());
    };

    for (name, value) in bindings(credential) {
        workflow::export_variable(env_file, name, &value)?;
    }

    tracing::info!("✅ OAuth credentials exported to {}", env_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RawExpiry;

    fn credential() -> Credential {
        Credential {
            access_token: "A2".to_string(),
            refresh_token: "R2".to_string(),
            expires_at: RawExpiry::Text("2025-01-12T10:30:00Z".to_string()),
        }
    }

    #[test]
    fn test_bindings_are_strings() {
        let b = bindings(&credential());
        assert_eq!(
            b,
            vec![
                ("USE_OAUTH", "true".to_string()),
                ("CLAUDE_ACCESS_TOKEN", "A2".to_string()),
                ("CLAUDE_REFRESH_TOKEN", "R2".to_string()),
                ("CLAUDE_EXPIRES_AT", "1736677800000".to_string()),
            ]
        );
    }

    #[test]
    fn test_export_writes_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_env");

        export_credential(&credential(), Some(path.as_path())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "USE_OAUTH=true\nCLAUDE_ACCESS_TOKEN=A2\nCLAUDE_REFRESH_TOKEN=R2\nCLAUDE_EXPIRES_AT=1736677800000\n"
        );
    }

    #[test]
    fn test_export_without_env_file() {
        assert!(export_credential(&credential(), None).is_ok());
    }
}

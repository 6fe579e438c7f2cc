use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::auth::{Credential, OAuthInput, RawExpiry, DEFAULT_CLIENT_ID, DEFAULT_TOKEN_URL};
use crate::error::ConfigError;

const OAUTH_REASON: &str = "when use_oauth is true";

/// Claude OAuth step for GitHub Actions
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Authenticate with Claude OAuth tokens ("true" to enable)
    #[arg(long, env = "INPUT_USE_OAUTH")]
    pub use_oauth: Option<String>,

    /// OAuth access token
    #[arg(long, env = "INPUT_CLAUDE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// OAuth refresh token
    #[arg(long, env = "INPUT_CLAUDE_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Access token expiry (epoch milliseconds or ISO 8601)
    #[arg(long, env = "INPUT_CLAUDE_EXPIRES_AT")]
    pub expires_at: Option<String>,

    /// Token allowed to update repository secrets
    #[arg(long, env = "INPUT_SECRETS_ADMIN_PAT", hide_env_values = true)]
    pub secrets_admin_pat: Option<String>,

    /// Anthropic API key (non-OAuth mode)
    #[arg(long, env = "INPUT_ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// Use Amazon Bedrock ("true" to enable)
    #[arg(long, env = "INPUT_USE_BEDROCK")]
    pub use_bedrock: Option<String>,

    /// Use Google Vertex AI ("true" to enable)
    #[arg(long, env = "INPUT_USE_VERTEX")]
    pub use_vertex: Option<String>,

    /// Prompt file for the assistant
    #[arg(long, env = "INPUT_PROMPT_FILE")]
    pub prompt_file: Option<String>,

    /// OAuth token endpoint
    #[arg(long, env = "CLAUDE_OAUTH_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: String,

    /// OAuth client ID
    #[arg(long, env = "CLAUDE_OAUTH_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    pub client_id: String,

    /// Token refresh timeout in seconds
    #[arg(long, env = "TOKEN_REFRESH_TIMEOUT", default_value = "30")]
    pub refresh_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Record secret writes instead of performing them ("true" to enable)
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Authentication mode
    pub use_oauth: bool,
    pub use_bedrock: bool,
    pub use_vertex: bool,

    // OAuth credentials
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<String>,
    pub secrets_admin_pat: Option<String>,

    // API key auth
    pub anthropic_api_key: Option<String>,

    // Prompt
    pub prompt_file: Option<PathBuf>,

    // Token endpoint
    pub token_url: String,
    pub client_id: String,
    pub refresh_timeout: u64,

    // Runner environment
    pub github_actions: bool,
    pub github_env: Option<PathBuf>,
    pub github_output: Option<PathBuf>,
    pub github_repository: Option<String>,

    // Debug
    pub log_level: String,
    pub dry_run: bool,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();

        Ok(Self::from_args(args, |key| std::env::var(key).ok()))
    }

    /// Build configuration from parsed arguments and a runner-variable lookup
    pub fn from_args(args: CliArgs, runner_var: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            use_oauth: parse_flag(args.use_oauth.as_deref()),
            use_bedrock: parse_flag(args.use_bedrock.as_deref()),
            use_vertex: parse_flag(args.use_vertex.as_deref()),

            access_token: non_empty(args.access_token),
            refresh_token: non_empty(args.refresh_token),
            expires_at: non_empty(args.expires_at),
            secrets_admin_pat: non_empty(args.secrets_admin_pat),

            anthropic_api_key: non_empty(args.anthropic_api_key),

            prompt_file: non_empty(args.prompt_file).map(PathBuf::from),

            token_url: args.token_url,
            client_id: args.client_id,
            refresh_timeout: args.refresh_timeout,

            github_actions: non_empty(runner_var("GITHUB_ACTIONS")).is_some(),
            github_env: non_empty(runner_var("GITHUB_ENV")).map(PathBuf::from),
            github_output: non_empty(runner_var("GITHUB_OUTPUT")).map(PathBuf::from),
            github_repository: non_empty(runner_var("GITHUB_REPOSITORY")),

            log_level: args.log_level,
            dry_run: parse_flag(args.dry_run.as_deref()),
        }
    }

    /// Validate that the inputs for the selected authentication mode are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.github_actions {
            tracing::warn!("Not running in GitHub Actions environment");
        }

        if self.use_oauth {
            self.oauth_input()?;
        } else if !self.use_bedrock && !self.use_vertex && self.anthropic_api_key.is_none() {
            return Err(ConfigError::MissingInput {
                input: "anthropic_api_key",
                reason: "when not using OAuth, Bedrock, or Vertex",
            });
        }

        if self.prompt_file.is_none() {
            return Err(ConfigError::MissingInput {
                input: "prompt_file",
                reason: "for every run",
            });
        }

        tracing::info!("✅ Environment variables validated");
        Ok(())
    }

    /// Build the OAuth manager input. All three credential fields are required.
    pub fn oauth_input(&self) -> Result<OAuthInput, ConfigError> {
        let access_token = require(&self.access_token, "claude_access_token")?;
        let refresh_token = require(&self.refresh_token, "claude_refresh_token")?;
        let expires_at = require(&self.expires_at, "claude_expires_at")?;

        Ok(OAuthInput {
            credential: Credential {
                access_token,
                refresh_token,
                expires_at: RawExpiry::Text(expires_at),
            },
            secrets_admin_token: self.secrets_admin_pat.clone(),
        })
    }
}

fn require(value: &Option<String>, input: &'static str) -> Result<String, ConfigError> {
    value.clone().ok_or(ConfigError::MissingInput {
        input,
        reason: OAUTH_REASON,
    })
}

/// Action inputs arrive as strings; only "true" enables a flag
fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Unset action inputs show up as empty strings
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

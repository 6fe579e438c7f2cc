use std::process::ExitCode;

use claude_oauth_step::auth::{OAuthManager, TokenRefresher};
use claude_oauth_step::config::Config;
use claude_oauth_step::error::Result;
use claude_oauth_step::secrets::{GhCliSecretStore, MemorySecretStore};
use claude_oauth_step::{action, prompt, workflow};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            workflow::error(&format!("Action failed with error: {:#}", e));
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging with the configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    match run(&config).await {
        Ok(()) => {
            set_conclusion(&config, "success");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            workflow::error(&format!("Action failed with error: {}", e));
            set_conclusion(&config, "failure");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<()> {
    config.validate()?;

    if config.use_oauth {
        setup_oauth(config).await?;
    }

    let prompt = prompt::prepare_prompt(config.prompt_file.as_deref()).await?;
    if let Some(ref output) = config.github_output {
        workflow::set_output(output, "prompt_file", &prompt.path.to_string_lossy())?;
    }

    Ok(())
}

/// Refresh, persist and export the OAuth credentials
async fn setup_oauth(config: &Config) -> Result<()> {
    tracing::info!("🔑 Setting up Claude OAuth authentication...");

    let input = config.oauth_input()?;
    let refresher = TokenRefresher::new(
        config.token_url.clone(),
        config.client_id.clone(),
        config.refresh_timeout,
    )?;

    if config.dry_run {
        tracing::info!("Dry run: secret updates will only be logged");
        let store = input
            .secrets_admin_token
            .as_ref()
            .map(|_| MemorySecretStore::new());
        let manager = OAuthManager::new(refresher, store);
        action::complete_oauth(&manager, input, config.github_env.as_deref()).await?;
        return Ok(());
    }

    let store = input
        .secrets_admin_token
        .clone()
        .map(|token| GhCliSecretStore::new(token, config.github_repository.clone()));
    let manager = OAuthManager::new(refresher, store);
    action::complete_oauth(&manager, input, config.github_env.as_deref()).await?;
    Ok(())
}

fn set_conclusion(config: &Config, conclusion: &str) {
    if let Some(ref output) = config.github_output {
        if let Err(e) = workflow::set_output(output, "conclusion", conclusion) {
            tracing::warn!("Failed to set conclusion output: {:#}", e);
        }
    }
}

// Prompt file loading

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const PREVIEW_CHARS: usize = 100;

/// Prompt handed to the assistant
#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub path: PathBuf,
    pub content: String,
}

/// Read the prompt file and log a short preview
pub async fn prepare_prompt(prompt_file: Option<&Path>) -> Result<PromptConfig> {
    let path = prompt_file.context("No prompt file provided")?;

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;

    tracing::info!("📝 Loaded prompt from: {}", path.display());
    tracing::info!("Prompt preview: {}...", preview(&content));

    Ok(PromptConfig {
        path: path.to_path_buf(),
        content,
    })
}

fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

// GitHub Actions workflow commands
// Annotations and masks go to stdout; env and outputs go to runner files

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Escape a command message the way the runner expects
fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Format a workflow command line
pub fn command(name: &str, message: &str) -> String {
    format!("::{}::{}", name, escape_data(message))
}

/// Hide a value in all subsequent log output
pub fn add_mask(value: &str) {
    if !value.is_empty() {
        println!("{}", command("add-mask", value));
    }
}

/// Emit a warning annotation
pub fn warning(message: &str) {
    println!("{}", command("warning", message));
}

/// Emit an error annotation
pub fn error(message: &str) {
    println!("{}", command("error", message));
}

/// Append `name=value` to a runner file (GITHUB_ENV or GITHUB_OUTPUT)
fn append_pair(path: &Path, name: &str, value: &str) -> Result<()> {
    if name.contains('=') || name.contains('\n') {
        anyhow::bail!("Invalid variable name: {}", name);
    }
    if value.contains('\n') || value.contains('\r') {
        anyhow::bail!("Multi-line value for {} is not supported", name);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writeln!(file, "{}={}", name, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

/// Make a variable visible to later steps of the job
pub fn export_variable(env_file: &Path, name: &str, value: &str) -> Result<()> {
    append_pair(env_file, name, value)
}

/// Set a step output
pub fn set_output(output_file: &Path, name: &str, value: &str) -> Result<()> {
    append_pair(output_file, name, value)
}

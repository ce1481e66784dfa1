use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Where the input object is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// JSON file holding `pipelines` and optional `aliases`
    pub pipelines_path: PathBuf,

    pub input: InputSource,

    /// Pretty-print the sanitized output
    pub pretty: bool,

    /// Log level used when neither RUST_LOG nor LOG_LEVEL is set
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            pipelines_path: PathBuf::from("pipelines.json"),
            input: InputSource::Stdin,
            pretty: false,
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CliConfig::default();

        match lookup("SANITIZE_PIPELINES") {
            Some(path) if !path.trim().is_empty() => {
                config.pipelines_path = PathBuf::from(path.trim());
            }
            _ => return Err(anyhow!("SANITIZE_PIPELINES must point to a pipeline file")),
        }

        if let Some(input) = lookup("SANITIZE_INPUT") {
            let input = input.trim();
            if !input.is_empty() && input != "-" {
                config.input = InputSource::File(PathBuf::from(input));
            }
        }

        if let Some(flag) = lookup("SANITIZE_PRETTY") {
            config.pretty =
                parse_bool(flag.trim()).context("failed to parse SANITIZE_PRETTY as bool")?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            if !level.trim().is_empty() {
                config.log_level = level;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_file(&self.pipelines_path)?;
        if let InputSource::File(path) = &self.input {
            validate_file(path)?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    value.parse::<bool>().or_else(|_| match value {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(anyhow!("invalid boolean value: {}", other)),
    })
}

fn validate_file(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).with_context(|| {
        format!(
            "file '{}' does not exist or is not accessible",
            path.display()
        )
    })?;

    if !metadata.is_file() {
        return Err(anyhow!("'{}' is not a regular file", path.display()));
    }

    Ok(())
}

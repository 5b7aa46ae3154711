//! Command line configuration: provider settings, policy flags and documents.

use std::path::{Path, PathBuf};

use clap::Args;
use handbook_core::{CoreError, GenerationPolicy};
use handbook_llm::{ChatClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use handbook_pipeline::RetrievalMode;
use thiserror::Error;

/// Configuration problems reported before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("XAI_API_KEY is not set (pass --api-key or add it to .env)")]
    MissingApiKey,

    #[error("Invalid generation policy: {0}")]
    Policy(#[from] CoreError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse policy file {}: {source}", path.display())]
    PolicyFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Output directory {} does not exist", path.display())]
    OutputDir { path: PathBuf },
}

/// Reject an `--output` whose directory is missing, before any provider
/// call is made.
pub fn check_output(output: Option<&Path>) -> Result<(), ConfigError> {
    let Some(output) = output else {
        return Ok(());
    };
    if output.is_dir() {
        return Ok(());
    }

    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if parent.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::OutputDir {
            path: parent.to_path_buf(),
        })
    }
}

/// Provider settings.
#[derive(Debug, Clone, Args)]
pub struct LlmArgs {
    /// API key for the completion provider
    #[arg(long, env = "XAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "HANDBOOK_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Model name
    #[arg(long, env = "HANDBOOK_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,
}

impl LlmArgs {
    /// Build the provider client, failing if no key is configured.
    pub fn client(&self) -> Result<ChatClient, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(ChatClient::new(api_key)
            .with_base_url(&self.base_url)
            .with_model(&self.model))
    }
}

/// Length and budget flags. Unset flags keep the policy file's value, or
/// the default policy when no file is given.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// JSON file with a generation policy
    #[arg(long, value_name = "PATH")]
    pub policy_file: Option<PathBuf>,

    /// Target total length in words
    #[arg(long)]
    pub total_words: Option<u32>,

    /// Minimum number of sections to plan
    #[arg(long)]
    pub min_tasks: Option<u32>,

    /// Lower bound of the per-section word target
    #[arg(long)]
    pub section_min_words: Option<u32>,

    /// Upper bound of the per-section word target
    #[arg(long)]
    pub section_max_words: Option<u32>,

    /// Words of already written text fed back to each section call
    #[arg(long)]
    pub window_words: Option<usize>,

    /// Output token cap for the planning call
    #[arg(long)]
    pub plan_max_tokens: Option<u32>,

    /// Output token cap for each section call
    #[arg(long)]
    pub section_max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,
}

impl PolicyArgs {
    /// Resolve and validate the policy.
    pub fn policy(&self) -> Result<GenerationPolicy, ConfigError> {
        let mut policy = match &self.policy_file {
            Some(path) => load_policy(path)?,
            None => GenerationPolicy::default(),
        };

        if let Some(words) = self.total_words {
            policy.total_words = words;
        }
        if let Some(tasks) = self.min_tasks {
            policy.min_tasks = tasks;
        }
        if let Some(min) = self.section_min_words {
            policy.section_words_min = min;
        }
        if let Some(max) = self.section_max_words {
            policy.section_words_max = max;
        }
        if let Some(words) = self.window_words {
            policy.window_words = words;
        }
        if let Some(tokens) = self.plan_max_tokens {
            policy.plan_max_tokens = tokens;
        }
        if let Some(tokens) = self.section_max_tokens {
            policy.section_max_tokens = tokens;
        }
        if let Some(temperature) = self.temperature {
            policy.temperature = temperature;
        }

        policy.validate()?;
        Ok(policy)
    }
}

fn load_policy(path: &Path) -> Result<GenerationPolicy, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::PolicyFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Documents to index before running.
#[derive(Debug, Clone, Default, Args)]
pub struct DocArgs {
    /// Plain-text or markdown file to index (repeatable)
    #[arg(long = "doc", value_name = "PATH")]
    pub docs: Vec<PathBuf>,

    /// Retrieval mode for chat answers (planning context always uses hybrid)
    #[arg(long, default_value_t = RetrievalMode::Hybrid)]
    pub mode: RetrievalMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(api_key: Option<&str>) -> LlmArgs {
        LlmArgs {
            api_key: api_key.map(str::to_string),
            base_url: "http://localhost:9999/v1/".to_string(),
            model: "test-model".to_string(),
        }
    }

    #[test]
    fn test_missing_api_key_is_named() {
        let err = llm(None).client().unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("XAI_API_KEY"));

        assert!(matches!(
            llm(Some("  ")).client(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_check_output() {
        let dir = std::env::temp_dir();
        assert!(check_output(None).is_ok());
        assert!(check_output(Some(&dir)).is_ok());
        assert!(check_output(Some(&dir.join("handbook.md"))).is_ok());
        assert!(check_output(Some(Path::new("handbook.md"))).is_ok());

        let missing = dir.join(format!("handbook-missing-{}", std::process::id()));
        let err = check_output(Some(&missing.join("handbook.md"))).unwrap_err();
        assert!(matches!(err, ConfigError::OutputDir { ref path } if *path == missing));
        assert!(err.to_string().starts_with("Output directory"));
    }

    #[test]
    fn test_client_uses_flags() {
        let client = llm(Some("key")).client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/v1");
        assert_eq!(client.model(), "test-model");
    }

    #[test]
    fn test_policy_defaults() {
        let policy = PolicyArgs::default().policy().unwrap();
        assert_eq!(policy, GenerationPolicy::default());
    }

    #[test]
    fn test_policy_flags_override() {
        let args = PolicyArgs {
            total_words: Some(5000),
            min_tasks: Some(8),
            section_min_words: Some(300),
            section_max_words: Some(500),
            window_words: Some(1000),
            ..Default::default()
        };
        let policy = args.policy().unwrap();
        assert_eq!(policy.total_words, 5000);
        assert_eq!(policy.min_tasks, 8);
        assert_eq!(policy.section_words_min, 300);
        assert_eq!(policy.section_words_max, 500);
        assert_eq!(policy.window_words, 1000);
        assert_eq!(policy.temperature, GenerationPolicy::default().temperature);
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let args = PolicyArgs {
            min_tasks: Some(0),
            ..Default::default()
        };
        let err = args.policy().unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
        assert!(err.to_string().starts_with("Invalid generation policy"));
    }

    #[test]
    fn test_policy_file_with_flag_override() {
        let path = std::env::temp_dir().join(format!(
            "handbook-policy-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"total_words": 8000, "min_tasks": 12}"#).unwrap();

        let args = PolicyArgs {
            policy_file: Some(path.clone()),
            min_tasks: Some(10),
            ..Default::default()
        };
        let policy = args.policy().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(policy.total_words, 8000);
        assert_eq!(policy.min_tasks, 10);
        assert_eq!(policy.section_words_max, 800);
    }
}

//! Agent configuration, loaded from YAML at startup.
//!
//! Configuration failures are fatal before any tool invocation; the
//! resulting `AgentConfig` is immutable and passed explicitly to every
//! component — no ambient globals.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("malformed config: {0}")]
    Parse(String),

    #[error("config has no '{0}' section for the selected provider")]
    MissingProvider(&'static str),

    #[error("invalid config value: {0}")]
    Invalid(String),

    #[error("system prompt file not found: {path}")]
    PromptNotFound { path: String },
}

/// Top-level configuration for the agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Provider used when the CLI does not pass `--provider`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bedrock model profile.
    #[serde(default)]
    pub bedrock: Option<ModelProfile>,
    /// OpenAI-compatible model profile.
    #[serde(default)]
    pub openai: Option<ModelProfile>,
    /// Driver-level bounds.
    #[serde(default)]
    pub limits: Limits,
}

fn default_provider() -> String {
    "bedrock".to_string()
}

/// One provider's model settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelProfile {
    /// Model identifier (Bedrock model ID or OpenAI model name).
    pub model_id: String,
    /// Path to the system prompt file, relative to the config file.
    pub system_prompt_path: String,
    /// Inference parameters.
    #[serde(default)]
    pub inference: InferenceParams,
}

/// Sampling and length parameters passed to the model.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InferenceParams {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Ask the provider to reuse cached prompt prefixes when supported.
    #[serde(default)]
    pub prompt_caching: bool,
}

fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> i32 {
    4096
}
fn default_top_p() -> f32 {
    0.9
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            prompt_caching: false,
        }
    }
}

/// Driver-level bounds, independent of per-tool retries.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Limits {
    /// Overall wall-clock bound for one run. Deep runs can take a long
    /// time; the default matches a 200-minute ceiling.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    /// Retries for transient model errors at the driver level.
    #[serde(default = "default_tool_error_retries")]
    pub tool_error_retries: u32,
}

fn default_run_timeout_secs() -> u64 {
    12_000
}
fn default_tool_error_retries() -> u32 {
    3
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            run_timeout_secs: default_run_timeout_secs(),
            tool_error_retries: default_tool_error_retries(),
        }
    }
}

impl AgentConfig {
    /// Load and validate config from a YAML file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for profile in [self.bedrock.as_ref(), self.openai.as_ref()]
            .into_iter()
            .flatten()
        {
            let p = profile.inference;
            if !(0.0..=2.0).contains(&p.temperature) {
                return Err(ConfigError::Invalid(format!(
                    "temperature must be in [0, 2], got {}",
                    p.temperature
                )));
            }
            if !(0.0..=1.0).contains(&p.top_p) {
                return Err(ConfigError::Invalid(format!(
                    "top_p must be in [0, 1], got {}",
                    p.top_p
                )));
            }
            if p.max_tokens < 1 {
                return Err(ConfigError::Invalid(format!(
                    "max_tokens must be >= 1, got {}",
                    p.max_tokens
                )));
            }
        }
        if self.provider != "bedrock" && self.provider != "openai" {
            return Err(ConfigError::Invalid(format!(
                "provider must be 'bedrock' or 'openai', got '{}'",
                self.provider
            )));
        }
        Ok(())
    }

    /// The profile for a provider name, or a config error.
    pub fn profile(&self, provider: &str) -> Result<&ModelProfile, ConfigError> {
        match provider {
            "bedrock" => self
                .bedrock
                .as_ref()
                .ok_or(ConfigError::MissingProvider("bedrock")),
            "openai" => self
                .openai
                .as_ref()
                .ok_or(ConfigError::MissingProvider("openai")),
            _ => Err(ConfigError::Invalid(format!(
                "unsupported provider: {provider}"
            ))),
        }
    }
}

/// Load a system prompt, resolving relative paths against the config
/// file's directory first, then the working directory.
pub fn load_system_prompt(prompt_path: &str, config_path: &Path) -> Result<String, ConfigError> {
    let candidates: Vec<PathBuf> = match config_path.parent() {
        Some(dir) => vec![dir.join(prompt_path), PathBuf::from(prompt_path)],
        None => vec![PathBuf::from(prompt_path)],
    };
    for candidate in &candidates {
        if candidate.is_file() {
            return std::fs::read_to_string(candidate).map_err(|e| ConfigError::Read {
                path: candidate.display().to_string(),
                message: e.to_string(),
            });
        }
    }
    Err(ConfigError::PromptNotFound {
        path: prompt_path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_config() {
        let yaml = r#"
bedrock:
  model_id: us.anthropic.claude-sonnet-4-20250514-v1:0
  system_prompt_path: prompts/ml_cost_analysis.txt
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider, "bedrock"); // default
        assert_eq!(config.limits.run_timeout_secs, 12_000); // default
        assert_eq!(config.limits.tool_error_retries, 3); // default
        let inference = config.bedrock.unwrap().inference;
        assert_eq!(inference.max_tokens, 4096);
        assert!(!inference.prompt_caching);
    }

    #[test]
    fn deserialize_full_config() {
        let yaml = r#"
provider: openai
bedrock:
  model_id: us.amazon.nova-pro-v1:0
  system_prompt_path: prompts/ml_cost_analysis.txt
  inference:
    temperature: 0.1
    max_tokens: 8192
    top_p: 0.95
    prompt_caching: true
openai:
  model_id: gpt-4o
  system_prompt_path: prompts/ml_cost_analysis.txt
limits:
  run_timeout_secs: 600
  tool_error_retries: 5
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.limits.run_timeout_secs, 600);
        assert!(config.bedrock.as_ref().unwrap().inference.prompt_caching);
        assert_eq!(config.profile("openai").unwrap().model_id, "gpt-4o");
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let yaml = r#"
bedrock:
  model_id: m
  system_prompt_path: p
  inference:
    temperature: 3.5
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_provider_section_is_an_error() {
        let yaml = r#"
openai:
  model_id: gpt-4o
  system_prompt_path: p
"#;
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.profile("bedrock"),
            Err(ConfigError::MissingProvider("bedrock"))
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider: [unclosed").unwrap();
        assert!(matches!(
            AgentConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn prompt_resolves_relative_to_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let prompt_dir = dir.path().join("prompts");
        std::fs::create_dir_all(&prompt_dir).unwrap();
        std::fs::write(prompt_dir.join("system.txt"), "You are an analyst.").unwrap();
        let config_path = dir.path().join("config.yaml");

        let prompt = load_system_prompt("prompts/system.txt", &config_path).unwrap();
        assert_eq!(prompt, "You are an analyst.");
    }

    #[test]
    fn missing_prompt_is_a_config_error() {
        let err = load_system_prompt("nope/missing.txt", Path::new("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::PromptNotFound { .. }));
    }
}

//! Command-line interface.
//!
//! CLI flags take precedence over environment variables — clap's `env`
//! attribute implements exactly that ordering.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use mlc_protocol::ReportFormat;

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Bedrock,
    Openai,
}

impl ProviderArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bedrock => "bedrock",
            Self::Openai => "openai",
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Markdown => Self::Markdown,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Analyze AWS ML workload costs and produce an optimization report.
#[derive(Debug, Parser)]
#[command(name = "ml-cost-agent", version, about)]
pub struct Cli {
    /// Cost analysis query to run.
    #[arg(long)]
    pub query: String,

    /// LLM provider to use. Defaults to the config file setting.
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// AWS profile name.
    #[arg(long, env = "AWS_PROFILE")]
    pub aws_profile: Option<String>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Tavily API key for internet search.
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    /// OpenAI API key (required with --provider openai).
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Save the report to a file instead of stdout.
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Report output format.
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: FormatArg,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Maximum retries for throttled AWS calls.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Root directory for the agent workspace.
    #[arg(long, default_value = ".")]
    pub root_dir: PathBuf,

    /// LangSmith API key for run tracing (optional).
    #[arg(long, env = "LANGSMITH_API_KEY", hide_env_values = true)]
    pub langsmith_api_key: Option<String>,

    /// LangSmith project name (optional).
    #[arg(long, env = "LANGCHAIN_PROJECT")]
    pub langsmith_project: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::try_parse_from(["ml-cost-agent", "--query", "analyze costs"]).unwrap();
        assert_eq!(cli.query, "analyze costs");
        assert!(cli.provider.is_none());
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.max_retries, 3);
        assert_eq!(cli.format, FormatArg::Markdown);
        assert!(!cli.debug);
    }

    #[test]
    fn missing_query_is_an_error() {
        assert!(Cli::try_parse_from(["ml-cost-agent"]).is_err());
    }

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "ml-cost-agent",
            "--query",
            "q",
            "--provider",
            "openai",
            "--config",
            "custom.yaml",
            "--format",
            "json",
            "--max-retries",
            "5",
            "--root-dir",
            "/tmp/ws",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.provider, Some(ProviderArg::Openai));
        assert_eq!(cli.provider.unwrap().as_str(), "openai");
        assert_eq!(cli.format, FormatArg::Json);
        assert_eq!(cli.max_retries, 5);
        assert!(cli.debug);
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(
            Cli::try_parse_from(["ml-cost-agent", "--query", "q", "--provider", "claudeml"])
                .is_err()
        );
    }
}

//! ML Cost Agent — CLI entry point.
//!
//! Wires the AWS backend, search client, workspace sandbox, and model
//! provider into one deep-analysis run and emits the report.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mlc_agent::cli::Cli;
use mlc_agent::config::{AgentConfig, load_system_prompt};
use mlc_agent::driver::AgentDriver;
use mlc_agent::providers::bedrock::{BedrockModel, BedrockModelConfig};
use mlc_agent::providers::openai::{OpenAiModel, OpenAiModelConfig};
use mlc_agent::providers::ModelClient;
use mlc_agent::registry::{Backends, ToolRegistry};
use mlc_agent::report;
use mlc_aws_tools::{RetryPolicy, SdkAwsApi};
use mlc_search_tools::TavilyClient;
use mlc_workspace_tools::Sandbox;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "ml-cost-agent starting"
    );

    // ── Load config ─────────────────────────────────────────────
    let config = AgentConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let provider = args
        .provider
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| config.provider.clone());
    let profile = config.profile(&provider)?.clone();
    let system_prompt = load_system_prompt(&profile.system_prompt_path, &args.config)?;
    tracing::info!(
        provider = %provider,
        model_id = %profile.model_id,
        "config loaded"
    );

    // ── Credentials ─────────────────────────────────────────────
    let tavily_key = args.tavily_api_key.clone().context(
        "Tavily API key not set. Pass --tavily-api-key or export TAVILY_API_KEY",
    )?;

    if let Some(project) = &args.langsmith_project {
        tracing::info!(project = %project, "LangSmith project configured");
    }
    if args.langsmith_api_key.is_some() {
        tracing::info!("LangSmith tracing enabled");
    }

    // ── AWS clients (built once, shared read-only) ──────────────
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(profile_name) = &args.aws_profile {
        loader = loader.profile_name(profile_name);
    }
    if let Some(region) = &args.aws_region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let request_timeout = Duration::from_secs(config.limits.run_timeout_secs);

    // ── Model provider ──────────────────────────────────────────
    let model: Arc<dyn ModelClient> = match provider.as_str() {
        "bedrock" => {
            // Default SDK timeouts are far too short for deep-analysis
            // turns; mirror the run bound on the read timeout.
            let timeouts = aws_config::timeout::TimeoutConfig::builder()
                .connect_timeout(Duration::from_secs(60))
                .read_timeout(request_timeout)
                .build();
            let bedrock_conf = aws_sdk_bedrockruntime::config::Builder::from(&sdk_config)
                .timeout_config(timeouts)
                .build();
            let client = aws_sdk_bedrockruntime::Client::from_conf(bedrock_conf);
            Arc::new(BedrockModel::new(
                client,
                BedrockModelConfig {
                    model_id: profile.model_id.clone(),
                    inference: profile.inference,
                    request_timeout,
                },
            ))
        }
        "openai" => {
            let api_key = args.openai_api_key.clone().context(
                "OpenAI API key not set. Pass --openai-api-key or export OPENAI_API_KEY",
            )?;
            let mut model_config = OpenAiModelConfig::new(&profile.model_id, profile.inference);
            model_config.request_timeout = request_timeout;
            Arc::new(OpenAiModel::new(api_key, model_config).map_err(anyhow::Error::from)?)
        }
        other => anyhow::bail!("unsupported provider: {other}"),
    };

    // ── Tool backends ───────────────────────────────────────────
    let backends = Backends {
        aws: Arc::new(SdkAwsApi::new(&sdk_config)),
        search: Arc::new(TavilyClient::new(tavily_key).map_err(anyhow::Error::from)?),
        sandbox: Sandbox::new(&args.root_dir)
            .with_context(|| format!("initializing workspace at {}", args.root_dir.display()))?,
        retry: RetryPolicy::new(args.max_retries),
    };
    let registry = ToolRegistry::with_defaults();
    tracing::info!(tool_count = registry.len(), "tool registry initialized");

    // ── Run ─────────────────────────────────────────────────────
    let driver = AgentDriver::new(
        model,
        registry,
        backends,
        system_prompt,
        provider,
        config.limits,
    );
    let outcome = driver.run(&args.query).await?;

    tracing::info!(
        run_id = %outcome.run_id,
        turns = outcome.turns,
        tool_calls = outcome.tool_calls,
        duration_secs = outcome.duration_secs,
        "query completed"
    );

    let rendered = report::render(&outcome, args.format.into());
    report::emit(&rendered, args.output_file.as_deref())?;

    Ok(())
}

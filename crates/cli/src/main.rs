use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voiceforge_api::{ClientConfig, DEFAULT_BASE_URL, VoiceForgeClient};
use voiceforge_mcp::{ServerConfig, ToolContext, ToolRegistry, serve_stdio};
use voiceforge_n8n::{N8nClient, N8nConfig};

mod setup;
mod verify;

/// MCP server for the VoiceForge platform and its n8n automation engine.
///
/// Reads VOICEFORGE_API_KEY (required), VOICEFORGE_URL, VOICEFORGE_USER_AGENT,
/// N8N_BASE_URL, N8N_API_KEY and N8N_AUTH_SCHEME from the environment.
#[derive(Debug, Parser)]
#[command(name = "voiceforge-mcp", version)]
struct Cli {
    /// Log filter, e.g. `debug` or `voiceforge_mcp=trace`. Defaults to RUST_LOG, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Extra header sent on every platform request, as "Name: value". Repeatable.
    #[arg(long = "header", global = true, value_parser = parse_header)]
    headers: Vec<(String, String)>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve MCP over stdin/stdout (default).
    Serve,
    /// Print the tool catalogue as JSON.
    Tools,
    /// Check the main read endpoints with the configured key.
    Verify,
    /// Ensure an agent has the calendar tools used for booking.
    SetupCalendarTools {
        #[arg(long)]
        agent_id: String,
        /// Also switch the agent to this LLM model.
        #[arg(long)]
        llm_model: Option<String>,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = load_config(cli.headers)?;
            let registry = ToolRegistry::with_default_catalog(config.build_context()?);
            info!(
                tools = registry.len(),
                base_url = %config.platform.base_url,
                n8n_base_url = %config.automation.base_url,
                "starting VoiceForge MCP server on stdio"
            );
            serve_stdio(Arc::new(registry)).await
        }
        Command::Tools => print_catalogue(cli.headers),
        Command::Verify => {
            let config = load_config(cli.headers)?;
            let client = VoiceForgeClient::new(config.platform)?;
            let report = verify::run(&client).await;
            println!("{}", report.render());
            if report.failures() > 0 {
                bail!("{} of {} endpoints failed", report.failures(), report.len());
            }
            Ok(())
        }
        Command::SetupCalendarTools { agent_id, llm_model } => {
            let config = load_config(cli.headers)?;
            let client = VoiceForgeClient::new(config.platform)?;
            let outcome = setup::ensure_calendar_tools(&client, &agent_id, llm_model.as_deref()).await?;
            println!("{}", outcome.render());
            if outcome.failures() > 0 {
                bail!("{} calendar tools could not be set up", outcome.failures());
            }
            Ok(())
        }
    }
}

fn load_config(headers: Vec<(String, String)>) -> Result<ServerConfig> {
    let config = ServerConfig::from_env().context("invalid configuration")?;
    Ok(config.with_extra_headers(headers))
}

/// Listing tools makes no request, so a missing key is tolerated here.
fn print_catalogue(headers: Vec<(String, String)>) -> Result<()> {
    let context = match ServerConfig::from_env() {
        Ok(config) => config.with_extra_headers(headers).build_context()?,
        Err(_) => {
            let platform = VoiceForgeClient::new(ClientConfig::new(DEFAULT_BASE_URL, ""))?;
            let automation = N8nClient::new(N8nConfig::default())?;
            ToolContext::new(platform, automation)
        }
    };
    let registry = ToolRegistry::with_default_catalog(context);
    println!("{}", serde_json::to_string_pretty(&registry.tools())?);
    Ok(())
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // stdout carries the MCP protocol; logs go to stderr only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

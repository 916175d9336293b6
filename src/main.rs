use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use binance_tools::ipc::ToolServer;
use binance_tools::tools::{ToolCatalog, ToolGateway};
use binance_tools::upstream::BinanceClient;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging() -> Result<()> {
    // Stdout carries the protocol, so logs go to a file
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", env!("CARGO_PKG_NAME")));

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_gateway(config: &Config) -> Result<ToolGateway> {
    let client = BinanceClient::new(config.client_config()).context("Failed to build upstream client")?;
    let catalog = ToolCatalog::with_prefix(config.server.tool_prefix.clone());
    Ok(ToolGateway::new(client).with_catalog(catalog))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
        eprintln!("  Upstream: {}", config.upstream.base_url);
        eprintln!("  Timeout: {}ms", config.upstream.timeout_ms);
    }

    let gateway = build_gateway(config)?;

    match &cli.command {
        None | Some(Commands::Serve) => handle_serve_command(gateway, config).await,
        Some(Commands::List { json }) => handle_list_command(&gateway, *json),
        Some(Commands::Call { tool, args }) => handle_call_command(&gateway, tool, args).await,
    }
}

async fn handle_serve_command(gateway: ToolGateway, config: &Config) -> Result<()> {
    info!("Serving {} tools", gateway.catalog().len());
    let server = Arc::new(ToolServer::with_info(gateway, config.server_info()));
    server.serve_stdio().await.context("Tool server failed")?;
    Ok(())
}

fn handle_list_command(gateway: &ToolGateway, json: bool) -> Result<()> {
    info!("Listing tools (json: {})", json);
    let definitions = gateway.definitions();

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    for def in &definitions {
        println!("{}", def.name.cyan().bold());
        println!("  {}", def.description);

        let required: Vec<&str> = def.input_schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if let Some(properties) = def.input_schema["properties"].as_object() {
            for (name, schema) in properties {
                let kind = schema["type"].as_str().unwrap_or("any");
                let marker = if required.contains(&name.as_str()) {
                    "required".red()
                } else {
                    "optional".dimmed()
                };
                println!("    {} {} ({})", name.green(), kind, marker);
            }
        }
    }
    Ok(())
}

async fn handle_call_command(gateway: &ToolGateway, tool: &str, args: &str) -> Result<()> {
    info!("Calling {} with {}", tool, args);
    let arguments: Value = serde_json::from_str(args).context("Arguments must be a JSON object")?;

    match gateway.invoke(tool, arguments).await {
        Ok(output) => {
            println!("{}", output.content);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", format!("{}:", e.kind()).red(), e);
            Err(eyre!("{} failed", tool))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_overrides(cli.base_url.as_deref(), cli.timeout_ms);

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}

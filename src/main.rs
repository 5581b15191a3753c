//! Binary entry point for the curator.
//!
//! This binary provides the CLI interface: the REST API server, the
//! interactive menu, the Markdown export, and a status report.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use curator::api::{self, AppState};
use curator::config::{CuratorConfig, LlmProviderKind};
use curator::llm::{GeminiClient, LlmHttpConfig, LlmProvider, OllamaClient};
use curator::menu::Menu;
use curator::{CuratorService, MemoryStore, export};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Curator - a personal technical-content curation agent.
#[derive(Parser)]
#[command(name = "curator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0", env = "CURATOR_HOST")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, default_value = "8000", env = "CURATOR_PORT")]
        port: u16,
    },

    /// Run the interactive menu.
    Menu,

    /// Export the saved collection to Markdown.
    Export {
        /// Output file (default: coleccion_articulos.md).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show status.
    Status,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // A local .env is a convenience for GOOGLE_API_KEY; absence is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins when set; `--verbose` lowers the default to debug.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "curator=debug,info" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> curator::Result<CuratorConfig> {
    if let Some(config_path) = path {
        return CuratorConfig::load_from_file(std::path::Path::new(config_path))
            .map(CuratorConfig::with_env_overrides);
    }

    if let Ok(config_path) = std::env::var("CURATOR_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return CuratorConfig::load_from_file(std::path::Path::new(&config_path))
                .map(CuratorConfig::with_env_overrides);
        }
    }

    Ok(CuratorConfig::load_default())
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: CuratorConfig) -> curator::Result<()> {
    match cli.command {
        Commands::Serve { host, port } => cmd_serve(&config, &host, port).await,
        Commands::Menu => cmd_menu(&config),
        Commands::Export { output } => cmd_export(&config, output.as_deref()),
        Commands::Status => cmd_status(&config),
    }
}

/// Builds the configured LLM provider.
fn build_provider(config: &CuratorConfig) -> Arc<dyn LlmProvider> {
    let http = LlmHttpConfig::from_config(&config.llm).with_env_overrides();

    match config.llm.provider {
        LlmProviderKind::Gemini => {
            let mut client = GeminiClient::new().with_http_config(http);
            if let Some(key) = &config.llm.api_key {
                client = client.with_api_key(key);
            }
            if let Some(model) = &config.llm.model {
                client = client.with_model(model);
            }
            if let Some(base_url) = &config.llm.base_url {
                client = client.with_endpoint(base_url);
            }
            Arc::new(client)
        },
        LlmProviderKind::Ollama => {
            let mut client = OllamaClient::new().with_http_config(http);
            if let Some(model) = &config.llm.model {
                client = client.with_model(model);
            }
            if let Some(base_url) = &config.llm.base_url {
                client = client.with_endpoint(base_url);
            }
            Arc::new(client)
        },
    }
}

/// Runs the REST API server.
async fn cmd_serve(config: &CuratorConfig, host: &str, port: u16) -> curator::Result<()> {
    config.require_credentials()?;

    let addr: SocketAddr =
        format!("{host}:{port}")
            .parse()
            .map_err(|e| curator::Error::InvalidInput(format!(
                "invalid listen address '{host}:{port}': {e}"
            )))?;

    let store = MemoryStore::open(&config.memory_path);
    let service = CuratorService::with_provider(build_provider(config));
    tracing::info!(provider = service.provider_name(), "LLM provider configured");

    api::serve(AppState::new(store, service), addr).await
}

/// Runs the interactive menu on stdin/stdout.
fn cmd_menu(config: &CuratorConfig) -> curator::Result<()> {
    config.require_credentials()?;

    let store = MemoryStore::open(&config.memory_path);
    let service = CuratorService::with_provider(build_provider(config));

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut menu = Menu::new(
        stdin.lock(),
        stdout.lock(),
        store,
        service,
        config.export_path.clone(),
    );
    menu.run()
}

/// Exports the saved collection to Markdown.
fn cmd_export(config: &CuratorConfig, output: Option<&std::path::Path>) -> curator::Result<()> {
    let store = MemoryStore::open(&config.memory_path);
    let target = output.map_or_else(|| config.export_path.clone(), std::path::Path::to_path_buf);

    let path = export::export_markdown(store.list_articles(), target)?;
    println!(
        "Exported {} articles to {}",
        store.list_articles().len(),
        path.display()
    );
    Ok(())
}

/// Shows configuration and collection status.
fn cmd_status(config: &CuratorConfig) -> curator::Result<()> {
    let store = MemoryStore::open(&config.memory_path);
    let stats = store.stats();

    println!("Curator status");
    println!("  Memory file:      {}", store.path().display());
    println!("  Provider:         {:?}", config.llm.provider);
    println!(
        "  Credentials:      {}",
        if config.require_credentials().is_ok() {
            "ok"
        } else {
            "missing"
        }
    );
    println!("  Saved articles:   {}", store.list_articles().len());
    println!("  Unique tags:      {}", store.list_tags().len());
    println!("  Total searches:   {}", stats.total_searches);
    println!("  Total saves:      {}", stats.total_articles_saved);
    Ok(())
}

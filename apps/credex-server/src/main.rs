use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, AppConfigProvider, CliArgs};

use api_ingress::{ApiIngress, ApiIngressConfig};
use credential_exchange::config::CredentialExchangeConfig;
use credential_exchange::CredentialExchange;
use modkit::{Module, ModuleCtx, ModuleCtxBuilder, RestfulModule, ShutdownOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// Adapter to make AppConfigProvider implement modkit::ConfigProvider
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

const API_INGRESS: &str = "api_ingress";

/// Credex Server - identity to Chime credential exchange gateway
#[derive(Parser)]
#[command(name = "credex-server")]
#[command(about = "Credex Server - exchanges identity tokens for scoped Chime credentials")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Initialize logging
    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Credex Server starting");

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

fn root_context(config: &AppConfig, cancel: CancellationToken) -> ModuleCtx {
    // Provide module configs to modkit
    let config_provider = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(
        config.clone(),
    ))));
    ModuleCtxBuilder::new(cancel)
        .with_config_provider(config_provider)
        .build()
}

async fn run_server(config: AppConfig) -> Result<()> {
    let cancel = modkit::shutdown_token(ShutdownOptions::Signals);
    let root = root_context(&config, cancel.clone());
    validate_module_configs(&root)?;

    tracing::info!("Initializing modules...");
    let ingress_ctx = root.for_module(API_INGRESS);
    let ingress = Arc::new(ApiIngress::default());
    ingress
        .init(&ingress_ctx)
        .await
        .context("api_ingress init failed")?;
    ingress.apply_server_defaults(&config.server.bind_addr());

    let exchange_ctx = root.for_module(CredentialExchange::NAME);
    let exchange = CredentialExchange::default();
    exchange
        .init(&exchange_ctx)
        .await
        .context("credential_exchange init failed")?;

    let routes = exchange.register_rest(&exchange_ctx, axum::Router::new())?;
    ingress.set_router(ingress.build_router(routes)?);

    tracing::info!("Modules initialized, starting HTTP server");
    ingress.serve(cancel).await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let root = root_context(&config, CancellationToken::new());
    validate_module_configs(&root)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}

/// Strict parse of both module sections plus the checks that span them.
fn validate_module_configs(root: &ModuleCtx) -> Result<()> {
    let ingress: ApiIngressConfig = root
        .for_module(API_INGRESS)
        .module_config_or_default()
        .context("invalid api_ingress config")?;
    api_ingress::cors::fixed_headers(&ingress.cors).context("invalid api_ingress config")?;

    let exchange: CredentialExchangeConfig = root
        .for_module(CredentialExchange::NAME)
        .module_config_required()?;
    exchange
        .validate()
        .context("invalid credential_exchange config")?;
    exchange
        .ensure_deadline_within(Duration::from_secs(ingress.timeout_sec))
        .context("invalid credential_exchange config")?;

    Ok(())
}

// src/main.rs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hc::{HcClient, HcConfig, Server, ServerConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hc")]
#[command(author, version, about = "Homework collection server", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/hc/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Create or migrate the database
    Init {
        /// Data directory (default: $XDG_DATA_HOME/hc)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Load-test a running server
    Bench {
        /// Server URL
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,
        /// Concurrent workers
        #[arg(short, long, default_value_t = 6)]
        threads: usize,
        /// Total tasks shared by all workers
        #[arg(short = 'n', long, default_value_t = 10000)]
        tasks: usize,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Host to listen on (default: localhost)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (default: 8080)
    #[arg(short, long)]
    port: Option<u16>,
    /// Data directory (default: $XDG_DATA_HOME/hc)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => cmd_serve(cli.config.as_deref(), args).await,
        Commands::Init { data_dir } => cmd_init(cli.config.as_deref(), data_dir),
        Commands::Bench {
            url,
            threads,
            tasks,
        } => cmd_bench(&url, threads, tasks).await,
    }
}

/// Merge the config file with command-line overrides
fn server_config(config_path: Option<&Path>, args: ServeArgs) -> Result<ServerConfig> {
    let mut file_config = HcConfig::discover(config_path)?;
    if let Some(data_dir) = args.data_dir {
        file_config.storage.data_dir = Some(data_dir);
    }
    if file_config.uses_default_admin() {
        warn!("Using default admin credentials; set [admin] in the config file");
    }

    let mut config = file_config
        .to_server_config()
        .context("Failed to resolve server configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}

async fn cmd_serve(config_path: Option<&Path>, args: ServeArgs) -> Result<()> {
    let config = server_config(config_path, args)?;
    info!("Data directory: {}", config.data_dir.display());

    let mut server = Server::new(config).context("Failed to load server data")?;
    server.start().await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Received Ctrl-C, shutting down");
        }
        _ = server.wait() => {
            info!("Shutdown requested over the API");
        }
    }

    server.stop().await;
    Ok(())
}

fn cmd_init(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<()> {
    let config = server_config(
        config_path,
        ServeArgs {
            data_dir,
            ..ServeArgs::default()
        },
    )?;

    hc::db::init(&config.db_path)?;
    std::fs::create_dir_all(&config.files_dir)
        .with_context(|| format!("Failed to create {}", config.files_dir.display()))?;
    println!("Database initialized at {}", config.db_path.display());
    Ok(())
}

async fn cmd_bench(url: &str, threads: usize, tasks: usize) -> Result<()> {
    let client = HcClient::new(url)?;
    info!("Benchmarking {} with {} worker(s), {} task(s)", url, threads, tasks);

    let report = hc::bench::run(client, threads, tasks).await?;
    println!("{}", report);
    Ok(())
}

//! atlas-mcp CLI - entry point for the Atlassian MCP server

use anyhow::Result;
use clap::{Parser, Subcommand};

use atlas_mcp_core::config::AppConfig;
use atlas_mcp_core::policy;

#[derive(Parser)]
#[command(name = "atlas-mcp")]
#[command(about = "MCP server exposing Jira and Confluence tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Listen port, overriding the PORT environment variable
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List the tools enabled under the current configuration
    Tools,
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let mut config = AppConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            config.warn_on_missing();
            policy::log_enabled_tools(&config);
            atlas_mcp_core::mcp::serve(config).await?;
        }
        Commands::Tools => {
            let config = AppConfig::from_env()?;
            for spec in policy::enabled_tools(&config) {
                println!("{}\t{}", spec.name, spec.description);
            }
        }
        Commands::Version => {
            println!("atlas-mcp {}", env!("CARGO_PKG_VERSION"));
            println!("atlas-mcp-core {}", atlas_mcp_core::VERSION);
        }
    }

    Ok(())
}

//! medrelay - chat relay for symptom-based medicine recommendations.
//!
//! A small HTTP service that accepts free-text symptom descriptions and
//! relays them to a chat-completion provider with a fixed system prompt.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medrelay::config::Config;

#[derive(Parser)]
#[command(name = "medrelay")]
#[command(about = "Chat backend that relays symptom descriptions to an LLM medicine recommender")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration file
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medrelay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            tracing::info!(config = %config, "Loading configuration");
            let (mut config, key_source) = Config::from_file_with_env(&config)?;

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            tracing::info!(
                provider = %config.provider.name,
                key_source = %key_source,
                "Resolved provider API key"
            );

            medrelay::proxy::run_server(config).await
        }

        Commands::Check { config: path } => {
            let (config, key_source) = Config::from_file_with_env(&path)?;

            tracing::info!(listen = %config.server.listen, "Server");
            tracing::info!(
                name = %config.provider.name,
                url = %config.provider.url,
                model = %config.provider.model,
                timeout_secs = config.provider.timeout_secs,
                key_source = %key_source,
                "Provider"
            );
            tracing::info!(config = %path, "Configuration OK");
            Ok(())
        }
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};

use catalog_kernel::settings::Settings;

/// Book catalog service
#[derive(Debug, Parser)]
#[command(name = "catalog", version, about)]
struct Cli {
    /// Override `database.url` from the layered settings
    #[arg(long, global = true, env = "CATALOG_DATABASE__URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations and exit
    Migrate,
    /// Run the HTTP server
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load catalog settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    catalog_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Migrate => {
            let applied = catalog_app::app::migrate(&settings).await?;
            tracing::info!(applied, db = %settings.database.url, "migrations complete");
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            catalog_app::app::serve(settings).await?;
        }
    }

    Ok(())
}

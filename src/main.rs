use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use zksdk_stats::engine::aggregate::fetch_aggregate_downloads;
use zksdk_stats::engine::poller::StatsPoller;
use zksdk_stats::logging::init_tracing;
use zksdk_stats::server::handler::StatsServer;
use zksdk_stats::source::npm_source::NpmRegistrySource;
use zksdk_stats::source::traits::DateRange;
use zksdk_stats::StatsConfig;

#[derive(Parser)]
#[command(name = "zksdk-stats", version, about = "npm download totals for the zkthings packages")]
struct Cli {
    /// JSON config file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one aggregation cycle and print the result.
    Once {
        /// Print the full report as JSON instead of the display value.
        #[arg(long)]
        json: bool,
    },
    /// Keep the total fresh and serve it over HTTP until Ctrl-C.
    Serve {
        /// Overrides `listen_addr` from the config.
        #[arg(long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StatsConfig::from_file(path)?,
        None => StatsConfig::default(),
    };
    let source = Arc::new(NpmRegistrySource::new(
        config.registry_url.clone(),
        config.request_timeout(),
        config.registry_headers.clone(),
    )?);
    let packages = config.packages();

    match cli.command {
        Command::Once { json } => {
            let range = DateRange::until_today(config.start_date);
            let report = fetch_aggregate_downloads(
                source.as_ref(),
                &packages,
                range,
                &config.fallback_display,
            )
            .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.display);
            }
        }
        Command::Serve { listen } => {
            let addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            let poller = Arc::new(StatsPoller::new(source, packages, &config));
            poller.start();
            let server = StatsServer::start(poller.clone(), &addr).await?;
            info!("serving download stats on {}", server.url("/api/downloads"));

            tokio::signal::ctrl_c().await?;
            info!("shutting down");
            poller.stop();
            server.shutdown();
        }
    }

    Ok(())
}

//! Main entry point for the `ingot` command line.

use clap::Parser;
use tracing::info;

use ingot_server::{
    command,
    model::config::{Cli, Configuration},
    startup::{self, Application},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let configuration = Configuration::new(&cli)?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let metrics = ingot_server::metrics::init_metrics()?;

    let app = Application::build(&configuration)?;
    info!("Ingot started");

    let outcome = command::run(&app, &cli.command).await;

    app.shutdown()?;

    if let Some(path) = configuration.metrics_export_path() {
        ingot_server::metrics::export_metrics(&metrics, &path).await?;
        info!(path = %path.display(), "Metrics exported");
    }

    outcome
}

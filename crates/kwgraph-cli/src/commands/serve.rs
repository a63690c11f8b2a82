//! Web server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use kwgraph_analysis::{AnalysisWorker, GraphService};
use kwgraph_core::Settings;
use kwgraph_web::AppState;
use tracing::{error, info};

use super::{build_clients, build_orchestrator, connect_store};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides settings)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides settings)
    #[arg(long)]
    pub host: Option<String>,

    /// Queued analyses allowed before submissions wait
    #[arg(long, default_value = "64")]
    pub queue: usize,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, default_value = "logs/kwgraph.log")]
    pub log_file: PathBuf,
}

pub async fn execute(args: ServeArgs, settings: Settings) -> Result<()> {
    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);

    let (client, store) = connect_store(&settings).await?;
    if let Err(e) = kwgraph_graph::initialize_schema(&client).await {
        error!(error = %e, "Schema initialization failed; continuing without constraints");
    }

    let (search, gateway) = build_clients(&settings)?;
    let orchestrator = build_orchestrator(&settings, store.clone(), search.clone(), gateway.clone());
    let worker = Arc::new(AnalysisWorker::spawn(Arc::new(orchestrator), args.queue));
    let state = AppState::new(search, gateway, GraphService::new(store), worker.clone());

    println!();
    println!("  {} {}", "kwgraph".cyan().bold(), "API Server".bold());
    println!();
    println!("  {}     http://{}:{}/api", "API".green(), host, port);
    println!("  {}  http://{}:{}/healthz", "Health".green(), host, port);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let served = kwgraph_web::run_server(state, &host, port, shutdown_signal()).await;

    info!("Waiting for running analyses to finish");
    worker.shutdown().await;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

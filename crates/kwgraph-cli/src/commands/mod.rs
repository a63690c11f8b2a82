//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kwgraph_analysis::GraphAnalysisOrchestrator;
use kwgraph_core::Settings;
use kwgraph_extract::{ExtractionGateway, OpenAiExtractor};
use kwgraph_graph::{GraphClient, GraphStore, Neo4jGraphStore};
use kwgraph_search::{DocumentSearch, ElasticsearchClient};

pub mod graph;
pub mod run;
pub mod serve;

/// kwgraph - keyword graph expansion
#[derive(Parser)]
#[command(name = "kwgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file (defaults to ./kwgraph.toml when present)
    #[arg(short, long, global = true, env = "KWGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API and background analysis worker
    Serve(serve::ServeArgs),

    /// Analyze a seed keyword and expand around it in the foreground
    Run(run::RunArgs),

    /// Print the subgraph around a seed keyword
    Show(graph::ShowArgs),

    /// Create graph uniqueness constraints
    Schema,

    /// Show graph node and relationship counts
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, settings).await,
            Commands::Run(args) => run::execute(args, settings).await,
            Commands::Show(args) => graph::show(args, &settings).await,
            Commands::Schema => graph::schema(&settings).await,
            Commands::Status => graph::status(&settings).await,
        }
    }
}

/// Connect the graph store. One client (and pool) per process.
pub(crate) async fn connect_store(settings: &Settings) -> Result<(GraphClient, Arc<dyn GraphStore>)> {
    let client = GraphClient::connect(&settings.graph).await?;
    let store: Arc<dyn GraphStore> = Arc::new(Neo4jGraphStore::new(client.clone()));
    Ok((client, store))
}

/// Search client and extraction gateway.
pub(crate) fn build_clients(settings: &Settings) -> Result<(Arc<dyn DocumentSearch>, ExtractionGateway)> {
    if settings.extraction.api_key.is_empty() {
        tracing::warn!("No extraction API key configured (OPENAI_API_KEY); extraction requests will fail");
    }
    let search: Arc<dyn DocumentSearch> = Arc::new(ElasticsearchClient::new(&settings.search)?);
    let extractor = Arc::new(OpenAiExtractor::new(&settings.extraction)?);
    let gateway = ExtractionGateway::new(extractor, settings.extraction.batch_size);
    Ok((search, gateway))
}

pub(crate) fn build_orchestrator(
    settings: &Settings,
    store: Arc<dyn GraphStore>,
    search: Arc<dyn DocumentSearch>,
    gateway: ExtractionGateway,
) -> GraphAnalysisOrchestrator {
    GraphAnalysisOrchestrator::new(store, search, gateway)
        .with_stages(settings.analysis.stages.clone())
        .with_title_pointer(settings.search.title_pointer.clone())
}

//! Graph inspection commands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use kwgraph_analysis::{GraphService, ShowGraphRequest};
use kwgraph_core::Settings;

use super::connect_store;
use crate::output;

#[derive(Args)]
pub struct ShowArgs {
    /// Seed keyword
    pub seed_keyword: String,

    /// Traversal depth (1-5)
    #[arg(long, default_value = "2")]
    pub depth: u32,

    /// Only edges scoring above this
    #[arg(long, default_value = "0.0")]
    pub min_score: f64,

    /// Only keywords of this entity type (Proper or General)
    #[arg(long)]
    pub entity_type: Option<String>,

    /// Only keywords tagged with this IAB category
    #[arg(long)]
    pub iab_category: Option<String>,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn show(args: ShowArgs, settings: &Settings) -> Result<()> {
    let (_client, store) = connect_store(settings).await?;
    let service = GraphService::new(store);

    let request = ShowGraphRequest {
        max_depth: args.depth,
        min_score: args.min_score,
        entity_type: args.entity_type,
        iab_category: args.iab_category,
        ..ShowGraphRequest::new(args.seed_keyword)
    };
    let data = service.show_graph(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        output::print_graph(&request.seed_keyword, &data);
    }
    Ok(())
}

pub async fn schema(settings: &Settings) -> Result<()> {
    let (client, _store) = connect_store(settings).await?;
    kwgraph_graph::initialize_schema(&client).await?;
    println!("{}", "Schema initialized.".green().bold());
    Ok(())
}

pub async fn status(settings: &Settings) -> Result<()> {
    let (_client, store) = connect_store(settings).await?;
    let counts = GraphService::new(store).counts().await?;

    println!("{}", "Graph Status".bold());
    println!("{}", "─".repeat(30));
    println!("  {}: {}", "URI".dimmed(), settings.graph.uri);
    println!("  {}: {}", "Nodes".dimmed(), counts.nodes);
    println!("  {}: {}", "Relationships".dimmed(), counts.relationships);
    Ok(())
}

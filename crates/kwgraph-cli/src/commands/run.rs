//! Foreground analysis command.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use kwgraph_analysis::AnalysisRequest;
use kwgraph_core::Settings;

use super::{build_clients, build_orchestrator, connect_store};

#[derive(Args)]
pub struct RunArgs {
    /// Seed keyword
    pub seed_keyword: String,

    /// Search index holding candidate documents
    #[arg(long)]
    pub index: String,

    /// Document field matched against the keyword
    #[arg(long, default_value = "snippet.title")]
    pub field: String,

    /// Candidate documents fetched per keyword (overrides settings)
    #[arg(long)]
    pub max_titles: Option<usize>,

    /// Only analyze the seed, skip expansion
    #[arg(long)]
    pub no_expand: bool,
}

pub async fn execute(args: RunArgs, settings: Settings) -> Result<()> {
    let request = AnalysisRequest::new(args.seed_keyword.trim(), args.index, args.field)
        .max_titles(args.max_titles.unwrap_or(settings.analysis.max_titles));
    request.validate()?;

    let (_client, store) = connect_store(&settings).await?;
    let (search, gateway) = build_clients(&settings)?;
    let orchestrator = build_orchestrator(&settings, store, search, gateway);

    println!("{} {}", "Analyzing".bold(), request.seed_keyword.cyan());

    if args.no_expand {
        let outcome = orchestrator.process_keyword(&request).await;
        if !outcome.succeeded() {
            bail!(
                "Analysis of '{}' aborted while {}: {}",
                outcome.seed_keyword,
                outcome.aborted_at.map(|s| s.as_str()).unwrap_or("starting"),
                outcome.reason.unwrap_or_default()
            );
        }
        println!(
            "{} {} titles, {} related keywords",
            "Done:".green().bold(),
            outcome.titles,
            outcome.keywords
        );
        return Ok(());
    }

    println!(
        "{} {} expansion stages",
        "Schedule:".dimmed(),
        orchestrator.stages().len()
    );
    if !orchestrator.execute(&request).await {
        bail!("Analysis of '{}' failed; see logs", request.seed_keyword);
    }
    println!("{}", "Analysis and expansion complete.".green().bold());
    Ok(())
}

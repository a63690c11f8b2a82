//! Terminal output formatting.

use std::collections::HashMap;

use colored::{ColoredString, Colorize};
use kwgraph_graph::GraphData;

fn entity_colored(entity_type: &str) -> ColoredString {
    match entity_type {
        "Proper" => entity_type.cyan(),
        "General" => entity_type.green(),
        _ => entity_type.dimmed(),
    }
}

fn score_colored(score: f64) -> ColoredString {
    let text = format!("{:.2}", score);
    if score >= 0.9 {
        text.green().bold()
    } else if score >= 0.5 {
        text.yellow()
    } else {
        text.dimmed()
    }
}

/// Print the nodes and edges of a subgraph.
pub fn print_graph(seed_keyword: &str, data: &GraphData) {
    println!("{} {}", "Graph around".bold(), seed_keyword.cyan().bold());
    println!("{}", "─".repeat(50));

    if data.nodes.is_empty() {
        println!("{}", "No related keywords found.".dimmed());
        return;
    }

    println!("{} ({})", "Keywords".bold(), data.nodes.len());
    for node in &data.nodes {
        let categories = if node.iab_categories.is_empty() {
            String::new()
        } else {
            format!(" [{}]", node.iab_categories.join(", "))
        };
        println!(
            "  {} {}{}",
            node.label,
            entity_colored(&node.entity_type),
            categories.dimmed()
        );
    }

    let names: HashMap<&str, &str> = data
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.label.as_str()))
        .collect();

    println!();
    println!("{} ({})", "Relations".bold(), data.edges.len());
    for edge in &data.edges {
        let from = names.get(edge.from_node.as_str()).copied().unwrap_or("?");
        let to = names.get(edge.to_node.as_str()).copied().unwrap_or("?");
        println!("  {} {} {}  {}", from, "→".dimmed(), to, score_colored(edge.score));
    }
}

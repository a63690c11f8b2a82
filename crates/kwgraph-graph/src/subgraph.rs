//! Subgraph assembly shared by every store implementation.

use std::collections::HashSet;

use kwgraph_core::model::string_list;
use serde_json::Value;

use crate::model::{GraphEdge, GraphNode};
use crate::score::coerce_score;

/// Group assigned to every keyword node in viewer output.
pub const KEYWORD_GROUP: &str = "Keyword";

/// Build a viewer node. `iab_categories` is normalized to a list whatever
/// shape the store returned.
pub fn keyword_node(id: String, name: String, entity_type: Option<String>, iab_categories: &Value) -> GraphNode {
    GraphNode {
        id,
        label: name,
        group: KEYWORD_GROUP.to_string(),
        entity_type: entity_type.unwrap_or_default(),
        iab_categories: string_list(iab_categories),
    }
}

/// Build a viewer edge, coercing the raw score. Unreadable scores yield `None`.
pub fn scored_edge(id: String, from_node: String, to_node: String, raw_score: &Value) -> Option<GraphEdge> {
    coerce_score(raw_score).map(|score| GraphEdge {
        id,
        from_node,
        to_node,
        score,
    })
}

/// Deduplicate nodes and edges by id and drop nodes that are not an endpoint
/// of any surviving edge.
pub fn assemble(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let mut seen_edges = HashSet::new();
    let edges: Vec<GraphEdge> = edges
        .into_iter()
        .filter(|e| seen_edges.insert(e.id.clone()))
        .collect();

    let endpoints: HashSet<&str> = edges
        .iter()
        .flat_map(|e| [e.from_node.as_str(), e.to_node.as_str()])
        .collect();

    let mut seen_nodes = HashSet::new();
    let nodes = nodes
        .into_iter()
        .filter(|n| endpoints.contains(n.id.as_str()))
        .filter(|n| seen_nodes.insert(n.id.clone()))
        .collect();

    (nodes, edges)
}

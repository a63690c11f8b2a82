//! GraphStore trait definition
//!
//! The abstract interface the registration and analysis layers talk to.
//! `Neo4jGraphStore` is the production implementation; the in-memory store
//! (feature `test-utils`) mirrors the same semantics for tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{EdgeLabel, GraphCounts, GraphData, GraphNode, NodeLabel, Properties, SubgraphRequest};

/// Abstract interface for keyword graph operations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Find-or-create the node `(label, name)`, then overwrite every given
    /// property. Returns the store id of the node.
    async fn upsert_node(&self, label: NodeLabel, name: &str, properties: &Properties) -> Result<String>;

    /// Find-or-create the `label` edge `from_id -> to_id`. The score is set
    /// only when supplied. Fails when either endpoint does not exist.
    async fn upsert_edge(&self, from_id: &str, to_id: &str, label: EdgeLabel, score: Option<f64>) -> Result<()>;

    /// Bounded-depth subgraph around a seed keyword, orphans removed.
    async fn fetch_subgraph(&self, request: &SubgraphRequest) -> Result<GraphData>;

    /// Keywords within `max_depth` hops of every seed.
    async fn fetch_common_nodes(&self, seeds: &[String], max_depth: u32) -> Result<Vec<GraphNode>>;

    /// Names of keywords the seed points at that pass the score and type
    /// filters and have no outbound RELATED_TO edges yet.
    async fn new_and_eligible_keywords(
        &self,
        seed_keyword: &str,
        min_score: f64,
        entity_type: &str,
        max_depth: u32,
    ) -> Result<Vec<String>>;

    /// Node and relationship totals.
    async fn counts(&self) -> Result<GraphCounts>;
}

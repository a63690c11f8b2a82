//! Read side of the keyword graph.

use std::sync::Arc;

use anyhow::Result;
use kwgraph_graph::{GraphCounts, GraphData, GraphNode, GraphStore, SubgraphRequest};
use serde::Deserialize;
use tracing::info;

fn default_max_depth() -> u32 {
    2
}

/// Parameters for [`GraphService::show_graph`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShowGraphRequest {
    pub seed_keyword: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default)]
    pub min_score: f64,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub iab_category: Option<String>,
}

impl ShowGraphRequest {
    pub fn new(seed_keyword: impl Into<String>) -> Self {
        Self {
            seed_keyword: seed_keyword.into(),
            max_depth: default_max_depth(),
            min_score: 0.0,
            entity_type: None,
            iab_category: None,
        }
    }
}

impl From<&ShowGraphRequest> for SubgraphRequest {
    fn from(req: &ShowGraphRequest) -> Self {
        SubgraphRequest::new(req.seed_keyword.trim(), req.max_depth)
            .min_score(req.min_score)
            .entity_type(req.entity_type.clone())
            .iab_category(req.iab_category.clone())
    }
}

/// Graph queries for viewers.
#[derive(Clone)]
pub struct GraphService {
    store: Arc<dyn GraphStore>,
}

impl GraphService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn show_graph(&self, request: &ShowGraphRequest) -> Result<GraphData> {
        let data = self.store.fetch_subgraph(&request.into()).await?;
        info!(
            seed_keyword = %request.seed_keyword,
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "Graph fetched"
        );
        Ok(data)
    }

    pub async fn common_nodes(&self, seeds: &[String], max_depth: u32) -> Result<Vec<GraphNode>> {
        self.store.fetch_common_nodes(seeds, max_depth).await
    }

    pub async fn counts(&self) -> Result<GraphCounts> {
        self.store.counts().await
    }
}

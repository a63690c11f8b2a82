//! Graph submission and viewer queries.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use kwgraph_analysis::{Acknowledgement, AnalysisRequest, ShowGraphRequest};
use kwgraph_graph::cypher::MAX_TRAVERSAL_DEPTH;
use kwgraph_graph::{GraphData, GraphNode};
use serde::{Deserialize, Serialize};

use super::{bad_request, internal};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CommonNodesRequest {
    pub seeds: Vec<String>,
    pub max_depth: Option<u32>,
}

#[derive(Serialize)]
pub struct CommonNodesResponse {
    pub nodes: Vec<GraphNode>,
}

fn check_depth(max_depth: u32) -> Result<(), (StatusCode, String)> {
    if (1..=MAX_TRAVERSAL_DEPTH).contains(&max_depth) {
        Ok(())
    } else {
        Err(bad_request(format!(
            "max_depth must be between 1 and {}, got {}",
            MAX_TRAVERSAL_DEPTH, max_depth
        )))
    }
}

/// Queue a full analysis and return before it runs.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<(StatusCode, Json<Acknowledgement>), (StatusCode, String)> {
    req.validate().map_err(bad_request)?;

    let ack = state
        .worker
        .submit(req)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok((StatusCode::ACCEPTED, Json(ack)))
}

pub async fn show_graph(
    State(state): State<AppState>,
    Query(req): Query<ShowGraphRequest>,
) -> Result<Json<GraphData>, (StatusCode, String)> {
    if req.seed_keyword.trim().is_empty() {
        return Err(bad_request("seed_keyword must not be blank"));
    }
    check_depth(req.max_depth)?;

    let data = state.graph.show_graph(&req).await.map_err(internal)?;
    Ok(Json(data))
}

pub async fn common_nodes(
    State(state): State<AppState>,
    Json(req): Json<CommonNodesRequest>,
) -> Result<Json<CommonNodesResponse>, (StatusCode, String)> {
    let seeds: Vec<String> = req.seeds.iter().map(|s| s.trim().to_string()).collect();
    if seeds.is_empty() || seeds.iter().any(String::is_empty) {
        return Err(bad_request("seeds must be a non-empty list of keywords"));
    }
    let max_depth = req.max_depth.unwrap_or(2);
    check_depth(max_depth)?;

    let nodes = state
        .graph
        .common_nodes(&seeds, max_depth)
        .await
        .map_err(internal)?;
    Ok(Json(CommonNodesResponse { nodes }))
}

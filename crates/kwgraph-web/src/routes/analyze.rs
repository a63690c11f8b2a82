//! Candidate search and one-shot keyword analysis.

use axum::{extract::State, http::StatusCode, Json};
use kwgraph_core::ExtractedKeyword;
use kwgraph_search::DEFAULT_RESULT_SIZE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{bad_request, internal};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CandidatesRequest {
    pub index: String,
    pub field: String,
    pub keyword: String,
    pub size: Option<usize>,
}

#[derive(Serialize)]
pub struct CandidatesResponse {
    pub keyword: String,
    pub candidates: Vec<Value>,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub seed_keyword: String,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub seed_keyword: String,
    pub results: Vec<ExtractedKeyword>,
}

pub async fn candidates(
    State(state): State<AppState>,
    Json(req): Json<CandidatesRequest>,
) -> Result<Json<CandidatesResponse>, (StatusCode, String)> {
    let keyword = req.keyword.trim();
    if keyword.is_empty() {
        return Err(bad_request("keyword must not be blank"));
    }
    if req.index.trim().is_empty() || req.field.trim().is_empty() {
        return Err(bad_request("index and field must not be blank"));
    }

    let size = req.size.unwrap_or(DEFAULT_RESULT_SIZE);
    let candidates = state
        .search
        .search(&req.index, &req.field, keyword, size)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    tracing::info!(keyword, found = candidates.len(), "Found candidates");
    Ok(Json(CandidatesResponse {
        keyword: keyword.to_string(),
        candidates,
    }))
}

/// Extract related keywords from the given titles without touching the graph.
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    let seed_keyword = req.seed_keyword.trim().to_string();
    if seed_keyword.is_empty() {
        return Err(bad_request("seed_keyword must not be blank"));
    }

    let titles: Vec<String> = req
        .children
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let results = state
        .gateway
        .analyze(&seed_keyword, &titles, true)
        .await
        .map_err(internal)?;

    Ok(Json(AnalyzeResponse { seed_keyword, results }))
}

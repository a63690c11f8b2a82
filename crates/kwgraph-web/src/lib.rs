//! kwgraph Web Server
//!
//! Axum-based JSON API for candidate search, keyword analysis, background
//! graph expansion and graph viewing.

pub mod routes;
pub mod state;

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/candidates", post(routes::analyze::candidates))
        .route("/analyze", post(routes::analyze::analyze))
        .route("/graph", get(routes::graph::show_graph))
        .route("/graph/submit", post(routes::graph::submit))
        .route("/graph/common", post(routes::graph::common_nodes));

    Router::new()
        .route("/healthz", get(routes::health::healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until `shutdown` resolves.
pub async fn run_server<F>(state: AppState, host: &str, port: u16, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use kwgraph_analysis::{AnalysisWorker, GraphAnalysisOrchestrator, GraphService};
    use kwgraph_core::{EntityType, ExtractedKeyword};
    use kwgraph_extract::{ExtractionGateway, KeywordExtractor};
    use kwgraph_graph::memory::MemoryGraphStore;
    use kwgraph_graph::{EdgeLabel, GraphStore, NodeLabel, Properties};
    use kwgraph_search::DocumentSearch;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct OneDocSearch;

    #[async_trait]
    impl DocumentSearch for OneDocSearch {
        async fn search(&self, _index: &str, _field: &str, keyword: &str, _size: usize) -> Result<Vec<Value>> {
            Ok(vec![json!({"snippet": {"title": format!("all about {keyword}")}})])
        }
    }

    struct BarExtractor;

    #[async_trait]
    impl KeywordExtractor for BarExtractor {
        async fn extract(&self, _seed: &str, titles: &[String]) -> Result<Vec<ExtractedKeyword>> {
            Ok(titles
                .iter()
                .map(|_| ExtractedKeyword::new("bar", 0.95, EntityType::Proper))
                .collect())
        }
    }

    fn test_state() -> (AppState, Arc<MemoryGraphStore>) {
        let memory = Arc::new(MemoryGraphStore::new());
        let store: Arc<dyn GraphStore> = memory.clone();
        let search: Arc<dyn DocumentSearch> = Arc::new(OneDocSearch);
        let gateway = ExtractionGateway::new(Arc::new(BarExtractor), 10);
        let orchestrator = GraphAnalysisOrchestrator::new(store.clone(), search.clone(), gateway.clone());
        let worker = Arc::new(AnalysisWorker::spawn(Arc::new(orchestrator), 8));
        let state = AppState::new(search, gateway, GraphService::new(store), worker);
        (state, memory)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let (state, _) = test_state();
        let (status, body) = send(create_router(state), get("/healthz")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "UP"}));
    }

    #[tokio::test]
    async fn test_candidates() {
        let (state, _) = test_state();
        let req = post_json(
            "/api/candidates",
            json!({"index": "videos", "field": "snippet.title", "keyword": "foo"}),
        );
        let (status, body) = send(create_router(state), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidates"][0]["snippet"]["title"], "all about foo");
    }

    #[tokio::test]
    async fn test_blank_keyword_is_rejected() {
        let (state, _) = test_state();
        let app = create_router(state);

        let req = post_json("/api/candidates", json!({"index": "v", "field": "f", "keyword": "  "}));
        let (status, _) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = post_json("/api/analyze", json!({"seed_keyword": "", "children": ["t"]}));
        let (status, _) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, get("/api/graph?seed_keyword=%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_returns_extracted_keywords() {
        let (state, memory) = test_state();
        let req = post_json("/api/analyze", json!({"seed_keyword": "foo", "children": ["a title"]}));
        let (status, body) = send(create_router(state), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seed_keyword"], "foo");
        assert_eq!(body["results"][0]["keyword"], "bar");
        assert_eq!(body["results"][0]["entity_type"], "Proper");
        assert_eq!(memory.counts().await.unwrap().nodes, 0);
    }

    #[tokio::test]
    async fn test_submit_accepts_and_runs_in_background() {
        let (state, memory) = test_state();
        let worker = state.worker.clone();
        let req = post_json(
            "/api/graph/submit",
            json!({"seed_keyword": "foo", "index": "videos", "field": "snippet.title"}),
        );
        let (status, body) = send(create_router(state), req).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["seed_keyword"], "foo");
        assert!(body["task_id"].as_str().is_some());

        worker.shutdown().await;
        assert_eq!(memory.related_score("foo", "bar").await, Some(Some(0.95)));
    }

    #[tokio::test]
    async fn test_submit_validates_max_titles() {
        let (state, _) = test_state();
        let req = post_json(
            "/api/graph/submit",
            json!({"seed_keyword": "foo", "index": "videos", "field": "title", "max_titles": 501}),
        );
        let (status, _) = send(create_router(state), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_refused_once_worker_stops() {
        let (state, _) = test_state();
        state.worker.shutdown().await;
        let req = post_json(
            "/api/graph/submit",
            json!({"seed_keyword": "foo", "index": "videos", "field": "snippet.title"}),
        );
        let (status, _) = send(create_router(state), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_show_graph_and_common_nodes() {
        let (state, memory) = test_state();
        for (from, to, score) in [("a", "shared", 0.9), ("b", "shared", 0.8), ("a", "x", 0.2)] {
            let from_id = memory.upsert_node(NodeLabel::Keyword, from, &Properties::new()).await.unwrap();
            let props = Properties::new().with("entity_type", "Proper");
            let to_id = memory.upsert_node(NodeLabel::Keyword, to, &props).await.unwrap();
            memory.upsert_edge(&from_id, &to_id, EdgeLabel::RelatedTo, Some(score)).await.unwrap();
        }
        let app = create_router(state);

        let (status, body) = send(app.clone(), get("/api/graph?seed_keyword=a&min_score=0.5")).await;
        assert_eq!(status, StatusCode::OK);
        let labels: Vec<&str> = body["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|n| n["label"].as_str())
            .collect();
        assert!(labels.contains(&"shared"));
        assert!(!labels.contains(&"x"));
        assert!(body["edges"].as_array().unwrap().iter().all(|e| e["score"].as_f64().unwrap() > 0.5));

        let (status, _) = send(app.clone(), get("/api/graph?seed_keyword=a&max_depth=9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = post_json("/api/graph/common", json!({"seeds": ["a", "b"], "max_depth": 1}));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nodes"][0]["label"], "shared");
        assert_eq!(body["nodes"].as_array().unwrap().len(), 1);
    }
}

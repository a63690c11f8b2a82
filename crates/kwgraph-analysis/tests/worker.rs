mod common;

use std::sync::Arc;

use common::{proper, Harness};
use kwgraph_analysis::{AnalysisRequest, AnalysisWorker, GraphService, ShowGraphRequest, SubmitError};
use kwgraph_graph::GraphStore;

#[tokio::test]
async fn test_submit_acknowledges_and_shutdown_drains() {
    let h = Harness::new();
    h.keyword("foo", vec![proper("bar", 0.95)]);
    h.keyword("baz", vec![proper("qux", 0.5)]);

    let worker = AnalysisWorker::spawn(Arc::new(h.orchestrator()), 8);
    let first = worker
        .submit(AnalysisRequest::new("foo", "videos", "snippet.title"))
        .unwrap();
    let second = worker
        .submit(AnalysisRequest::new("baz", "videos", "snippet.title"))
        .unwrap();

    assert_eq!(first.seed_keyword, "foo");
    assert_ne!(first.task_id, second.task_id);

    worker.shutdown().await;

    assert_eq!(h.store.related_score("foo", "bar").await, Some(Some(0.95)));
    assert_eq!(h.store.related_score("baz", "qux").await, Some(Some(0.5)));
    assert_eq!(
        worker.submit(AnalysisRequest::new("late", "videos", "snippet.title")),
        Err(SubmitError::ShutDown)
    );

    // A second shutdown is a no-op.
    worker.shutdown().await;
}

#[tokio::test]
async fn test_full_queue_refuses_without_waiting() {
    let h = Harness::new();
    h.keyword("foo", vec![proper("bar", 0.95)]);

    // Current-thread runtime: the receive loop cannot run until this test
    // yields, so the single slot stays taken.
    let worker = AnalysisWorker::spawn(Arc::new(h.orchestrator()), 1);
    worker
        .submit(AnalysisRequest::new("foo", "videos", "snippet.title"))
        .unwrap();
    assert_eq!(
        worker.submit(AnalysisRequest::new("baz", "videos", "snippet.title")),
        Err(SubmitError::QueueFull)
    );

    worker.shutdown().await;
    assert_eq!(h.search.calls(), vec!["foo"]);
}

#[tokio::test]
async fn test_show_graph_after_analysis() {
    let h = Harness::new();
    h.keyword("foo", vec![proper("bar", 0.95), proper("low", 0.1)]);
    h.keyword("bar", vec![proper("deep", 0.8)]);

    assert!(h
        .orchestrator()
        .execute(&AnalysisRequest::new("foo", "videos", "snippet.title"))
        .await);

    let store: Arc<dyn GraphStore> = h.store.clone();
    let service = GraphService::new(store);

    let all = service.show_graph(&ShowGraphRequest::new("foo")).await.unwrap();
    assert_eq!(all.edges.len(), 3);
    assert_eq!(all.nodes.len(), 4);
    assert!(all.nodes.iter().all(|n| n.group == "Keyword"));

    let strict = service
        .show_graph(&ShowGraphRequest {
            min_score: 0.5,
            ..ShowGraphRequest::new("foo")
        })
        .await
        .unwrap();
    let names: Vec<&str> = strict.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(strict.edges.len(), 2);
    assert!(!names.contains(&"low"));

    let shallow = service
        .show_graph(&ShowGraphRequest {
            max_depth: 1,
            ..ShowGraphRequest::new("foo")
        })
        .await
        .unwrap();
    assert_eq!(shallow.edges.len(), 2);

    let counts = service.counts().await.unwrap();
    assert_eq!(counts.nodes, 4);
}

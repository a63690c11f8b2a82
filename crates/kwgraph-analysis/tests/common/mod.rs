//! Fakes shared by the analysis integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use kwgraph_analysis::GraphAnalysisOrchestrator;
use kwgraph_core::{EntityType, ExtractedKeyword};
use kwgraph_extract::{ExtractionGateway, KeywordExtractor};
use kwgraph_graph::memory::MemoryGraphStore;
use kwgraph_graph::GraphStore;
use kwgraph_search::DocumentSearch;
use serde_json::{json, Value};

/// Search index keyed by keyword. Keywords without titles return no hits.
#[derive(Default)]
pub struct FakeSearch {
    titles: Mutex<HashMap<String, Vec<String>>>,
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
    sizes: Mutex<Vec<usize>>,
}

impl FakeSearch {
    pub fn with_titles(&self, keyword: &str, titles: &[&str]) {
        self.titles
            .lock()
            .unwrap()
            .insert(keyword.to_string(), titles.iter().map(|t| t.to_string()).collect());
    }

    /// Fail the next `times` searches for `keyword`.
    pub fn fail(&self, keyword: &str, times: usize) {
        self.failures.lock().unwrap().insert(keyword.to_string(), times);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, keyword: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|k| *k == keyword).count()
    }

    /// Result sizes requested, in call order.
    pub fn sizes(&self) -> Vec<usize> {
        self.sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSearch for FakeSearch {
    async fn search(&self, _index: &str, _field: &str, keyword: &str, size: usize) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push(keyword.to_string());
        self.sizes.lock().unwrap().push(size);

        if let Some(remaining) = self.failures.lock().unwrap().get_mut(keyword) {
            if *remaining > 0 {
                *remaining -= 1;
                anyhow::bail!("search backend unavailable");
            }
        }

        let titles = self.titles.lock().unwrap().get(keyword).cloned().unwrap_or_default();
        Ok(titles
            .into_iter()
            .take(size)
            .map(|t| json!({"snippet": {"title": t}}))
            .collect())
    }
}

/// Extraction results keyed by seed keyword.
#[derive(Default)]
pub struct FakeExtractor {
    results: Mutex<HashMap<String, Vec<ExtractedKeyword>>>,
    calls: Mutex<Vec<String>>,
    titles: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn with_results(&self, seed: &str, results: Vec<ExtractedKeyword>) {
        self.results.lock().unwrap().insert(seed.to_string(), results);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every title received, across all calls.
    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeywordExtractor for FakeExtractor {
    async fn extract(&self, seed_keyword: &str, titles: &[String]) -> Result<Vec<ExtractedKeyword>> {
        self.calls.lock().unwrap().push(seed_keyword.to_string());
        self.titles.lock().unwrap().extend_from_slice(titles);
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(seed_keyword)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn proper(keyword: &str, score: f64) -> ExtractedKeyword {
    ExtractedKeyword::new(keyword, score, EntityType::Proper)
}

pub fn general(keyword: &str, score: f64) -> ExtractedKeyword {
    ExtractedKeyword::new(keyword, score, EntityType::General)
}

pub struct Harness {
    pub store: Arc<MemoryGraphStore>,
    pub search: Arc<FakeSearch>,
    pub extractor: Arc<FakeExtractor>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryGraphStore::new()),
            search: Arc::new(FakeSearch::default()),
            extractor: Arc::new(FakeExtractor::default()),
        }
    }

    /// Make `keyword` searchable and extract `related` for it.
    pub fn keyword(&self, keyword: &str, related: Vec<ExtractedKeyword>) {
        self.search
            .with_titles(keyword, &[format!("【PR】 all about {keyword} #trend").as_str(), "another title"]);
        self.extractor.with_results(keyword, related);
    }

    pub fn orchestrator(&self) -> GraphAnalysisOrchestrator {
        let store: Arc<dyn GraphStore> = self.store.clone();
        let gateway = ExtractionGateway::new(self.extractor.clone(), 10);
        GraphAnalysisOrchestrator::new(store, self.search.clone(), gateway)
    }
}

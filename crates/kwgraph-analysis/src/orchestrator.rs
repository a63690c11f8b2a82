//! Graph analysis orchestrator.
//!
//! Drives one seed keyword through fetch, normalize, extract and register,
//! then expands the graph around the root one stage at a time. Each stage
//! asks the store for keywords the root points at that clear the stage's
//! score and entity-type bar and have not been expanded yet, and runs them
//! all concurrently.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use kwgraph_core::config::{AnalysisSettings, ExpansionStage};
use kwgraph_core::text::{clean_keyword_context, normalize};
use kwgraph_core::{KwError, KwResult};
use kwgraph_extract::ExtractionGateway;
use kwgraph_graph::{register_related_keywords, GraphStore, RegistrationResult};
use kwgraph_search::{extract_titles, DocumentSearch};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Upper bound accepted for `max_titles`.
pub const MAX_TITLES_LIMIT: usize = 500;

/// Where the title sits inside a search document unless configured otherwise.
pub const DEFAULT_TITLE_POINTER: &str = "/snippet/title";

/// Discovery looks one hop ahead of the root.
const DISCOVERY_DEPTH: u32 = 1;

fn default_max_titles() -> usize {
    50
}

/// A request to analyze a seed keyword and expand around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub seed_keyword: String,
    /// Search index holding candidate documents.
    pub index: String,
    /// Document field matched against the keyword.
    pub field: String,
    #[serde(default = "default_max_titles")]
    pub max_titles: usize,
}

impl AnalysisRequest {
    pub fn new(seed_keyword: impl Into<String>, index: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            seed_keyword: seed_keyword.into(),
            index: index.into(),
            field: field.into(),
            max_titles: default_max_titles(),
        }
    }

    pub fn max_titles(mut self, max_titles: usize) -> Self {
        self.max_titles = max_titles;
        self
    }

    pub fn validate(&self) -> KwResult<()> {
        if self.seed_keyword.trim().is_empty() {
            return Err(KwError::validation("seed_keyword must not be blank"));
        }
        if self.index.trim().is_empty() || self.field.trim().is_empty() {
            return Err(KwError::validation("index and field must not be blank"));
        }
        if !(1..=MAX_TITLES_LIMIT).contains(&self.max_titles) {
            return Err(KwError::validation(format!(
                "max_titles must be between 1 and {}, got {}",
                MAX_TITLES_LIMIT, self.max_titles
            )));
        }
        Ok(())
    }

    /// Same index, field and title budget for another keyword.
    fn for_keyword(&self, seed_keyword: String) -> Self {
        Self {
            seed_keyword,
            ..self.clone()
        }
    }
}

/// Steps a single keyword goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStage {
    Pending,
    Fetching,
    Normalizing,
    Extracting,
    Registering,
    Succeeded,
    Aborted,
}

impl TaskStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStage::Pending => "pending",
            TaskStage::Fetching => "fetching",
            TaskStage::Normalizing => "normalizing",
            TaskStage::Extracting => "extracting",
            TaskStage::Registering => "registering",
            TaskStage::Succeeded => "succeeded",
            TaskStage::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordOutcome {
    pub seed_keyword: String,
    /// `Succeeded` or `Aborted`.
    pub stage: TaskStage,
    /// The step that was running when the task aborted.
    pub aborted_at: Option<TaskStage>,
    pub reason: Option<String>,
    pub titles: usize,
    pub keywords: usize,
    #[serde(skip)]
    pub registration: Option<RegistrationResult>,
}

impl KeywordOutcome {
    fn new(seed_keyword: &str) -> Self {
        Self {
            seed_keyword: seed_keyword.to_string(),
            stage: TaskStage::Pending,
            aborted_at: None,
            reason: None,
            titles: 0,
            keywords: 0,
            registration: None,
        }
    }

    fn enter(&mut self, stage: TaskStage) {
        debug!(seed_keyword = %self.seed_keyword, from = %self.stage, to = %stage, "Task stage");
        self.stage = stage;
    }

    fn abort(mut self, reason: impl Into<String>) -> Self {
        self.aborted_at = Some(self.stage);
        self.reason = Some(reason.into());
        self.stage = TaskStage::Aborted;
        self
    }

    pub fn succeeded(&self) -> bool {
        self.stage == TaskStage::Succeeded
    }
}

/// Summary of one expansion stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageReport {
    pub depth: usize,
    pub discovered: Vec<String>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs analyses against injected search, extraction and graph backends.
#[derive(Clone)]
pub struct GraphAnalysisOrchestrator {
    store: Arc<dyn GraphStore>,
    search: Arc<dyn DocumentSearch>,
    gateway: ExtractionGateway,
    stages: Vec<ExpansionStage>,
    title_pointer: String,
}

impl GraphAnalysisOrchestrator {
    /// Orchestrator with the default two-stage schedule.
    pub fn new(store: Arc<dyn GraphStore>, search: Arc<dyn DocumentSearch>, gateway: ExtractionGateway) -> Self {
        Self {
            store,
            search,
            gateway,
            stages: AnalysisSettings::default().stages,
            title_pointer: DEFAULT_TITLE_POINTER.to_string(),
        }
    }

    /// Replace the expansion schedule. Every stage is anchored at the root.
    pub fn with_stages(mut self, stages: Vec<ExpansionStage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_title_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.title_pointer = pointer.into();
        self
    }

    pub fn stages(&self) -> &[ExpansionStage] {
        &self.stages
    }

    /// Analyze the root, then run the expansion schedule.
    ///
    /// Returns whether the root itself succeeded. Nothing is expanded when
    /// it did not.
    pub async fn execute(&self, request: &AnalysisRequest) -> bool {
        info!(seed_keyword = %request.seed_keyword, "START: graph analysis");

        let root = self.process_keyword(request).await;
        if !root.succeeded() {
            warn!(
                seed_keyword = %request.seed_keyword,
                aborted_at = ?root.aborted_at,
                reason = root.reason.as_deref().unwrap_or(""),
                "Root analysis failed; skipping expansion"
            );
            return false;
        }

        info!(seed_keyword = %request.seed_keyword, stages = self.stages.len(), "Root analysis succeeded; expanding");
        for (i, stage) in self.stages.iter().enumerate() {
            self.expand(request, i + 1, stage).await;
        }

        info!(seed_keyword = %request.seed_keyword, "FINISH: graph analysis");
        true
    }

    /// One expansion stage: discover eligible keywords around the root and
    /// process them concurrently. Failures of individual keywords are
    /// counted, never propagated.
    pub async fn expand(&self, request: &AnalysisRequest, depth: usize, stage: &ExpansionStage) -> StageReport {
        let mut report = StageReport {
            depth,
            ..StageReport::default()
        };
        info!(
            seed_keyword = %request.seed_keyword,
            depth,
            min_score = stage.min_score,
            entity_type = %stage.entity_type,
            "START: expansion stage"
        );

        let found = match self
            .store
            .new_and_eligible_keywords(
                &request.seed_keyword,
                stage.min_score,
                stage.entity_type.as_str(),
                DISCOVERY_DEPTH,
            )
            .await
        {
            Ok(found) => found,
            Err(e) => {
                error!(seed_keyword = %request.seed_keyword, depth, error = %e, "Eligibility discovery failed");
                return report;
            }
        };

        for keyword in found {
            let cleaned = clean_keyword_context(&keyword);
            if !cleaned.is_empty() && !report.discovered.contains(&cleaned) {
                report.discovered.push(cleaned);
            }
        }

        if report.discovered.is_empty() {
            info!(seed_keyword = %request.seed_keyword, depth, "No new eligible keywords");
            return report;
        }
        info!(
            seed_keyword = %request.seed_keyword,
            depth,
            count = report.discovered.len(),
            "Processing discovered keywords"
        );

        let children: Vec<AnalysisRequest> = report
            .discovered
            .iter()
            .map(|kw| request.for_keyword(kw.clone()))
            .collect();
        let outcomes = join_all(children.iter().map(|child| self.process_keyword(child))).await;

        report.succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        report.failed = outcomes.len() - report.succeeded;
        info!(
            seed_keyword = %request.seed_keyword,
            depth,
            succeeded = report.succeeded,
            failed = report.failed,
            "FINISH: expansion stage"
        );
        report
    }

    /// Fetch, normalize, extract and register one keyword.
    pub async fn process_single_keyword(&self, seed_keyword: &str, index: &str, field: &str, max_titles: usize) -> bool {
        let request = AnalysisRequest::new(seed_keyword, index, field).max_titles(max_titles);
        self.process_keyword(&request).await.succeeded()
    }

    /// Like [`process_single_keyword`](Self::process_single_keyword) but
    /// reports where and why the task stopped.
    pub async fn process_keyword(&self, request: &AnalysisRequest) -> KeywordOutcome {
        let seed = request.seed_keyword.as_str();
        let mut outcome = KeywordOutcome::new(seed);

        outcome.enter(TaskStage::Fetching);
        let documents = match self
            .search
            .search(&request.index, &request.field, seed, request.max_titles)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                error!(seed_keyword = seed, error = %e, "Candidate search failed");
                return outcome.abort(format!("search failed: {e}"));
            }
        };
        let titles = extract_titles(&documents, &self.title_pointer);

        outcome.enter(TaskStage::Normalizing);
        let titles = normalize(&titles);
        outcome.titles = titles.len();
        if titles.is_empty() {
            warn!(seed_keyword = seed, documents = documents.len(), "No usable titles; aborting");
            return outcome.abort("no titles after normalization");
        }

        outcome.enter(TaskStage::Extracting);
        let keywords = self.gateway.extract_batched(seed, &titles).await;
        outcome.keywords = keywords.len();
        if keywords.is_empty() {
            warn!(seed_keyword = seed, titles = titles.len(), "Extraction returned no keywords; aborting");
            return outcome.abort("no keywords extracted");
        }

        outcome.enter(TaskStage::Registering);
        match register_related_keywords(self.store.as_ref(), seed, &keywords, None).await {
            Ok(result) => {
                outcome.registration = Some(result);
                outcome.enter(TaskStage::Succeeded);
                outcome
            }
            Err(e) => {
                error!(seed_keyword = seed, error = %e, "Registration failed");
                outcome.abort(format!("registration failed: {e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        AnalysisRequest::new("foo", "videos", "snippet.title").validate().unwrap();
        assert!(AnalysisRequest::new(" ", "videos", "title").validate().is_err());
        assert!(AnalysisRequest::new("foo", "", "title").validate().is_err());
        assert!(AnalysisRequest::new("foo", "videos", "title").max_titles(0).validate().is_err());
        assert!(AnalysisRequest::new("foo", "videos", "title").max_titles(501).validate().is_err());
        AnalysisRequest::new("foo", "videos", "title").max_titles(500).validate().unwrap();
    }

    #[test]
    fn test_request_defaults_max_titles() {
        let req: AnalysisRequest =
            serde_json::from_str(r#"{"seed_keyword": "foo", "index": "videos", "field": "title"}"#).unwrap();
        assert_eq!(req.max_titles, 50);
    }

    #[test]
    fn test_outcome_records_abort_point() {
        let mut outcome = KeywordOutcome::new("foo");
        outcome.enter(TaskStage::Fetching);
        outcome.enter(TaskStage::Normalizing);
        let outcome = outcome.abort("empty");

        assert_eq!(outcome.stage, TaskStage::Aborted);
        assert_eq!(outcome.aborted_at, Some(TaskStage::Normalizing));
        assert!(!outcome.succeeded());
    }
}

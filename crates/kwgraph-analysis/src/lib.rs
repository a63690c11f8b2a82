//! kwgraph Analysis
//!
//! The recursive expansion pipeline: search, normalize, extract, register,
//! then discover and analyze eligible keywords around the root. Also hosts
//! the background queue that runs it and the read-side graph service.

pub mod orchestrator;
pub mod service;
pub mod worker;

pub use orchestrator::{AnalysisRequest, GraphAnalysisOrchestrator, KeywordOutcome, StageReport, TaskStage};
pub use service::{GraphService, ShowGraphRequest};
pub use worker::{Acknowledgement, AnalysisWorker, SubmitError};

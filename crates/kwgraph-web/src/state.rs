//! Application state.

use std::sync::Arc;

use kwgraph_analysis::{AnalysisWorker, GraphService};
use kwgraph_extract::ExtractionGateway;
use kwgraph_search::DocumentSearch;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn DocumentSearch>,
    pub gateway: ExtractionGateway,
    pub graph: GraphService,
    pub worker: Arc<AnalysisWorker>,
}

impl AppState {
    pub fn new(
        search: Arc<dyn DocumentSearch>,
        gateway: ExtractionGateway,
        graph: GraphService,
        worker: Arc<AnalysisWorker>,
    ) -> Self {
        Self {
            search,
            gateway,
            graph,
            worker,
        }
    }
}

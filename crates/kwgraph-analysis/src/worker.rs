//! Background analysis queue.
//!
//! Submissions are acknowledged as soon as they are queued. A single loop
//! receives them and spawns each as its own task; results are only logged.
//!
//! ```ignore
//! let worker = AnalysisWorker::spawn(orchestrator, 64);
//! let ack = worker.submit(request)?; // returns immediately
//! worker.shutdown().await;          // waits for in-flight analyses
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::orchestrator::{AnalysisRequest, GraphAnalysisOrchestrator};

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Analysis queue is full, retry later")]
    QueueFull,
    #[error("Analysis worker is shut down")]
    ShutDown,
}

/// Receipt returned to the submitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledgement {
    pub task_id: Uuid,
    pub seed_keyword: String,
    pub accepted_at: DateTime<Utc>,
}

struct Job {
    task_id: Uuid,
    request: AnalysisRequest,
}

/// Fire-and-forget runner for [`GraphAnalysisOrchestrator::execute`].
pub struct AnalysisWorker {
    tx: mpsc::Sender<Job>,
    stop: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AnalysisWorker {
    /// Start the receive loop. `capacity` bounds the number of queued,
    /// not yet started, submissions.
    pub fn spawn(orchestrator: Arc<GraphAnalysisOrchestrator>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stop = Arc::new(Notify::new());
        let handle = tokio::spawn(Self::run_loop(orchestrator, rx, stop.clone()));
        Self {
            tx,
            stop,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Queue an analysis without waiting. Refused when the queue is at
    /// capacity or the worker has been shut down.
    pub fn submit(&self, request: AnalysisRequest) -> Result<Acknowledgement, SubmitError> {
        let ack = Acknowledgement {
            task_id: Uuid::new_v4(),
            seed_keyword: request.seed_keyword.clone(),
            accepted_at: Utc::now(),
        };
        self.tx
            .try_send(Job {
                task_id: ack.task_id,
                request,
            })
            .map_err(|e| match e {
                TrySendError::Full(job) => {
                    warn!(seed_keyword = %job.request.seed_keyword, "Analysis queue full, submission refused");
                    SubmitError::QueueFull
                }
                TrySendError::Closed(_) => SubmitError::ShutDown,
            })?;

        info!(task_id = %ack.task_id, seed_keyword = %ack.seed_keyword, "Analysis task accepted");
        Ok(ack)
    }

    /// Stop accepting submissions, start whatever is already queued and wait
    /// for every running analysis to finish. Later calls return immediately.
    pub async fn shutdown(&self) {
        let Some(handle) = self.handle.lock().await.take() else {
            return;
        };
        self.stop.notify_one();
        if let Err(e) = handle.await {
            error!(error = %e, "Analysis worker loop panicked");
        }
    }

    async fn run_loop(
        orchestrator: Arc<GraphAnalysisOrchestrator>,
        mut rx: mpsc::Receiver<Job>,
        stop: Arc<Notify>,
    ) {
        let mut running = JoinSet::new();

        loop {
            tokio::select! {
                job = rx.recv() => match job {
                    Some(job) => Self::start(&mut running, &orchestrator, job),
                    None => break,
                },
                _ = stop.notified() => {
                    rx.close();
                    while let Some(job) = rx.recv().await {
                        Self::start(&mut running, &orchestrator, job);
                    }
                    break;
                }
                Some(joined) = running.join_next(), if !running.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Analysis task panicked");
                    }
                }
            }
        }

        info!(in_flight = running.len(), "Analysis worker draining");
        while let Some(joined) = running.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Analysis task panicked");
            }
        }
        info!("Analysis worker stopped");
    }

    fn start(running: &mut JoinSet<()>, orchestrator: &Arc<GraphAnalysisOrchestrator>, job: Job) {
        let orchestrator = orchestrator.clone();
        running.spawn(async move {
            let success = orchestrator.execute(&job.request).await;
            info!(
                task_id = %job.task_id,
                seed_keyword = %job.request.seed_keyword,
                success,
                "Analysis task finished"
            );
        });
    }
}

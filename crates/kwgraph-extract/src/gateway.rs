//! Batching front for a [`KeywordExtractor`].

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use kwgraph_core::ExtractedKeyword;
use tracing::{error, info};

use crate::KeywordExtractor;

/// Titles per request when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Splits large title sets into chunks and extracts them concurrently.
#[derive(Clone)]
pub struct ExtractionGateway {
    extractor: Arc<dyn KeywordExtractor>,
    batch_size: usize,
}

impl ExtractionGateway {
    pub fn new(extractor: Arc<dyn KeywordExtractor>, batch_size: usize) -> Self {
        Self {
            extractor,
            batch_size: if batch_size == 0 { DEFAULT_BATCH_SIZE } else { batch_size },
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Extract with either one request for everything or one per chunk.
    pub async fn analyze(&self, seed_keyword: &str, titles: &[String], use_batch: bool) -> Result<Vec<ExtractedKeyword>> {
        if use_batch {
            Ok(self.extract_batched(seed_keyword, titles).await)
        } else {
            self.extractor.extract(seed_keyword, titles).await
        }
    }

    /// One request per `batch_size` chunk, all in flight at once.
    ///
    /// A failed chunk is logged and contributes nothing; results of the
    /// other chunks are concatenated in chunk order.
    pub async fn extract_batched(&self, seed_keyword: &str, titles: &[String]) -> Vec<ExtractedKeyword> {
        if titles.is_empty() {
            return Vec::new();
        }

        let chunks: Vec<&[String]> = titles.chunks(self.batch_size).collect();
        info!(
            seed_keyword,
            titles = titles.len(),
            chunks = chunks.len(),
            "Running batched extraction"
        );

        let results = join_all(
            chunks
                .iter()
                .map(|chunk| self.extractor.extract(seed_keyword, chunk)),
        )
        .await;

        let mut keywords = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(items) => keywords.extend(items),
                Err(e) => error!(seed_keyword, chunk = i, error = %e, "Extraction chunk failed"),
            }
        }
        keywords
    }
}

//! kwgraph Extract
//!
//! Scores and classifies keywords related to a seed by asking a language
//! model about a set of content titles.

pub mod gateway;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use kwgraph_core::ExtractedKeyword;

pub use gateway::ExtractionGateway;
pub use openai::OpenAiExtractor;

/// A service that turns titles into keywords related to a seed.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// One extraction request for the whole title list.
    ///
    /// Transport and HTTP failures are errors. A response that cannot be
    /// interpreted yields an empty list.
    async fn extract(&self, seed_keyword: &str, titles: &[String]) -> Result<Vec<ExtractedKeyword>>;
}

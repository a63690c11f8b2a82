//! kwgraph Search
//!
//! Fetches candidate documents for a seed keyword from a full-text index
//! and pulls their titles out for extraction.

pub mod elasticsearch;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use elasticsearch::ElasticsearchClient;

/// Default candidate count for ad-hoc searches.
pub const DEFAULT_RESULT_SIZE: usize = 100;

/// Full-text document search.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Up to `size` documents whose `field` matches `keyword`, best match
    /// first. Each entry is the document source.
    async fn search(&self, index: &str, field: &str, keyword: &str, size: usize) -> Result<Vec<Value>>;
}

/// Titles found at `pointer` (a JSON pointer such as `/snippet/title`).
///
/// Documents without a non-blank string there are skipped.
pub fn extract_titles(documents: &[Value], pointer: &str) -> Vec<String> {
    documents
        .iter()
        .filter_map(|doc| doc.pointer(pointer))
        .filter_map(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_titles_skips_missing() {
        let docs = vec![
            json!({"snippet": {"title": "first"}}),
            json!({"snippet": {"description": "no title"}}),
            json!({"title": "top-level"}),
            json!({"snippet": {"title": "  "}}),
            json!({"snippet": {"title": 42}}),
            json!({"snippet": {"title": "second"}}),
        ];

        assert_eq!(extract_titles(&docs, "/snippet/title"), vec!["first", "second"]);
        assert_eq!(extract_titles(&docs, "/title"), vec!["top-level"]);
    }
}

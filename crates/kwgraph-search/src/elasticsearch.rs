//! Elasticsearch `_search` client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use kwgraph_core::config::SearchSettings;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::DocumentSearch;

/// HTTP client for one Elasticsearch host.
#[derive(Clone)]
pub struct ElasticsearchClient {
    host: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Value,
}

impl ElasticsearchClient {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build search HTTP client")?;

        info!(host = %settings.host, "Initializing Elasticsearch client");
        Ok(Self {
            host: settings.host.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            client,
        })
    }
}

/// `match` on one field, ranked by relevance.
fn search_body(field: &str, keyword: &str, size: usize) -> Value {
    json!({
        "query": { "match": { field: keyword } },
        "size": size,
        "sort": [ { "_score": { "order": "desc" } } ]
    })
}

#[async_trait]
impl DocumentSearch for ElasticsearchClient {
    async fn search(&self, index: &str, field: &str, keyword: &str, size: usize) -> Result<Vec<Value>> {
        let mut request = self
            .client
            .post(format!("{}/{}/_search", self.host, index))
            .json(&search_body(field, keyword, size));
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("ApiKey {}", self.api_key));
        }

        let response = request
            .send()
            .await
            .context("Failed to connect to Elasticsearch")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Elasticsearch error ({}): {}", status, body);
        }

        let result: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Elasticsearch response")?;

        let documents: Vec<Value> = result.hits.hits.into_iter().map(|h| h.source).collect();
        debug!(index, field, keyword, found = documents.len(), "Search complete");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(host: &str, api_key: &str) -> SearchSettings {
        SearchSettings {
            host: host.to_string(),
            api_key: api_key.to_string(),
            ..SearchSettings::default()
        }
    }

    #[test]
    fn test_search_body_shape() {
        let body = search_body("snippet.title", "foo", 50);
        assert_eq!(body["query"]["match"]["snippet.title"], "foo");
        assert_eq!(body["size"], 50);
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
    }

    #[tokio::test]
    async fn test_search_returns_sources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos/_search"))
            .and(header("authorization", "ApiKey secret"))
            .and(body_json(search_body("snippet.title", "foo", 2)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [
                    {"_id": "1", "_source": {"snippet": {"title": "foo one"}}},
                    {"_id": "2", "_source": {"snippet": {"title": "foo two"}}}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ElasticsearchClient::new(&settings(&server.uri(), "secret")).unwrap();
        let docs = client.search("videos", "snippet.title", "foo", 2).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["snippet"]["title"], "foo two");
    }

    #[tokio::test]
    async fn test_search_error_status_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such index"))
            .mount(&server)
            .await;

        let client = ElasticsearchClient::new(&settings(&server.uri(), "")).unwrap();
        let err = client.search("missing", "title", "foo", 10).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}

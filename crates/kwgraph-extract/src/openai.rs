//! OpenAI-compatible chat completions client for keyword extraction.
//!
//! Requests use the JSON-object response format. The model is asked for an
//! object holding a `related_keywords` array; each item carries the keyword,
//! a 0.0-1.0 relevance score, an entity type and IAB tier-1 categories.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use kwgraph_core::config::ExtractionSettings;
use kwgraph_core::{ExtractedKeyword, IAB_CATEGORIES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::KeywordExtractor;

const SYSTEM_PROMPT: &str = "You extract keywords related to a seed keyword from content titles \
and answer with a single JSON object in the requested format.";

/// Extraction client for `/chat/completions`.
#[derive(Clone)]
pub struct OpenAiExtractor {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiExtractor {
    pub fn new(settings: &ExtractionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build extraction HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            client,
        })
    }

    fn request<'a>(&'a self, seed_keyword: &str, titles: &[String]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(seed_keyword, titles),
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        }
    }
}

/// User prompt listing the numbered titles and the allowed categories.
pub fn build_prompt(seed_keyword: &str, titles: &[String]) -> String {
    let numbered = titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n");
    let categories = IAB_CATEGORIES.join(", ");

    format!(
        r#"Seed keyword: {seed_keyword}

Content titles:
{numbered}

Steps:
1. From the titles, extract words and phrases directly related to the seed keyword "{seed_keyword}".
2. Give each one a relevance score to "{seed_keyword}" between 0.0 and 1.0 (float).
3. Classify each one as "Proper" (a proper noun: person, product, work, place, organisation) or "General".
4. Assign one or more IAB tier-1 categories, most relevant first, chosen only from: {categories}.
5. Answer with JSON only, no explanation.

Output format:
{{
  "related_keywords": [
    {{"keyword": "extracted phrase", "score": 0.0, "entity_type": "Proper", "iab_categories": ["category"]}}
  ]
}}"#
    )
}

/// Interpret the model's message content.
///
/// Invalid JSON or a missing `related_keywords` array yields no items. Items
/// that do not parse or have a blank keyword are dropped.
pub fn parse_related_keywords(content: &str) -> Vec<ExtractedKeyword> {
    let data: Value = match serde_json::from_str(content) {
        Ok(data) => data,
        Err(e) => {
            error!(error = %e, raw_content = content, "Failed to decode JSON from extraction response");
            return Vec::new();
        }
    };

    let Some(items) = data.get("related_keywords").and_then(Value::as_array) else {
        error!(data = %data, "Extraction response did not contain a 'related_keywords' list");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<ExtractedKeyword>(item.clone()) {
            Ok(kw) => Some(kw),
            Err(e) => {
                debug!(item = %item, error = %e, "Skipping malformed extraction item");
                None
            }
        })
        .map(|mut kw| {
            kw.keyword = kw.keyword.trim().to_string();
            kw
        })
        .filter(|kw| !kw.keyword.is_empty())
        .collect()
}

#[async_trait]
impl KeywordExtractor for OpenAiExtractor {
    async fn extract(&self, seed_keyword: &str, titles: &[String]) -> Result<Vec<ExtractedKeyword>> {
        info!(seed_keyword, titles = titles.len(), "Extracting related keywords");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request(seed_keyword, titles))
            .send()
            .await
            .context("Failed to connect to extraction service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Extraction API error ({}): {}", status, body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse extraction response")?;

        let Some(content) = chat.choices.into_iter().next().and_then(|c| c.message.content) else {
            error!(seed_keyword, "Extraction response had no message content");
            return Ok(Vec::new());
        };

        let keywords = parse_related_keywords(&content);
        debug!(seed_keyword, count = keywords.len(), "Parsed extraction response");
        Ok(keywords)
    }
}

//! Application settings.
//!
//! Defaults target a local development stack. An optional TOML file is
//! layered on top, then environment variables override individual values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{KwError, KwResult};
use crate::model::EntityType;

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kwgraph.toml";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub graph: GraphSettings,
    pub search: SearchSettings,
    pub extraction: ExtractionSettings,
    pub analysis: AnalysisSettings,
    pub server: ServerSettings,
}

/// Connection settings for the Neo4j graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
    pub fetch_size: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "kwgraph_dev".to_string(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 200,
        }
    }
}

/// Elasticsearch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub host: String,
    pub api_key: String,
    /// JSON pointer to the display title inside a document's `_source`.
    pub title_pointer: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:9200".to_string(),
            api_key: String::new(),
            title_pointer: "/snippet/title".to_string(),
        }
    }
}

/// Language model extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Titles per extraction request.
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-5-nano".to_string(),
            batch_size: 10,
            timeout_secs: 120,
        }
    }
}

/// One stage of the root-anchored expansion schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionStage {
    pub min_score: f64,
    pub entity_type: EntityType,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub max_titles: usize,
    pub stages: Vec<ExpansionStage>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_titles: 50,
            stages: vec![
                ExpansionStage { min_score: 0.90, entity_type: EntityType::Proper },
                ExpansionStage { min_score: 0.95, entity_type: EntityType::Proper },
            ],
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load settings from an explicit file, or from `kwgraph.toml` when present,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> KwResult<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a TOML settings file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> KwResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loaded settings file");
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> KwResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Override values from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key) {
                *target = v;
            }
        };

        set(&mut self.graph.uri, "NEO4J_URI");
        set(&mut self.graph.user, "NEO4J_USER");
        set(&mut self.graph.password, "NEO4J_PASSWORD");
        set(&mut self.graph.database, "NEO4J_DATABASE");
        set(&mut self.search.host, "ES_HOST");
        set(&mut self.search.api_key, "ES_API_KEY");
        set(&mut self.extraction.api_key, "OPENAI_API_KEY");
        set(&mut self.extraction.base_url, "OPENAI_BASE_URL");
        set(&mut self.extraction.model, "OPENAI_MODEL");
        set(&mut self.server.host, "KWGRAPH_HOST");

        if let Some(port) = lookup("KWGRAPH_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> KwResult<()> {
        if self.extraction.batch_size == 0 {
            return Err(KwError::config("extraction.batch_size must be at least 1"));
        }
        if self.analysis.max_titles == 0 {
            return Err(KwError::config("analysis.max_titles must be at least 1"));
        }
        if self.analysis.stages.is_empty() {
            return Err(KwError::config("analysis.stages must not be empty"));
        }
        for (i, stage) in self.analysis.stages.iter().enumerate() {
            if !(0.0..=1.0).contains(&stage.min_score) {
                return Err(KwError::config(format!(
                    "analysis.stages[{}].min_score must be within [0, 1], got {}",
                    i, stage.min_score
                )));
            }
        }
        Ok(())
    }
}

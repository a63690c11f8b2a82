//! Neo4j connection client.

use anyhow::{Context, Result};
use kwgraph_core::config::GraphSettings;
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::cypher::CypherQuery;
use crate::model::GraphCounts;

/// Client for Neo4j keyword graph operations.
///
/// Wraps one bounded connection pool. It is cheap to clone and every clone
/// shares the same pool, so a single client is built at startup and handed
/// to everything that talks to the store.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from settings.
    ///
    /// neo4rs only builds the pool in `Graph::connect`; the `RETURN 1` ping
    /// forces a real bolt handshake so an unreachable server fails here.
    pub async fn connect(settings: &GraphSettings) -> Result<Self> {
        let config = ConfigBuilder::default()
            .uri(&settings.uri)
            .user(&settings.user)
            .password(&settings.password)
            .db(settings.database.as_str())
            .max_connections(settings.max_connections)
            .fetch_size(settings.fetch_size)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j is not responding to queries")?;

        info!(uri = %settings.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a statement that returns no results.
    pub async fn execute(&self, query: CypherQuery) -> Result<()> {
        let text = query.text().to_string();
        self.graph.run(query.into_query()).await.map_err(|e| {
            error!(query = %text, error = %e, "Neo4j statement failed");
            anyhow::Error::new(e).context("Neo4j query execution failed")
        })
    }

    /// Execute a statement and collect every returned row.
    pub async fn query(&self, query: CypherQuery) -> Result<Vec<neo4rs::Row>> {
        let text = query.text().to_string();
        let mut result = self.graph.execute(query.into_query()).await.map_err(|e| {
            error!(query = %text, error = %e, "Neo4j query failed");
            anyhow::Error::new(e).context("Neo4j query failed")
        })?;

        let mut rows = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .context("Failed to read Neo4j result stream")?
        {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a statement and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: CypherQuery, field: &str) -> Result<Option<T>> {
        let rows = self.query(query).await?;
        if let Some(row) = rows.into_iter().next() {
            let val: T = row
                .get(field)
                .map_err(|e| anyhow::anyhow!("Failed to get field '{}': {:?}", field, e))?;
            Ok(Some(val))
        } else {
            Ok(None)
        }
    }

    /// Get node and relationship counts for status display.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        let node_query = CypherQuery::new("MATCH (n) RETURN count(n) AS count");
        let rel_query = CypherQuery::new("MATCH ()-[r]->() RETURN count(r) AS count");

        let node_count: i64 = self.query_scalar(node_query, "count").await?.unwrap_or(0);
        let rel_count: i64 = self.query_scalar(rel_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: count_to_usize(node_count),
            relationships: count_to_usize(rel_count),
        })
    }
}

/// Bolt integers are signed; a negative count reads as zero.
fn count_to_usize(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

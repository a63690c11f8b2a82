//! Neo4j schema initialization (uniqueness constraints).

use anyhow::Result;
use tracing::info;

use crate::cypher;
use crate::model::NodeLabel;
use crate::GraphClient;

/// Create a `name` uniqueness constraint for every node label.
///
/// Without them MERGE-by-name is not atomic and concurrent registrations of
/// the same keyword can create duplicates. Safe to run multiple times.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    info!("Initializing Neo4j schema...");

    let labels = NodeLabel::all();
    for label in labels {
        client.execute(cypher::name_constraint(label)).await?;
    }

    info!("Neo4j schema initialized ({} constraints)", labels.len());
    Ok(())
}

//! Neo4j-backed [`GraphStore`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use neo4rs::Row;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::GraphClient;
use crate::cypher;
use crate::model::{EdgeLabel, GraphCounts, GraphData, GraphEdge, GraphNode, NodeLabel, Properties, SubgraphRequest};
use crate::store::GraphStore;
use crate::subgraph::{assemble, keyword_node, scored_edge};

/// Production graph store. Clones share the client's connection pool.
#[derive(Clone)]
pub struct Neo4jGraphStore {
    client: GraphClient,
}

impl Neo4jGraphStore {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }
}

fn text_field(row: &Row, field: &str) -> Result<String> {
    row.get::<String>(field)
        .map_err(|e| anyhow!("Failed to get field '{}': {:?}", field, e))
}

fn node_from_row(row: &Row) -> Result<GraphNode> {
    let entity_type: Option<String> = row.get("entity_type").ok().flatten();
    let categories: Value = row.get("iab_categories").unwrap_or(Value::Null);
    Ok(keyword_node(
        text_field(row, "id")?,
        text_field(row, "name")?,
        entity_type,
        &categories,
    ))
}

fn edge_from_row(row: &Row) -> Result<Option<GraphEdge>> {
    let id = text_field(row, "id")?;
    let raw_score: Value = row.get("score").unwrap_or(Value::Null);
    let edge = scored_edge(
        id.clone(),
        text_field(row, "from_node")?,
        text_field(row, "to_node")?,
        &raw_score,
    );
    if edge.is_none() {
        warn!(edge = %id, score = %raw_score, "Skipping edge with unreadable score");
    }
    Ok(edge)
}

/// `MATCH` yields no row when either endpoint is missing, so nothing was merged.
fn ensure_edge_written(rows: &[Row], label: EdgeLabel, from_id: &str, to_id: &str) -> Result<()> {
    if rows.is_empty() {
        return Err(anyhow!(
            "Cannot create {} edge: endpoint {} or {} does not exist",
            label.as_str(),
            from_id,
            to_id
        ));
    }
    Ok(())
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn upsert_node(&self, label: NodeLabel, name: &str, properties: &Properties) -> Result<String> {
        let query = cypher::upsert_node(label, name, properties)?;
        self.client
            .query_scalar::<String>(query, "id")
            .await?
            .ok_or_else(|| anyhow!("Upsert of {} '{}' returned no id", label.as_str(), name))
    }

    async fn upsert_edge(&self, from_id: &str, to_id: &str, label: EdgeLabel, score: Option<f64>) -> Result<()> {
        let query = cypher::upsert_edge(from_id, to_id, label, score);
        let rows = self.client.query(query).await?;
        ensure_edge_written(&rows, label, from_id, to_id)
    }

    async fn fetch_subgraph(&self, request: &SubgraphRequest) -> Result<GraphData> {
        let node_rows = self.client.query(cypher::subgraph_nodes(request)).await?;
        let edge_rows = self.client.query(cypher::subgraph_edges(request)).await?;

        let nodes = node_rows.iter().map(node_from_row).collect::<Result<Vec<_>>>()?;
        let mut edges = Vec::with_capacity(edge_rows.len());
        for row in &edge_rows {
            if let Some(edge) = edge_from_row(row)? {
                edges.push(edge);
            }
        }

        let (nodes, edges) = assemble(nodes, edges);
        debug!(
            seed = %request.seed_keyword,
            nodes = nodes.len(),
            edges = edges.len(),
            "Fetched subgraph"
        );
        Ok(GraphData { nodes, edges })
    }

    async fn fetch_common_nodes(&self, seeds: &[String], max_depth: u32) -> Result<Vec<GraphNode>> {
        let mut unique: Vec<String> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if !unique.contains(seed) {
                unique.push(seed.clone());
            }
        }
        if unique.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.client.query(cypher::common_nodes(&unique, max_depth)).await?;
        rows.iter().map(node_from_row).collect()
    }

    async fn new_and_eligible_keywords(
        &self,
        seed_keyword: &str,
        min_score: f64,
        entity_type: &str,
        max_depth: u32,
    ) -> Result<Vec<String>> {
        let query = cypher::eligible_keywords(seed_keyword, min_score, entity_type, max_depth);
        let rows = self.client.query(query).await?;
        rows.iter().map(|row| text_field(row, "name")).collect()
    }

    async fn counts(&self) -> Result<GraphCounts> {
        self.client.get_counts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType};

    fn row(fields: Vec<(&str, BoltType)>) -> Row {
        let (keys, values): (Vec<BoltType>, Vec<BoltType>) =
            fields.into_iter().map(|(k, v)| (BoltType::from(k), v)).unzip();
        Row::new(BoltList::from(keys), BoltList::from(values))
    }

    fn list(items: &[&str]) -> BoltType {
        BoltType::List(BoltList::from(
            items.iter().map(|i| BoltType::from(*i)).collect::<Vec<_>>(),
        ))
    }

    fn edge_row(score: BoltType) -> Row {
        row(vec![
            ("id", BoltType::from("5:e:1")),
            ("from_node", BoltType::from("4:n:1")),
            ("to_node", BoltType::from("4:n:2")),
            ("score", score),
        ])
    }

    #[test]
    fn test_node_from_row_reads_all_fields() {
        let node = node_from_row(&row(vec![
            ("id", BoltType::from("4:n:1")),
            ("name", BoltType::from("bar")),
            ("entity_type", BoltType::from("Proper")),
            ("iab_categories", list(&["Sports", "Travel"])),
        ]))
        .unwrap();

        assert_eq!(node.id, "4:n:1");
        assert_eq!(node.label, "bar");
        assert_eq!(node.group, "Keyword");
        assert_eq!(node.entity_type, "Proper");
        assert_eq!(node.iab_categories, vec!["Sports", "Travel"]);
    }

    #[test]
    fn test_node_from_row_tolerates_missing_properties() {
        let node = node_from_row(&row(vec![
            ("id", BoltType::from("4:n:1")),
            ("name", BoltType::from("foo")),
            ("entity_type", BoltType::Null(BoltNull)),
        ]))
        .unwrap();

        assert_eq!(node.entity_type, "");
        assert!(node.iab_categories.is_empty());
    }

    #[test]
    fn test_node_from_row_requires_id_and_name() {
        assert!(node_from_row(&row(vec![("name", BoltType::from("foo"))])).is_err());
    }

    #[test]
    fn test_edge_from_row_float_score() {
        let edge = edge_from_row(&edge_row(BoltType::from(0.9_f64))).unwrap().unwrap();
        assert_eq!(edge.id, "5:e:1");
        assert_eq!(edge.from_node, "4:n:1");
        assert_eq!(edge.to_node, "4:n:2");
        assert!((edge.score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_edge_from_row_decimal_scores() {
        let mut decimal = BoltMap::new();
        decimal.put(BoltString::from("unscaled"), BoltType::from(95_i64));
        decimal.put(BoltString::from("scale"), BoltType::from(2_i64));
        let edge = edge_from_row(&edge_row(BoltType::Map(decimal))).unwrap().unwrap();
        assert!((edge.score - 0.95).abs() < 1e-9);

        let edge = edge_from_row(&edge_row(BoltType::from("0.85"))).unwrap().unwrap();
        assert!((edge.score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_edge_from_row_skips_unreadable_score() {
        assert!(edge_from_row(&edge_row(BoltType::Null(BoltNull))).unwrap().is_none());
        assert!(edge_from_row(&edge_row(BoltType::from("high"))).unwrap().is_none());
    }

    #[test]
    fn test_missing_endpoint_is_an_error() {
        let err = ensure_edge_written(&[], EdgeLabel::RelatedTo, "4:n:1", "4:n:9").unwrap_err();
        assert!(err.to_string().contains("RELATED_TO"));

        let written = [row(vec![("id", BoltType::from("5:e:1"))])];
        assert!(ensure_edge_written(&written, EdgeLabel::RelatedTo, "4:n:1", "4:n:2").is_ok());
    }
}

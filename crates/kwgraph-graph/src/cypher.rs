//! Cypher query construction.
//!
//! Every user-supplied value (keyword names, categories, ids, scores) is a
//! bound parameter. The only text spliced into a statement is a label from
//! [`NodeLabel`]/[`EdgeLabel`], a validated property key, or a clamped depth.

use anyhow::Result;
use kwgraph_core::KwError;
use neo4rs::Query;

use crate::model::{EdgeLabel, NodeLabel, Properties, PropertyValue, SubgraphRequest};

/// Upper bound for variable-length traversals.
pub const MAX_TRAVERSAL_DEPTH: u32 = 5;

/// A statement plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    text: String,
    params: Vec<(String, PropertyValue)>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[(String, PropertyValue)] {
        &self.params
    }

    pub fn param_value(&self, key: &str) -> Option<&PropertyValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Convert into a neo4rs query ready to run.
    pub fn into_query(self) -> Query {
        self.params
            .into_iter()
            .fold(Query::new(self.text), |q, (key, value)| q.param(&key, value))
    }
}

/// Clamp a requested traversal depth into `1..=MAX_TRAVERSAL_DEPTH`.
pub fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(1, MAX_TRAVERSAL_DEPTH)
}

/// Property keys end up in statement text, so they must be plain identifiers.
/// `name` is the node's identity and cannot be set through properties.
fn validate_property_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest {
        return Err(KwError::InvalidIdentifier(key.to_string()).into());
    }
    if key == "name" {
        return Err(KwError::validation("'name' is the node key and cannot be set as a property").into());
    }
    Ok(())
}

/// Find-or-create a node by `(label, name)` and overwrite the given properties.
///
/// A single MERGE statement, so concurrent upserts of the same name cannot
/// race into duplicates once the uniqueness constraint exists.
pub fn upsert_node(label: NodeLabel, name: &str, properties: &Properties) -> Result<CypherQuery> {
    let mut assignments = Vec::with_capacity(properties.len());
    let mut query_params = Vec::with_capacity(properties.len());

    for (i, (key, value)) in properties.iter().enumerate() {
        validate_property_key(key)?;
        let param = format!("p{}", i);
        assignments.push(format!("n.{} = ${}", key, param));
        query_params.push((param, value.clone()));
    }

    let mut text = format!("MERGE (n:{} {{name: $name}})", label.as_str());
    if !assignments.is_empty() {
        text.push_str("\nSET ");
        text.push_str(&assignments.join(", "));
    }
    text.push_str("\nRETURN elementId(n) AS id");

    let query = query_params
        .into_iter()
        .fold(CypherQuery::new(text).param("name", name), |q, (k, v)| q.param(&k, v));
    Ok(query)
}

/// Find-or-create the `label` edge `from_id -> to_id`.
///
/// The score is written only when supplied; `None` leaves an existing score alone.
pub fn upsert_edge(from_id: &str, to_id: &str, label: EdgeLabel, score: Option<f64>) -> CypherQuery {
    let mut text = format!(
        "MATCH (a) WHERE elementId(a) = $from_id
         MATCH (b) WHERE elementId(b) = $to_id
         MERGE (a)-[r:{}]->(b)",
        label.as_str()
    );
    if score.is_some() {
        text.push_str("\n         SET r.score = $score");
    }
    text.push_str("\n         RETURN elementId(r) AS id");

    let query = CypherQuery::new(text)
        .param("from_id", from_id)
        .param("to_id", to_id);

    match score {
        Some(s) => query.param("score", s),
        None => query,
    }
}

/// Node-level filter on `var`, or `None` when the request has no filters.
fn node_filter(var: &str, req: &SubgraphRequest) -> Option<String> {
    let mut conditions = Vec::new();
    if req.entity_type.is_some() {
        conditions.push(format!("{var}.entity_type = $entity_type"));
    }
    if req.iab_category.is_some() {
        conditions.push(format!("$iab_category IN coalesce({var}.iab_categories, [])"));
    }
    if conditions.is_empty() {
        None
    } else {
        Some(conditions.join(" AND "))
    }
}

/// Shared prefix binding `n` to every keyword in the traversal closure of the seed.
fn closure_clause(req: &SubgraphRequest) -> String {
    let depth = clamp_depth(req.max_depth);
    let mut text = String::from("MATCH (seed:Keyword {name: $seed_keyword})");
    if let Some(filter) = node_filter("seed", req) {
        text.push_str(&format!("\nWHERE {filter}"));
    }
    text.push_str(&format!(
        "\nMATCH path = (seed)-[:RELATED_TO*0..{depth}]-(n:Keyword)"
    ));
    if let Some(filter) = node_filter("x", req) {
        text.push_str(&format!("\nWHERE all(x IN nodes(path) WHERE {filter})"));
    }
    text
}

fn bind_filters(query: CypherQuery, req: &SubgraphRequest) -> CypherQuery {
    let query = query.param("seed_keyword", req.seed_keyword.as_str());
    let query = match &req.entity_type {
        Some(et) => query.param("entity_type", et.as_str()),
        None => query,
    };
    match &req.iab_category {
        Some(cat) => query.param("iab_category", cat.as_str()),
        None => query,
    }
}

/// Every keyword reachable from the seed within the depth bound, filters applied.
pub fn subgraph_nodes(req: &SubgraphRequest) -> CypherQuery {
    let text = format!(
        "{}
WITH DISTINCT n
RETURN elementId(n) AS id, n.name AS name,
       n.entity_type AS entity_type, n.iab_categories AS iab_categories",
        closure_clause(req)
    );
    bind_filters(CypherQuery::new(text), req)
}

/// RELATED_TO edges scoring above `min_score` between two closure members.
pub fn subgraph_edges(req: &SubgraphRequest) -> CypherQuery {
    let text = format!(
        "{}
WITH collect(DISTINCT n) AS closure
UNWIND closure AS a
MATCH (a)-[r:RELATED_TO]->(b)
WHERE b IN closure AND r.score > $min_score
RETURN DISTINCT elementId(r) AS id, elementId(a) AS from_node,
       elementId(b) AS to_node, r.score AS score",
        closure_clause(req)
    );
    bind_filters(CypherQuery::new(text).param("min_score", req.min_score), req)
}

/// Targets of the seed's outbound RELATED_TO edges that pass the score and
/// type filters and have not been expanded yet (no outbound RELATED_TO).
pub fn eligible_keywords(
    seed_keyword: &str,
    min_score: f64,
    entity_type: &str,
    max_depth: u32,
) -> CypherQuery {
    let depth = clamp_depth(max_depth);
    let text = format!(
        "MATCH path = (seed:Keyword {{name: $seed_keyword}})-[:RELATED_TO*1..{depth}]->(t:Keyword)
WHERE all(r IN relationships(path) WHERE r.score > $min_score)
  AND t.entity_type = $entity_type
  AND NOT EXISTS {{ (t)-[:RELATED_TO]->() }}
RETURN DISTINCT t.name AS name"
    );
    CypherQuery::new(text)
        .param("seed_keyword", seed_keyword)
        .param("min_score", min_score)
        .param("entity_type", entity_type)
}

/// Keywords within `max_depth` hops of every seed, seeds excluded.
pub fn common_nodes(seeds: &[String], max_depth: u32) -> CypherQuery {
    let depth = clamp_depth(max_depth);
    let text = format!(
        "UNWIND $seeds AS seed_name
MATCH (s:Keyword {{name: seed_name}})-[:RELATED_TO*1..{depth}]-(n:Keyword)
WHERE NOT n.name IN $seeds
WITH n, count(DISTINCT s) AS hits
WHERE hits = size($seeds)
RETURN elementId(n) AS id, n.name AS name,
       n.entity_type AS entity_type, n.iab_categories AS iab_categories"
    );
    CypherQuery::new(text).param("seeds", PropertyValue::List(seeds.to_vec()))
}

/// Uniqueness constraint that backs MERGE-by-name for a label.
pub fn name_constraint(label: NodeLabel) -> CypherQuery {
    CypherQuery::new(format!(
        "CREATE CONSTRAINT {}_name IF NOT EXISTS FOR (n:{}) REQUIRE n.name IS UNIQUE",
        label.as_str().to_lowercase(),
        label.as_str()
    ))
}

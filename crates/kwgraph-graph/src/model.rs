//! Graph labels, property values and query result records.

use serde::{Deserialize, Serialize};

/// Node labels used in the keyword graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeLabel {
    Keyword,
    Category,
    Channel,
}

impl NodeLabel {
    /// The Neo4j node label.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Keyword => "Keyword",
            NodeLabel::Category => "Category",
            NodeLabel::Channel => "Channel",
        }
    }

    pub fn all() -> [NodeLabel; 3] {
        [NodeLabel::Keyword, NodeLabel::Category, NodeLabel::Channel]
    }
}

/// Relationship types used in the keyword graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeLabel {
    /// Keyword to keyword, scored.
    RelatedTo,
    /// Keyword to category.
    IsA,
    /// Seed keyword to channel.
    BelongsTo,
}

impl EdgeLabel {
    /// The Neo4j relationship type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::RelatedTo => "RELATED_TO",
            EdgeLabel::IsA => "IS_A",
            EdgeLabel::BelongsTo => "BELONGS_TO",
        }
    }
}

/// A property value that can be bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    /// Multi-valued property. Writing it replaces every previous element.
    List(Vec<String>),
}

impl From<PropertyValue> for neo4rs::BoltType {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Text(s) => s.into(),
            PropertyValue::Float(f) => f.into(),
            PropertyValue::Int(i) => i.into(),
            PropertyValue::Bool(b) => b.into(),
            PropertyValue::List(items) => items.into(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::List(items)
    }
}

/// Ordered set of properties applied by a node upsert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property.
    pub fn with(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A keyword node as returned to graph viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// The keyword name.
    pub label: String,
    pub group: String,
    pub entity_type: String,
    pub iab_categories: Vec<String>,
}

/// A scored RELATED_TO edge as returned to graph viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    pub score: f64,
}

/// Nodes and edges of a fetched subgraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Parameters of a bounded-depth subgraph fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphRequest {
    pub seed_keyword: String,
    pub max_depth: u32,
    /// Edges must score strictly above this.
    pub min_score: f64,
    pub entity_type: Option<String>,
    pub iab_category: Option<String>,
}

impl SubgraphRequest {
    pub fn new(seed_keyword: impl Into<String>, max_depth: u32) -> Self {
        Self {
            seed_keyword: seed_keyword.into(),
            max_depth,
            min_score: 0.0,
            entity_type: None,
            iab_category: None,
        }
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn entity_type(mut self, entity_type: Option<String>) -> Self {
        self.entity_type = entity_type.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn iab_category(mut self, iab_category: Option<String>) -> Self {
        self.iab_category = iab_category.filter(|s| !s.trim().is_empty());
        self
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

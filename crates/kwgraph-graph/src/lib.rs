//! # kwgraph Graph
//!
//! Neo4j keyword graph for kwgraph.
//!
//! Provides idempotent node/edge upserts, bounded-depth traversal queries,
//! eligibility discovery for recursive expansion, and registration of
//! extraction results.

pub mod client;
pub mod cypher;
pub mod model;
pub mod neo4j;
pub mod registration;
pub mod schema;
pub mod score;
pub mod store;
pub mod subgraph;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use client::GraphClient;
pub use model::{
    EdgeLabel, GraphCounts, GraphData, GraphEdge, GraphNode, NodeLabel, Properties, PropertyValue, SubgraphRequest,
};
pub use neo4j::Neo4jGraphStore;
pub use registration::{register_related_keywords, RegistrationResult};
pub use schema::initialize_schema;
pub use store::GraphStore;

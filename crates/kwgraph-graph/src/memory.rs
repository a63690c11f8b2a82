//! In-memory [`GraphStore`] for tests.
//!
//! Follows the Neo4j store's semantics: MERGE-by-name nodes, one edge per
//! `(label, from, to)`, strict score filters and orphan removal.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cypher::clamp_depth;
use crate::model::{
    EdgeLabel, GraphCounts, GraphData, GraphEdge, GraphNode, NodeLabel, Properties, PropertyValue, SubgraphRequest,
};
use crate::store::GraphStore;
use crate::subgraph::{assemble, keyword_node};

#[derive(Debug, Clone)]
struct StoredNode {
    id: String,
    label: NodeLabel,
    name: String,
    properties: Properties,
}

#[derive(Debug, Clone)]
struct StoredEdge {
    id: String,
    label: EdgeLabel,
    from: usize,
    to: usize,
    score: Option<f64>,
}

#[derive(Default)]
struct Inner {
    nodes: Vec<StoredNode>,
    node_index: HashMap<(NodeLabel, String), usize>,
    edges: Vec<StoredEdge>,
    edge_index: HashMap<(EdgeLabel, usize, usize), usize>,
}

impl Inner {
    fn node_position(&self, id: &str) -> Option<usize> {
        id.strip_prefix("n:")?
            .parse::<usize>()
            .ok()
            .filter(|i| *i < self.nodes.len())
    }

    fn keyword(&self, name: &str) -> Option<usize> {
        self.node_index.get(&(NodeLabel::Keyword, name.to_string())).copied()
    }

    fn text_property(&self, node: usize, key: &str) -> Option<String> {
        match self.nodes[node].properties.get(key) {
            Some(PropertyValue::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn categories(&self, node: usize) -> Vec<String> {
        match self.nodes[node].properties.get("iab_categories") {
            Some(PropertyValue::List(items)) => items.clone(),
            Some(PropertyValue::Text(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    fn passes(&self, node: usize, req: &SubgraphRequest) -> bool {
        if let Some(et) = &req.entity_type {
            if self.text_property(node, "entity_type").as_deref() != Some(et.as_str()) {
                return false;
            }
        }
        if let Some(cat) = &req.iab_category {
            if !self.categories(node).iter().any(|c| c == cat) {
                return false;
            }
        }
        true
    }

    fn related(&self) -> impl Iterator<Item = &StoredEdge> {
        self.edges.iter().filter(|e| e.label == EdgeLabel::RelatedTo)
    }

    /// Nodes reachable from `start` within `depth` RELATED_TO hops in either
    /// direction, moving only through nodes accepted by `allow`.
    fn undirected_reach(&self, start: usize, depth: u32, allow: impl Fn(usize) -> bool) -> Vec<usize> {
        let mut seen = HashSet::from([start]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([(start, 0)]);

        while let Some((node, hops)) = queue.pop_front() {
            if hops == depth {
                continue;
            }
            for edge in self.related() {
                let next = if edge.from == node {
                    edge.to
                } else if edge.to == node {
                    edge.from
                } else {
                    continue;
                };
                if allow(next) && seen.insert(next) {
                    order.push(next);
                    queue.push_back((next, hops + 1));
                }
            }
        }
        order
    }

    fn to_graph_node(&self, node: usize) -> GraphNode {
        let stored = &self.nodes[node];
        let categories = Value::from(self.categories(node));
        keyword_node(
            stored.id.clone(),
            stored.name.clone(),
            self.text_property(node, "entity_type"),
            &categories,
        )
    }
}

/// Thread-safe in-memory graph store.
#[derive(Default)]
pub struct MemoryGraphStore {
    inner: RwLock<Inner>,
    fail_discovery: AtomicBool,
    upsert_calls: AtomicUsize,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every eligibility query fail until switched off again.
    pub fn set_fail_discovery(&self, fail: bool) {
        self.fail_discovery.store(fail, Ordering::SeqCst);
    }

    /// Total node and edge upserts received.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub async fn node_exists(&self, label: NodeLabel, name: &str) -> bool {
        self.inner.read().await.node_index.contains_key(&(label, name.to_string()))
    }

    pub async fn node_count(&self, label: NodeLabel) -> usize {
        self.inner.read().await.nodes.iter().filter(|n| n.label == label).count()
    }

    pub async fn node_properties(&self, label: NodeLabel, name: &str) -> Option<Properties> {
        let inner = self.inner.read().await;
        let pos = *inner.node_index.get(&(label, name.to_string()))?;
        Some(inner.nodes[pos].properties.clone())
    }

    /// Score of the `label` edge from keyword `from` to the `(to_label, to)`
    /// node. `None` when the edge is missing, `Some(None)` when it is unscored.
    pub async fn edge_score(&self, label: EdgeLabel, from: &str, to_label: NodeLabel, to: &str) -> Option<Option<f64>> {
        let inner = self.inner.read().await;
        let from = inner.keyword(from)?;
        let to = *inner.node_index.get(&(to_label, to.to_string()))?;
        let pos = inner.edge_index.get(&(label, from, to))?;
        Some(inner.edges[*pos].score)
    }

    /// Score of the RELATED_TO edge between two keywords.
    pub async fn related_score(&self, from: &str, to: &str) -> Option<Option<f64>> {
        self.edge_score(EdgeLabel::RelatedTo, from, NodeLabel::Keyword, to).await
    }

    /// Number of edges with the given label.
    pub async fn edge_count(&self, label: EdgeLabel) -> usize {
        self.inner.read().await.edges.iter().filter(|e| e.label == label).count()
    }

    /// Whether keyword `name` has any outbound RELATED_TO edge.
    pub async fn is_expanded(&self, name: &str) -> bool {
        let inner = self.inner.read().await;
        match inner.keyword(name) {
            Some(pos) => inner.related().any(|e| e.from == pos),
            None => false,
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upsert_node(&self, label: NodeLabel, name: &str, properties: &Properties) -> Result<String> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let key = (label, name.to_string());
        let mut inner = self.inner.write().await;

        let pos = match inner.node_index.get(&key) {
            Some(pos) => *pos,
            None => {
                let pos = inner.nodes.len();
                inner.nodes.push(StoredNode {
                    id: format!("n:{}", pos),
                    label,
                    name: name.to_string(),
                    properties: Properties::new(),
                });
                inner.node_index.insert(key, pos);
                pos
            }
        };

        let node = &mut inner.nodes[pos];
        for (k, v) in properties.iter() {
            node.properties = std::mem::take(&mut node.properties).with(k, v.clone());
        }
        Ok(node.id.clone())
    }

    async fn upsert_edge(&self, from_id: &str, to_id: &str, label: EdgeLabel, score: Option<f64>) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.write().await;
        let from = inner
            .node_position(from_id)
            .ok_or_else(|| anyhow!("No node with id {}", from_id))?;
        let to = inner
            .node_position(to_id)
            .ok_or_else(|| anyhow!("No node with id {}", to_id))?;

        match inner.edge_index.get(&(label, from, to)).copied() {
            Some(pos) => {
                if score.is_some() {
                    inner.edges[pos].score = score;
                }
            }
            None => {
                let pos = inner.edges.len();
                inner.edges.push(StoredEdge {
                    id: format!("e:{}", pos),
                    label,
                    from,
                    to,
                    score,
                });
                inner.edge_index.insert((label, from, to), pos);
            }
        }
        Ok(())
    }

    async fn fetch_subgraph(&self, request: &SubgraphRequest) -> Result<GraphData> {
        let inner = self.inner.read().await;
        let Some(seed) = inner.keyword(&request.seed_keyword) else {
            return Ok(GraphData::default());
        };
        if !inner.passes(seed, request) {
            return Ok(GraphData::default());
        }

        let depth = clamp_depth(request.max_depth);
        let closure = inner.undirected_reach(seed, depth, |n| {
            inner.nodes[n].label == NodeLabel::Keyword && inner.passes(n, request)
        });
        let members: HashSet<usize> = closure.iter().copied().collect();

        let nodes = closure.iter().map(|n| inner.to_graph_node(*n)).collect();
        let edges = inner
            .related()
            .filter(|e| members.contains(&e.from) && members.contains(&e.to))
            .filter_map(|e| {
                let score = e.score.filter(|s| *s > request.min_score)?;
                Some(GraphEdge {
                    id: e.id.clone(),
                    from_node: inner.nodes[e.from].id.clone(),
                    to_node: inner.nodes[e.to].id.clone(),
                    score,
                })
            })
            .collect();

        let (nodes, edges) = assemble(nodes, edges);
        Ok(GraphData { nodes, edges })
    }

    async fn fetch_common_nodes(&self, seeds: &[String], max_depth: u32) -> Result<Vec<GraphNode>> {
        let inner = self.inner.read().await;
        let depth = clamp_depth(max_depth);
        let seed_names: HashSet<&str> = seeds.iter().map(String::as_str).collect();

        let mut common: Option<Vec<usize>> = None;
        for seed in &seed_names {
            let Some(pos) = inner.keyword(seed) else {
                return Ok(Vec::new());
            };
            let reach: Vec<usize> = inner
                .undirected_reach(pos, depth, |n| inner.nodes[n].label == NodeLabel::Keyword)
                .into_iter()
                .filter(|n| !seed_names.contains(inner.nodes[*n].name.as_str()))
                .collect();
            common = Some(match common {
                None => reach,
                Some(prev) => prev.into_iter().filter(|n| reach.contains(n)).collect(),
            });
        }

        Ok(common
            .unwrap_or_default()
            .into_iter()
            .map(|n| inner.to_graph_node(n))
            .collect())
    }

    async fn new_and_eligible_keywords(
        &self,
        seed_keyword: &str,
        min_score: f64,
        entity_type: &str,
        max_depth: u32,
    ) -> Result<Vec<String>> {
        if self.fail_discovery.load(Ordering::SeqCst) {
            bail!("Eligibility query failed");
        }
        let inner = self.inner.read().await;
        let Some(seed) = inner.keyword(seed_keyword) else {
            return Ok(Vec::new());
        };

        let depth = clamp_depth(max_depth);
        let mut seen = HashSet::from([seed]);
        let mut frontier = vec![seed];
        let mut reached = Vec::new();
        for _ in 0..depth {
            let mut next = Vec::new();
            for node in &frontier {
                for edge in inner.related().filter(|e| e.from == *node) {
                    if edge.score.is_some_and(|s| s > min_score) && seen.insert(edge.to) {
                        next.push(edge.to);
                        reached.push(edge.to);
                    }
                }
            }
            frontier = next;
        }

        let names = reached
            .into_iter()
            .filter(|n| inner.text_property(*n, "entity_type").as_deref() == Some(entity_type))
            .filter(|n| !inner.related().any(|e| e.from == *n))
            .map(|n| inner.nodes[n].name.clone())
            .collect();
        Ok(names)
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let inner = self.inner.read().await;
        Ok(GraphCounts {
            nodes: inner.nodes.len(),
            relationships: inner.edges.len(),
        })
    }
}

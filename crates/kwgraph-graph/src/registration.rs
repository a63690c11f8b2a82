//! Registration of extraction results into the keyword graph.
//!
//! Writes are individual statements with no surrounding transaction: a
//! failure part way through leaves the earlier writes in place.

use anyhow::{Context, Result};
use kwgraph_core::ExtractedKeyword;
use tracing::{debug, info};

use crate::model::{EdgeLabel, NodeLabel, Properties};
use crate::store::GraphStore;

/// Platform recorded on channel nodes.
pub const CHANNEL_PLATFORM: &str = "YouTube";

/// Counts of the writes performed by one registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationResult {
    pub nodes_upserted: usize,
    pub relationships_upserted: usize,
}

/// Persist a seed keyword and its related keywords.
///
/// The seed is upserted without properties so whatever an earlier run wrote
/// on it survives. Each item gets a keyword node carrying its entity type and
/// categories, a scored RELATED_TO edge from the seed and, when it has at
/// least one category, an IS_A edge to the node of its first category.
pub async fn register_related_keywords(
    store: &dyn GraphStore,
    seed_keyword: &str,
    related: &[ExtractedKeyword],
    channel: Option<&str>,
) -> Result<RegistrationResult> {
    let mut result = RegistrationResult::default();

    let seed_id = store
        .upsert_node(NodeLabel::Keyword, seed_keyword, &Properties::new())
        .await
        .with_context(|| format!("Failed to upsert seed keyword '{}'", seed_keyword))?;
    result.nodes_upserted += 1;

    if let Some(channel) = channel.map(str::trim).filter(|c| !c.is_empty()) {
        let props = Properties::new().with("platform", CHANNEL_PLATFORM);
        let channel_id = store
            .upsert_node(NodeLabel::Channel, channel, &props)
            .await
            .with_context(|| format!("Failed to upsert channel '{}'", channel))?;
        store
            .upsert_edge(&seed_id, &channel_id, EdgeLabel::BelongsTo, None)
            .await?;
        result.nodes_upserted += 1;
        result.relationships_upserted += 1;
    }

    for item in related {
        let props = Properties::new()
            .with("entity_type", item.entity_type.as_str())
            .with("iab_categories", item.iab_categories.clone());

        let keyword_id = store
            .upsert_node(NodeLabel::Keyword, &item.keyword, &props)
            .await
            .with_context(|| format!("Failed to upsert keyword '{}'", item.keyword))?;
        store
            .upsert_edge(&seed_id, &keyword_id, EdgeLabel::RelatedTo, Some(item.score))
            .await?;
        result.nodes_upserted += 1;
        result.relationships_upserted += 1;

        if let Some(category) = item.primary_category() {
            let category_id = store
                .upsert_node(NodeLabel::Category, category, &Properties::new())
                .await
                .with_context(|| format!("Failed to upsert category '{}'", category))?;
            store
                .upsert_edge(&keyword_id, &category_id, EdgeLabel::IsA, None)
                .await?;
            result.nodes_upserted += 1;
            result.relationships_upserted += 1;
        }

        debug!(seed_keyword, keyword = %item.keyword, score = item.score, "Registered related keyword");
    }

    info!(
        seed_keyword,
        keywords = related.len(),
        nodes = result.nodes_upserted,
        rels = result.relationships_upserted,
        "Registration complete"
    );
    Ok(result)
}

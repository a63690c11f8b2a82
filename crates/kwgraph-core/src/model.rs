//! Domain models for keyword extraction results.

use serde::{Deserialize, Deserializer, Serialize};

/// IAB content taxonomy, tier 1.
///
/// The extraction prompt restricts categories to this list.
pub const IAB_CATEGORIES: &[&str] = &[
    "Automotive",
    "Books & Literature",
    "Business and Finance",
    "Careers",
    "Education",
    "Events & Attractions",
    "Family & Relationships",
    "Fine Art",
    "Food & Drink",
    "Healthy Living",
    "Hobbies & Interests",
    "Home & Garden",
    "Medical Health",
    "Movies",
    "Music & Audio",
    "News & Politics",
    "Personal Finance",
    "Pets",
    "Pop Culture",
    "Real Estate",
    "Religion & Spirituality",
    "Science",
    "Shopping",
    "Sports",
    "Style & Fashion",
    "Technology & Computing",
    "Television",
    "Travel",
    "Video Gaming",
];

/// Kind of entity a keyword names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum EntityType {
    /// A proper noun: a person, product, work, place or organisation.
    Proper,
    /// A common noun or topic.
    #[default]
    General,
}

impl EntityType {
    /// The value stored on graph nodes.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Proper => "Proper",
            EntityType::General => "General",
        }
    }

    /// Parse from string (case-insensitive). Anything that is not "proper" is `General`.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("proper") {
            Self::Proper
        } else {
            Self::General
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(EntityType::parse).unwrap_or_default())
    }
}

/// A related keyword scored against a seed by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedKeyword {
    pub keyword: String,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: f64,
    #[serde(default)]
    pub entity_type: EntityType,
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub iab_categories: Vec<String>,
}

impl ExtractedKeyword {
    pub fn new(keyword: impl Into<String>, score: f64, entity_type: EntityType) -> Self {
        Self {
            keyword: keyword.into(),
            score: score.clamp(0.0, 1.0),
            entity_type,
            iab_categories: Vec::new(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.iab_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// First IAB category, if any. Only this one is linked in the graph.
    pub fn primary_category(&self) -> Option<&str> {
        self.iab_categories
            .iter()
            .map(|c| c.trim())
            .find(|c| !c.is_empty())
    }
}

/// Scores arrive as numbers or numeric strings; anything unparsable becomes 0.
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 })
}

/// Categories may be a list, a single string, or null.
fn deserialize_categories<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(string_list(&value))
}

/// Normalize a JSON value into a list of non-empty strings.
///
/// Lists keep their string elements, a bare string becomes a one-element list,
/// everything else (null included) is an empty list.
pub fn string_list(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        serde_json::Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_type_parse() {
        assert_eq!(EntityType::parse("Proper"), EntityType::Proper);
        assert_eq!(EntityType::parse(" proper "), EntityType::Proper);
        assert_eq!(EntityType::parse("General"), EntityType::General);
        assert_eq!(EntityType::parse("something else"), EntityType::General);
    }

    #[test]
    fn test_extracted_keyword_lenient_parsing() {
        let item: ExtractedKeyword = serde_json::from_value(json!({
            "keyword": "bar",
            "score": "1.7",
            "entity_type": "PROPER",
            "iab_categories": "Technology & Computing"
        }))
        .unwrap();

        assert_eq!(item.keyword, "bar");
        assert_eq!(item.score, 1.0);
        assert_eq!(item.entity_type, EntityType::Proper);
        assert_eq!(item.iab_categories, vec!["Technology & Computing"]);
    }

    #[test]
    fn test_extracted_keyword_missing_fields() {
        let item: ExtractedKeyword = serde_json::from_value(json!({
            "keyword": "baz",
            "entity_type": null
        }))
        .unwrap();

        assert_eq!(item.score, 0.0);
        assert_eq!(item.entity_type, EntityType::General);
        assert!(item.iab_categories.is_empty());
        assert_eq!(item.primary_category(), None);
    }

    #[test]
    fn test_primary_category_skips_blank() {
        let item = ExtractedKeyword::new("x", 0.5, EntityType::General)
            .with_categories(["  ", "Sports", "Travel"]);
        assert_eq!(item.primary_category(), Some("Sports"));
    }

    #[test]
    fn test_string_list() {
        assert_eq!(string_list(&json!(["a", 1, " b "])), vec!["a", "b"]);
        assert_eq!(string_list(&json!("solo")), vec!["solo"]);
        assert!(string_list(&json!(null)).is_empty());
        assert!(string_list(&json!({"a": 1})).is_empty());
    }
}

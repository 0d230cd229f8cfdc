use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::interests::{normalize_tag, normalize_token};

/// Lookup tables used by the category fallback: the generic tags every place of
/// a category carries, and keyword stems that widen an interest to a known tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRules {
    #[serde(default)]
    pub category_tags: BTreeMap<i64, Vec<String>>,
    #[serde(default)]
    pub keyword_tags: BTreeMap<String, String>,
}

impl TagRules {
    pub fn empty() -> Self {
        Self {
            category_tags: BTreeMap::new(),
            keyword_tags: BTreeMap::new(),
        }
    }

    pub fn category_tags(&self, category_id: Option<i64>) -> &[String] {
        category_id
            .and_then(|id| self.category_tags.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The interest itself plus every tag whose keyword stem occurs in it.
    pub fn expand(&self, interest: &str) -> BTreeSet<String> {
        let mut expanded = BTreeSet::new();
        expanded.insert(interest.to_string());
        for (stem, tag) in &self.keyword_tags {
            if interest.contains(stem.as_str()) {
                expanded.insert(tag.clone());
            }
        }
        expanded
    }

    /// Normalizes every key and tag like interests so lookups can compare tokens
    /// directly. Blank entries are dropped.
    pub fn normalized(self) -> Self {
        let category_tags = self
            .category_tags
            .into_iter()
            .map(|(id, tags)| {
                let mut cleaned = tags
                    .iter()
                    .filter_map(|tag| normalize_tag(tag))
                    .collect::<Vec<_>>();
                cleaned.sort();
                cleaned.dedup();
                (id, cleaned)
            })
            .collect();

        let keyword_tags = self
            .keyword_tags
            .into_iter()
            .filter_map(|(stem, tag)| Some((normalize_token(&stem)?, normalize_tag(&tag)?)))
            .collect();

        Self {
            category_tags,
            keyword_tags,
        }
    }
}

impl Default for TagRules {
    fn default() -> Self {
        let categories: [(i64, &[&str]); 10] = [
            (1, &["monument", "history", "landmark"]),
            (2, &["park", "nature", "relax"]),
            (3, &["exhibition", "history", "museum"]),
            (4, &["panorama", "riverfront", "walk"]),
            (5, &["architecture", "history", "streetscape"]),
            (6, &["culture_center", "events", "community"]),
            (7, &["museum", "art", "history"]),
            (8, &["theatre", "performing_arts", "evening"]),
            (9, &["culture_exchange", "international"]),
            (10, &["public_art", "mosaic", "art"]),
        ];
        let category_tags = categories
            .into_iter()
            .map(|(id, tags)| (id, tags.iter().map(|tag| tag.to_string()).collect()))
            .collect();

        let keyword_tags = [
            ("коф", "coffee"),
            ("культура", "culture"),
            ("музей", "museum"),
            ("галере", "art"),
            ("театр", "theatre"),
            ("панора", "panorama"),
            ("истор", "history"),
            ("стрит", "street_art"),
            ("графф", "street_art"),
            ("дет", "family"),
            ("наука", "science"),
            ("планет", "science"),
            ("техн", "technology"),
            ("муз", "music"),
            ("филармон", "music"),
            ("galler", "art"),
            ("paint", "art"),
            ("histor", "history"),
            ("theater", "theatre"),
            ("concert", "music"),
            ("graffiti", "street_art"),
            ("kids", "family"),
            ("view", "panorama"),
        ]
        .into_iter()
        .map(|(stem, tag)| (stem.to_string(), tag.to_string()))
        .collect();

        Self {
            category_tags,
            keyword_tags,
        }
    }
}

use crate::error::ConfigError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Assigned when no keyword matches, so every event carries a category.
pub const FALLBACK_CATEGORY: &str = "community";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: String,
    pub keywords: Vec<String>,
}

impl CategoryKeywords {
    fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        }
    }
}

lazy_static! {
    static ref DEFAULT_KEYWORDS: Vec<CategoryKeywords> = vec![
        CategoryKeywords::new(
            "concert",
            &["concert", "live music", "band", "singer", "musician", "performance", "gig", "show"],
        ),
        CategoryKeywords::new(
            "food-deal",
            &["happy hour", "special", "deal", "discount", "half price", "wing night", "taco tuesday"],
        ),
        CategoryKeywords::new("trivia", &["trivia", "quiz", "pub quiz", "game night"]),
        CategoryKeywords::new(
            "theatre",
            &["theatre", "theater", "play", "musical", "drama", "comedy show", "improv"],
        ),
        CategoryKeywords::new(
            "sports",
            &["hockey", "frontenacs", "game", "tournament", "match", "sports"],
        ),
        CategoryKeywords::new("festival", &["festival", "fair", "celebration", "parade"]),
        CategoryKeywords::new("market", &["market", "farmers market", "craft fair", "artisan"]),
        CategoryKeywords::new(
            "workshop",
            &["workshop", "class", "lesson", "course", "learn", "paint night"],
        ),
        CategoryKeywords::new(
            "nightlife",
            &["dj", "club", "dance", "party", "nightclub", "late night"],
        ),
        CategoryKeywords::new("family", &["family", "kids", "children", "all ages"]),
        CategoryKeywords::new(
            "community",
            &["community", "meetup", "networking", "charity", "fundraiser"],
        ),
    ];
}

/// Keyword-based tagging over a table that is fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryClassifier {
    table: Vec<CategoryKeywords>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.clone())
    }
}

impl CategoryClassifier {
    /// Keywords are lower-cased and blank ones dropped, as a blank keyword would match anything.
    /// Repeated categories are merged into the first entry's position.
    pub fn new(table: Vec<CategoryKeywords>) -> Self {
        let mut merged: Vec<CategoryKeywords> = Vec::with_capacity(table.len());

        for entry in table {
            let keywords: Vec<String> = entry
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();

            match merged
                .iter_mut()
                .find(|existing| existing.category == entry.category)
            {
                Some(existing) => existing.keywords.extend(keywords),
                None => merged.push(CategoryKeywords {
                    category: entry.category,
                    keywords,
                }),
            }
        }

        Self { table: merged }
    }

    /// Loads a table from a JSON array of `{ "category": ..., "keywords": [...] }`.
    #[tracing::instrument]
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Vec<CategoryKeywords> =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded {} categories", table.len());

        Ok(Self::new(table))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.table.iter().map(|entry| entry.category.as_str())
    }

    /// Categories in table order; never empty.
    pub fn classify(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();

        let categories: Vec<String> = self
            .table
            .iter()
            .filter(|entry| entry.keywords.iter().any(|keyword| text.contains(keyword)))
            .map(|entry| entry.category.clone())
            .collect();

        if categories.is_empty() {
            debug!("No keyword matched, falling back to '{}'", FALLBACK_CATEGORY);
            return vec![FALLBACK_CATEGORY.to_string()];
        }

        categories
    }
}

/// Classifies with the built-in keyword table.
pub fn classify(text: &str) -> Vec<String> {
    lazy_static! {
        static ref DEFAULT_CLASSIFIER: CategoryClassifier = CategoryClassifier::default();
    }

    DEFAULT_CLASSIFIER.classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn when_nothing_matches_should_fall_back_to_community() {
        assert_eq!(classify("Quiet afternoon"), vec!["community"]);
        assert_eq!(classify(""), vec!["community"]);
    }

    #[test_log::test]
    fn should_match_keywords_case_insensitively() {
        assert_eq!(classify("Friday Night HOCKEY"), vec!["sports"]);
    }

    #[test_log::test]
    fn should_tag_every_matching_category_in_table_order() {
        assert_eq!(
            classify("Live music and a DJ set"),
            vec!["concert", "nightlife"]
        );
        assert_eq!(classify("Family Festival Parade"), vec!["festival", "family"]);
    }

    #[test_log::test]
    fn should_classify_a_pub_trivia_night() {
        assert_eq!(
            classify(
                "Trivia Night at The Ale House Weekly trivia night! Teams of up to 6. Prizes for top 3 teams."
            ),
            vec!["trivia"]
        );
    }

    #[test_log::test]
    fn should_be_stable_across_calls() {
        let text = "Farmers market with kids activities";

        assert_eq!(classify(text), classify(text));
        assert_eq!(classify(text), vec!["market", "family"]);
    }

    #[test_log::test]
    fn should_use_a_custom_table_and_ignore_blank_keywords() {
        let classifier = CategoryClassifier::new(vec![
            CategoryKeywords::new("19plus", &["19+", "  "]),
            CategoryKeywords::new("activity", &["Axe Throwing"]),
        ]);

        assert_eq!(classifier.classify("axe throwing, 19+ only"), vec!["19plus", "activity"]);
        assert_eq!(classifier.classify("board games"), vec!["community"]);
        assert_eq!(
            classifier.categories().collect::<Vec<_>>(),
            vec!["19plus", "activity"]
        );
    }

    #[test_log::test]
    fn should_merge_repeated_categories_into_the_first_position() {
        let classifier = CategoryClassifier::new(vec![
            CategoryKeywords::new("concert", &["band"]),
            CategoryKeywords::new("trivia", &["quiz"]),
            CategoryKeywords::new("concert", &["gig"]),
        ]);

        assert_eq!(classifier.classify("band gig"), vec!["concert"]);
        assert_eq!(classifier.classify("quiz, then a gig"), vec!["concert", "trivia"]);
        assert_eq!(
            classifier.categories().collect::<Vec<_>>(),
            vec!["concert", "trivia"]
        );
    }
}

//! Deterministic keyword rules mapping statement descriptions to a `Category`.
//!
//! Rules are checked in table order and the first rule with any keyword present
//! wins. Order matters: `amazon prime` must be seen before the broader `amazon`
//! shopping keyword.

use serde::{Deserialize, Serialize};
use tally_core::{Category, normalize};

use crate::error::Result;

/// Keywords this short only match whole words, so `att` stays out of `hyatt`.
const WHOLE_WORD_MAX_LEN: usize = 3;

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Keywords go through the same normalization as descriptions.
    pub fn new<I, S>(category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category,
            keywords: keywords
                .into_iter()
                .map(|k| normalize(k.as_ref()))
                .filter(|k| !k.trim().is_empty())
                .collect(),
        }
    }

    /// `normalized` must already be normalized.
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| {
            if k.len() <= WHOLE_WORD_MAX_LEN {
                contains_words(normalized, k)
            } else {
                normalized.contains(k.as_str())
            }
        })
    }
}

fn contains_words(normalized: &str, keyword: &str) -> bool {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let needle: Vec<&str> = keyword.split_whitespace().collect();
    !needle.is_empty() && words.windows(needle.len()).any(|w| w == needle.as_slice())
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    rules: Vec<CategoryRule>,
}

/// Ordered keyword matcher with a `Miscellaneous` fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEngine {
    rules: Vec<CategoryRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        // Re-normalize so hand-written tables (e.g. from TOML) behave like `CategoryRule::new`.
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule::new(r.category, r.keywords))
            .collect();
        Self { rules }
    }

    /// Parse a `[[rules]]` table:
    ///
    /// ```toml
    /// [[rules]]
    /// category = "Food"
    /// keywords = ["starbucks", "bagels"]
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: RulesFile = toml::from_str(s)?;
        Ok(Self::new(file.rules))
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Categorize a raw description.
    pub fn categorize(&self, description: &str) -> Category {
        let normalized = normalize(description);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.category)
            .unwrap_or(Category::FALLBACK)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// The built-in rule table, in priority order.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            Category::Food,
            [
                "taco bell",
                "mcdonalds",
                "dominos",
                "pizza hut",
                "starbucks",
                "subway",
                "chipotle",
                "rook coffee",
                "circus wines",
                "mcdonald s",
                "1st cup",
                "the atlantic diner",
                "valentinos restaurant",
                "coffee",
                "bagels",
                "pantry 1 food market",
                "food",
                "holmdel bagels",
                "uber eats",
            ],
        ),
        CategoryRule::new(
            Category::Groceries,
            [
                "shoprite",
                "whole foods",
                "supermarket",
                "trader joes",
                "kroger",
                "safeway",
                "aldi",
            ],
        ),
        CategoryRule::new(
            Category::Transfers,
            ["zelle", "etransfer", "online transfer", "paypal", "venmo", "square"],
        ),
        CategoryRule::new(Category::Subscriptions, ["amazon prime"]),
        CategoryRule::new(
            Category::Shopping,
            ["amazon", "walmart", "target", "ebay", "etsy", "macys"],
        ),
        CategoryRule::new(
            Category::Entertainment,
            ["netflix", "hulu", "disney", "cinemark", "playstation", "xbox"],
        ),
        CategoryRule::new(
            Category::Utilities,
            ["verizon", "at&t", "comcast", "spectrum"],
        ),
    ]
}

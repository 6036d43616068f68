//! Shopping category taxonomy and the categorizer contract.
//!
//! Categories are listed in display priority order: grouped views show
//! [`Category::FreshProduce`] first and [`Category::Other`] last among the
//! known categories. Persisted entries may carry category names outside
//! this set (older data, hand edits); those sort after every known one.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fresh Produce")]
    FreshProduce,
    #[serde(rename = "Dairy & Eggs")]
    DairyEggs,
    #[serde(rename = "Proteins")]
    Proteins,
    #[serde(rename = "Grains & Pasta")]
    GrainsPasta,
    #[serde(rename = "Canned & Dried")]
    CannedDried,
    #[serde(rename = "Frozen Foods")]
    FrozenFoods,
    #[serde(rename = "Beverages")]
    Beverages,
    #[serde(rename = "Baking Supplies")]
    BakingSupplies,
    #[serde(rename = "Snacks")]
    Snacks,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Every category, highest display priority first.
    pub const ALL: [Category; 10] = [
        Category::FreshProduce,
        Category::DairyEggs,
        Category::Proteins,
        Category::GrainsPasta,
        Category::CannedDried,
        Category::FrozenFoods,
        Category::Beverages,
        Category::BakingSupplies,
        Category::Snacks,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FreshProduce => "Fresh Produce",
            Category::DairyEggs => "Dairy & Eggs",
            Category::Proteins => "Proteins",
            Category::GrainsPasta => "Grains & Pasta",
            Category::CannedDried => "Canned & Dried",
            Category::FrozenFoods => "Frozen Foods",
            Category::Beverages => "Beverages",
            Category::BakingSupplies => "Baking Supplies",
            Category::Snacks => "Snacks",
            Category::Other => "Other",
        }
    }

    /// Parse a display name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Category> {
        let name = name.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::parse(s).ok_or_else(|| anyhow::anyhow!("unknown shopping category: '{}'", s))
    }
}

/// Display rank of a category name, or `None` for names outside the
/// taxonomy.
pub fn category_rank(name: &str) -> Option<usize> {
    Category::ALL.iter().position(|c| c.as_str() == name)
}

/// Assigns a shopping category to an ingredient name.
///
/// Implementations may call remote services and may fail; callers go
/// through [`categorize_or_other`], which never does.
pub trait Categorizer: Send + Sync {
    /// Short identifier used in logs (e.g. `"keyword"`, `"openai"`).
    fn name(&self) -> &str;

    fn categorize(&self, ingredient_name: &str) -> Result<Category>;
}

/// Categorize, falling back to [`Category::Other`] on any failure.
pub fn categorize_or_other(categorizer: &dyn Categorizer, ingredient_name: &str) -> Category {
    match categorizer.categorize(ingredient_name) {
        Ok(category) => category,
        Err(e) => {
            warn!(
                ingredient = ingredient_name,
                categorizer = categorizer.name(),
                error = %e,
                "categorization failed, using Other"
            );
            Category::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Categorizer for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn categorize(&self, _ingredient_name: &str) -> Result<Category> {
            anyhow::bail!("service unavailable")
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(category_rank("Fresh Produce"), Some(0));
        assert_eq!(category_rank("Dairy & Eggs"), Some(1));
        assert_eq!(category_rank("Other"), Some(9));
        assert_eq!(category_rank("Spices"), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Category::parse(" dairy & eggs "), Some(Category::DairyEggs));
        assert_eq!(Category::parse("Snacks"), Some(Category::Snacks));
        assert_eq!(Category::parse("Condiments"), None);
        assert!("Frozen Foods".parse::<Category>().is_ok());
        assert!("Frozen".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Category::GrainsPasta).unwrap();
        assert_eq!(json, "\"Grains & Pasta\"");
        for c in Category::ALL {
            assert_eq!(c.to_string(), c.as_str());
        }
    }

    #[test]
    fn test_failure_defaults_to_other() {
        assert_eq!(categorize_or_other(&Failing, "kale"), Category::Other);
    }
}

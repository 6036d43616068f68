//! Shopping category providers.
//!
//! | Config Value | Provider |
//! |-------------|----------|
//! | `"keyword"` | [`KeywordCategorizer`] (offline, default) |
//! | `"openai"` / `"ollama"` | [`LlmCategorizer`] |
//! | `"disabled"` | [`DisabledCategorizer`] |

use anyhow::{bail, Result};
use larder_core::category::{Categorizer, Category};
use regex::Regex;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::llm::LlmClient;

/// Build the categorizer selected by `config.provider`.
pub fn create_categorizer(config: &ServiceConfig) -> Result<Box<dyn Categorizer>> {
    match config.provider.as_str() {
        "keyword" => Ok(Box::new(KeywordCategorizer::new()?)),
        "disabled" => Ok(Box::new(DisabledCategorizer)),
        "openai" | "ollama" => Ok(Box::new(LlmCategorizer::new(config)?)),
        other => bail!("Unknown categorizer provider: {}", other),
    }
}

/// Categorizer that always fails, so every entry lands in `Other`.
pub struct DisabledCategorizer;

impl Categorizer for DisabledCategorizer {
    fn name(&self) -> &str {
        "disabled"
    }

    fn categorize(&self, _ingredient_name: &str) -> Result<Category> {
        bail!("categorization is disabled")
    }
}

// ============ Keyword Categorizer ============

const KEYWORDS: &[(&str, Category)] = &[
    // Fresh Produce
    ("tomato", Category::FreshProduce),
    ("onion", Category::FreshProduce),
    ("garlic", Category::FreshProduce),
    ("shallot", Category::FreshProduce),
    ("scallion", Category::FreshProduce),
    ("spinach", Category::FreshProduce),
    ("lettuce", Category::FreshProduce),
    ("kale", Category::FreshProduce),
    ("cabbage", Category::FreshProduce),
    ("mushroom", Category::FreshProduce),
    ("carrot", Category::FreshProduce),
    ("celery", Category::FreshProduce),
    ("potato", Category::FreshProduce),
    ("bell pepper", Category::FreshProduce),
    ("jalapeño", Category::FreshProduce),
    ("jalapeno", Category::FreshProduce),
    ("cucumber", Category::FreshProduce),
    ("zucchini", Category::FreshProduce),
    ("eggplant", Category::FreshProduce),
    ("broccoli", Category::FreshProduce),
    ("cauliflower", Category::FreshProduce),
    ("avocado", Category::FreshProduce),
    ("lemon", Category::FreshProduce),
    ("lime", Category::FreshProduce),
    ("apple", Category::FreshProduce),
    ("pineapple", Category::FreshProduce),
    ("banana", Category::FreshProduce),
    ("berry", Category::FreshProduce),
    ("berries", Category::FreshProduce),
    ("strawberry", Category::FreshProduce),
    ("blueberry", Category::FreshProduce),
    ("raspberry", Category::FreshProduce),
    ("cilantro", Category::FreshProduce),
    ("parsley", Category::FreshProduce),
    ("basil", Category::FreshProduce),
    ("ginger", Category::FreshProduce),
    // Dairy & Eggs
    ("milk", Category::DairyEggs),
    ("butter", Category::DairyEggs),
    ("buttermilk", Category::DairyEggs),
    ("cheese", Category::DairyEggs),
    ("parmesan", Category::DairyEggs),
    ("mozzarella", Category::DairyEggs),
    ("cheddar", Category::DairyEggs),
    ("feta", Category::DairyEggs),
    ("cream", Category::DairyEggs),
    ("yogurt", Category::DairyEggs),
    ("egg", Category::DairyEggs),
    // Proteins
    ("chicken", Category::Proteins),
    ("beef", Category::Proteins),
    ("steak", Category::Proteins),
    ("pork", Category::Proteins),
    ("bacon", Category::Proteins),
    ("sausage", Category::Proteins),
    ("turkey", Category::Proteins),
    ("lamb", Category::Proteins),
    ("salmon", Category::Proteins),
    ("tuna", Category::Proteins),
    ("shrimp", Category::Proteins),
    ("fish", Category::Proteins),
    ("tofu", Category::Proteins),
    ("tempeh", Category::Proteins),
    // Grains & Pasta
    ("pasta", Category::GrainsPasta),
    ("spaghetti", Category::GrainsPasta),
    ("penne", Category::GrainsPasta),
    ("noodle", Category::GrainsPasta),
    ("rice", Category::GrainsPasta),
    ("quinoa", Category::GrainsPasta),
    ("couscous", Category::GrainsPasta),
    ("barley", Category::GrainsPasta),
    ("oats", Category::GrainsPasta),
    ("bread", Category::GrainsPasta),
    ("breadcrumbs", Category::GrainsPasta),
    ("tortilla", Category::GrainsPasta),
    // Canned & Dried
    ("tomato paste", Category::CannedDried),
    ("tomato sauce", Category::CannedDried),
    ("coconut milk", Category::CannedDried),
    ("peanut butter", Category::CannedDried),
    ("tahini", Category::CannedDried),
    ("beans", Category::CannedDried),
    ("lentil", Category::CannedDried),
    ("chickpea", Category::CannedDried),
    ("broth", Category::CannedDried),
    ("stock", Category::CannedDried),
    // Frozen Foods
    ("ice cream", Category::FrozenFoods),
    ("frozen", Category::FrozenFoods),
    // Beverages
    ("coffee", Category::Beverages),
    ("green tea", Category::Beverages),
    ("juice", Category::Beverages),
    ("wine", Category::Beverages),
    ("beer", Category::Beverages),
    ("soda", Category::Beverages),
    // Baking Supplies
    ("flour", Category::BakingSupplies),
    ("sugar", Category::BakingSupplies),
    ("baking soda", Category::BakingSupplies),
    ("baking powder", Category::BakingSupplies),
    ("yeast", Category::BakingSupplies),
    ("vanilla", Category::BakingSupplies),
    ("cocoa", Category::BakingSupplies),
    ("cornstarch", Category::BakingSupplies),
    ("chocolate chips", Category::BakingSupplies),
    // Snacks
    ("chips", Category::Snacks),
    ("crackers", Category::Snacks),
    ("popcorn", Category::Snacks),
    ("pretzel", Category::Snacks),
    ("almonds", Category::Snacks),
];

/// Offline categorizer matching whole words, longest keyword first, so
/// `tomato paste` wins over `tomato` and `licorice` is not `rice`. A
/// keyword also matches its plural (`tomatoes`, `berries`).
pub struct KeywordCategorizer {
    keywords: Vec<(Regex, Category)>,
}

impl KeywordCategorizer {
    pub fn new() -> Result<Self, regex::Error> {
        let mut table = KEYWORDS.to_vec();
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

        let keywords = table
            .into_iter()
            .map(|(keyword, category)| Ok((Regex::new(&keyword_pattern(keyword))?, category)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { keywords })
    }
}

fn keyword_pattern(keyword: &str) -> String {
    let escaped = regex::escape(keyword);
    match keyword.strip_suffix('y') {
        Some(stem) => format!(r"\b(?:{}(?:e?s)?|{}ies)\b", escaped, regex::escape(stem)),
        None => format!(r"\b{}(?:e?s)?\b", escaped),
    }
}

impl Categorizer for KeywordCategorizer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn categorize(&self, ingredient_name: &str) -> Result<Category> {
        let lower = ingredient_name.to_lowercase();
        let category = self
            .keywords
            .iter()
            .find(|(pattern, _)| pattern.is_match(&lower))
            .map_or(Category::Other, |(_, category)| *category);
        Ok(category)
    }
}

// ============ LLM Categorizer ============

pub struct LlmCategorizer {
    provider: String,
    client: LlmClient,
}

impl LlmCategorizer {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            provider: config.provider.clone(),
            client: LlmClient::new(config)?,
        })
    }
}

impl Categorizer for LlmCategorizer {
    fn name(&self) -> &str {
        &self.provider
    }

    fn categorize(&self, ingredient_name: &str) -> Result<Category> {
        let reply = self
            .client
            .complete(&categorization_prompt(ingredient_name), 50)?;
        debug!(ingredient = ingredient_name, reply = %reply, "categorization reply");
        parse_category_reply(&reply)
    }
}

fn categorization_prompt(ingredient_name: &str) -> String {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    format!(
        "Which grocery store section is \"{}\" found in?\n\n\
         Choose exactly one of: {}.\n\n\
         Reply with the section name only.",
        ingredient_name,
        names.join(", ")
    )
}

/// Accept a bare category name, tolerating quotes and a trailing period.
fn parse_category_reply(reply: &str) -> Result<Category> {
    let cleaned = reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
        .trim();
    Category::parse(cleaned)
        .ok_or_else(|| anyhow::anyhow!("reply is not a known category: '{}'", reply.trim()))
}

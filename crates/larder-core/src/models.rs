//! Core data models used throughout Larder.
//!
//! [`StructuredIngredient`] is the decomposition of one free-text ingredient
//! phrase. Its fields are private and validated on construction, so every
//! value reachable through the accessors satisfies the model invariants:
//! a non-empty lower-cased name and a finite, non-negative quantity.
//!
//! [`ShoppingListEntry`] and [`ShoppingListData`] are the persisted shapes.
//! Deserialization also accepts the older flat entry layout
//! (`{item, recipe, added, checked, category}`) that carried no structured
//! sub-object.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Recipe name used for items added by hand rather than from a recipe.
pub const RECIPE_MANUAL: &str = "Manual Additions";

/// Name given to a fallback record whose source text was blank.
const UNNAMED_ITEM: &str = "unnamed item";

/// Validation failures raised while building a [`StructuredIngredient`].
#[derive(Debug, Error, PartialEq)]
pub enum IngredientError {
    #[error("ingredient name must not be empty")]
    EmptyName,
    #[error("ingredient quantity must be a finite number >= 0, got {0}")]
    InvalidQuantity(f64),
}

/// An ingredient phrase decomposed into name, quantity, unit, modifier, and
/// preparation method.
///
/// An absent quantity is distinct from zero: it counts as zero when
/// quantities are summed but is never displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIngredient", into = "RawIngredient")]
pub struct StructuredIngredient {
    name: String,
    quantity: Option<f64>,
    unit: Option<String>,
    modifier: Option<String>,
    prep_method: Option<String>,
}

impl StructuredIngredient {
    /// Create an ingredient with only a name. The name is trimmed and
    /// lower-cased.
    pub fn new(name: &str) -> Result<Self, IngredientError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(IngredientError::EmptyName);
        }
        Ok(Self {
            name,
            quantity: None,
            unit: None,
            modifier: None,
            prep_method: None,
        })
    }

    /// The record substituted when extraction fails: the lower-cased input
    /// text as the name and every other field absent.
    pub fn fallback(text: &str) -> Self {
        Self::new(text).unwrap_or_else(|_| Self {
            name: UNNAMED_ITEM.to_string(),
            quantity: None,
            unit: None,
            modifier: None,
            prep_method: None,
        })
    }

    pub fn with_quantity(mut self, quantity: Option<f64>) -> Result<Self, IngredientError> {
        self.quantity = validate_quantity(quantity)?;
        Ok(self)
    }

    pub fn with_unit(mut self, unit: Option<&str>) -> Self {
        self.unit = clean_optional(unit);
        self
    }

    pub fn with_modifier(mut self, modifier: Option<&str>) -> Self {
        self.modifier = clean_optional(modifier);
        self
    }

    pub fn with_prep_method(mut self, prep_method: Option<&str>) -> Self {
        self.prep_method = clean_optional(prep_method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> Option<f64> {
        self.quantity
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn modifier(&self) -> Option<&str> {
        self.modifier.as_deref()
    }

    pub fn prep_method(&self) -> Option<&str> {
        self.prep_method.as_deref()
    }

    /// Unit for comparison: lower-cased, absent as the empty string.
    pub fn unit_key(&self) -> String {
        self.unit.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Modifier for comparison: lower-cased, absent as the empty string.
    pub fn modifier_key(&self) -> String {
        self.modifier.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Add `amount` to this ingredient's quantity, treating an absent side
    /// as zero. Stays absent only when both sides are absent.
    pub fn add_quantity(&mut self, amount: Option<f64>) {
        self.quantity = sum_quantities([self.quantity, amount]);
    }

    pub(crate) fn set_quantity(&mut self, quantity: Option<f64>) {
        self.quantity = quantity;
    }

    pub(crate) fn set_prep_method(&mut self, prep_method: Option<String>) {
        self.prep_method = prep_method;
    }
}

/// Sum quantities with absent values counted as zero. Returns `None` when
/// every input is absent.
pub(crate) fn sum_quantities(quantities: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    quantities
        .into_iter()
        .fold(None, |acc, q| match (acc, q) {
            (None, None) => None,
            (acc, q) => Some(acc.unwrap_or(0.0) + q.unwrap_or(0.0)),
        })
}

fn validate_quantity(quantity: Option<f64>) -> Result<Option<f64>, IngredientError> {
    match quantity {
        Some(q) if !q.is_finite() || q < 0.0 => Err(IngredientError::InvalidQuantity(q)),
        other => Ok(other),
    }
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Wire shape of a [`StructuredIngredient`]. Older records stored the
/// quantity as a string, so both forms are accepted on input.
#[derive(Debug, Serialize, Deserialize)]
struct RawIngredient {
    name: String,
    #[serde(default)]
    quantity: Option<RawQuantity>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    modifier: Option<String>,
    #[serde(default)]
    prep_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Number(f64),
    Text(String),
}

impl TryFrom<RawIngredient> for StructuredIngredient {
    type Error = IngredientError;

    fn try_from(raw: RawIngredient) -> Result<Self, Self::Error> {
        let quantity = match raw.quantity {
            Some(RawQuantity::Number(q)) => Some(q),
            Some(RawQuantity::Text(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        };
        Ok(StructuredIngredient::new(&raw.name)?
            .with_quantity(quantity)?
            .with_unit(raw.unit.as_deref())
            .with_modifier(raw.modifier.as_deref())
            .with_prep_method(raw.prep_method.as_deref()))
    }
}

impl From<StructuredIngredient> for RawIngredient {
    fn from(ing: StructuredIngredient) -> Self {
        Self {
            name: ing.name,
            quantity: ing.quantity.map(RawQuantity::Number),
            unit: ing.unit,
            modifier: ing.modifier,
            prep_method: ing.prep_method,
        }
    }
}

/// One persisted shopping list line, attributed to a single recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EntryRecord")]
pub struct ShoppingListEntry {
    /// Opaque stable identifier (UUID v4).
    pub id: String,
    /// Original text, or the formatted form after a quantity merge.
    pub display_text: String,
    pub structured: StructuredIngredient,
    /// Contributing recipe, or [`RECIPE_MANUAL`].
    pub recipe: String,
    /// Display name of the shopping category.
    pub category: String,
    /// Date of the most recent contribution.
    pub added_date: NaiveDate,
    pub checked: bool,
}

impl ShoppingListEntry {
    pub fn new(
        display_text: &str,
        structured: StructuredIngredient,
        recipe: &str,
        category: &str,
        added_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_text: display_text.to_string(),
            structured,
            recipe: recipe.to_string(),
            category: category.to_string(),
            added_date,
            checked: false,
        }
    }
}

/// Deserialization shape accepting both the current and the legacy layout.
#[derive(Deserialize)]
struct EntryRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "item")]
    display_text: String,
    #[serde(default)]
    structured: Option<StructuredIngredient>,
    recipe: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "added")]
    added_date: Option<NaiveDate>,
    #[serde(default)]
    checked: bool,
}

impl From<EntryRecord> for ShoppingListEntry {
    fn from(record: EntryRecord) -> Self {
        let structured = record
            .structured
            .unwrap_or_else(|| StructuredIngredient::fallback(&record.display_text));
        Self {
            id: record.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            display_text: record.display_text,
            structured,
            recipe: record.recipe,
            category: record.category.unwrap_or_else(|| "Other".to_string()),
            added_date: record
                .added_date
                .unwrap_or_else(|| Local::now().date_naive()),
            checked: record.checked,
        }
    }
}

/// The whole persisted collection. Always read and written as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListData {
    #[serde(default)]
    pub items: Vec<ShoppingListEntry>,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lowercases_and_trims_name() {
        let ing = StructuredIngredient::new("  Baby Spinach ").unwrap();
        assert_eq!(ing.name(), "baby spinach");
        assert_eq!(ing.quantity(), None);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            StructuredIngredient::new("   ").unwrap_err(),
            IngredientError::EmptyName
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let err = StructuredIngredient::new("salt")
            .unwrap()
            .with_quantity(Some(-1.0))
            .unwrap_err();
        assert_eq!(err, IngredientError::InvalidQuantity(-1.0));
        assert!(StructuredIngredient::new("salt")
            .unwrap()
            .with_quantity(Some(f64::NAN))
            .is_err());
    }

    #[test]
    fn test_blank_optionals_become_absent() {
        let ing = StructuredIngredient::new("basil")
            .unwrap()
            .with_unit(Some("  "))
            .with_modifier(Some(" fresh "));
        assert_eq!(ing.unit(), None);
        assert_eq!(ing.modifier(), Some("fresh"));
        assert_eq!(ing.unit_key(), "");
    }

    #[test]
    fn test_fallback_record() {
        let ing = StructuredIngredient::fallback("2 Cups Rice");
        assert_eq!(ing.name(), "2 cups rice");
        assert_eq!(ing.quantity(), None);
        assert_eq!(ing.unit(), None);
        assert_eq!(StructuredIngredient::fallback("  ").name(), UNNAMED_ITEM);
    }

    #[test]
    fn test_add_quantity_treats_absent_as_zero() {
        let mut ing = StructuredIngredient::new("egg").unwrap();
        ing.add_quantity(None);
        assert_eq!(ing.quantity(), None);
        ing.add_quantity(Some(3.0));
        assert_eq!(ing.quantity(), Some(3.0));
        ing.add_quantity(Some(2.5));
        assert_eq!(ing.quantity(), Some(5.5));
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = r#"{"name": "flour", "quantity": -2}"#;
        assert!(serde_json::from_str::<StructuredIngredient>(bad).is_err());

        let textual = r#"{"name": "Flour", "quantity": "2", "unit": "cups"}"#;
        let ing: StructuredIngredient = serde_json::from_str(textual).unwrap();
        assert_eq!(ing.name(), "flour");
        assert_eq!(ing.quantity(), Some(2.0));
        assert_eq!(ing.unit(), Some("cups"));
    }

    #[test]
    fn test_serialize_writes_nulls() {
        let ing = StructuredIngredient::new("onion").unwrap();
        let json = serde_json::to_value(&ing).unwrap();
        assert_eq!(json["name"], "onion");
        assert!(json["quantity"].is_null());
        assert!(json["prep_method"].is_null());
    }

    #[test]
    fn test_legacy_entry_layout() {
        let legacy = r#"{
            "item": "3 Tomatoes",
            "recipe": "Salsa",
            "added": "2024-05-01",
            "checked": true,
            "category": "Fresh Produce"
        }"#;
        let entry: ShoppingListEntry = serde_json::from_str(legacy).unwrap();
        assert_eq!(entry.display_text, "3 Tomatoes");
        assert_eq!(entry.structured.name(), "3 tomatoes");
        assert_eq!(entry.added_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(entry.checked);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = ShoppingListEntry::new(
            "8 oz mushrooms",
            StructuredIngredient::new("mushrooms")
                .unwrap()
                .with_quantity(Some(8.0))
                .unwrap()
                .with_unit(Some("oz")),
            "Risotto",
            "Fresh Produce",
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["display_text"], "8 oz mushrooms");
        assert_eq!(json["structured"]["unit"], "oz");
        assert_eq!(json["added_date"], "2024-01-02");
        assert_eq!(json["checked"], false);

        let back: ShoppingListEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}

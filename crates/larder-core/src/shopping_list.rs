//! The shopping list aggregator.
//!
//! [`ShoppingList`] owns the persisted entry collection through a
//! [`ListStore`] and the extraction and categorization services through
//! explicitly passed handles. Every operation loads the whole collection,
//! works on an in-memory copy, and (for mutations) saves the whole
//! collection back.
//!
//! Two kinds of merging happen here:
//!
//! - **Insertion merging** in [`add_items`](ShoppingList::add_items) is
//!   scoped to one recipe. The same ingredient added under two recipes
//!   stays as two entries.
//! - **Display consolidation** in [`combined_view`](ShoppingList::combined_view)
//!   runs across the whole list. Its output is never written back, so
//!   per-recipe removal and toggling keep working afterwards.
//!
//! # Failure handling
//!
//! A collection that cannot be read is treated as empty (with a warning).
//! A failed save makes the mutation return `false`; nothing is retried.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::category::{categorize_or_other, category_rank, Categorizer};
use crate::consolidate::{group_ingredients, merge_group};
use crate::extract::{extract_or_fallback, Extractor};
use crate::format::format_ingredient;
use crate::models::{ShoppingListData, ShoppingListEntry, StructuredIngredient};
use crate::normalize::{names_match, normalize, DEFAULT_FUZZY_THRESHOLD};
use crate::store::ListStore;

/// A display record built from one or more persisted entries.
///
/// Never persisted; the contributing entries keep their own identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedEntry {
    /// The entry's own text for a single contributor, otherwise the
    /// formatted merged ingredient.
    pub display_text: String,
    pub ingredient: StructuredIngredient,
    /// Number of persisted entries merged into this record.
    pub member_count: usize,
    /// Distinct contributing recipes.
    pub recipes: BTreeSet<String>,
    pub recipe_count: usize,
    /// True if any contributor is checked.
    pub checked: bool,
    /// Most recent contribution date.
    pub added_date: NaiveDate,
    /// Category of the first contributor.
    pub category: String,
    /// Ids of the contributing persisted entries, in list order.
    pub entry_ids: Vec<String>,
}

/// Combined entries sharing one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<CombinedEntry>,
}

pub struct ShoppingList<S: ListStore> {
    store: S,
    extractor: Box<dyn Extractor>,
    categorizer: Box<dyn Categorizer>,
    threshold: f64,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<S: ListStore> ShoppingList<S> {
    pub fn new(store: S, extractor: Box<dyn Extractor>, categorizer: Box<dyn Categorizer>) -> Self {
        Self {
            store,
            extractor,
            categorizer,
            threshold: DEFAULT_FUZZY_THRESHOLD,
            today: local_today,
        }
    }

    /// Override the fuzzy name match threshold used for both insertion
    /// merging and display consolidation.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the date source used for `added_date`.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn load_data(&self) -> ShoppingListData {
        match self.store.load() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "could not load shopping list, treating it as empty");
                ShoppingListData::default()
            }
        }
    }

    fn save_data(&self, mut data: ShoppingListData) -> bool {
        data.last_updated = Some(Local::now().naive_local());
        match self.store.save(&data) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "could not save shopping list");
                false
            }
        }
    }

    /// All persisted entries, in list order.
    pub fn entries(&self) -> Vec<ShoppingListEntry> {
        self.load_data().items
    }

    /// Add ingredient lines contributed by `recipe`.
    ///
    /// Blank lines are skipped. Each line is extracted and compared with the
    /// existing entries of the **same recipe**: an entry with an equal unit
    /// and a fuzzy-matching name absorbs the new quantity and gets a
    /// reformatted display text and today's date. Otherwise a new entry is
    /// appended and categorized.
    ///
    /// Returns `false` only if the list could not be saved.
    pub fn add_items<T: AsRef<str>>(&self, recipe: &str, texts: &[T]) -> bool {
        let texts: Vec<&str> = texts
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            return true;
        }

        let mut data = self.load_data();
        let today = (self.today)();
        let mut added = 0usize;
        let mut merged = 0usize;

        for text in texts {
            let ingredient = extract_or_fallback(self.extractor.as_ref(), text);
            let unit = ingredient.unit_key();

            let existing = data.items.iter().position(|e| {
                e.recipe == recipe
                    && e.structured.unit_key() == unit
                    && names_match(e.structured.name(), ingredient.name(), self.threshold)
            });

            match existing {
                Some(idx) => {
                    let entry = &mut data.items[idx];
                    entry.structured.add_quantity(ingredient.quantity());
                    entry.display_text = format_ingredient(&entry.structured);
                    entry.added_date = today;
                    merged += 1;
                }
                None => {
                    let category =
                        categorize_or_other(self.categorizer.as_ref(), ingredient.name());
                    data.items.push(ShoppingListEntry::new(
                        text,
                        ingredient,
                        recipe,
                        category.as_str(),
                        today,
                    ));
                    added += 1;
                }
            }
        }

        let saved = self.save_data(data);
        if saved {
            info!(recipe, added, merged, "added items to shopping list");
        }
        saved
    }

    /// Remove entries of `recipe`.
    ///
    /// With `None`, every entry of the recipe goes. Otherwise an entry goes
    /// when its display text equals one of `item_names` exactly, or when its
    /// normalized name equals one of them after trimming and lower-casing
    /// (or after normalizing).
    pub fn remove_items(&self, recipe: &str, item_names: Option<&[String]>) -> bool {
        let mut data = self.load_data();
        let before = data.items.len();

        match item_names {
            None => data.items.retain(|e| e.recipe != recipe),
            Some(names) => {
                let matcher = ItemMatcher::new(names);
                data.items
                    .retain(|e| !(e.recipe == recipe && matcher.matches(e)));
            }
        }

        let removed = before - data.items.len();
        let saved = self.save_data(data);
        if saved {
            info!(recipe, removed, "removed items from shopping list");
        }
        saved
    }

    /// Set `checked` on every entry of `recipe` matching `item_name`, under
    /// the same rule as [`remove_items`](Self::remove_items). Several
    /// entries can be affected.
    pub fn toggle_checked(&self, recipe: &str, item_name: &str, checked: bool) -> bool {
        let mut data = self.load_data();
        let names = [item_name.to_string()];
        let matcher = ItemMatcher::new(&names);

        let mut updated = 0usize;
        for entry in data
            .items
            .iter_mut()
            .filter(|e| e.recipe == recipe && matcher.matches(e))
        {
            entry.checked = checked;
            updated += 1;
        }

        let saved = self.save_data(data);
        if saved {
            info!(recipe, item = item_name, checked, updated, "toggled shopping list items");
        }
        saved
    }

    /// Remove every entry of every recipe.
    pub fn clear(&self) -> bool {
        let saved = self.save_data(ShoppingListData::default());
        if saved {
            info!("cleared shopping list");
        }
        saved
    }

    /// Consolidate the whole list for display, ignoring recipe scoping.
    ///
    /// Computed fresh on every call and never saved.
    pub fn combined_view(&self) -> Vec<CombinedEntry> {
        let entries = self.load_data().items;
        let batch: Vec<StructuredIngredient> =
            entries.iter().map(|e| e.structured.clone()).collect();

        group_ingredients(&batch, self.threshold)
            .iter()
            .map(|group| {
                let combined = merge_group(&batch, group);
                let contributors: Vec<&ShoppingListEntry> =
                    group.members.iter().map(|&i| &entries[i]).collect();
                let first = contributors[0];

                let recipes: BTreeSet<String> =
                    contributors.iter().map(|e| e.recipe.clone()).collect();
                let display_text = if combined.member_count == 1 {
                    first.display_text.clone()
                } else {
                    format_ingredient(&combined.ingredient)
                };

                CombinedEntry {
                    display_text,
                    member_count: combined.member_count,
                    ingredient: combined.ingredient,
                    recipe_count: recipes.len(),
                    recipes,
                    checked: contributors.iter().any(|e| e.checked),
                    added_date: contributors
                        .iter()
                        .map(|e| e.added_date)
                        .max()
                        .unwrap_or(first.added_date),
                    category: first.category.clone(),
                    entry_ids: contributors.iter().map(|e| e.id.clone()).collect(),
                }
            })
            .collect()
    }

    /// [`combined_view`](Self::combined_view) partitioned by category.
    ///
    /// Known categories come first in display priority order; any other
    /// category follows in first-seen order.
    pub fn grouped_view(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();

        for item in self.combined_view() {
            match groups.iter().position(|g| g.category == item.category) {
                Some(idx) => groups[idx].items.push(item),
                None => groups.push(CategoryGroup {
                    category: item.category.clone(),
                    items: vec![item],
                }),
            }
        }

        // Stable: unknown categories share a rank and keep first-seen order.
        groups.sort_by_key(|g| category_rank(&g.category).unwrap_or(usize::MAX));
        groups
    }
}

/// Name matching rule shared by removal and toggling.
struct ItemMatcher<'a> {
    raw: &'a [String],
    lowered: Vec<String>,
    normalized: Vec<String>,
}

impl<'a> ItemMatcher<'a> {
    fn new(raw: &'a [String]) -> Self {
        Self {
            raw,
            lowered: raw.iter().map(|n| n.trim().to_lowercase()).collect(),
            normalized: raw.iter().map(|n| normalize(n)).collect(),
        }
    }

    fn matches(&self, entry: &ShoppingListEntry) -> bool {
        if self.raw.iter().any(|n| *n == entry.display_text) {
            return true;
        }
        let name = normalize(entry.structured.name());
        self.lowered.contains(&name) || self.normalized.contains(&name)
    }
}

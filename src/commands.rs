//! CLI command implementations.
//!
//! Each `run_*` function opens the shopping list described by the config,
//! performs one operation, and prints the result to stdout. A mutation
//! whose save fails is reported as an error so the process exits non-zero.

use anyhow::{bail, Result};
use clap::ValueEnum;
use larder_core::extract::extract_batch;
use larder_core::shopping_list::ShoppingList;
use tracing::debug;

use crate::categorizer::create_categorizer;
use crate::config::Config;
use crate::extractor::create_extractor;
use crate::json_store::JsonFileStore;
use crate::render::{render_combined, render_entries, render_grouped};

/// Which view `list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Persisted entries, one per recipe contribution.
    Entries,
    /// Consolidated across recipes.
    Combined,
    /// Consolidated and grouped by shopping category.
    Grouped,
}

/// Build the shopping list from the configured store and providers.
pub fn open_list(cfg: &Config) -> Result<ShoppingList<JsonFileStore>> {
    let store = JsonFileStore::new(&cfg.store.path);
    let extractor = create_extractor(&cfg.extractor)?;
    let categorizer = create_categorizer(&cfg.categorizer)?;
    debug!(
        store = %store.path().display(),
        extractor = extractor.name(),
        categorizer = categorizer.name(),
        "opening shopping list"
    );
    Ok(ShoppingList::new(store, extractor, categorizer)
        .with_threshold(cfg.matching.fuzzy_threshold))
}

fn ensure_saved(saved: bool) -> Result<()> {
    if !saved {
        bail!("failed to save shopping list (see log for details)");
    }
    Ok(())
}

pub fn run_add(cfg: &Config, recipe: &str, items: &[String]) -> Result<()> {
    let list = open_list(cfg)?;
    ensure_saved(list.add_items(recipe, items))?;
    let count = items.iter().filter(|i| !i.trim().is_empty()).count();
    println!("Added {} item(s) for '{}'.", count, recipe);
    Ok(())
}

pub fn run_remove(cfg: &Config, recipe: &str, items: &[String]) -> Result<()> {
    let list = open_list(cfg)?;
    let before = list.entries().len();
    let names = (!items.is_empty()).then_some(items);
    ensure_saved(list.remove_items(recipe, names))?;
    let removed = before.saturating_sub(list.entries().len());
    println!(
        "Removed {} entr{} for '{}'.",
        removed,
        if removed == 1 { "y" } else { "ies" },
        recipe
    );
    Ok(())
}

pub fn run_check(cfg: &Config, recipe: &str, item: &str, checked: bool) -> Result<()> {
    let list = open_list(cfg)?;
    ensure_saved(list.toggle_checked(recipe, item, checked))?;
    println!(
        "Marked '{}' as {} for '{}'.",
        item,
        if checked { "checked" } else { "unchecked" },
        recipe
    );
    Ok(())
}

pub fn run_clear(cfg: &Config) -> Result<()> {
    let list = open_list(cfg)?;
    ensure_saved(list.clear())?;
    println!("Shopping list cleared.");
    Ok(())
}

pub fn run_list(cfg: &Config, view: View, json: bool) -> Result<()> {
    let list = open_list(cfg)?;
    let output = match (view, json) {
        (View::Entries, true) => serde_json::to_string_pretty(&list.entries())?,
        (View::Combined, true) => serde_json::to_string_pretty(&list.combined_view())?,
        (View::Grouped, true) => serde_json::to_string_pretty(&list.grouped_view())?,
        (View::Entries, false) => render_entries(&list.entries()),
        (View::Combined, false) => render_combined(&list.combined_view()),
        (View::Grouped, false) => render_grouped(&list.grouped_view()),
    };
    print!("{}", output);
    if json {
        println!();
    }
    Ok(())
}

/// Print, as a JSON array, the structured records the configured extractor
/// produces for `texts`, with the same fallback `add` would apply.
pub fn run_parse(cfg: &Config, texts: &[String]) -> Result<()> {
    let extractor = create_extractor(&cfg.extractor)?;
    let ingredients = extract_batch(extractor.as_ref(), texts);
    println!("{}", serde_json::to_string_pretty(&ingredients)?);
    Ok(())
}

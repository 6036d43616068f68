//! Plain-text rendering of shopping list views.
//!
//! Each line is `[x]` or `[ ]`, the display text, and the contributing
//! recipes in parentheses. Grouped output adds a `## Category` header per
//! group.

use std::fmt::Write;

use larder_core::models::ShoppingListEntry;
use larder_core::shopping_list::{CategoryGroup, CombinedEntry};

const EMPTY: &str = "Shopping list is empty.\n";

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Persisted entries, one per line, with recipe, category and date.
pub fn render_entries(entries: &[ShoppingListEntry]) -> String {
    if entries.is_empty() {
        return EMPTY.to_string();
    }
    let mut out = String::new();
    for e in entries {
        let _ = writeln!(
            out,
            "{} {}  ({}; {}; added {})",
            checkbox(e.checked),
            e.display_text,
            e.recipe,
            e.category,
            e.added_date
        );
    }
    out
}

fn combined_line(out: &mut String, item: &CombinedEntry) {
    let recipes: Vec<&str> = item.recipes.iter().map(String::as_str).collect();
    let _ = writeln!(
        out,
        "{} {}  ({})",
        checkbox(item.checked),
        item.display_text,
        recipes.join(", ")
    );
}

pub fn render_combined(items: &[CombinedEntry]) -> String {
    if items.is_empty() {
        return EMPTY.to_string();
    }
    let mut out = String::new();
    for item in items {
        combined_line(&mut out, item);
    }
    out
}

pub fn render_grouped(groups: &[CategoryGroup]) -> String {
    if groups.is_empty() {
        return EMPTY.to_string();
    }
    let mut out = String::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "## {}", group.category);
        for item in &group.items {
            combined_line(&mut out, item);
        }
    }
    out
}

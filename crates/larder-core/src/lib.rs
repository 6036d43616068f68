//! # Larder Core
//!
//! Shared, I/O-free logic for Larder: the structured ingredient model, name
//! normalization and fuzzy matching, batch consolidation, display
//! formatting, the shopping category taxonomy, and the shopping list
//! aggregator.
//!
//! This crate performs no network or filesystem I/O. Extraction,
//! categorization, and persistence are reached through the [`Extractor`],
//! [`Categorizer`], and [`ListStore`] traits, which the application crate
//! implements.
//!
//! ```text
//! free text ──▶ Extractor ──▶ StructuredIngredient
//!                                   │
//!                     normalize + names_match
//!                                   ▼
//!                              combine() ──▶ format_ingredient()
//!                                   ▲
//!        ShoppingList (ListStore) ──┘  combined_view / grouped_view
//! ```
//!
//! [`Extractor`]: extract::Extractor
//! [`Categorizer`]: category::Categorizer
//! [`ListStore`]: store::ListStore

pub mod category;
pub mod consolidate;
pub mod extract;
pub mod format;
pub mod models;
pub mod normalize;
pub mod shopping_list;
pub mod store;

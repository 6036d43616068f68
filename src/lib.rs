//! # Larder
//!
//! A shopping list that collects ingredient lines from many recipes and
//! consolidates them for shopping.
//!
//! The domain logic (normalization, consolidation, the [`ShoppingList`]
//! aggregator and its collaborator traits) lives in `larder-core`. This
//! crate supplies the concrete collaborators and the `larder` binary.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐   ┌──────────────┐
//! │ Extractor    │──▶│    ShoppingList     │──▶│ JsonFileStore│
//! │ heuristic/LLM│   │ (larder-core)       │   │  list.json   │
//! └──────────────┘   └─────────┬───────────┘   └──────────────┘
//! ┌──────────────┐             │
//! │ Categorizer  │─────────────┤
//! │ keyword/LLM  │             ▼
//! └──────────────┘       ┌──────────┐
//!                        │   CLI    │
//!                        │ (larder) │
//!                        └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`json_store`] | JSON file persistence |
//! | [`llm`] | Blocking OpenAI / Ollama completion client |
//! | [`extractor`] | Ingredient extraction providers |
//! | [`categorizer`] | Shopping category providers |
//! | [`render`] | Plain-text views |
//! | [`commands`] | CLI command implementations |
//!
//! [`ShoppingList`]: larder_core::shopping_list::ShoppingList

pub mod categorizer;
pub mod commands;
pub mod config;
pub mod extractor;
pub mod json_store;
pub mod llm;
pub mod logging;
pub mod render;

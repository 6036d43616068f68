//! # Larder CLI (`larder`)
//!
//! Keeps a recipe-attributed shopping list in a JSON file and consolidates
//! it for shopping.
//!
//! ## Usage
//!
//! ```bash
//! larder --config ./config/larder.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `larder add [--recipe R] <ITEM>...` | Add ingredient lines for a recipe |
//! | `larder remove --recipe R [ITEM]...` | Remove named items, or every item of the recipe |
//! | `larder check --recipe R <ITEM> [--uncheck]` | Set or clear the checked flag |
//! | `larder list [--view entries\|combined\|grouped] [--json]` | Print a view |
//! | `larder clear` | Remove everything |
//! | `larder parse <TEXT>...` | Show the structured records for some lines |
//!
//! ## Examples
//!
//! ```bash
//! larder add --recipe "Salsa" "4 tomatoes" "1 onion, diced"
//! larder add --recipe "Pasta" "10 tomatoes" "1 lb pasta"
//! larder list --view grouped
//! larder check --recipe "Salsa" tomatoes
//! larder remove --recipe "Pasta"
//! ```

use clap::{Parser, Subcommand};
use larder::commands::{self, View};
use larder::config::{self, Config};
use larder::logging::init_logging;
use larder_core::models::RECIPE_MANUAL;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "./config/larder.toml";

/// Larder: a shopping list that merges ingredients across recipes.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without it, `./config/larder.toml` is used if present, otherwise
/// built-in defaults (offline heuristic extraction and keyword
/// categorization).
#[derive(Parser)]
#[command(
    name = "larder",
    about = "Larder: a shopping list that merges ingredients across recipes",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add ingredient lines to the shopping list.
    ///
    /// Lines matching an existing entry of the same recipe (same unit,
    /// similar name) are merged into it by summing quantities.
    Add {
        /// Recipe the items belong to.
        #[arg(long, default_value = RECIPE_MANUAL)]
        recipe: String,

        /// Free-text ingredient lines, e.g. "2 cups fresh spinach, chopped".
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Remove items contributed by a recipe.
    ///
    /// With no items, every entry of the recipe is removed.
    Remove {
        #[arg(long)]
        recipe: String,

        /// Item names or exact display texts.
        items: Vec<String>,
    },

    /// Mark an item as bought (or not) for a recipe.
    Check {
        #[arg(long)]
        recipe: String,

        item: String,

        /// Clear the checked flag instead of setting it.
        #[arg(long)]
        uncheck: bool,
    },

    /// Print the shopping list.
    List {
        #[arg(long, value_enum, default_value_t = View::Grouped)]
        view: View,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Remove every entry of every recipe.
    Clear,

    /// Show how ingredient lines are parsed, without storing them.
    Parse {
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cfg: Config =
        config::load_config_or_default(cli.config.as_deref(), Path::new(DEFAULT_CONFIG_PATH))?;

    match cli.command {
        Commands::Add { recipe, items } => commands::run_add(&cfg, &recipe, &items)?,
        Commands::Remove { recipe, items } => commands::run_remove(&cfg, &recipe, &items)?,
        Commands::Check {
            recipe,
            item,
            uncheck,
        } => commands::run_check(&cfg, &recipe, &item, !uncheck)?,
        Commands::List { view, json } => commands::run_list(&cfg, view, json)?,
        Commands::Clear => commands::run_clear(&cfg)?,
        Commands::Parse { texts } => commands::run_parse(&cfg, &texts)?,
    }

    Ok(())
}

//! Structured ingredient extraction contract.
//!
//! The [`Extractor`] trait turns one free-text ingredient phrase into a
//! [`StructuredIngredient`]. Implementations live in the application crate
//! (LLM-backed, heuristic, disabled). Failures never cross this boundary:
//! [`extract_or_fallback`] substitutes the fallback record instead.

use anyhow::Result;
use tracing::{debug, warn};

use crate::models::StructuredIngredient;

/// Converts a free-text ingredient phrase into a structured record.
///
/// Calls are synchronous from the caller's point of view.
pub trait Extractor: Send + Sync {
    /// Short identifier used in logs (e.g. `"heuristic"`, `"ollama"`).
    fn name(&self) -> &str;

    fn extract(&self, text: &str) -> Result<StructuredIngredient>;
}

/// Extract `text`, substituting [`StructuredIngredient::fallback`] on
/// failure.
pub fn extract_or_fallback(extractor: &dyn Extractor, text: &str) -> StructuredIngredient {
    match extractor.extract(text) {
        Ok(ingredient) => {
            debug!(input = text, name = ingredient.name(), "extracted ingredient");
            ingredient
        }
        Err(e) => {
            warn!(
                input = text,
                extractor = extractor.name(),
                error = %e,
                "extraction failed, using fallback record"
            );
            StructuredIngredient::fallback(text)
        }
    }
}

/// Extract every text in order, with fallback substitution per item.
pub fn extract_batch(extractor: &dyn Extractor, texts: &[String]) -> Vec<StructuredIngredient> {
    texts
        .iter()
        .map(|t| extract_or_fallback(extractor, t))
        .collect()
}

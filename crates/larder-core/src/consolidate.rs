//! Batch consolidation of structured ingredients.
//!
//! Items are grouped greedily in input order: each item joins the **first**
//! existing group it is eligible for, or starts a new one. Eligibility
//! requires an equal unit, an equal modifier (both case-insensitive, absent
//! treated as empty), and matching names under
//! [`names_match`](crate::normalize::names_match).
//!
//! The first-match rule is order dependent. An item eligible for two groups
//! always lands in the older one, even if the newer one is a closer match.
//!
//! # Algorithm
//!
//! 1. For each item, scan groups in creation order with [`find_matching_group`].
//! 2. Append to the match, or open a group keyed by the item's own
//!    `(name, unit, modifier)`.
//! 3. Emit one record per group, in creation order. Multi-member groups sum
//!    their quantities and take the most frequent preparation method.
//!
//! Cost is quadratic in the batch size; batches are a recipe's ingredients
//! or a household shopping list.

use serde::Serialize;

use crate::models::{sum_quantities, StructuredIngredient};
use crate::normalize::names_match;

/// Identity of a consolidation group: the lower-cased name, unit, and
/// modifier of its first member. Absent unit or modifier is `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub name: String,
    pub unit: String,
    pub modifier: String,
}

impl GroupKey {
    pub fn of(ingredient: &StructuredIngredient) -> Self {
        Self {
            name: ingredient.name().to_lowercase(),
            unit: ingredient.unit_key(),
            modifier: ingredient.modifier_key(),
        }
    }
}

/// A group of batch members believed to be the same ingredient.
#[derive(Debug, Clone)]
pub struct IngredientGroup {
    pub key: GroupKey,
    /// Indices into the input batch, ascending.
    pub members: Vec<usize>,
}

/// One consolidation output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedIngredient {
    pub ingredient: StructuredIngredient,
    /// Number of batch items merged into this record.
    pub member_count: usize,
}

/// Find the first group `ingredient` may join.
///
/// Returns the position of the group in `groups`. Groups are tried in slice
/// order and the first eligible one wins, not the most similar one.
pub fn find_matching_group(
    ingredient: &StructuredIngredient,
    groups: &[IngredientGroup],
    threshold: f64,
) -> Option<usize> {
    let unit = ingredient.unit_key();
    let modifier = ingredient.modifier_key();

    groups.iter().position(|group| {
        group.key.unit == unit
            && group.key.modifier == modifier
            && names_match(ingredient.name(), &group.key.name, threshold)
    })
}

/// Partition a batch into consolidation groups, in creation order.
pub fn group_ingredients(batch: &[StructuredIngredient], threshold: f64) -> Vec<IngredientGroup> {
    let mut groups: Vec<IngredientGroup> = Vec::new();

    for (idx, ingredient) in batch.iter().enumerate() {
        match find_matching_group(ingredient, &groups, threshold) {
            Some(pos) => groups[pos].members.push(idx),
            None => groups.push(IngredientGroup {
                key: GroupKey::of(ingredient),
                members: vec![idx],
            }),
        }
    }

    groups
}

/// Merge the members of one group into a single ingredient.
///
/// Name, unit, and modifier come from the first member. A single-member
/// group is returned unchanged.
pub fn merge_group(batch: &[StructuredIngredient], group: &IngredientGroup) -> CombinedIngredient {
    let members: Vec<&StructuredIngredient> = group.members.iter().map(|&i| &batch[i]).collect();
    let mut merged = members[0].clone();

    if members.len() > 1 {
        merged.set_quantity(sum_quantities(members.iter().map(|m| m.quantity())));
        merged.set_prep_method(most_common_prep(&members));
    }

    CombinedIngredient {
        ingredient: merged,
        member_count: members.len(),
    }
}

/// Most frequent non-absent preparation method; ties go to the value seen
/// first.
fn most_common_prep(members: &[&StructuredIngredient]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for prep in members.iter().filter_map(|m| m.prep_method()) {
        match counts.iter_mut().find(|(p, _)| *p == prep) {
            Some((_, n)) => *n += 1,
            None => counts.push((prep, 1)),
        }
    }

    // max_by_key returns the last maximum, so walk in reverse to keep the first.
    counts
        .iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(p, _)| p.to_string())
}

/// Consolidate a batch of ingredients.
///
/// Output order follows group creation order.
///
/// ```rust
/// use larder_core::consolidate::combine;
/// use larder_core::models::StructuredIngredient;
///
/// let oz = |name: &str, q: f64| {
///     StructuredIngredient::new(name).unwrap()
///         .with_quantity(Some(q)).unwrap()
///         .with_unit(Some("oz"))
/// };
/// let out = combine(&[oz("mushroom", 16.0), oz("mushrooms", 6.0)], 0.85);
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].ingredient.quantity(), Some(22.0));
/// ```
pub fn combine(batch: &[StructuredIngredient], threshold: f64) -> Vec<CombinedIngredient> {
    group_ingredients(batch, threshold)
        .iter()
        .map(|group| merge_group(batch, group))
        .collect()
}

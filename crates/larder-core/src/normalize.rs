//! Ingredient name normalization and fuzzy name matching.
//!
//! Normalization is a plural-stripping heuristic, not a linguistic model:
//! it lower-cases and trims, then applies the first matching suffix rule.
//!
//! | Suffix | Rule | Example |
//! |--------|------|---------|
//! | `ies` | replace with `y` | `berries` → `berry` |
//! | `es` | drop two characters | `tomatoes` → `tomato` |
//! | `s` (length > 3) | drop one character | `mushrooms` → `mushroom` |
//!
//! Irregular plurals and short words ending in `s` are not special-cased.
//!
//! Similarity is the longest-common-subsequence ratio
//! `2 × LCS(a, b) / (|a| + |b|)` over the normalized names.

/// Minimum similarity ratio for two names to count as the same ingredient.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Canonicalize an ingredient name for comparison.
///
/// ```rust
/// use larder_core::normalize::normalize;
///
/// assert_eq!(normalize("Mushrooms"), "mushroom");
/// assert_eq!(normalize("berries"), "berry");
/// ```
pub fn normalize(name: &str) -> String {
    let name = name.trim().to_lowercase();

    if let Some(stem) = name.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = name.strip_suffix("es") {
        stem.to_string()
    } else if name.ends_with('s') && name.chars().count() > 3 {
        name[..name.len() - 1].to_string()
    } else {
        name
    }
}

/// Similarity ratio in `[0.0, 1.0]` between two strings.
///
/// `1.0` for identical strings (including two empty strings), `0.0` when
/// the strings share no characters.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Whether two ingredient names denote the same ingredient.
///
/// Both names are normalized; equal normalized names always match,
/// otherwise the similarity ratio must reach `threshold`.
pub fn names_match(a: &str, b: &str, threshold: f64) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return true;
    }
    similarity_ratio(&a, &b) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_rules() {
        assert_eq!(normalize("mushrooms"), "mushroom");
        assert_eq!(normalize("tomatoes"), "tomato");
        assert_eq!(normalize("berries"), "berry");
        assert_eq!(normalize("ONION"), "onion");
    }

    #[test]
    fn test_short_words_keep_trailing_s() {
        assert_eq!(normalize("gas"), "gas");
        assert_eq!(normalize("peas"), "pea");
    }

    #[test]
    fn test_first_rule_wins() {
        // "ies" takes precedence over the generic "es" rule.
        assert_eq!(normalize("cookies"), "cooky");
        assert_eq!(normalize("  Leeks "), "leek");
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity_ratio("basil", "basil"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        let r = similarity_ratio("mushroom", "mushrom");
        assert!(r > 0.9 && r < 1.0, "ratio was {}", r);
    }

    #[test]
    fn test_similarity_degrades_with_edits() {
        let one = similarity_ratio("cilantro", "cilantra");
        let two = similarity_ratio("cilantro", "cilantaa");
        assert!(one > two);
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("mushroom", "mushrooms", DEFAULT_FUZZY_THRESHOLD));
        assert!(!names_match("mushroom", "spinach", DEFAULT_FUZZY_THRESHOLD));
        assert!(names_match("Mushroom", "mushrooms", DEFAULT_FUZZY_THRESHOLD));
        assert!(names_match("mushrooms", "MUSHROOM", DEFAULT_FUZZY_THRESHOLD));
    }

    #[test]
    fn test_names_match_fuzzy_typo() {
        assert!(names_match("parmesan", "parmesean", DEFAULT_FUZZY_THRESHOLD));
        assert!(!names_match("rice", "mice", 0.9));
    }
}

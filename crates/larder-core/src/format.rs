//! Render a structured ingredient back to a display line.
//!
//! Layout: `[quantity] [unit] [modifier] name [(prep_method)]`, with absent
//! parts and their separating spaces omitted. This is a best-effort inverse
//! of extraction; re-extracting the output is not guaranteed to reproduce
//! the same record.

use crate::models::StructuredIngredient;

/// Format a quantity: integer form when it has no fractional part,
/// otherwise one decimal place.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        format!("{:.1}", quantity)
    }
}

/// Compose the display line for an ingredient.
///
/// A zero quantity is omitted just like an absent one.
///
/// ```rust
/// use larder_core::format::format_ingredient;
/// use larder_core::models::StructuredIngredient;
///
/// let spinach = StructuredIngredient::new("spinach").unwrap()
///     .with_quantity(Some(2.0)).unwrap()
///     .with_unit(Some("cups"))
///     .with_modifier(Some("fresh"))
///     .with_prep_method(Some("chopped"));
/// assert_eq!(format_ingredient(&spinach), "2 cups fresh spinach (chopped)");
/// ```
pub fn format_ingredient(ingredient: &StructuredIngredient) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);

    if let Some(q) = ingredient.quantity().filter(|q| *q != 0.0) {
        parts.push(format_quantity(q));
    }
    if let Some(unit) = ingredient.unit() {
        parts.push(unit.to_string());
    }
    if let Some(modifier) = ingredient.modifier() {
        parts.push(modifier.to_string());
    }
    parts.push(ingredient.name().to_string());
    if let Some(prep) = ingredient.prep_method() {
        parts.push(format!("({})", prep));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ing(name: &str) -> StructuredIngredient {
        StructuredIngredient::new(name).unwrap()
    }

    #[test]
    fn test_full_record() {
        let s = format_ingredient(
            &ing("spinach")
                .with_quantity(Some(2.0))
                .unwrap()
                .with_unit(Some("cups"))
                .with_modifier(Some("fresh")),
        );
        assert!(s.contains('2'));
        assert!(s.contains("cups"));
        assert!(s.contains("fresh"));
        assert!(s.contains("spinach"));
        assert!(!s.contains("2.0"));
        assert_eq!(s, "2 cups fresh spinach");
    }

    #[test]
    fn test_name_only() {
        assert_eq!(format_ingredient(&ing("salt")), "salt");
    }

    #[test]
    fn test_fractional_quantity_one_decimal() {
        let s = format_ingredient(&ing("butter").with_quantity(Some(1.3)).unwrap());
        assert_eq!(s, "1.3 butter");
        let s = format_ingredient(
            &ing("milk")
                .with_quantity(Some(0.5))
                .unwrap()
                .with_unit(Some("cup")),
        );
        assert_eq!(s, "0.5 cup milk");
    }

    #[test]
    fn test_zero_quantity_omitted() {
        let s = format_ingredient(&ing("pepper").with_quantity(Some(0.0)).unwrap());
        assert_eq!(s, "pepper");
    }

    #[test]
    fn test_prep_in_parentheses() {
        let s = format_ingredient(
            &ing("garlic")
                .with_quantity(Some(3.0))
                .unwrap()
                .with_prep_method(Some("minced")),
        );
        assert_eq!(s, "3 garlic (minced)");
    }

    #[test]
    fn test_large_integer_quantity() {
        assert_eq!(format_quantity(22.0), "22");
        assert_eq!(format_quantity(14.0), "14");
        assert_eq!(format_quantity(2.74), "2.7");
    }

    #[test]
    fn test_quantity_beyond_integer_range() {
        let s = format_ingredient(&ing("rice").with_quantity(Some(1e20)).unwrap());
        assert_eq!(s, "100000000000000000000 rice");
    }
}

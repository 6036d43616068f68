//! Ingredient extraction providers.
//!
//! | Config Value | Provider |
//! |-------------|----------|
//! | `"heuristic"` | [`HeuristicExtractor`] (offline, default) |
//! | `"openai"` / `"ollama"` | [`LlmExtractor`] |
//! | `"disabled"` | [`DisabledExtractor`] |
//!
//! Every provider implements [`larder_core::extract::Extractor`]. Errors are
//! returned, not swallowed: the shopping list substitutes the fallback
//! record itself.

use anyhow::{bail, Result};
use larder_core::extract::Extractor;
use larder_core::models::StructuredIngredient;
use regex::Regex;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::llm::LlmClient;

/// Build the extractor selected by `config.provider`.
pub fn create_extractor(config: &ServiceConfig) -> Result<Box<dyn Extractor>> {
    match config.provider.as_str() {
        "heuristic" => Ok(Box::new(HeuristicExtractor::new()?)),
        "disabled" => Ok(Box::new(DisabledExtractor)),
        "openai" | "ollama" => Ok(Box::new(LlmExtractor::new(config)?)),
        other => bail!("Unknown extractor provider: {}", other),
    }
}

/// Extractor that always fails, so every line takes the fallback record.
pub struct DisabledExtractor;

impl Extractor for DisabledExtractor {
    fn name(&self) -> &str {
        "disabled"
    }

    fn extract(&self, _text: &str) -> Result<StructuredIngredient> {
        bail!("ingredient extraction is disabled")
    }
}

// ============ LLM Extractor ============

pub struct LlmExtractor {
    provider: String,
    client: LlmClient,
}

impl LlmExtractor {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            provider: config.provider.clone(),
            client: LlmClient::new(config)?,
        })
    }
}

impl Extractor for LlmExtractor {
    fn name(&self) -> &str {
        &self.provider
    }

    fn extract(&self, text: &str) -> Result<StructuredIngredient> {
        let reply = self.client.complete(&extraction_prompt(text), 150)?;
        debug!(input = text, model = self.client.model(), reply = %reply, "extraction reply");
        parse_extraction_reply(&reply)
    }
}

fn extraction_prompt(text: &str) -> String {
    format!(
        r#"Parse this ingredient into a JSON object.

Ingredient: "{text}"

Fields:
- name: base ingredient name, lowercase
- quantity: numeric amount as a number, null if none
- unit: measurement unit (cups, oz, lbs, tbsp, tsp, ...), null if count-based
- modifier: state such as "fresh", "dried", "canned", "frozen", null if none
- prep_method: preparation such as "chopped", "diced", "minced", "sliced", null if none

Examples:
"2 cups fresh spinach, chopped" -> {{"name": "spinach", "quantity": 2.0, "unit": "cups", "modifier": "fresh", "prep_method": "chopped"}}
"mushrooms (16 oz)" -> {{"name": "mushrooms", "quantity": 16.0, "unit": "oz", "modifier": null, "prep_method": null}}
"3-4 medium ripe tomatoes" -> {{"name": "tomatoes", "quantity": 3.5, "unit": null, "modifier": "ripe", "prep_method": null}}

Reply with the JSON object only."#
    )
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => trimmed.trim_start_matches('`'),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a model reply into a record.
///
/// Lenient about surrounding prose and about `quantity` arriving as a
/// string. A quantity that is not a finite non-negative number becomes
/// absent. A missing or blank `name` is an error.
fn parse_extraction_reply(reply: &str) -> Result<StructuredIngredient> {
    let body = strip_code_fences(reply);
    let json_text = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => bail!("reply contains no JSON object: {}", body),
    };
    let value: serde_json::Value = serde_json::from_str(json_text)?;

    let name = value
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| anyhow::anyhow!("reply is missing a name"))?;

    let quantity = match value.get("quantity") {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|q| q.is_finite() && *q >= 0.0);

    let text_field = |key: &str| value.get(key).and_then(|v| v.as_str());

    Ok(StructuredIngredient::new(name)?
        .with_quantity(quantity)?
        .with_unit(text_field("unit"))
        .with_modifier(text_field("modifier"))
        .with_prep_method(text_field("prep_method")))
}

// ============ Heuristic Extractor ============

const UNITS: &[&str] = &[
    "cup", "cups", "c", "tbsp", "tbs", "tablespoon", "tablespoons", "tsp", "teaspoon",
    "teaspoons", "oz", "fl oz", "ounce", "ounces", "lb", "lbs", "pound", "pounds", "g", "gram",
    "grams", "kg", "ml", "l", "liter", "liters", "litre", "litres", "pint", "pints", "quart",
    "quarts", "qt", "gallon", "gallons", "can", "cans", "jar", "jars", "package", "packages",
    "pkg", "bag", "bags", "bottle", "bottles", "box", "boxes", "bunch", "bunches", "clove",
    "cloves", "head", "heads", "slice", "slices", "stick", "sticks", "sprig", "sprigs", "pinch",
    "dash", "inch", "inches", "piece", "pieces",
];

const SIZE_WORDS: &[&str] = &["small", "medium", "large", "extra-large", "jumbo", "whole"];

const MODIFIERS: &[&str] = &[
    "fresh", "dried", "dry", "canned", "frozen", "ripe", "raw", "cooked", "smoked", "toasted",
    "roasted",
];

const PREP_WORDS: &[&str] = &[
    "chopped", "diced", "minced", "sliced", "grated", "shredded", "crushed", "peeled", "cubed",
    "halved", "quartered", "julienned", "mashed", "melted", "softened", "beaten", "trimmed",
    "rinsed", "drained", "zested",
];

const PREP_ADVERBS: &[&str] = &["finely", "roughly", "thinly", "coarsely", "freshly", "lightly"];

/// One amount: `1½`, `1 1/2`, `3/4`, `1.5`, `2`, `½`. Alternatives are
/// ordered so the longest form wins.
const SINGLE_AMOUNT: &str = r"\d+\s*[½¼¾⅓⅔⅛]|\d+\s+\d+/\d+|\d+/\d+|\d*\.\d+|\d+|[½¼¾⅓⅔⅛]";

/// Rule-based offline extractor for common English ingredient phrasing.
///
/// Recognizes a leading amount (a range like `3-4` becomes its midpoint)
/// with an optional unit, attached (`500g`) or not. Also recognizes size
/// words (dropped), one state modifier, leading preparation words, and a
/// `, prep` clause. Parentheticals anywhere in the line are lifted out:
/// one holding an amount (`mushrooms (16 oz)`) supplies the quantity when
/// the line has none, any other becomes a preparation note.
pub struct HeuristicExtractor {
    amount: Regex,
    value: Regex,
    paren: Regex,
}

impl HeuristicExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let mut units = UNITS.to_vec();
        units.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let units: Vec<String> = units
            .iter()
            .map(|u| regex::escape(u).replace(' ', r"\s+"))
            .collect();

        let amount = Regex::new(&format!(
            r"(?x)
            ^\s* (?P<low>{n})
            (?: \s* (?:-|–|to) \s* (?P<high>{n}) )?
            (?: [\s-]* (?P<unit>{u}) \b \.? )?
            (?: \s+ (?:of\s+)? | $ )",
            n = SINGLE_AMOUNT,
            u = units.join("|"),
        ))?;
        let value = Regex::new(
            r"(?x)
            ^(?:
                (?P<whole>\d+)? \s* (?P<vulgar>[½¼¾⅓⅔⅛])
              | (?: (?P<mixed>\d+) \s+ )? (?P<num>\d+) / (?P<den>\d+)
              | (?P<plain>\d*\.\d+|\d+)
            )$",
        )?;
        let paren = Regex::new(r"\(([^)]*)\)")?;

        Ok(Self {
            amount,
            value,
            paren,
        })
    }

    /// Numeric value of one amount matched by [`SINGLE_AMOUNT`].
    fn amount_value(&self, text: &str) -> Option<f64> {
        let caps = self.value.captures(text.trim())?;
        let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<f64>().ok());

        if let Some(vulgar) = caps.name("vulgar") {
            return Some(number("whole").unwrap_or(0.0) + vulgar_value(vulgar.as_str())?);
        }
        if let (Some(num), Some(den)) = (number("num"), number("den")) {
            return (den != 0.0).then(|| number("mixed").unwrap_or(0.0) + num / den);
        }
        number("plain")
    }

    /// Amount and unit at the start of `text`, plus the text after them.
    fn leading_amount<'t>(&self, text: &'t str) -> Option<(f64, Option<String>, &'t str)> {
        let caps = self.amount.captures(text)?;
        let low = self.amount_value(caps.name("low")?.as_str())?;
        let quantity = match caps.name("high") {
            Some(high) => (low + self.amount_value(high.as_str())?) / 2.0,
            None => low,
        };
        let unit = caps.name("unit").map(|u| u.as_str().to_string());
        let end = caps.get(0).map_or(0, |m| m.end());
        Some((quantity, unit, &text[end..]))
    }
}

impl Extractor for HeuristicExtractor {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn extract(&self, text: &str) -> Result<StructuredIngredient> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            bail!("empty ingredient text");
        }

        let mut paren_amount = None;
        let mut paren_notes: Vec<&str> = Vec::new();
        for caps in self.paren.captures_iter(&lowered) {
            let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
            if inner.is_empty() {
                continue;
            }
            match self.leading_amount(inner) {
                Some((q, u, _)) => {
                    paren_amount.get_or_insert((q, u));
                }
                None => paren_notes.push(inner),
            }
        }

        let stripped = self.paren.replace_all(&lowered, " ");
        let (main, clause) = match stripped.split_once(',') {
            Some((head, tail)) => (head, Some(tail.trim()).filter(|t| !t.is_empty())),
            None => (stripped.as_ref(), None),
        };

        let (quantity, unit, rest) = match (self.leading_amount(main), paren_amount) {
            (Some((q, u, rest)), _) => (Some(q), u, rest),
            (None, Some((q, u))) => (Some(q), u, main),
            (None, None) => (None, None, main),
        };

        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let mut pos = 0;
        let mut modifier = None;
        let mut prep: Vec<&str> = Vec::new();
        while let Some(&token) = tokens.get(pos) {
            if SIZE_WORDS.contains(&token) {
                pos += 1;
            } else if modifier.is_none() && MODIFIERS.contains(&token) {
                modifier = Some(token);
                pos += 1;
            } else if PREP_WORDS.contains(&token) {
                prep.push(token);
                pos += 1;
            } else if PREP_ADVERBS.contains(&token)
                && tokens.get(pos + 1).is_some_and(|next| PREP_WORDS.contains(next))
            {
                prep.push(token);
                prep.push(tokens[pos + 1]);
                pos += 2;
            } else {
                break;
            }
        }

        let name = tokens[pos..]
            .join(" ")
            .trim_matches(|c: char| c.is_ascii_punctuation())
            .to_string();
        if name.is_empty() {
            bail!("no ingredient name in '{}'", text.trim());
        }

        let mut notes: Vec<String> = Vec::new();
        if !prep.is_empty() {
            notes.push(prep.join(" "));
        }
        notes.extend(clause.map(str::to_string));
        notes.extend(paren_notes.iter().map(|n| n.to_string()));
        let prep_method = (!notes.is_empty()).then(|| notes.join(", "));

        Ok(StructuredIngredient::new(&name)?
            .with_quantity(quantity)?
            .with_unit(unit.as_deref())
            .with_modifier(modifier)
            .with_prep_method(prep_method.as_deref()))
    }
}

fn vulgar_value(symbol: &str) -> Option<f64> {
    match symbol.chars().next()? {
        '½' => Some(0.5),
        '¼' => Some(0.25),
        '¾' => Some(0.75),
        '⅓' => Some(1.0 / 3.0),
        '⅔' => Some(2.0 / 3.0),
        '⅛' => Some(0.125),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> StructuredIngredient {
        HeuristicExtractor::new().unwrap().extract(text).unwrap()
    }

    #[test]
    fn test_count_only() {
        let ing = extract("4 tomato");
        assert_eq!(ing.name(), "tomato");
        assert_eq!(ing.quantity(), Some(4.0));
        assert_eq!(ing.unit(), None);
    }

    #[test]
    fn test_quantity_and_unit() {
        let ing = extract("10 oz tomatoes");
        assert_eq!(ing.name(), "tomatoes");
        assert_eq!(ing.quantity(), Some(10.0));
        assert_eq!(ing.unit(), Some("oz"));

        let ing = extract("8 oz mushrooms");
        assert_eq!(ing.name(), "mushrooms");
        assert_eq!(ing.unit(), Some("oz"));

        let ing = extract("2 fl oz cream");
        assert_eq!(ing.name(), "cream");
        assert_eq!(ing.unit(), Some("fl oz"));
    }

    #[test]
    fn test_modifier_and_prep_clause() {
        let ing = extract("2 cups Fresh Spinach, chopped");
        assert_eq!(ing.name(), "spinach");
        assert_eq!(ing.quantity(), Some(2.0));
        assert_eq!(ing.unit(), Some("cups"));
        assert_eq!(ing.modifier(), Some("fresh"));
        assert_eq!(ing.prep_method(), Some("chopped"));
    }

    #[test]
    fn test_trailing_paren_amount() {
        let ing = extract("mushrooms (16 oz)");
        assert_eq!(ing.name(), "mushrooms");
        assert_eq!(ing.quantity(), Some(16.0));
        assert_eq!(ing.unit(), Some("oz"));

        let ing = extract("fresh ginger (2-inch piece)");
        assert_eq!(ing.name(), "ginger");
        assert_eq!(ing.quantity(), Some(2.0));
        assert_eq!(ing.unit(), Some("inch"));
        assert_eq!(ing.modifier(), Some("fresh"));
    }

    #[test]
    fn test_trailing_paren_note() {
        let ing = extract("1 onion (about 1 cup)");
        assert_eq!(ing.quantity(), Some(1.0));
        assert_eq!(ing.unit(), None);
        assert_eq!(ing.prep_method(), Some("about 1 cup"));

        let ing = extract("1 onion (peeled)");
        assert_eq!(ing.name(), "onion");
        assert_eq!(ing.prep_method(), Some("peeled"));
    }

    #[test]
    fn test_ranges_and_size_words() {
        let ing = extract("3-4 medium ripe tomatoes");
        assert_eq!(ing.name(), "tomatoes");
        assert_eq!(ing.quantity(), Some(3.5));
        assert_eq!(ing.modifier(), Some("ripe"));

        assert_eq!(extract("2 to 3 large eggs").quantity(), Some(2.5));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(extract("1 1/2 cups flour").quantity(), Some(1.5));
        assert_eq!(extract("3/4 cup milk").quantity(), Some(0.75));
        assert_eq!(extract("½ cup sugar").quantity(), Some(0.5));
        assert_eq!(extract("1½ tsp salt").quantity(), Some(1.5));
        assert_eq!(extract("2 ¼ cups water").quantity(), Some(2.25));
        assert_eq!(extract("1.5 lbs chicken thighs").unit(), Some("lbs"));
    }

    #[test]
    fn test_attached_unit() {
        let ing = extract("500g flour");
        assert_eq!(ing.name(), "flour");
        assert_eq!(ing.quantity(), Some(500.0));
        assert_eq!(ing.unit(), Some("g"));

        let ing = extract("2tbsp butter");
        assert_eq!(ing.name(), "butter");
        assert_eq!(ing.quantity(), Some(2.0));
        assert_eq!(ing.unit(), Some("tbsp"));
    }

    #[test]
    fn test_mid_line_paren_size() {
        let ing = extract("1 (14 oz) can diced tomatoes");
        assert_eq!(ing.name(), "tomatoes");
        assert_eq!(ing.quantity(), Some(1.0));
        assert_eq!(ing.unit(), Some("can"));
        assert_eq!(ing.prep_method(), Some("diced"));

        let ing = extract("1 (14.5 oz) can tomatoes");
        assert_eq!(ing.name(), "tomatoes");
        assert_eq!(ing.quantity(), Some(1.0));
        assert_eq!(ing.unit(), Some("can"));
    }

    #[test]
    fn test_unit_letters_inside_words() {
        let ing = extract("2 garlic");
        assert_eq!(ing.name(), "garlic");
        assert_eq!(ing.unit(), None);

        let ing = extract("1 lemon");
        assert_eq!(ing.name(), "lemon");
        assert_eq!(ing.unit(), None);
    }

    #[test]
    fn test_leading_prep_words() {
        let ing = extract("2 cloves finely minced garlic");
        assert_eq!(ing.name(), "garlic");
        assert_eq!(ing.unit(), Some("cloves"));
        assert_eq!(ing.prep_method(), Some("finely minced"));
    }

    #[test]
    fn test_unit_of() {
        let ing = extract("2 cups of flour");
        assert_eq!(ing.name(), "flour");
        assert_eq!(ing.unit(), Some("cups"));
    }

    #[test]
    fn test_no_amount() {
        let ing = extract("salt and pepper");
        assert_eq!(ing.name(), "salt and pepper");
        assert_eq!(ing.quantity(), None);
    }

    #[test]
    fn test_no_name_fails() {
        let extractor = HeuristicExtractor::new().unwrap();
        assert!(extractor.extract("2 cups").is_err());
        assert!(extractor.extract("   ").is_err());
    }

    #[test]
    fn test_parse_reply_strips_fences() {
        let reply = "```json\n{\"name\": \"Spinach\", \"quantity\": 2.0, \"unit\": \"cups\", \"modifier\": \"fresh\", \"prep_method\": \"chopped\"}\n```";
        let ing = parse_extraction_reply(reply).unwrap();
        assert_eq!(ing.name(), "spinach");
        assert_eq!(ing.quantity(), Some(2.0));
        assert_eq!(ing.modifier(), Some("fresh"));
    }

    #[test]
    fn test_parse_reply_is_lenient() {
        let ing = parse_extraction_reply(
            "Here you go: {\"name\": \"eggs\", \"quantity\": \"3\", \"unit\": null}",
        )
        .unwrap();
        assert_eq!(ing.quantity(), Some(3.0));
        assert_eq!(ing.unit(), None);

        let ing = parse_extraction_reply("{\"name\": \"salt\", \"quantity\": -1}").unwrap();
        assert_eq!(ing.quantity(), None);
    }

    #[test]
    fn test_parse_reply_failures() {
        assert!(parse_extraction_reply("I cannot parse that").is_err());
        assert!(parse_extraction_reply("{\"quantity\": 2}").is_err());
        assert!(parse_extraction_reply("{\"name\": \"  \"}").is_err());
    }

    #[test]
    fn test_disabled_always_fails() {
        assert!(DisabledExtractor.extract("1 egg").is_err());
    }

    #[test]
    fn test_create_extractor() {
        let e = create_extractor(&ServiceConfig::with_provider("heuristic")).unwrap();
        assert_eq!(e.name(), "heuristic");
        let e = create_extractor(&ServiceConfig::with_provider("disabled")).unwrap();
        assert_eq!(e.name(), "disabled");
        assert!(create_extractor(&ServiceConfig::with_provider("magic")).is_err());
    }
}

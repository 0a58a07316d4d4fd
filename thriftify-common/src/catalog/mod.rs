//! Product suggestions requested from a text generator as `Name: Description; ...`.

use serde::Serialize;

use crate::advisor::{GenerateText, GenerationError};

pub const PRODUCT_COUNT: usize = 6;

const SEGMENT_SEPARATOR: &str = "; ";
const NAME_SEPARATOR: &str = ": ";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    MissingSeparator,
    EmptyName,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedSegment {
    Product(Product),
    Skipped { segment: String, reason: SkipReason },
}

pub fn catalog_prompt(topic: &str, budget: &str) -> String {
    format!(
        "Find {PRODUCT_COUNT} different models of {topic} in the range of {budget}. Don't give \
         me personalized information or ask for more context, I want ONLY {PRODUCT_COUNT} \
         precise model names that I can search up, and NOTHING else in the response. Include \
         short descriptions for each product. Format it as follows: Model1: Description1; \
         Model2: Description2; Model3: Description3; Model4: Description4; Model5: \
         Description5; Model6: Description6. (But don't make the actual model names model1, \
         model2, etc, make it the actual model)"
    )
}

/// Splits a reply on `"; "`, then each segment on its first `": "`. Every segment yields
/// either a product or the reason it was skipped.
pub fn parse_catalog_reply(reply: &str) -> Vec<ParsedSegment> {
    reply
        .trim()
        .split(SEGMENT_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> ParsedSegment {
    let Some((name, description)) = segment.split_once(NAME_SEPARATOR) else {
        return ParsedSegment::Skipped {
            segment: String::from(segment),
            reason: SkipReason::MissingSeparator,
        };
    };

    let name = name.trim();
    if name.is_empty() {
        return ParsedSegment::Skipped {
            segment: String::from(segment),
            reason: SkipReason::EmptyName,
        };
    }

    ParsedSegment::Product(Product {
        name: respace_name(name),
        description: String::from(description.trim()),
    })
}

/// Best-effort split of run-together names: a space goes before an uppercase letter that
/// follows a lowercase letter or digit, and before the last capital of an acronym that runs
/// into a lowercase word (`"HPEnvy"` -> `"HP Envy"`). Existing spacing is left alone.
pub fn respace_name(name: &str) -> String {
    let chars = name.chars().collect::<Vec<_>>();
    let mut respaced = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();

            let after_lower_or_digit = prev.is_lowercase() || prev.is_ascii_digit();
            let ends_acronym = prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase());

            if after_lower_or_digit || ends_acronym {
                respaced.push(' ');
            }
        }

        respaced.push(c);
    }

    respaced
}

/// Requests and parses suggestions. Skipped segments are logged and dropped.
pub async fn suggest_products(
    generator: &dyn GenerateText,
    topic: &str,
    budget: &str,
) -> Result<Vec<Product>, GenerationError> {
    let reply = generator.generate(&catalog_prompt(topic, budget)).await?;

    let products = parse_catalog_reply(&reply)
        .into_iter()
        .filter_map(|parsed| match parsed {
            ParsedSegment::Product(p) => Some(p),
            ParsedSegment::Skipped { segment, reason } => {
                log::warn!("Skipping catalog segment ({reason:?}): {segment}");
                None
            }
        })
        .collect();

    Ok(products)
}

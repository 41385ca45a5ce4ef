//! Server-side filtering of normalized products. The upstream search
//! engine only sees filter values as extra query tokens and does not
//! reliably honor them, so every filter is re-checked here.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use shopwizz_common::{Filters, Product};

/// Return the subset of `products` for which every filter holds.
/// Order is preserved; products are never mutated.
pub fn apply_filters(products: Vec<Product>, filters: &Filters) -> Vec<Product> {
    let checks: Vec<FieldCheck> = filters
        .iter()
        .filter_map(|(key, value)| FieldCheck::build(key, value))
        .collect();

    if checks.is_empty() {
        return products;
    }

    products
        .into_iter()
        .filter(|p| checks.iter().all(|c| c.matches(p)))
        .collect()
}

/// One compiled filter condition. Building returns `None` for values
/// that carry no constraint (null, empty string, unparseable input):
/// a filter that cannot be evaluated must not exclude everything.
enum FieldCheck {
    PriceMax(f64),
    Store(String),
    Features(String),
    Shipping(String),
    ReviewCount(CmpOp, f64),
    Rating(CmpOp, f64),
    Brand(Regex),
    Word(Regex),
    AllWords(Vec<Regex>),
}

impl FieldCheck {
    fn build(key: &str, value: &Value) -> Option<Self> {
        match key {
            "priceMax" => numeric_value(value).map(FieldCheck::PriceMax),
            "store" => text_value(value).map(FieldCheck::Store),
            "features" => text_value(value).map(FieldCheck::Features),
            "shipping" => text_value(value).map(FieldCheck::Shipping),
            "reviewCount" => {
                comparator_value(value).map(|(op, n)| FieldCheck::ReviewCount(op, n))
            }
            "rating" => comparator_value(value).map(|(op, n)| FieldCheck::Rating(op, n)),
            "brand" => text_value(value)
                .and_then(|v| word_regex(&v))
                .map(FieldCheck::Brand),
            _ => match value {
                Value::Array(items) => {
                    let regexes: Vec<Regex> = items
                        .iter()
                        .filter_map(text_value_ref)
                        .filter_map(|w| word_regex(w))
                        .collect();
                    if regexes.is_empty() {
                        None
                    } else {
                        Some(FieldCheck::AllWords(regexes))
                    }
                }
                _ => text_value(value)
                    .and_then(|v| word_regex(&v))
                    .map(FieldCheck::Word),
            },
        }
    }

    fn matches(&self, product: &Product) -> bool {
        match self {
            FieldCheck::PriceMax(max) => match shown_price(product) {
                // A price that cannot be parsed cannot be excluded on it
                Some(price) => price <= *max,
                None => true,
            },
            FieldCheck::Store(needle) => {
                contains_ci(product.store.as_deref().unwrap_or(""), needle)
                    || contains_ci(&product.title, needle)
                    || contains_ci(&product.description, needle)
                    || contains_ci(product.link.as_deref().unwrap_or(""), needle)
            }
            FieldCheck::Features(needle) => {
                product.features.iter().any(|f| contains_ci(&f.text, needle))
                    || contains_ci(&product.title, needle)
                    || contains_ci(&product.description, needle)
            }
            FieldCheck::Shipping(needle) => {
                contains_ci(&product.title, needle) || contains_ci(&product.description, needle)
            }
            FieldCheck::ReviewCount(op, n) => op.compare(product.reviews as f64, *n),
            FieldCheck::Rating(op, n) => op.compare(product.rating, *n),
            FieldCheck::Brand(re) => product.extensions.iter().any(|e| re.is_match(e)),
            FieldCheck::Word(re) => {
                re.is_match(&product.title) || re.is_match(&product.description)
            }
            FieldCheck::AllWords(regexes) => regexes
                .iter()
                .all(|re| re.is_match(&product.title) || re.is_match(&product.description)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
}

impl CmpOp {
    fn compare(self, actual: f64, threshold: f64) -> bool {
        match self {
            CmpOp::Ge => actual >= threshold,
            CmpOp::Gt => actual > threshold,
            CmpOp::Le => actual <= threshold,
            CmpOp::Lt => actual < threshold,
            CmpOp::Eq => actual == threshold,
        }
    }
}

/// Parse a comparator string like `">=100"` or `"4"`; the operator
/// defaults to `>=` when absent. A bare JSON number means the same.
fn comparator_value(value: &Value) -> Option<(CmpOp, f64)> {
    match value {
        Value::Number(n) => n.as_f64().map(|n| (CmpOp::Ge, n)),
        Value::String(s) => {
            let s = s.trim();
            let (op, rest) = if let Some(r) = s.strip_prefix(">=") {
                (CmpOp::Ge, r)
            } else if let Some(r) = s.strip_prefix("<=") {
                (CmpOp::Le, r)
            } else if let Some(r) = s.strip_prefix('>') {
                (CmpOp::Gt, r)
            } else if let Some(r) = s.strip_prefix('<') {
                (CmpOp::Lt, r)
            } else if let Some(r) = s.strip_prefix('=') {
                (CmpOp::Eq, r)
            } else {
                (CmpOp::Ge, s)
            };
            rest.trim().parse::<f64>().ok().map(|n| (op, n))
        }
        _ => None,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    text_value_ref(value).map(str::to_string)
}

fn text_value_ref(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim()),
        _ => None,
    }
}

/// The price a buyer sees: shown_price, else the first raw price entry,
/// stripped down to digits and dots. `"N/A"` strips to nothing and
/// yields `None`.
fn shown_price(product: &Product) -> Option<f64> {
    let raw = if !product.typical_prices.shown_price.is_empty() {
        product.typical_prices.shown_price.as_str()
    } else {
        product.prices.first().map(String::as_str).unwrap_or("")
    };
    parse_price(raw)
}

fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Case-insensitive whole-word matcher: `"cat"` matches `"Cat Toy"`
/// but not `"Catnip Toy"`.
fn word_regex(word: &str) -> Option<Regex> {
    let trimmed = word.trim();
    if trimmed.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(trimmed)))
        .case_insensitive(true)
        .build()
        .ok()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shopwizz_common::{Feature, TypicalPrices};

    fn product(title: &str) -> Product {
        Product {
            product_id: title.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn priced(title: &str, price: &str) -> Product {
        Product {
            typical_prices: TypicalPrices::uniform(price),
            prices: vec![price.to_string()],
            ..product(title)
        }
    }

    fn filters(value: serde_json::Value) -> Filters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_filters_pass_everything_through_unchanged() {
        let products = vec![product("A"), product("B"), product("C")];
        let out = apply_filters(products.clone(), &Filters::new());
        assert_eq!(out, products);
    }

    #[test]
    fn word_boundary_rejects_partial_words() {
        let products = vec![product("Catnip Toy"), product("Cat Toy")];
        let out = apply_filters(products, &filters(json!({"animal": "cat"})));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Cat Toy");
    }

    #[test]
    fn rating_comparator_is_inclusive_at_boundary() {
        let mut low = product("meh");
        low.rating = 3.9;
        let mut high = product("good");
        high.rating = 4.0;
        let out = apply_filters(vec![low, high], &filters(json!({"rating": ">=4"})));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "good");
    }

    #[test]
    fn review_count_strict_less_than() {
        let mut nine = product("nine");
        nine.reviews = 9;
        let mut ten = product("ten");
        ten.reviews = 10;
        let out = apply_filters(vec![nine, ten], &filters(json!({"reviewCount": "<10"})));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "nine");
    }

    #[test]
    fn comparator_without_operator_defaults_to_at_least() {
        let mut few = product("few");
        few.reviews = 50;
        let mut many = product("many");
        many.reviews = 150;
        let out = apply_filters(vec![few, many], &filters(json!({"reviewCount": "100"})));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "many");
    }

    #[test]
    fn filters_compose_as_intersection() {
        let mut cheap_good = priced("cheap good", "$20");
        cheap_good.rating = 4.5;
        let mut cheap_bad = priced("cheap bad", "$20");
        cheap_bad.rating = 3.0;
        let mut pricey_good = priced("pricey good", "$80");
        pricey_good.rating = 4.5;

        let all = vec![cheap_good.clone(), cheap_bad.clone(), pricey_good.clone()];
        let combined = apply_filters(
            all.clone(),
            &filters(json!({"rating": ">=4", "priceMax": 50})),
        );

        let by_rating = apply_filters(all.clone(), &filters(json!({"rating": ">=4"})));
        let by_price = apply_filters(all, &filters(json!({"priceMax": 50})));
        let intersection: Vec<Product> = by_rating
            .into_iter()
            .filter(|p| by_price.contains(p))
            .collect();

        assert_eq!(combined, intersection);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].title, "cheap good");
    }

    #[test]
    fn price_max_excludes_above_and_keeps_unparseable() {
        let cheap = priced("cheap", "$29.99");
        let pricey = priced("pricey", "$31.00");
        let unknown = priced("unknown", "N/A");
        let out = apply_filters(
            vec![cheap, pricey, unknown],
            &filters(json!({"priceMax": 30})),
        );
        let titles: Vec<&str> = out.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["cheap", "unknown"]);
    }

    #[test]
    fn store_matches_any_of_store_title_description_link() {
        let mut by_store = product("lipstick");
        by_store.store = Some("Sephora".into());
        let by_title = product("Sephora exclusive lipstick");
        let mut by_link = product("gloss");
        by_link.link = Some("https://www.sephora.com/p/123".into());
        let miss = product("drugstore gloss");

        let out = apply_filters(
            vec![by_store, by_title, by_link, miss],
            &filters(json!({"store": "sephora"})),
        );
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn features_filter_checks_feature_texts_and_description() {
        let mut with_feature = product("headphones");
        with_feature.features = vec![Feature {
            name: "Audio".into(),
            text: "Active noise cancellation".into(),
        }];
        let mut with_description = product("earbuds");
        with_description.description = "noise cancellation built in".into();
        let plain = product("speaker");

        let out = apply_filters(
            vec![with_feature, with_description, plain],
            &filters(json!({"features": "noise cancellation"})),
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn brand_is_word_boundary_on_extensions() {
        let mut nike = product("running shoes");
        nike.extensions = vec!["Nike".into()];
        let mut lookalike = product("other shoes");
        lookalike.extensions = vec!["Nikelab Pro".into()];

        let out = apply_filters(vec![nike, lookalike], &filters(json!({"brand": "nike"})));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "running shoes");
    }

    #[test]
    fn array_values_require_every_element() {
        let both = product("waterproof hiking backpack");
        let one = product("waterproof city backpack");
        let out = apply_filters(
            vec![both, one],
            &filters(json!({"usage": ["waterproof", "hiking"]})),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "waterproof hiking backpack");
    }

    #[test]
    fn empty_and_null_values_constrain_nothing() {
        let products = vec![product("anything")];
        let out = apply_filters(
            products.clone(),
            &filters(json!({"color": "", "size": null})),
        );
        assert_eq!(out, products);
    }

    #[test]
    fn multi_word_phrase_matches_on_boundaries() {
        let hit = product("Organic dog treats, freshly baked");
        let miss = product("dog biscuits");
        let out = apply_filters(vec![hit, miss], &filters(json!({"type": "dog treats"})));
        assert_eq!(out.len(), 1);
    }
}

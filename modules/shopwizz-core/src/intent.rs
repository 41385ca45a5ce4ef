//! Tolerant parsing of the model's intent reply. The model is asked to
//! emit a JSON object followed by one human sentence, but the reply is
//! generative text: anything that fails to yield a valid object with
//! non-empty keywords is treated as plain conversation, never an error.

use ai_client::util::strip_code_blocks;
use shopwizz_common::QueryIntent;

/// A successfully extracted intent plus the human-readable sentence
/// that followed the JSON object (may be empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntent {
    pub intent: QueryIntent,
    pub reply_text: String,
}

/// Extract the structured intent from a raw model reply.
/// Returns `None` when the reply carries no usable intent — no braces,
/// unbalanced braces, invalid JSON, or an empty `keywords` field — in
/// which case the whole reply is conversational content.
pub fn parse_intent_reply(reply: &str) -> Option<ParsedIntent> {
    let cleaned = strip_code_blocks(reply);
    let (object, rest) = extract_balanced_object(cleaned)?;
    let intent: QueryIntent = serde_json::from_str(object).ok()?;
    if intent.keywords.trim().is_empty() {
        return None;
    }
    Some(ParsedIntent {
        intent,
        reply_text: rest.trim().to_string(),
    })
}

/// Find the first balanced `{...}` region by brace counting. Counting
/// is aware of JSON strings and escapes, so braces inside values and
/// nested objects like `filters` don't terminate the scan early.
fn extract_balanced_object(text: &str) -> Option<(&str, &str)> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[start..=i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_then_sentence_splits_cleanly() {
        let reply = "{\"keywords\":\"running shoes\",\"filters\":{\"priceRange\":\"<100\"}}\nHere are some running shoes under $100.";
        let parsed = parse_intent_reply(reply).unwrap();
        assert_eq!(parsed.intent.keywords, "running shoes");
        assert_eq!(
            parsed.intent.filters.get("priceRange"),
            Some(&json!("<100"))
        );
        assert_eq!(parsed.reply_text, "Here are some running shoes under $100.");
    }

    #[test]
    fn reply_without_braces_is_conversational() {
        assert_eq!(
            parse_intent_reply("I'm not sure what you mean, can you clarify?"),
            None
        );
    }

    #[test]
    fn unbalanced_braces_fall_back_to_conversation() {
        assert_eq!(parse_intent_reply("{\"keywords\":\"shoes\""), None);
    }

    #[test]
    fn invalid_json_falls_back_to_conversation() {
        assert_eq!(parse_intent_reply("{keywords: shoes}\nHere you go."), None);
    }

    #[test]
    fn missing_or_empty_keywords_is_no_intent() {
        assert_eq!(parse_intent_reply("{\"filters\":{\"color\":\"red\"}}"), None);
        assert_eq!(parse_intent_reply("{\"keywords\":\"  \"}"), None);
    }

    #[test]
    fn nested_filter_objects_do_not_end_the_scan_early() {
        let reply = "{\"keywords\":\"lamp\",\"filters\":{\"style\":{\"era\":\"deco\"}}} Found these.";
        let parsed = parse_intent_reply(reply).unwrap();
        assert_eq!(parsed.intent.keywords, "lamp");
        assert_eq!(parsed.reply_text, "Found these.");
    }

    #[test]
    fn braces_inside_string_values_are_ignored() {
        let reply = "{\"keywords\":\"mug {novelty}\",\"filters\":{}}\nSure!";
        let parsed = parse_intent_reply(reply).unwrap();
        assert_eq!(parsed.intent.keywords, "mug {novelty}");
        assert_eq!(parsed.reply_text, "Sure!");
    }

    #[test]
    fn leading_prose_before_the_object_is_tolerated() {
        let reply = "Sure thing: {\"keywords\":\"desk\"} A few desks for you.";
        let parsed = parse_intent_reply(reply).unwrap();
        assert_eq!(parsed.intent.keywords, "desk");
        assert_eq!(parsed.reply_text, "A few desks for you.");
    }

    #[test]
    fn fenced_reply_is_stripped_before_parsing() {
        let reply = "```json\n{\"keywords\":\"plant pots\"}\n```";
        let parsed = parse_intent_reply(reply).unwrap();
        assert_eq!(parsed.intent.keywords, "plant pots");
        assert_eq!(parsed.reply_text, "");
    }

    #[test]
    fn suggestions_come_through() {
        let reply = "{\"keywords\":\"laptops\",\"filters\":{},\"suggestions\":[\"gaming laptops\",\"ultrabooks\"]}\nWhich type?";
        let parsed = parse_intent_reply(reply).unwrap();
        assert_eq!(
            parsed.intent.suggestions,
            vec!["gaming laptops", "ultrabooks"]
        );
    }
}

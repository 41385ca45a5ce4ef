//! Intent extraction: one user turn (text or image) in, one raw model
//! reply out. The reply is returned unparsed; callers run it through
//! [`crate::intent::parse_intent_reply`] when they want structure.

use ai_client::{AiError, ChatRequest, ContentPart, OpenAiClient, WireMessage};
use tracing::{debug, info};

use shopwizz_common::{ChatMessage, ChatRole, ShopWizzError};

const CHAT_MODEL: &str = "gpt-4o";
const MAX_REPLY_TOKENS: u32 = 512;
const CHAT_TEMPERATURE: f32 = 0.7;

/// History entries sent to the model, beyond the system instruction and
/// the current turn.
const MAX_HISTORY_MESSAGES: usize = 9;

/// Soft image limit. Decoded size is approximated from the base64
/// length; padding is not accounted for.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Inputs prefixed with this (case-insensitive) get a free-text summary
/// instead of the strict JSON intent contract. Used by the onboarding
/// "trending products" flow.
const SUMMARY_PREFIX: &str = "summarize this product search intent";

const INTENT_SYSTEM_PROMPT: &str = r#"You are ShopWizz.ai's elite AI shopping assistant. Your sole purpose is to parse any user query into precise, actionable product search intent across the entire internet and return it as a JSON object, followed by a short human-friendly reply.

1. JSON Output (first line only)
Always output a single JSON object with these keys:
- keywords (string): a concise search phrase capturing the user's intent.
- filters (object, optional): map every relevant attribute you can infer, such as:
  - category, type, sub-type
  - brand, manufacturer
  - color, pattern, style
  - size, dimension, capacity
  - material, features (waterproof, wireless, organic, etc.)
  - priceRange (string, e.g. "<50", "50-100", ">200")
  - rating (e.g. ">=4"), reviewCount
  - shipping (e.g. "freeShipping", "express"), availability (inStock, preOrder)
  - animal, ageGroup (e.g. "puppy", "adult")
  - gender, usage (e.g. "gaming", "outdoor")
- suggestions (array of strings, optional): if intent is broad or ambiguous, list 3-5 specific refinements the user could choose (styles, sub-categories, brands, etc.).

2. Human-Friendly Reply (second line only)
Provide a brief, natural-language sentence referencing the search (e.g., "Here are X for Y").

Guardrails:
- Do not output any keys beyond keywords, filters, and suggestions.
- Do not include extraneous text or formatting (no markdown, no code fences).
- The first line must be valid JSON. The second line must be a single, short, human-friendly sentence.
- If the user refines a previous search (contextual query), merge new filters with existing ones.
- If a required filter is missing, either infer it from context or ask a follow-up question in natural language after the JSON.
- Always ensure keywords accurately reflect the core intent; do not hallucinate.
- If user asks for "all available products," you may limit to top 20 results but still parse full intent.
- Always use the full chat history to infer missing details or context.

Examples:
User: "I need a waterproof hiking backpack under $150"
Assistant:
{ "keywords":"hiking backpack", "filters":{ "features":"waterproof", "priceRange":"<150", "type":"backpack", "usage":"hiking" } }
Here are waterproof hiking backpacks under $150.

User: "Show me laptops"
Assistant:
{ "keywords":"laptops", "filters":{}, "suggestions":["gaming laptops","ultrabooks","2-in-1 laptops","budget laptops","MacBooks"] }
Which type of laptops are you interested in?

User: "Dark versions"
Assistant:
{ "keywords":"dark laptops", "filters":{ "color":"dark", "category":"laptops" } }
Here are dark-colored laptops that fit your criteria!

User: "Shampoo under $30 at Sephora"
Assistant:
{ "keywords":"shampoo Sephora", "filters":{ "priceRange":"<30", "store":"Sephora", "category":"shampoo" } }
Here are shampoos under $30 available at Sephora.

User: "Wireless headphones with noise cancellation, 4+ stars, free shipping"
Assistant:
{ "keywords":"wireless headphones noise cancellation", "filters":{ "features":"wireless, noise cancellation", "rating":">=4", "shipping":"freeShipping", "type":"headphones" } }
Here are wireless headphones with noise cancellation, rated 4 stars and up, with free shipping.

User: "Nike running shoes, size 10, under $100"
Assistant:
{ "keywords":"Nike running shoes", "filters":{ "brand":"Nike", "type":"running shoes", "size":"10", "priceRange":"<100" } }
Here are Nike running shoes, size 10, under $100.

User: "Best baby strollers with at least 100 reviews"
Assistant:
{ "keywords":"baby strollers", "filters":{ "category":"strollers", "ageGroup":"baby", "reviewCount":">=100" } }
Here are baby strollers with at least 100 reviews.

User: "Organic cat food"
Assistant:
{ "keywords":"organic cat food", "filters":{ "animal":"cat", "features":"organic", "type":"food" } }
Here are organic cat food options.

User: "I want something for outdoor camping"
Assistant:
{ "keywords":"outdoor camping gear", "filters":{ "usage":"camping", "category":"outdoor gear" }, "suggestions":["tents","sleeping bags","camping stoves","lanterns","backpacks"] }
What kind of outdoor camping gear are you looking for?

User: "Show me all available products"
Assistant:
{ "keywords":"all products", "filters":{}, "suggestions":["electronics","clothing","home goods","toys","beauty"] }
Here are the top 20 available products across all categories."#;

/// One validated user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    Text { text: String },
    Image { image: String, text: Option<String> },
}

pub struct ChatService {
    openai: OpenAiClient,
}

impl ChatService {
    pub fn new(openai: OpenAiClient) -> Self {
        Self { openai }
    }

    /// Produce the model's reply for one turn. The reply is raw model
    /// output; a missing content block comes back as an empty string
    /// rather than an error.
    pub async fn reply(
        &self,
        input: &ChatInput,
        history: &[ChatMessage],
    ) -> Result<String, ShopWizzError> {
        let request = match input {
            ChatInput::Text { text } => build_text_request(text, history)?,
            ChatInput::Image { image, text } => build_image_request(image, text.as_deref())?,
        };

        debug!(messages = request.messages.len(), "sending chat request");
        let response = self.openai.chat(&request).await.map_err(map_ai_err)?;
        let reply = response.text().unwrap_or_default().to_string();
        info!(reply_len = reply.len(), "chat reply received");
        Ok(reply)
    }
}

/// Whether this turn opts out of the strict JSON intent contract.
pub fn is_summary_request(text: &str) -> bool {
    text.trim().to_lowercase().starts_with(SUMMARY_PREFIX)
}

/// System instruction, capped history, current turn — in that order.
fn build_text_request(
    text: &str,
    history: &[ChatMessage],
) -> Result<ChatRequest, ShopWizzError> {
    if text.trim().is_empty() {
        return Err(ShopWizzError::InvalidInput(
            "Missing text for chat".to_string(),
        ));
    }

    let mut messages = vec![WireMessage::system(INTENT_SYSTEM_PROMPT)];
    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    for message in &history[start..] {
        match message.role {
            ChatRole::User => messages.push(WireMessage::user(message.content.clone())),
            ChatRole::Assistant => {
                messages.push(WireMessage::assistant(message.content.clone()))
            }
            ChatRole::Other => {}
        }
    }
    messages.push(WireMessage::user(text));

    let mut request = ChatRequest::new(CHAT_MODEL)
        .messages(messages)
        .max_tokens(MAX_REPLY_TOKENS)
        .temperature(CHAT_TEMPERATURE);
    if !is_summary_request(text) {
        request = request.json_object();
    }
    Ok(request)
}

/// Single multimodal turn: optional caption, then the image as a data
/// URL. No JSON contract is imposed on image turns.
fn build_image_request(
    image: &str,
    text: Option<&str>,
) -> Result<ChatRequest, ShopWizzError> {
    if image.is_empty() {
        return Err(ShopWizzError::InvalidInput(
            "Missing image data".to_string(),
        ));
    }

    let approx_bytes = image.len() * 3 / 4;
    if approx_bytes > MAX_IMAGE_BYTES {
        return Err(ShopWizzError::PayloadTooLarge(format!(
            "image is ~{approx_bytes} bytes, limit is {MAX_IMAGE_BYTES}"
        )));
    }

    let mut parts = Vec::new();
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        parts.push(ContentPart::text(text));
    }
    parts.push(ContentPart::image_data_url(format!(
        "data:image/jpeg;base64,{image}"
    )));

    Ok(ChatRequest::new(CHAT_MODEL)
        .message(WireMessage::user_parts(parts))
        .max_tokens(MAX_REPLY_TOKENS))
}

fn map_ai_err(err: AiError) -> ShopWizzError {
    match err {
        AiError::Timeout => ShopWizzError::Timeout("language model".to_string()),
        other => ShopWizzError::upstream("openai", other.to_string()),
    }
}

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use shopwizz_common::{ChatMessage, Filters, ShopWizzError};
use shopwizz_core::ChatInput;

use crate::AppState;

// --- Request bodies ---

#[derive(Deserialize)]
pub struct ChatBody {
    #[serde(rename = "rawInput")]
    raw_input: Option<RawInputBody>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// The wire shape of one user turn. Validated field by field so the
/// client gets a message naming exactly what was missing.
#[derive(Debug, Default, Deserialize)]
pub struct RawInputBody {
    kind: Option<String>,
    text: Option<String>,
    image: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchBody {
    keywords: Option<String>,
    #[serde(default)]
    filters: Filters,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    product_id: Option<String>,
    keywords: Option<String>,
}

// --- Validation ---

fn validate_raw_input(raw: RawInputBody) -> Result<ChatInput, String> {
    match raw.kind.as_deref() {
        Some("text") => match raw.text {
            Some(text) if !text.is_empty() => Ok(ChatInput::Text { text }),
            _ => Err("Missing text for chat".to_string()),
        },
        Some("image") => match raw.image {
            Some(image) if !image.is_empty() => Ok(ChatInput::Image {
                image,
                text: raw.text,
            }),
            _ => Err("Missing image data".to_string()),
        },
        _ => Err("Unsupported input kind".to_string()),
    }
}

fn bearer_present(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.trim().is_empty())
}

// --- Handlers ---

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Response {
    if !bearer_present(&headers) {
        return chat_failure(
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Missing authorization header",
            None,
        );
    }

    let Some(raw) = body.raw_input else {
        return chat_failure(
            StatusCode::BAD_REQUEST,
            "Invalid input: must provide { kind, text }",
            None,
        );
    };
    let input = match validate_raw_input(raw) {
        Ok(input) => input,
        Err(message) => return chat_failure(StatusCode::BAD_REQUEST, &message, None),
    };

    match state.chat.reply(&input, &body.messages).await {
        Ok(reply) => Json(json!({ "ok": true, "reply": reply })).into_response(),
        Err(err) => {
            warn!(error = %err, "chat turn failed");
            let (status, message, details) = chat_error_parts(&err);
            chat_failure(status, &message, details)
        }
    }
}

pub async fn product_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SearchBody>,
) -> Response {
    if !bearer_present(&headers) {
        return search_failure(
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Missing authorization header",
            None,
        );
    }

    let keywords = match body.keywords.as_deref() {
        Some(keywords) if !keywords.trim().is_empty() => keywords,
        _ => return search_failure(StatusCode::BAD_REQUEST, "Missing keywords", None),
    };

    match state.search.search(keywords, &body.filters).await {
        Ok(products) => Json(products).into_response(),
        Err(err) => {
            warn!(error = %err, "product search failed");
            let (status, message, details) = search_error_parts(&err);
            search_failure(status, &message, details)
        }
    }
}

pub async fn product_lookup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<LookupQuery>,
) -> Response {
    if !bearer_present(&headers) {
        return search_failure(
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Missing authorization header",
            None,
        );
    }

    let (Some(product_id), Some(keywords)) =
        (params.product_id.as_deref(), params.keywords.as_deref())
    else {
        return search_failure(
            StatusCode::BAD_REQUEST,
            "Missing product_id or keywords",
            None,
        );
    };

    match state.search.lookup_by_id(product_id, keywords).await {
        Ok(product) => Json(product).into_response(),
        Err(err) => {
            warn!(error = %err, product_id, "product lookup failed");
            let (status, message, details) = search_error_parts(&err);
            search_failure(status, &message, details)
        }
    }
}

// --- Error mapping ---

/// Status + message + optional provider details for the /chat surface,
/// which wraps everything in an `ok` envelope.
fn chat_error_parts(err: &ShopWizzError) -> (StatusCode, String, Option<String>) {
    match err {
        ShopWizzError::InvalidInput(m) => (StatusCode::BAD_REQUEST, m.clone(), None),
        ShopWizzError::PayloadTooLarge(_) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Image too large (max 20MB)".to_string(),
            None,
        ),
        ShopWizzError::Upstream { details, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Language model provider error".to_string(),
            Some(details.clone()),
        ),
        ShopWizzError::Timeout(what) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Upstream timeout: {what}"),
            None,
        ),
        ShopWizzError::Config(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone(), None),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            other.to_string(),
            None,
        ),
    }
}

/// Status + message + optional details for the search surface, which
/// returns bare `{error, details?}` objects on failure.
fn search_error_parts(err: &ShopWizzError) -> (StatusCode, String, Option<String>) {
    match err {
        ShopWizzError::InvalidInput(m) => (StatusCode::BAD_REQUEST, m.clone(), None),
        ShopWizzError::NotFound(_) => {
            (StatusCode::NOT_FOUND, "Product not found".to_string(), None)
        }
        ShopWizzError::Upstream { details, .. } => (
            StatusCode::BAD_GATEWAY,
            "Shopping search provider error".to_string(),
            Some(details.clone()),
        ),
        ShopWizzError::Timeout(what) => (
            StatusCode::GATEWAY_TIMEOUT,
            format!("Upstream timeout: {what}"),
            None,
        ),
        ShopWizzError::Config(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone(), None),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            other.to_string(),
            None,
        ),
    }
}

fn chat_failure(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let mut body = json!({ "ok": false, "error": error });
    if let Some(details) = details {
        body["details"] = json!(details);
    }
    (status, Json(body)).into_response()
}

fn search_failure(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let mut body = json!({ "error": error });
    if let Some(details) = details {
        body["details"] = json!(details);
    }
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: Option<&str>, text: Option<&str>, image: Option<&str>) -> RawInputBody {
        RawInputBody {
            kind: kind.map(str::to_string),
            text: text.map(str::to_string),
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn text_input_validates_to_text_turn() {
        let input = validate_raw_input(raw(Some("text"), Some("red shoes"), None)).unwrap();
        assert_eq!(
            input,
            ChatInput::Text {
                text: "red shoes".to_string()
            }
        );
    }

    #[test]
    fn text_kind_without_text_is_rejected() {
        let err = validate_raw_input(raw(Some("text"), None, None)).unwrap_err();
        assert_eq!(err, "Missing text for chat");
    }

    #[test]
    fn image_kind_keeps_optional_caption() {
        let input =
            validate_raw_input(raw(Some("image"), Some("what is this?"), Some("QUJD"))).unwrap();
        assert_eq!(
            input,
            ChatInput::Image {
                image: "QUJD".to_string(),
                text: Some("what is this?".to_string()),
            }
        );
    }

    #[test]
    fn image_kind_without_data_is_rejected() {
        let err = validate_raw_input(raw(Some("image"), None, None)).unwrap_err();
        assert_eq!(err, "Missing image data");
    }

    #[test]
    fn unknown_or_missing_kind_is_rejected() {
        assert_eq!(
            validate_raw_input(raw(Some("audio"), None, None)).unwrap_err(),
            "Unsupported input kind"
        );
        assert_eq!(
            validate_raw_input(raw(None, Some("hello"), None)).unwrap_err(),
            "Unsupported input kind"
        );
    }

    #[test]
    fn bearer_check_requires_non_empty_value() {
        let mut headers = HeaderMap::new();
        assert!(!bearer_present(&headers));
        headers.insert(header::AUTHORIZATION, "  ".parse().unwrap());
        assert!(!bearer_present(&headers));
        headers.insert(header::AUTHORIZATION, "Bearer anon-key".parse().unwrap());
        assert!(bearer_present(&headers));
    }

    #[test]
    fn search_errors_map_to_distinct_statuses() {
        let upstream = ShopWizzError::upstream("serpapi", "quota exceeded");
        assert_eq!(search_error_parts(&upstream).0, StatusCode::BAD_GATEWAY);

        let timeout = ShopWizzError::Timeout("shopping search".into());
        assert_eq!(search_error_parts(&timeout).0, StatusCode::GATEWAY_TIMEOUT);

        let missing = ShopWizzError::NotFound("p1".into());
        assert_eq!(search_error_parts(&missing).0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn chat_errors_keep_provider_details_for_diagnostics() {
        let err = ShopWizzError::upstream("openai", "model overloaded");
        let (status, _, details) = chat_error_parts(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(details.as_deref(), Some("model overloaded"));
    }

    #[test]
    fn oversized_image_maps_to_413() {
        let err = ShopWizzError::PayloadTooLarge("image is big".into());
        assert_eq!(chat_error_parts(&err).0, StatusCode::PAYLOAD_TOO_LARGE);
    }
}

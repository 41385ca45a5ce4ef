use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAiClient;
use serpapi_client::SerpApiClient;
use shopwizz_common::Config;
use shopwizz_core::{ChatService, SearchOrchestrator};

mod rest;

pub struct AppState {
    pub chat: ChatService,
    pub search: SearchOrchestrator,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shopwizz=info".parse()?))
        .init();

    let config = Config::from_env();

    let state = Arc::new(AppState {
        chat: ChatService::new(OpenAiClient::new(&config.openai_api_key)),
        search: SearchOrchestrator::new(SerpApiClient::new(config.serpapi_key.clone())),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Chat / intent extraction
        .route("/chat", post(rest::chat))
        // Product search + lookup-by-id
        .route(
            "/productSearch",
            post(rest::product_search).get(rest::product_lookup),
        )
        .with_state(state)
        // CORS: the browser front-end calls cross-origin
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Responses carry user-specific search results
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only (no query params)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("ShopWizz API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

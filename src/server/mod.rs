//! HTTP server: page rendering, rate proxy, cache-invalidation webhook

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::RenderCache;
use crate::config::SiteConfig;
use crate::content::{resolve_page, ContentStore};
use crate::rates::{RateClient, RateError, RateQuery};
use crate::render::TemplateRenderer;

/// Slug rendered for the site root
const HOME_SLUG: &str = "home";

/// Shared server state
pub struct ServerState {
    pub config: SiteConfig,
    pub store: Arc<dyn ContentStore>,
    pub renderer: TemplateRenderer,
    pub rates: RateClient,
    pub cache: RenderCache,
    /// Resolved once at startup; `None` disables the webhook entirely
    pub webhook_secret: Option<String>,
    pub debug: bool,
}

impl ServerState {
    pub fn new(config: SiteConfig, store: Arc<dyn ContentStore>, debug: bool) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let rates = RateClient::new(&config.rates)?;
        let webhook_secret = config.webhook.resolve_secret();
        if webhook_secret.is_none() {
            tracing::warn!(
                "{} is not set; the revalidation webhook is disabled",
                config.webhook.secret_env
            );
        }
        Ok(Self {
            config,
            store,
            renderer,
            rates,
            cache: RenderCache::new(),
            webhook_secret,
            debug,
        })
    }
}

/// Start the server
pub async fn start(state: Arc<ServerState>, ip: &str, port: u16) -> Result<()> {
    let app = router(state);

    // Handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/rates", get(rates_handler))
        .route("/api/revalidate", post(revalidate_handler))
        .route("/:slug", get(page_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PageParams {
    preview: Option<String>,
}

impl PageParams {
    fn preview(&self) -> bool {
        matches!(self.preview.as_deref(), Some("1") | Some("true"))
    }
}

async fn home_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PageParams>,
) -> Response {
    render_page_response(&state, HOME_SLUG, params.preview()).await
}

async fn page_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    render_page_response(&state, &slug, params.preview()).await
}

/// Fetch, resolve and render one page; preview requests bypass the cache
async fn render_page_response(state: &ServerState, slug: &str, preview: bool) -> Response {
    let cache_path = format!("/{}", slug);
    if !preview {
        if let Some(cached) = state.cache.get(&cache_path) {
            return Html(cached).into_response();
        }
    }

    let page = match state.store.page_by_slug(slug, preview).await {
        Ok(Some(page)) => page,
        Ok(None) => return not_found_response(state),
        Err(e) => {
            tracing::error!("Failed to fetch page {}: {}", slug, e);
            return (StatusCode::BAD_GATEWAY, "Content store unavailable").into_response();
        }
    };

    let blocks = resolve_page(state.store.as_ref(), &page).await;
    let title = page.title.as_deref().unwrap_or(&page.slug);
    match state.renderer.render_page(&state.config, title, &blocks) {
        Ok(html) => {
            if !preview {
                state.cache.insert(&cache_path, html.clone());
            }
            Html(html).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to render page {}: {}", slug, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render error").into_response()
        }
    }
}

fn not_found_response(state: &ServerState) -> Response {
    match state.renderer.render_not_found(&state.config) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct RateParams {
    #[serde(default)]
    hotel: String,
    #[serde(default)]
    checkin: String,
    #[serde(default)]
    checkout: String,
    adults: Option<u8>,
}

async fn rates_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<RateParams>,
) -> Response {
    let query = match RateQuery::parse(
        &params.hotel,
        &params.checkin,
        &params.checkout,
        params.adults,
    ) {
        Ok(query) => query,
        Err(e) => return rate_error_response(e),
    };

    match state.rates.fetch(&query, state.debug).await {
        Ok(quotes) => Json(json!({
            "hotel": query.hotel,
            "checkin": query.checkin.to_string(),
            "checkout": query.checkout.to_string(),
            "adults": query.adults,
            "quotes": quotes,
        }))
        .into_response(),
        Err(e) => rate_error_response(e),
    }
}

fn rate_error_response(error: RateError) -> Response {
    let status = match &error {
        RateError::Invalid(_) => StatusCode::BAD_REQUEST,
        RateError::UnknownHotel(_) => StatusCode::NOT_FOUND,
        RateError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({"error": error.to_string()}))).into_response()
}

/// CMS publish webhook: flush the render cache.
///
/// Guarded by a shared-secret header compared by exact match; anything else
/// is a bodyless 401 so unauthorized callers learn nothing.
async fn revalidate_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let presented = headers
        .get(&state.config.webhook.header)
        .and_then(|v| v.to_str().ok());

    let authorized = match (&state.webhook_secret, presented) {
        (Some(secret), Some(value)) => secret == value,
        _ => false,
    };
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let flushed = state.cache.flush();
    tracing::info!("Render cache flushed via webhook ({} entries)", flushed);
    Json(json!({"flushed": flushed})).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{MemoryStore, PageDoc, Section};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json as j;
    use tower::ServiceExt;

    fn test_state(store: MemoryStore, secret: Option<&str>) -> Arc<ServerState> {
        let config = SiteConfig::default();
        Arc::new(ServerState {
            renderer: TemplateRenderer::new().unwrap(),
            rates: RateClient::new(&config.rates).unwrap(),
            cache: RenderCache::new(),
            webhook_secret: secret.map(String::from),
            debug: false,
            store: Arc::new(store),
            config,
        })
    }

    fn store_with_page(slug: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_page(PageDoc {
            slug: slug.to_string(),
            title: Some("Test Page".to_string()),
            hero: Some(Section::new("hero").with_field("title", j!("Hello"))),
            sections: vec![Section::new("richText").with_field("body", j!("welcome"))],
            extra: Default::default(),
        });
        store
    }

    async fn get_status(state: Arc<ServerState>, uri: &str) -> StatusCode {
        let response = router(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    async fn get_body(state: Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_page_render_ok() {
        let state = test_state(store_with_page("downtown"), None);
        let (status, body) = get_body(state, "/downtown").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello"));
        assert!(body.contains("welcome"));
    }

    #[tokio::test]
    async fn test_home_serves_home_slug() {
        let state = test_state(store_with_page(HOME_SLUG), None);
        assert_eq!(get_status(state, "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_page_is_404() {
        let state = test_state(MemoryStore::new(), None);
        assert_eq!(get_status(state, "/nope").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_is_cached_after_first_render() {
        let state = test_state(store_with_page("downtown"), None);
        assert!(state.cache.get("/downtown").is_none());
        let _ = get_status(state.clone(), "/downtown").await;
        assert!(state.cache.get("/downtown").is_some());
    }

    #[tokio::test]
    async fn test_preview_bypasses_cache() {
        let state = test_state(store_with_page("downtown"), None);
        let _ = get_status(state.clone(), "/downtown?preview=1").await;
        assert!(state.cache.get("/downtown").is_none());
    }

    #[tokio::test]
    async fn test_rates_rejects_invalid_params() {
        let state = test_state(MemoryStore::new(), None);
        let status = get_status(state, "/api/rates?hotel=x&checkin=bad&checkout=2026-09-03").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rates_unknown_hotel_is_404() {
        let state = test_state(MemoryStore::new(), None);
        let status = get_status(
            state,
            "/api/rates?hotel=ghost&checkin=2026-09-01&checkout=2026-09-03",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    async fn post_revalidate(state: Arc<ServerState>, header: Option<(&str, &str)>) -> Response {
        let mut request = Request::post("/api/revalidate");
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        router(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_revalidate_flushes_with_secret() {
        let state = test_state(store_with_page("downtown"), Some("s3cret"));
        let _ = get_status(state.clone(), "/downtown").await;
        assert_eq!(state.cache.len(), 1);

        let response = post_revalidate(state.clone(), Some(("x-webhook-secret", "s3cret"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_revalidate_rejects_wrong_secret() {
        let state = test_state(MemoryStore::new(), Some("s3cret"));

        let response = post_revalidate(state.clone(), Some(("x-webhook-secret", "wrong"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());

        let response = post_revalidate(state, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_revalidate_disabled_without_configured_secret() {
        let state = test_state(MemoryStore::new(), None);
        let response = post_revalidate(state, Some(("x-webhook-secret", ""))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

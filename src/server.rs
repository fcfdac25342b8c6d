//! HTTP surface: one scrape endpoint, one render endpoint, a health
//! check. Every request acquires a fresh browser session from the
//! shared provider; dropping the session at the end of the handler is
//! the teardown on all exit paths.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use gramprobe_browser::{provider_from_config, SessionProvider};
use gramprobe_core::config::{AppConfig, PageWaits};
use gramprobe_core::{CookieStore, Credentials, ScrapeError};
use gramprobe_scrape::{render, scrape_profile};

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    provider: Arc<dyn SessionProvider>,
    store: Arc<CookieStore>,
}

pub async fn run(config: AppConfig, bind_override: Option<String>) -> anyhow::Result<()> {
    let provider: Arc<dyn SessionProvider> = provider_from_config(&config.browser)?.into();
    let store = Arc::new(CookieStore::new(config.site.cookie_seed_paths.clone()));
    let bind = bind_override.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState {
        config: Arc::new(config),
        provider,
        store,
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/scrape", post(scrape))
        .route("/api/render", get(render_page))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(%bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    profile: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

async fn scrape(State(state): State<AppState>, Json(req): Json<ScrapeRequest>) -> Response {
    let profile = match req.profile.filter(|p| !p.trim().is_empty()) {
        Some(p) => p,
        None => {
            return error_response(&ScrapeError::InvalidInput(
                "profile url is required in request body".to_string(),
            ))
        }
    };
    let credentials = Credentials::resolve(req.username, req.password);

    let session = match state.provider.acquire() {
        Ok(session) => session,
        Err(e) => return error_response(&e),
    };
    let waits = PageWaits::from(&state.config.browser);

    match scrape_profile(
        &session,
        &state.store,
        &profile,
        credentials,
        &state.config.site,
        &waits,
    )
    .await
    {
        Ok((url, record)) => Json(json!({
            "success": true,
            "url": url,
            "data": record,
        }))
        .into_response(),
        Err(e) => {
            warn!(profile, error = %e, "scrape failed");
            error_response(&e)
        }
    }
}

#[derive(Debug, Deserialize)]
struct RenderParams {
    url: Option<String>,
    action: Option<String>,
    #[serde(rename = "fullPage", default)]
    full_page: Option<bool>,
}

async fn render_page(State(state): State<AppState>, Query(params): Query<RenderParams>) -> Response {
    let url = match params.url.filter(|u| !u.trim().is_empty()) {
        Some(u) => u,
        None => {
            return error_response(&ScrapeError::InvalidInput(
                "url query parameter is required".to_string(),
            ))
        }
    };
    let action = params.action.unwrap_or_else(|| "screenshot".to_string());

    let session = match state.provider.acquire() {
        Ok(session) => session,
        Err(e) => return error_response(&e),
    };
    let nav = PageWaits::from(&state.config.browser).nav;

    let result = match action.as_str() {
        "screenshot" => render::screenshot(&session, &url, params.full_page.unwrap_or(false), nav)
            .await
            .map(|png| binary_response("image/png", png)),
        "pdf" => render::pdf(&session, &url, nav)
            .await
            .map(|bytes| binary_response("application/pdf", bytes)),
        "content" => render::digest(&session, &url, nav).await.map(|digest| {
            Json(json!({
                "success": true,
                "url": url,
                "content": digest,
            }))
            .into_response()
        }),
        other => {
            return error_response(&ScrapeError::InvalidInput(format!(
                "invalid action '{other}', expected screenshot, pdf or content"
            )))
        }
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            warn!(url, action, error = %e, "render failed");
            error_response(&e)
        }
    }
}

fn binary_response(content_type: &'static str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "s-maxage=3600, stale-while-revalidate"),
        ],
        bytes,
    )
        .into_response()
}

fn status_for(err: &ScrapeError) -> StatusCode {
    match err {
        ScrapeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ScrapeError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
        ScrapeError::Extraction(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message string only; stack traces stop here.
fn error_response(err: &ScrapeError) -> Response {
    (
        status_for(err),
        Json(json!({
            "success": false,
            "error": err.to_string(),
        })),
    )
        .into_response()
}

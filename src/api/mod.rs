pub mod auth;
mod bible;
mod categories;
mod contents;
pub mod error;
mod validation;

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use error::{ApiError, ErrorCode};

/// Standard success envelope. Errors use the mirror-image shape in
/// [`error`] with `success: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Message-only envelope for operations with nothing to return.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/sessions", get(auth::list_sessions))
        .route("/sessions/:id", delete(auth::revoke_session));

    // Category reads are public; the mutation handlers authenticate via
    // the AuthUser extractor instead of a router-wide layer.
    let category_routes = Router::new()
        .route("/", get(categories::list_categories))
        .route("/", post(categories::create_category))
        .route("/:id", get(categories::get_category))
        .route("/:id", put(categories::update_category))
        .route("/:id", delete(categories::delete_category));

    let content_routes = Router::new()
        .route("/", get(contents::list_contents))
        .route("/", post(contents::create_content))
        .route("/:id", get(contents::get_content))
        .route("/:id", put(contents::update_content))
        .route("/:id", delete(contents::delete_content))
        .route("/:id/publish", patch(contents::publish_content))
        .route("/:id/unpublish", patch(contents::unpublish_content))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let bible_routes = Router::new()
        .route("/books", get(bible::list_books))
        .route("/books/:id", get(bible::get_book))
        .route("/chapters/:id", get(bible::get_chapter))
        .route("/verses/:id", get(bible::get_verse))
        .route("/search", get(bible::search_verses));

    let cors = cors_layer(&state);

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/contents", content_routes)
        .nest("/api/bible", bible_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds();
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": uptime,
        "environment": state.config.server.environment,
    }))
}

/// GET /
async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Catholic Content Platform API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "categories": "/api/categories",
            "contents": "/api/contents",
            "bible": "/api/bible",
            "health": "/health",
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let response = ApiResponse::ok(json!({"id": 1}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_with_message_envelope() {
        let response = ApiResponse::with_message(json!({"id": 1}), "Created");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Created");
    }

    #[test]
    fn test_message_only_envelope() {
        let response = ApiResponse::message("Logout successful");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Logout successful");
        assert!(value.get("data").is_none());
    }
}

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod uploads;
pub mod validation;

#[cfg(test)]
pub mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    response::Json,
    routing::{get, patch},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{categories, divisions, health, ticket_attachments, ticket_resolutions, tickets, users};
use crate::middleware::handle_panic;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Full router: `/api` resources, `/health`, static `/uploads`, and the global middleware stack
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let static_files = ServeDir::new(state.uploads.root());
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .merge(division_routes())
        .merge(category_routes())
        .merge(user_routes())
        .merge(ticket_routes())
        .merge(ticket_resolution_routes())
        .merge(ticket_attachment_routes())
        .nest_service(uploads::URL_PREFIX, static_files)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins))
        .layer(CatchPanicLayer::custom(handle_panic));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn division_routes() -> Router<AppState> {
    Router::new()
        .route("/api/divisions", get(divisions::list).post(divisions::create))
        .route(
            "/api/divisions/:id",
            get(divisions::show)
                .patch(divisions::update)
                .delete(divisions::delete),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(categories::list).post(categories::create))
        .route(
            "/api/categories/:id",
            get(categories::show)
                .patch(categories::update)
                .delete(categories::delete),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::show).patch(users::update).delete(users::delete),
        )
        .route("/api/users/:id/avatar", patch(users::update_avatar))
}

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", get(tickets::list).post(tickets::create))
        .route(
            "/api/tickets/:id",
            get(tickets::show).patch(tickets::update).delete(tickets::delete),
        )
}

fn ticket_resolution_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/ticket-resolutions",
            get(ticket_resolutions::list).post(ticket_resolutions::create),
        )
        .route(
            "/api/ticket-resolutions/:id",
            get(ticket_resolutions::show)
                .patch(ticket_resolutions::update)
                .delete(ticket_resolutions::delete),
        )
}

// Attachments are immutable once uploaded
fn ticket_attachment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/ticket-attachments",
            get(ticket_attachments::list).post(ticket_attachments::create),
        )
        .route(
            "/api/ticket-attachments/:id",
            get(ticket_attachments::show).delete(ticket_attachments::delete),
        )
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": config::config().app.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "divisions": "/api/divisions[/:id]",
            "categories": "/api/categories[/:id]",
            "users": "/api/users[/:id], /api/users/:id/avatar",
            "tickets": "/api/tickets[/:id]",
            "ticketResolutions": "/api/ticket-resolutions[/:id]",
            "ticketAttachments": "/api/ticket-attachments[/:id]",
            "uploads": "/uploads/*",
        }
    }))
}

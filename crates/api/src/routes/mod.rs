//! API routes

pub mod admin;
pub mod features;
pub mod health;
pub mod plans;
pub mod quota;
pub mod upgrade;

use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::ApiError, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let mut api_v1_routes = Router::new()
        // Catalog
        .route("/catalog", get(plans::get_catalog))
        .route("/features", get(plans::list_features))
        .route("/plans", get(plans::list_plans))
        .route("/limits/check", post(plans::check_limit))
        // Resolution
        .route("/features/resolve", post(features::resolve_features))
        .route("/features/effective", post(features::effective_features))
        .route("/features/require", post(features::require_features))
        .route("/entitlement", post(features::get_entitlement))
        .route("/quota/check", post(quota::check_quota))
        .route("/upgrade-path", get(upgrade::get_upgrade_path));

    // Snapshot replacement is opt-in at runtime
    if state.config.enable_admin_routes {
        api_v1_routes = api_v1_routes
            .route("/admin/flags", put(admin::replace_flags))
            .route("/admin/catalog", put(admin::replace_catalog));
    }

    let cors = build_cors_layer(&state.config.cors_allowed_origins);

    let router = Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_v1_routes)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Build CORS layer from configured origins. `None` when no origins are set.
fn build_cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(allowed)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600)),
    )
}

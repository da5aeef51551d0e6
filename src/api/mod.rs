//! API 模块
//!
//! 提供 REST API 支持。

pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::app_state::AppState;
use crate::error::AppError;
use crate::security::middleware::{auth_middleware, security_headers_middleware};

pub fn create_router(app_state: AppState, cors_origins: &[String]) -> Router {
    let public = Router::new()
        .merge(routes::auth_routes::create_public_auth_router())
        .merge(routes::character_routes::create_public_character_router());

    let protected = Router::new()
        .merge(routes::auth_routes::create_protected_auth_router())
        .merge(routes::profile_routes::create_profile_router())
        .merge(routes::character_routes::create_protected_character_router())
        .merge(routes::chat_routes::create_chat_router())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        // Add security headers middleware to all routes
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(build_cors_layer(cors_origins))
        .with_state(app_state)
}

/// 由配置的来源列表构建 CORS 层；列表为空时不放行任何跨域来源
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub async fn initialize_api(
    app_state: AppState,
    cors_origins: &[String],
) -> Result<Router, AppError> {
    tracing::info!("Initializing API router...");
    Ok(create_router(app_state, cors_origins))
}

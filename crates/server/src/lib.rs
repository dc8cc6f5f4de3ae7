//! HTTP surface of the loyalty pass service.

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::{Extension, Router};
use eyre::{Result as EyreResult, WrapErr};
use loyalty_primitives::notification::CALLBACK_PATH;
use tokio::net::TcpListener;
use tower_http::cors;
use tracing::info;

pub mod config;
pub mod handlers;
pub mod notifications;
pub mod service;
pub mod state;

use config::ServerConfig;
use handlers::{card_data, merchant, notifications as notify, passes, wallet_passes};
use state::ServiceState;

const CORS_MAX_AGE_SECS: u64 = 86_400;

#[must_use]
pub fn router(config: &ServerConfig, state: Arc<ServiceState>) -> Router {
    let mut app = Router::new()
        .route("/api/health", get(service::health_check_handler))
        .route(
            "/api/merchant-project-create",
            post(merchant::create_project_handler),
        )
        .route("/api/wallet-passes", post(wallet_passes::create_pass_handler))
        .route("/api/jwtToken", post(wallet_passes::google_pass_handler))
        .route("/api/generatePkpass", post(wallet_passes::apple_pass_handler))
        .route(
            CALLBACK_PATH,
            post(notify::callback_handler).get(notify::subscribe_handler),
        )
        .route("/api/cardData", get(card_data::card_data_handler))
        .route("/api/passes", post(passes::build_pass_handler))
        .route(
            "/api/passes/v1/passes/:pass_type_identifier/:serial_number",
            get(passes::latest_pass_handler),
        )
        .layer(Extension(state));

    if config.cors {
        app = app.layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    HeaderName::from_static("x-stl-key"),
                ])
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .max_age(core::time::Duration::from_secs(CORS_MAX_AGE_SECS)),
        );
    }

    app
}

pub async fn start(config: ServerConfig, state: Arc<ServiceState>) -> EyreResult<()> {
    let listener = TcpListener::bind(config.listen)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.listen))?;

    info!(
        addr = %listener.local_addr()?,
        root_url = %config.root_url,
        "Serving loyalty pass API"
    );

    axum::serve(listener, router(&config, state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests;

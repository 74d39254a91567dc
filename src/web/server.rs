use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, ConfigError};
use crate::tle::{Catalog, TleError};

use super::api::satellites as satellite_handlers;
use super::api::tracking as tracking_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog error: {0}")]
    Catalog(#[from] TleError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn build_state(config: Config, catalog: Catalog) -> Result<AppState, ConfigError> {
    let observer = config.observer()?;
    let settings = config.tracking_settings()?;
    Ok(AppState {
        tracker: Arc::new(Mutex::new(config.tracker()?)),
        observer,
        settings,
        config: Arc::new(config),
        catalog: Arc::new(RwLock::new(catalog)),
    })
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/satellites", get(satellite_handlers::list_satellites))
        .route(
            "/api/satellites/{id}/position",
            get(satellite_handlers::get_position),
        )
        .route(
            "/api/satellites/{id}/ground_track",
            get(satellite_handlers::get_ground_track),
        )
        .route(
            "/api/satellites/{id}/next_pass",
            get(satellite_handlers::get_next_pass),
        )
        .route("/api/tracking", get(tracking_handlers::get_tracking))
        .route(
            "/api/catalog/reload",
            post(tracking_handlers::reload_catalog),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let bind_addr = config.web.bind.clone();
    let catalog = config.load_catalog()?;
    log::info!("Serving {} satellites", catalog.len());

    let app = router(build_state(config, catalog)?);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down");
        })
        .await?;
    Ok(())
}

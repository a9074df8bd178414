//! Route configuration and setup.
//!
//! Health checks live in [health](health).

mod health;

use crate::auth::auth_middleware;
use crate::handlers::{assets, media_delete, thumbnail_upload, video_upload, videos};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use vaultstream_core::Config;

/// Room for multipart boundaries and part headers on top of a file cap.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes(config).layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let app = public_routes(state.as_ref())
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: &AppState) -> Router<Arc<AppState>> {
    let router = Router::new().route("/health", get(health::health_check));

    // Only backends that sign their own URLs have anything to serve here.
    if state.storage.signature_verifier().is_some() {
        router.route("/assets/{*key}", get(assets::serve_asset))
    } else {
        router
    }
}

/// Upload route whose request body is capped at `max_file_bytes` plus multipart framing.
/// Every other route keeps axum's default JSON body limit.
fn upload_route(
    route: MethodRouter<Arc<AppState>>,
    max_file_bytes: usize,
) -> MethodRouter<Arc<AppState>> {
    route
        .layer::<_, std::convert::Infallible>(RequestBodyLimitLayer::new(
            max_file_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .layer(DefaultBodyLimit::disable())
}

fn protected_routes(config: &Config) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/videos",
            get(videos::list_videos).post(videos::create_video),
        )
        .route(
            "/api/videos/{id}",
            get(videos::get_video)
                .put(videos::update_video)
                .delete(media_delete::delete_video),
        )
        .route(
            "/api/video_upload/{id}",
            upload_route(
                post(video_upload::upload_video),
                config.max_video_size_bytes(),
            ),
        )
        .route(
            "/api/thumbnail_upload/{id}",
            upload_route(
                post(thumbnail_upload::upload_thumbnail),
                config.max_thumbnail_size_bytes(),
            ),
        )
        .route(
            "/api/videos/{id}/thumbnail",
            delete(media_delete::delete_thumbnail),
        )
        .route(
            "/api/videos/{id}/video-file",
            delete(media_delete::delete_video_file),
        )
}

//! HTTP persistence endpoint for Draftkeeper documents.

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for document and lock endpoints.
pub mod handlers;
/// In-memory edit locks shared by the API handlers.
pub mod locks;

pub use draftkeeper_core::{config, db, models, AppError, Config, Database, DEFAULT_PORT};
pub use locks::{EditLockError, EditLockManager, LockOwnerId};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use hyper::HeaderMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Headroom on top of `max_document_size` for JSON framing and escaping.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub locks: Arc<EditLockManager>,
}

impl AppState {
    /// Construct shared application state.
    pub fn new(config: Config, db: Database) -> Self {
        Self::with_locks(config, db, Arc::new(EditLockManager::default()))
    }

    /// Construct shared application state with a pre-configured lock manager.
    pub fn with_locks(config: Config, db: Database, locks: Arc<EditLockManager>) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            locks,
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from the `BIND` env var and security policy.
///
/// # Returns
/// A socket address that stays on loopback unless public access is allowed.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let bind = std::env::var("BIND").ok();
    resolve_bind_address_from(bind.as_deref(), config.port, allow_public_access)
}

fn resolve_bind_address_from(
    bind: Option<&str>,
    port: u16,
    allow_public_access: bool,
) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], port));
    let requested = match bind {
        Some(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        None => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn loopback_origins(port: u16) -> Vec<HeaderValue> {
    ["localhost", "127.0.0.1", "[::1]"]
        .iter()
        .filter_map(|host| HeaderValue::from_str(&format!("http://{}:{}", host, port)).ok())
        .collect()
}

fn cors_layer(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allow_public_access {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(loopback_origins(cors_port)))
            .allow_methods(methods)
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::HeaderName::from_static(draftkeeper_core::OWNER_HEADER),
            ])
    }
}

fn security_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let body_limit = state
        .config
        .max_document_size
        .saturating_add(BODY_LIMIT_OVERHEAD);

    let mut router = Router::new()
        .route(
            "/api/document/:id",
            get(handlers::document::get_document).put(handlers::document::put_document),
        )
        .route(
            "/api/document/:id/lock",
            post(handlers::lock::acquire_lock).delete(handlers::lock::release_lock),
        )
        .route("/api/documents", get(handlers::document::list_documents))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(allow_public_access, cors_port)),
        );

    for (name, value) in security_headers() {
        if let Some(name) = name {
            router = router.layer(SetResponseHeaderLayer::overriding(name, value));
        }
    }
    router
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

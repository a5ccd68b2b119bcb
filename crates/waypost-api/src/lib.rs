//! waypost-api — HTTP gateway in front of a registry.

pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{any, delete, get, post};
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::trace::TraceLayer;

pub use handlers::{ApiError, ApiState};

/// Build the gateway router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/register",
            post(handlers::handle_register).fallback(handlers::method_not_allowed),
        )
        .route(
            "/deregister",
            delete(handlers::handle_deregister).fallback(handlers::method_not_allowed),
        )
        .route(
            "/discover",
            get(handlers::handle_discover).fallback(handlers::method_not_allowed),
        )
        .route(
            "/list",
            get(handlers::handle_list).fallback(handlers::method_not_allowed),
        )
        .route("/ping", any(handlers::handle_ping))
        .route(
            "/windows",
            get(handlers::handle_windows_get)
                .put(handlers::handle_windows_put)
                .fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves. Host names are resolved
/// and IPv6 literals accepted, e.g. `("localhost", 8080)` or `("::1", 8080)`.
pub async fn serve(
    state: ApiState,
    addr: impl ToSocketAddrs,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, state, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener(
    listener: TcpListener,
    state: ApiState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "registry listening");

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(addr = %local, "registry stopped");
    Ok(())
}

// HTTP server for the gateway endpoints
//
// Design Decision: axum router over GatewayApi with CORS outermost
//
// Panics inside a handler are caught and answered as a generic 500, so the
// CORS headers are still attached.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::any::Any;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};

use crate::api::GatewayApi;

pub mod error;
mod handlers;

pub use error::{ApiError, ErrorBody};

pub const HEALTH_CHECK_PATH: &str = "/agent-health-check";
pub const EXECUTE_TOOL_PATH: &str = "/execute-agent-tool";

/// Headers browsers may send on cross-origin calls
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Request handler panicked: {}", detail);
    ApiError::internal().into_response()
}

/// Gateway routes with CORS and the panic catch-all applied
///
/// The CORS layer answers every OPTIONS request itself with an empty 200.
pub fn router(api: GatewayApi) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(HEALTH_CHECK_PATH, post(handlers::agent_health_check))
        .route(EXECUTE_TOOL_PATH, post(handlers::execute_agent_tool))
        .with_state(api)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer())
}

/// Running gateway listener
///
/// Dropping the handle signals graceful shutdown without waiting for it.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Server {
    /// Bind `addr` (port 0 picks a free port) and serve in the background
    pub async fn start(api: GatewayApi, addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = router(api);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Gateway server stopped with error: {}", e);
            }
        });

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and wait for in-flight requests to drain
    pub async fn stop(mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Gateway server task failed: {}", e);
            }
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

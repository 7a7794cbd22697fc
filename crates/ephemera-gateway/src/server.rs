//! HTTP gateway server.

use crate::error::GatewayError;
use crate::handlers;
use crate::Result;
use axum::{
    http::{header, HeaderName, Method},
    routing::get,
    Router,
};
use ephemera_core::config::{BindMode, ServerConfig};
use ephemera_secrets::SecretService;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 8080;

/// Header carrying the one-time password on lookup.
pub const PASSWORD_HEADER: &str = "x-password";

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind mode.
    pub bind: BindMode,

    /// Port number.
    pub port: u16,

    /// Enable CORS.
    pub cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::Loopback,
            port: DEFAULT_PORT,
            cors: true,
        }
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            bind: config.bind,
            port: config.port,
            cors: config.cors,
        }
    }
}

/// Shared state handed to every handler.
pub struct GatewayState {
    pub service: SecretService,
}

/// The HTTP gateway server.
pub struct Gateway {
    state: Arc<GatewayState>,
    config: GatewayConfig,
}

impl Gateway {
    /// Create a new gateway over `service`.
    pub fn new(config: GatewayConfig, service: SecretService) -> Self {
        Self {
            state: Arc::new(GatewayState { service }),
            config,
        }
    }

    /// Run until Ctrl-C or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        let addr = self.bind_address();

        if self.config.bind != BindMode::Loopback {
            warn!("Gateway binding to {}; the API is reachable from the network", addr);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(GatewayError::Io)?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: tokio::net::TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr().map_err(GatewayError::Io)?;
        info!(
            addr = %local,
            backend = self.state.service.store().backend_name(),
            namespace = self.state.service.store().namespace(),
            accounting = ?self.state.service.view_accounting(),
            "Starting gateway server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("Gateway stopped");
        Ok(())
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route(
                "/api/secret",
                get(handlers::get_secret).post(handlers::create_secret),
            )
            .route("/api/health", get(handlers::health))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors {
            router = router.layer(Self::create_cors_layer());
        }

        router
    }

    fn create_cors_layer() -> CorsLayer {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(PASSWORD_HEADER)])
            .max_age(std::time::Duration::from_secs(3600))
    }

    /// Get the bind address.
    pub fn bind_address(&self) -> SocketAddr {
        let ip = match self.config.bind {
            BindMode::Loopback => [127, 0, 0, 1],
            BindMode::Lan => [0, 0, 0, 0],
        };

        SocketAddr::from((ip, self.config.port))
    }
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

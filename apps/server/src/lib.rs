//! # Helm Server
//!
//! HTTP front end for the dashboard configuration store: `/config`, `/config/layout`,
//! `/health`, and the API reference at `/api`.
//!
//! ## Example
//! ```no_run
//! use helm_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(3000)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;
mod state;

pub use state::{ApiState, ApiStateInner};

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use helm_domain::config::ApiConfig;
use helm_settings::ConfigStore;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    warn!(path = %ssl.key.display(), "SSL private key is readable by group or others (should be 600)");
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and prepares the configuration store.
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate or key files are configured but missing
    /// * the data directory cannot be created
    /// * a token key cannot be generated
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        if self.cfg.security.secret().is_none() {
            warn!("No secret configured: config cookies are not encrypted and tokens use a generated key file");
        }

        let store = ConfigStore::from_config(&self.cfg).await.context("Failed to initialize config store")?;
        Ok(Server { state: ApiState::new(self.cfg, store) })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, documentation included.
    pub fn into_router(self) -> Router {
        router::init(self.state)
    }

    /// Serves until Ctrl+C or SIGTERM, then drains connections for up to 30 seconds.
    ///
    /// # Errors
    /// Returns an error if the listener cannot bind or the TLS material cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            backend = ?self.state.store.backend().kind(),
            "Starting server"
        );

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone()));

        let service = self.into_router().into_make_service();
        match &cfg.server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                info!("Listening on https://{address}");
                axum_server::bind_rustls(address, tls).handle(handle).serve(service).await.context("HTTPS server failed")?;
            },
            None => {
                info!("Listening on http://{address}");
                axum_server::bind(address).handle(handle).serve(service).await.context("HTTP server failed")?;
            },
        }

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Starts a graceful shutdown once SIGINT (Ctrl+C) or SIGTERM arrives.
async fn drain_on_signal(handle: Handle<SocketAddr>) {
    if let Err(e) = shutdown_signal().await {
        error!(error = %e, "Cannot listen for shutdown signals");
        return;
    }
    info!(grace = ?SHUTDOWN_GRACE, "Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}

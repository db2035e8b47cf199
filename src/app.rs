//! Server lifecycle: bind, serve, sweep, and shut down.

use crate::config::Config;
use crate::factory::ClientFactory;
use crate::server::{create_router, AppState};
use crate::sweeper::ExpirySweeper;
use crate::{BrowserError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The assembled application.
pub struct App {
    state: AppState,
}

impl App {
    pub fn new(config: Config, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            state: AppState::new(config, factory),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Binds the configured address and serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(shutdown_signal()).await
    }

    /// Binds the configured address and serves until `signal` completes.
    pub async fn run_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.state.config.bind).await?;
        self.serve(listener, signal).await
    }

    /// Serves on an already-bound listener until `signal` completes.
    ///
    /// In-flight requests get `shutdown_grace` to finish. Afterwards the
    /// sweeper is stopped and every session is dropped.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = self.state;
        let config = state.config.clone();

        let addr = listener.local_addr()?;

        let cancel = CancellationToken::new();
        let sweeper = ExpirySweeper::new(
            state.sessions.clone(),
            config.session_ttl,
            config.sweep_interval,
        )
        .spawn(cancel.clone());

        info!(%addr, "server listening");

        let stop = CancellationToken::new();
        let server_stop = stop.clone();
        let router = create_router(state.clone());
        let mut server: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { server_stop.cancelled().await })
                .await
        });

        let outcome = tokio::select! {
            joined = &mut server => flatten(joined),
            _ = signal => {
                stop.cancel();
                match tokio::time::timeout(config.shutdown_grace, &mut server).await {
                    Ok(joined) => flatten(joined),
                    Err(_) => {
                        warn!(
                            grace = ?config.shutdown_grace,
                            "in-flight requests still running, aborting"
                        );
                        server.abort();
                        Ok(())
                    }
                }
            }
        };

        cancel.cancel();
        if let Err(e) = sweeper.await {
            error!(error = %e, "session sweeper task failed");
        }

        let cleared = state.sessions.clear().await;
        info!(cleared, "shutdown complete");

        outcome
    }
}

fn flatten(joined: std::result::Result<std::io::Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result.map_err(BrowserError::from),
        Err(e) => Err(BrowserError::Other(anyhow::Error::new(e))),
    }
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!(signal = "ctrl_c", "starting graceful shutdown");
        }
        _ = terminate => {
            info!(signal = "terminate", "starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::MockClientFactory;
    use crate::validation::ConnectRequest;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_shutdown_clears_sessions() {
        let app = App::new(Config::new(), Arc::new(MockClientFactory::new()));
        let sessions = app.state().sessions.clone();
        sessions
            .create(&ConnectRequest::new("minio.local:9000", "AKIAEXAMPLE", "secret", "us-east-1"))
            .await
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(app.serve(listener, async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_bind_failure_is_io_error() {
        let app = App::new(
            Config::new().with_bind("not-an-address"),
            Arc::new(MockClientFactory::new()),
        );
        let result = app.run_with_shutdown(std::future::pending()).await;
        assert!(matches!(result, Err(BrowserError::Io(_))));
    }
}

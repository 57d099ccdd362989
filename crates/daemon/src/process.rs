use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::http_server;
use crate::service_config::Config;
use crate::service_state::{State, StateSetupError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to set up service state: {0}")]
    State(#[from] StateSetupError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("service task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Asks a running service to stop accepting connections and drain.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Open the store, bind the listener and serve in a background task.
///
/// Returns the bound address (useful with port 0), a shutdown handle and the
/// server task.
pub async fn start_service(
    config: &Config,
) -> Result<(SocketAddr, ShutdownHandle, JoinHandle<Result<(), ServiceError>>), ServiceError> {
    let setup_config = config.clone();
    let state = tokio::task::spawn_blocking(move || State::from_config(&setup_config)).await??;

    let app = http_server::app(state, config);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| ServiceError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    let addr = listener.local_addr().map_err(ServiceError::Serve)?;

    let (tx, mut rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        axum::serve(listener, http_server::into_make_service(app))
            .with_graceful_shutdown(async move {
                let _ = rx.changed().await;
            })
            .await
            .map_err(ServiceError::Serve)
    });

    Ok((addr, ShutdownHandle { tx }, task))
}

/// Run the service until Ctrl-C / SIGTERM or a server error.
pub async fn spawn_service(config: &Config) -> Result<(), ServiceError> {
    let (addr, shutdown, mut task) = start_service(config).await?;
    tracing::info!(
        address = %addr,
        data_dir = %config.data_dir.display(),
        gzip = config.gzip,
        "docsvc listening"
    );

    tokio::select! {
        () = shutdown_signal() => shutdown.shutdown(),
        result = &mut task => return result?,
    }

    task.await??;
    tracing::info!("docsvc shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

//! Liveness endpoint for process supervisors.

use std::net::SocketAddr;

use axum::{Router, http::StatusCode, routing::get};
use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{BotError, Result};

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Router serving `GET /healthz`.
pub fn router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

/// Liveness server running on a background task.
pub struct HealthServer {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl HealthServer {
    /// Bind `0.0.0.0:port` and start serving. Port 0 picks a free port.
    pub async fn start(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await.map_err(|e| {
            error!("Failed to bind health endpoint on port {port}: {e}");
            e
        })?;
        let local_addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, router())
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
        });

        info!("Health endpoint listening on {local_addr}");
        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task
            .await
            .map_err(|e| BotError::Gateway(format!("health server task failed: {e}")))??;
        info!("Health endpoint stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn healthz_is_always_ok() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let response = router()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let response = router()
            .oneshot(Request::builder().uri("/status").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn serves_until_shut_down() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let server = HealthServer::start(0).await?;
        let url = format!("http://127.0.0.1:{}/healthz", server.local_addr().port());

        let status = reqwest::get(&url).await?.status();
        assert_eq!(status, reqwest::StatusCode::OK);

        server.shutdown().await?;
        assert!(reqwest::get(&url).await.is_err());
        Ok(())
    }
}

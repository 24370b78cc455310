use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::{signal, sync::watch, task::JoinSet};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(users::router())
        .route("/health", get(|| async { ApiResponse::ok("ok") }))
        .fallback(|| async { ApiError::NotFound })
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

/// Serve until SIGINT/SIGTERM, then give in-flight requests `grace` to finish.
/// Connections still open after that are aborted without a response.
pub async fn serve(app: Router, addr: SocketAddr, grace: Duration) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    serve_until(listener, app, shutdown_signal(), grace).await
}

pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    stop: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let (drain_tx, drain_rx) = watch::channel(());
    let mut connections = JoinSet::new();
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    connections.spawn(serve_connection(socket, peer, app.clone(), drain_rx.clone()));
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "connection task failed");
                }
            }
        }
    }

    drop(listener);
    info!(
        grace_secs = grace.as_secs(),
        in_flight = connections.len(),
        "shutting down server..."
    );
    drain_tx.send_replace(());

    let drain_all = async { while connections.join_next().await.is_some() {} };
    if tokio::time::timeout(grace, drain_all).await.is_ok() {
        info!("server gracefully stopped");
        return Ok(());
    }

    error!(
        abandoned = connections.len(),
        "graceful shutdown exceeded grace period; abandoning in-flight requests"
    );
    connections.abort_all();
    // Aborted tasks drop their handler futures, which hands pooled connections back.
    while connections.join_next().await.is_some() {}
    Ok(())
}

async fn serve_connection(
    socket: TcpStream,
    peer: SocketAddr,
    app: Router,
    mut drain: watch::Receiver<()>,
) {
    let builder = Builder::new(TokioExecutor::new());
    let conn = builder.serve_connection(TokioIo::new(socket), TowerToHyperService::new(app));
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(e) = res {
                    debug!(error = %e, %peer, "connection closed with error");
                }
                break;
            }
            _ = drain.changed(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received Ctrl+C"),
        _ = terminate => warn!("received SIGTERM"),
    }
}

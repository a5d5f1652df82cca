use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{validate, Config};
use crate::error::{RatedError, Result};
use crate::ratelimit::{Limiter, SeededHasher};
use crate::service::handler::RatedService;
use crate::service::idle::{serve_until_idle, Activity};
use crate::telemetry::{init_metrics, start_observability_server, Metrics};

/// Guard to decrement the active connections gauge when dropped
struct ConnectionGuard(Option<Arc<Metrics>>);

impl ConnectionGuard {
    fn new(metrics: Option<Arc<Metrics>>) -> Self {
        if let Some(m) = &metrics {
            m.record_connection_opened();
        }
        Self(metrics)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(m) = &self.0 {
            m.record_connection_closed();
        }
    }
}

/// Validate `config`, build the limiter and serve until SIGINT or SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    validate(&config)?;

    let hasher = if config.random_hash_seed {
        SeededHasher::random()
    } else {
        SeededHasher::fixed()
    };
    let limiter = Arc::new(Limiter::with_hasher(
        config.buckets,
        config.burst,
        config.refill,
        hasher,
    )?);

    let shutdown = CancellationToken::new();

    let metrics = match config.metrics_port {
        Some(port) => {
            let (metrics, registry) = init_metrics()?;
            let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
                .await
                .map_err(RatedError::Io)?;
            let token = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = start_observability_server(listener, registry, token).await {
                    error!(error = %e, "observability server exited with error");
                }
            });
            Some(metrics)
        }
        None => None,
    };

    let listener = TcpListener::bind(config.addr.as_str())
        .await
        .map_err(RatedError::Io)?;

    info!(
        addr = %config.addr,
        buckets = config.buckets,
        burst = config.burst,
        refill = %humantime::format_duration(config.refill),
        random_hash_seed = config.random_hash_seed,
        "starting rate limiter"
    );

    watch_signals(shutdown.clone())?;

    let service = Arc::new(RatedService::new(limiter, metrics.clone()));
    serve(listener, service, config.idle_timeout, metrics, shutdown).await
}

/// Accept connections on `listener` until `shutdown` is cancelled.
///
/// Each connection is closed once no request has started on it for
/// `idle_timeout`. Connections already being served when `shutdown` fires
/// are left to finish on their own under the same rule.
pub async fn serve(
    listener: TcpListener,
    service: Arc<RatedService>,
    idle_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
    shutdown: CancellationToken,
) -> Result<()> {
    let builder = ConnBuilder::new(TokioExecutor::new());

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested, no longer accepting connections");
                break;
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };

                let builder = builder.clone();
                let service = Arc::clone(&service);
                let metrics = metrics.clone();
                let guard = ConnectionGuard::new(metrics.clone());

                tokio::spawn(async move {
                    let _guard = guard;
                    let activity = Arc::new(Activity::new());
                    let svc = {
                        let activity = Arc::clone(&activity);
                        hyper::service::service_fn(move |req: Request<Incoming>| {
                            activity.touch();
                            let service = Arc::clone(&service);
                            async move { Ok::<_, hyper::Error>(service.handle(&req)) }
                        })
                    };

                    let conn = builder.serve_connection(TokioIo::new(stream), svc);
                    serve_until_idle(
                        conn,
                        |conn| conn.graceful_shutdown(),
                        &activity,
                        idle_timeout,
                        metrics,
                        peer,
                    )
                    .await;
                });
            }
        }
    }

    info!("rate limiter stopped");
    Ok(())
}

fn watch_signals(shutdown: CancellationToken) -> Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
        RatedError::Io(std::io::Error::other(format!("Failed to setup SIGTERM handler: {e}")))
    })?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).map_err(|e| {
        RatedError::Io(std::io::Error::other(format!("Failed to setup SIGINT handler: {e}")))
    })?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down"),
        }
        shutdown.cancel();
    });

    Ok(())
}

use crate::error::Result;
use crate::telemetry::endpoints::{not_found, reply, Endpoint};
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Serve `/metrics`, `/health` and `/live` on `listener` until `shutdown` is
/// cancelled. Any other path is a 404.
pub async fn start_observability_server(
    listener: TcpListener,
    registry: Registry,
    shutdown: CancellationToken,
) -> Result<()> {
    let registry = Arc::new(registry);
    let builder = ConnBuilder::new(TokioExecutor::new());

    info!(addr = ?listener.local_addr().ok(), "Observability server started (metrics + health checks)");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Observability server: shutdown requested");
                break;
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "Observability server: accept error");
                        continue;
                    }
                };

                let registry = Arc::clone(&registry);
                let builder = builder.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let result = match Endpoint::from_path(req.uri().path()) {
                            Some(endpoint) => endpoint.respond(&registry),
                            None => not_found(),
                        };
                        let resp = result.or_else(|e| {
                            warn!(error = %e, path = req.uri().path(), "Observability server: failed to build response");
                            reply(StatusCode::INTERNAL_SERVER_ERROR, "text/plain; charset=utf-8", "Internal Server Error\n")
                        });
                        async move { resp.map_err(std::io::Error::other) }
                    });

                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "Observability server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("Observability server stopped");
    Ok(())
}

use std::future::Future;
use std::net::SocketAddr;
use std::pin::{pin, Pin};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::telemetry::metrics::values;
use crate::telemetry::Metrics;

/// Last time a connection carried a request.
///
/// Stored as nanoseconds past the connection's start so the request path
/// only does an atomic max.
#[derive(Debug)]
pub(crate) struct Activity {
    origin: Instant,
    last_nanos: AtomicU64,
}

impl Activity {
    pub(crate) fn new() -> Self {
        Self { origin: Instant::now(), last_nanos: AtomicU64::new(0) }
    }

    pub(crate) fn touch(&self) {
        let nanos = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.last_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    fn last(&self) -> Instant {
        self.origin + Duration::from_nanos(self.last_nanos.load(Ordering::Relaxed))
    }

    /// Resolves once `idle` has passed without a `touch`.
    async fn idle_for(&self, idle: Duration) {
        loop {
            let deadline = self.last() + idle;
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }
}

/// Drive a connection until the peer closes it or it sits idle.
///
/// Idle means no request started within `idle`. The connection is then
/// asked to shut down gracefully and gets one more `idle` period to finish
/// before it is dropped.
pub(crate) async fn serve_until_idle<F, E>(
    conn: F,
    shutdown: impl FnOnce(Pin<&mut F>),
    activity: &Activity,
    idle: Duration,
    metrics: Option<Arc<Metrics>>,
    peer: SocketAddr,
) where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut conn = pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = activity.idle_for(idle) => {
            debug!(?peer, "closing idle connection");
            if let Some(m) = &metrics {
                m.record_timeout(values::TIMEOUT_IDLE);
            }
            shutdown(conn.as_mut());
            match tokio::time::timeout(idle, conn.as_mut()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(?peer, "idle connection did not close in time, dropping it");
                    if let Some(m) = &metrics {
                        m.record_timeout(values::TIMEOUT_DRAIN);
                    }
                    return;
                }
            }
        }
    };

    if let Err(e) = result {
        warn!(?peer, error = %e, "serve_connection error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_deadline_moves_with_activity() {
        let activity = Activity::new();
        tokio::time::sleep(Duration::from_millis(80)).await;
        activity.touch();

        activity.idle_for(Duration::from_millis(100)).await;
        assert!(activity.origin.elapsed() >= Duration::from_millis(180));
    }

    #[tokio::test]
    async fn test_already_idle_resolves_at_once() {
        let activity = Activity::new();
        tokio::time::sleep(Duration::from_millis(150)).await;

        let idle = tokio::time::timeout(
            Duration::from_millis(50),
            activity.idle_for(Duration::from_millis(100)),
        )
        .await;
        assert!(idle.is_ok());
    }
}

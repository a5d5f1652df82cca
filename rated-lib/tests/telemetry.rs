//! Observability server against a listener on an ephemeral port.

use http::Request;
use rated_lib::ratelimit::Limiter;
use rated_lib::telemetry::{init_metrics, start_observability_server};
use rated_lib::RatedService;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

// init_metrics installs the global meter provider, so every check shares one test.
#[tokio::test]
async fn test_observability_endpoints() -> TestResult {
    let (metrics, registry) = init_metrics()?;
    let limiter = Arc::new(Limiter::new(10, 2, Duration::from_secs(1))?);
    let service = RatedService::new(limiter, Some(metrics));

    let allowed = service.handle(&Request::builder().uri("/?foo").body(())?);
    assert_eq!(allowed.status(), StatusCode::NO_CONTENT);
    let help = service.handle(&Request::builder().uri("/").body(())?);
    assert_eq!(help.status(), StatusCode::OK);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(start_observability_server(listener, registry, shutdown.clone()));

    let client = reqwest::Client::builder().no_proxy().timeout(Duration::from_secs(2)).build()?;

    let metrics_text = client.get(format!("http://{addr}/metrics")).send().await?.text().await?;
    let allowed_line = metrics_text
        .lines()
        .find(|l| l.starts_with("rated_requests_total{") && l.contains(r#"outcome="allowed""#));
    assert!(allowed_line.is_some(), "{metrics_text}");
    assert!(metrics_text.contains(r#"outcome="help""#), "{metrics_text}");
    assert!(metrics_text.contains("rated_decision_duration_seconds"), "{metrics_text}");

    let health = client.get(format!("http://{addr}/health")).send().await?;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await?, r#"{"status":"healthy"}"#);

    let live = client.get(format!("http://{addr}/live")).send().await?;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await?, r#"{"status":"alive"}"#);

    let missing = client.get(format!("http://{addr}/status")).send().await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    shutdown.cancel();
    server.await??;
    Ok(())
}

use anyhow::Result;
use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod handlers;
mod metrics;

use config::Config;
use db::{DbProber, DbSettings};
use handlers::{db_check, health, metrics_handler, root};
use metrics::{track_requests, Metrics};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = config.port,
        version = env!("CARGO_PKG_VERSION"),
        "starting vitals"
    );

    // Create metrics registry
    let metrics = Metrics::new();

    // Create the database prober from the POSTGRES_* environment
    let prober = DbProber::new(DbSettings {
        host: config.postgres_host.clone(),
        port: config.postgres_port.clone(),
        user: config.postgres_user.clone(),
        password: config.postgres_password.clone(),
        database: config.postgres_db.clone(),
    });

    let app = app(metrics, prober);

    // Create TCP listener
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening for connections");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("vitals stopped");
    Ok(())
}

/// Build the application router.
///
/// The metrics middleware wraps every route, including the default 404
/// fallback, so each completed request records exactly one sample.
fn app(metrics: Metrics, prober: DbProber) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/db", get(db_check).with_state(prober))
        .route("/metrics", get(metrics_handler).with_state(metrics.clone()))
        .layer(middleware::from_fn_with_state(metrics, track_requests))
        .layer(TraceLayer::new_for_http())
}

/// Initialize tracing based on configuration.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> (Router, Metrics) {
        let metrics = Metrics::new();
        // Nothing listens on port 1, so /db fails fast
        let prober = DbProber::new(DbSettings {
            host: Some("127.0.0.1".to_string()),
            port: "1".to_string(),
            user: Some("vitals".to_string()),
            password: Some("secret".to_string()),
            database: Some("vitals".to_string()),
        });
        (app(metrics.clone(), prober), metrics)
    }

    async fn get_path(app: &Router, path: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn counter_sample(metrics: &Metrics, endpoint: &str) -> Option<String> {
        let label = format!("endpoint=\"{}\"", endpoint);
        metrics
            .encode()
            .lines()
            .find(|line| line.starts_with("http_requests_total") && line.contains(&label))
            .map(|line| line.to_string())
    }

    #[tokio::test]
    async fn test_route_table() {
        let (app, _metrics) = test_app();

        let response = get_path(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"message": "Hello from Kubernetes!", "status": "ok"})
        );

        let response = get_path(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status": "healthy"})
        );

        let response = get_path(&app, "/db").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["database"], "error");

        let response = get_path(&app, "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let (app, metrics) = test_app();

        for _ in 0..3 {
            let response = get_path(&app, "/health").await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let sample = counter_sample(&metrics, "/health").expect("counter sample missing");
        assert!(sample.contains("method=\"GET\""));
        assert!(sample.contains("status=\"200\""));
        assert!(sample.ends_with(" 3"));

        // The scrape output itself carries the sample too
        let response = get_path(&app, "/metrics").await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("endpoint=\"/health\""));
    }

    #[tokio::test]
    async fn test_unmatched_path_is_counted_as_404() {
        let (app, metrics) = test_app();

        let response = get_path(&app, "/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let sample = counter_sample(&metrics, "/missing").expect("counter sample missing");
        assert!(sample.contains("status=\"404\""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_are_all_counted() {
        let (app, metrics) = test_app();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..50 {
            let app = app.clone();
            tasks.spawn(async move {
                let response = app
                    .oneshot(
                        Request::builder()
                            .uri("/health")
                            .body(Body::empty())
                            .unwrap(),
                    )
                    .await
                    .unwrap();
                response.status()
            });
        }

        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }

        let sample = counter_sample(&metrics, "/health").expect("counter sample missing");
        assert!(sample.ends_with(" 50"), "lost updates in {sample}");
    }
}

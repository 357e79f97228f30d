use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use stockline_api::app::{build_app, services};
use stockline_auth::TokenDirectory;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockline_observability::init();

    let bind = std::env::var("STOCKLINE_BIND").unwrap_or_else(|_| {
        tracing::warn!("STOCKLINE_BIND not set; defaulting to {DEFAULT_BIND}");
        DEFAULT_BIND.to_string()
    });

    let lock_timeout = match std::env::var("STOCKLINE_LOCK_TIMEOUT_MS") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!(%raw, "invalid STOCKLINE_LOCK_TIMEOUT_MS; using default");
                Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS)
            }
        },
        Err(_) => Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
    };

    let app_services = Arc::new(services::build_services(lock_timeout));
    services::spawn_confirmation_log(&app_services.sink);

    let mut directory = TokenDirectory::new();
    let seed = std::env::var("STOCKLINE_SEED").unwrap_or_else(|_| {
        tracing::warn!("STOCKLINE_SEED not set; seeding demo data");
        "1".to_string()
    });
    if seed == "1" {
        services::seed_demo(&app_services, &mut directory);
    }
    if directory.is_empty() {
        tracing::warn!("token directory is empty; every /api request will get 401");
    }

    let app = build_app(Arc::clone(&app_services), Arc::new(directory));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(%bind, "listening");
    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
